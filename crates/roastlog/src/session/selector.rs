//! Two-tier quick temperature selector.
//!
//! The operator picks a tens value (0 to 300) and then a units digit; the
//! selector composes the two into a reading. With auto-advance on, the tens
//! value follows a time table so that most readings need a single tap.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Highest value on the tens tier.
pub const MAX_BASE: u16 = 300;

/// One row of the auto-advance table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvanceStep {
    /// Elapsed seconds from which this base applies.
    pub seconds: u32,
    /// Tens value to select.
    pub base: u16,
}

impl AdvanceStep {
    /// Create a table row.
    #[must_use]
    pub const fn new(seconds: u32, base: u16) -> Self {
        Self { seconds, base }
    }
}

/// Default time-to-base table for a typical 10 to 18 minute roast.
#[must_use]
pub fn default_advance_table() -> Vec<AdvanceStep> {
    vec![
        AdvanceStep::new(0, 20),
        AdvanceStep::new(60, 40),
        AdvanceStep::new(100, 60),
        AdvanceStep::new(130, 80),
        AdvanceStep::new(170, 100),
        AdvanceStep::new(210, 120),
        AdvanceStep::new(250, 130),
        AdvanceStep::new(290, 150),
        AdvanceStep::new(340, 160),
        AdvanceStep::new(390, 170),
        AdvanceStep::new(430, 180),
        AdvanceStep::new(480, 190),
        AdvanceStep::new(540, 200),
        AdvanceStep::new(600, 210),
        AdvanceStep::new(660, 220),
        AdvanceStep::new(720, 230),
        AdvanceStep::new(780, 240),
        AdvanceStep::new(840, 250),
        AdvanceStep::new(900, 260),
        AdvanceStep::new(960, 270),
        AdvanceStep::new(1020, 280),
        AdvanceStep::new(1080, 290),
    ]
}

/// Values on the tens tier, ascending.
pub fn tens_tier() -> impl Iterator<Item = u16> {
    (0..=MAX_BASE).step_by(10)
}

/// Values on the units tier, ascending.
pub fn units_tier() -> impl Iterator<Item = u16> {
    0..=9
}

/// Whether `base` is a value on the tens tier.
#[must_use]
pub fn is_valid_base(base: u16) -> bool {
    base <= MAX_BASE && base % 10 == 0
}

/// Look up the base for an elapsed time, scanning from the largest threshold
/// down so the most advanced applicable row wins.
#[must_use]
pub fn lookup_base(table: &[AdvanceStep], elapsed: u32) -> Option<u16> {
    table
        .iter()
        .rev()
        .find(|step| elapsed >= step.seconds)
        .map(|step| step.base)
}

/// Quick temperature selector state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickSelector {
    base: Option<u16>,
    last_auto: Option<u16>,
    auto_advance: bool,
    table: Vec<AdvanceStep>,
}

impl QuickSelector {
    /// A selector with no base selected.
    #[must_use]
    pub fn new(auto_advance: bool, table: Vec<AdvanceStep>) -> Self {
        Self {
            base: None,
            last_auto: None,
            auto_advance,
            table,
        }
    }

    /// The selected tens value.
    #[must_use]
    pub fn base(&self) -> Option<u16> {
        self.base
    }

    /// Whether auto-advance is on.
    #[must_use]
    pub fn auto_advance(&self) -> bool {
        self.auto_advance
    }

    /// Select a tens value.
    ///
    /// A manual choice holds until auto-advance reaches the next stage.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSelection`] if `base` is not on the tens tier.
    pub fn select_base(&mut self, base: u16) -> Result<u16> {
        if !is_valid_base(base) {
            return Err(Error::invalid_selection(format!(
                "base must be a multiple of 10 between 0 and {MAX_BASE}, got {base}"
            )));
        }
        self.base = Some(base);
        Ok(base)
    }

    /// Compose the selected base with a units digit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoBaseSelected`] if no base is selected, or
    /// [`Error::InvalidSelection`] if `units` is not a single digit.
    pub fn select_units(&self, units: u16) -> Result<u16> {
        if units > 9 {
            return Err(Error::invalid_selection(format!(
                "units must be a digit between 0 and 9, got {units}"
            )));
        }
        let base = self.base.ok_or(Error::NoBaseSelected)?;
        Ok(base + units)
    }

    /// Apply auto-advance for the current elapsed time.
    ///
    /// Returns the newly adopted base, or `None` if nothing changed.
    pub fn on_tick(&mut self, elapsed: u32) -> Option<u16> {
        if !self.auto_advance {
            return None;
        }
        let next = lookup_base(&self.table, elapsed)?;
        if self.last_auto == Some(next) {
            return None;
        }
        self.last_auto = Some(next);
        self.base = Some(next);
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selector(auto: bool) -> QuickSelector {
        QuickSelector::new(auto, default_advance_table())
    }

    #[test]
    fn test_tiers() {
        let tens: Vec<_> = tens_tier().collect();
        assert_eq!(tens.len(), 31);
        assert_eq!(tens.first(), Some(&0));
        assert_eq!(tens.last(), Some(&300));
        assert_eq!(units_tier().count(), 10);
    }

    #[test]
    fn test_compose_base_and_units() {
        let mut sel = selector(false);
        sel.select_base(150).unwrap();
        assert_eq!(sel.select_units(3).unwrap(), 153);
    }

    #[test]
    fn test_units_without_base() {
        let sel = selector(false);
        assert!(matches!(sel.select_units(3), Err(Error::NoBaseSelected)));
    }

    #[test]
    fn test_invalid_base_and_units() {
        let mut sel = selector(false);
        assert!(sel.select_base(155).is_err());
        assert!(sel.select_base(310).is_err());
        sel.select_base(0).unwrap();
        assert!(sel.select_units(10).is_err());
        assert_eq!(sel.select_units(9).unwrap(), 9);
    }

    #[test]
    fn test_lookup_base_picks_highest_threshold() {
        let table = default_advance_table();
        assert_eq!(lookup_base(&table, 0), Some(20));
        assert_eq!(lookup_base(&table, 59), Some(20));
        assert_eq!(lookup_base(&table, 60), Some(40));
        assert_eq!(lookup_base(&table, 299), Some(150));
        assert_eq!(lookup_base(&table, 5000), Some(290));
    }

    #[test]
    fn test_lookup_base_before_first_threshold() {
        let table = vec![AdvanceStep::new(30, 50)];
        assert_eq!(lookup_base(&table, 10), None);
    }

    #[test]
    fn test_auto_advance_disabled() {
        let mut sel = selector(false);
        assert_eq!(sel.on_tick(0), None);
        assert_eq!(sel.on_tick(600), None);
        assert_eq!(sel.base(), None);
    }

    #[test]
    fn test_auto_advance_adopts_changes_only() {
        let mut sel = selector(true);
        assert_eq!(sel.on_tick(0), Some(20));
        assert_eq!(sel.on_tick(1), None);
        assert_eq!(sel.on_tick(60), Some(40));
        assert_eq!(sel.on_tick(61), None);
        assert_eq!(sel.base(), Some(40));
    }

    #[test]
    fn test_manual_base_not_overridden_within_stage() {
        let mut sel = selector(true);
        sel.on_tick(60);
        sel.select_base(50).unwrap();
        assert_eq!(sel.on_tick(61), None);
        assert_eq!(sel.base(), Some(50));

        assert_eq!(sel.on_tick(100), Some(60));
        assert_eq!(sel.base(), Some(60));
    }
}
