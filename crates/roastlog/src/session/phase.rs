//! Which roast phases can be marked next.

use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::record::EventKind;

/// A roast phase the operator marks once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    /// Moisture evaporation ends.
    DryEnd,
    /// Gold colour reached.
    GoldPoint,
    /// First crack begins.
    FirstCrackStart,
    /// First crack ends.
    FirstCrackEnd,
    /// Second crack begins.
    SecondCrackStart,
    /// Second crack ends.
    SecondCrackEnd,
}

impl Phase {
    /// All phases in display order.
    pub const ALL: [Phase; 6] = [
        Phase::DryEnd,
        Phase::GoldPoint,
        Phase::FirstCrackStart,
        Phase::FirstCrackEnd,
        Phase::SecondCrackStart,
        Phase::SecondCrackEnd,
    ];

    /// The phase that must be marked before this one.
    #[must_use]
    pub fn prerequisite(self) -> Option<Phase> {
        match self {
            Self::DryEnd | Self::FirstCrackStart => None,
            Self::GoldPoint => Some(Self::DryEnd),
            Self::FirstCrackEnd | Self::SecondCrackStart => Some(Self::FirstCrackStart),
            Self::SecondCrackEnd => Some(Self::SecondCrackStart),
        }
    }

    /// The event recorded for this phase.
    #[must_use]
    pub fn event_kind(self) -> EventKind {
        match self {
            Self::DryEnd => EventKind::DryEnd,
            Self::GoldPoint => EventKind::GoldPoint,
            Self::FirstCrackStart => EventKind::FirstCrackStart,
            Self::FirstCrackEnd => EventKind::FirstCrackEnd,
            Self::SecondCrackStart => EventKind::SecondCrackStart,
            Self::SecondCrackEnd => EventKind::SecondCrackEnd,
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.event_kind().fmt(f)
    }
}

/// Tracks marked phases and enforces their partial order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhaseTracker {
    done: BTreeSet<Phase>,
}

impl PhaseTracker {
    /// Nothing marked yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a phase has been marked.
    #[must_use]
    pub fn is_done(&self, phase: Phase) -> bool {
        self.done.contains(&phase)
    }

    /// Check whether a phase can be marked now.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PhaseUnavailable`] if the phase was already marked or
    /// its prerequisite was not.
    pub fn check(&self, phase: Phase) -> Result<()> {
        if self.is_done(phase) {
            return Err(Error::PhaseUnavailable {
                phase,
                reason: "already recorded",
            });
        }
        if let Some(required) = phase.prerequisite() {
            if !self.is_done(required) {
                let reason = match required {
                    Phase::DryEnd => "dry end has not been recorded",
                    Phase::FirstCrackStart => "first crack has not started",
                    _ => "second crack has not started",
                };
                return Err(Error::PhaseUnavailable { phase, reason });
            }
        }
        Ok(())
    }

    /// Mark a phase if it is available.
    ///
    /// # Errors
    ///
    /// Same as [`PhaseTracker::check`].
    pub fn mark(&mut self, phase: Phase) -> Result<()> {
        self.check(phase)?;
        self.done.insert(phase);
        Ok(())
    }

    /// Phases that can be marked now, in display order.
    #[must_use]
    pub fn available(&self) -> Vec<Phase> {
        Phase::ALL
            .into_iter()
            .filter(|p| self.check(*p).is_ok())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initially_available() {
        let tracker = PhaseTracker::new();
        assert_eq!(
            tracker.available(),
            vec![Phase::DryEnd, Phase::FirstCrackStart]
        );
    }

    #[test]
    fn test_gold_point_requires_dry_end() {
        let mut tracker = PhaseTracker::new();
        let err = tracker.mark(Phase::GoldPoint).unwrap_err();
        assert!(matches!(
            err,
            Error::PhaseUnavailable {
                phase: Phase::GoldPoint,
                ..
            }
        ));

        tracker.mark(Phase::DryEnd).unwrap();
        tracker.mark(Phase::GoldPoint).unwrap();
    }

    #[test]
    fn test_second_crack_requires_first_crack_start() {
        let mut tracker = PhaseTracker::new();
        assert!(tracker.check(Phase::SecondCrackStart).is_err());
        assert!(tracker.check(Phase::FirstCrackEnd).is_err());

        tracker.mark(Phase::FirstCrackStart).unwrap();
        assert!(tracker.check(Phase::SecondCrackStart).is_ok());
        assert!(tracker.check(Phase::FirstCrackEnd).is_ok());
        assert!(tracker.check(Phase::SecondCrackEnd).is_err());

        tracker.mark(Phase::SecondCrackStart).unwrap();
        tracker.mark(Phase::SecondCrackEnd).unwrap();
    }

    #[test]
    fn test_each_phase_marked_once() {
        let mut tracker = PhaseTracker::new();
        tracker.mark(Phase::DryEnd).unwrap();
        let err = tracker.mark(Phase::DryEnd).unwrap_err();
        assert!(err.to_string().contains("already recorded"));
    }

    #[test]
    fn test_second_crack_does_not_need_first_crack_end() {
        let mut tracker = PhaseTracker::new();
        tracker.mark(Phase::FirstCrackStart).unwrap();
        tracker.mark(Phase::SecondCrackStart).unwrap();
        assert!(tracker.is_done(Phase::SecondCrackStart));
        assert!(!tracker.is_done(Phase::FirstCrackEnd));
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::SecondCrackEnd.to_string(), "second crack end");
    }
}
