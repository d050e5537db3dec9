//! Derived numbers for a finished roast.
//!
//! Everything here is a pure function of a stored log. Derivations that lack
//! their inputs return `None` rather than an error.

use serde::Serialize;

use crate::record::{EventKind, RoastEvent, RoastLog};
use crate::session::{format_clock, round1};

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

fn usable_weights(charge: f64, discharge: Option<f64>) -> Option<(f64, f64)> {
    let discharge = discharge?;
    if charge == 0.0 || discharge == 0.0 || !charge.is_finite() || !discharge.is_finite() {
        return None;
    }
    Some((charge, discharge))
}

/// Weight lost during the roast as a percentage of the charge, one decimal.
#[must_use]
pub fn weight_loss_percent(charge: f64, discharge: Option<f64>) -> Option<f64> {
    let (charge, discharge) = usable_weights(charge, discharge)?;
    Some(round1((charge - discharge) / charge * 100.0))
}

/// Charge weight over discharge weight, three decimals.
#[must_use]
pub fn roast_index(charge: f64, discharge: Option<f64>) -> Option<f64> {
    let (charge, discharge) = usable_weights(charge, discharge)?;
    Some(round3(charge / discharge))
}

/// Development time ratio: the share of the roast after first crack began,
/// as a percentage with one decimal.
#[must_use]
pub fn development_time_ratio(total_seconds: u32, events: &[RoastEvent]) -> Option<f64> {
    if total_seconds == 0 {
        return None;
    }
    let first_crack = events
        .iter()
        .find(|e| e.kind == EventKind::FirstCrackStart)?;
    let development = f64::from(total_seconds) - f64::from(first_crack.elapsed);
    Some(round1(development / f64::from(total_seconds) * 100.0))
}

/// Roast degree estimated from weight loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoastLevel {
    /// Under 13 %.
    Light,
    /// 13 to 14 %.
    Cinnamon,
    /// 14 to 16 %.
    Medium,
    /// 16 to 17 %.
    High,
    /// 17 to 19 %.
    City,
    /// 19 to 21 %.
    FullCity,
    /// 21 to 23 %.
    French,
    /// 23 % and over.
    Italian,
}

const LEVEL_BRACKETS: [(f64, RoastLevel); 7] = [
    (13.0, RoastLevel::Light),
    (14.0, RoastLevel::Cinnamon),
    (16.0, RoastLevel::Medium),
    (17.0, RoastLevel::High),
    (19.0, RoastLevel::City),
    (21.0, RoastLevel::FullCity),
    (23.0, RoastLevel::French),
];

impl RoastLevel {
    /// The level for a weight-loss percentage.
    #[must_use]
    pub fn from_weight_loss(percent: f64) -> Self {
        LEVEL_BRACKETS
            .iter()
            .find(|(upper, _)| percent < *upper)
            .map_or(Self::Italian, |(_, level)| *level)
    }

    /// English name.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Light => "Light",
            Self::Cinnamon => "Cinnamon",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::City => "City",
            Self::FullCity => "Full City",
            Self::French => "French",
            Self::Italian => "Italian",
        }
    }

    /// Japanese name with the degree in parentheses.
    #[must_use]
    pub fn japanese_label(self) -> &'static str {
        match self {
            Self::Light => "ライトロースト (極浅煎り)",
            Self::Cinnamon => "シナモンロースト (浅煎り)",
            Self::Medium => "ミディアムロースト (中浅煎り)",
            Self::High => "ハイロースト (中煎り)",
            Self::City => "シティロースト (中深煎り)",
            Self::FullCity => "フルシティロースト (深煎り)",
            Self::French => "フレンチロースト (極深煎り)",
            Self::Italian => "イタリアンロースト (極深煎り)",
        }
    }
}

impl std::fmt::Display for RoastLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Summary numbers for one roast.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoastSummary {
    /// Total roast time as `mm:ss`.
    pub total_time: String,
    /// Weight loss in percent.
    pub weight_loss_percent: Option<f64>,
    /// Charge over discharge.
    pub roast_index: Option<f64>,
    /// Development time ratio in percent.
    pub development_time_ratio: Option<f64>,
    /// Estimated roast degree.
    pub roast_level: Option<RoastLevel>,
}

impl RoastSummary {
    /// Compute the summary of a log.
    #[must_use]
    pub fn of(log: &RoastLog) -> Self {
        let weight_loss = weight_loss_percent(log.session.charge_grams, log.discharge_grams);
        Self {
            total_time: format_clock(log.total_seconds),
            weight_loss_percent: weight_loss,
            roast_index: roast_index(log.session.charge_grams, log.discharge_grams),
            development_time_ratio: development_time_ratio(log.total_seconds, &log.events),
            roast_level: weight_loss.map(RoastLevel::from_weight_loss),
        }
    }
}

/// One point of the temperature and rate-of-rise chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    /// Seconds since the roast started.
    pub elapsed: u32,
    /// Elapsed time as `mm:ss`.
    pub time: String,
    /// Temperature in °C.
    pub temperature: Option<f64>,
    /// Rate of rise in °C/min.
    pub ror: Option<f64>,
    /// Phase marker; `None` for plain temperature samples.
    pub marker: Option<EventKind>,
}

/// Chart points for events that carry a temperature or a rate of rise,
/// ordered by time. Events at the same second keep their log order.
#[must_use]
pub fn chart_series(events: &[RoastEvent]) -> Vec<ChartPoint> {
    let mut points: Vec<ChartPoint> = events
        .iter()
        .filter(|e| e.temperature.is_some() || e.ror.is_some())
        .map(|e| ChartPoint {
            elapsed: e.elapsed,
            time: format_clock(e.elapsed),
            temperature: e.temperature,
            ror: e.ror,
            marker: (!e.kind.is_sample()).then_some(e.kind),
        })
        .collect();
    points.sort_by_key(|p| p.elapsed);
    points
}
