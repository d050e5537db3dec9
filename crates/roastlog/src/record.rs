//! Persisted record types for roastlog.
//!
//! Templates describe a green bean, a pending session carries the pre-roast
//! parameters, and a roast log is the finished, immutable record of one roast.
//! Every record round-trips losslessly through serde JSON.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationErrors};

static ID_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Generate a record identifier from the creation time.
///
/// The millisecond timestamp keeps ids sortable by creation; the sequence
/// suffix keeps ids created in the same millisecond apart.
#[must_use]
pub fn new_record_id(now: DateTime<Utc>) -> String {
    let seq = ID_SEQUENCE.fetch_add(1, Ordering::Relaxed) % 10_000;
    format!("{}-{seq:04}", now.timestamp_millis())
}

/// The fixed vocabulary of roast events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Ambient temperature recorded as the first sample.
    AmbientTemperature,
    /// Moisture evaporation ends.
    DryEnd,
    /// Visual colour milestone before first crack.
    GoldPoint,
    /// First crack begins.
    FirstCrackStart,
    /// First crack ends.
    FirstCrackEnd,
    /// Second crack begins.
    SecondCrackStart,
    /// Second crack ends.
    SecondCrackEnd,
    /// Manual temperature reading.
    TemperatureRecord,
    /// The roast was finished.
    Finish,
}

impl EventKind {
    /// Whether events of this kind are temperature samples for rate-of-rise.
    #[must_use]
    pub fn is_sample(self) -> bool {
        matches!(self, Self::AmbientTemperature | Self::TemperatureRecord)
    }

    /// Japanese label used by the original roasting sheets.
    #[must_use]
    pub fn japanese_label(self) -> &'static str {
        match self {
            Self::AmbientTemperature => "気温",
            Self::DryEnd => "ドライエンド",
            Self::GoldPoint => "ゴールドポイント",
            Self::FirstCrackStart => "1ハゼ開始",
            Self::FirstCrackEnd => "1ハゼ終了",
            Self::SecondCrackStart => "2ハゼ開始",
            Self::SecondCrackEnd => "2ハゼ終了",
            Self::TemperatureRecord => "温度記録",
            Self::Finish => "焙煎終了",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::AmbientTemperature => "ambient temperature",
            Self::DryEnd => "dry end",
            Self::GoldPoint => "gold point",
            Self::FirstCrackStart => "first crack start",
            Self::FirstCrackEnd => "first crack end",
            Self::SecondCrackStart => "second crack start",
            Self::SecondCrackEnd => "second crack end",
            Self::TemperatureRecord => "temperature",
            Self::Finish => "finish",
        };
        f.write_str(label)
    }
}

/// A single entry in a roast's event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoastEvent {
    /// What happened.
    pub kind: EventKind,
    /// Seconds since the roast started.
    pub elapsed: u32,
    /// Temperature reading in °C, if one was known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Rate of rise in °C/min computed at this sample.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ror: Option<f64>,
}

/// Operator input for a new bean template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateDraft {
    /// Display name (required).
    pub name: String,
    /// Coffee variety, e.g. Typica.
    pub variety: String,
    /// Country or region of origin.
    pub origin: String,
    /// Where the beans were bought.
    pub supplier: String,
    /// When the beans were bought.
    pub purchase_date: Option<NaiveDate>,
    /// Washed, natural, honey and so on.
    pub processing_method: String,
}

/// A bean template. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    /// Unique identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Coffee variety.
    #[serde(default)]
    pub variety: String,
    /// Origin.
    #[serde(default)]
    pub origin: String,
    /// Supplier.
    #[serde(default)]
    pub supplier: String,
    /// Purchase date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<NaiveDate>,
    /// Processing method.
    #[serde(default)]
    pub processing_method: String,
    /// When the template was created.
    pub created_at: DateTime<Utc>,
}

impl Template {
    /// Build a template from operator input.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the name is blank.
    pub fn from_draft(draft: TemplateDraft, now: DateTime<Utc>) -> Result<Self> {
        let mut errors = ValidationErrors::new();
        let name = draft.name.trim();
        if name.is_empty() {
            errors.add("name", "name is required");
        }
        errors.into_result()?;

        Ok(Self {
            id: new_record_id(now),
            name: name.to_string(),
            variety: draft.variety.trim().to_string(),
            origin: draft.origin.trim().to_string(),
            supplier: draft.supplier.trim().to_string(),
            purchase_date: draft.purchase_date,
            processing_method: draft.processing_method.trim().to_string(),
            created_at: now,
        })
    }
}

/// Pre-roast parameters waiting for the roast to start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingSession {
    /// Template the beans come from.
    pub template_id: String,
    /// Template name at the time the session was created.
    pub template_name: String,
    /// Green bean charge in grams.
    pub charge_grams: f64,
    /// Ambient temperature in °C.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ambient_temp: Option<f64>,
    /// Ambient relative humidity in %.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    /// Roaster used.
    #[serde(default)]
    pub roaster: String,
    /// Drum temperature at charge in °C.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charge_temp: Option<f64>,
    /// Free-text notes written before the roast.
    #[serde(default)]
    pub memo: String,
}

/// Free-text operator notes taken while roasting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoastNotes {
    /// Gas pressure setting.
    pub gas_pressure: String,
    /// Damper setting.
    pub damper: String,
    /// Middle (turning) point temperature.
    pub middle_point: String,
}

/// A finished roast. Immutable after save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoastLog {
    /// Unique identifier.
    pub id: String,
    /// Identifier assigned when the roast started.
    #[serde(default)]
    pub roast_id: String,
    /// The pre-roast parameters.
    #[serde(flatten)]
    pub session: PendingSession,
    /// Events in the order they were recorded.
    pub events: Vec<RoastEvent>,
    /// Total roast time in seconds.
    pub total_seconds: u32,
    /// Roasted weight in grams.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discharge_grams: Option<f64>,
    /// Free-text notes written after the roast.
    #[serde(default)]
    pub roast_memo: String,
    /// Notes taken during the roast.
    #[serde(default)]
    pub notes: RoastNotes,
    /// The last rate of rise computed during the roast.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_ror: Option<f64>,
    /// Rate of rise at dry end.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_ror: Option<f64>,
    /// BLAKE3 hash of the roast content for deduplication.
    #[serde(default)]
    pub fingerprint: String,
    /// When the log was saved.
    pub created_at: DateTime<Utc>,
}

/// The parts of a log that identify its content.
#[derive(Serialize)]
struct FingerprintInput<'a> {
    roast_id: &'a str,
    session: &'a PendingSession,
    events: &'a [RoastEvent],
    total_seconds: u32,
    discharge_grams: Option<f64>,
    roast_memo: &'a str,
    notes: &'a RoastNotes,
}

impl RoastLog {
    /// Compute the BLAKE3 fingerprint of this log's content.
    ///
    /// Covers the roast id, so separate roasts never collide. The log id and
    /// save time are excluded so that saving the same roast twice yields the
    /// same fingerprint.
    ///
    /// # Errors
    ///
    /// Returns an error if the content cannot be serialized.
    pub fn compute_fingerprint(&self) -> Result<String> {
        let input = FingerprintInput {
            roast_id: &self.roast_id,
            session: &self.session,
            events: &self.events,
            total_seconds: self.total_seconds,
            discharge_grams: self.discharge_grams,
            roast_memo: &self.roast_memo,
            notes: &self.notes,
        };
        let bytes = serde_json::to_vec(&input)?;
        Ok(blake3::hash(&bytes).to_hex().to_string())
    }

    /// Fill in the fingerprint field.
    ///
    /// # Errors
    ///
    /// Returns an error if the content cannot be serialized.
    pub fn sealed(mut self) -> Result<Self> {
        self.fingerprint = self.compute_fingerprint()?;
        Ok(self)
    }

    /// The first event of the given kind.
    #[must_use]
    pub fn first_event(&self, kind: EventKind) -> Option<&RoastEvent> {
        self.events.iter().find(|e| e.kind == kind)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn template(name: &str) -> Template {
        Template::from_draft(
            TemplateDraft {
                name: name.to_string(),
                origin: "Ethiopia".to_string(),
                ..TemplateDraft::default()
            },
            Utc::now(),
        )
        .expect("valid template")
    }

    pub fn session(template: &Template) -> PendingSession {
        PendingSession {
            template_id: template.id.clone(),
            template_name: template.name.clone(),
            charge_grams: 200.0,
            ambient_temp: Some(24.0),
            humidity: Some(55.0),
            roaster: "hand net".to_string(),
            charge_temp: Some(180.0),
            memo: "first try".to_string(),
        }
    }

    pub fn log(session: PendingSession) -> RoastLog {
        let now = Utc::now();
        RoastLog {
            id: new_record_id(now),
            roast_id: new_record_id(now),
            session,
            events: vec![
                RoastEvent {
                    kind: EventKind::TemperatureRecord,
                    elapsed: 0,
                    temperature: Some(20.0),
                    ror: None,
                },
                RoastEvent {
                    kind: EventKind::TemperatureRecord,
                    elapsed: 60,
                    temperature: Some(40.0),
                    ror: Some(20.0),
                },
                RoastEvent {
                    kind: EventKind::FirstCrackStart,
                    elapsed: 420,
                    temperature: Some(196.0),
                    ror: None,
                },
                RoastEvent {
                    kind: EventKind::Finish,
                    elapsed: 600,
                    temperature: Some(210.0),
                    ror: None,
                },
            ],
            total_seconds: 600,
            discharge_grams: Some(170.0),
            roast_memo: "sweet".to_string(),
            notes: RoastNotes::default(),
            last_ror: Some(20.0),
            pre_ror: None,
            fingerprint: String::new(),
            created_at: Utc::now(),
        }
        .sealed()
        .expect("serializable log")
    }
}
