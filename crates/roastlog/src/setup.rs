//! Bean templates and session initiation.

use chrono::Utc;
use tracing::info;

use crate::error::{Result, ValidationErrors};
use crate::record::{PendingSession, Template, TemplateDraft};
use crate::storage::Repository;

/// Create and store a bean template.
///
/// # Errors
///
/// Returns a validation error for a blank name, or a storage error.
pub fn create_template<R: Repository + ?Sized>(repo: &R, draft: TemplateDraft) -> Result<Template> {
    let template = Template::from_draft(draft, Utc::now())?;
    repo.put_template(&template)?;
    info!(id = %template.id, name = %template.name, "Template created");
    Ok(template)
}

/// All templates, oldest first.
///
/// # Errors
///
/// Returns a storage error.
pub fn list_templates<R: Repository + ?Sized>(repo: &R) -> Result<Vec<Template>> {
    repo.list_templates()
}

/// Find a template by id, or else by name ignoring case.
///
/// # Errors
///
/// Returns a storage error.
pub fn find_template<R: Repository + ?Sized>(repo: &R, key: &str) -> Result<Option<Template>> {
    let key = key.trim();
    if let Some(template) = repo.get_template(key)? {
        return Ok(Some(template));
    }
    Ok(repo
        .list_templates()?
        .into_iter()
        .find(|t| t.name.eq_ignore_ascii_case(key)))
}

/// Operator input for a new roast session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionDraft {
    /// Selected template id (required).
    pub template_id: Option<String>,
    /// Green bean charge in grams (required).
    pub charge_grams: Option<f64>,
    /// Ambient temperature in °C.
    pub ambient_temp: Option<f64>,
    /// Ambient relative humidity in %.
    pub humidity: Option<f64>,
    /// Roaster used.
    pub roaster: String,
    /// Drum temperature at charge in °C.
    pub charge_temp: Option<f64>,
    /// Free-text notes.
    pub memo: String,
}

/// Validate a session draft and store it as the pending session.
///
/// Replaces any session already pending.
///
/// # Errors
///
/// Returns a validation error listing every bad field, or a storage error.
pub fn initiate_session<R: Repository + ?Sized>(
    repo: &R,
    draft: SessionDraft,
) -> Result<PendingSession> {
    let mut errors = ValidationErrors::new();

    let template = match draft.template_id.as_deref().map(str::trim) {
        None | Some("") => {
            errors.add("template", "select a bean template");
            None
        }
        Some(id) => {
            let found = repo.get_template(id)?;
            if found.is_none() {
                errors.add("template", format!("no template with id {id}"));
            }
            found
        }
    };

    match draft.charge_grams {
        None => errors.add("charge", "charge weight is required"),
        Some(g) if !g.is_finite() || g <= 0.0 => {
            errors.add("charge", "charge weight must be a positive number");
        }
        Some(_) => {}
    }
    if draft.humidity.is_some_and(|h| !(0.0..=100.0).contains(&h)) {
        errors.add("humidity", "humidity must be between 0 and 100");
    }
    for (field, value) in [
        ("ambient_temp", draft.ambient_temp),
        ("charge_temp", draft.charge_temp),
    ] {
        if value.is_some_and(|v| !v.is_finite()) {
            errors.add(field, "must be a number");
        }
    }

    errors.into_result()?;
    let (Some(template), Some(charge_grams)) = (template, draft.charge_grams) else {
        return Err(crate::error::Error::internal("validated session draft is incomplete"));
    };

    let session = PendingSession {
        template_id: template.id,
        template_name: template.name,
        charge_grams,
        ambient_temp: draft.ambient_temp,
        humidity: draft.humidity,
        roaster: draft.roaster.trim().to_string(),
        charge_temp: draft.charge_temp,
        memo: draft.memo.trim().to_string(),
    };
    repo.put_pending_session(&session)?;
    info!(template = %session.template_name, charge = session.charge_grams, "Session ready to roast");
    Ok(session)
}
