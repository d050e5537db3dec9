//! CLI command definitions.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Subcommand};

use crate::record::TemplateDraft;
use crate::setup::SessionDraft;

/// Bean template commands.
#[derive(Debug, Subcommand)]
pub enum TemplateCommand {
    /// Create a bean template
    Add {
        /// Display name
        name: String,

        /// Coffee variety, e.g. Typica
        #[arg(long, default_value = "")]
        variety: String,

        /// Country or region of origin
        #[arg(long, default_value = "")]
        origin: String,

        /// Where the beans were bought
        #[arg(long, default_value = "")]
        supplier: String,

        /// Purchase date (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        purchase_date: Option<NaiveDate>,

        /// Processing method, e.g. washed
        #[arg(long = "process", default_value = "")]
        processing_method: String,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// List bean templates
    List {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

impl TemplateCommand {
    /// The template draft for `add`.
    #[must_use]
    pub fn draft(&self) -> Option<TemplateDraft> {
        match self {
            Self::Add {
                name,
                variety,
                origin,
                supplier,
                purchase_date,
                processing_method,
                ..
            } => Some(TemplateDraft {
                name: name.clone(),
                variety: variety.clone(),
                origin: origin.clone(),
                supplier: supplier.clone(),
                purchase_date: *purchase_date,
                processing_method: processing_method.clone(),
            }),
            Self::List { .. } => None,
        }
    }
}

/// Pre-roast session arguments.
#[derive(Debug, Clone, Args)]
pub struct SessionStartArgs {
    /// Template id or name
    #[arg(short, long)]
    pub template: Option<String>,

    /// Green bean charge in grams
    #[arg(long, value_name = "GRAMS")]
    pub charge: Option<f64>,

    /// Ambient temperature in °C
    #[arg(long, value_name = "CELSIUS")]
    pub ambient: Option<f64>,

    /// Ambient humidity in %
    #[arg(long, value_name = "PERCENT")]
    pub humidity: Option<f64>,

    /// Roaster used
    #[arg(long, default_value = "")]
    pub roaster: String,

    /// Drum temperature at charge in °C
    #[arg(long, value_name = "CELSIUS")]
    pub charge_temp: Option<f64>,

    /// Pre-roast notes
    #[arg(long, default_value = "")]
    pub memo: String,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

impl SessionStartArgs {
    /// Build a session draft with the template id already resolved.
    #[must_use]
    pub fn draft(&self, template_id: Option<String>) -> SessionDraft {
        SessionDraft {
            template_id,
            charge_grams: self.charge,
            ambient_temp: self.ambient,
            humidity: self.humidity,
            roaster: self.roaster.clone(),
            charge_temp: self.charge_temp,
            memo: self.memo.clone(),
        }
    }
}

/// Pending session commands.
#[derive(Debug, Subcommand)]
pub enum SessionCommand {
    /// Prepare a roast with pre-roast parameters
    Start(SessionStartArgs),

    /// Show the pending session
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Discard the pending session
    Clear,
}

/// Live roast arguments.
#[derive(Debug, Clone, Default, Args)]
pub struct RoastCommand {
    /// Run the clock this many times faster than real time
    #[arg(long, value_name = "FACTOR")]
    pub accelerate: Option<u32>,

    /// Let the quick selector follow the time table
    #[arg(long)]
    pub auto_advance: bool,
}

/// Saved roast commands.
#[derive(Debug, Subcommand)]
pub enum LogCommand {
    /// List saved roasts, newest first
    List {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show a saved roast with its summary and events
    Show {
        /// Roast id
        id: String,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show chart data for a saved roast
    Chart {
        /// Roast id
        id: String,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Delete a saved roast
    Delete {
        /// Roast id
        id: String,
    },
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_draft_from_add() {
        let cmd = TemplateCommand::Add {
            name: "Kenya".to_string(),
            variety: "SL28".to_string(),
            origin: String::new(),
            supplier: String::new(),
            purchase_date: NaiveDate::from_ymd_opt(2024, 5, 1),
            processing_method: "washed".to_string(),
            json: false,
        };
        let draft = cmd.draft().unwrap();
        assert_eq!(draft.name, "Kenya");
        assert_eq!(draft.variety, "SL28");
        assert_eq!(draft.purchase_date, NaiveDate::from_ymd_opt(2024, 5, 1));
        assert!(TemplateCommand::List { json: false }.draft().is_none());
    }

    #[test]
    fn test_session_start_draft() {
        let args = SessionStartArgs {
            template: Some("Kenya".to_string()),
            charge: Some(200.0),
            ambient: None,
            humidity: Some(40.0),
            roaster: "net".to_string(),
            charge_temp: None,
            memo: String::new(),
            json: false,
        };
        let draft = args.draft(Some("id-1".to_string()));
        assert_eq!(draft.template_id.as_deref(), Some("id-1"));
        assert_eq!(draft.charge_grams, Some(200.0));
        assert_eq!(draft.humidity, Some(40.0));
    }

    #[test]
    fn test_roast_command_default() {
        let cmd = RoastCommand::default();
        assert!(cmd.accelerate.is_none());
        assert!(!cmd.auto_advance);
    }
}
