//! `roastlog` - a local-first coffee roast logger
//!
//! Keep bean templates, prepare a roast with its pre-roast parameters, run a
//! timed session that records phase events and temperature readings with
//! rate-of-rise, then save and review finished roasts.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod console;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod record;
pub mod session;
pub mod setup;
pub mod storage;
pub mod timer;
pub mod viewer;

pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use record::{EventKind, PendingSession, RoastEvent, RoastLog, Template, TemplateDraft};
pub use session::{RoastController, RoastSnapshot};
pub use storage::{MemoryStore, Repository, Storage, StorageStats};
pub use viewer::{LogView, LogViewer};
