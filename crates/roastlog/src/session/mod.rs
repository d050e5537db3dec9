//! The live roast session.
//!
//! The building blocks are small and synchronous: a clock, an append-only
//! event log, a phase tracker, a rate-of-rise window and the quick
//! temperature selector. [`RoastController`] owns one of each and exposes
//! the transitions a roast goes through.

pub mod clock;
pub mod controller;
pub mod events;
pub mod phase;
pub mod ror;
pub mod selector;

pub use clock::{format_clock, ClockState, RoastClock, TickOutcome, MAX_ELAPSED_SECONDS};
pub use controller::{ControllerOptions, NoteField, Notice, RoastController, RoastSnapshot};
pub use events::EventLog;
pub use phase::{Phase, PhaseTracker};
pub use ror::{rate_of_rise, round1, RorTracker, Sample};
pub use selector::{default_advance_table, AdvanceStep, QuickSelector, MAX_BASE};
