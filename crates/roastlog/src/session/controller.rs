//! The roast page controller.
//!
//! [`RoastController`] owns the clock, event log, phase tracker, rate-of-rise
//! window and quick selector for one roast. Every transition returns an
//! immutable [`RoastSnapshot`] and publishes it on a `watch` channel so a
//! presentation layer can follow along without polling.

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::error::{Error, Result, ValidationErrors};
use crate::record::{new_record_id, EventKind, PendingSession, RoastEvent, RoastLog, RoastNotes};
use crate::storage::Repository;

use super::clock::{format_clock, ClockState, RoastClock, TickOutcome};
use super::events::EventLog;
use super::phase::{Phase, PhaseTracker};
use super::ror::{RorTracker, Sample};
use super::selector::{default_advance_table, AdvanceStep, QuickSelector};

/// Settings for a roast controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerOptions {
    /// Let the quick selector follow the advance table.
    pub auto_advance: bool,
    /// Time-to-base table for auto-advance.
    pub advance_table: Vec<AdvanceStep>,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            auto_advance: false,
            advance_table: default_advance_table(),
        }
    }
}

/// A transient message about the last recorded event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Increases with every notice raised in a roast.
    pub seq: u64,
    /// Text to show.
    pub message: String,
}

/// Which free-text roast note to set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteField {
    /// Gas pressure.
    GasPressure,
    /// Damper.
    Damper,
    /// Middle point.
    MiddlePoint,
}

/// Immutable view of a roast at one moment.
#[derive(Debug, Clone, PartialEq)]
pub struct RoastSnapshot {
    /// Bean template name.
    pub template_name: String,
    /// Seconds since the roast started.
    pub elapsed: u32,
    /// Running or finished.
    pub state: ClockState,
    /// Events so far, in order.
    pub events: Vec<RoastEvent>,
    /// Last manually entered temperature.
    pub current_temperature: Option<f64>,
    /// Selected tens value on the quick selector.
    pub base: Option<u16>,
    /// Most recent rate of rise.
    pub last_ror: Option<f64>,
    /// Rate of rise captured at dry end.
    pub pre_ror: Option<f64>,
    /// Phases that can be marked now.
    pub available_phases: Vec<Phase>,
    /// Operator notes.
    pub notes: RoastNotes,
    /// Current notice, if not yet dismissed.
    pub notice: Option<Notice>,
}

impl RoastSnapshot {
    /// Whether the roast has finished.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state == ClockState::Finished
    }

    /// Elapsed time as `mm:ss`.
    #[must_use]
    pub fn clock(&self) -> String {
        format_clock(self.elapsed)
    }
}

/// Controller for a single roast, from start to save.
#[derive(Debug)]
pub struct RoastController<'r, R: Repository + ?Sized> {
    repo: &'r R,
    roast_id: String,
    session: PendingSession,
    clock: RoastClock,
    events: EventLog,
    phases: PhaseTracker,
    ror: RorTracker,
    selector: QuickSelector,
    current_temperature: Option<f64>,
    notes: RoastNotes,
    pre_ror: Option<f64>,
    notice: Option<Notice>,
    notice_seq: u64,
    updates: watch::Sender<RoastSnapshot>,
}

impl<'r, R: Repository + ?Sized> RoastController<'r, R> {
    /// Start a roast from the pending session in `repo`.
    ///
    /// The pending session is consumed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoPendingSession`] if none exists, or a storage error.
    pub fn start(repo: &'r R, options: ControllerOptions) -> Result<Self> {
        let session = repo.take_pending_session()?.ok_or(Error::NoPendingSession)?;
        Ok(Self::with_session(repo, session, options))
    }

    /// Start a roast from an explicit session.
    #[must_use]
    pub fn with_session(repo: &'r R, session: PendingSession, options: ControllerOptions) -> Self {
        let selector = QuickSelector::new(options.auto_advance, options.advance_table);
        let placeholder = RoastSnapshot {
            template_name: session.template_name.clone(),
            elapsed: 0,
            state: ClockState::Running,
            events: Vec::new(),
            current_temperature: None,
            base: None,
            last_ror: None,
            pre_ror: None,
            available_phases: Vec::new(),
            notes: RoastNotes::default(),
            notice: None,
        };
        let (updates, _) = watch::channel(placeholder);

        let mut controller = Self {
            repo,
            roast_id: new_record_id(Utc::now()),
            session,
            clock: RoastClock::new(),
            events: EventLog::new(),
            phases: PhaseTracker::new(),
            ror: RorTracker::new(),
            selector,
            current_temperature: None,
            notes: RoastNotes::default(),
            pre_ror: None,
            notice: None,
            notice_seq: 0,
            updates,
        };
        controller.begin();
        controller
    }

    fn begin(&mut self) {
        info!(template = %self.session.template_name, charge = self.session.charge_grams, "Roast started");
        self.selector.on_tick(0);
        if self.selector.auto_advance() {
            if let Some(ambient) = self.session.ambient_temp.filter(|t| *t > 0.0) {
                self.record_sample(EventKind::AmbientTemperature, ambient);
            }
        }
        self.publish();
    }

    /// Subscribe to snapshots. The receiver starts at the current state.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<RoastSnapshot> {
        self.updates.subscribe()
    }

    /// The pre-roast parameters this roast was started with.
    #[must_use]
    pub fn session(&self) -> &PendingSession {
        &self.session
    }

    /// Seconds since the roast started.
    #[must_use]
    pub fn elapsed(&self) -> u32 {
        self.clock.elapsed()
    }

    /// Whether the roast has finished.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.clock.is_finished()
    }

    /// Events so far.
    #[must_use]
    pub fn events(&self) -> &[RoastEvent] {
        self.events.as_slice()
    }

    /// The current state.
    #[must_use]
    pub fn snapshot(&self) -> RoastSnapshot {
        RoastSnapshot {
            template_name: self.session.template_name.clone(),
            elapsed: self.clock.elapsed(),
            state: self.clock.state(),
            events: self.events.as_slice().to_vec(),
            current_temperature: self.current_temperature,
            base: self.selector.base(),
            last_ror: self.ror.last(),
            pre_ror: self.pre_ror,
            available_phases: if self.is_finished() {
                Vec::new()
            } else {
                self.phases.available()
            },
            notes: self.notes.clone(),
            notice: self.notice.clone(),
        }
    }

    fn publish(&self) -> RoastSnapshot {
        let snapshot = self.snapshot();
        self.updates.send_replace(snapshot.clone());
        snapshot
    }

    fn ensure_running(&self) -> Result<()> {
        if self.is_finished() {
            Err(Error::SessionFinished)
        } else {
            Ok(())
        }
    }

    fn raise_notice(&mut self, event: &RoastEvent) {
        self.notice_seq += 1;
        let mut message = format!("{} @ {}", event.kind, format_clock(event.elapsed));
        if let Some(t) = event.temperature {
            message.push_str(&format!(" / {t}°C"));
        }
        if let Some(ror) = event.ror {
            message.push_str(&format!(" / RoR {ror}"));
        }
        self.notice = Some(Notice {
            seq: self.notice_seq,
            message,
        });
    }

    fn append(&mut self, kind: EventKind, temperature: Option<f64>, ror: Option<f64>) {
        let event = self
            .events
            .record(kind, self.clock.elapsed(), temperature, ror)
            .clone();
        debug!(kind = %event.kind, elapsed = event.elapsed, ?temperature, ?ror, "Event recorded");
        self.raise_notice(&event);
    }

    fn record_sample(&mut self, kind: EventKind, temperature: f64) {
        let ror = self
            .ror
            .observe(Sample::new(temperature, self.clock.elapsed()));
        self.append(kind, Some(temperature), ror);
    }

    /// Advance the clock by one second.
    ///
    /// At the cap the roast finishes as if [`RoastController::finish`] had
    /// been called. Ticks after finish change nothing.
    pub fn tick(&mut self) -> RoastSnapshot {
        match self.clock.tick() {
            TickOutcome::Advanced(elapsed) => {
                if let Some(base) = self.selector.on_tick(elapsed) {
                    debug!(base, elapsed, "Quick selector advanced");
                }
            }
            TickOutcome::CapReached => {
                info!("Roast reached the time cap");
                self.append(EventKind::Finish, self.current_temperature, None);
            }
            TickOutcome::Ignored => return self.snapshot(),
        }
        self.publish()
    }

    /// Record a phase with an explicit temperature or the current one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionFinished`] after finish, or
    /// [`Error::PhaseUnavailable`] if the phase is out of order or repeated.
    pub fn mark_phase(&mut self, phase: Phase, temperature: Option<f64>) -> Result<RoastSnapshot> {
        self.ensure_running()?;
        if let Some(t) = temperature {
            check_temperature(t)?;
        }
        self.phases.mark(phase)?;
        if phase == Phase::DryEnd {
            self.pre_ror = self.ror.last();
        }
        self.append(
            phase.event_kind(),
            temperature.or(self.current_temperature),
            None,
        );
        Ok(self.publish())
    }

    /// Set the current temperature without recording a sample.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionFinished`] after finish or a validation error
    /// for a non-finite value.
    pub fn set_current_temperature(&mut self, temperature: f64) -> Result<RoastSnapshot> {
        self.ensure_running()?;
        check_temperature(temperature)?;
        self.current_temperature = Some(temperature);
        Ok(self.publish())
    }

    /// Record a manual temperature sample.
    ///
    /// The sample becomes the current temperature and feeds rate-of-rise.
    ///
    /// # Errors
    ///
    /// Same as [`RoastController::set_current_temperature`].
    pub fn record_temperature(&mut self, temperature: f64) -> Result<RoastSnapshot> {
        self.ensure_running()?;
        check_temperature(temperature)?;
        self.current_temperature = Some(temperature);
        self.record_sample(EventKind::TemperatureRecord, temperature);
        Ok(self.publish())
    }

    /// Choose a tens value on the quick selector.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionFinished`] after finish or
    /// [`Error::InvalidSelection`] for a value off the tier.
    pub fn select_base(&mut self, base: u16) -> Result<RoastSnapshot> {
        self.ensure_running()?;
        self.selector.select_base(base)?;
        Ok(self.publish())
    }

    /// Choose a units digit, recording `base + units` as a sample.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionFinished`] after finish,
    /// [`Error::NoBaseSelected`] before any base, or
    /// [`Error::InvalidSelection`] for a value off the tier.
    pub fn select_units(&mut self, units: u16) -> Result<RoastSnapshot> {
        self.ensure_running()?;
        let temperature = self.selector.select_units(units)?;
        self.record_temperature(f64::from(temperature))
    }

    /// Set a free-text roast note.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionFinished`] after finish.
    pub fn set_note(&mut self, field: NoteField, value: impl Into<String>) -> Result<RoastSnapshot> {
        self.ensure_running()?;
        let value = value.into();
        match field {
            NoteField::GasPressure => self.notes.gas_pressure = value,
            NoteField::Damper => self.notes.damper = value,
            NoteField::MiddlePoint => self.notes.middle_point = value,
        }
        Ok(self.publish())
    }

    /// Finish the roast. Calling it again changes nothing.
    pub fn finish(&mut self) -> RoastSnapshot {
        if self.clock.finish() {
            info!(elapsed = self.clock.elapsed(), "Roast finished");
            self.append(EventKind::Finish, self.current_temperature, None);
            self.publish()
        } else {
            self.snapshot()
        }
    }

    /// Clear the notice with sequence number `seq` if it is still showing.
    pub fn dismiss_notice(&mut self, seq: u64) -> RoastSnapshot {
        if self.notice.as_ref().is_some_and(|n| n.seq == seq) {
            self.notice = None;
            self.publish()
        } else {
            self.snapshot()
        }
    }

    /// Build the finished log without storing it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionNotFinished`] while running or a validation
    /// error for a bad discharge weight.
    pub fn build_log(&self, discharge_grams: Option<f64>, memo: &str) -> Result<RoastLog> {
        if !self.is_finished() {
            return Err(Error::SessionNotFinished);
        }
        let mut errors = ValidationErrors::new();
        if let Some(w) = discharge_grams {
            if !w.is_finite() || w <= 0.0 {
                errors.add("discharge", "discharge weight must be a positive number");
            }
        }
        errors.into_result()?;

        let now = Utc::now();
        RoastLog {
            id: new_record_id(now),
            roast_id: self.roast_id.clone(),
            session: self.session.clone(),
            events: self.events.as_slice().to_vec(),
            total_seconds: self.clock.elapsed(),
            discharge_grams,
            roast_memo: memo.trim().to_string(),
            notes: self.notes.clone(),
            last_ror: self.ror.last(),
            pre_ror: self.pre_ror,
            fingerprint: String::new(),
            created_at: now,
        }
        .sealed()
    }

    /// Store the finished roast.
    ///
    /// Saving identical content twice from this controller returns the log
    /// stored the first time. Other roasts are always stored.
    ///
    /// # Errors
    ///
    /// Same as [`RoastController::build_log`], plus storage errors.
    pub fn save(&self, discharge_grams: Option<f64>, memo: &str) -> Result<RoastLog> {
        let log = self.build_log(discharge_grams, memo)?;
        if self.repo.put_log(&log)? {
            info!(id = %log.id, events = log.events.len(), "Roast saved");
            return Ok(log);
        }
        debug!(fingerprint = %log.fingerprint, "Roast already saved");
        Ok(self
            .repo
            .get_log_by_fingerprint(&log.fingerprint)?
            .unwrap_or(log))
    }
}

fn check_temperature(temperature: f64) -> Result<()> {
    let mut errors = ValidationErrors::new();
    if !temperature.is_finite() {
        errors.add("temperature", "temperature must be a number");
    }
    errors.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::fixtures;
    use crate::session::clock::MAX_ELAPSED_SECONDS;
    use crate::storage::MemoryStore;

    fn pending() -> PendingSession {
        fixtures::session(&fixtures::template("Brazil Santos"))
    }

    fn controller(store: &MemoryStore) -> RoastController<'_, MemoryStore> {
        RoastController::with_session(store, pending(), ControllerOptions::default())
    }

    fn tick_n<R: Repository + ?Sized>(c: &mut RoastController<'_, R>, n: u32) {
        for _ in 0..n {
            c.tick();
        }
    }

    #[test]
    fn test_start_consumes_pending_session() {
        let store = MemoryStore::new();
        store.put_pending_session(&pending()).unwrap();

        let c = RoastController::start(&store, ControllerOptions::default()).unwrap();
        assert_eq!(c.session().template_name, "Brazil Santos");
        assert!(store.pending_session().unwrap().is_none());
    }

    #[test]
    fn test_start_without_pending_session() {
        let store = MemoryStore::new();
        let err = RoastController::start(&store, ControllerOptions::default()).unwrap_err();
        assert!(matches!(err, Error::NoPendingSession));
    }

    #[test]
    fn test_tick_advances_elapsed() {
        let store = MemoryStore::new();
        let mut c = controller(&store);
        let snap = c.tick();
        assert_eq!(snap.elapsed, 1);
        tick_n(&mut c, 59);
        assert_eq!(c.snapshot().clock(), "01:00");
    }

    #[test]
    fn test_cap_finishes_with_one_finish_event() {
        let store = MemoryStore::new();
        let mut c = controller(&store);
        tick_n(&mut c, MAX_ELAPSED_SECONDS + 10);

        let snap = c.snapshot();
        assert!(snap.is_finished());
        assert_eq!(snap.elapsed, MAX_ELAPSED_SECONDS);
        let finishes = snap.events.iter().filter(|e| e.kind == EventKind::Finish).count();
        assert_eq!(finishes, 1);
    }

    #[test]
    fn test_finish_is_idempotent() {
        let store = MemoryStore::new();
        let mut c = controller(&store);
        tick_n(&mut c, 30);
        c.finish();
        c.finish();
        tick_n(&mut c, 5);

        let snap = c.snapshot();
        assert_eq!(snap.elapsed, 30);
        assert_eq!(snap.events.len(), 1);
        assert_eq!(snap.events[0].kind, EventKind::Finish);
        assert_eq!(snap.events[0].elapsed, 30);
    }

    #[test]
    fn test_phase_order_enforced() {
        let store = MemoryStore::new();
        let mut c = controller(&store);
        assert!(matches!(
            c.mark_phase(Phase::GoldPoint, None),
            Err(Error::PhaseUnavailable { .. })
        ));
        c.mark_phase(Phase::DryEnd, None).unwrap();
        c.mark_phase(Phase::GoldPoint, None).unwrap();
        assert!(c.mark_phase(Phase::SecondCrackStart, None).is_err());
    }

    #[test]
    fn test_phase_uses_current_temperature() {
        let store = MemoryStore::new();
        let mut c = controller(&store);
        tick_n(&mut c, 200);
        c.set_current_temperature(152.0).unwrap();
        let snap = c.mark_phase(Phase::DryEnd, None).unwrap();

        let event = snap.events.last().unwrap();
        assert_eq!(event.kind, EventKind::DryEnd);
        assert_eq!(event.elapsed, 200);
        assert_eq!(event.temperature, Some(152.0));
    }

    #[test]
    fn test_phase_with_explicit_temperature() {
        let store = MemoryStore::new();
        let mut c = controller(&store);
        c.set_current_temperature(150.0).unwrap();
        let snap = c.mark_phase(Phase::FirstCrackStart, Some(196.0)).unwrap();
        assert_eq!(snap.events.last().unwrap().temperature, Some(196.0));
        assert_eq!(snap.current_temperature, Some(150.0));
    }

    #[test]
    fn test_record_temperature_computes_ror() {
        let store = MemoryStore::new();
        let mut c = controller(&store);
        c.record_temperature(20.0).unwrap();
        tick_n(&mut c, 60);
        let snap = c.record_temperature(40.0).unwrap();

        assert_eq!(snap.events[0].ror, None);
        assert_eq!(snap.events[1].ror, Some(20.0));
        assert_eq!(snap.last_ror, Some(20.0));
        assert_eq!(snap.current_temperature, Some(40.0));
    }

    #[test]
    fn test_pre_ror_captured_at_dry_end() {
        let store = MemoryStore::new();
        let mut c = controller(&store);
        c.record_temperature(100.0).unwrap();
        tick_n(&mut c, 30);
        c.record_temperature(110.0).unwrap();
        c.mark_phase(Phase::DryEnd, None).unwrap();
        tick_n(&mut c, 30);
        let snap = c.record_temperature(115.0).unwrap();

        assert_eq!(snap.pre_ror, Some(20.0));
        assert_eq!(snap.last_ror, Some(10.0));
    }

    #[test]
    fn test_quick_selector_records_sample() {
        let store = MemoryStore::new();
        let mut c = controller(&store);
        assert!(matches!(c.select_units(3), Err(Error::NoBaseSelected)));

        c.select_base(150).unwrap();
        let snap = c.select_units(3).unwrap();
        let event = snap.events.last().unwrap();
        assert_eq!(event.kind, EventKind::TemperatureRecord);
        assert_eq!(event.temperature, Some(153.0));
    }

    #[test]
    fn test_auto_advance_records_ambient_at_start() {
        let store = MemoryStore::new();
        let options = ControllerOptions {
            auto_advance: true,
            ..ControllerOptions::default()
        };
        let mut c = RoastController::with_session(&store, pending(), options);

        let snap = c.snapshot();
        assert_eq!(snap.events.len(), 1);
        assert_eq!(snap.events[0].kind, EventKind::AmbientTemperature);
        assert_eq!(snap.events[0].temperature, Some(24.0));
        assert_eq!(snap.base, Some(20));

        tick_n(&mut c, 60);
        assert_eq!(c.snapshot().base, Some(40));
    }

    #[test]
    fn test_no_ambient_record_without_auto_advance() {
        let store = MemoryStore::new();
        let c = controller(&store);
        assert!(c.events().is_empty());
        assert_eq!(c.snapshot().base, None);
    }

    #[test]
    fn test_actions_refused_after_finish() {
        let store = MemoryStore::new();
        let mut c = controller(&store);
        c.finish();
        assert!(matches!(c.record_temperature(100.0), Err(Error::SessionFinished)));
        assert!(matches!(c.mark_phase(Phase::DryEnd, None), Err(Error::SessionFinished)));
        assert!(matches!(c.select_base(100), Err(Error::SessionFinished)));
        assert!(matches!(
            c.set_note(NoteField::Damper, "open"),
            Err(Error::SessionFinished)
        ));
        assert!(c.snapshot().available_phases.is_empty());
    }

    #[test]
    fn test_non_finite_temperature_rejected() {
        let store = MemoryStore::new();
        let mut c = controller(&store);
        let err = c.record_temperature(f64::NAN).unwrap_err();
        assert!(err.field_errors().is_some());
        assert!(c.events().is_empty());
    }

    #[test]
    fn test_notice_raised_and_dismissed() {
        let store = MemoryStore::new();
        let mut c = controller(&store);
        let first = c.record_temperature(90.0).unwrap().notice.unwrap();
        let second = c.record_temperature(95.0).unwrap().notice.unwrap();
        assert!(second.seq > first.seq);

        // a stale dismissal leaves the newer notice alone
        assert!(c.dismiss_notice(first.seq).notice.is_some());
        assert!(c.dismiss_notice(second.seq).notice.is_none());
    }

    #[test]
    fn test_subscribe_sees_updates() {
        let store = MemoryStore::new();
        let mut c = controller(&store);
        let rx = c.subscribe();
        c.tick();
        c.record_temperature(80.0).unwrap();
        let seen = rx.borrow().clone();
        assert_eq!(seen.elapsed, 1);
        assert_eq!(seen.events.len(), 1);
    }

    #[test]
    fn test_notes_recorded() {
        let store = MemoryStore::new();
        let mut c = controller(&store);
        c.set_note(NoteField::GasPressure, "1.2kPa").unwrap();
        c.set_note(NoteField::MiddlePoint, "95").unwrap();
        let snap = c.snapshot();
        assert_eq!(snap.notes.gas_pressure, "1.2kPa");
        assert_eq!(snap.notes.middle_point, "95");
    }

    #[test]
    fn test_save_requires_finish() {
        let store = MemoryStore::new();
        let c = controller(&store);
        assert!(matches!(c.save(Some(170.0), ""), Err(Error::SessionNotFinished)));
    }

    #[test]
    fn test_save_rejects_bad_discharge() {
        let store = MemoryStore::new();
        let mut c = controller(&store);
        c.finish();
        let err = c.save(Some(0.0), "").unwrap_err();
        assert_eq!(err.field_errors().unwrap()[0].field, "discharge");
    }

    #[test]
    fn test_save_round_trips_through_store() {
        let store = MemoryStore::new();
        let mut c = controller(&store);
        c.record_temperature(20.0).unwrap();
        tick_n(&mut c, 60);
        c.record_temperature(40.0).unwrap();
        c.mark_phase(Phase::FirstCrackStart, None).unwrap();
        tick_n(&mut c, 60);
        c.finish();

        let log = c.save(Some(170.0), " good body ").unwrap();
        assert_eq!(log.total_seconds, 120);
        assert_eq!(log.roast_memo, "good body");
        assert_eq!(log.last_ror, Some(20.0));

        let stored = store.get_log(&log.id).unwrap().unwrap();
        assert_eq!(stored, log);
    }

    #[test]
    fn test_save_twice_is_deduplicated() {
        let store = MemoryStore::new();
        let mut c = controller(&store);
        c.finish();
        let first = c.save(Some(170.0), "memo").unwrap();
        let second = c.save(Some(170.0), "memo").unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(store.list_logs().unwrap().len(), 1);
    }

    #[test]
    fn test_identical_roasts_are_both_saved() {
        let store = MemoryStore::new();
        let mut saved = Vec::new();
        for _ in 0..2 {
            let mut c = controller(&store);
            c.record_temperature(180.0).unwrap();
            tick_n(&mut c, 30);
            c.finish();
            saved.push(c.save(Some(170.0), "batch").unwrap());
        }

        assert_ne!(saved[0].id, saved[1].id);
        assert_ne!(saved[0].roast_id, saved[1].roast_id);
        assert_eq!(store.list_logs().unwrap().len(), 2);
    }

    #[test]
    fn test_identical_roasts_are_both_saved_to_sqlite() {
        let storage = crate::storage::Storage::open_in_memory().unwrap();
        for _ in 0..2 {
            let mut c = RoastController::with_session(&storage, pending(), ControllerOptions::default());
            c.finish();
            c.save(Some(170.0), "batch").unwrap();
        }
        assert_eq!(storage.list_logs().unwrap().len(), 2);
    }
}
