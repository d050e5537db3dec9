//! The live roast console.
//!
//! One loop owns the [`RoastController`] and waits on two sources at once:
//! timer events and operator command lines. Timers only send messages, so
//! every state change happens here.

use std::io::Write;
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::metrics::RoastSummary;
use crate::record::RoastLog;
use crate::session::{ControllerOptions, NoteField, Phase, RoastController, RoastSnapshot};
use crate::storage::Repository;
use crate::timer::{spawn_dismissal, spawn_ticker, TimerEvent, TimerKind, TimerSet};

/// Console command reference.
pub const HELP: &str = "\
commands:
  dry | gold | fc | fce | sc | sce [°C]   mark a phase (temperature optional)
  temp <°C>                               record a temperature sample
  cur <°C>                                set the current temperature
  base <tens>                             select the tens value (0-300)
  unit <digit>                            record base + digit as a sample
  gas | damper | middle <text>            set a roast note
  finish                                  stop the clock
  save <grams|-> [memo]                   save the finished roast
  status                                  show the current state
  help                                    show this text";

/// A parsed console line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Mark a phase, optionally with its temperature.
    Phase(Phase, Option<f64>),
    /// Record a temperature sample.
    Temperature(f64),
    /// Set the current temperature.
    Current(f64),
    /// Select the tens value.
    Base(u16),
    /// Select the units digit.
    Units(u16),
    /// Set a roast note.
    Note(NoteField, String),
    /// Finish the roast.
    Finish,
    /// Save the finished roast.
    Save {
        /// Roasted weight in grams.
        discharge_grams: Option<f64>,
        /// Post-roast memo.
        memo: String,
    },
    /// Print the status line.
    Status,
    /// Print the command reference.
    Help,
}

fn number<T: std::str::FromStr>(command: &str, arg: Option<&str>) -> Result<T> {
    let arg = arg.ok_or_else(|| Error::InvalidCommand(format!("`{command}` needs a number")))?;
    arg.parse()
        .map_err(|_| Error::InvalidCommand(format!("`{command}`: not a number: {arg}")))
}

fn optional_number(command: &str, arg: Option<&str>) -> Result<Option<f64>> {
    match arg {
        None | Some("-") => Ok(None),
        Some(_) => number(command, arg).map(Some),
    }
}

/// Parse one console line. Blank lines yield `None`.
///
/// # Errors
///
/// Returns [`Error::InvalidCommand`] for unknown commands or bad arguments.
pub fn parse_command(line: &str) -> Result<Option<Command>> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let arg = (!rest.is_empty()).then_some(rest);
    let first_arg = rest.split_whitespace().next();

    let phase = |p: Phase| -> Result<Command> {
        Ok(Command::Phase(p, optional_number(word, first_arg)?))
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "" => return Ok(None),
        "dry" => phase(Phase::DryEnd)?,
        "gold" => phase(Phase::GoldPoint)?,
        "fc" => phase(Phase::FirstCrackStart)?,
        "fce" => phase(Phase::FirstCrackEnd)?,
        "sc" => phase(Phase::SecondCrackStart)?,
        "sce" => phase(Phase::SecondCrackEnd)?,
        "temp" => Command::Temperature(number(word, first_arg)?),
        "cur" => Command::Current(number(word, first_arg)?),
        "base" => Command::Base(number(word, first_arg)?),
        "unit" => Command::Units(number(word, first_arg)?),
        "gas" => Command::Note(NoteField::GasPressure, rest.to_string()),
        "damper" => Command::Note(NoteField::Damper, rest.to_string()),
        "middle" => Command::Note(NoteField::MiddlePoint, rest.to_string()),
        "finish" => Command::Finish,
        "save" => {
            let (grams, memo) = match arg.map(|a| a.split_once(char::is_whitespace)) {
                Some(Some((grams, memo))) => (Some(grams), memo.trim().to_string()),
                Some(None) => (arg, String::new()),
                None => {
                    return Err(Error::InvalidCommand(
                        "`save` needs the roasted weight in grams, or `-`".to_string(),
                    ))
                }
            };
            Command::Save {
                discharge_grams: optional_number(word, grams)?,
                memo,
            }
        }
        "status" => Command::Status,
        "help" | "?" => Command::Help,
        other => {
            return Err(Error::InvalidCommand(format!(
                "unknown command `{other}`; type `help` for a list"
            )))
        }
    };
    Ok(Some(command))
}

/// One-line summary of a snapshot.
#[must_use]
pub fn status_line(snapshot: &RoastSnapshot) -> String {
    let mut parts = vec![format!(
        "[{}] {}",
        snapshot.clock(),
        if snapshot.is_finished() { "finished" } else { "roasting" }
    )];
    if let Some(t) = snapshot.current_temperature {
        parts.push(format!("temp {t}°C"));
    }
    if let Some(ror) = snapshot.last_ror {
        parts.push(format!("RoR {ror}"));
    }
    if let Some(base) = snapshot.base {
        parts.push(format!("base {base}"));
    }
    if !snapshot.available_phases.is_empty() {
        let next: Vec<String> = snapshot
            .available_phases
            .iter()
            .map(ToString::to_string)
            .collect();
        parts.push(format!("next: {}", next.join(", ")));
    }
    parts.join(" | ")
}

/// Timing for a console run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleSettings {
    /// Wall-clock time per roast second.
    pub tick_interval: Duration,
    /// How long notices stay up.
    pub notice_timeout: Duration,
    /// Status line cadence in roast seconds; 0 disables it.
    pub status_every_secs: u32,
}

impl ConsoleSettings {
    /// Settings from the loaded configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            tick_interval: config.tick_interval(),
            notice_timeout: config.notice_timeout(),
            status_every_secs: config.timer.status_every_secs,
        }
    }
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

struct Console<'c, 'r, R: Repository + ?Sized, W: Write> {
    controller: &'c mut RoastController<'r, R>,
    out: W,
    settings: ConsoleSettings,
    timers: TimerSet,
    tx: mpsc::Sender<TimerEvent>,
    notice_seq: u64,
}

impl<R: Repository + ?Sized, W: Write> Console<'_, '_, R, W> {
    /// Print a new notice and schedule its dismissal while the clock runs.
    fn follow_notice(&mut self, snapshot: &RoastSnapshot) -> Result<()> {
        let Some(notice) = &snapshot.notice else {
            return Ok(());
        };
        if notice.seq <= self.notice_seq {
            return Ok(());
        }
        self.notice_seq = notice.seq;
        writeln!(self.out, "» {}", notice.message)?;
        if !snapshot.is_finished() {
            self.timers.cancel_kind(TimerKind::NoticeDismissal);
            self.timers.add(spawn_dismissal(
                self.settings.notice_timeout,
                notice.seq,
                self.tx.clone(),
            ));
        }
        Ok(())
    }

    fn stop_timers(&mut self) {
        self.timers.cancel_all();
        debug!("Roast timers cancelled");
    }

    fn on_timer(&mut self, event: TimerEvent) -> Result<()> {
        match event {
            TimerEvent::Tick => {
                let was_finished = self.controller.is_finished();
                let snapshot = self.controller.tick();
                if !was_finished && snapshot.is_finished() {
                    self.stop_timers();
                    writeln!(self.out, "time limit reached")?;
                    self.follow_notice(&snapshot)?;
                    writeln!(self.out, "{}", status_line(&snapshot))?;
                } else if self.settings.status_every_secs > 0
                    && snapshot.elapsed > 0
                    && snapshot.elapsed % self.settings.status_every_secs == 0
                {
                    writeln!(self.out, "{}", status_line(&snapshot))?;
                }
            }
            TimerEvent::DismissNotice(seq) => {
                self.controller.dismiss_notice(seq);
            }
        }
        Ok(())
    }

    /// Apply one command. Returns the saved log when the roast was saved.
    fn on_command(&mut self, command: Command) -> Result<Option<RoastLog>> {
        let snapshot = match command {
            Command::Phase(phase, temperature) => self.controller.mark_phase(phase, temperature)?,
            Command::Temperature(t) => self.controller.record_temperature(t)?,
            Command::Current(t) => {
                let snapshot = self.controller.set_current_temperature(t)?;
                writeln!(self.out, "current temperature {t}°C")?;
                snapshot
            }
            Command::Base(base) => {
                let snapshot = self.controller.select_base(base)?;
                writeln!(self.out, "base {base}")?;
                snapshot
            }
            Command::Units(units) => self.controller.select_units(units)?,
            Command::Note(field, text) => self.controller.set_note(field, text)?,
            Command::Finish => {
                let was_finished = self.controller.is_finished();
                self.stop_timers();
                let snapshot = self.controller.finish();
                if !was_finished {
                    writeln!(self.out, "roast finished at {}", snapshot.clock())?;
                }
                snapshot
            }
            Command::Save {
                discharge_grams,
                memo,
            } => {
                let log = self.controller.save(discharge_grams, &memo)?;
                let summary = RoastSummary::of(&log);
                writeln!(self.out, "saved roast {}", log.id)?;
                if let Some(loss) = summary.weight_loss_percent {
                    writeln!(self.out, "weight loss {loss}%")?;
                }
                if let Some(level) = summary.roast_level {
                    writeln!(self.out, "roast level {level}")?;
                }
                return Ok(Some(log));
            }
            Command::Status => {
                let snapshot = self.controller.snapshot();
                writeln!(self.out, "{}", status_line(&snapshot))?;
                return Ok(None);
            }
            Command::Help => {
                writeln!(self.out, "{HELP}")?;
                return Ok(None);
            }
        };
        self.follow_notice(&snapshot)?;
        Ok(None)
    }

    fn on_line(&mut self, line: &str) -> Result<Option<RoastLog>> {
        let outcome = parse_command(line).and_then(|command| match command {
            Some(command) => self.on_command(command),
            None => Ok(None),
        });
        match outcome {
            Err(e) if e.is_refusal() => {
                writeln!(self.out, "! {e}")?;
                Ok(None)
            }
            other => other,
        }
    }
}

/// Run a roast from `input` until it is saved or the input ends.
///
/// Returns the saved log, or `None` if the input ended first. Every timer is
/// cancelled when the roast finishes and again when the loop exits.
///
/// # Errors
///
/// Returns an error if reading input, writing output or storage fails.
/// Refused operator actions are reported on `out` and do not end the run.
pub async fn run_roast<R, I, W>(
    controller: &mut RoastController<'_, R>,
    input: I,
    out: W,
    settings: ConsoleSettings,
) -> Result<Option<RoastLog>>
where
    R: Repository + ?Sized,
    I: AsyncBufRead + Unpin,
    W: Write,
{
    let (tx, mut rx) = mpsc::channel(64);
    let mut console = Console {
        controller,
        out,
        settings,
        timers: TimerSet::new(),
        tx,
        notice_seq: 0,
    };

    let snapshot = console.controller.snapshot();
    writeln!(
        console.out,
        "roasting {} ({} g); type `help` for commands",
        snapshot.template_name,
        console.controller.session().charge_grams
    )?;
    if !snapshot.is_finished() {
        console
            .timers
            .add(spawn_ticker(settings.tick_interval, console.tx.clone()));
    }
    console.follow_notice(&snapshot)?;
    info!(interval = ?settings.tick_interval, "Roast console started");

    let mut lines = input.lines();
    let result = loop {
        tokio::select! {
            Some(event) = rx.recv() => {
                if let Err(e) = console.on_timer(event) {
                    break Err(e);
                }
            }
            line = lines.next_line() => {
                match line {
                    Ok(Some(line)) => match console.on_line(&line) {
                        Ok(Some(log)) => break Ok(Some(log)),
                        Ok(None) => {}
                        Err(e) => break Err(e),
                    },
                    Ok(None) => {
                        debug!("Console input closed");
                        break Ok(None);
                    }
                    Err(e) => break Err(e.into()),
                }
            }
        }
    };

    console.stop_timers();
    console.out.flush()?;
    result
}

/// Run the pending session in `repo` as a roast.
///
/// The pending session is taken when the roast starts. Unless the roast is
/// saved it is written back, including when the run fails, so the operator
/// can try again.
///
/// # Errors
///
/// Returns [`Error::NoPendingSession`] if there is nothing to roast, or any
/// error from [`run_roast`].
pub async fn roast_pending_session<R, I, W>(
    repo: &R,
    options: ControllerOptions,
    input: I,
    out: W,
    settings: ConsoleSettings,
) -> Result<Option<RoastLog>>
where
    R: Repository + ?Sized,
    I: AsyncBufRead + Unpin,
    W: Write,
{
    let mut controller = RoastController::start(repo, options)?;
    let result = run_roast(&mut controller, input, out, settings).await;
    if !matches!(result, Ok(Some(_))) {
        match repo.put_pending_session(controller.session()) {
            Ok(()) => info!("Roast not saved; pending session restored"),
            Err(e) => warn!(error = %e, "Failed to restore pending session"),
        }
    }
    result
}
