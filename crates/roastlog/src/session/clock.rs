//! Elapsed-time clock for a roast session.

/// Highest elapsed time a session can show (99:59).
pub const MAX_ELAPSED_SECONDS: u32 = 5999;

/// Lifecycle of a roast clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockState {
    /// Counting.
    #[default]
    Running,
    /// Stopped for good.
    Finished,
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The clock advanced to this many seconds.
    Advanced(u32),
    /// The clock hit the cap and finished.
    CapReached,
    /// The clock was already finished.
    Ignored,
}

/// Counts elapsed seconds while a roast is running.
///
/// Elapsed time never decreases and never exceeds [`MAX_ELAPSED_SECONDS`].
/// `Finished` is terminal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoastClock {
    elapsed: u32,
    state: ClockState,
}

impl RoastClock {
    /// A running clock at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds since the roast started.
    #[must_use]
    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> ClockState {
        self.state
    }

    /// Whether the clock has stopped for good.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state == ClockState::Finished
    }

    /// Advance by one second.
    ///
    /// A tick at the cap finishes the clock instead of advancing it.
    pub fn tick(&mut self) -> TickOutcome {
        match self.state {
            ClockState::Finished => TickOutcome::Ignored,
            ClockState::Running if self.elapsed >= MAX_ELAPSED_SECONDS => {
                self.state = ClockState::Finished;
                TickOutcome::CapReached
            }
            ClockState::Running => {
                self.elapsed += 1;
                TickOutcome::Advanced(self.elapsed)
            }
        }
    }

    /// Stop the clock. Returns `true` only for the call that stopped it.
    pub fn finish(&mut self) -> bool {
        if self.is_finished() {
            return false;
        }
        self.state = ClockState::Finished;
        true
    }
}

/// Format seconds as `mm:ss`.
#[must_use]
pub fn format_clock(total_seconds: u32) -> String {
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}
