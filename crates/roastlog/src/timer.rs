//! Cancellable timers driving a live roast.
//!
//! Timer tasks never touch roast state. They only send [`TimerEvent`]s over a
//! channel to the loop that owns the controller. Cancelling a handle sets a
//! shared flag the task checks before every send and aborts the task, so once
//! `cancel` returns no new event is produced by that timer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// Messages produced by timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// One roast second has passed.
    Tick,
    /// The notice with this sequence number should be dismissed.
    DismissNotice(u64),
}

/// The kind of timer behind a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Recurring roast clock tick.
    Ticker,
    /// One-shot notice dismissal.
    NoticeDismissal,
}

impl std::fmt::Display for TimerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ticker => write!(f, "ticker"),
            Self::NoticeDismissal => write!(f, "notice_dismissal"),
        }
    }
}

/// A handle to a running timer task.
///
/// Clones share the same cancel flag, so cancelling any clone cancels the
/// timer.
#[derive(Debug, Clone)]
pub struct TimerHandle {
    kind: TimerKind,
    cancelled: Arc<AtomicBool>,
    task: Option<Arc<JoinHandle<()>>>,
}

impl TimerHandle {
    /// Create a handle that is not attached to a task.
    #[must_use]
    pub fn new(kind: TimerKind) -> Self {
        Self {
            kind,
            cancelled: Arc::new(AtomicBool::new(false)),
            task: None,
        }
    }

    fn attach(mut self, task: JoinHandle<()>) -> Self {
        self.task = Some(Arc::new(task));
        self
    }

    /// The timer kind.
    #[must_use]
    pub fn kind(&self) -> TimerKind {
        self.kind
    }

    /// Cancel the timer. Safe to call more than once.
    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::SeqCst) {
            debug!(timer = %self.kind, "Timer cancelled");
        }
        if let Some(task) = &self.task {
            task.abort();
        }
    }

    /// Check if the timer has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Check if the timer is still live: not cancelled and its task (if any)
    /// has not ended.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.is_cancelled() && self.task.as_ref().map_or(true, |t| !t.is_finished())
    }
}

/// Spawn a recurring tick timer.
///
/// The first tick is sent one full `interval` after spawning.
#[must_use]
pub fn spawn_ticker(interval: Duration, tx: mpsc::Sender<TimerEvent>) -> TimerHandle {
    let handle = TimerHandle::new(TimerKind::Ticker);
    let cancelled = Arc::clone(&handle.cancelled);

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if cancelled.load(Ordering::SeqCst) {
                break;
            }
            trace!("tick");
            if tx.send(TimerEvent::Tick).await.is_err() {
                debug!("Tick channel closed");
                break;
            }
        }
    });

    debug!(?interval, "Ticker started");
    handle.attach(task)
}

/// Spawn a one-shot timer that asks for a notice to be dismissed.
#[must_use]
pub fn spawn_dismissal(delay: Duration, seq: u64, tx: mpsc::Sender<TimerEvent>) -> TimerHandle {
    let handle = TimerHandle::new(TimerKind::NoticeDismissal);
    let cancelled = Arc::clone(&handle.cancelled);

    let task = tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        if !cancelled.load(Ordering::SeqCst)
            && tx.send(TimerEvent::DismissNotice(seq)).await.is_err()
        {
            debug!(seq, "Dismissal channel closed");
        }
    });

    handle.attach(task)
}

/// The timers belonging to one roast, cancelled together.
#[derive(Debug, Default)]
pub struct TimerSet {
    handles: Vec<TimerHandle>,
}

impl TimerSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a timer. Handles that have already ended are dropped.
    pub fn add(&mut self, handle: TimerHandle) {
        self.handles.retain(TimerHandle::is_active);
        self.handles.push(handle);
    }

    /// Cancel every tracked timer.
    pub fn cancel_all(&mut self) {
        for handle in &self.handles {
            handle.cancel();
        }
        self.handles.clear();
    }

    /// Cancel tracked timers of one kind.
    pub fn cancel_kind(&mut self, kind: TimerKind) {
        for handle in self.handles.iter().filter(|h| h.kind() == kind) {
            handle.cancel();
        }
        self.handles.retain(|h| h.kind() != kind);
    }

    /// Number of tracked timers.
    #[must_use]
    pub fn count(&self) -> usize {
        self.handles.len()
    }

    /// Number of tracked timers that are still live.
    #[must_use]
    pub fn active(&self) -> usize {
        self.handles.iter().filter(|h| h.is_active()).count()
    }

    /// Check if any tracked timer is still live.
    #[must_use]
    pub fn any_active(&self) -> bool {
        self.handles.iter().any(TimerHandle::is_active)
    }
}

impl Drop for TimerSet {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_kind_display() {
        assert_eq!(TimerKind::Ticker.to_string(), "ticker");
        assert_eq!(TimerKind::NoticeDismissal.to_string(), "notice_dismissal");
    }

    #[test]
    fn test_handle_cancel_is_idempotent() {
        let handle = TimerHandle::new(TimerKind::Ticker);
        assert!(!handle.is_cancelled());
        handle.cancel();
        handle.cancel();
        assert!(handle.is_cancelled());
        assert!(!handle.is_active());
    }

    #[test]
    fn test_handle_clone_shares_flag() {
        let h1 = TimerHandle::new(TimerKind::Ticker);
        let h2 = h1.clone();
        h1.cancel();
        assert!(h2.is_cancelled());
    }

    #[tokio::test]
    async fn test_ticker_sends_ticks() {
        let (tx, mut rx) = mpsc::channel(16);
        let handle = spawn_ticker(Duration::from_millis(5), tx);

        assert_eq!(rx.recv().await, Some(TimerEvent::Tick));
        assert_eq!(rx.recv().await, Some(TimerEvent::Tick));
        handle.cancel();
    }

    #[tokio::test]
    async fn test_ticker_stops_after_cancel() {
        let (tx, mut rx) = mpsc::channel(16);
        let handle = spawn_ticker(Duration::from_millis(5), tx);
        rx.recv().await;
        handle.cancel();

        // drain anything sent before the cancel landed
        while rx.try_recv().is_ok() {}
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_dismissal_fires_once() {
        let (tx, mut rx) = mpsc::channel(4);
        let _handle = spawn_dismissal(Duration::from_millis(5), 7, tx);
        assert_eq!(rx.recv().await, Some(TimerEvent::DismissNotice(7)));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_dismissal_ends_when_receiver_gone() {
        let (tx, rx) = mpsc::channel(4);
        drop(rx);
        let handle = spawn_dismissal(Duration::from_millis(1), 3, tx);
        for _ in 0..100 {
            if !handle.is_active() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(!handle.is_active());
        assert!(!handle.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_dismissal_never_fires() {
        let (tx, mut rx) = mpsc::channel(4);
        let handle = spawn_dismissal(Duration::from_millis(20), 1, tx);
        handle.cancel();
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_timer_set_cancel_all() {
        let (tx, _rx) = mpsc::channel(16);
        let mut set = TimerSet::new();
        let ticker = spawn_ticker(Duration::from_millis(5), tx.clone());
        let dismissal = spawn_dismissal(Duration::from_secs(60), 1, tx);
        set.add(ticker.clone());
        set.add(dismissal.clone());
        assert_eq!(set.count(), 2);
        assert!(set.any_active());

        set.cancel_all();
        assert!(ticker.is_cancelled());
        assert!(dismissal.is_cancelled());
        assert!(!set.any_active());
    }

    #[tokio::test]
    async fn test_timer_set_cancel_kind() {
        let (tx, _rx) = mpsc::channel(16);
        let mut set = TimerSet::new();
        let ticker = spawn_ticker(Duration::from_millis(5), tx.clone());
        let dismissal = spawn_dismissal(Duration::from_secs(60), 1, tx);
        set.add(ticker.clone());
        set.add(dismissal.clone());

        set.cancel_kind(TimerKind::NoticeDismissal);
        assert!(dismissal.is_cancelled());
        assert!(!ticker.is_cancelled());
        assert_eq!(set.count(), 1);
        set.cancel_all();
    }
}
