//! Reviewing saved roasts.

use serde::Serialize;
use tracing::{debug, info};

use crate::error::Result;
use crate::metrics::{chart_series, ChartPoint, RoastSummary};
use crate::record::RoastLog;
use crate::storage::Repository;

/// A stored log with its derived numbers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogView {
    /// The stored log.
    pub log: RoastLog,
    /// Summary metrics.
    pub summary: RoastSummary,
    /// Chart points.
    pub chart: Vec<ChartPoint>,
}

impl LogView {
    /// Derive the view of a log.
    #[must_use]
    pub fn new(log: RoastLog) -> Self {
        let summary = RoastSummary::of(&log);
        let chart = chart_series(&log.events);
        Self {
            log,
            summary,
            chart,
        }
    }
}

/// One line of the log list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogListing {
    /// Log id.
    pub id: String,
    /// Bean template name.
    pub template_name: String,
    /// When the roast was saved.
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// Total time as `mm:ss`.
    pub total_time: String,
    /// Weight loss in percent.
    pub weight_loss_percent: Option<f64>,
}

/// Read-side access to saved roasts.
#[derive(Debug)]
pub struct LogViewer<'r, R: Repository + ?Sized> {
    repo: &'r R,
}

impl<'r, R: Repository + ?Sized> LogViewer<'r, R> {
    /// A viewer over `repo`.
    #[must_use]
    pub fn new(repo: &'r R) -> Self {
        Self { repo }
    }

    /// Saved roasts, newest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub fn list(&self) -> Result<Vec<LogListing>> {
        let mut logs = self.repo.list_logs()?;
        logs.reverse();
        Ok(logs
            .into_iter()
            .map(|log| {
                let summary = RoastSummary::of(&log);
                LogListing {
                    id: log.id,
                    template_name: log.session.template_name,
                    created_at: log.created_at,
                    total_time: summary.total_time,
                    weight_loss_percent: summary.weight_loss_percent,
                }
            })
            .collect())
    }

    /// Open a log. `None` means the record was not found.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub fn open(&self, id: &str) -> Result<Option<LogView>> {
        let view = self.repo.get_log(id)?.map(LogView::new);
        if view.is_none() {
            debug!(id, "Roast log not found");
        }
        Ok(view)
    }

    /// Delete a log. Returns `true` if it existed.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub fn delete(&self, id: &str) -> Result<bool> {
        let deleted = self.repo.delete_log(id)?;
        if deleted {
            info!(id, "Roast log removed");
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::RoastLevel;
    use crate::record::fixtures;
    use crate::storage::MemoryStore;

    fn store_with_log() -> (MemoryStore, RoastLog) {
        let store = MemoryStore::new();
        let log = fixtures::log(fixtures::session(&fixtures::template("Honduras")));
        store.put_log(&log).unwrap();
        (store, log)
    }

    #[test]
    fn test_open_found() {
        let (store, log) = store_with_log();
        let view = LogViewer::new(&store).open(&log.id).unwrap().unwrap();
        assert_eq!(view.log, log);
        assert_eq!(view.summary.roast_level, Some(RoastLevel::Medium));
        assert_eq!(view.chart.len(), 4);
    }

    #[test]
    fn test_open_not_found() {
        let store = MemoryStore::new();
        assert!(LogViewer::new(&store).open("missing").unwrap().is_none());
    }

    #[test]
    fn test_list_newest_first() {
        let (store, first) = store_with_log();
        let mut second = fixtures::log(fixtures::session(&fixtures::template("Peru")));
        second.roast_memo = "darker".to_string();
        let second = second.sealed().unwrap();
        store.put_log(&second).unwrap();

        let ids: Vec<_> = LogViewer::new(&store)
            .list()
            .unwrap()
            .into_iter()
            .map(|l| l.id)
            .collect();
        assert_eq!(ids, [second.id, first.id]);
    }

    #[test]
    fn test_delete() {
        let (store, log) = store_with_log();
        let viewer = LogViewer::new(&store);
        assert!(viewer.delete(&log.id).unwrap());
        assert!(viewer.open(&log.id).unwrap().is_none());
        assert!(!viewer.delete(&log.id).unwrap());
    }
}
