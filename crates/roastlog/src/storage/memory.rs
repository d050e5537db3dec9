//! In-memory repository used in tests and dry runs.

use std::cell::RefCell;

use crate::error::Result;
use crate::record::{PendingSession, RoastLog, Template};

use super::Repository;

#[derive(Debug, Default)]
struct MemoryState {
    templates: Vec<Template>,
    pending: Option<PendingSession>,
    logs: Vec<RoastLog>,
}

/// A [`Repository`] that keeps everything in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RefCell<MemoryState>,
}

impl MemoryStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Repository for MemoryStore {
    fn put_template(&self, template: &Template) -> Result<()> {
        self.state.borrow_mut().templates.push(template.clone());
        Ok(())
    }

    fn get_template(&self, id: &str) -> Result<Option<Template>> {
        Ok(self
            .state
            .borrow()
            .templates
            .iter()
            .find(|t| t.id == id)
            .cloned())
    }

    fn list_templates(&self) -> Result<Vec<Template>> {
        Ok(self.state.borrow().templates.clone())
    }

    fn put_pending_session(&self, session: &PendingSession) -> Result<()> {
        self.state.borrow_mut().pending = Some(session.clone());
        Ok(())
    }

    fn pending_session(&self) -> Result<Option<PendingSession>> {
        Ok(self.state.borrow().pending.clone())
    }

    fn clear_pending_session(&self) -> Result<bool> {
        Ok(self.state.borrow_mut().pending.take().is_some())
    }

    fn put_log(&self, log: &RoastLog) -> Result<bool> {
        let mut state = self.state.borrow_mut();
        if state.logs.iter().any(|l| l.fingerprint == log.fingerprint) {
            return Ok(false);
        }
        state.logs.push(log.clone());
        Ok(true)
    }

    fn get_log(&self, id: &str) -> Result<Option<RoastLog>> {
        Ok(self.state.borrow().logs.iter().find(|l| l.id == id).cloned())
    }

    fn get_log_by_fingerprint(&self, fingerprint: &str) -> Result<Option<RoastLog>> {
        Ok(self
            .state
            .borrow()
            .logs
            .iter()
            .find(|l| l.fingerprint == fingerprint)
            .cloned())
    }

    fn list_logs(&self) -> Result<Vec<RoastLog>> {
        Ok(self.state.borrow().logs.clone())
    }

    fn delete_log(&self, id: &str) -> Result<bool> {
        let mut state = self.state.borrow_mut();
        let before = state.logs.len();
        state.logs.retain(|l| l.id != id);
        Ok(state.logs.len() < before)
    }
}
