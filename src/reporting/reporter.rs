use crate::reporting::model::Finding;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::mpsc::UnboundedSender;

#[derive(Default)]
struct ReporterState {
    findings: Vec<Finding>,
    log: Vec<String>,
    seen: HashSet<(String, String)>,
}

/// Collects findings and the append-only progress log. Shared between probe
/// tasks behind an `Arc`; lines are forwarded to the progress sink in the
/// order they are appended.
#[derive(Default)]
pub struct Reporter {
    state: Mutex<ReporterState>,
    sink: Option<UnboundedSender<String>>,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sink(sink: UnboundedSender<String>) -> Self {
        Self {
            state: Mutex::new(ReporterState::default()),
            sink: Some(sink),
        }
    }

    fn state(&self) -> MutexGuard<'_, ReporterState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn log(&self, line: impl Into<String>) {
        let line = line.into();
        tracing::debug!(target: "xsscout::progress", "{}", line);

        let mut state = self.state();
        if let Some(sink) = &self.sink {
            // Receiver gone means nobody is watching; the log still keeps it
            let _ = sink.send(line.clone());
        }
        state.log.push(line);
    }

    /// Record a finding. At most one per (url, parameter); later ones are
    /// dropped and `false` is returned.
    pub fn add(&self, finding: Finding) -> bool {
        let mut state = self.state();
        if !state.seen.insert(finding.key()) {
            return false;
        }
        state.findings.push(finding);
        true
    }

    pub fn findings(&self) -> Vec<Finding> {
        self.state().findings.clone()
    }

    pub fn log_lines(&self) -> Vec<String> {
        self.state().log.clone()
    }

    /// Drain findings and log, leaving the reporter empty
    pub fn take(&self) -> (Vec<Finding>, Vec<String>) {
        let mut state = self.state();
        state.seen.clear();
        (
            std::mem::take(&mut state.findings),
            std::mem::take(&mut state.log),
        )
    }
}
