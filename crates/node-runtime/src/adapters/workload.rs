//! # Workloads
//!
//! The bootstrap sequence runs exactly one workload, selected by
//! `WorkloadKind` from a `WorkloadSet`.

use crate::container::WorkloadKind;
use crate::ports::ApplicationWorkload;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

/// Workloads available to the sequencer, keyed by kind.
#[derive(Clone, Default)]
pub struct WorkloadSet {
    workloads: HashMap<WorkloadKind, Arc<dyn ApplicationWorkload>>,
}

impl WorkloadSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set with a `LoggingWorkload` for every kind except `None`.
    pub fn logging() -> Self {
        [
            WorkloadKind::HttpClient,
            WorkloadKind::HttpGet,
            WorkloadKind::DumbHttpServer,
            WorkloadKind::HttpServer,
        ]
        .into_iter()
        .fold(Self::new(), |set, kind| {
            set.with(kind, Arc::new(LoggingWorkload::new(kind.as_str())))
        })
    }

    #[must_use]
    pub fn with(mut self, kind: WorkloadKind, workload: Arc<dyn ApplicationWorkload>) -> Self {
        self.register(kind, workload);
        self
    }

    /// Register `workload` for `kind`, replacing any previous one.
    pub fn register(&mut self, kind: WorkloadKind, workload: Arc<dyn ApplicationWorkload>) {
        self.workloads.insert(kind, workload);
    }

    pub fn get(&self, kind: WorkloadKind) -> Option<Arc<dyn ApplicationWorkload>> {
        self.workloads.get(&kind).cloned()
    }

    pub fn len(&self) -> usize {
        self.workloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workloads.is_empty()
    }
}

/// Placeholder workload that logs and counts its runs.
pub struct LoggingWorkload {
    name: String,
    runs: AtomicU64,
}

impl LoggingWorkload {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            runs: AtomicU64::new(0),
        }
    }

    pub fn runs(&self) -> u64 {
        self.runs.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ApplicationWorkload for LoggingWorkload {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self) {
        self.runs.fetch_add(1, Ordering::Relaxed);
        info!(workload = %self.name, "[workload] Running");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_logging_set_covers_every_kind_but_none() {
        let set = WorkloadSet::logging();
        assert_eq!(set.len(), 4);
        assert!(set.get(WorkloadKind::None).is_none());

        let server = set.get(WorkloadKind::HttpServer).unwrap();
        assert_eq!(server.name(), "http_server");
        server.run().await;
    }

    #[tokio::test]
    async fn test_register_replaces() {
        let first = Arc::new(LoggingWorkload::new("first"));
        let second = Arc::new(LoggingWorkload::new("second"));
        let set = WorkloadSet::new()
            .with(WorkloadKind::HttpGet, first.clone())
            .with(WorkloadKind::HttpGet, second.clone());

        set.get(WorkloadKind::HttpGet).unwrap().run().await;
        assert_eq!(first.runs(), 0);
        assert_eq!(second.runs(), 1);
    }
}
