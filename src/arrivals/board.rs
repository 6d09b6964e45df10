use super::merge::{merge, RetentionPolicy};
use super::types::{ArrivalRecord, ReconciledArrival};

/// The reconciled arrival board for one selected stop. Dropped with the
/// selection, so nothing leaks between stops.
#[derive(Debug, Clone)]
pub struct ArrivalBoard {
    stop_id: String,
    policy: RetentionPolicy,
    records: Vec<ReconciledArrival>,
    last_updated_ms: Option<u64>,
}

impl ArrivalBoard {
    pub fn new(stop_id: impl Into<String>, policy: RetentionPolicy) -> Self {
        Self {
            stop_id: stop_id.into(),
            policy,
            records: Vec::new(),
            last_updated_ms: None,
        }
    }

    pub fn stop_id(&self) -> &str {
        &self.stop_id
    }

    pub fn apply(&mut self, incoming: &[ArrivalRecord], now_ms: u64) -> &[ReconciledArrival] {
        self.records = merge(&self.records, incoming, now_ms, &self.policy);
        self.last_updated_ms = Some(now_ms);
        &self.records
    }

    pub fn records(&self) -> &[ReconciledArrival] {
        &self.records
    }

    pub fn last_updated_ms(&self) -> Option<u64> {
        self.last_updated_ms
    }

    pub fn sticky_count(&self) -> usize {
        self.records.iter().filter(|r| r.sticky_arrived).count()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
