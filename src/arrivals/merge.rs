use std::collections::{HashMap, HashSet};
use std::time::Duration;

use tracing::trace;

use super::key::route_key;
use super::types::{ArrivalRecord, ReconciledArrival};

pub const DEFAULT_RETENTION_WINDOW: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    /// How long a bus may stay on the board as "Arrived" after it was first
    /// seen arriving.
    pub window: Duration,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            window: DEFAULT_RETENTION_WINDOW,
        }
    }
}

impl RetentionPolicy {
    pub fn new(window: Duration) -> Self {
        Self { window }
    }

    pub fn is_expired(&self, arrived_at_ms: u64, now_ms: u64) -> bool {
        u128::from(now_ms.saturating_sub(arrived_at_ms)) > self.window.as_millis()
    }
}

/// Reconciles a fresh arrival snapshot against the previous board.
///
/// Incoming records come first, stamped with the time their route was first
/// seen arriving. Previous records that were arriving (or already sticky) and
/// whose route is absent from the snapshot follow, pinned at "Arrived" until
/// the retention window runs out. Records with no resolvable route key are
/// dropped.
pub fn merge(
    previous: &[ReconciledArrival],
    incoming: &[ArrivalRecord],
    now_ms: u64,
    policy: &RetentionPolicy,
) -> Vec<ReconciledArrival> {
    let keyed_previous: Vec<(&str, &ReconciledArrival)> = previous
        .iter()
        .filter_map(|prev| route_key(&prev.record).map(|key| (key, prev)))
        .collect();

    let mut first_previous: HashMap<&str, &ReconciledArrival> = HashMap::new();
    for &(key, prev) in &keyed_previous {
        first_previous.entry(key).or_insert(prev);
    }

    let mut merged = Vec::with_capacity(incoming.len() + keyed_previous.len());
    let mut incoming_keys: HashSet<&str> = HashSet::new();

    for record in incoming {
        let Some(key) = route_key(record) else {
            trace!(bus = %record.bus_number, "dropping arrival with no route identity");
            continue;
        };
        incoming_keys.insert(key);

        let arrived_at = if record.is_arriving() {
            first_previous
                .get(key)
                .and_then(|prev| prev.arrived_at)
                .or(Some(now_ms))
        } else {
            None
        };

        merged.push(ReconciledArrival {
            record: record.clone(),
            route_key: key.to_string(),
            sticky_arrived: false,
            arrived_at,
        });
    }

    for (key, prev) in keyed_previous {
        if !prev.sticky_arrived && !prev.record.is_arriving() {
            continue;
        }
        // Any fresh record for the route wins: a live ETA means it is still
        // en route, a zero ETA means the feed already shows it.
        if incoming_keys.contains(key) {
            continue;
        }
        let arrived_at = prev.arrived_at.unwrap_or(now_ms);
        if policy.is_expired(arrived_at, now_ms) {
            trace!(route_key = key, arrived_at, "sticky arrival expired");
            continue;
        }

        let mut record = prev.record.clone();
        record.eta_min = Some(0);
        merged.push(ReconciledArrival {
            record,
            route_key: key.to_string(),
            sticky_arrived: true,
            arrived_at: Some(arrived_at),
        });
    }

    merged
}
