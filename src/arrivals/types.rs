use serde::{Deserialize, Serialize};

use super::status::StatusColor;

fn unknown_bus() -> String {
    "Unknown".to_string()
}

/// Scheduled slots around the predicted arrival at this stop.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleContext {
    #[serde(default)]
    pub past: Option<String>,
    #[serde(default)]
    pub current: Option<String>,
    #[serde(default)]
    pub next: Option<String>,
}

/// One bus on a stop's arrival board, as the feed reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrivalRecord {
    #[serde(default)]
    pub route_id: Option<String>,
    #[serde(default)]
    pub route_badge: Option<String>,
    #[serde(default)]
    pub route_name: Option<String>,
    #[serde(default)]
    pub trip_id: Option<String>,
    #[serde(default = "unknown_bus")]
    pub bus_number: String,
    #[serde(default)]
    pub eta_min: Option<i64>,
    #[serde(default)]
    pub delta_sec: Option<f64>,
    #[serde(default)]
    pub color: Option<StatusColor>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub route_color: Option<String>,
    #[serde(default)]
    pub scheduled_time: Option<String>,
    #[serde(default)]
    pub schedule_context: Option<ScheduleContext>,
    /// ETA of the following bus on the same route, when the backend folded
    /// one in.
    #[serde(default)]
    pub also_in_min: Option<i64>,
}

impl ArrivalRecord {
    pub fn new(bus_number: impl Into<String>) -> Self {
        Self {
            route_id: None,
            route_badge: None,
            route_name: None,
            trip_id: None,
            bus_number: bus_number.into(),
            eta_min: None,
            delta_sec: None,
            color: None,
            status: None,
            route_color: None,
            scheduled_time: None,
            schedule_context: None,
            also_in_min: None,
        }
    }

    /// A missing ETA counts as zero.
    pub fn is_arriving(&self) -> bool {
        self.eta_min.unwrap_or(0) <= 0
    }

    /// Reported colour, else one derived from the delay, else on time.
    pub fn effective_color(&self) -> StatusColor {
        match (&self.color, self.delta_sec) {
            (Some(color), _) => color.clone(),
            (None, Some(delta)) if delta.is_finite() => StatusColor::from_delay_secs(delta),
            _ => StatusColor::Green,
        }
    }
}

/// An arrival after reconciliation against the previous board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledArrival {
    #[serde(flatten)]
    pub record: ArrivalRecord,
    pub route_key: String,
    pub sticky_arrived: bool,
    /// Epoch milliseconds of the first poll that saw this route arriving.
    pub arrived_at: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "minutes", rename_all = "snake_case")]
pub enum ArrivalDisplay {
    Arrived,
    Arriving,
    Minutes(i64),
}

impl ReconciledArrival {
    pub fn display(&self) -> ArrivalDisplay {
        if self.sticky_arrived {
            ArrivalDisplay::Arrived
        } else if self.record.is_arriving() {
            ArrivalDisplay::Arriving
        } else {
            ArrivalDisplay::Minutes(self.record.eta_min.unwrap_or(0))
        }
    }
}
