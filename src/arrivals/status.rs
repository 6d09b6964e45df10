use serde::{Deserialize, Serialize};
use std::fmt;

const EARLY_THRESHOLD_SECS: f64 = -60.0;
const ON_TIME_THRESHOLD_SECS: f64 = 120.0;
const LATE_THRESHOLD_SECS: f64 = 300.0;

/// Schedule adherence colour reported with each arrival.
///
/// `Black` means the feed no longer tracks the trip against its schedule
/// while the vehicle is still reported en route. It is its own status and
/// must not be folded into `Red`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StatusColor {
    Green,
    Blue,
    Orange,
    Red,
    Black,
    Other(String),
}

impl StatusColor {
    /// Classifies a lateness delta (predicted minus scheduled, in seconds).
    pub fn from_delay_secs(delta_secs: f64) -> Self {
        if delta_secs < EARLY_THRESHOLD_SECS {
            StatusColor::Blue
        } else if delta_secs <= ON_TIME_THRESHOLD_SECS {
            StatusColor::Green
        } else if delta_secs <= LATE_THRESHOLD_SECS {
            StatusColor::Orange
        } else {
            StatusColor::Red
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            StatusColor::Green => "Green",
            StatusColor::Blue => "Blue",
            StatusColor::Orange => "Orange",
            StatusColor::Red => "Red",
            StatusColor::Black => "Black",
            StatusColor::Other(raw) => raw,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatusColor::Green => "On Time",
            StatusColor::Blue => "Early",
            StatusColor::Orange => "Late",
            StatusColor::Red => "Very Late",
            StatusColor::Black => "Off Schedule",
            StatusColor::Other(_) => "Unknown",
        }
    }
}

impl From<String> for StatusColor {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "Green" => StatusColor::Green,
            "Blue" => StatusColor::Blue,
            "Orange" => StatusColor::Orange,
            "Red" => StatusColor::Red,
            "Black" => StatusColor::Black,
            _ => StatusColor::Other(raw),
        }
    }
}

impl From<StatusColor> for String {
    fn from(color: StatusColor) -> Self {
        match color {
            StatusColor::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for StatusColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
