use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::arrivals::ArrivalRecord;
use crate::error::{Error, Result};
use crate::smoothing::{LatLon, PositionSample};

/// One vehicle as the backend reports it. Everything is optional on the wire;
/// `into_sample` decides what is usable.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct VehicleSampleWire {
    #[serde(default)]
    pub vehicle_id: Option<String>,
    #[serde(default)]
    pub trip_id: Option<String>,
    #[serde(default)]
    pub route_id: Option<String>,
    #[serde(default)]
    pub route_color: Option<String>,
    #[serde(default)]
    pub route_badge: Option<String>,
    #[serde(default)]
    pub route_name: Option<String>,
    #[serde(default)]
    pub bus_number: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub bearing: Option<f64>,
}

impl VehicleSampleWire {
    /// Vehicle id, falling back to the trip id.
    pub fn entity_id(&self) -> Option<&str> {
        [&self.vehicle_id, &self.trip_id]
            .into_iter()
            .filter_map(|field| field.as_deref())
            .find(|value| !value.is_empty())
    }

    pub fn into_sample(self) -> Result<(String, PositionSample)> {
        let entity_id = self
            .entity_id()
            .map(str::to_string)
            .ok_or_else(|| Error::InvalidSample {
                entity_id: "<none>".to_string(),
                reason: "no vehicle or trip id".to_string(),
            })?;

        let (lat, lon) = match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => (lat, lon),
            _ => {
                return Err(Error::InvalidSample {
                    entity_id,
                    reason: "missing coordinates".to_string(),
                })
            }
        };
        if !lat.is_finite() || !lon.is_finite() || lat.abs() > 90.0 || lon.abs() > 180.0 {
            return Err(Error::InvalidSample {
                entity_id,
                reason: format!("coordinates out of range: {lat}, {lon}"),
            });
        }

        let bearing = self.bearing.filter(|b| b.is_finite()).unwrap_or(0.0);
        let sample = PositionSample {
            position: LatLon::new(lat, lon),
            bearing,
            route_color: self.route_color,
            route_id: self.route_id,
            route_badge: self.route_badge,
            route_name: self.route_name,
            bus_number: self.bus_number,
        };

        Ok((entity_id, sample))
    }
}

#[derive(Debug, Deserialize)]
struct VehicleFeedWire {
    #[serde(default)]
    vehicles: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct StopArrivalsWire {
    #[serde(default)]
    buses: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct ActiveRoutesWire {
    #[serde(default)]
    routes: Vec<String>,
}

/// Decodes each entry on its own so one malformed entry costs only itself.
fn decode_entries<T: for<'de> Deserialize<'de>>(entries: Vec<Value>, kind: &str) -> Vec<T> {
    entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value(entry) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                debug!(kind, error = %e, "skipping malformed entry");
                None
            }
        })
        .collect()
}

pub fn decode_vehicle_feed(body: &str) -> Result<Vec<VehicleSampleWire>> {
    let feed: VehicleFeedWire = serde_json::from_str(body)?;
    Ok(decode_entries(feed.vehicles, "vehicle"))
}

pub fn decode_stop_arrivals(body: &str) -> Result<Vec<ArrivalRecord>> {
    let stop: StopArrivalsWire = serde_json::from_str(body)?;
    Ok(decode_entries(stop.buses, "arrival"))
}

pub fn decode_active_routes(body: &str) -> Result<Vec<String>> {
    let active: ActiveRoutesWire = serde_json::from_str(body)?;
    Ok(active.routes)
}
