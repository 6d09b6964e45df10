use serde::{Deserialize, Serialize};

/// Metres per degree of latitude, also the equatorial metres per degree of
/// longitude before the cosine correction.
pub const METERS_PER_DEGREE: f64 = 111_320.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }

    /// Point `fraction` of the way from `self` to `other`, per axis.
    pub fn lerp(self, other: LatLon, fraction: f64) -> LatLon {
        LatLon {
            lat: self.lat + (other.lat - self.lat) * fraction,
            lon: self.lon + (other.lon - self.lon) * fraction,
        }
    }
}

/// Planar distance in metres using an equirectangular projection around the
/// mean latitude. Good to well under a metre at city scale.
pub fn equirectangular_distance(a: LatLon, b: LatLon) -> f64 {
    let mean_lat = ((a.lat + b.lat) / 2.0).to_radians();
    let dy = (b.lat - a.lat) * METERS_PER_DEGREE;
    let dx = (b.lon - a.lon) * METERS_PER_DEGREE * mean_lat.cos();

    dx.hypot(dy)
}

/// Cubic smoothstep on `t`, clamped to `[0, 1]` first.
pub fn smoothstep(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}
