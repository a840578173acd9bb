//! Geographic input values.

use serde::{Deserialize, Serialize};

/// Largest latitude representable in the spherical Web Mercator projection.
pub const MAX_MERCATOR_LATITUDE: f64 = 85.051_128_779_806_59;

/// A point on the globe given in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    lon: f64,
    lat: f64,
}

impl GeoPoint {
    /// Creates a new point from longitude and latitude in degrees.
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Longitude in degrees.
    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Latitude in degrees.
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Returns a copy of the point with latitude clamped into the Mercator-valid range.
    pub fn clamped(&self) -> Self {
        Self {
            lon: self.lon,
            lat: self
                .lat
                .clamp(-MAX_MERCATOR_LATITUDE, MAX_MERCATOR_LATITUDE),
        }
    }
}

/// A named point drawn on top of the route.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    /// Position of the marker.
    pub position: GeoPoint,
    /// Text drawn next to the marker. Empty label means no text.
    pub label: String,
}

impl Marker {
    /// Creates a marker at the given position.
    pub fn new(position: GeoPoint, label: impl Into<String>) -> Self {
        Self {
            position,
            label: label.into(),
        }
    }

    /// Returns true if the marker has text to render.
    pub fn has_label(&self) -> bool {
        !self.label.trim().is_empty()
    }
}
