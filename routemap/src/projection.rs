//! Spherical Web Mercator projection between geographic and global pixel coordinates.
//!
//! Global pixel coordinates start at the top-left corner of the world (180°W,
//! 85.05°N) and grow to the right and down. At zoom level `z` the world is
//! `256 * 2^z` pixels wide and high.

use std::f64::consts::PI;

use crate::geo::GeoPoint;

/// Width and height of one tile in pixels.
pub const TILE_SIZE: u32 = 256;

/// Position in global pixel space at some zoom level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelPoint {
    /// Horizontal pixel coordinate.
    pub x: f64,
    /// Vertical pixel coordinate, growing southwards.
    pub y: f64,
}

impl PixelPoint {
    /// Creates a new pixel point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned bounding box in pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelBounds {
    /// Smallest x.
    pub x_min: f64,
    /// Smallest y.
    pub y_min: f64,
    /// Largest x.
    pub x_max: f64,
    /// Largest y.
    pub y_max: f64,
}

impl PixelBounds {
    /// Bounding box of the given points, or `None` if there are none.
    pub fn from_points(points: impl IntoIterator<Item = PixelPoint>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let init = Self {
            x_min: first.x,
            y_min: first.y,
            x_max: first.x,
            y_max: first.y,
        };

        Some(iter.fold(init, |acc, p| Self {
            x_min: acc.x_min.min(p.x),
            y_min: acc.y_min.min(p.y),
            x_max: acc.x_max.max(p.x),
            y_max: acc.y_max.max(p.y),
        }))
    }

    /// Width of the box.
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    /// Height of the box.
    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    /// Center of the box.
    pub fn center(&self) -> PixelPoint {
        PixelPoint::new(
            (self.x_min + self.x_max) / 2.0,
            (self.y_min + self.y_max) / 2.0,
        )
    }
}

/// Size of the whole world in pixels at the given zoom.
pub fn world_size(zoom: u8) -> f64 {
    TILE_SIZE as f64 * 2f64.powi(zoom as i32)
}

/// Projects a geographic point into global pixel space.
///
/// Latitudes outside the Mercator range are clamped to it, so a single polar
/// point pins to the map edge instead of failing the whole route.
pub fn to_pixel(point: GeoPoint, zoom: u8) -> PixelPoint {
    let point = point.clamped();
    let size = world_size(zoom);

    let x = (point.lon() + 180.0) / 360.0 * size;
    let lat_rad = point.lat().to_radians();
    let y = size / 2.0 - size * (PI / 4.0 + lat_rad / 2.0).tan().ln() / (2.0 * PI);

    PixelPoint::new(x, y)
}

/// Converts a global pixel position back into geographic coordinates.
pub fn to_geo(pixel: PixelPoint, zoom: u8) -> GeoPoint {
    let size = world_size(zoom);

    let lon = pixel.x / size * 360.0 - 180.0;
    let lat = (PI * (1.0 - 2.0 * pixel.y / size)).sinh().atan().to_degrees();

    GeoPoint::new(lon, lat)
}
