//! Choosing the zoom level that fits a set of points into an image.

use crate::geo::GeoPoint;
use crate::projection::{to_pixel, PixelBounds};

/// Highest zoom level served by the standard OpenStreetMap tile servers.
pub const DEFAULT_MAX_ZOOM: u8 = 19;

/// Returns the highest zoom in `0..=max_zoom` at which all `points` fit into
/// `width` x `height` pixels.
///
/// A single point (or any set of coincident points) has an empty bounding box
/// and therefore always gets `max_zoom`. If nothing fits, zoom `0` is returned.
pub fn select_zoom(points: &[GeoPoint], width: u32, height: u32, max_zoom: u8) -> u8 {
    select_zoom_centered(points, &[], width, height, max_zoom)
}

/// Like [`select_zoom`], but `extra` points must also fit into the
/// `width` x `height` box centered on the bounding box of `points`.
pub fn select_zoom_centered(
    points: &[GeoPoint],
    extra: &[GeoPoint],
    width: u32,
    height: u32,
    max_zoom: u8,
) -> u8 {
    for zoom in (0..=max_zoom).rev() {
        let Some(bounds) = PixelBounds::from_points(points.iter().map(|p| to_pixel(*p, zoom)))
        else {
            return max_zoom;
        };

        let center = bounds.center();
        let fits = points.iter().chain(extra).all(|point| {
            let pixel = to_pixel(*point, zoom);
            2.0 * (pixel.x - center.x).abs() <= width as f64
                && 2.0 * (pixel.y - center.y).abs() <= height as f64
        });

        if fits {
            log::trace!(
                "Selected zoom {zoom} for {} points and {} extra points, bbox {:.1}x{:.1} in {width}x{height}",
                points.len(),
                extra.len(),
                bounds.width(),
                bounds.height()
            );
            return zoom;
        }
    }

    0
}
