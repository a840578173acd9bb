//! Stitching tiles into a canvas and drawing the route overlay.

use std::collections::{BTreeSet, HashMap};

use futures::future::try_join_all;
use image::{Rgba, RgbaImage};

use crate::draw;
use crate::error::RenderError;
use crate::font::LabelFont;
use crate::loader::RasterTileLoader;
use crate::projection::{to_pixel, world_size, PixelBounds, PixelPoint};
use crate::request::RenderRequest;
use crate::tile::{covering_tiles, TileIndex};

/// Color of canvas areas not covered by any tile (beyond the poles).
pub const BACKGROUND_COLOR: Rgba<u8> = Rgba([224, 224, 224, 255]);

/// Global pixel position of the canvas' top-left corner for the request at `zoom`.
///
/// The canvas is centered on the center of the route's bounding box.
pub fn canvas_origin(request: &RenderRequest, zoom: u8) -> (i64, i64) {
    let center = PixelBounds::from_points(request.route.iter().map(|p| to_pixel(*p, zoom)))
        .map(|bounds| bounds.center())
        .unwrap_or_else(|| {
            let half = world_size(zoom) / 2.0;
            PixelPoint::new(half, half)
        });

    (
        (center.x - request.width as f64 / 2.0).floor() as i64,
        (center.y - request.height as f64 / 2.0).floor() as i64,
    )
}

/// Renders the map for the request at the given zoom.
///
/// All tiles are requested concurrently. Any tile failure aborts the render.
/// Marker labels are drawn only when `font` is given.
pub async fn compose(
    request: &RenderRequest,
    zoom: u8,
    loader: &dyn RasterTileLoader,
    font: Option<&LabelFont>,
) -> Result<RgbaImage, RenderError> {
    let (origin_x, origin_y) = canvas_origin(request, zoom);
    let placements = covering_tiles(origin_x, origin_y, request.width, request.height, zoom);
    let unique: BTreeSet<TileIndex> = placements.iter().map(|p| p.index).collect();

    log::debug!(
        "Composing {}x{} map at zoom {zoom} from {} tiles of '{}'",
        request.width,
        request.height,
        unique.len(),
        request.basemap
    );

    let tiles: HashMap<TileIndex, RgbaImage> =
        try_join_all(unique.into_iter().map(|index| async move {
            loader
                .load(request.basemap, index)
                .await
                .map(|tile| (index, tile))
                .map_err(|source| RenderError::TileFetch { index, source })
        }))
        .await?
        .into_iter()
        .collect();

    let mut canvas = RgbaImage::from_pixel(request.width, request.height, BACKGROUND_COLOR);
    for placement in &placements {
        if let Some(tile) = tiles.get(&placement.index) {
            image::imageops::replace(&mut canvas, tile, placement.offset_x, placement.offset_y);
        }
    }

    let to_canvas = |point| {
        let pixel = to_pixel(point, zoom);
        (
            (pixel.x - origin_x as f64) as f32,
            (pixel.y - origin_y as f64) as f32,
        )
    };

    let route: Vec<_> = request.route.iter().map(|p| to_canvas(*p)).collect();
    draw::draw_polyline(&mut canvas, &route, request.line_color, request.line_width);

    for marker in &request.markers {
        let position = to_canvas(marker.position);
        if !draw::marker_visible(&canvas, position) {
            log::warn!("Marker '{}' is outside of the image", marker.label);
            continue;
        }

        draw::draw_marker(&mut canvas, position);
        if let (true, Some(font)) = (marker.has_label(), font) {
            draw::draw_label(&mut canvas, position, marker.label.trim(), font);
        }
    }

    Ok(canvas)
}
