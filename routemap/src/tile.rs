//! Tile indices and the grid of tiles covering an output canvas.

use std::fmt;

use crate::projection::TILE_SIZE;

/// Index of a tile in the slippy map scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileIndex {
    /// Zoom level.
    pub z: u8,
    /// Column, `0..2^z`.
    pub x: u32,
    /// Row, `0..2^z`, counted from the north.
    pub y: u32,
}

impl TileIndex {
    /// Creates a new tile index.
    pub const fn new(z: u8, x: u32, y: u32) -> Self {
        Self { z, x, y }
    }
}

impl fmt::Display for TileIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}

/// A tile together with the canvas position of its top-left corner.
///
/// Because longitude wraps, several placements may refer to the same tile
/// when the canvas is wider than the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TilePlacement {
    /// Tile to draw.
    pub index: TileIndex,
    /// Horizontal offset of the tile in the canvas, may be negative.
    pub offset_x: i64,
    /// Vertical offset of the tile in the canvas, may be negative.
    pub offset_y: i64,
}

/// Returns all tile placements overlapping the canvas whose top-left corner is
/// at the global pixel `(origin_x, origin_y)`.
///
/// Columns wrap around the antimeridian. Rows outside the world are skipped,
/// leaving those canvas areas to the background.
pub fn covering_tiles(
    origin_x: i64,
    origin_y: i64,
    width: u32,
    height: u32,
    zoom: u8,
) -> Vec<TilePlacement> {
    let tile_size = TILE_SIZE as i64;
    let tiles_per_axis = 1i64 << zoom;

    let x_min = origin_x.div_euclid(tile_size);
    let x_max = (origin_x + width as i64 - 1).div_euclid(tile_size);
    let y_min = origin_y.div_euclid(tile_size).max(0);
    let y_max = (origin_y + height as i64 - 1)
        .div_euclid(tile_size)
        .min(tiles_per_axis - 1);

    let mut placements = vec![];
    for tile_y in y_min..=y_max {
        for tile_x in x_min..=x_max {
            placements.push(TilePlacement {
                index: TileIndex::new(
                    zoom,
                    tile_x.rem_euclid(tiles_per_axis) as u32,
                    tile_y as u32,
                ),
                offset_x: tile_x * tile_size - origin_x,
                offset_y: tile_y * tile_size - origin_y,
            });
        }
    }

    placements
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aligned_canvas_covers_exact_tiles() {
        let tiles = covering_tiles(256, 512, 512, 256, 4);
        let indices: Vec<_> = tiles.iter().map(|t| t.index).collect();
        assert_eq!(indices, vec![TileIndex::new(4, 1, 2), TileIndex::new(4, 2, 2)]);
        assert_eq!((tiles[0].offset_x, tiles[0].offset_y), (0, 0));
        assert_eq!((tiles[1].offset_x, tiles[1].offset_y), (256, 0));
    }

    #[test]
    fn unaligned_canvas_has_negative_offsets() {
        let tiles = covering_tiles(300, 300, 300, 300, 4);
        assert_eq!(tiles.len(), 4);
        assert_eq!(tiles[0].index, TileIndex::new(4, 1, 1));
        assert_eq!((tiles[0].offset_x, tiles[0].offset_y), (-44, -44));
        assert_eq!(tiles[3].index, TileIndex::new(4, 2, 2));
        assert_eq!((tiles[3].offset_x, tiles[3].offset_y), (212, 212));
    }

    #[test]
    fn columns_wrap_around_antimeridian() {
        // Zoom 2 has 4 columns; a canvas straddling x = 0 needs column 3 and 0.
        let tiles = covering_tiles(-100, 256, 200, 100, 2);
        let columns: Vec<_> = tiles.iter().map(|t| t.index.x).collect();
        assert_eq!(columns, vec![3, 0]);
        assert_eq!(tiles[0].offset_x, -156);
        assert_eq!(tiles[1].offset_x, 100);

        let tiles = covering_tiles(1000, 0, 100, 100, 2);
        let columns: Vec<_> = tiles.iter().map(|t| t.index.x).collect();
        assert_eq!(columns, vec![3, 0]);
    }

    #[test]
    fn rows_do_not_wrap() {
        let tiles = covering_tiles(0, -300, 256, 400, 1);
        assert!(tiles.iter().all(|t| t.index.y == 0));
        assert_eq!(tiles.len(), 1);
        assert_eq!(tiles[0].offset_y, 300);

        let tiles = covering_tiles(0, 400, 256, 400, 1);
        assert!(tiles.iter().all(|t| t.index.y == 1));
    }

    #[test]
    fn canvas_wider_than_world_repeats_tiles() {
        let tiles = covering_tiles(-128, -128, 512, 512, 0);
        assert_eq!(tiles.len(), 3);
        assert!(tiles.iter().all(|t| t.index == TileIndex::new(0, 0, 0)));
    }

    #[test]
    fn canvas_outside_world_has_no_tiles() {
        assert!(covering_tiles(0, -1000, 100, 100, 3).is_empty());
    }
}
