//! Static route maps.
//!
//! `routemap` renders a route given as longitude/latitude pairs on top of
//! OpenStreetMap raster tiles, optionally with labeled markers, and saves the
//! result as a PNG file.
//!
//! ```no_run
//! # async fn run() -> Result<(), routemap::RouteMapError> {
//! use routemap::{RenderArgs, RouteMapRenderer};
//!
//! let renderer = RouteMapRenderer::builder()
//!     .build()
//!     .expect("HTTP client");
//! let args = RenderArgs::new(vec![vec![-17.1, 28.1], vec![-17.2, 28.2]], "map.png");
//! let outcome = renderer.render_route_map(&args).await?;
//! println!("saved to {}", outcome.path.display());
//! # Ok(())
//! # }
//! ```

pub mod basemap;
pub mod color;
pub mod compose;
pub mod draw;
pub mod error;
pub mod export;
pub mod font;
pub mod geo;
pub mod loader;
pub mod projection;
pub mod renderer;
pub mod request;
pub mod tile;
pub mod zoom;

pub use basemap::{Basemap, UnknownBasemap};
pub use color::{Color, InvalidColor};
pub use error::{ErrorKind, ExportError, RenderError, RouteMapError, TileLoadError};
pub use font::{FontError, LabelFont};
pub use geo::{GeoPoint, Marker};
pub use loader::{RasterTileLoader, WebTileLoader, WebTileLoaderBuilder};
pub use projection::{to_geo, to_pixel, PixelPoint};
pub use renderer::{RenderOutcome, RouteMapRenderer, RouteMapRendererBuilder};
pub use request::{MarkerArgs, RenderArgs, RenderRequest};
pub use tile::TileIndex;
pub use zoom::{select_zoom, select_zoom_centered};

// Re-export so that custom loaders can be written without depending on these crates directly.
pub use async_trait::async_trait;
pub use image;
