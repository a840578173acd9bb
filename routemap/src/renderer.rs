//! The `render_route_map` pipeline: validate, choose zoom, compose, save.

use std::path::PathBuf;

use image::RgbaImage;
use serde::Serialize;

use crate::compose::compose;
use crate::error::{RenderError, RouteMapError};
use crate::export;
use crate::font::LabelFont;
use crate::loader::{RasterTileLoader, WebTileLoader};
use crate::request::{RenderArgs, RenderRequest, DEFAULT_MAX_DIMENSION};
use crate::zoom::{select_zoom_centered, DEFAULT_MAX_ZOOM};

/// Margin in pixels kept between the route and the image border.
pub const DEFAULT_PADDING: u32 = 20;

/// Result of a successful `render_route_map` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderOutcome {
    /// Always `true`; failures are reported as errors.
    pub success: bool,
    /// Absolute path of the written PNG.
    pub path: PathBuf,
}

enum FontSource {
    System,
    Loaded(LabelFont),
    Disabled,
}

/// Renders route maps. Holds no per-call state and can serve many calls.
pub struct RouteMapRenderer {
    loader: Box<dyn RasterTileLoader>,
    max_zoom: u8,
    padding: u32,
    max_dimension: u32,
    font: Option<LabelFont>,
}

/// Builder for [`RouteMapRenderer`].
pub struct RouteMapRendererBuilder {
    loader: Option<Box<dyn RasterTileLoader>>,
    max_zoom: u8,
    padding: u32,
    max_dimension: u32,
    font: FontSource,
}

impl Default for RouteMapRendererBuilder {
    fn default() -> Self {
        Self {
            loader: None,
            max_zoom: DEFAULT_MAX_ZOOM,
            padding: DEFAULT_PADDING,
            max_dimension: DEFAULT_MAX_DIMENSION,
            font: FontSource::System,
        }
    }
}

impl RouteMapRendererBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses the given tile loader instead of the default [`WebTileLoader`].
    pub fn with_loader(mut self, loader: impl RasterTileLoader + 'static) -> Self {
        self.loader = Some(Box::new(loader));
        self
    }

    /// Limits the zoom level. The basemap's own limit still applies.
    pub fn with_max_zoom(mut self, max_zoom: u8) -> Self {
        self.max_zoom = max_zoom;
        self
    }

    /// Sets the margin kept free around the route.
    pub fn with_padding(mut self, padding: u32) -> Self {
        self.padding = padding;
        self
    }

    /// Sets the largest accepted image width and height.
    pub fn with_max_dimension(mut self, max_dimension: u32) -> Self {
        self.max_dimension = max_dimension;
        self
    }

    /// Draws labels with the given font instead of a system font.
    pub fn with_font(mut self, font: LabelFont) -> Self {
        self.font = FontSource::Loaded(font);
        self
    }

    /// Draws markers without labels.
    pub fn without_labels(mut self) -> Self {
        self.font = FontSource::Disabled;
        self
    }

    /// Creates the renderer. Fails only if the default HTTP client cannot be created.
    ///
    /// Unless a font was given, the system font folders are scanned here (once
    /// per process), so rendering itself never blocks on font discovery.
    pub fn build(self) -> Result<RouteMapRenderer, reqwest::Error> {
        let loader = match self.loader {
            Some(loader) => loader,
            None => Box::new(WebTileLoader::new()?),
        };

        Ok(RouteMapRenderer {
            loader,
            max_zoom: self.max_zoom,
            padding: self.padding,
            max_dimension: self.max_dimension,
            font: match self.font {
                FontSource::System => LabelFont::system().cloned(),
                FontSource::Loaded(font) => Some(font),
                FontSource::Disabled => None,
            },
        })
    }
}

impl RouteMapRenderer {
    /// Returns a builder.
    pub fn builder() -> RouteMapRendererBuilder {
        RouteMapRendererBuilder::new()
    }

    /// Validates the tool arguments, renders the map and saves it as PNG.
    ///
    /// Invalid arguments are rejected before any tile is requested. Nothing is
    /// written unless rendering succeeds.
    pub async fn render_route_map(&self, args: &RenderArgs) -> Result<RenderOutcome, RouteMapError> {
        let request = args.validate(self.max_dimension)?;
        let canvas = self.render(&request).await?;
        let path = export::save(&canvas, &request.output_path)?;

        Ok(RenderOutcome {
            success: true,
            path,
        })
    }

    /// Same as [`RouteMapRenderer::render_route_map`] for arguments given as JSON.
    pub async fn render_route_map_json(
        &self,
        args: serde_json::Value,
    ) -> Result<RenderOutcome, RouteMapError> {
        self.render_route_map(&RenderArgs::from_json(args)?).await
    }

    /// Renders the map image without saving it.
    pub async fn render(&self, request: &RenderRequest) -> Result<RgbaImage, RenderError> {
        let zoom = self.zoom_for(request);
        log::info!(
            "Rendering {} route points and {} markers on '{}' at zoom {zoom}",
            request.route.len(),
            request.markers.len(),
            request.basemap
        );

        compose(request, zoom, self.loader.as_ref(), self.font.as_ref()).await
    }

    /// Zoom level used for the request.
    ///
    /// The route fits inside the padded image, and so does every marker once
    /// the image is centered on the route.
    pub fn zoom_for(&self, request: &RenderRequest) -> u8 {
        let max_zoom = self.max_zoom.min(request.basemap.max_zoom());
        let fit = |size: u32| size.saturating_sub(self.padding.saturating_mul(2)).max(1);
        let markers: Vec<_> = request.markers.iter().map(|m| m.position).collect();

        select_zoom_centered(
            &request.route,
            &markers,
            fit(request.width),
            fit(request.height),
            max_zoom,
        )
    }
}
