//! Raster tile loading.

use std::time::Duration;

use bytes::Bytes;
use image::imageops::FilterType;
use image::RgbaImage;
use reqwest::{Client, StatusCode};

use crate::basemap::Basemap;
use crate::error::TileLoadError;
use crate::projection::TILE_SIZE;
use crate::tile::TileIndex;

/// Timeout applied to every tile request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Total number of attempts for a tile whose request failed transiently.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 2;

const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(250);

const DEFAULT_USER_AGENT: &str = concat!(
    "routemap/",
    env!("CARGO_PKG_VERSION"),
    " (static route map renderer)"
);

/// Source of decoded raster tiles.
#[async_trait::async_trait]
pub trait RasterTileLoader: Send + Sync {
    /// Loads the tile with the given index of the given basemap as an RGBA image
    /// of [`TILE_SIZE`] x [`TILE_SIZE`] pixels.
    async fn load(&self, basemap: Basemap, index: TileIndex) -> Result<RgbaImage, TileLoadError>;
}

/// Loads tiles from the basemap tile servers over HTTP.
#[derive(Debug, Clone)]
pub struct WebTileLoader {
    client: Client,
    max_attempts: u32,
    retry_delay: Duration,
}

/// Configuration of a [`WebTileLoader`].
#[derive(Debug, Clone)]
pub struct WebTileLoaderBuilder {
    timeout: Duration,
    user_agent: String,
    max_attempts: u32,
    retry_delay: Duration,
}

impl Default for WebTileLoaderBuilder {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_REQUEST_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl WebTileLoaderBuilder {
    /// Sets the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the `User-Agent` header sent to tile servers.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sets the total number of attempts per tile. Values below 1 are treated as 1.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Sets the pause between attempts.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Creates the loader.
    pub fn build(self) -> Result<WebTileLoader, reqwest::Error> {
        let client = Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent)
            .build()?;

        Ok(WebTileLoader {
            client,
            max_attempts: self.max_attempts,
            retry_delay: self.retry_delay,
        })
    }
}

impl WebTileLoader {
    /// Returns a builder with default settings.
    pub fn builder() -> WebTileLoaderBuilder {
        WebTileLoaderBuilder::default()
    }

    /// Creates a loader with default settings.
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::builder().build()
    }

    async fn load_raw(&self, url: &str) -> Result<Bytes, TileLoadError> {
        let mut attempt = 1;
        loop {
            match self.request(url).await {
                Ok(bytes) => return Ok(bytes),
                Err(err) if attempt < self.max_attempts && is_transient(&err) => {
                    log::warn!("Attempt {attempt} to load {url} failed: {err}. Retrying");
                    attempt += 1;
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(err) => {
                    log::error!("Failed to load tile {url}: {err}");
                    return Err(err);
                }
            }
        }
    }

    async fn request(&self, url: &str) -> Result<Bytes, TileLoadError> {
        let network = |source| TileLoadError::Network {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(network)?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(TileLoadError::NotFound);
        }

        if !status.is_success() {
            return Err(TileLoadError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.bytes().await.map_err(network)
    }
}

fn is_transient(err: &TileLoadError) -> bool {
    match err {
        TileLoadError::Network { .. } => true,
        TileLoadError::Status { status, .. } => {
            *status == StatusCode::TOO_MANY_REQUESTS.as_u16() || *status >= 500
        }
        _ => false,
    }
}

/// Decodes tile bytes into an RGBA image of the standard tile size.
pub fn decode_tile(bytes: &[u8]) -> Result<RgbaImage, TileLoadError> {
    let image = image::load_from_memory(bytes)?.to_rgba8();
    if image.width() == TILE_SIZE && image.height() == TILE_SIZE {
        return Ok(image);
    }

    log::debug!(
        "Resampling {}x{} tile to {TILE_SIZE}x{TILE_SIZE}",
        image.width(),
        image.height()
    );
    Ok(image::imageops::resize(
        &image,
        TILE_SIZE,
        TILE_SIZE,
        FilterType::Triangle,
    ))
}

#[async_trait::async_trait]
impl RasterTileLoader for WebTileLoader {
    async fn load(&self, basemap: Basemap, index: TileIndex) -> Result<RgbaImage, TileLoadError> {
        let url = basemap.tile_url(index)?;

        log::trace!("Loading tile {index} from url {url}");
        let bytes = self.load_raw(&url).await?;

        log::trace!("Tile {index} loaded. Byte size: {}", bytes.len());

        decode_tile(&bytes)
    }
}
