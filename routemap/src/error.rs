//! Error types.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::tile::TileIndex;

/// Error that can occur when loading a single tile.
#[derive(Debug, Error)]
pub enum TileLoadError {
    /// Could not reach the tile server or the request timed out.
    #[error("network error loading {url}: {source}")]
    Network {
        /// Requested url.
        url: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
    /// The tile server answered with a non-success status.
    #[error("tile server returned {status} for {url}")]
    Status {
        /// Requested url.
        url: String,
        /// HTTP status code.
        status: u16,
    },
    /// Response body is not a decodable image.
    #[error("failed to decode tile image: {0}")]
    Decoding(#[from] image::ImageError),
    /// Tile url could not be built from the template.
    #[error("invalid tile url template: {0}")]
    InvalidUrl(#[from] strfmt::FmtError),
    /// Tile does not exist in the source.
    #[error("tile not found")]
    NotFound,
}

/// Error while compositing the map image.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A tile needed for the canvas could not be loaded.
    #[error("failed to fetch tile {index}: {source}")]
    TileFetch {
        /// Tile that failed.
        index: TileIndex,
        /// Cause of the failure.
        #[source]
        source: TileLoadError,
    },
}

/// Error while writing the output file.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Parent directories could not be created.
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        /// Directory that could not be created.
        path: PathBuf,
        /// IO error.
        #[source]
        source: std::io::Error,
    },
    /// PNG encoding or writing the temporary file failed.
    #[error("failed to write {path}: {source}")]
    Encode {
        /// File being written.
        path: PathBuf,
        /// Encoder error.
        #[source]
        source: image::ImageError,
    },
    /// Moving the finished file into place or resolving its path failed.
    #[error("failed to save {path}: {source}")]
    Persist {
        /// Destination path.
        path: PathBuf,
        /// IO error.
        #[source]
        source: std::io::Error,
    },
}

/// Error returned by the `render_route_map` operation.
#[derive(Debug, Error)]
pub enum RouteMapError {
    /// Tool arguments are malformed. Detected before any network access.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The map could not be rendered.
    #[error(transparent)]
    Render(#[from] RenderError),
    /// The image could not be saved.
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Class of a [`RouteMapError`] as reported to tool callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed arguments.
    InvalidArgument,
    /// Network or tile server failure.
    TileFetchError,
    /// Filesystem failure.
    IOError,
}

impl RouteMapError {
    /// Class of the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            RouteMapError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            RouteMapError::Render(RenderError::TileFetch { .. }) => ErrorKind::TileFetchError,
            RouteMapError::Export(_) => ErrorKind::IOError,
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::InvalidArgument => "InvalidArgument",
            ErrorKind::TileFetchError => "TileFetchError",
            ErrorKind::IOError => "IOError",
        };
        f.write_str(name)
    }
}
