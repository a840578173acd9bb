//! Tool arguments and their validation into a typed render request.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::basemap::Basemap;
use crate::color::Color;
use crate::error::RouteMapError;
use crate::geo::{GeoPoint, Marker};

/// Default output image width.
pub const DEFAULT_WIDTH: u32 = 800;
/// Default output image height.
pub const DEFAULT_HEIGHT: u32 = 600;
/// Default route line color.
pub const DEFAULT_LINE_COLOR: &str = "black";
/// Default route line width in pixels.
pub const DEFAULT_LINE_WIDTH: u32 = 3;
/// Default upper limit for image width and height.
pub const DEFAULT_MAX_DIMENSION: u32 = 4096;
/// Upper limit for the route line width in pixels.
pub const MAX_LINE_WIDTH: u32 = 100;

/// Arguments of the `render_route_map` tool as received from the caller.
///
/// Numbers are accepted as signed integers so that negative values are
/// reported as invalid arguments rather than deserialization failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderArgs {
    /// Route as `[longitude, latitude]` pairs.
    pub coordinates: Vec<Vec<f64>>,
    /// File path of the PNG to write.
    pub output_path: String,
    /// Named points drawn on top of the route.
    #[serde(default)]
    pub markers: Vec<MarkerArgs>,
    /// Image width in pixels.
    #[serde(default = "default_width")]
    pub width: i64,
    /// Image height in pixels.
    #[serde(default = "default_height")]
    pub height: i64,
    /// Route line color, a name or hex.
    #[serde(default = "default_line_color")]
    pub line_color: String,
    /// Route line width in pixels.
    #[serde(default = "default_line_width")]
    pub line_width: i64,
    /// Basemap identifier.
    #[serde(default = "default_basemap")]
    pub basemap: String,
}

/// A marker as received from the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerArgs {
    /// Longitude in degrees.
    pub lon: Option<f64>,
    /// Latitude in degrees.
    pub lat: Option<f64>,
    /// Optional label text.
    #[serde(default)]
    pub label: Option<String>,
}

fn default_width() -> i64 {
    DEFAULT_WIDTH as i64
}

fn default_height() -> i64 {
    DEFAULT_HEIGHT as i64
}

fn default_line_color() -> String {
    DEFAULT_LINE_COLOR.to_string()
}

fn default_line_width() -> i64 {
    DEFAULT_LINE_WIDTH as i64
}

fn default_basemap() -> String {
    Basemap::default().id().to_string()
}

/// A validated render request.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    /// Route points in drawing order. Never empty.
    pub route: Vec<GeoPoint>,
    /// Markers drawn on top of the route.
    pub markers: Vec<Marker>,
    /// Where the PNG is written.
    pub output_path: PathBuf,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Route line color.
    pub line_color: Color,
    /// Route line width in pixels.
    pub line_width: u32,
    /// Background tiles.
    pub basemap: Basemap,
}

impl RenderRequest {
    /// Creates a request with default styling for the given route.
    pub fn new(route: Vec<GeoPoint>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            route,
            markers: vec![],
            output_path: output_path.into(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            line_color: Color::BLACK,
            line_width: DEFAULT_LINE_WIDTH,
            basemap: Basemap::default(),
        }
    }
}

impl RenderArgs {
    /// Creates arguments with all optional values at their defaults.
    pub fn new(coordinates: Vec<Vec<f64>>, output_path: impl Into<String>) -> Self {
        Self {
            coordinates,
            output_path: output_path.into(),
            markers: vec![],
            width: default_width(),
            height: default_height(),
            line_color: default_line_color(),
            line_width: default_line_width(),
            basemap: default_basemap(),
        }
    }

    /// Parses tool arguments from a JSON value.
    pub fn from_json(value: serde_json::Value) -> Result<Self, RouteMapError> {
        serde_json::from_value(value).map_err(|err| RouteMapError::invalid(err.to_string()))
    }

    /// Checks all arguments and converts them into a [`RenderRequest`].
    ///
    /// `max_dimension` limits both width and height.
    pub fn validate(&self, max_dimension: u32) -> Result<RenderRequest, RouteMapError> {
        let basemap = self
            .basemap
            .parse::<Basemap>()
            .map_err(|err| RouteMapError::invalid(err.to_string()))?;

        if self.coordinates.is_empty() {
            return Err(RouteMapError::invalid(
                "coordinates must contain at least one [lon, lat] pair",
            ));
        }

        let route = self
            .coordinates
            .iter()
            .enumerate()
            .map(|(i, pair)| match pair.as_slice() {
                [lon, lat] => geo_point(*lon, *lat, &format!("coordinates[{i}]")),
                _ => Err(RouteMapError::invalid(format!(
                    "coordinates[{i}] must be a [lon, lat] pair, got {} values",
                    pair.len()
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let markers = self
            .markers
            .iter()
            .enumerate()
            .map(|(i, marker)| {
                let name = format!("markers[{i}]");
                let (Some(lon), Some(lat)) = (marker.lon, marker.lat) else {
                    return Err(RouteMapError::invalid(format!(
                        "{name} must have both 'lon' and 'lat'"
                    )));
                };
                Ok(Marker::new(
                    geo_point(lon, lat, &name)?,
                    marker.label.clone().unwrap_or_default(),
                ))
            })
            .collect::<Result<Vec<_>, _>>()?;

        if self.output_path.trim().is_empty() {
            return Err(RouteMapError::invalid("output_path must not be empty"));
        }

        let width = dimension(self.width, "width", max_dimension)?;
        let height = dimension(self.height, "height", max_dimension)?;
        let line_width = dimension(self.line_width, "line_width", MAX_LINE_WIDTH)?;

        let line_color =
            Color::parse(&self.line_color).map_err(|err| RouteMapError::invalid(err.to_string()))?;

        Ok(RenderRequest {
            route,
            markers,
            output_path: PathBuf::from(&self.output_path),
            width,
            height,
            line_color,
            line_width,
            basemap,
        })
    }
}

fn geo_point(lon: f64, lat: f64, name: &str) -> Result<GeoPoint, RouteMapError> {
    if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
        return Err(RouteMapError::invalid(format!(
            "{name}: longitude {lon} is outside [-180, 180]"
        )));
    }

    if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
        return Err(RouteMapError::invalid(format!(
            "{name}: latitude {lat} is outside [-90, 90]"
        )));
    }

    Ok(GeoPoint::new(lon, lat))
}

fn dimension(value: i64, name: &str, max: u32) -> Result<u32, RouteMapError> {
    if value <= 0 {
        return Err(RouteMapError::invalid(format!(
            "{name} must be positive, got {value}"
        )));
    }

    if value > max as i64 {
        return Err(RouteMapError::invalid(format!(
            "{name} must not exceed {max}, got {value}"
        )));
    }

    Ok(value as u32)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::ErrorKind;

    fn parse(value: serde_json::Value) -> Result<RenderRequest, RouteMapError> {
        RenderArgs::from_json(value)?.validate(DEFAULT_MAX_DIMENSION)
    }

    fn assert_invalid(value: serde_json::Value, message_part: &str) {
        let err = parse(value).expect_err("arguments must be rejected");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(
            err.to_string().contains(message_part),
            "'{err}' does not mention '{message_part}'"
        );
    }

    #[test]
    fn defaults() {
        let request = parse(json!({
            "coordinates": [[-17.1, 28.1], [-17.2, 28.2]],
            "output_path": "out.png",
        }))
        .expect("valid arguments");

        assert_eq!(
            request.route,
            vec![GeoPoint::new(-17.1, 28.1), GeoPoint::new(-17.2, 28.2)]
        );
        assert!(request.markers.is_empty());
        assert_eq!(request.output_path, PathBuf::from("out.png"));
        assert_eq!((request.width, request.height), (800, 600));
        assert_eq!(request.line_color, Color::BLACK);
        assert_eq!(request.line_width, 3);
        assert_eq!(request.basemap, Basemap::Osm);
        assert_eq!(
            request,
            RenderRequest::new(request.route.clone(), "out.png")
        );
    }

    #[test]
    fn all_arguments() {
        let request = parse(json!({
            "coordinates": [[0.0, 0.0]],
            "output_path": "maps/route.png",
            "markers": [
                {"lon": -17.15, "lat": 28.15, "label": "Camp"},
                {"lon": 1.0, "lat": 2.0},
            ],
            "width": 400,
            "height": 300,
            "line_color": "#1e90ff",
            "line_width": 5,
            "basemap": "topo",
        }))
        .expect("valid arguments");

        assert_eq!(
            request.markers,
            vec![
                Marker::new(GeoPoint::new(-17.15, 28.15), "Camp"),
                Marker::new(GeoPoint::new(1.0, 2.0), ""),
            ]
        );
        assert_eq!((request.width, request.height), (400, 300));
        assert_eq!(request.line_color, Color::rgb(30, 144, 255));
        assert_eq!(request.line_width, 5);
        assert_eq!(request.basemap, Basemap::Topo);
    }

    #[test]
    fn unknown_basemap() {
        assert_invalid(
            json!({"coordinates": [[0, 0]], "output_path": "a.png", "basemap": "unknown"}),
            "unknown basemap",
        );
    }

    #[test]
    fn empty_coordinates() {
        assert_invalid(
            json!({"coordinates": [], "output_path": "a.png"}),
            "at least one",
        );
    }

    #[test]
    fn wrong_arity() {
        assert_invalid(
            json!({"coordinates": [[1.0, 2.0], [1.0]], "output_path": "a.png"}),
            "coordinates[1]",
        );
        assert_invalid(
            json!({"coordinates": [[1.0, 2.0, 3.0]], "output_path": "a.png"}),
            "3 values",
        );
    }

    #[test]
    fn out_of_range_coordinates() {
        assert_invalid(
            json!({"coordinates": [[181.0, 0.0]], "output_path": "a.png"}),
            "longitude",
        );
        assert_invalid(
            json!({"coordinates": [[0.0, -91.0]], "output_path": "a.png"}),
            "latitude",
        );
    }

    #[test]
    fn polar_latitude_is_accepted() {
        let request = parse(json!({"coordinates": [[0.0, 89.0]], "output_path": "a.png"}))
            .expect("valid geographic latitude");
        assert_eq!(request.route[0].lat(), 89.0);
    }

    #[test]
    fn non_positive_sizes() {
        for field in ["width", "height", "line_width"] {
            assert_invalid(
                json!({"coordinates": [[0, 0]], "output_path": "a.png", field: 0}),
                field,
            );
            assert_invalid(
                json!({"coordinates": [[0, 0]], "output_path": "a.png", field: -5}),
                "must be positive",
            );
        }
    }

    #[test]
    fn oversized_image() {
        assert_invalid(
            json!({"coordinates": [[0, 0]], "output_path": "a.png", "width": 100000}),
            "must not exceed 4096",
        );
    }

    #[test]
    fn line_width_is_capped() {
        let request = parse(json!({"coordinates": [[0, 0]], "output_path": "a.png", "line_width": 100}))
            .expect("widest accepted line");
        assert_eq!(request.line_width, MAX_LINE_WIDTH);

        for line_width in [101, 1_000_000, u32::MAX as i64] {
            assert_invalid(
                json!({"coordinates": [[0, 0]], "output_path": "a.png", "line_width": line_width}),
                "line_width must not exceed 100",
            );
        }
    }

    #[test]
    fn bad_color() {
        assert_invalid(
            json!({"coordinates": [[0, 0]], "output_path": "a.png", "line_color": "sparkly"}),
            "invalid color",
        );
    }

    #[test]
    fn marker_without_position() {
        assert_invalid(
            json!({"coordinates": [[0, 0]], "output_path": "a.png", "markers": [{"label": "x"}]}),
            "markers[0]",
        );
        assert_invalid(
            json!({"coordinates": [[0, 0]], "output_path": "a.png", "markers": [{"lon": 0, "lat": 95}]}),
            "latitude",
        );
    }

    #[test]
    fn malformed_json() {
        assert_invalid(json!({"output_path": "a.png"}), "coordinates");
        assert_invalid(
            json!({"coordinates": "0,0", "output_path": "a.png"}),
            "invalid type",
        );
        assert_invalid(
            json!({"coordinates": [[0, 0]], "output_path": "a.png", "zoom": 3}),
            "unknown field",
        );
    }

    #[test]
    fn empty_output_path() {
        assert_invalid(json!({"coordinates": [[0, 0]], "output_path": " "}), "output_path");
    }
}
