//! Supported basemap styles and their tile servers.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::tile::TileIndex;

/// Tile styling provider used as the map background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Basemap {
    /// Standard OpenStreetMap style.
    #[default]
    Osm,
    /// OpenTopoMap terrain and hiking style.
    Topo,
    /// CyclOSM cycling style.
    Cycle,
    /// Humanitarian OpenStreetMap Team style.
    Humanitarian,
}

/// Returned when a basemap identifier is not one of the supported names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown basemap '{0}', expected one of: osm, topo, cycle, humanitarian")]
pub struct UnknownBasemap(pub String);

impl Basemap {
    /// All supported basemaps.
    pub const ALL: [Basemap; 4] = [
        Basemap::Osm,
        Basemap::Topo,
        Basemap::Cycle,
        Basemap::Humanitarian,
    ];

    /// Identifier used in tool arguments.
    pub fn id(self) -> &'static str {
        match self {
            Basemap::Osm => "osm",
            Basemap::Topo => "topo",
            Basemap::Cycle => "cycle",
            Basemap::Humanitarian => "humanitarian",
        }
    }

    /// Tile URL template with `{z}`, `{x}` and `{y}` placeholders.
    pub fn url_template(self) -> &'static str {
        match self {
            Basemap::Osm => "https://a.tile.openstreetmap.org/{z}/{x}/{y}.png",
            Basemap::Topo => "https://tile.opentopomap.org/{z}/{x}/{y}.png",
            Basemap::Cycle => "https://a.tile-cyclosm.openstreetmap.fr/cyclosm/{z}/{x}/{y}.png",
            Basemap::Humanitarian => "https://a.tile.openstreetmap.fr/hot/{z}/{x}/{y}.png",
        }
    }

    /// Highest zoom level the provider serves.
    pub fn max_zoom(self) -> u8 {
        match self {
            Basemap::Osm | Basemap::Humanitarian => 19,
            Basemap::Topo => 17,
            Basemap::Cycle => 20,
        }
    }

    /// Url of the tile with the given index.
    pub fn tile_url(self, index: TileIndex) -> Result<String, strfmt::FmtError> {
        let mut vars = HashMap::with_capacity(3);
        vars.insert("z".to_string(), index.z.to_string());
        vars.insert("x".to_string(), index.x.to_string());
        vars.insert("y".to_string(), index.y.to_string());

        strfmt::strfmt(self.url_template(), &vars)
    }
}

impl FromStr for Basemap {
    type Err = UnknownBasemap;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Basemap::ALL
            .into_iter()
            .find(|basemap| basemap.id() == s)
            .ok_or_else(|| UnknownBasemap(s.to_string()))
    }
}

impl fmt::Display for Basemap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
