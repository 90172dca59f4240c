//! Configuration for map providers and the initial viewport.

use serde::{Deserialize, Serialize};

use crate::TileId;
use crate::projection::GeoPos;

/// The initial center and zoom of a map.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewportConfig {
    /// The geographical center of the map.
    pub center: GeoPos,

    /// The zoom level of the map.
    pub zoom: u8,
}

impl ViewportConfig {
    /// Metropolitan France as a whole.
    pub const FRANCE: Self = Self {
        center: GeoPos { lon: 2.3, lat: 46.8 },
        zoom: 6,
    };
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self::FRANCE
    }
}

/// Configuration for a map provider.
pub trait MapConfig {
    /// Returns the URL for a given tile.
    fn tile_url(&self, tile: &TileId) -> String;

    /// Returns the attribution text to be displayed on the map. If returns `None`, no attribution is shown.
    fn attribution(&self) -> Option<&String>;

    /// Returns the attribution URL to be linked from the attribution text.
    fn attribution_url(&self) -> Option<&String>;

    /// The viewport the map starts with.
    fn default_viewport(&self) -> ViewportConfig;
}

/// Expands a `{s}`/`{z}`/`{x}`/`{y}` tile URL template.
///
/// The subdomain is picked from the tile coordinates, so the same tile always maps to the same
/// host.
pub fn expand_tile_template(template: &str, subdomains: &[String], tile: &TileId) -> String {
    let mut url = template
        .replace("{z}", &tile.z.to_string())
        .replace("{x}", &tile.x.to_string())
        .replace("{y}", &tile.y.to_string());

    if !subdomains.is_empty() {
        let index = (tile.x as usize + tile.y as usize) % subdomains.len();
        url = url.replace("{s}", &subdomains[index]);
    }

    url
}

/// Configuration for the OpenStreetMap tile server.
///
/// # Example
///
/// ```
/// use zoning_map_view::config::OpenStreetMapConfig;
/// let config = OpenStreetMapConfig::default();
/// ```
#[cfg(feature = "openstreetmap")]
pub struct OpenStreetMapConfig {
    url_template: String,
    subdomains: Vec<String>,
    attribution: String,
    attribution_url: String,
    viewport: ViewportConfig,
}

#[cfg(feature = "openstreetmap")]
impl Default for OpenStreetMapConfig {
    fn default() -> Self {
        Self {
            url_template: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            subdomains: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            attribution: "© OpenStreetMap contributors".to_string(),
            attribution_url: "https://www.openstreetmap.org/copyright".to_string(),
            viewport: ViewportConfig::FRANCE,
        }
    }
}

#[cfg(feature = "openstreetmap")]
impl OpenStreetMapConfig {
    /// Uses another tile server that follows the OpenStreetMap URL scheme, keeping the
    /// attribution.
    pub fn with_template(mut self, url_template: impl Into<String>, subdomains: &[&str]) -> Self {
        self.url_template = url_template.into();
        self.subdomains = subdomains.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Starts the map at `viewport` instead of the whole of France.
    pub fn with_viewport(mut self, viewport: ViewportConfig) -> Self {
        self.viewport = viewport;
        self
    }
}

#[cfg(feature = "openstreetmap")]
impl MapConfig for OpenStreetMapConfig {
    fn tile_url(&self, tile: &TileId) -> String {
        expand_tile_template(&self.url_template, &self.subdomains, tile)
    }

    fn attribution(&self) -> Option<&String> {
        Some(&self.attribution)
    }

    fn attribution_url(&self) -> Option<&String> {
        Some(&self.attribution_url)
    }

    fn default_viewport(&self) -> ViewportConfig {
        self.viewport
    }
}
