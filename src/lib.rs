#![warn(missing_docs)]

//! An `egui` map view for urban zoning plans.
//!
//! This crate provides a `Map` widget that displays a slippy map from a tile server, with
//! panning, zooming and layers drawn on top, and a `ZoningMapView` that loads a GeoJSON
//! zoning document, colors each zone by its `TYPEZONE` and shows its rules in a popup when
//! the zone is clicked.
//!
//! # Example
//!
//! ```no_run
//! use eframe::egui;
//! use zoning_map_view::ZoningMapView;
//!
//! struct MyApp {
//!     view: ZoningMapView,
//! }
//!
//! impl Default for MyApp {
//!     fn default() -> Self {
//!         Self {
//!             view: ZoningMapView::init("https://example.org/output/75056.geojson"),
//!         }
//!     }
//! }
//!
//! impl eframe::App for MyApp {
//!     fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
//!         egui::CentralPanel::default()
//!             .frame(egui::Frame::NONE)
//!             .show(ctx, |ui| {
//!                 ui.add(&mut self.view);
//!             });
//!     }
//! }
//! ```

/// Configuration traits and types for the map widget.
pub mod config;

/// Layers drawn on top of the basemap.
pub mod layers;

/// Loading GeoJSON documents.
pub mod loader;

/// Conversions between geographical and screen coordinates.
pub mod projection;

/// The zoning map view.
pub mod view;

/// Zone styling and popup text.
pub mod zoning;

pub use view::ZoningMapView;

use eframe::egui;
use egui::{Color32, Rect, Response, Sense, Ui, Vec2, Widget, pos2};
use eyre::{Context, Result};
use log::{debug, error};
use once_cell::sync::Lazy;
use poll_promise::Promise;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use thiserror::Error;

use crate::config::{MapConfig, ViewportConfig};
use crate::layers::Layer;
use crate::projection::{GeoBounds, GeoPos, MapProjection, zoom_to_fit};

// The size of a map tile in pixels.
const TILE_SIZE: u32 = 256;
/// The minimum zoom level.
pub const MIN_ZOOM: u8 = 0;
/// The maximum zoom level.
pub const MAX_ZOOM: u8 = 19;

// Reuse the reqwest client for all downloads by making it a static variable.
pub(crate) static CLIENT: Lazy<reqwest::blocking::Client> = Lazy::new(|| {
    reqwest::blocking::Client::builder()
        .user_agent(format!(
            "{}/{}",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION")
        ))
        .build()
        .expect("Failed to build reqwest client")
});

/// Errors that can occur while using the map widget.
#[derive(Error, Debug)]
pub enum MapError {
    /// An error occurred while making a web request.
    #[error("Connection error")]
    ConnectionError(#[from] reqwest::Error),

    /// A map tile failed to download.
    #[error("A map tile failed to download. HTTP Status: `{0}`")]
    TileDownloadError(String),

    /// The downloaded tile bytes could not be converted to an image.
    #[error("Unable to convert downloaded map tile bytes as image")]
    TileBytesConversionError(#[from] image::ImageError),
}

/// A unique identifier for a map tile.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub struct TileId {
    /// The zoom level.
    pub z: u8,

    /// The x-coordinate of the tile.
    pub x: u32,

    /// The y-coordinate of the tile.
    pub y: u32,
}

impl TileId {
    fn to_url(&self, config: &dyn MapConfig) -> String {
        config.tile_url(self)
    }
}

/// The state of a tile in the cache.
enum Tile {
    /// The tile is being downloaded.
    Loading(Promise<Result<egui::ColorImage, Arc<eyre::Report>>>),

    /// The tile is in memory.
    Loaded(egui::TextureHandle),

    /// The tile failed to download.
    Failed(Arc<eyre::Report>),
}

/// The map widget.
pub struct Map {
    /// The geographical center of the map.
    pub center: GeoPos,

    /// The zoom level of the map.
    pub zoom: u8,

    tiles: HashMap<TileId, Tile>,

    /// The geographical position under the mouse pointer, if any.
    pub mouse_pos: Option<GeoPos>,

    /// Configuration for the map, such as the tile server URL.
    config: Box<dyn MapConfig>,

    layers: BTreeMap<String, Box<dyn Layer>>,

    // Applied on the next frame, once the widget size is known.
    pending_fit: Option<GeoBounds>,
}

impl Map {
    /// Creates a new `Map` widget starting at the viewport of the configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - A type that implements `MapConfig`, which provides configuration for the map.
    pub fn new<C: MapConfig + 'static>(config: C) -> Self {
        let viewport = config.default_viewport();
        Self::with_viewport(config, viewport)
    }

    /// Creates a new `Map` widget starting at `viewport`.
    pub fn with_viewport<C: MapConfig + 'static>(config: C, viewport: ViewportConfig) -> Self {
        Self {
            tiles: HashMap::new(),
            mouse_pos: None,
            config: Box::new(config),
            center: viewport.center,
            zoom: viewport.zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            layers: BTreeMap::new(),
            pending_fit: None,
        }
    }

    /// Adds a layer under `key`, replacing and returning any layer that had the same key.
    pub fn add_layer(
        &mut self,
        key: impl Into<String>,
        layer: impl Layer,
    ) -> Option<Box<dyn Layer>> {
        self.layers.insert(key.into(), Box::new(layer))
    }

    /// Removes the layer under `key`.
    pub fn remove_layer(&mut self, key: &str) -> Option<Box<dyn Layer>> {
        self.layers.remove(key)
    }

    /// All layers on the map, by key.
    pub fn layers(&self) -> &BTreeMap<String, Box<dyn Layer>> {
        &self.layers
    }

    /// Gets the layer under `key` if it is of type `T`.
    pub fn layer<T: Layer>(&self, key: &str) -> Option<&T> {
        self.layers
            .get(key)
            .and_then(|layer| layer.as_any().downcast_ref::<T>())
    }

    /// Gets the layer under `key` mutably if it is of type `T`.
    pub fn layer_mut<T: Layer>(&mut self, key: &str) -> Option<&mut T> {
        self.layers
            .get_mut(key)
            .and_then(|layer| layer.as_any_mut().downcast_mut::<T>())
    }

    /// Centers and zooms the map so that `bounds` is visible as a whole.
    ///
    /// Takes effect the next time the widget is shown.
    pub fn fit_bounds(&mut self, bounds: GeoBounds) {
        self.pending_fit = Some(bounds);
    }

    /// Handles user input for panning and zooming.
    fn handle_input(&mut self, ui: &Ui, rect: &Rect, response: &Response) {
        // Handle panning
        if response.dragged() {
            let delta = response.drag_delta();
            let center_in_tiles_x = lon_to_x(self.center.lon, self.zoom);
            let center_in_tiles_y = lat_to_y(self.center.lat, self.zoom);

            let mut new_center_x = center_in_tiles_x - (delta.x as f64 / TILE_SIZE as f64);
            let mut new_center_y = center_in_tiles_y - (delta.y as f64 / TILE_SIZE as f64);

            // Clamp the new center to the map boundaries.
            let world_size_in_tiles = 2.0_f64.powi(self.zoom as i32);
            let view_size_in_tiles_x = rect.width() as f64 / TILE_SIZE as f64;
            let view_size_in_tiles_y = rect.height() as f64 / TILE_SIZE as f64;

            let min_center_x = view_size_in_tiles_x / 2.0;
            let max_center_x = world_size_in_tiles - view_size_in_tiles_x / 2.0;
            let min_center_y = view_size_in_tiles_y / 2.0;
            let max_center_y = world_size_in_tiles - view_size_in_tiles_y / 2.0;

            // If the map is smaller than the viewport, center it. Otherwise, clamp the center.
            new_center_x = if min_center_x > max_center_x {
                world_size_in_tiles / 2.0
            } else {
                new_center_x.clamp(min_center_x, max_center_x)
            };
            new_center_y = if min_center_y > max_center_y {
                world_size_in_tiles / 2.0
            } else {
                new_center_y.clamp(min_center_y, max_center_y)
            };

            self.center = GeoPos {
                lon: x_to_lon(new_center_x, self.zoom),
                lat: y_to_lat(new_center_y, self.zoom),
            };
        }

        // Handle double-click to zoom and center
        if response.double_clicked() {
            if let Some(pointer_pos) = response.interact_pointer_pos() {
                let new_zoom = (self.zoom + 1).clamp(MIN_ZOOM, MAX_ZOOM);

                if new_zoom != self.zoom {
                    // Determine the geo-coordinate under the mouse cursor before the zoom
                    let target = MapProjection::new(self.zoom, self.center, *rect)
                        .unproject(pointer_pos);

                    // Set the new zoom level and center the map on the clicked location
                    self.zoom = new_zoom;
                    self.center = target;
                }
            }
        }

        // Handle zooming and mouse position
        if response.hovered() {
            if let Some(mouse_pos) = response.hover_pos() {
                let mouse_rel = mouse_pos - rect.min;

                // Determine the geo-coordinate under the mouse cursor.
                let center_x = lon_to_x(self.center.lon, self.zoom);
                let center_y = lat_to_y(self.center.lat, self.zoom);
                let widget_center_x = rect.width() as f64 / 2.0;
                let widget_center_y = rect.height() as f64 / 2.0;

                let target_x = center_x + (mouse_rel.x as f64 - widget_center_x) / TILE_SIZE as f64;
                let target_y = center_y + (mouse_rel.y as f64 - widget_center_y) / TILE_SIZE as f64;

                self.mouse_pos = Some(GeoPos {
                    lon: x_to_lon(target_x, self.zoom),
                    lat: y_to_lat(target_y, self.zoom),
                });

                let scroll = ui.input(|i| i.raw_scroll_delta.y);
                if scroll != 0.0 {
                    let old_zoom = self.zoom;
                    let mut new_zoom = (self.zoom as i32 + scroll.signum() as i32)
                        .clamp(MIN_ZOOM as i32, MAX_ZOOM as i32)
                        as u8;

                    // If we are zooming out, check if the new zoom level is valid.
                    if scroll < 0.0 {
                        let world_pixel_size = 2.0_f64.powi(new_zoom as i32) * TILE_SIZE as f64;
                        // If the world size would become smaller than the widget size, reject the zoom.
                        if world_pixel_size < rect.width() as f64
                            || world_pixel_size < rect.height() as f64
                        {
                            new_zoom = old_zoom;
                        }
                    }

                    if new_zoom != old_zoom {
                        let target_lon = x_to_lon(target_x, old_zoom);
                        let target_lat = y_to_lat(target_y, old_zoom);

                        self.zoom = new_zoom;

                        // Adjust the map center so the geo-coordinate under the mouse remains the
                        // same
                        let new_target_x = lon_to_x(target_lon, new_zoom);
                        let new_target_y = lat_to_y(target_lat, new_zoom);

                        let new_center_x = new_target_x
                            - (mouse_rel.x as f64 - widget_center_x) / TILE_SIZE as f64;
                        let new_center_y = new_target_y
                            - (mouse_rel.y as f64 - widget_center_y) / TILE_SIZE as f64;

                        self.center = GeoPos {
                            lon: x_to_lon(new_center_x, new_zoom),
                            lat: y_to_lat(new_center_y, new_zoom),
                        };
                    }
                }
            } else {
                self.mouse_pos = None;
            }
        } else {
            self.mouse_pos = None;
        }
    }

    /// Draws the map tiles.
    fn draw_tiles(&mut self, ui: &mut Ui, painter: &egui::Painter, projection: &MapProjection) {
        painter.rect_filled(projection.widget_rect(), 0.0, Color32::from_rgb(220, 220, 220)); // Background

        let visible: Vec<_> = visible_tiles(projection).collect();
        for (tile_id, tile_pos) in visible {
            load_tile(&mut self.tiles, self.config.as_ref(), ui.ctx(), tile_id);
            draw_tile(&self.tiles, painter, &tile_id, tile_pos, Color32::WHITE);

            if let Some(Tile::Failed(e)) = self.tiles.get(&tile_id) {
                let tile_rect = Rect::from_min_size(
                    tile_pos,
                    Vec2::new(TILE_SIZE as f32, TILE_SIZE as f32),
                );
                let response = ui.interact(tile_rect, ui.id().with(tile_id), Sense::hover());
                response.on_hover_text(format!("{}", e));
            }
        }
    }

    /// Draws the attribution text.
    fn draw_attribution(&self, ui: &mut Ui, rect: &Rect) {
        if let Some(attribution) = self.config.attribution() {
            let (_text_color, bg_color) = if ui.visuals().dark_mode {
                (Color32::from_gray(230), Color32::from_black_alpha(150))
            } else {
                (Color32::from_gray(80), Color32::from_white_alpha(150))
            };

            let frame = egui::Frame::NONE
                .inner_margin(egui::Margin::same(5)) // A bit of padding
                .fill(bg_color)
                .corner_radius(3.0);

            egui::Area::new(ui.id().with("attribution"))
                .fixed_pos(rect.left_bottom())
                .anchor(egui::Align2::LEFT_BOTTOM, egui::vec2(5.0, -5.0))
                .show(ui.ctx(), |ui| {
                    frame.show(ui, |ui| {
                        ui.style_mut().override_text_style = Some(egui::TextStyle::Small);
                        ui.style_mut().wrap_mode = Some(egui::TextWrapMode::Extend); // Don't wrap attribution text.

                        if let Some(url) = self.config.attribution_url() {
                            ui.hyperlink_to(attribution, url);
                        } else {
                            ui.label(attribution);
                        }
                    });
                });
        }
    }
}

/// Returns an iterator over the tiles visible through `projection`, with their screen positions.
fn visible_tiles(projection: &MapProjection) -> impl Iterator<Item = (TileId, egui::Pos2)> {
    let rect = projection.widget_rect();
    let zoom = projection.zoom();
    let top_left = projection.unproject(rect.min);

    let start_x = lon_to_x(top_left.lon, zoom).floor() as i64;
    let start_y = lat_to_y(top_left.lat, zoom).floor() as i64;
    let tiles_x = (rect.width() / TILE_SIZE as f32).ceil() as i64 + 1;
    let tiles_y = (rect.height() / TILE_SIZE as f32).ceil() as i64 + 1;

    let world_size = 1_i64 << zoom;
    let origin = projection.project(GeoPos {
        lon: x_to_lon(start_x as f64, zoom),
        lat: y_to_lat(start_y as f64, zoom),
    });

    (0..tiles_x).flat_map(move |dx| {
        (0..tiles_y).filter_map(move |dy| {
            let x = start_x + dx;
            let y = start_y + dy;
            if x < 0 || y < 0 || x >= world_size || y >= world_size {
                return None;
            }
            let tile_id = TileId {
                z: zoom,
                x: x as u32,
                y: y as u32,
            };
            let tile_pos =
                origin + Vec2::new((dx * TILE_SIZE as i64) as f32, (dy * TILE_SIZE as i64) as f32);
            Some((tile_id, tile_pos))
        })
    })
}

/// Downloads and decodes a tile image on a background thread.
fn download_tile(url: String) -> Promise<Result<egui::ColorImage, Arc<eyre::Report>>> {
    Promise::spawn_thread("download_tile", move || -> Result<_, Arc<eyre::Report>> {
        let result: Result<_, eyre::Report> = (|| {
            debug!("Downloading tile from {}", &url);
            let response = CLIENT.get(&url).send().map_err(MapError::from)?;

            if !response.status().is_success() {
                return Err(MapError::TileDownloadError(response.status().to_string()));
            }

            let bytes = response.bytes().map_err(MapError::from)?.to_vec();
            let image = image::load_from_memory(&bytes)
                .map_err(MapError::from)?
                .to_rgba8();

            let size = [image.width() as _, image.height() as _];
            let pixels = image.into_raw();
            Ok(egui::ColorImage::from_rgba_unmultiplied(size, &pixels))
        })()
        .with_context(|| format!("Failed to download tile from {}", &url));

        result.map_err(Arc::new)
    })
}

/// Starts the download of a tile if it is not cached yet, and moves finished downloads into
/// textures.
fn load_tile(
    tiles: &mut HashMap<TileId, Tile>,
    config: &dyn MapConfig,
    ctx: &egui::Context,
    tile_id: TileId,
) {
    let tile_state = tiles
        .entry(tile_id)
        .or_insert_with(|| Tile::Loading(download_tile(tile_id.to_url(config))));

    // If the tile is loading, check if the promise is ready and update the state.
    if let Tile::Loading(promise) = tile_state {
        if let Some(result) = promise.ready() {
            match result {
                Ok(color_image) => {
                    let texture = ctx.load_texture(
                        format!("tile_{}_{}_{}", tile_id.z, tile_id.x, tile_id.y),
                        color_image.clone(),
                        Default::default(),
                    );
                    *tile_state = Tile::Loaded(texture);
                }
                Err(e) => {
                    error!("{:?}", e);
                    *tile_state = Tile::Failed(e.clone());
                }
            }
        } else {
            // The tile is still loading, so we need to tell egui to repaint.
            ctx.request_repaint();
        }
    }
}

/// Draws a single map tile, or a placeholder if it is not available.
fn draw_tile(
    tiles: &HashMap<TileId, Tile>,
    painter: &egui::Painter,
    tile_id: &TileId,
    tile_pos: egui::Pos2,
    tint: Color32,
) {
    let tile_rect = Rect::from_min_size(tile_pos, Vec2::new(TILE_SIZE as f32, TILE_SIZE as f32));

    let (glyph, glyph_color) = match tiles.get(tile_id) {
        Some(Tile::Loaded(texture)) => {
            painter.image(
                texture.id(),
                tile_rect,
                Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0)),
                tint,
            );
            return;
        }
        Some(Tile::Failed(_)) => ("!", Color32::RED),
        Some(Tile::Loading(_)) | None => ("?", Color32::ORANGE),
    };

    // Draw a gray background and a border for the placeholder.
    painter.rect_filled(tile_rect, 0.0, Color32::from_gray(220));
    painter.rect_stroke(
        tile_rect,
        0.0,
        egui::Stroke::new(1.0, Color32::GRAY),
        egui::StrokeKind::Inside,
    );
    painter.text(
        tile_rect.center(),
        egui::Align2::CENTER_CENTER,
        glyph,
        egui::FontId::proportional(40.0),
        glyph_color,
    );
}

/// Converts longitude to the x-coordinate of a tile at a given zoom level.
fn lon_to_x(lon: f64, zoom: u8) -> f64 {
    (lon + 180.0) / 360.0 * (2.0_f64.powi(zoom as i32))
}

/// Converts latitude to the y-coordinate of a tile at a given zoom level.
fn lat_to_y(lat: f64, zoom: u8) -> f64 {
    (1.0 - lat.to_radians().tan().asinh() / std::f64::consts::PI) / 2.0
        * (2.0_f64.powi(zoom as i32))
}

/// Converts the x-coordinate of a tile to longitude at a given zoom level.
fn x_to_lon(x: f64, zoom: u8) -> f64 {
    x / (2.0_f64.powi(zoom as i32)) * 360.0 - 180.0
}

/// Converts the y-coordinate of a tile to latitude at a given zoom level.
fn y_to_lat(y: f64, zoom: u8) -> f64 {
    let n = std::f64::consts::PI - 2.0 * std::f64::consts::PI * y / (2.0_f64.powi(zoom as i32));
    n.sinh().atan().to_degrees()
}

impl Widget for &mut Map {
    fn ui(self, ui: &mut Ui) -> Response {
        let (rect, response) =
            ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());

        if let Some(bounds) = self.pending_fit.take() {
            let (center, zoom) = zoom_to_fit(&bounds, rect.size());
            self.center = center;
            self.zoom = zoom;
        }

        let projection =
            MapProjection::new(self.zoom, self.center, rect).with_widget_id(response.id);
        let mut input_handled = false;
        for layer in self.layers.values_mut() {
            input_handled |= layer.handle_input(&response, &projection);
        }
        if !input_handled {
            self.handle_input(ui, &rect, &response);
        }

        // Panning and zooming may have moved the map.
        let projection =
            MapProjection::new(self.zoom, self.center, rect).with_widget_id(response.id);
        let painter = ui.painter_at(rect);
        self.draw_tiles(ui, &painter, &projection);
        for layer in self.layers.values() {
            layer.draw(&painter, &projection);
        }
        self.draw_attribution(ui, &rect);

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OpenStreetMapConfig;
    use crate::layers::zoning::ZoningLayer;
    use egui::vec2;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_coord_conversion_roundtrip() {
        let original_lon = 2.3522;
        let original_lat = 48.8566;
        let zoom: u8 = 10;

        let x = lon_to_x(original_lon, zoom);
        let y = lat_to_y(original_lat, zoom);

        let final_lon = x_to_lon(x, zoom);
        let final_lat = y_to_lat(y, zoom);

        assert!((original_lon - final_lon).abs() < EPSILON);
        assert!((original_lat - final_lat).abs() < EPSILON);

        let original_lon = -4.4861;
        let original_lat = 48.3904;

        let x = lon_to_x(original_lon, zoom);
        let y = lat_to_y(original_lat, zoom);

        assert!((original_lon - x_to_lon(x, zoom)).abs() < EPSILON);
        assert!((original_lat - y_to_lat(y, zoom)).abs() < EPSILON);
    }

    #[test]
    fn test_y_to_lat_conversion() {
        // y, zoom, expected_lat
        let test_cases = vec![
            // Equator
            (0.5, 0, 0.0),
            (128.0, 8, 0.0),
            // Near poles (Mercator projection limits)
            (0.0, 0, 85.0511287798),
            (1.0, 0, -85.0511287798),
            (0.0, 8, 85.0511287798),
            (256.0, 8, -85.0511287798),
        ];

        for (y, zoom, expected_lat) in test_cases {
            assert!((y_to_lat(y, zoom) - expected_lat).abs() < EPSILON);
        }
    }

    #[test]
    fn test_lon_to_x_conversion() {
        // lon, zoom, expected_x
        let test_cases = vec![
            // Center of the map
            (0.0, 0, 0.5),
            (0.0, 8, 128.0),
            // Edges of the map
            (-180.0, 0, 0.0),
            (180.0, 0, 1.0),
            (-180.0, 8, 0.0),
            (180.0, 8, 256.0),
        ];

        for (lon, zoom, expected_x) in test_cases {
            assert!((lon_to_x(lon, zoom) - expected_x).abs() < EPSILON);
        }
    }

    #[test]
    fn test_tile_id_to_url() {
        let config = OpenStreetMapConfig::default();
        let tile_id = TileId {
            z: 6,
            x: 32,
            y: 22,
        };
        let url = tile_id.to_url(&config);
        assert_eq!(url, "https://a.tile.openstreetmap.org/6/32/22.png");
    }

    #[test]
    fn test_map_new() {
        let map = Map::new(OpenStreetMapConfig::default());

        assert_eq!(map.center, ViewportConfig::FRANCE.center);
        assert_eq!(map.zoom, 6);
        assert!(map.mouse_pos.is_none());
        assert!(map.tiles.is_empty());
        assert!(map.layers().is_empty());
    }

    #[test]
    fn test_map_with_viewport_clamps_zoom() {
        let viewport = ViewportConfig {
            center: GeoPos { lon: 5.0, lat: 45.0 },
            zoom: 30,
        };
        let map = Map::with_viewport(OpenStreetMapConfig::default(), viewport);
        assert_eq!(map.center, viewport.center);
        assert_eq!(map.zoom, MAX_ZOOM);
    }

    #[test]
    fn test_map_layers() {
        let mut map = Map::new(OpenStreetMapConfig::default());
        assert!(map.add_layer("zoning", ZoningLayer::default()).is_none());
        assert!(map.layer::<ZoningLayer>("zoning").is_some());
        assert!(map.layer_mut::<ZoningLayer>("zoning").is_some());
        assert!(map.layer::<ZoningLayer>("missing").is_none());

        // Adding under the same key replaces the previous layer.
        assert!(map.add_layer("zoning", ZoningLayer::default()).is_some());
        assert_eq!(map.layers().len(), 1);

        assert!(map.remove_layer("zoning").is_some());
        assert!(map.layers().is_empty());
    }

    #[test]
    fn test_visible_tiles_cover_viewport() {
        let rect = Rect::from_min_size(pos2(0.0, 0.0), vec2(512.0, 512.0));
        let projection = MapProjection::new(1, GeoPos { lon: 0.0, lat: 0.0 }, rect);

        // At zoom 1 the whole world is 2x2 tiles and exactly fills the view.
        let tiles: Vec<_> = visible_tiles(&projection).collect();
        assert_eq!(tiles.len(), 4);
        for (tile_id, tile_pos) in tiles {
            assert_eq!(tile_id.z, 1);
            assert!((tile_pos.x - tile_id.x as f32 * 256.0).abs() < 1e-3);
            assert!((tile_pos.y - tile_id.y as f32 * 256.0).abs() < 1e-3);
        }
    }
}
