//! A map that loads a zoning plan and draws it over the basemap.

use egui::{Response, Ui, Widget};
use geojson::FeatureCollection;
use log::{debug, error, info};
use poll_promise::Promise;
use std::sync::Arc;

use crate::Map;
use crate::config::MapConfig;
#[cfg(feature = "openstreetmap")]
use crate::config::OpenStreetMapConfig;
use crate::layers::zoning::ZoningLayer;
use crate::loader::{LoadError, fetch_feature_collection};

/// The key of the zoning layer on the map.
pub const ZONING_LAYER: &str = "zoning";

type LoadResult = Result<FeatureCollection, Arc<LoadError>>;

/// The state of the GeoJSON load.
enum LoadState {
    /// Nothing was requested yet.
    Idle,

    /// The document is being fetched.
    Loading(Promise<LoadResult>),

    /// The document was loaded and its layer added to the map.
    Loaded(FeatureCollection),

    /// The document could not be loaded.
    Failed(Arc<LoadError>),
}

/// A map with a basemap and a zoning layer loaded from a GeoJSON document.
///
/// The document is fetched on a background thread while the map stays interactive. Once it
/// arrives every feature is styled by its `TYPEZONE` and gets a popup; if it cannot be loaded
/// the failure is logged and recorded in [`ZoningMapView::diagnostics`], and only the basemap
/// is shown.
pub struct ZoningMapView {
    map: Map,
    location: String,
    state: LoadState,
    diagnostics: Vec<String>,

    /// Whether to zoom the map onto the zones once they are loaded.
    pub fit_bounds: bool,
}

impl ZoningMapView {
    /// Creates a view over OpenStreetMap, centered on France, and starts loading the GeoJSON
    /// document at `geojson_location`.
    #[cfg(feature = "openstreetmap")]
    pub fn init(geojson_location: impl Into<String>) -> Self {
        Self::new(OpenStreetMapConfig::default(), geojson_location)
    }

    /// Creates a view with the given map configuration and starts loading the GeoJSON document
    /// at `geojson_location`.
    pub fn new<C: MapConfig + 'static>(config: C, geojson_location: impl Into<String>) -> Self {
        let mut view = Self::with_map(Map::new(config));
        view.load(geojson_location);
        view
    }

    fn with_map(map: Map) -> Self {
        Self {
            map,
            location: String::new(),
            state: LoadState::Idle,
            diagnostics: Vec::new(),
            fit_bounds: false,
        }
    }

    /// Sets whether to zoom the map onto the zones once they are loaded.
    pub fn with_fit_bounds(mut self, fit_bounds: bool) -> Self {
        self.fit_bounds = fit_bounds;
        self
    }

    /// Starts loading the GeoJSON document at `location`.
    ///
    /// A load that is still pending is abandoned and its result ignored. The current zoning
    /// layer stays on the map until the new document has been loaded.
    pub fn load(&mut self, location: impl Into<String>) {
        let location = location.into();
        debug!("Loading zoning from {}", location);

        let url = location.clone();
        let promise = Promise::spawn_thread("load_geojson", move || {
            fetch_feature_collection(&url).map_err(Arc::new)
        });
        self.start(location, promise);
    }

    fn start(&mut self, location: String, promise: Promise<LoadResult>) {
        self.location = location;
        self.state = LoadState::Loading(promise);
    }

    /// Checks whether the pending load has finished and, if so, adds the zoning layer or
    /// records the failure. Returns `true` while the load is still pending.
    pub fn poll(&mut self) -> bool {
        match std::mem::replace(&mut self.state, LoadState::Idle) {
            LoadState::Loading(promise) => match promise.try_take() {
                Ok(result) => {
                    self.finish(result);
                    false
                }
                Err(promise) => {
                    self.state = LoadState::Loading(promise);
                    true
                }
            },
            state => {
                self.state = state;
                false
            }
        }
    }

    fn finish(&mut self, result: LoadResult) {
        match result {
            Ok(collection) => {
                let layer = ZoningLayer::from_collection(&collection);
                info!(
                    "Loaded {} zoning features from {}",
                    layer.features().len(),
                    self.location
                );

                if self.fit_bounds {
                    if let Some(bounds) = layer.bounds() {
                        self.map.fit_bounds(bounds);
                    }
                }
                self.map.add_layer(ZONING_LAYER, layer);
                self.state = LoadState::Loaded(collection);
            }
            Err(e) => {
                let report = eyre::Report::new(e.clone())
                    .wrap_err(format!("Error loading GeoJSON from `{}`", self.location));
                error!("{:?}", report);

                let message = report
                    .chain()
                    .map(|cause| cause.to_string())
                    .collect::<Vec<_>>()
                    .join(": ");
                self.diagnostics.push(message);
                self.state = LoadState::Failed(e);
            }
        }
    }

    /// The location of the current or last GeoJSON load.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Whether the GeoJSON document is still being fetched.
    pub fn is_loading(&self) -> bool {
        matches!(self.state, LoadState::Loading(_))
    }

    /// The loaded document, if the last load succeeded.
    pub fn collection(&self) -> Option<&FeatureCollection> {
        match &self.state {
            LoadState::Loaded(collection) => Some(collection),
            _ => None,
        }
    }

    /// The error of the last load, if it failed.
    pub fn error(&self) -> Option<&LoadError> {
        match &self.state {
            LoadState::Failed(e) => Some(e.as_ref()),
            _ => None,
        }
    }

    /// One message per failed load, with its causes.
    pub fn diagnostics(&self) -> &[String] {
        &self.diagnostics
    }

    /// The zoning layer, once a document has been loaded.
    pub fn zoning_layer(&self) -> Option<&ZoningLayer> {
        self.map.layer::<ZoningLayer>(ZONING_LAYER)
    }

    /// The underlying map widget.
    pub fn map(&self) -> &Map {
        &self.map
    }

    /// The underlying map widget, mutably.
    pub fn map_mut(&mut self) -> &mut Map {
        &mut self.map
    }
}

impl Widget for &mut ZoningMapView {
    fn ui(self, ui: &mut Ui) -> Response {
        let loading = self.poll();
        let response = ui.add(&mut self.map);

        if loading {
            egui::Area::new(ui.id().with("zoning_loading"))
                .fixed_pos(response.rect.right_top())
                .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-8.0, 8.0))
                .show(ui.ctx(), |ui| {
                    ui.spinner();
                });
            // The fetch finishes on another thread, so keep polling.
            ui.ctx().request_repaint();
        }

        response
    }
}
