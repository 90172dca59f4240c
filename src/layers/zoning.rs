//! A layer that draws zoning features and shows their popup when clicked.
//!
//! # Example
//!
//! ```no_run
//! use eframe::egui;
//! use zoning_map_view::{Map, config::OpenStreetMapConfig, layers::zoning::ZoningLayer};
//!
//! struct MyApp {
//!     map: Map,
//! }
//!
//! impl Default for MyApp {
//!   fn default() -> Self {
//!     let mut map = Map::new(OpenStreetMapConfig::default());
//!
//!     let geojson_str = std::fs::read_to_string("demos/data/zoning.geojson").unwrap();
//!     let collection: geojson::FeatureCollection = geojson_str.parse::<geojson::GeoJson>()
//!         .unwrap()
//!         .try_into()
//!         .unwrap();
//!     map.add_layer("zoning", ZoningLayer::from_collection(&collection));
//!
//!     Self { map }
//!   }
//! }
//!
//! impl eframe::App for MyApp {
//!     fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
//!         egui::CentralPanel::default().show(ctx, |ui| {
//!             ui.add(&mut self.map);
//!         });
//!     }
//! }
//! ```

use crate::layers::geojson::{GeoShape, shapes_from_geometry};
use crate::layers::{Layer, dist_sq_to_segment, point_in_rings};
use crate::projection::{GeoBounds, GeoPos, MapProjection};
use crate::zoning::{PopupContent, Style, ZoneProperties, format_popup};
use egui::{Color32, Mesh, Painter, Pos2, Response, RichText, Shape};
use geojson::FeatureCollection;
use log::warn;
use std::any::Any;

// Radius of point markers, in points.
const POINT_RADIUS: f32 = 6.0;
// How far from a line a click still hits it, in points.
const LINE_TOLERANCE: f32 = 4.0;

/// A zoning feature, ready to be drawn.
#[derive(Clone, Debug)]
pub struct ZoneFeature {
    /// The drawable parts of the feature geometry. Empty if the feature has no geometry.
    pub shapes: Vec<GeoShape>,
    /// The properties the style and popup were built from.
    pub properties: ZoneProperties,
    /// How the feature is painted.
    pub style: Style,
    /// The text shown when the feature is clicked.
    pub popup: PopupContent,
}

impl ZoneFeature {
    /// Builds a feature from a GeoJSON feature, computing its style and popup from its own
    /// properties.
    pub fn from_feature(feature: &geojson::Feature) -> Self {
        let properties = ZoneProperties::from_properties(feature.properties.as_ref());
        let shapes = feature
            .geometry
            .as_ref()
            .map(shapes_from_geometry)
            .unwrap_or_default();

        Self {
            shapes,
            style: properties.style(),
            popup: format_popup(&properties),
            properties,
        }
    }

    /// Checks whether a screen position hits the feature.
    fn hit(&self, screen_pos: Pos2, projection: &MapProjection) -> bool {
        self.shapes.iter().any(|shape| match shape {
            GeoShape::Polygon(rings) => {
                let screen_rings: Vec<Vec<Pos2>> = rings
                    .iter()
                    .map(|ring| ring.iter().map(|p| projection.project(*p)).collect())
                    .collect();
                point_in_rings(screen_pos, &screen_rings)
            }
            GeoShape::Line(points) => {
                let tolerance = (LINE_TOLERANCE + self.style.stroke_weight).powi(2);
                points.windows(2).any(|segment| {
                    let a = projection.project(segment[0]);
                    let b = projection.project(segment[1]);
                    dist_sq_to_segment(screen_pos, a, b) < tolerance
                })
            }
            GeoShape::Point(pos) => {
                projection.project(*pos).distance_sq(screen_pos) < POINT_RADIUS.powi(2)
            }
        })
    }

    fn draw(&self, painter: &Painter, projection: &MapProjection) {
        let stroke = self.style.stroke();
        let fill = self.style.fill();

        for shape in &self.shapes {
            match shape {
                GeoShape::Polygon(rings) => draw_polygon(painter, projection, rings, fill, stroke),
                GeoShape::Line(points) => {
                    let screen_points: Vec<Pos2> =
                        points.iter().map(|p| projection.project(*p)).collect();
                    painter.add(Shape::line(screen_points, stroke));
                }
                GeoShape::Point(pos) => {
                    painter.circle(projection.project(*pos), POINT_RADIUS, fill, stroke);
                }
            }
        }
    }
}

fn draw_polygon(
    painter: &Painter,
    projection: &MapProjection,
    rings: &[Vec<GeoPos>],
    fill: Color32,
    stroke: egui::Stroke,
) {
    let screen_rings: Vec<Vec<Pos2>> = rings
        .iter()
        .map(|ring| ring.iter().map(|p| projection.project(*p)).collect())
        .collect();

    // Triangulate the outline and its holes for the fill.
    let mut flat_points = Vec::new();
    let mut hole_indices = Vec::new();
    for (i, ring) in screen_rings.iter().enumerate() {
        if i > 0 {
            hole_indices.push(flat_points.len() / 2);
        }
        flat_points.extend(ring.iter().flat_map(|p| [p.x as f64, p.y as f64]));
    }

    match earcutr::earcut(&flat_points, &hole_indices, 2) {
        Ok(indices) => {
            let mut mesh = Mesh::default();
            mesh.vertices = screen_rings
                .iter()
                .flatten()
                .map(|p| egui::epaint::Vertex {
                    pos: *p,
                    uv: Default::default(),
                    color: fill,
                })
                .collect();
            mesh.indices = indices.into_iter().map(|i| i as u32).collect();
            painter.add(Shape::Mesh(mesh.into()));
        }
        Err(e) => warn!("Unable to triangulate zone polygon: {:?}", e),
    }

    for ring in screen_rings {
        if ring.len() >= 2 {
            painter.add(Shape::Path(egui::epaint::PathShape {
                points: ring,
                closed: true,
                fill: Color32::TRANSPARENT,
                stroke: stroke.into(),
            }));
        }
    }
}

/// The popup that is currently open.
#[derive(Clone, Debug, PartialEq)]
struct OpenPopup {
    feature: usize,
    anchor: GeoPos,
}

/// Layer implementation that draws zoning features with their style, and opens the popup of a
/// feature when it is clicked.
#[derive(Clone, Default)]
pub struct ZoningLayer {
    features: Vec<ZoneFeature>,
    open_popup: Option<OpenPopup>,
}

impl ZoningLayer {
    /// Builds a layer with one entry per feature of the collection, in document order.
    pub fn from_collection(collection: &FeatureCollection) -> Self {
        Self {
            features: collection
                .features
                .iter()
                .map(ZoneFeature::from_feature)
                .collect(),
            open_popup: None,
        }
    }

    /// The features of the layer, in document order.
    pub fn features(&self) -> &[ZoneFeature] {
        &self.features
    }

    /// The geographical bounds of all feature geometry, or `None` if there is none.
    pub fn bounds(&self) -> Option<GeoBounds> {
        self.features
            .iter()
            .flat_map(|feature| &feature.shapes)
            .filter_map(GeoShape::bounds)
            .reduce(|mut acc, bounds| {
                acc.union(&bounds);
                acc
            })
    }

    /// Returns the index of the topmost feature at a screen position.
    pub fn feature_at(&self, screen_pos: Pos2, projection: &MapProjection) -> Option<usize> {
        // Later features are drawn on top, so they are hit first.
        self.features
            .iter()
            .rposition(|feature| feature.hit(screen_pos, projection))
    }

    /// Opens the popup of the feature at `index`, anchored at `anchor`.
    pub fn open_popup(&mut self, index: usize, anchor: GeoPos) {
        if index < self.features.len() {
            self.open_popup = Some(OpenPopup {
                feature: index,
                anchor,
            });
        }
    }

    /// Closes the open popup, if any.
    pub fn close_popup(&mut self) {
        self.open_popup = None;
    }

    /// The open popup and the geographical position it is anchored at.
    pub fn popup(&self) -> Option<(&PopupContent, GeoPos)> {
        let open = self.open_popup.as_ref()?;
        let feature = self.features.get(open.feature)?;
        Some((&feature.popup, open.anchor))
    }

    /// Handles a click at a screen position: opens the popup of the feature there, or closes
    /// the popup if there is no feature.
    pub fn click(&mut self, screen_pos: Pos2, projection: &MapProjection) {
        match self.feature_at(screen_pos, projection) {
            Some(index) => self.open_popup(index, projection.unproject(screen_pos)),
            None => self.close_popup(),
        }
    }

    fn draw_popup(&self, painter: &Painter, projection: &MapProjection) {
        let Some((popup, anchor)) = self.popup() else {
            return;
        };
        let anchor = projection.project(anchor);
        if !painter.clip_rect().contains(anchor) {
            return;
        }

        egui::Area::new(popup_id(projection))
            .order(egui::Order::Foreground)
            .fixed_pos(anchor - egui::vec2(0.0, 8.0))
            .pivot(egui::Align2::CENTER_BOTTOM)
            .interactable(false)
            .show(painter.ctx(), |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.style_mut().wrap_mode = Some(egui::TextWrapMode::Extend);
                    for line in popup.lines() {
                        ui.horizontal(|ui| {
                            ui.label(RichText::new(format!("{}:", line.label)).strong());
                            ui.label(&line.value);
                        });
                    }
                });
            });
    }
}

/// The popup area belongs to the map it is shown on.
fn popup_id(projection: &MapProjection) -> egui::Id {
    projection.widget_id().with("zoning_popup")
}

impl Layer for ZoningLayer {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn handle_input(&mut self, response: &Response, projection: &MapProjection) -> bool {
        if response.clicked() {
            if let Some(pointer_pos) = response.interact_pointer_pos() {
                self.click(pointer_pos, projection);
            }
        }

        if let Some(pointer_pos) = response.hover_pos() {
            if self.feature_at(pointer_pos, projection).is_some() {
                response.ctx.set_cursor_icon(egui::CursorIcon::PointingHand);
            }
        }

        // Features do not block panning or zooming.
        false
    }

    fn draw(&self, painter: &Painter, projection: &MapProjection) {
        for feature in &self.features {
            feature.draw(painter, projection);
        }
        self.draw_popup(painter, projection);
    }
}
