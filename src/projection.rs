//! Map projection.

use egui::{Id, Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};

use crate::{MAX_ZOOM, MIN_ZOOM, TILE_SIZE, lat_to_y, lon_to_x, x_to_lon, y_to_lat};

/// A geographical position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoPos {
    /// Longitude in degrees.
    pub lon: f64,

    /// Latitude in degrees.
    pub lat: f64,
}

impl From<(f64, f64)> for GeoPos {
    /// Converts a `(longitude, latitude)` tuple.
    fn from((lon, lat): (f64, f64)) -> Self {
        Self { lon, lat }
    }
}

impl From<GeoPos> for (f64, f64) {
    fn from(pos: GeoPos) -> Self {
        (pos.lon, pos.lat)
    }
}

/// A geographical bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoBounds {
    /// The south-west corner.
    pub min: GeoPos,

    /// The north-east corner.
    pub max: GeoPos,
}

impl GeoBounds {
    /// Creates bounds covering a single position.
    pub fn from_pos(pos: GeoPos) -> Self {
        Self { min: pos, max: pos }
    }

    /// Grows the bounds to include `pos`.
    pub fn extend(&mut self, pos: GeoPos) {
        self.min.lon = self.min.lon.min(pos.lon);
        self.min.lat = self.min.lat.min(pos.lat);
        self.max.lon = self.max.lon.max(pos.lon);
        self.max.lat = self.max.lat.max(pos.lat);
    }

    /// Grows the bounds to include `other`.
    pub fn union(&mut self, other: &GeoBounds) {
        self.extend(other.min);
        self.extend(other.max);
    }

    /// Returns the bounds of all given positions, or `None` if there are none.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a GeoPos>) -> Option<Self> {
        let mut iter = points.into_iter();
        let mut bounds = Self::from_pos(*iter.next()?);
        for pos in iter {
            bounds.extend(*pos);
        }
        Some(bounds)
    }
}

/// Returns the center and the largest zoom level at which `bounds` fits into a view of `size`
/// points.
pub fn zoom_to_fit(bounds: &GeoBounds, size: Vec2) -> (GeoPos, u8) {
    let center_x = (lon_to_x(bounds.min.lon, 0) + lon_to_x(bounds.max.lon, 0)) / 2.0;
    let center_y = (lat_to_y(bounds.min.lat, 0) + lat_to_y(bounds.max.lat, 0)) / 2.0;
    let center = GeoPos {
        lon: x_to_lon(center_x, 0),
        lat: y_to_lat(center_y, 0),
    };

    let zoom = (MIN_ZOOM..=MAX_ZOOM)
        .rev()
        .find(|&zoom| {
            let width = (lon_to_x(bounds.max.lon, zoom) - lon_to_x(bounds.min.lon, zoom))
                * TILE_SIZE as f64;
            // Latitude grows northwards, tile y grows southwards.
            let height = (lat_to_y(bounds.min.lat, zoom) - lat_to_y(bounds.max.lat, zoom))
                * TILE_SIZE as f64;
            width <= size.x as f64 && height <= size.y as f64
        })
        .unwrap_or(MIN_ZOOM);

    (center, zoom)
}

/// A helper for converting between geographical and screen coordinates.
pub struct MapProjection {
    zoom: u8,
    center_lon: f64,
    center_lat: f64,
    widget_rect: Rect,
    widget_id: Id,
}

impl MapProjection {
    /// Creates a new `MapProjection`.
    pub(crate) fn new(zoom: u8, center: GeoPos, widget_rect: Rect) -> Self {
        Self {
            zoom,
            center_lon: center.lon,
            center_lat: center.lat,
            widget_rect,
            widget_id: Id::NULL,
        }
    }

    /// Tags the projection with the id of the map widget it was made for.
    pub(crate) fn with_widget_id(mut self, widget_id: Id) -> Self {
        self.widget_id = widget_id;
        self
    }

    /// The zoom level this projection was made for.
    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    /// The id of the map widget. Layers derive the ids of their own areas from it.
    pub fn widget_id(&self) -> Id {
        self.widget_id
    }

    /// The screen rectangle of the map widget.
    pub fn widget_rect(&self) -> Rect {
        self.widget_rect
    }

    /// Projects a geographical coordinate to a screen coordinate.
    pub fn project(&self, geo_pos: GeoPos) -> Pos2 {
        let center_x = lon_to_x(self.center_lon, self.zoom);
        let center_y = lat_to_y(self.center_lat, self.zoom);

        let tile_x = lon_to_x(geo_pos.lon, self.zoom);
        let tile_y = lat_to_y(geo_pos.lat, self.zoom);

        let dx = (tile_x - center_x) * TILE_SIZE as f64;
        let dy = (tile_y - center_y) * TILE_SIZE as f64;

        let widget_center = self.widget_rect.center();
        widget_center + egui::vec2(dx as f32, dy as f32)
    }

    /// Un-projects a screen coordinate to a geographical coordinate.
    pub fn unproject(&self, screen_pos: Pos2) -> GeoPos {
        let rel_pos = screen_pos - self.widget_rect.min;
        let widget_center_x = self.widget_rect.width() as f64 / 2.0;
        let widget_center_y = self.widget_rect.height() as f64 / 2.0;

        let center_x = lon_to_x(self.center_lon, self.zoom);
        let center_y = lat_to_y(self.center_lat, self.zoom);

        let target_x = center_x + (rel_pos.x as f64 - widget_center_x) / TILE_SIZE as f64;
        let target_y = center_y + (rel_pos.y as f64 - widget_center_y) / TILE_SIZE as f64;

        GeoPos {
            lon: x_to_lon(target_x, self.zoom),
            lat: y_to_lat(target_y, self.zoom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{pos2, vec2};

    const EPSILON: f64 = 1e-6;

    #[test]
    fn project_unproject_roundtrip() {
        let rect = Rect::from_min_size(pos2(10.0, 20.0), vec2(800.0, 600.0));
        let projection = MapProjection::new(6, GeoPos { lon: 2.3, lat: 46.8 }, rect);

        // The map center lands on the widget center.
        let center = projection.project(GeoPos { lon: 2.3, lat: 46.8 });
        assert!((center.x - rect.center().x).abs() < 1e-3);
        assert!((center.y - rect.center().y).abs() < 1e-3);

        let paris = GeoPos {
            lon: 2.3522,
            lat: 48.8566,
        };
        let back = projection.unproject(projection.project(paris));
        assert!((back.lon - paris.lon).abs() < 1e-3);
        assert!((back.lat - paris.lat).abs() < 1e-3);
    }

    #[test]
    fn geo_bounds_from_points() {
        assert!(GeoBounds::from_points(&Vec::<GeoPos>::new()).is_none());

        let points = [
            GeoPos { lon: 2.0, lat: 48.0 },
            GeoPos { lon: -1.0, lat: 49.5 },
            GeoPos { lon: 3.5, lat: 47.0 },
        ];
        let bounds = GeoBounds::from_points(&points).unwrap();
        assert_eq!(bounds.min, GeoPos { lon: -1.0, lat: 47.0 });
        assert_eq!(bounds.max, GeoPos { lon: 3.5, lat: 49.5 });
    }

    #[test]
    fn zoom_to_fit_small_area_zooms_in() {
        let bounds = GeoBounds {
            min: GeoPos { lon: 2.30, lat: 48.85 },
            max: GeoPos { lon: 2.31, lat: 48.86 },
        };
        let (center, zoom) = zoom_to_fit(&bounds, vec2(800.0, 600.0));
        assert!((center.lon - 2.305).abs() < EPSILON);
        assert!((center.lat - 48.855).abs() < 1e-3);
        assert!(zoom >= 15, "zoom was {zoom}");
    }

    #[test]
    fn zoom_to_fit_whole_world_zooms_out() {
        let bounds = GeoBounds {
            min: GeoPos {
                lon: -180.0,
                lat: -85.0,
            },
            max: GeoPos {
                lon: 180.0,
                lat: 85.0,
            },
        };
        // Two tiles wide fits into 800 points, four does not.
        let (_, zoom) = zoom_to_fit(&bounds, vec2(800.0, 600.0));
        assert_eq!(zoom, 1);

        let (_, zoom) = zoom_to_fit(&bounds, vec2(200.0, 200.0));
        assert_eq!(zoom, MIN_ZOOM);
    }

    #[test]
    fn zoom_to_fit_single_point_uses_max_zoom() {
        let bounds = GeoBounds::from_pos(GeoPos { lon: 2.3, lat: 46.8 });
        let (center, zoom) = zoom_to_fit(&bounds, vec2(800.0, 600.0));
        assert_eq!(zoom, MAX_ZOOM);
        assert!((center.lon - 2.3).abs() < EPSILON);
        assert!((center.lat - 46.8).abs() < EPSILON);
    }
}
