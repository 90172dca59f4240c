//! Styling and popup text for zoning features.
//!
//! Zones come from French urban plans (PLU), where `TYPEZONE` is the class of the zone and
//! `LIBELLE`/`LIBELONG` are its short and long names. The building rules `max_height`,
//! `max_coverage` and `setback_distance` are attached to each zone upstream.

use egui::Color32;
use serde_json::{Map, Value as JsonValue};
use std::fmt;

/// The class of a zone, keyed by its `TYPEZONE` code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ZoneType {
    /// `A`, agricultural zone.
    Agricultural,
    /// `N`, natural zone.
    Natural,
    /// `U`, urban zone.
    Urban,
    /// Any other or missing code.
    Other,
}

impl ZoneType {
    /// Classifies a `TYPEZONE` code. Matching is exact and case-sensitive.
    pub fn from_code(code: Option<&str>) -> Self {
        match code {
            Some("A") => Self::Agricultural,
            Some("N") => Self::Natural,
            Some("U") => Self::Urban,
            _ => Self::Other,
        }
    }

    /// The color used for both the outline and the fill of the zone.
    pub const fn color(self) -> Color32 {
        match self {
            Self::Agricultural => Color32::from_rgb(0xFF, 0xA5, 0x00),
            Self::Natural => Color32::from_rgb(0x22, 0x8B, 0x22),
            Self::Urban => Color32::from_rgb(0x8B, 0x00, 0x00),
            Self::Other => Color32::from_rgb(0x33, 0x88, 0xFF),
        }
    }

    /// The color as a CSS hex string.
    pub const fn hex(self) -> &'static str {
        match self {
            Self::Agricultural => "#FFA500",
            Self::Natural => "#228B22",
            Self::Urban => "#8B0000",
            Self::Other => "#3388ff",
        }
    }
}

/// How a zone is painted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Style {
    /// Color of the outline.
    pub stroke_color: Color32,
    /// Color of the fill, before `fill_opacity` is applied.
    pub fill_color: Color32,
    /// Opacity of the fill, from 0 to 1.
    pub fill_opacity: f32,
    /// Width of the outline in points.
    pub stroke_weight: f32,
}

impl Style {
    /// The fill color with `fill_opacity` applied.
    pub fn fill(&self) -> Color32 {
        self.fill_color.gamma_multiply(self.fill_opacity)
    }

    /// The outline stroke.
    pub fn stroke(&self) -> egui::Stroke {
        egui::Stroke::new(self.stroke_weight, self.stroke_color)
    }
}

const FILL_OPACITY: f32 = 0.3;
const STROKE_WEIGHT: f32 = 2.0;

/// Computes the style of a zone from its `TYPEZONE` code.
pub fn classify(typezone: Option<&str>) -> Style {
    let color = ZoneType::from_code(typezone).color();
    Style {
        stroke_color: color,
        fill_color: color,
        fill_opacity: FILL_OPACITY,
        stroke_weight: STROKE_WEIGHT,
    }
}

/// A scalar property value.
#[derive(Clone, Debug, PartialEq)]
pub enum PropertyValue {
    /// A string value.
    Text(String),
    /// A numeric value.
    Number(f64),
}

impl PropertyValue {
    /// Reads a JSON value, returning `None` for values that count as missing: `null`, `false`,
    /// `""`, `0`, and arrays or objects, which have no textual form in a popup.
    pub fn from_json(value: &JsonValue) -> Option<Self> {
        match value {
            JsonValue::String(s) if !s.is_empty() => Some(Self::Text(s.clone())),
            JsonValue::Number(n) => n.as_f64().filter(|n| *n != 0.0).map(Self::Number),
            JsonValue::Bool(true) => Some(Self::Text("true".to_string())),
            _ => None,
        }
    }

    /// The value as a string, if it is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Number(_) => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            // Integral values print without a fractional part, like `12` rather than `12.0`.
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

/// The properties of a zoning feature that the map uses.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ZoneProperties {
    /// `LIBELLE`, the short name of the zone.
    pub libelle: Option<PropertyValue>,
    /// `TYPEZONE`, the class code of the zone.
    pub typezone: Option<PropertyValue>,
    /// `LIBELONG`, the long description of the zone.
    pub libelong: Option<PropertyValue>,
    /// `max_height`, the maximum building height.
    pub max_height: Option<PropertyValue>,
    /// `max_coverage`, the maximum ground coverage.
    pub max_coverage: Option<PropertyValue>,
    /// `setback_distance`, the minimum distance to the street.
    pub setback_distance: Option<PropertyValue>,
}

impl ZoneProperties {
    /// Reads the zone properties from a GeoJSON property map. Never fails: unusable values are
    /// treated as missing.
    pub fn from_properties(properties: Option<&Map<String, JsonValue>>) -> Self {
        let Some(properties) = properties else {
            return Self::default();
        };
        let get = |key: &str| properties.get(key).and_then(PropertyValue::from_json);

        Self {
            libelle: get("LIBELLE"),
            typezone: get("TYPEZONE"),
            libelong: get("LIBELONG"),
            max_height: get("max_height"),
            max_coverage: get("max_coverage"),
            setback_distance: get("setback_distance"),
        }
    }

    /// The `TYPEZONE` code, if it is a string.
    pub fn typezone_code(&self) -> Option<&str> {
        self.typezone.as_ref().and_then(PropertyValue::as_str)
    }

    /// The style of this zone.
    pub fn style(&self) -> Style {
        classify(self.typezone_code())
    }
}

const UNKNOWN: &str = "Unknown";
const UNKNOWN_TYPE: &str = "?";
const NO_RULE: &str = "None";

/// One labeled line of a popup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PopupLine {
    /// The label, without the colon.
    pub label: &'static str,
    /// The value, or the placeholder of the field.
    pub value: String,
}

/// The text shown when a zone is clicked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PopupContent {
    lines: [PopupLine; 6],
}

impl PopupContent {
    /// The lines, in display order.
    pub fn lines(&self) -> &[PopupLine] {
        &self.lines
    }
}

impl fmt::Display for PopupContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}: {}", line.label, line.value)?;
        }
        Ok(())
    }
}

fn line(label: &'static str, value: &Option<PropertyValue>, placeholder: &str) -> PopupLine {
    PopupLine {
        label,
        value: value
            .as_ref()
            .map_or_else(|| placeholder.to_string(), |v| v.to_string()),
    }
}

/// Builds the popup of a zone.
pub fn format_popup(properties: &ZoneProperties) -> PopupContent {
    PopupContent {
        lines: [
            line("Zone", &properties.libelle, UNKNOWN),
            line("Type", &properties.typezone, UNKNOWN_TYPE),
            line("Description", &properties.libelong, UNKNOWN),
            line("Max Height", &properties.max_height, NO_RULE),
            line("Max Coverage", &properties.max_coverage, NO_RULE),
            line("Setback", &properties.setback_distance, NO_RULE),
        ],
    }
}
