//! Persisted record types for scenes and shapes.
//!
//! These mirror the stored JSON exactly; conversion to and from live
//! [`crate::Shape`]s and [`crate::Scene`]s happens in those types.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::color::TRANSPARENT_LEGACY;
use crate::transform::TransformRecord;

pub const CANVAS_CLASS: &str = "Canvas";
pub const MIME_PREFIX: &str = "application/vnd.nextthought.";

/// `application/vnd.nextthought.<class in lower case>`.
pub fn mime_type_for(class: &str) -> String {
    format!("{MIME_PREFIX}{}", class.to_ascii_lowercase())
}

fn transparent() -> String {
    TRANSPARENT_LEGACY.to_string()
}

fn canvas_class() -> String {
    CANVAS_CLASS.to_string()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

/// Numeric fields were historically stored both as numbers and as strings.
fn number_or_string<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrString::Number(n)) => Ok(Some(n)),
        Some(NumberOrString::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(NumberOrString::Text(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid number: {s:?}"))),
    }
}

/// Whole numbers go out as integers, anything else as a float.
fn whole_number<S>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(n) if n.fract() == 0.0 && n.abs() < i64::MAX as f64 => serializer.serialize_i64(*n as i64),
        Some(n) => serializer.serialize_f64(*n),
        None => serializer.serialize_none(),
    }
}

/// One persisted shape.
///
/// Keys this crate does not know about are kept in `extra` and written back
/// unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeRecord {
    #[serde(rename = "Class")]
    pub class: String,

    #[serde(rename = "MimeType", default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,

    #[serde(default)]
    pub transform: TransformRecord,

    #[serde(rename = "fillRGBAColor", default = "transparent")]
    pub fill: String,

    #[serde(rename = "strokeRGBAColor", default = "transparent")]
    pub stroke: String,

    #[serde(
        rename = "strokeWidth",
        default,
        deserialize_with = "number_or_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub stroke_width: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<f64>>,

    /// Polygon side count. Kept as read (it may be negative or fractional);
    /// [`crate::Shape::from_record`] decides what it means.
    #[serde(
        default,
        deserialize_with = "number_or_string",
        serialize_with = "whole_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub sides: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(rename = "font-face", default, skip_serializing_if = "Option::is_none")]
    pub font_face: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ShapeRecord {
    /// An empty record of the given class, colors transparent.
    pub fn new(class: &str) -> Self {
        Self {
            class: class.to_string(),
            mime_type: Some(mime_type_for(class)),
            transform: TransformRecord::default(),
            fill: transparent(),
            stroke: transparent(),
            stroke_width: None,
            points: None,
            sides: None,
            text: None,
            font_face: None,
            url: None,
            extra: Map::new(),
        }
    }
}

/// A persisted scene.
///
/// Shapes are kept as raw JSON values so one malformed or unknown entry can be
/// skipped without rejecting the whole scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneRecord {
    #[serde(rename = "Class", default = "canvas_class")]
    pub class: String,

    #[serde(rename = "MimeType", default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,

    #[serde(rename = "viewportRatio", default, skip_serializing_if = "Option::is_none")]
    pub viewport_ratio: Option<f64>,

    #[serde(rename = "shapeList", default)]
    pub shape_list: Vec<Value>,

    #[serde(rename = "NTIID", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SceneRecord {
    pub fn is_canvas(&self) -> bool {
        self.class.eq_ignore_ascii_case(CANVAS_CLASS)
    }
}
