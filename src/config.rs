use serde::{Deserialize, Serialize};

/// Default width/height ratio for new scenes.
pub const GOLDEN_RATIO: f64 = 1.6180;

/// Tunables shared by the scene, the shapes' handle painting and the image loader.
///
/// Every field has a default, so a JSON document only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Opaque color the surface is cleared to before each paint.
    pub background: String,
    /// Viewport ratio for scenes created without one.
    pub viewport_ratio: f64,
    pub nibs: NibConfig,
    pub images: ImageConfig,
}

/// Handle sizes in device pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NibConfig {
    /// Radius of the round corner handles.
    pub corner_radius: f64,
    /// Side of the square edge handles; also their hit radius.
    pub edge_size: f64,
    /// Side of the rotation handle square.
    pub rotate_size: f64,
    /// How far right of the shape the rotation handle sits.
    pub rotate_offset: f64,
    /// Radius of a line's end handle.
    pub line_end_radius: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    pub max_width: u32,
    pub max_height: u32,
    /// Side of the square bitmap substituted for a failed image.
    pub placeholder_size: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            background: "#ffffff".to_string(),
            viewport_ratio: GOLDEN_RATIO,
            nibs: NibConfig::default(),
            images: ImageConfig::default(),
        }
    }
}

impl Default for NibConfig {
    fn default() -> Self {
        Self {
            corner_radius: 6.0,
            edge_size: 8.0,
            rotate_size: 12.0,
            rotate_offset: 50.0,
            line_end_radius: 7.0,
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_width: 1024,
            max_height: 768,
            placeholder_size: 239,
        }
    }
}

impl ImageConfig {
    /// Largest number of pixels a decoded bitmap may keep.
    pub fn max_pixels(&self) -> u64 {
        u64::from(self.max_width) * u64::from(self.max_height)
    }
}

impl CanvasConfig {
    /// Parse a (possibly partial) JSON config.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
