#![warn(clippy::all, rust_2018_idioms)]

pub mod canvas;
pub mod color;
pub mod config;
pub mod error;
pub mod geometry;
pub mod image;
pub mod persistence;
pub mod renderer;
pub mod scene;
pub mod shape;
pub mod transform;

pub use canvas::Canvas;
pub use color::{Color, ColorSlot};
pub use config::{CanvasConfig, ImageConfig, NibConfig};
pub use error::{ColorError, ImageLoadError, SceneError, ShapeError, TransformError};
pub use geometry::BBox;
pub use image::{Bitmap, FileImageLoader, ImageLoader, ImageSource, LoadedImage};
pub use persistence::{SceneRecord, ShapeRecord};
pub use renderer::{DisplayList, DrawCommand, Renderer, Size, StrokeStyle};
pub use scene::{Hit, PaintReport, Scene};
pub use shape::{Geometry, Nib, PaintContext, PointerDrag, Selection, Shape, ShapeId, ShapeKind};
pub use transform::{Transform, TransformRecord};
