//! Shapes: the drawable, editable items of a scene.
//!
//! A [`Shape`] holds what every kind shares (transform, colors, stroke width,
//! selection) plus a [`Geometry`] with the kind-specific data. Geometry is laid
//! out in a unit space that the shape's transform positions on a canvas whose
//! width is 1; painting scales everything by the real surface width.

mod circle;
pub mod image;
pub mod line;
pub mod nib;
pub mod path;
pub mod polygon;
mod resize;
pub mod text;

use std::fmt;

use log::{error, warn};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::color::{Color, ColorSlot};
use crate::config::NibConfig;
use crate::error::{ShapeError, ShapeResult, TransformError};
use crate::geometry::{BBox, Point, hit_testing};
use crate::image::ImageLoader;
use crate::persistence::{ShapeRecord, mime_type_for};
use crate::renderer::{LineCap, Renderer, StrokeStyle};
use crate::transform::Transform;

pub use self::image::Image;
pub use self::nib::{Nib, NibHandle, NibMap};
pub use self::path::Path;
pub use self::polygon::Polygon;
pub use self::text::Text;

/// Identifies a shape for the lifetime of the process. Not persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeId(Uuid);

impl ShapeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ShapeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Circle,
    Line,
    Path,
    Polygon,
    Text,
    Image,
}

/// Persisted discriminator of each kind.
const CLASSES: [(ShapeKind, &str); 6] = [
    (ShapeKind::Circle, "CanvasCircleShape"),
    (ShapeKind::Line, "CanvasLineShape"),
    (ShapeKind::Path, "CanvasPathShape"),
    (ShapeKind::Polygon, "CanvasPolygonShape"),
    (ShapeKind::Text, "CanvasTextShape"),
    (ShapeKind::Image, "CanvasUrlShape"),
];

impl ShapeKind {
    /// Look up a persisted discriminator, ignoring ASCII case.
    pub fn from_class(class: &str) -> Option<ShapeKind> {
        CLASSES
            .iter()
            .find(|(_, name)| name.eq_ignore_ascii_case(class))
            .map(|(kind, _)| *kind)
    }

    pub fn class(&self) -> &'static str {
        CLASSES
            .iter()
            .find(|(kind, _)| kind == self)
            .map_or("CanvasShape", |(_, name)| *name)
    }

    pub fn mime_type(&self) -> String {
        mime_type_for(self.class())
    }
}

/// Whether a shape shows its handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Off,
    /// Selected with resize and rotate handles.
    Hand,
}

/// Kind-specific data of a shape.
#[derive(Debug, Clone)]
pub enum Geometry {
    Circle,
    /// Length and direction live in the transform.
    Line,
    Path(Path),
    Polygon(Polygon),
    Text(Text),
    Image(Image),
}

impl Geometry {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Geometry::Circle => ShapeKind::Circle,
            Geometry::Line => ShapeKind::Line,
            Geometry::Path(_) => ShapeKind::Path,
            Geometry::Polygon(_) => ShapeKind::Polygon,
            Geometry::Text(_) => ShapeKind::Text,
            Geometry::Image(_) => ShapeKind::Image,
        }
    }
}

/// Resolved fill and stroke for one paint pass.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Paint {
    pub fill: Option<Color>,
    pub stroke: Option<StrokeStyle>,
}

impl Paint {
    pub fn with_round_caps(&self) -> Paint {
        Paint {
            fill: self.fill,
            stroke: self.stroke.map(|style| style.with_cap(LineCap::Round)),
        }
    }

    /// Fill, then stroke, the current path with whatever resolved.
    pub fn fill_and_stroke<R: Renderer + ?Sized>(&self, renderer: &mut R) {
        if let Some(color) = &self.fill {
            renderer.fill(color);
        }
        if let Some(style) = &self.stroke {
            renderer.stroke(style);
        }
    }
}

/// Collaborators a shape needs while painting.
#[derive(Clone, Copy)]
pub struct PaintContext<'a> {
    pub images: &'a dyn ImageLoader,
    pub nibs: &'a NibConfig,
}

impl<'a> PaintContext<'a> {
    pub fn new(images: &'a dyn ImageLoader, nibs: &'a NibConfig) -> Self {
        Self { images, nibs }
    }
}

/// A pointer drag over a nib, in unit space.
///
/// `(x, y)` is the current pointer position and `(prev_x, prev_y)` where it
/// was on the previous event; `(dx, dy)` is the movement between them.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerDrag {
    pub x: f64,
    pub y: f64,
    pub prev_x: f64,
    pub prev_y: f64,
    pub dx: f64,
    pub dy: f64,
}

impl PointerDrag {
    pub fn new(x: f64, y: f64, prev_x: f64, prev_y: f64, dx: f64, dy: f64) -> Self {
        Self { x, y, prev_x, prev_y, dx, dy }
    }

    /// A drag from `prev` to `current`.
    pub fn between(prev: Point, current: Point) -> Self {
        Self::new(
            current.0,
            current.1,
            prev.0,
            prev.1,
            current.0 - prev.0,
            current.1 - prev.1,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Painted {
    bbox: BBox,
    surface_width: f64,
}

/// A drawable item of a scene.
#[derive(Debug, Clone)]
pub struct Shape {
    id: ShapeId,
    transform: Transform,
    fill: ColorSlot,
    stroke: ColorSlot,
    stroke_width: f64,
    selected: Selection,
    geometry: Geometry,
    painted: Option<Painted>,
    nibs: Option<NibMap>,
    extra: Map<String, Value>,
}

impl Shape {
    fn with_geometry(geometry: Geometry) -> Self {
        Self {
            id: ShapeId::new(),
            transform: Transform::identity(),
            fill: ColorSlot::default(),
            stroke: ColorSlot::default(),
            stroke_width: 0.0,
            selected: Selection::Off,
            geometry,
            painted: None,
            nibs: None,
            extra: Map::new(),
        }
    }

    pub fn circle() -> Self {
        Self::with_geometry(Geometry::Circle)
    }

    pub fn line() -> Self {
        Self::with_geometry(Geometry::Line)
    }

    /// A smoothed polyline through `[x0, y0, x1, y1, ...]`.
    pub fn path(points: Vec<f64>) -> Self {
        Self::with_geometry(Geometry::Path(Path::new(points)))
    }

    /// A regular polygon. Two sides or fewer make a line instead.
    pub fn polygon(sides: u32) -> Self {
        if sides <= 2 {
            return Self::line();
        }
        Self::with_geometry(Geometry::Polygon(Polygon::new(sides)))
    }

    pub fn text(text: impl Into<String>, font_face: Option<String>) -> Self {
        Self::with_geometry(Geometry::Text(Text::new(text.into(), font_face)))
    }

    pub fn image(url: Option<String>) -> Self {
        Self::with_geometry(Geometry::Image(Image::new(url)))
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_fill(mut self, color: impl Into<String>) -> Self {
        self.fill.set(Some(color.into()));
        self
    }

    pub fn with_stroke(mut self, color: impl Into<String>) -> Self {
        self.stroke.set(Some(color.into()));
        self
    }

    pub fn with_stroke_width(mut self, width: f64) -> Self {
        self.stroke_width = width;
        self
    }

    pub fn id(&self) -> ShapeId {
        self.id
    }

    pub fn kind(&self) -> ShapeKind {
        self.geometry.kind()
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn geometry_mut(&mut self) -> &mut Geometry {
        &mut self.geometry
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    pub fn fill(&self) -> Option<&str> {
        self.fill.value()
    }

    pub fn set_fill(&mut self, color: Option<String>) {
        self.fill.set(color);
    }

    pub fn stroke(&self) -> Option<&str> {
        self.stroke.value()
    }

    pub fn set_stroke(&mut self, color: Option<String>) {
        self.stroke.set(color);
    }

    pub fn stroke_width(&self) -> f64 {
        self.stroke_width
    }

    pub fn set_stroke_width(&mut self, width: f64) {
        self.stroke_width = width;
    }

    pub fn selection(&self) -> Selection {
        self.selected
    }

    pub fn is_selected(&self) -> bool {
        self.selected != Selection::Off
    }

    /// Change selection. Handles disappear immediately when deselected and
    /// appear on the next paint when selected.
    pub fn set_selection(&mut self, selection: Selection) {
        self.selected = selection;
        if selection == Selection::Off {
            self.nibs = None;
        }
    }

    /// Bounding box from the last paint, in unit space.
    pub fn bbox(&self) -> Option<BBox> {
        self.painted.map(|painted| painted.bbox)
    }

    /// Handles recorded by the last paint while selected.
    pub fn nibs(&self) -> Option<&NibMap> {
        self.nibs.as_ref()
    }

    /// Record keys this crate does not interpret, kept for write-back.
    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    /// Paths have no natural up, so they get no rotate handle.
    pub fn rotation_enabled(&self) -> bool {
        !matches!(self.geometry, Geometry::Path(_))
    }

    /// Unit-to-device transform for a surface `surface_width` pixels wide,
    /// including an image's orientation correction.
    pub fn device_transform(&self, surface_width: f64) -> Transform {
        let mut device = self.transform.scaled_all(surface_width);
        if let Geometry::Image(image) = &self.geometry {
            if let Some(orientation) = image.orientation() {
                device.multiply(orientation);
            }
        }
        device
    }

    /// Transform pushed to the renderer before tracing the geometry.
    fn surface_transform(&self, surface_width: f64) -> Transform {
        match self.geometry {
            Geometry::Line => line::surface_transform(&self.transform, surface_width),
            _ => self.device_transform(surface_width),
        }
    }

    fn resolve_paint(&mut self, surface_width: f64, scale: f64) -> Paint {
        let fill = match self.geometry {
            Geometry::Line => None,
            _ => self.fill.resolve(),
        };

        let line_width = self.stroke_width * surface_width / scale;
        let line_width = if line_width.is_finite() { line_width } else { 0.0 };
        let stroke = self
            .stroke
            .resolve()
            .filter(|_| line_width != 0.0)
            .map(|color| StrokeStyle::new(color, line_width));

        Paint { fill, stroke }
    }

    /// Paint onto `renderer`, recording the bounding box and, when selected,
    /// the handle positions.
    ///
    /// The caller owns save/restore around this call. Image shapes wait for
    /// their bitmap; one without a url paints nothing and succeeds.
    pub async fn draw<R: Renderer + ?Sized>(&mut self, renderer: &mut R, ctx: &PaintContext<'_>) -> ShapeResult<()> {
        if let Geometry::Image(image) = &mut self.geometry {
            if !image.ensure_loaded(ctx.images).await? {
                self.painted = None;
                self.nibs = None;
                return Ok(());
            }
        }

        let width = renderer.size().width;
        let surface = self.surface_transform(width);
        let scale = surface.decompose_scale_averaged();
        surface.apply_to_surface(renderer);

        let paint = self.resolve_paint(width, scale);
        let bbox = match &mut self.geometry {
            Geometry::Circle => circle::draw(renderer, &paint),
            Geometry::Line => line::draw(renderer, &self.transform, &paint, self.stroke_width),
            Geometry::Path(path) => path.draw(renderer, &paint),
            Geometry::Polygon(polygon) => polygon.draw(renderer, &paint),
            Geometry::Text(text) => text.draw(renderer, &paint),
            Geometry::Image(image) => image.draw(renderer).unwrap_or_default(),
        };
        self.painted = Some(Painted { bbox, surface_width: width });

        self.nibs = match self.selected {
            Selection::Off => None,
            Selection::Hand => Some(self.paint_nibs(renderer, &bbox, width, ctx.nibs)),
        };
        Ok(())
    }

    fn paint_nibs<R: Renderer + ?Sized>(
        &self,
        renderer: &mut R,
        bbox: &BBox,
        surface_width: f64,
        config: &NibConfig,
    ) -> NibMap {
        let device = self.device_transform(surface_width);
        match self.geometry {
            Geometry::Line => nib::paint_line_nib(renderer, &device, config),
            _ => nib::paint_box_nibs(renderer, &device, bbox, self.rotation_enabled(), config),
        }
    }

    /// Move by `(dx, dy)` unit-space units.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        let (tx, ty) = self.transform.decompose_translation();
        self.transform.set_translation(tx + dx, ty + dy);
    }

    /// Apply a drag on `nib`.
    ///
    /// Edges stretch one axis, corners scale both at the current aspect ratio
    /// and the rotate handle turns the shape toward the pointer. Any handle of
    /// a line moves its free end. On error the transform is unchanged.
    pub fn modify(&mut self, nib: Nib, drag: &PointerDrag) -> ShapeResult<()> {
        match self.modified_transform(nib, drag) {
            Ok(transform) => {
                self.transform = transform;
                Ok(())
            }
            Err(err) => {
                if let ShapeError::UnknownNib(name) = &err {
                    error!("no modifier for nib {name} on {:?} shape", self.kind());
                }
                Err(err)
            }
        }
    }

    /// [`Shape::modify`] with a handle name as recorded by an input layer.
    pub fn modify_named(&mut self, nib: &str, drag: &PointerDrag) -> ShapeResult<()> {
        let nib = nib.parse::<Nib>().inspect_err(|err| error!("{err}"))?;
        self.modify(nib, drag)
    }

    fn modified_transform(&self, nib: Nib, drag: &PointerDrag) -> ShapeResult<Transform> {
        if let Geometry::Line = self.geometry {
            return Ok(resize::line_end_to(&self.transform, (drag.x, drag.y)));
        }

        let delta = (drag.dx, drag.dy);
        match nib {
            Nib::Rotate => Ok(resize::rotate_toward(&self.transform, (drag.x, drag.y))),
            Nib::LineEnd => Err(ShapeError::UnknownNib(nib.to_string())),
            _ => {
                let bbox = self.bbox().ok_or(ShapeError::NotPainted)?;
                let pivot = self.resize_pivot(&bbox);
                match nib.edge_axis() {
                    Some(axis) => resize::edge_resize(&self.transform, &bbox, pivot, delta, axis),
                    None => resize::corner_resize(&self.transform, &bbox, pivot, delta, nib),
                }
            }
        }
    }

    /// Local point held fixed while resizing: the middle of a path's points,
    /// the origin for everything else.
    fn resize_pivot(&self, bbox: &BBox) -> Point {
        match self.geometry {
            Geometry::Path(_) => bbox.center(),
            _ => (0.0, 0.0),
        }
    }

    /// The handle under a device-space point, nearest first.
    pub fn is_point_in_nib(&self, x: f64, y: f64) -> Option<Nib> {
        self.nibs.as_ref()?.hit(x, y)
    }

    /// Whether a device-space point falls inside the shape's painted,
    /// possibly rotated, bounding box.
    pub fn is_point_in_shape(&self, x: f64, y: f64) -> bool {
        let Some(painted) = self.painted else {
            warn!("hit test on shape {} before it was painted", self.id);
            return false;
        };

        let device = self.device_transform(painted.surface_width);
        let to_device = |(ux, uy): Point| device.apply(ux, uy);
        let [top_left, bottom_left, _, top_right] = painted.bbox.corners();

        hit_testing::is_point_in_quad((x, y), to_device(top_left), to_device(top_right), to_device(bottom_left))
    }

    /// Build a live shape from a record. `None` when the class is unknown.
    ///
    /// Polygons with two sides or fewer, or with no side count, come back as
    /// lines. A fractional count is truncated.
    pub fn from_record(record: ShapeRecord) -> Option<Shape> {
        let kind = ShapeKind::from_class(&record.class)?;

        let geometry = match kind {
            ShapeKind::Circle => Geometry::Circle,
            ShapeKind::Line => Geometry::Line,
            ShapeKind::Path => Geometry::Path(Path::new(record.points.unwrap_or_default())),
            ShapeKind::Polygon => match record.sides {
                Some(sides) if sides >= 3.0 && sides <= f64::from(u32::MAX) => {
                    Geometry::Polygon(Polygon::new(sides as u32))
                }
                _ => Geometry::Line,
            },
            ShapeKind::Text => Geometry::Text(Text::new(record.text.unwrap_or_default(), record.font_face)),
            ShapeKind::Image => Geometry::Image(Image::new(record.url)),
        };

        let mut shape = Shape::with_geometry(geometry);
        shape.transform = Transform::from(&record.transform);
        shape.fill = ColorSlot::from_legacy(Some(&record.fill));
        shape.stroke = ColorSlot::from_legacy(Some(&record.stroke));
        shape.stroke_width = record.stroke_width.unwrap_or(0.0);
        shape.extra = record.extra;
        Some(shape)
    }

    /// The persisted form. Fails if the transform holds a non-finite value.
    pub fn to_record(&self) -> Result<ShapeRecord, TransformError> {
        let mut record = ShapeRecord::new(self.kind().class());
        record.transform = self.transform.export()?;
        record.fill = self.fill.to_legacy();
        record.stroke = self.stroke.to_legacy();
        record.stroke_width = Some(self.stroke_width);
        record.extra = self.extra.clone();

        match &self.geometry {
            Geometry::Circle | Geometry::Line => {}
            Geometry::Path(path) => record.points = Some(path.points().to_vec()),
            Geometry::Polygon(polygon) => record.sides = Some(f64::from(polygon.sides())),
            Geometry::Text(text) => {
                record.text = Some(text.text().to_string());
                record.font_face = text.font_face().map(str::to_string);
            }
            Geometry::Image(image) => record.url = image.url().map(str::to_string),
        }
        Ok(record)
    }
}
