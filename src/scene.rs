use std::collections::VecDeque;

use log::{debug, error, info, warn};
use serde_json::{Map, Value};

use crate::color::Color;
use crate::config::GOLDEN_RATIO;
use crate::error::{SceneError, SceneResult, ShapeError};
use crate::persistence::{CANVAS_CLASS, SceneRecord, ShapeRecord, mime_type_for};
use crate::renderer::Renderer;
use crate::shape::{Nib, PaintContext, Selection, Shape, ShapeId, ShapeKind};
use crate::transform::Transform;

/// Viewport of a scene built around a single image.
pub const IMAGE_VIEWPORT_RATIO: f64 = 16.0 / 9.0;

/// A shape that failed to paint during a scene pass.
#[derive(Debug)]
pub struct ShapeFailure {
    pub id: ShapeId,
    pub error: ShapeError,
}

/// Outcome of one [`Scene::paint`] pass.
#[derive(Debug, Default)]
pub struct PaintReport {
    /// Shapes that painted successfully.
    pub painted: usize,
    pub failures: Vec<ShapeFailure>,
}

impl PaintReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// What [`Scene::shape_at`] found under a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Nib(ShapeId, Nib),
    Shape(ShapeId),
}

impl Hit {
    pub fn shape_id(&self) -> ShapeId {
        match self {
            Hit::Nib(id, _) | Hit::Shape(id) => *id,
        }
    }
}

/// An ordered collection of shapes plus the canvas aspect ratio.
///
/// Shapes are held front first: index 0 is painted last and sits on top. The
/// persisted list runs the other way, back to front.
#[derive(Debug, Clone)]
pub struct Scene {
    shapes: VecDeque<Shape>,
    viewport_ratio: f64,
    id: Option<String>,
    extra: Map<String, Value>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// An empty scene with the golden-ratio viewport.
    pub fn new() -> Self {
        Self::with_viewport_ratio(GOLDEN_RATIO)
    }

    pub fn with_viewport_ratio(viewport_ratio: f64) -> Self {
        Self {
            shapes: VecDeque::new(),
            viewport_ratio,
            id: None,
            extra: Map::new(),
        }
    }

    /// A 16:9 scene holding one image of `width` x `height` pixels, scaled to
    /// fit the viewport and centered in it.
    ///
    /// Images narrower than the viewport fill its height; wider ones fill its
    /// width.
    pub fn from_image(width: u32, height: u32, url: impl Into<String>) -> Scene {
        let ratio = IMAGE_VIEWPORT_RATIO;
        let (w, h) = (f64::from(width.max(1)), f64::from(height.max(1)));
        let tall = w / h < ratio;
        let scale = if tall { 1.0 / ratio / h } else { 1.0 / w };

        let mut transform = Transform::identity();
        transform.translate(0.5, 1.0 / ratio / 2.0);
        transform.scale(scale, None);

        let mut scene = Scene::with_viewport_ratio(ratio);
        scene.add_shape(Shape::image(Some(url.into())).with_transform(transform));
        scene
    }

    pub fn viewport_ratio(&self) -> f64 {
        self.viewport_ratio
    }

    pub fn set_viewport_ratio(&mut self, viewport_ratio: f64) {
        self.viewport_ratio = viewport_ratio;
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn set_id(&mut self, id: Option<String>) {
        self.id = id;
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Shapes front to back.
    pub fn shapes(&self) -> impl DoubleEndedIterator<Item = &Shape> {
        self.shapes.iter()
    }

    pub fn shapes_mut(&mut self) -> impl DoubleEndedIterator<Item = &mut Shape> {
        self.shapes.iter_mut()
    }

    /// Put `shape` on top of everything else.
    pub fn add_shape(&mut self, shape: Shape) -> ShapeId {
        let id = shape.id();
        self.shapes.push_front(shape);
        id
    }

    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.iter().find(|shape| shape.id() == id)
    }

    pub fn get_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.shapes.iter_mut().find(|shape| shape.id() == id)
    }

    pub fn remove(&mut self, id: ShapeId) -> Option<Shape> {
        let index = self.shapes.iter().position(|shape| shape.id() == id)?;
        self.shapes.remove(index)
    }

    /// Select `id` in handle mode and deselect every other shape.
    ///
    /// Returns `false` when no shape has that id.
    pub fn select(&mut self, id: ShapeId) -> bool {
        let mut found = false;
        for shape in self.shapes.iter_mut() {
            if shape.id() == id {
                shape.set_selection(Selection::Hand);
                found = true;
            } else {
                shape.set_selection(Selection::Off);
            }
        }
        found
    }

    pub fn clear_selection(&mut self) {
        for shape in self.shapes.iter_mut() {
            shape.set_selection(Selection::Off);
        }
    }

    /// The top-most thing under a device-space point.
    ///
    /// Handles of selected shapes win over shape bodies so a handle that
    /// overlaps another shape can still be grabbed.
    pub fn shape_at(&self, x: f64, y: f64) -> Option<Hit> {
        self.shapes
            .iter()
            .find_map(|shape| shape.is_point_in_nib(x, y).map(|nib| Hit::Nib(shape.id(), nib)))
            .or_else(|| {
                self.shapes
                    .iter()
                    .find(|shape| shape.is_point_in_shape(x, y))
                    .map(|shape| Hit::Shape(shape.id()))
            })
    }

    /// Clear to `background` and paint every shape back to front.
    ///
    /// Shapes are painted one at a time; an image shape that is still loading
    /// holds up the shapes above it. Each shape runs inside its own
    /// save/restore. A shape that fails is reported and skipped.
    pub async fn paint<R: Renderer + ?Sized>(
        &mut self,
        renderer: &mut R,
        ctx: &PaintContext<'_>,
        background: &Color,
    ) -> PaintReport {
        let size = renderer.size();
        renderer.save();
        renderer.set_transform(&Transform::identity());
        renderer.fill_rect(0.0, 0.0, size.width, size.height, background);
        renderer.restore();

        let mut report = PaintReport::default();
        for shape in self.shapes.iter_mut().rev() {
            renderer.save();
            let result = shape.draw(renderer, ctx).await;
            renderer.restore();

            match result {
                Ok(()) => report.painted += 1,
                Err(err) => {
                    error!("failed to paint shape {}: {err}", shape.id());
                    report.failures.push(ShapeFailure { id: shape.id(), error: err });
                }
            }
        }

        debug!("painted {} shapes, {} failed", report.painted, report.failures.len());
        report
    }

    /// Build a scene from its persisted record.
    ///
    /// Entries with an unknown `Class`, or that do not parse, are logged and
    /// dropped.
    pub fn deserialize(record: SceneRecord) -> SceneResult<Scene> {
        Scene::deserialize_with_ratio(record, GOLDEN_RATIO)
    }

    /// [`Scene::deserialize`], with `default_ratio` for records that carry no
    /// viewport ratio.
    pub fn deserialize_with_ratio(record: SceneRecord, default_ratio: f64) -> SceneResult<Scene> {
        if !record.is_canvas() {
            return Err(SceneError::NotACanvas(record.class));
        }

        let mut scene = Scene::with_viewport_ratio(record.viewport_ratio.unwrap_or(default_ratio));
        scene.id = record.id;
        scene.extra = record.extra;

        for entry in record.shape_list {
            if let Some(shape) = shape_from_value(entry) {
                scene.shapes.push_front(shape);
            }
        }

        info!("loaded scene with {} shapes", scene.shapes.len());
        Ok(scene)
    }

    /// The persisted record, shapes back to front.
    pub fn serialize(&self) -> SceneResult<SceneRecord> {
        let shape_list = self
            .shapes
            .iter()
            .rev()
            .map(|shape| -> SceneResult<Value> { Ok(serde_json::to_value(shape.to_record()?)?) })
            .collect::<SceneResult<Vec<Value>>>()?;

        Ok(SceneRecord {
            class: CANVAS_CLASS.to_string(),
            mime_type: Some(mime_type_for(CANVAS_CLASS)),
            viewport_ratio: Some(self.viewport_ratio),
            shape_list,
            id: self.id.clone(),
            extra: self.extra.clone(),
        })
    }

    pub fn from_json(json: &str) -> SceneResult<Scene> {
        Scene::deserialize(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> SceneResult<String> {
        Ok(serde_json::to_string(&self.serialize()?)?)
    }
}

fn shape_from_value(entry: Value) -> Option<Shape> {
    let class = entry.get("Class").and_then(Value::as_str).unwrap_or_default().to_string();
    if ShapeKind::from_class(&class).is_none() {
        warn!("skipping shape with unknown class {class:?}");
        return None;
    }

    let record: ShapeRecord = match serde_json::from_value(entry) {
        Ok(record) => record,
        Err(err) => {
            warn!("skipping malformed {class}: {err}");
            return None;
        }
    };
    Shape::from_record(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_shape_goes_on_top() {
        let mut scene = Scene::new();
        let bottom = scene.add_shape(Shape::circle());
        let top = scene.add_shape(Shape::line());

        let order: Vec<ShapeId> = scene.shapes().map(Shape::id).collect();
        assert_eq!(order, vec![top, bottom]);
    }

    #[test]
    fn test_select_is_exclusive() {
        let mut scene = Scene::new();
        let a = scene.add_shape(Shape::circle());
        let b = scene.add_shape(Shape::circle());

        assert!(scene.select(a));
        assert!(scene.select(b));
        assert!(!scene.get(a).unwrap().is_selected());
        assert!(scene.get(b).unwrap().is_selected());

        scene.clear_selection();
        assert!(scene.shapes().all(|shape| !shape.is_selected()));
        assert!(!scene.select(ShapeId::new()));
    }

    #[test]
    fn test_remove() {
        let mut scene = Scene::new();
        let id = scene.add_shape(Shape::circle());
        assert!(scene.remove(id).is_some());
        assert!(scene.is_empty());
        assert!(scene.remove(id).is_none());
    }

    #[test]
    fn test_default_ratio_only_fills_gaps() {
        let bare: SceneRecord = serde_json::from_str(r#"{"shapeList": []}"#).unwrap();
        assert_eq!(Scene::deserialize_with_ratio(bare, 2.0).unwrap().viewport_ratio(), 2.0);

        let set: SceneRecord = serde_json::from_str(r#"{"viewportRatio": 1.5}"#).unwrap();
        assert_eq!(Scene::deserialize_with_ratio(set, 2.0).unwrap().viewport_ratio(), 1.5);
    }

    #[test]
    fn test_rejects_other_records() {
        let result = Scene::from_json(r#"{"Class": "Highlight", "shapeList": []}"#);
        assert!(matches!(result, Err(SceneError::NotACanvas(class)) if class == "Highlight"));
    }
}
