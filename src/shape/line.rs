use crate::geometry::{BBox, Point};
use crate::renderer::Renderer;
use crate::shape::Paint;
use crate::transform::Transform;

/// Device pixels of slack around a line for hit testing, on top of the stroke.
const HIT_SLOP: f64 = 40.0;

/// The free end of a line in unit space, relative to its start.
///
/// A line's transform carries its length as scale and its direction as
/// rotation; the start is the translation.
pub fn endpoint(transform: &Transform) -> Point {
    let length = transform.decompose_scale_averaged();
    let (sin, cos) = transform.decompose_rotation().sin_cos();
    (length * cos, length * sin)
}

/// What is pushed to the surface: only the translation, scaled to the device.
/// Scale and rotation are baked into the traced segment so the stroke is not
/// distorted.
pub(crate) fn surface_transform(transform: &Transform, width: f64) -> Transform {
    let (tx, ty) = transform.decompose_translation();
    Transform::new(1.0, 0.0, 0.0, 1.0, tx, ty).scaled_all(width)
}

/// Hit area along the unit segment `(0,0)-(1,0)` of the line's own transform.
pub fn hit_bounds(stroke_width: f64, surface_width: f64) -> BBox {
    let slop = if surface_width > 0.0 { HIT_SLOP / surface_width } else { 0.0 };
    let pad = stroke_width * 3.0 + slop;
    BBox::new(0.0, -pad / 2.0, 1.0, pad)
}

pub(crate) fn draw<R: Renderer + ?Sized>(
    renderer: &mut R,
    transform: &Transform,
    paint: &Paint,
    stroke_width: f64,
) -> BBox {
    let (x, y) = endpoint(transform);

    renderer.begin_path();
    renderer.move_to(0.0, 0.0);
    renderer.line_to(x, y);
    if let Some(style) = &paint.stroke {
        renderer.stroke(style);
    }

    hit_bounds(stroke_width, renderer.size().width)
}
