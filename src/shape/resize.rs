//! Transform edits driven by dragging a nib.
//!
//! All functions take the current transform and return a new one; the caller
//! only commits it on success, so a rejected edit leaves the shape untouched.

use crate::error::{ShapeError, ShapeResult};
use crate::geometry::{self, BBox, Point};
use crate::shape::nib::Nib;
use crate::transform::Transform;

/// Stretch along one axis. `axis` is the outward direction of the dragged edge.
pub(crate) fn edge_resize(
    transform: &Transform,
    bbox: &BBox,
    pivot: Point,
    delta: Point,
    axis: Point,
) -> ShapeResult<Transform> {
    let (s0, s1) = transform.decompose_scale();
    let (dx, dy) = local_delta(transform, delta);

    let sx = s0 + axis.0 * dx / (bbox.w / 2.0);
    let sy = s1 + axis.1 * dy / (bbox.h / 2.0);
    // The untouched axis contributes 0 * (d / half) which is NaN for a flat bbox.
    let sx = if axis.0 == 0.0 { s0 } else { sx };
    let sy = if axis.1 == 0.0 { s1 } else { sy };

    rescale(transform, pivot, (s0, s1), (sx, sy))
}

/// Stretch both axes together, keeping the current aspect ratio.
///
/// Vertical movement drives the edit when the shape is no wider than it is
/// tall, horizontal movement otherwise. The other axis follows at the ratio.
pub(crate) fn corner_resize(
    transform: &Transform,
    bbox: &BBox,
    pivot: Point,
    delta: Point,
    nib: Nib,
) -> ShapeResult<Transform> {
    let (s0, s1) = transform.decompose_scale();
    let (dx, dy) = local_delta(transform, delta);
    let ratio = s0 / s1;

    let (dsx, dsy) = if ratio <= 1.0 {
        let sign = if nib.is_top() { -1.0 } else { 1.0 };
        let dsy = sign * dy / (bbox.h / 2.0);
        (dsy * ratio, dsy)
    } else {
        let sign = if nib.is_left() { -1.0 } else { 1.0 };
        let dsx = sign * dx / (bbox.w / 2.0);
        (dsx, dsx / ratio)
    };

    rescale(transform, pivot, (s0, s1), (s0 + dsx, s1 + dsy))
}

/// Point the shape's x axis at `target`, keeping scale and translation.
pub(crate) fn rotate_toward(transform: &Transform, target: Point) -> Transform {
    let (s0, s1) = transform.decompose_scale();
    let origin = transform.decompose_translation();

    let mut rotated = Transform::identity();
    rotated.translate(origin.0, origin.1);
    rotated.rotate(geometry::bearing(origin, target));
    rotated.scale(s0, Some(s1));
    rotated
}

/// Move a line's free end to `target`, keeping its start.
pub(crate) fn line_end_to(transform: &Transform, target: Point) -> Transform {
    let origin = transform.decompose_translation();

    let mut line = Transform::identity();
    line.translate(origin.0, origin.1);
    line.scale(geometry::distance(origin, target), None);
    line.rotate(geometry::bearing(origin, target));
    line
}

/// Pointer delta expressed in the shape's unrotated frame.
fn local_delta(transform: &Transform, delta: Point) -> Point {
    geometry::rotate_vector(delta, -transform.decompose_rotation())
}

/// Replace the scale `old` by `new`, holding the local point `pivot` fixed.
fn rescale(transform: &Transform, pivot: Point, old: Point, new: Point) -> ShapeResult<Transform> {
    let valid = |s: f64| s.is_finite() && s > 0.0;
    if !valid(new.0) || !valid(new.1) || !valid(old.0) || !valid(old.1) {
        return Err(ShapeError::TransformLimitReached);
    }

    let mut resized = *transform;
    resized.translate(pivot.0, pivot.1);
    resized.scale(1.0 / old.0, Some(1.0 / old.1));
    resized.scale(new.0, Some(new.1));
    resized.translate(-pivot.0, -pivot.1);

    if resized.components().iter().any(|c| !c.is_finite()) {
        return Err(ShapeError::TransformLimitReached);
    }
    Ok(resized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn sample() -> Transform {
        let mut t = Transform::identity();
        t.translate(0.5, 0.3);
        t.scale(0.2, Some(0.1));
        t
    }

    #[test]
    fn test_edge_resize_right_grows_x_only() {
        let t = sample();
        let resized = edge_resize(&t, &BBox::unit_centered(), (0.0, 0.0), (0.05, 0.2), (1.0, 0.0)).unwrap();
        let (sx, sy) = resized.decompose_scale();
        assert!((sx - 0.3).abs() < 1e-12);
        assert!((sy - 0.1).abs() < 1e-12);
        assert_eq!(resized.decompose_translation(), (0.5, 0.3));
    }

    #[test]
    fn test_edge_resize_respects_rotation() {
        let mut t = Transform::identity();
        t.translate(0.5, 0.3);
        t.rotate(FRAC_PI_2);
        t.scale(0.2, Some(0.1));
        // Local +x now points down in unit space.
        let resized = edge_resize(&t, &BBox::unit_centered(), (0.0, 0.0), (0.0, 0.05), (1.0, 0.0)).unwrap();
        let (sx, _) = resized.decompose_scale();
        assert!((sx - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_edge_resize_rejects_inversion() {
        let t = sample();
        let result = edge_resize(&t, &BBox::unit_centered(), (0.0, 0.0), (0.5, 0.0), (-1.0, 0.0));
        assert!(matches!(result, Err(ShapeError::TransformLimitReached)));
    }

    #[test]
    fn test_corner_resize_keeps_ratio() {
        let t = sample();
        let bbox = BBox::unit_centered();
        for (delta, nib) in [
            ((0.03, 0.01), Nib::BottomRight),
            ((-0.02, 0.04), Nib::TopLeft),
            ((0.1, -0.01), Nib::TopRight),
            ((-0.01, -0.01), Nib::BottomLeft),
        ] {
            let resized = corner_resize(&t, &bbox, (0.0, 0.0), delta, nib).unwrap();
            let (sx, sy) = resized.decompose_scale();
            assert!((sx / sy - 2.0).abs() < 1e-9, "{nib}: {sx}/{sy}");
        }
    }

    #[test]
    fn test_corner_resize_direction() {
        let t = sample();
        let bbox = BBox::unit_centered();
        // Ratio 2 > 1, so horizontal movement drives. Dragging the right corner
        // outward grows; dragging the left corner the same way shrinks.
        let grown = corner_resize(&t, &bbox, (0.0, 0.0), (0.05, 0.0), Nib::BottomRight).unwrap();
        let shrunk = corner_resize(&t, &bbox, (0.0, 0.0), (0.05, 0.0), Nib::TopLeft).unwrap();
        assert!((grown.decompose_scale().0 - 0.3).abs() < 1e-12);
        assert!((shrunk.decompose_scale().0 - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_corner_resize_tracks_pointer() {
        let mut t = Transform::identity();
        t.translate(0.5, 0.3);
        t.scale(0.2, None);
        let bbox = BBox::unit_centered();

        let resized = corner_resize(&t, &bbox, (0.0, 0.0), (0.0, 0.1), Nib::BottomRight).unwrap();
        let (x, y) = resized.apply(0.5, 0.5);
        assert!((y - 0.5).abs() < 1e-12);
        assert!((x - 0.7).abs() < 1e-12);

        let edge = edge_resize(&t, &bbox, (0.0, 0.0), (0.0, 0.1), (0.0, 1.0)).unwrap();
        assert!((edge.apply(0.0, 0.5).1 - y).abs() < 1e-12);
    }

    #[test]
    fn test_pivot_stays_fixed() {
        let t = sample();
        let pivot = (0.25, -0.1);
        let before = t.apply(pivot.0, pivot.1);
        let resized = edge_resize(&t, &BBox::unit_centered(), pivot, (0.0, 0.02), (0.0, 1.0)).unwrap();
        let after = resized.apply(pivot.0, pivot.1);
        assert!((before.0 - after.0).abs() < 1e-12 && (before.1 - after.1).abs() < 1e-12);
    }

    #[test]
    fn test_rotate_toward_keeps_scale_and_origin() {
        let t = sample();
        let rotated = rotate_toward(&t, (0.5, 0.8));
        assert!((rotated.decompose_rotation() - FRAC_PI_2).abs() < 1e-12);
        let (sx, sy) = rotated.decompose_scale();
        assert!((sx - 0.2).abs() < 1e-12 && (sy - 0.1).abs() < 1e-12);
        let (tx, ty) = rotated.decompose_translation();
        assert!((tx - 0.5).abs() < 1e-12 && (ty - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_line_end_to() {
        let mut t = Transform::identity();
        t.translate(0.1, 0.1);
        let line = line_end_to(&t, (0.4, 0.5));
        assert!((line.decompose_scale_averaged() - 0.5).abs() < 1e-12);
        let (x, y) = line.apply(1.0, 0.0);
        assert!((x - 0.4).abs() < 1e-12 && (y - 0.5).abs() < 1e-12);
    }
}
