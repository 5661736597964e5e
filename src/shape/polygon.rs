use std::f64::consts::TAU;

use crate::geometry::{self, BBox, Point};
use crate::renderer::Renderer;
use crate::shape::Paint;

/// Radius of the rounded corners of a four-sided polygon. Zero keeps the
/// corners sharp while still tracing them as curves.
const SQUARE_CORNER_RADIUS: f64 = 0.0;

/// Regular polygon inscribed in the unit-diameter circle.
///
/// Polygons with fewer than three sides are lines; see [`crate::Shape::polygon`].
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    sides: u32,
}

impl Polygon {
    pub(crate) fn new(sides: u32) -> Self {
        Self { sides }
    }

    pub fn sides(&self) -> u32 {
        self.sides
    }

    /// Vertices in unit space, the first one on the positive x axis.
    pub fn vertices(&self) -> Vec<Point> {
        let n = f64::from(self.sides);
        (0..self.sides)
            .map(|i| {
                let angle = TAU * f64::from(i) / n;
                (0.5 * angle.cos(), 0.5 * angle.sin())
            })
            .collect()
    }

    pub(crate) fn draw<R: Renderer + ?Sized>(&self, renderer: &mut R, paint: &Paint) -> BBox {
        if self.sides == 4 {
            trace_square(renderer);
            paint.fill_and_stroke(renderer);
            return BBox::unit_centered();
        }

        let vertices = self.vertices();
        renderer.begin_path();
        if let Some(&(x, y)) = vertices.first() {
            renderer.move_to(x, y);
        }
        for &(x, y) in vertices.iter().skip(1) {
            renderer.line_to(x, y);
        }
        renderer.close_path();
        paint.fill_and_stroke(renderer);

        geometry::calculate_bounds(vertices)
    }
}

fn trace_square<R: Renderer + ?Sized>(renderer: &mut R) {
    let (left, top, right, bottom) = (-0.5, -0.5, 0.5, 0.5);
    let r = SQUARE_CORNER_RADIUS;

    renderer.begin_path();
    renderer.move_to(left + r, top);
    renderer.line_to(right - r, top);
    renderer.quadratic_curve_to(right, top, right, top + r);
    renderer.line_to(right, bottom - r);
    renderer.quadratic_curve_to(right, bottom, right - r, bottom);
    renderer.line_to(left + r, bottom);
    renderer.quadratic_curve_to(left, bottom, left, bottom - r);
    renderer.line_to(left, top + r);
    renderer.quadratic_curve_to(left, top, left + r, top);
    renderer.close_path();
}
