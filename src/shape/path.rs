use crate::geometry::{self, BBox, Point};
use crate::renderer::Renderer;
use crate::shape::Paint;

/// Freehand polyline through a flat `[x0, y0, x1, y1, ...]` list, smoothed so
/// each interior point becomes the control point of a curve ending midway to
/// the next point.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path {
    points: Vec<f64>,
}

impl Path {
    pub(crate) fn new(points: Vec<f64>) -> Self {
        Self { points }
    }

    /// The raw flat coordinate list.
    pub fn points(&self) -> &[f64] {
        &self.points
    }

    pub fn set_points(&mut self, points: Vec<f64>) {
        self.points = points;
    }

    pub fn vertices(&self) -> Vec<Point> {
        geometry::pairs(&self.points).collect()
    }

    pub fn bounds(&self) -> BBox {
        geometry::calculate_bounds(geometry::pairs(&self.points))
    }

    pub(crate) fn draw<R: Renderer + ?Sized>(&self, renderer: &mut R, paint: &Paint) -> BBox {
        let vertices = self.vertices();

        renderer.begin_path();
        if let (Some(first), Some(last)) = (vertices.first(), vertices.last()) {
            renderer.move_to(first.0, first.1);
            for pair in vertices.windows(2).skip(1) {
                let (control, next) = (pair[0], pair[1]);
                let mid = ((control.0 + next.0) / 2.0, (control.1 + next.1) / 2.0);
                renderer.quadratic_curve_to(control.0, control.1, mid.0, mid.1);
            }
            renderer.line_to(last.0, last.1);
        }
        paint.with_round_caps().fill_and_stroke(renderer);

        self.bounds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{DisplayList, DrawCommand, Size};

    #[test]
    fn test_smoothing_uses_midpoints() {
        let path = Path::new(vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0]);
        let mut list = DisplayList::new(Size::new(10.0, 10.0));
        path.draw(&mut list, &Paint::default());

        let commands = list.commands();
        assert_eq!(commands[1], DrawCommand::MoveTo(0.0, 0.0));
        assert_eq!(commands[2], DrawCommand::QuadraticCurveTo(1.0, 0.0, 1.0, 0.5));
        assert_eq!(commands[3], DrawCommand::QuadraticCurveTo(1.0, 1.0, 0.5, 1.0));
        assert_eq!(commands[4], DrawCommand::LineTo(0.0, 1.0));
    }

    #[test]
    fn test_empty_path_has_zero_bounds() {
        assert_eq!(Path::default().bounds(), BBox::default());
    }
}
