use std::f64::consts::TAU;

use crate::geometry::BBox;
use crate::renderer::Renderer;
use crate::shape::Paint;

/// Unit-diameter circle centered on the origin.
pub(crate) fn draw<R: Renderer + ?Sized>(renderer: &mut R, paint: &Paint) -> BBox {
    renderer.begin_path();
    renderer.arc(0.0, 0.0, 0.5, 0.0, TAU, true);
    renderer.close_path();
    paint.fill_and_stroke(renderer);

    BBox::unit_centered()
}
