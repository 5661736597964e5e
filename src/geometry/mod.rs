pub mod hit_testing;

/// A point in whichever space the caller is working in.
pub type Point = (f64, f64);

/// Axis-aligned rectangle in a shape's unit space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BBox {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl BBox {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// The unit square centered on the origin.
    pub const fn unit_centered() -> Self {
        Self::new(-0.5, -0.5, 1.0, 1.0)
    }

    pub fn center(&self) -> Point {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    /// Corners in `top-left, bottom-left, bottom-right, top-right` order.
    pub fn corners(&self) -> [Point; 4] {
        [
            (self.x, self.y),
            (self.x, self.bottom()),
            (self.right(), self.bottom()),
            (self.right(), self.y),
        ]
    }
}

/// Tight bounds of a set of points. An empty set yields the zero rectangle.
pub fn calculate_bounds(points: impl IntoIterator<Item = Point>) -> BBox {
    let mut points = points.into_iter().peekable();
    if points.peek().is_none() {
        return BBox::default();
    }

    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for (x, y) in points {
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }

    BBox::new(min_x, min_y, max_x - min_x, max_y - min_y)
}

/// Pairs up a flat `[x0, y0, x1, y1, ...]` list. A trailing odd value is ignored.
pub fn pairs(flat: &[f64]) -> impl Iterator<Item = Point> + '_ {
    flat.chunks_exact(2).map(|pair| (pair[0], pair[1]))
}

/// Rotate a vector about the origin.
pub fn rotate_vector((x, y): Point, radians: f64) -> Point {
    let (sin, cos) = radians.sin_cos();
    (x * cos - y * sin, x * sin + y * cos)
}

/// Angle of the ray from `from` to `to`.
pub fn bearing(from: Point, to: Point) -> f64 {
    (to.1 - from.1).atan2(to.0 - from.0)
}

pub fn distance(a: Point, b: Point) -> f64 {
    (b.0 - a.0).hypot(b.1 - a.1)
}
