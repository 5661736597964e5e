//! Interactive handles ("nibs") drawn around a selected shape.
//!
//! Positions are recorded in device pixels during paint and only used for hit
//! testing afterwards; they are never persisted.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::color::Color;
use crate::config::NibConfig;
use crate::error::ShapeError;
use crate::geometry::{BBox, Point, hit_testing};
use crate::renderer::{Renderer, StrokeStyle};
use crate::transform::Transform;

const HANDLE_FILL: Color = Color::rgba(255.0, 255.0, 255.0, 1.0);
const HANDLE_OUTLINE: Color = Color::rgba(177.0, 177.0, 177.0, 1.0);
const ACTIVE_FILL: Color = Color::rgba(142.0, 214.0, 255.0, 1.0);
const ACTIVE_OUTLINE: Color = Color::rgba(0.0, 76.0, 179.0, 1.0);

/// Handle names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Nib {
    Left,
    Top,
    Right,
    Bottom,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Rotate,
    /// The free end of a line.
    LineEnd,
}

impl Nib {
    pub const EDGES: [Nib; 4] = [Nib::Left, Nib::Top, Nib::Right, Nib::Bottom];
    pub const CORNERS: [Nib; 4] = [Nib::TopLeft, Nib::TopRight, Nib::BottomLeft, Nib::BottomRight];

    pub fn as_str(&self) -> &'static str {
        match self {
            Nib::Left => "l",
            Nib::Top => "t",
            Nib::Right => "r",
            Nib::Bottom => "b",
            Nib::TopLeft => "t-l",
            Nib::TopRight => "t-r",
            Nib::BottomLeft => "b-l",
            Nib::BottomRight => "b-r",
            Nib::Rotate => "rot",
            Nib::LineEnd => "line",
        }
    }

    /// Unit direction an edge handle moves the shape's outline in.
    pub fn edge_axis(&self) -> Option<Point> {
        match self {
            Nib::Left => Some((-1.0, 0.0)),
            Nib::Top => Some((0.0, -1.0)),
            Nib::Right => Some((1.0, 0.0)),
            Nib::Bottom => Some((0.0, 1.0)),
            _ => None,
        }
    }

    pub fn is_corner(&self) -> bool {
        Self::CORNERS.contains(self)
    }

    pub fn is_top(&self) -> bool {
        matches!(self, Nib::TopLeft | Nib::TopRight)
    }

    pub fn is_left(&self) -> bool {
        matches!(self, Nib::TopLeft | Nib::BottomLeft)
    }

    /// Where the handle sits on `bbox`, before any rotate-handle offset.
    fn anchor(&self, bbox: &BBox) -> Point {
        let (cx, cy) = bbox.center();
        match self {
            Nib::Left => (bbox.x, cy),
            Nib::Top => (cx, bbox.y),
            Nib::Right | Nib::Rotate | Nib::LineEnd => (bbox.right(), cy),
            Nib::Bottom => (cx, bbox.bottom()),
            Nib::TopLeft => (bbox.x, bbox.y),
            Nib::TopRight => (bbox.right(), bbox.y),
            Nib::BottomLeft => (bbox.x, bbox.bottom()),
            Nib::BottomRight => (bbox.right(), bbox.bottom()),
        }
    }
}

impl fmt::Display for Nib {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Nib {
    type Err = ShapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "l" => Ok(Nib::Left),
            "t" => Ok(Nib::Top),
            "r" => Ok(Nib::Right),
            "b" => Ok(Nib::Bottom),
            "t-l" => Ok(Nib::TopLeft),
            "t-r" => Ok(Nib::TopRight),
            "b-l" => Ok(Nib::BottomLeft),
            "b-r" => Ok(Nib::BottomRight),
            "rot" | "rot1" | "rot2" => Ok(Nib::Rotate),
            "line" => Ok(Nib::LineEnd),
            other => Err(ShapeError::UnknownNib(other.to_string())),
        }
    }
}

/// Last painted position of a handle, in device pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NibHandle {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

/// Handles recorded during the most recent paint of a selected shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NibMap {
    handles: BTreeMap<Nib, NibHandle>,
}

impl NibMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, nib: Nib, handle: NibHandle) {
        self.handles.insert(nib, handle);
    }

    pub fn get(&self, nib: Nib) -> Option<&NibHandle> {
        self.handles.get(&nib)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Nib, &NibHandle)> {
        self.handles.iter().map(|(nib, handle)| (*nib, handle))
    }

    /// The nearest handle whose radius covers the device point.
    pub fn hit(&self, x: f64, y: f64) -> Option<Nib> {
        hit_testing::nearest_handle(
            (x, y),
            self.iter().map(|(nib, handle)| (nib, (handle.x, handle.y), handle.radius)),
        )
    }
}

/// Paint and record the resize handles (plus the rotate handle when
/// `with_rotate` is set) around `bbox`.
///
/// `device` is the full unit-to-device transform of the shape. Handles are
/// drawn upright in a frame rotated about the shape's translation so they keep
/// a constant pixel size regardless of the shape's scale.
pub(crate) fn paint_box_nibs<R: Renderer + ?Sized>(
    renderer: &mut R,
    device: &Transform,
    bbox: &BBox,
    with_rotate: bool,
    config: &NibConfig,
) -> NibMap {
    let rotation = device.decompose_rotation();
    let (sx, sy) = device.decompose_scale();
    let (cx, cy) = device.decompose_translation();

    let mut upright = Transform::identity();
    upright.translate(cx, cy);
    upright.scale(sx, Some(sy));

    let mut frame = Transform::identity();
    frame.translate(cx, cy);
    frame.rotate(rotation);
    frame.translate(-cx, -cy);
    renderer.set_transform(&frame);

    let mut nibs = NibMap::new();
    let outline = StrokeStyle::new(HANDLE_OUTLINE, 1.0);

    renderer.begin_path();
    for nib in Nib::CORNERS {
        let (ux, uy) = nib.anchor(bbox);
        let (x, y) = upright.apply(ux, uy);
        let r = config.corner_radius;
        renderer.move_to(x + r, y);
        renderer.arc(x, y, r, 0.0, std::f64::consts::TAU, true);
        record(&mut nibs, nib, device.apply(ux, uy), r);
    }
    renderer.fill(&HANDLE_FILL);
    renderer.stroke(&StrokeStyle::new(HANDLE_OUTLINE, 2.0));

    for nib in Nib::EDGES {
        let (ux, uy) = nib.anchor(bbox);
        let (x, y) = upright.apply(ux, uy);
        let a = config.edge_size;
        renderer.fill_rect(x - a / 2.0, y - a / 2.0, a, a, &HANDLE_FILL);
        renderer.stroke_rect(x - a / 2.0, y - a / 2.0, a, a, &outline);
        record(&mut nibs, nib, device.apply(ux, uy), a);
    }

    if with_rotate {
        let (ux, uy) = Nib::Rotate.anchor(bbox);
        let (x, y) = upright.apply(ux, uy);
        let size = config.rotate_size;
        let offset = config.rotate_offset;

        renderer.begin_path();
        renderer.move_to(x + 3.0, y);
        renderer.line_to(x + offset - size / 2.0, y);
        renderer.stroke(&StrokeStyle::new(ACTIVE_OUTLINE, 1.0));

        let hx = x + offset;
        renderer.fill_rect(hx - size / 2.0, y - size / 2.0, size, size, &ACTIVE_FILL);
        renderer.stroke_rect(hx - size / 2.0, y - size / 2.0, size, size, &StrokeStyle::new(ACTIVE_OUTLINE, 1.0));

        let local_offset = if sx > 0.0 { offset / sx } else { 0.0 };
        record(&mut nibs, Nib::Rotate, device.apply(ux + local_offset, uy), size);
    }

    nibs
}

/// Paint and record the single end handle of a line.
///
/// `device` maps the unit segment `(0,0)-(1,0)` onto the drawn line.
pub(crate) fn paint_line_nib<R: Renderer + ?Sized>(
    renderer: &mut R,
    device: &Transform,
    config: &NibConfig,
) -> NibMap {
    renderer.set_transform(&Transform::identity());

    let (x, y) = device.apply(1.0, 0.0);
    let r = config.line_end_radius;
    renderer.begin_path();
    renderer.move_to(x + r, y);
    renderer.arc(x, y, r, 0.0, std::f64::consts::TAU, true);
    renderer.fill(&ACTIVE_FILL);
    renderer.stroke(&StrokeStyle::new(ACTIVE_OUTLINE, 2.0));

    let mut nibs = NibMap::new();
    record(&mut nibs, Nib::LineEnd, (x, y), r);
    nibs
}

fn record(nibs: &mut NibMap, nib: Nib, (x, y): Point, radius: f64) {
    nibs.insert(nib, NibHandle { x, y, radius });
}
