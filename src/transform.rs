use serde::{Deserialize, Serialize};

use crate::error::TransformError;
use crate::renderer::Renderer;

/// Discriminator written into every persisted transform.
pub const TRANSFORM_CLASS: &str = "CanvasAffineTransform";

const COMPONENT_NAMES: [&str; 6] = ["a", "b", "c", "d", "tx", "ty"];

/// A 2x3 affine matrix in canvas layout.
///
/// A point `(x, y)` maps to `(a*x + c*y + tx, b*x + d*y + ty)`. Every edit
/// (`rotate`, `translate`, `scale`) is a right-multiplication by the matching
/// elementary matrix, so the stored six numbers are the only state and repeated
/// edits never accumulate decomposition error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    m: [f64; 6],
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    /// The identity matrix `(1, 0, 0, 1, 0, 0)`.
    pub const fn identity() -> Self {
        Self { m: [1.0, 0.0, 0.0, 1.0, 0.0, 0.0] }
    }

    pub const fn new(a: f64, b: f64, c: f64, d: f64, tx: f64, ty: f64) -> Self {
        Self { m: [a, b, c, d, tx, ty] }
    }

    /// The six components in `[a, b, c, d, tx, ty]` order.
    pub fn components(&self) -> [f64; 6] {
        self.m
    }

    /// Right-compose: `self := self * other`.
    pub fn multiply(&mut self, other: &Transform) {
        let [a, b, c, d, tx, ty] = self.m;
        let [oa, ob, oc, od, otx, oty] = other.m;

        self.m = [
            a * oa + c * ob,
            b * oa + d * ob,
            a * oc + c * od,
            b * oc + d * od,
            a * otx + c * oty + tx,
            b * otx + d * oty + ty,
        ];
    }

    pub fn rotate(&mut self, radians: f64) {
        let (sin, cos) = radians.sin_cos();
        self.multiply(&Transform::new(cos, sin, -sin, cos, 0.0, 0.0));
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.multiply(&Transform::new(1.0, 0.0, 0.0, 1.0, dx, dy));
    }

    /// Scale along both local axes. `sy` defaults to `sx`.
    pub fn scale(&mut self, sx: f64, sy: Option<f64>) {
        let sy = sy.unwrap_or(sx);
        self.multiply(&Transform::new(sx, 0.0, 0.0, sy, 0.0, 0.0));
    }

    /// Multiply every component, translation included, by `factor`.
    ///
    /// Converts a unit-space matrix into device pixels: translation is stored in
    /// the same normalized units as the linear part, so it has to scale too.
    pub fn scale_all_components(&mut self, factor: f64) {
        for v in &mut self.m {
            *v *= factor;
        }
    }

    /// Copy of `self` with [`Transform::scale_all_components`] applied.
    pub fn scaled_all(&self, factor: f64) -> Transform {
        let mut t = *self;
        t.scale_all_components(factor);
        t
    }

    /// Length of the two column vectors. Never negative; reflections show up in
    /// the rotation instead.
    pub fn decompose_scale(&self) -> (f64, f64) {
        let [a, b, c, d, _, _] = self.m;
        (a.hypot(b), c.hypot(d))
    }

    /// Mean of the two [`Transform::decompose_scale`] axes.
    pub fn decompose_scale_averaged(&self) -> f64 {
        let (sx, sy) = self.decompose_scale();
        (sx + sy) / 2.0
    }

    /// `atan2(b, a)`, in `(-PI, PI]`.
    pub fn decompose_rotation(&self) -> f64 {
        self.m[1].atan2(self.m[0])
    }

    pub fn decompose_translation(&self) -> (f64, f64) {
        (self.m[4], self.m[5])
    }

    pub fn set_translation(&mut self, tx: f64, ty: f64) {
        self.m[4] = tx;
        self.m[5] = ty;
    }

    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        let [a, b, c, d, tx, ty] = self.m;
        (x * a + y * c + tx, x * b + y * d + ty)
    }

    /// Canonical persisted form. Fails if any component is NaN or infinite so a
    /// corrupted matrix never reaches storage.
    pub fn export(&self) -> Result<TransformRecord, TransformError> {
        if let Some((i, value)) = self.m.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(TransformError::NonFinite {
                component: COMPONENT_NAMES[i],
                value: *value,
            });
        }

        let [a, b, c, d, tx, ty] = self.m;
        Ok(TransformRecord {
            class: TRANSFORM_CLASS.to_string(),
            a,
            b,
            c,
            d,
            tx,
            ty,
        })
    }

    /// Make this the renderer's current transform.
    pub fn apply_to_surface<R: Renderer + ?Sized>(&self, renderer: &mut R) {
        renderer.set_transform(self);
    }
}

impl From<&TransformRecord> for Transform {
    fn from(record: &TransformRecord) -> Self {
        Transform::new(record.a, record.b, record.c, record.d, record.tx, record.ty)
    }
}

fn one() -> f64 {
    1.0
}

fn transform_class() -> String {
    TRANSFORM_CLASS.to_string()
}

/// Persisted shape of a [`Transform`].
///
/// Missing `a`/`d` read as 1 and the remaining components as 0, so a record with
/// only a translation is still a valid matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformRecord {
    #[serde(rename = "Class", default = "transform_class")]
    pub class: String,
    #[serde(default = "one")]
    pub a: f64,
    #[serde(default)]
    pub b: f64,
    #[serde(default)]
    pub c: f64,
    #[serde(default = "one")]
    pub d: f64,
    #[serde(default)]
    pub tx: f64,
    #[serde(default)]
    pub ty: f64,
}

impl Default for TransformRecord {
    fn default() -> Self {
        Self {
            class: transform_class(),
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            tx: 0.0,
            ty: 0.0,
        }
    }
}
