use crate::geometry::BBox;
use crate::renderer::Renderer;
use crate::shape::Paint;

/// Line height in font units.
pub const LINE_HEIGHT: f64 = 1.3;

pub const DEFAULT_FONT_FACE: &str = "sans-serif";

/// A single line of text laid out at a 1px font and scaled by the shape's
/// transform.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Text {
    text: String,
    font_face: Option<String>,
    font: Option<String>,
}

impl Text {
    pub(crate) fn new(text: String, font_face: Option<String>) -> Self {
        Self { text, font_face, font: None }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn font_face(&self) -> Option<&str> {
        self.font_face.as_deref()
    }

    pub fn set_font_face(&mut self, font_face: Option<String>) {
        self.font_face = font_face;
        self.font = None;
    }

    /// The font shorthand handed to the renderer.
    pub fn font(&mut self) -> &str {
        let face = self.font_face.as_deref().unwrap_or(DEFAULT_FONT_FACE);
        self.font.get_or_insert_with(|| format!("1px {face}"))
    }

    pub(crate) fn draw<R: Renderer + ?Sized>(&mut self, renderer: &mut R, paint: &Paint) -> BBox {
        renderer.set_font(self.font());

        let w = renderer.measure_text(&self.text);
        let (x, y) = (-w / 2.0, -LINE_HEIGHT / 2.0);

        if let Some(color) = &paint.fill {
            renderer.fill_text(&self.text, x, y, color);
        }
        if let Some(style) = &paint.stroke {
            renderer.stroke_text(&self.text, x, y, style);
        }

        BBox::new(x, y, w, LINE_HEIGHT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_cache_follows_face() {
        let mut text = Text::new("hi".into(), Some("serif".into()));
        assert_eq!(text.font(), "1px serif");

        text.set_font_face(None);
        assert_eq!(text.font(), "1px sans-serif");
    }
}
