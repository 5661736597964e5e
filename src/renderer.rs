// src/renderer.rs
use crate::color::Color;
use crate::image::Bitmap;
use crate::transform::Transform;

/// Width and height of a drawing surface, in device pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
}

/// How a path outline is stroked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub color: Color,
    pub width: f64,
    pub cap: LineCap,
}

impl StrokeStyle {
    pub fn new(color: Color, width: f64) -> Self {
        Self { color, width, cap: LineCap::Butt }
    }

    pub fn with_cap(mut self, cap: LineCap) -> Self {
        self.cap = cap;
        self
    }
}

/// The drawing capability shapes paint through.
///
/// The method set mirrors a 2D canvas context: path construction, fill and
/// stroke with an explicit style, a current transform with save/restore, bitmap
/// blits and single-line text. Coordinates passed to path and text calls are in
/// the space of the current transform.
pub trait Renderer {
    /// Current surface size in device pixels.
    fn size(&self) -> Size;

    /// Resize the surface. Contents are undefined afterwards.
    fn resize(&mut self, size: Size);

    /// Push the current transform and font.
    fn save(&mut self);

    /// Pop the state pushed by the matching [`Renderer::save`].
    fn restore(&mut self);

    fn set_transform(&mut self, transform: &Transform);

    fn begin_path(&mut self);

    fn close_path(&mut self);

    fn move_to(&mut self, x: f64, y: f64);

    fn line_to(&mut self, x: f64, y: f64);

    fn quadratic_curve_to(&mut self, cpx: f64, cpy: f64, x: f64, y: f64);

    fn arc(&mut self, x: f64, y: f64, radius: f64, start: f64, end: f64, anticlockwise: bool);

    /// Fill the current path.
    fn fill(&mut self, color: &Color);

    /// Stroke the current path.
    fn stroke(&mut self, style: &StrokeStyle);

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: &Color);

    fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64, style: &StrokeStyle);

    fn clear_rect(&mut self, x: f64, y: f64, w: f64, h: f64);

    /// Blit `bitmap` with its top-left corner at `(x, y)`.
    fn draw_image(&mut self, bitmap: &Bitmap, x: f64, y: f64);

    /// CSS-like font shorthand, e.g. `"1px sans-serif"`.
    fn set_font(&mut self, font: &str);

    /// Advance width of `text` in the current font.
    fn measure_text(&self, text: &str) -> f64;

    /// Draw `text` with its top-left corner at `(x, y)`.
    fn fill_text(&mut self, text: &str, x: f64, y: f64, color: &Color);

    fn stroke_text(&mut self, text: &str, x: f64, y: f64, style: &StrokeStyle);
}

/// One call recorded by a [`DisplayList`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Save,
    Restore,
    SetTransform(Transform),
    BeginPath,
    ClosePath,
    MoveTo(f64, f64),
    LineTo(f64, f64),
    QuadraticCurveTo(f64, f64, f64, f64),
    Arc { x: f64, y: f64, radius: f64, start: f64, end: f64, anticlockwise: bool },
    Fill(Color),
    Stroke(StrokeStyle),
    FillRect { x: f64, y: f64, w: f64, h: f64, color: Color },
    StrokeRect { x: f64, y: f64, w: f64, h: f64, style: StrokeStyle },
    ClearRect { x: f64, y: f64, w: f64, h: f64 },
    DrawImage { width: u32, height: u32, x: f64, y: f64 },
    SetFont(String),
    FillText { text: String, x: f64, y: f64, color: Color },
    StrokeText { text: String, x: f64, y: f64, style: StrokeStyle },
}

/// Advance per character used when no real font engine is present, as a fraction
/// of the font size.
pub const DEFAULT_CHAR_ADVANCE: f64 = 0.5;

#[derive(Debug, Clone)]
struct SurfaceState {
    transform: Transform,
    font: String,
}

/// A [`Renderer`] that records every call instead of producing pixels.
///
/// Useful as a headless backend and for inspecting what a paint pass did. Text
/// is measured as `chars * font_size * char_advance`, with the font size taken
/// from the leading `"<n>px"` of the font string.
#[derive(Debug, Clone)]
pub struct DisplayList {
    size: Size,
    char_advance: f64,
    state: SurfaceState,
    stack: Vec<SurfaceState>,
    commands: Vec<DrawCommand>,
}

impl DisplayList {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            char_advance: DEFAULT_CHAR_ADVANCE,
            state: SurfaceState {
                transform: Transform::identity(),
                font: "10px sans-serif".to_string(),
            },
            stack: Vec::new(),
            commands: Vec::new(),
        }
    }

    pub fn with_char_advance(mut self, advance: f64) -> Self {
        self.char_advance = advance;
        self
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Forget recorded commands, keeping size and state.
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn current_transform(&self) -> Transform {
        self.state.transform
    }

    /// Number of `save` calls not yet matched by a `restore`.
    pub fn save_depth(&self) -> usize {
        self.stack.len()
    }

    fn font_size(&self) -> f64 {
        self.state
            .font
            .split_whitespace()
            .next()
            .and_then(|first| first.strip_suffix("px"))
            .and_then(|n| n.parse::<f64>().ok())
            .unwrap_or(10.0)
    }
}

impl Renderer for DisplayList {
    fn size(&self) -> Size {
        self.size
    }

    fn resize(&mut self, size: Size) {
        self.size = size;
        self.state.transform = Transform::identity();
        self.stack.clear();
    }

    fn save(&mut self) {
        self.stack.push(self.state.clone());
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
        self.commands.push(DrawCommand::Restore);
    }

    fn set_transform(&mut self, transform: &Transform) {
        self.state.transform = *transform;
        self.commands.push(DrawCommand::SetTransform(*transform));
    }

    fn begin_path(&mut self) {
        self.commands.push(DrawCommand::BeginPath);
    }

    fn close_path(&mut self) {
        self.commands.push(DrawCommand::ClosePath);
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.commands.push(DrawCommand::MoveTo(x, y));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.commands.push(DrawCommand::LineTo(x, y));
    }

    fn quadratic_curve_to(&mut self, cpx: f64, cpy: f64, x: f64, y: f64) {
        self.commands.push(DrawCommand::QuadraticCurveTo(cpx, cpy, x, y));
    }

    fn arc(&mut self, x: f64, y: f64, radius: f64, start: f64, end: f64, anticlockwise: bool) {
        self.commands.push(DrawCommand::Arc { x, y, radius, start, end, anticlockwise });
    }

    fn fill(&mut self, color: &Color) {
        self.commands.push(DrawCommand::Fill(*color));
    }

    fn stroke(&mut self, style: &StrokeStyle) {
        self.commands.push(DrawCommand::Stroke(*style));
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: &Color) {
        self.commands.push(DrawCommand::FillRect { x, y, w, h, color: *color });
    }

    fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64, style: &StrokeStyle) {
        self.commands.push(DrawCommand::StrokeRect { x, y, w, h, style: *style });
    }

    fn clear_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.commands.push(DrawCommand::ClearRect { x, y, w, h });
    }

    fn draw_image(&mut self, bitmap: &Bitmap, x: f64, y: f64) {
        self.commands.push(DrawCommand::DrawImage {
            width: bitmap.width(),
            height: bitmap.height(),
            x,
            y,
        });
    }

    fn set_font(&mut self, font: &str) {
        self.state.font = font.to_string();
        self.commands.push(DrawCommand::SetFont(font.to_string()));
    }

    fn measure_text(&self, text: &str) -> f64 {
        text.chars().count() as f64 * self.font_size() * self.char_advance
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, color: &Color) {
        self.commands.push(DrawCommand::FillText { text: text.to_string(), x, y, color: *color });
    }

    fn stroke_text(&mut self, text: &str, x: f64, y: f64, style: &StrokeStyle) {
        self.commands.push(DrawCommand::StrokeText { text: text.to_string(), x, y, style: *style });
    }
}
