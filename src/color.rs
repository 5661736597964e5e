//! Color parsing and the per-attribute resolved-color cache used by shapes.
//!
//! Two encodings are understood: the legacy persisted form, four space-separated
//! floats in `0..=1` (`"1 0 0 1"`, alpha optional), and the usual CSS forms
//! (`rgb()`, `rgba()`, `#rgb`, `#rrggbb`).

use std::fmt;
use std::str::FromStr;

use log::warn;

use crate::error::ColorError;

/// Legacy encoding of "no paint".
pub const TRANSPARENT_LEGACY: &str = "0 0 0 0";

/// An RGBA color. Channels are `0..=255`, alpha is `0..=1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    red: f64,
    green: f64,
    blue: f64,
    alpha: f64,
}

impl Color {
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::rgba(255.0, 255.0, 255.0, 1.0);

    pub const fn rgba(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self { red, green, blue, alpha }
    }

    pub fn red(&self) -> f64 {
        self.red
    }

    pub fn green(&self) -> f64 {
        self.green
    }

    pub fn blue(&self) -> f64 {
        self.blue
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Alpha rounds to zero at three decimals; painting with it is a no-op.
    pub fn is_transparent(&self) -> bool {
        (self.alpha * 1000.0).round() == 0.0
    }

    /// Parse either the legacy float encoding or a CSS color.
    pub fn parse(input: &str) -> Result<Color, ColorError> {
        let s = input.trim();
        let unrecognized = || ColorError::Unrecognized(input.to_string());

        if let Some(color) = parse_legacy(s) {
            return Ok(color);
        }

        let lower = s.to_ascii_lowercase();
        if let Some(body) = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let parts = body
                .split(',')
                .map(|p| p.trim().parse::<f64>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|_| unrecognized())?;
            return match parts.as_slice() {
                [r, g, b] => Ok(Color::rgba(*r, *g, *b, 1.0)),
                [r, g, b, a] => Ok(Color::rgba(*r, *g, *b, *a)),
                _ => Err(unrecognized()),
            };
        }

        parse_hex(s).ok_or_else(unrecognized)
    }

    /// Persisted `"r g b a"` form, channels normalized to `0..=1`.
    pub fn to_legacy(&self) -> String {
        format!(
            "{:.4} {:.4} {:.4} {:.4}",
            self.red / 255.0,
            self.green / 255.0,
            self.blue / 255.0,
            self.alpha
        )
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rgba({},{},{},{})",
            self.red.round(),
            self.green.round(),
            self.blue.round(),
            self.alpha
        )
    }
}

impl FromStr for Color {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::parse(s)
    }
}

fn parse_legacy(s: &str) -> Option<Color> {
    let parts: Vec<&str> = s.split(' ').collect();
    if !(3..=4).contains(&parts.len()) {
        return None;
    }
    let mut values = [0.0_f64, 0.0, 0.0, 1.0];
    for (slot, part) in values.iter_mut().zip(&parts) {
        // Only plain unsigned decimals, like "0.5" or "1".
        if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit() || c == '.') {
            return None;
        }
        *slot = part.parse().ok()?;
    }
    let [r, g, b, a] = values;
    Some(Color::rgba(
        (r * 255.0).round(),
        (g * 255.0).round(),
        (b * 255.0).round(),
        a,
    ))
}

fn parse_hex(s: &str) -> Option<Color> {
    let hex = s.strip_prefix('#').unwrap_or(s);
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |i: usize, len: usize| u8::from_str_radix(&hex[i..i + len], 16).ok();
    let (r, g, b) = match hex.len() {
        3 => {
            let expand = |v: u8| f64::from(v * 17);
            (expand(channel(0, 1)?), expand(channel(1, 1)?), expand(channel(2, 1)?))
        }
        6 => (
            f64::from(channel(0, 2)?),
            f64::from(channel(2, 2)?),
            f64::from(channel(4, 2)?),
        ),
        _ => return None,
    };
    Some(Color::rgba(r, g, b, 1.0))
}

/// A color attribute together with its resolved value.
///
/// The raw string is what the shape owns; the resolved [`Color`] is computed on
/// first use and dropped whenever the raw value is reassigned.
#[derive(Debug, Clone, Default)]
pub struct ColorSlot {
    value: Option<String>,
    resolved: Option<Option<Color>>,
}

impl ColorSlot {
    pub fn new(value: Option<String>) -> Self {
        Self { value, resolved: None }
    }

    /// Build from a persisted legacy value, converting it to CSS form.
    pub fn from_legacy(value: Option<&str>) -> Self {
        let css = value.and_then(|v| match Color::parse(v) {
            Ok(color) if color.is_transparent() => None,
            Ok(color) => Some(color.to_string()),
            Err(err) => {
                warn!("keeping unparsed color value: {err}");
                Some(v.to_string())
            }
        });
        Self::new(css)
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn set(&mut self, value: Option<String>) {
        self.value = value;
        self.resolved = None;
    }

    pub fn is_cached(&self) -> bool {
        self.resolved.is_some()
    }

    /// The paint color, or `None` when the attribute is unset, `"None"` or fully
    /// transparent. Unparseable values log and fall back to opaque black.
    pub fn resolve(&mut self) -> Option<Color> {
        if let Some(resolved) = self.resolved {
            return resolved;
        }

        let resolved = match self.value.as_deref() {
            None | Some("None") | Some("") => None,
            Some(raw) => match Color::parse(raw) {
                Ok(color) if color.is_transparent() => None,
                Ok(color) => Some(color),
                Err(err) => {
                    warn!("{err}; falling back to black");
                    Some(Color::BLACK)
                }
            },
        };
        self.resolved = Some(resolved);
        resolved
    }

    /// Legacy persisted encoding. Anything that does not resolve to a paint color
    /// is written as fully transparent.
    pub fn to_legacy(&self) -> String {
        self.value
            .as_deref()
            .and_then(|raw| Color::parse(raw).ok())
            .filter(|color| !color.is_transparent())
            .map_or_else(|| TRANSPARENT_LEGACY.to_string(), |color| color.to_legacy())
    }
}
