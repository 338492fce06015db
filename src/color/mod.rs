//! 32-bit color values in the two byte orderings used by the theme formats.
//!
//! Android themes store colors as ARGB (alpha in the high byte) while desktop
//! themes expect RGBA (alpha in the low byte). A [`Color`] always carries its
//! ordering so the two can't be mixed without an explicit conversion.

use std::fmt;

use thiserror::Error;

pub type ColorResult<T> = std::result::Result<T, ColorError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    #[error("malformed color literal: {raw:?}")]
    Malformed { raw: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorOrdering {
    /// Alpha in bits 24..32, then red, green, blue.
    Argb,
    /// Red in bits 24..32, then green, blue, alpha.
    Rgba,
}

/// Color channels in canonical A, R, G, B order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Channels {
    pub a: u8,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Channels {
    pub const fn new(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self { a, r, g, b }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    value: u32,
    ordering: ColorOrdering,
}

impl Color {
    pub const fn new(value: u32, ordering: ColorOrdering) -> Self {
        Self { value, ordering }
    }

    pub const fn argb(value: u32) -> Self {
        Self::new(value, ColorOrdering::Argb)
    }

    pub const fn rgba(value: u32) -> Self {
        Self::new(value, ColorOrdering::Rgba)
    }

    pub const fn value(self) -> u32 {
        self.value
    }

    pub const fn ordering(self) -> ColorOrdering {
        self.ordering
    }

    pub fn channels(self) -> Channels {
        decompose(self.value, self.ordering)
    }

    pub fn from_channels(channels: Channels, ordering: ColorOrdering) -> Self {
        Self::new(recompose(channels, ordering), ordering)
    }

    pub fn to_ordering(self, ordering: ColorOrdering) -> Self {
        Self::new(convert_ordering(self.value, self.ordering, ordering), ordering)
    }

    /// Replaces the alpha channel, leaving red, green and blue untouched.
    pub fn with_alpha(self, alpha: u8) -> Self {
        let channels = Channels {
            a: alpha,
            ..self.channels()
        };
        Self::from_channels(channels, self.ordering)
    }
}

/// Always `#rrggbbaa`, whatever the stored ordering.
impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", format_rgba_hex(*self))
    }
}

pub fn decompose(value: u32, ordering: ColorOrdering) -> Channels {
    let [hi, mid_hi, mid_lo, lo] = value.to_be_bytes();
    match ordering {
        ColorOrdering::Argb => Channels::new(hi, mid_hi, mid_lo, lo),
        ColorOrdering::Rgba => Channels::new(lo, hi, mid_hi, mid_lo),
    }
}

pub fn recompose(channels: Channels, ordering: ColorOrdering) -> u32 {
    let Channels { a, r, g, b } = channels;
    let bytes = match ordering {
        ColorOrdering::Argb => [a, r, g, b],
        ColorOrdering::Rgba => [r, g, b, a],
    };
    u32::from_be_bytes(bytes)
}

pub fn convert_ordering(value: u32, from: ColorOrdering, to: ColorOrdering) -> u32 {
    recompose(decompose(value, from), to)
}

/// Overlays `alpha` on an RGBA value: `(color & 0xFFFFFF00) | alpha`.
pub fn apply_transparency(color: Color, alpha: u8) -> Color {
    color.to_ordering(ColorOrdering::Rgba).with_alpha(alpha)
}

/// Parses an Android theme value into an RGBA color.
///
/// Decimal literals are 32-bit two's-complement ARGB integers, so `-1` is
/// opaque white. `#`-prefixed literals are hexadecimal ARGB as well.
pub fn parse_color_literal(text: &str) -> ColorResult<Color> {
    let text = text.trim();
    let malformed = || ColorError::Malformed {
        raw: text.to_string(),
    };

    let argb = if let Some(hex) = text.strip_prefix('#') {
        if hex.is_empty() || hex.len() > 8 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(malformed());
        }
        u32::from_str_radix(hex, 16).map_err(|_| malformed())?
    } else {
        let value: i64 = text.parse().map_err(|_| malformed())?;
        if value < i64::from(i32::MIN) || value > i64::from(u32::MAX) {
            return Err(malformed());
        }
        // Negative values wrap by adding 2^32.
        value.rem_euclid(1 << 32) as u32
    };

    Ok(Color::argb(argb).to_ordering(ColorOrdering::Rgba))
}

/// Eight lowercase hex digits, the form used in desktop color lists.
pub fn format_rgba_hex(color: Color) -> String {
    format!("{:08x}", color.to_ordering(ColorOrdering::Rgba).value())
}
