//! Normalized color values.
//!
//! A [`ColorValue`] is what the codec produces from a constructor's argument
//! list: four 8-bit channels plus the [`ColorEncoding`] the color was
//! originally written in. The encoding travels with the value so that an
//! edited color can be written back in the notation the author used.
//!
//! # Examples
//!
//! ```
//! use qcolor_lens::color::{ColorEncoding, ColorValue};
//!
//! let orange = ColorValue::new(255, 136, 0, 255, ColorEncoding::Triple);
//! assert_eq!(orange.hex_rgb(), "#ff8800");
//! assert_eq!(orange.css(), "rgb(255, 136, 0)");
//!
//! let glass = orange.with_channels(255, 136, 0, 128);
//! assert_eq!(glass.encoding, ColorEncoding::Triple);
//! assert_eq!(glass.css(), "rgba(255, 136, 0, 0.50)");
//! ```

use std::fmt;

/// Textual notation a color literal was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorEncoding {
    /// `Ctor(r, g, b)`.
    #[default]
    Triple,
    /// `Ctor(r, g, b, a)`.
    Quad,
    /// `Ctor("#rgb")`, `Ctor("#rgba")`, `Ctor("#rrggbb")` or `Ctor("#rrggbbaa")`.
    Hex,
    /// `Ctor("name")`, looked up in a named-color table.
    Named,
}

impl ColorEncoding {
    /// Stable lower-case name of the encoding.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Triple => "rgb",
            Self::Quad => "rgba",
            Self::Hex => "hex",
            Self::Named => "named",
        }
    }

    /// Whether text written in this encoding can carry a non-opaque alpha.
    #[must_use]
    pub const fn carries_alpha(&self) -> bool {
        matches!(self, Self::Quad | Self::Hex)
    }
}

impl fmt::Display for ColorEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A decoded color with the notation it came from.
///
/// Channels are `u8`, so every constructed value is in range; parsing rejects
/// out-of-range input instead of clamping it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColorValue {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
    /// Notation the value was read from; drives formatting.
    pub encoding: ColorEncoding,
    /// The argument text the value was decoded from, kept for diagnostics.
    pub source_args: String,
}

impl ColorValue {
    /// Create a value with no recorded source text.
    #[must_use]
    pub fn new(red: u8, green: u8, blue: u8, alpha: u8, encoding: ColorEncoding) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
            encoding,
            source_args: String::new(),
        }
    }

    /// Attach the argument text this value was decoded from.
    #[must_use]
    pub fn source(mut self, args: impl Into<String>) -> Self {
        self.source_args = args.into();
        self
    }

    /// Copy of this value with new channels, keeping encoding and source.
    #[must_use]
    pub fn with_channels(&self, red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
            encoding: self.encoding,
            source_args: self.source_args.clone(),
        }
    }

    /// Copy of this value re-tagged with another encoding.
    #[must_use]
    pub fn with_encoding(&self, encoding: ColorEncoding) -> Self {
        Self {
            encoding,
            ..self.clone()
        }
    }

    /// Channels as an `[r, g, b, a]` array.
    #[must_use]
    pub const fn channels(&self) -> [u8; 4] {
        [self.red, self.green, self.blue, self.alpha]
    }

    #[must_use]
    pub const fn is_opaque(&self) -> bool {
        self.alpha == 255
    }

    /// `#rrggbb`, alpha ignored.
    #[must_use]
    pub fn hex_rgb(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }

    /// CSS color string used for swatches.
    ///
    /// Opaque colors render as `rgb(r, g, b)`; translucent ones as
    /// `rgba(r, g, b, a)` with alpha scaled to `0.00..=1.00`.
    #[must_use]
    pub fn css(&self) -> String {
        if self.is_opaque() {
            format!("rgb({}, {}, {})", self.red, self.green, self.blue)
        } else {
            let alpha = f64::from(self.alpha) / 255.0;
            format!(
                "rgba({}, {}, {}, {alpha:.2})",
                self.red, self.green, self.blue
            )
        }
    }
}

impl fmt::Display for ColorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {}, {}, {})",
            self.encoding, self.red, self.green, self.blue, self.alpha
        )
    }
}
