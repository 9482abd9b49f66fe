//! Turning picker input into a source replacement.
//!
//! An edit starts from a [`ColorMatch`] found by a fresh scan. The user's
//! channel values are clamped into range here (the codec never clamps), the
//! new value keeps the match's encoding, and the codec renders the literal
//! that replaces the match's span.
//!
//! ```
//! use qcolor_lens::edit::{self, ChannelEdit, EncodingPolicy};
//! use qcolor_lens::locator::{Locator, Position};
//!
//! let text = "pen = QColor(255, 0, 0)\n";
//! let locator = Locator::new();
//! let updated = edit::edit_at(
//!     &locator,
//!     text,
//!     Position::new(0, 10),
//!     &ChannelEdit::new(255.0, 0.0, 0.0, 128.0),
//!     EncodingPolicy::PromoteAlpha,
//! )
//! .unwrap();
//! assert_eq!(updated, "pen = QColor(255, 0, 0, 128)\n");
//! ```

use std::fmt;

use crate::codec::Codec;
use crate::color::{ColorEncoding, ColorValue};
use crate::locator::{ColorMatch, Locator, Position, Span, match_at};

/// Round and clamp a picker value into a channel. `NaN` becomes 0.
#[must_use]
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "value is rounded and clamped to 0-255 first"
)]
pub fn clamp_channel(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 255.0) as u8
}

/// Raw channel values as a picker reports them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelEdit {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl ChannelEdit {
    #[must_use]
    pub const fn new(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Seed a picker from an existing value.
    #[must_use]
    pub fn from_value(value: &ColorValue) -> Self {
        Self::new(
            f64::from(value.red),
            f64::from(value.green),
            f64::from(value.blue),
            f64::from(value.alpha),
        )
    }

    /// Clamped `[r, g, b, a]`.
    #[must_use]
    pub fn channels(&self) -> [u8; 4] {
        [
            clamp_channel(self.red),
            clamp_channel(self.green),
            clamp_channel(self.blue),
            clamp_channel(self.alpha),
        ]
    }
}

/// What to do when the original encoding cannot carry the edited alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EncodingPolicy {
    /// Keep the original encoding; triple and named silently drop alpha.
    #[default]
    Preserve,
    /// Switch triple to quad and named to hex when alpha is not 255.
    PromoteAlpha,
}

impl EncodingPolicy {
    /// Encoding to write a value with the given alpha in.
    #[must_use]
    pub const fn resolve(self, original: ColorEncoding, alpha: u8) -> ColorEncoding {
        match (self, original) {
            (Self::PromoteAlpha, ColorEncoding::Triple) if alpha != 255 => ColorEncoding::Quad,
            (Self::PromoteAlpha, ColorEncoding::Named) if alpha != 255 => ColorEncoding::Hex,
            _ => original,
        }
    }
}

/// Literal text to put over a span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub span: Span,
    /// Text the span held when the match was found.
    pub expected: String,
    pub text: String,
    /// The value `text` encodes.
    pub value: ColorValue,
}

/// Why an edit could not be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    /// No decodable call under the cursor.
    NoColorAtPosition(Position),
    /// The span reaches past the end of the text.
    OutOfBounds { end: usize, len: usize },
    /// The text under the span changed since the scan.
    Stale { expected: String, found: String },
}

impl fmt::Display for EditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoColorAtPosition(pos) => write!(f, "No QColor found at cursor position {pos}."),
            Self::OutOfBounds { end, len } => {
                write!(f, "Edit span ends at byte {end} but the text has {len} bytes")
            }
            Self::Stale { expected, found } => write!(
                f,
                "Text changed since the scan: expected {expected:?}, found {found:?}"
            ),
        }
    }
}

impl std::error::Error for EditError {}

/// Build the replacement for `target` from picker input.
#[must_use]
pub fn plan_edit(
    codec: &Codec,
    target: &ColorMatch,
    edit: &ChannelEdit,
    policy: EncodingPolicy,
) -> Replacement {
    let [red, green, blue, alpha] = edit.channels();
    let value = target
        .value
        .with_channels(red, green, blue, alpha)
        .with_encoding(policy.resolve(target.value.encoding, alpha));
    let text = codec.format(&value);
    log::debug!(
        "replacing {:?} at {} with {text:?}",
        target.original_text,
        target.span.start_pos
    );
    Replacement {
        span: target.span,
        expected: target.original_text.clone(),
        text,
        value,
    }
}

impl Replacement {
    /// Splice the replacement into `text`.
    ///
    /// # Errors
    ///
    /// Fails with [`EditError::OutOfBounds`] or [`EditError::Stale`] when
    /// `text` is not the snapshot the match was computed from.
    pub fn apply(&self, text: &str) -> Result<String, EditError> {
        let found = text.get(self.span.range()).ok_or(EditError::OutOfBounds {
            end: self.span.end,
            len: text.len(),
        })?;
        if found != self.expected {
            return Err(EditError::Stale {
                expected: self.expected.clone(),
                found: found.to_string(),
            });
        }

        let mut updated = String::with_capacity(text.len() - found.len() + self.text.len());
        updated.push_str(&text[..self.span.start]);
        updated.push_str(&self.text);
        updated.push_str(&text[self.span.end..]);
        Ok(updated)
    }
}

/// Scan `text`, pick the call under `position` and rewrite it.
///
/// # Errors
///
/// Returns [`EditError::NoColorAtPosition`] when no decodable call touches
/// `position`.
pub fn edit_at(
    locator: &Locator,
    text: &str,
    position: Position,
    edit: &ChannelEdit,
    policy: EncodingPolicy,
) -> Result<String, EditError> {
    let matches = locator.find_all(text);
    let target = match_at(&matches, position).ok_or(EditError::NoColorAtPosition(position))?;
    plan_edit(locator.codec(), target, edit, policy).apply(text)
}
