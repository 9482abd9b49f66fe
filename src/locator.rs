//! Finding constructor calls in a text buffer.
//!
//! The locator treats `Ctor(args)` purely as a string pattern. The argument
//! list runs up to the first `)`, so calls whose arguments contain their own
//! parentheses (`QColor(int(x), 0, 0)`) are cut short, fail to decode and are
//! skipped.
//!
//! Matches carry byte offsets into the scanned text plus line/column
//! positions. They describe one snapshot of the text only: after any edit the
//! buffer must be scanned again.
//!
//! # Examples
//!
//! ```
//! use qcolor_lens::color::ColorEncoding;
//! use qcolor_lens::locator;
//!
//! let text = "color = QColor(255, 0, 0)\nbg = QColor(\"#00FF00\")";
//! let matches: Vec<_> = locator::find(text).collect();
//!
//! assert_eq!(matches.len(), 2);
//! assert_eq!(matches[0].value.encoding, ColorEncoding::Triple);
//! assert_eq!(matches[1].span.start_pos.line, 1);
//! assert_eq!(&text[matches[1].span.range()], "QColor(\"#00FF00\")");
//! ```

use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::{CaptureMatches, Regex};

use crate::codec::Codec;
use crate::color::ColorValue;

static DEFAULT_LOCATOR: LazyLock<Locator> = LazyLock::new(Locator::new);

/// Scan `text` for `QColor(...)` calls using the default codec.
pub fn find(text: &str) -> Matches<'static, '_> {
    DEFAULT_LOCATOR.find(text)
}

/// The first match whose span contains `position` (end inclusive).
#[must_use]
pub fn match_at(matches: &[ColorMatch], position: Position) -> Option<&ColorMatch> {
    matches.iter().find(|m| m.span.contains(position))
}

/// How columns are counted within a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColumnUnit {
    /// UTF-8 bytes.
    Byte,
    /// Unicode scalar values.
    Char,
    /// UTF-16 code units, as editor protocols count them.
    #[default]
    Utf16,
}

impl ColumnUnit {
    pub const ALL: [Self; 3] = [Self::Byte, Self::Char, Self::Utf16];

    fn measure(self, text: &str) -> usize {
        match self {
            Self::Byte => text.len(),
            Self::Char => text.chars().count(),
            Self::Utf16 => text.encode_utf16().count(),
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Byte => "byte",
            Self::Char => "char",
            Self::Utf16 => "utf16",
        }
    }
}

impl FromStr for ColumnUnit {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "byte" | "bytes" | "utf8" => Ok(Self::Byte),
            "char" | "chars" => Ok(Self::Char),
            "utf16" | "utf-16" => Ok(Self::Utf16),
            _ => {
                let expected: Vec<&str> = Self::ALL.iter().map(Self::name).collect();
                Err(format!(
                    "Invalid column unit `{value}` (expected: {}).",
                    expected.join("|")
                ))
            }
        }
    }
}

/// Zero-based line and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub line: usize,
    pub character: usize,
}

impl Position {
    #[must_use]
    pub const fn new(line: usize, character: usize) -> Self {
        Self { line, character }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.character + 1)
    }
}

/// Half-open byte range `start..end` with matching positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub start_pos: Position,
    pub end_pos: Position,
}

impl Span {
    #[must_use]
    pub const fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether a byte offset falls inside the half-open range.
    #[must_use]
    pub const fn contains_offset(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }

    /// Whether a cursor position touches the span.
    ///
    /// Both ends are inclusive, so a cursor resting right after the closing
    /// parenthesis still selects the call.
    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        self.start_pos <= position && position <= self.end_pos
    }
}

/// One decoded constructor call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorMatch {
    /// Exactly `Ctor(...)`, parentheses included.
    pub span: Span,
    pub value: ColorValue,
    /// The text covered by `span` at scan time.
    pub original_text: String,
}

/// Maps byte offsets in a text to line/column positions.
///
/// Lines are separated by `\n`; a `\r` before it counts as a column of the
/// preceding line.
#[derive(Debug, Clone)]
pub struct LineIndex<'t> {
    text: &'t str,
    line_starts: Vec<usize>,
    unit: ColumnUnit,
}

impl<'t> LineIndex<'t> {
    #[must_use]
    pub fn new(text: &'t str, unit: ColumnUnit) -> Self {
        let line_starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            text,
            line_starts,
            unit,
        }
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Position of a byte offset. Offsets past the end, or inside a
    /// multi-byte character, snap back to the nearest character boundary.
    #[must_use]
    pub fn position_at(&self, offset: usize) -> Position {
        let mut offset = offset.min(self.text.len());
        while !self.text.is_char_boundary(offset) {
            offset -= 1;
        }
        let line = self.line_starts.partition_point(|&start| start <= offset) - 1;
        let line_start = self.line_starts[line];
        Position {
            line,
            character: self.unit.measure(&self.text[line_start..offset]),
        }
    }

    /// Byte offset of a position, if it lies within the text.
    ///
    /// A column past the end of its line, or one that splits a character,
    /// yields `None`.
    #[must_use]
    pub fn offset_at(&self, position: Position) -> Option<usize> {
        let line_start = *self.line_starts.get(position.line)?;
        let line_end = self
            .line_starts
            .get(position.line + 1)
            .map_or(self.text.len(), |next| next - 1);
        let line = &self.text[line_start..line_end];

        let mut column = 0;
        for (index, ch) in line.char_indices() {
            if column == position.character {
                return Some(line_start + index);
            }
            column += self.unit.measure(ch.encode_utf8(&mut [0; 4]));
            if column > position.character {
                return None;
            }
        }
        (column == position.character).then_some(line_end)
    }
}

/// Position of `offset` in `text`; a pure function of its inputs.
#[must_use]
pub fn position_at(text: &str, offset: usize, unit: ColumnUnit) -> Position {
    LineIndex::new(text, unit).position_at(offset)
}

/// Scanner for one constructor name.
#[derive(Debug, Clone)]
pub struct Locator {
    codec: Codec,
    pattern: Regex,
    unit: ColumnUnit,
}

impl Default for Locator {
    fn default() -> Self {
        Self::new()
    }
}

impl Locator {
    /// Locator for `QColor(...)` with the default codec.
    #[must_use]
    pub fn new() -> Self {
        Self::from_codec(Codec::new()).expect("valid regex")
    }

    /// Locator for the codec's constructor name.
    ///
    /// # Errors
    ///
    /// Returns the regex error if the pattern built from the constructor name
    /// cannot be compiled (for instance when it exceeds the size limit).
    pub fn from_codec(codec: Codec) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!(
            r"{}\s*\(\s*([^)]+)\s*\)",
            regex::escape(codec.constructor())
        ))?;
        Ok(Self {
            codec,
            pattern,
            unit: ColumnUnit::default(),
        })
    }

    /// Count columns in `unit` instead of UTF-16 code units.
    #[must_use]
    pub fn with_column_unit(mut self, unit: ColumnUnit) -> Self {
        self.unit = unit;
        self
    }

    #[must_use]
    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    #[must_use]
    pub fn column_unit(&self) -> ColumnUnit {
        self.unit
    }

    /// Lazily scan `text` from the start, left to right.
    pub fn find<'l, 't>(&'l self, text: &'t str) -> Matches<'l, 't> {
        Matches {
            codec: &self.codec,
            captures: self.pattern.captures_iter(text),
            index: LineIndex::new(text, self.unit),
        }
    }

    /// Scan `text` and collect every match.
    #[must_use]
    pub fn find_all(&self, text: &str) -> Vec<ColorMatch> {
        let matches: Vec<ColorMatch> = self.find(text).collect();
        log::debug!(
            "found {} {} call(s) in {} line(s)",
            matches.len(),
            self.codec.constructor(),
            text.lines().count()
        );
        matches
    }
}

/// Iterator over the decodable calls in one text; see [`Locator::find`].
pub struct Matches<'l, 't> {
    codec: &'l Codec,
    captures: CaptureMatches<'l, 't>,
    index: LineIndex<'t>,
}

impl Iterator for Matches<'_, '_> {
    type Item = ColorMatch;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let caps = self.captures.next()?;
            let (Some(call), Some(args)) = (caps.get(0), caps.get(1)) else {
                continue;
            };

            match self.codec.parse(args.as_str()) {
                Ok(value) => {
                    let span = Span {
                        start: call.start(),
                        end: call.end(),
                        start_pos: self.index.position_at(call.start()),
                        end_pos: self.index.position_at(call.end()),
                    };
                    return Some(ColorMatch {
                        span,
                        value,
                        original_text: call.as_str().to_string(),
                    });
                }
                Err(rejection) => {
                    log::trace!(
                        "skipping {:?} at byte {}: {rejection}",
                        call.as_str(),
                        call.start()
                    );
                }
            }
        }
    }
}
