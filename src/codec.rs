//! Decoding constructor arguments into colors, and writing colors back.
//!
//! Parsing recognizes four notations:
//!
//! | Arguments                  | Encoding                  |
//! |----------------------------|---------------------------|
//! | `r, g, b`                  | [`ColorEncoding::Triple`] |
//! | `r, g, b, a`               | [`ColorEncoding::Quad`]   |
//! | `"#rgb"` to `"#rrggbbaa"`  | [`ColorEncoding::Hex`]    |
//! | `"red"`, `'darkGray'`      | [`ColorEncoding::Named`]  |
//!
//! Formatting writes a value back in the notation it was read from, with one
//! exception: named colors always come back as `#rrggbb`, since an edited
//! color generally has no name.
//!
//! # Examples
//!
//! ```
//! use qcolor_lens::codec::{self, Rejection};
//! use qcolor_lens::color::ColorEncoding;
//!
//! let red = codec::parse("\"red\"").unwrap();
//! assert_eq!(red.encoding, ColorEncoding::Named);
//!
//! let edited = red.with_channels(255, 0, 10, 255);
//! assert_eq!(codec::format(&edited), "QColor(\"#ff000a\")");
//!
//! assert_eq!(codec::parse("256, 0, 0"), Err(Rejection::OutOfRange("256".into())));
//! ```

use std::fmt;
use std::num::{IntErrorKind, NonZeroUsize};
use std::sync::{LazyLock, Mutex};

use lru::LruCache;
use smallvec::SmallVec;

use crate::color::{ColorEncoding, ColorValue};
use crate::named::NamedColors;
use crate::sync::{lock_recover, lock_recover_debug};

/// Constructor name used when none is configured.
pub const DEFAULT_CONSTRUCTOR: &str = "QColor";

const CACHE_CAPACITY: usize = 1024;

/// Why an argument list did not decode to a color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Nothing but whitespace.
    Empty,
    /// Comma list with other than 3 or 4 channels.
    Arity(usize),
    /// A channel token that is not a base-10 integer.
    NotAnInteger(String),
    /// A channel outside `0..=255`.
    OutOfRange(String),
    /// Quoted text that is neither hex nor a known name.
    UnknownName(String),
    /// Hex digits of a length other than 3, 4, 6 or 8.
    HexLength(usize),
    /// Hex text containing a non-hex character.
    HexDigit(String),
    /// Neither a comma list nor a string literal.
    Unrecognized(String),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Empty argument list"),
            Self::Arity(n) => write!(f, "Expected 3 or 4 channels, found {n}"),
            Self::NotAnInteger(s) => write!(f, "Channel is not an integer: {s}"),
            Self::OutOfRange(s) => write!(f, "Channel out of range 0-255: {s}"),
            Self::UnknownName(s) => write!(f, "Unknown color name: {s}"),
            Self::HexLength(n) => write!(f, "Hex color must have 3, 4, 6 or 8 digits, found {n}"),
            Self::HexDigit(s) => write!(f, "Invalid hex color: {s}"),
            Self::Unrecognized(s) => write!(f, "Unrecognized color arguments: {s}"),
        }
    }
}

impl std::error::Error for Rejection {}

/// One step of the parse dispatch: if `applies` holds, `decode` decides.
struct ParseRule {
    name: &'static str,
    applies: fn(&str) -> bool,
    decode: fn(&Codec, &str) -> Result<ColorValue, Rejection>,
}

/// Tried top to bottom; the first applicable rule's result is final.
static PARSE_RULES: [ParseRule; 2] = [
    ParseRule {
        name: "channel list",
        applies: is_channel_list,
        decode: Codec::decode_channels,
    },
    ParseRule {
        name: "string literal",
        applies: is_string_literal,
        decode: Codec::decode_string,
    },
];

fn is_channel_list(args: &str) -> bool {
    args.contains(',')
}

fn is_string_literal(args: &str) -> bool {
    args.len() >= 2
        && ((args.starts_with('"') && args.ends_with('"'))
            || (args.starts_with('\'') && args.ends_with('\'')))
}

static DEFAULT_CODEC: LazyLock<Codec> = LazyLock::new(Codec::new);

/// Parse with the default codec (`QColor`, standard named colors).
pub fn parse(args: &str) -> Result<ColorValue, Rejection> {
    DEFAULT_CODEC.parse(args)
}

/// Format with the default codec.
#[must_use]
pub fn format(value: &ColorValue) -> String {
    DEFAULT_CODEC.format(value)
}

/// Two lower-case hex digits, zero padded (`5` → `"05"`).
#[must_use]
pub fn hex_byte(byte: u8) -> String {
    format!("{byte:02x}")
}

/// Parser and formatter for one constructor name and named-color table.
pub struct Codec {
    constructor: String,
    named: NamedColors,
    cache: Mutex<LruCache<String, Result<ColorValue, Rejection>>>,
}

impl Default for Codec {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Codec {
    fn clone(&self) -> Self {
        Self::with_parts(self.constructor.clone(), self.named.clone())
    }
}

impl fmt::Debug for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Codec")
            .field("constructor", &self.constructor)
            .field("named", &self.named.len())
            .finish_non_exhaustive()
    }
}

impl Codec {
    /// `QColor` with the standard named colors.
    #[must_use]
    pub fn new() -> Self {
        Self::with_parts(DEFAULT_CONSTRUCTOR.to_string(), NamedColors::default())
    }

    fn with_parts(constructor: String, named: NamedColors) -> Self {
        let capacity = NonZeroUsize::new(CACHE_CAPACITY).expect("non-zero");
        Self {
            constructor,
            named,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Use another constructor name in formatted output.
    #[must_use]
    pub fn with_constructor(self, constructor: impl Into<String>) -> Self {
        Self::with_parts(constructor.into(), self.named)
    }

    /// Use another named-color table.
    #[must_use]
    pub fn with_named_colors(self, named: NamedColors) -> Self {
        Self::with_parts(self.constructor, named)
    }

    #[must_use]
    pub fn constructor(&self) -> &str {
        &self.constructor
    }

    #[must_use]
    pub fn named_colors(&self) -> &NamedColors {
        &self.named
    }

    /// Decode a constructor's argument list (cached).
    ///
    /// # Errors
    ///
    /// Returns the [`Rejection`] describing why `args` is not a color.
    pub fn parse(&self, args: &str) -> Result<ColorValue, Rejection> {
        let args = args.trim();

        if let Some(cached) = lock_recover(&self.cache).get(args) {
            return cached.clone();
        }

        let result = self.parse_uncached(args);
        lock_recover_debug(&self.cache, "Codec::parse cache")
            .put(args.to_string(), result.clone());
        result
    }

    fn parse_uncached(&self, args: &str) -> Result<ColorValue, Rejection> {
        if args.is_empty() {
            return Err(Rejection::Empty);
        }

        match PARSE_RULES.iter().find(|rule| (rule.applies)(args)) {
            Some(rule) => {
                let result = (rule.decode)(self, args);
                if let Err(rejection) = &result {
                    log::trace!("{} rule rejected {args:?}: {rejection}", rule.name);
                }
                result
            }
            None => Err(Rejection::Unrecognized(args.to_string())),
        }
    }

    fn decode_channels(&self, args: &str) -> Result<ColorValue, Rejection> {
        let tokens: SmallVec<[&str; 4]> = args.split(',').map(str::trim).collect();
        let encoding = match tokens.len() {
            3 => ColorEncoding::Triple,
            4 => ColorEncoding::Quad,
            n => return Err(Rejection::Arity(n)),
        };

        let mut channels = [0, 0, 0, 255];
        for (slot, token) in channels.iter_mut().zip(&tokens) {
            *slot = parse_channel(token)?;
        }

        let [red, green, blue, alpha] = channels;
        Ok(ColorValue::new(red, green, blue, alpha, encoding).source(args))
    }

    fn decode_string(&self, args: &str) -> Result<ColorValue, Rejection> {
        let inner = &args[1..args.len() - 1];
        if inner.starts_with('#') {
            return decode_hex(inner).map(|value| value.source(args));
        }

        match self.named.get(inner) {
            Some([red, green, blue]) => {
                Ok(ColorValue::new(red, green, blue, 255, ColorEncoding::Named).source(args))
            }
            None => Err(Rejection::UnknownName(inner.to_string())),
        }
    }

    /// Render `value` as a constructor call in its original notation.
    ///
    /// Triple drops alpha; named colors come back as `#rrggbb`, also without
    /// alpha. Hex includes the alpha byte only when it is not 255.
    #[must_use]
    pub fn format(&self, value: &ColorValue) -> String {
        let ctor = &self.constructor;
        let ColorValue {
            red,
            green,
            blue,
            alpha,
            ..
        } = *value;

        match value.encoding {
            ColorEncoding::Triple => format!("{ctor}({red}, {green}, {blue})"),
            ColorEncoding::Quad => format!("{ctor}({red}, {green}, {blue}, {alpha})"),
            ColorEncoding::Hex if value.is_opaque() => {
                format!("{ctor}(\"{}\")", value.hex_rgb())
            }
            ColorEncoding::Hex => {
                format!("{ctor}(\"{}{}\")", value.hex_rgb(), hex_byte(alpha))
            }
            ColorEncoding::Named => format!("{ctor}(\"{}\")", value.hex_rgb()),
        }
    }
}

fn parse_channel(token: &str) -> Result<u8, Rejection> {
    match token.parse::<i64>() {
        Ok(value) => u8::try_from(value).map_err(|_| Rejection::OutOfRange(token.to_string())),
        Err(e) if matches!(*e.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) => {
            Err(Rejection::OutOfRange(token.to_string()))
        }
        Err(_) => Err(Rejection::NotAnInteger(token.to_string())),
    }
}

/// Decode `#rgb`, `#rgba`, `#rrggbb` or `#rrggbbaa` (case-insensitive).
fn decode_hex(text: &str) -> Result<ColorValue, Rejection> {
    let digits = text.strip_prefix('#').unwrap_or(text).to_ascii_lowercase();
    let width = match digits.len() {
        3 | 4 => 1,
        6 | 8 => 2,
        n => return Err(Rejection::HexLength(n)),
    };
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(Rejection::HexDigit(text.to_string()));
    }

    let mut channels = [0, 0, 0, 255];
    for (slot, start) in channels.iter_mut().zip((0..digits.len()).step_by(width)) {
        let byte = u8::from_str_radix(&digits[start..start + width], 16)
            .map_err(|_| Rejection::HexDigit(text.to_string()))?;
        // A single digit stands for itself repeated: `f` -> `ff`.
        *slot = if width == 1 { byte * 17 } else { byte };
    }

    let [red, green, blue, alpha] = channels;
    Ok(ColorValue::new(red, green, blue, alpha, ColorEncoding::Hex))
}
