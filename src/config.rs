//! Runtime options.
//!
//! Defaults match the usual Qt-for-Python setup: `QColor`, the standard
//! named colors, UTF-16 columns. Each option can be overridden by a builder
//! setter or by an environment variable:
//!
//! | Variable                      | Example                      |
//! |-------------------------------|------------------------------|
//! | `QCOLOR_LENS_ENABLED`         | `0`, `false`, `off`          |
//! | `QCOLOR_LENS_CONSTRUCTOR`     | `QtGui.QColor`               |
//! | `QCOLOR_LENS_COLUMNS`         | `byte`, `char`, `utf16`      |
//! | `QCOLOR_LENS_SWATCH_WIDTH`    | `4`                          |
//! | `QCOLOR_LENS_PROMOTE_ALPHA`   | `1`                          |
//! | `QCOLOR_LENS_NAMED`           | `orange=#ffa500;teal=0,128,128` |
//!
//! Malformed values are logged and ignored.

use crate::codec::{Codec, DEFAULT_CONSTRUCTOR};
use crate::edit::EncodingPolicy;
use crate::locator::{ColumnUnit, Locator};
use crate::named::NamedColors;

/// Widest swatch accepted, in terminal cells.
pub const MAX_SWATCH_WIDTH: usize = 16;

#[derive(Debug, Default)]
struct EnvSettings {
    enabled: Option<String>,
    constructor: Option<String>,
    columns: Option<String>,
    swatch_width: Option<String>,
    promote_alpha: Option<String>,
    named: Option<String>,
}

fn read_env_settings() -> EnvSettings {
    EnvSettings {
        enabled: std::env::var("QCOLOR_LENS_ENABLED").ok(),
        constructor: std::env::var("QCOLOR_LENS_CONSTRUCTOR").ok(),
        columns: std::env::var("QCOLOR_LENS_COLUMNS").ok(),
        swatch_width: std::env::var("QCOLOR_LENS_SWATCH_WIDTH").ok(),
        promote_alpha: std::env::var("QCOLOR_LENS_PROMOTE_ALPHA").ok(),
        named: std::env::var("QCOLOR_LENS_NAMED").ok(),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Options shared by the scanner, the codec and the CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LensConfig {
    /// When false, the CLI reports and edits nothing.
    pub enabled: bool,
    pub constructor: String,
    pub column_unit: ColumnUnit,
    /// Swatch width in terminal cells.
    pub swatch_width: usize,
    pub encoding_policy: EncodingPolicy,
    pub named_colors: NamedColors,
}

impl Default for LensConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            constructor: DEFAULT_CONSTRUCTOR.to_string(),
            column_unit: ColumnUnit::default(),
            swatch_width: 2,
            encoding_policy: EncodingPolicy::default(),
            named_colors: NamedColors::default(),
        }
    }
}

impl LensConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overlaid with `QCOLOR_LENS_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().overlay_env(&read_env_settings())
    }

    fn overlay_env(mut self, env: &EnvSettings) -> Self {
        if let Some(raw) = env.enabled.as_deref() {
            match parse_bool(raw) {
                Some(enabled) => self.enabled = enabled,
                None => log::warn!("ignoring QCOLOR_LENS_ENABLED={raw:?}: expected a boolean"),
            }
        }

        if let Some(raw) = env.constructor.as_deref() {
            let raw = raw.trim();
            if raw.is_empty() {
                log::warn!("ignoring empty QCOLOR_LENS_CONSTRUCTOR");
            } else {
                self.constructor = raw.to_string();
            }
        }

        if let Some(raw) = env.columns.as_deref() {
            match raw.parse() {
                Ok(unit) => self.column_unit = unit,
                Err(message) => log::warn!("ignoring QCOLOR_LENS_COLUMNS: {message}"),
            }
        }

        if let Some(raw) = env.swatch_width.as_deref() {
            match raw.trim().parse::<usize>() {
                Ok(width) if width <= MAX_SWATCH_WIDTH => self.swatch_width = width,
                _ => log::warn!(
                    "ignoring QCOLOR_LENS_SWATCH_WIDTH={raw:?}: expected 0-{MAX_SWATCH_WIDTH}"
                ),
            }
        }

        if let Some(raw) = env.promote_alpha.as_deref() {
            match parse_bool(raw) {
                Some(true) => self.encoding_policy = EncodingPolicy::PromoteAlpha,
                Some(false) => self.encoding_policy = EncodingPolicy::Preserve,
                None => {
                    log::warn!("ignoring QCOLOR_LENS_PROMOTE_ALPHA={raw:?}: expected a boolean");
                }
            }
        }

        if let Some(raw) = env.named.as_deref() {
            self.named_colors = extend_named_colors(self.named_colors, raw);
        }

        self
    }

    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    #[must_use]
    pub fn constructor(mut self, constructor: impl Into<String>) -> Self {
        self.constructor = constructor.into();
        self
    }

    #[must_use]
    pub fn column_unit(mut self, unit: ColumnUnit) -> Self {
        self.column_unit = unit;
        self
    }

    #[must_use]
    pub fn swatch_width(mut self, width: usize) -> Self {
        self.swatch_width = width.min(MAX_SWATCH_WIDTH);
        self
    }

    #[must_use]
    pub fn encoding_policy(mut self, policy: EncodingPolicy) -> Self {
        self.encoding_policy = policy;
        self
    }

    #[must_use]
    pub fn named_color(mut self, name: impl Into<String>, rgb: [u8; 3]) -> Self {
        self.named_colors = self.named_colors.with_color(name, rgb);
        self
    }

    /// Codec for the configured constructor and names.
    #[must_use]
    pub fn codec(&self) -> Codec {
        Codec::new()
            .with_constructor(self.constructor.clone())
            .with_named_colors(self.named_colors.clone())
    }

    /// Locator for the configured constructor and column unit.
    ///
    /// # Errors
    ///
    /// Returns the regex error if the constructor name yields an
    /// uncompilable pattern.
    pub fn locator(&self) -> Result<Locator, regex::Error> {
        Ok(Locator::from_codec(self.codec())?.with_column_unit(self.column_unit))
    }
}

/// Add `name=color` entries separated by `;`. Colors use constructor
/// argument syntax without quotes: `#ffa500` or `255,165,0`.
fn extend_named_colors(mut table: NamedColors, entries: &str) -> NamedColors {
    let codec = Codec::new().with_named_colors(NamedColors::empty());
    for entry in entries.split(';').map(str::trim).filter(|e| !e.is_empty()) {
        let Some((name, color)) = entry.split_once('=') else {
            log::warn!("ignoring named color {entry:?}: expected name=color");
            continue;
        };
        let color = color.trim();
        let args = if color.starts_with('#') {
            format!("\"{color}\"")
        } else {
            color.to_string()
        };
        match codec.parse(&args) {
            Ok(value) => table = table.with_color(name.trim(), [value.red, value.green, value.blue]),
            Err(rejection) => log::warn!("ignoring named color {name:?}: {rejection}"),
        }
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = LensConfig::default();
        assert!(cfg.enabled);
        assert_eq!(cfg.constructor, "QColor");
        assert_eq!(cfg.column_unit, ColumnUnit::Utf16);
        assert_eq!(cfg.swatch_width, 2);
        assert_eq!(cfg.encoding_policy, EncodingPolicy::Preserve);
        assert_eq!(&cfg.named_colors, NamedColors::standard());
    }

    #[test]
    fn test_overlay_env_values() {
        let env = EnvSettings {
            enabled: Some("off".into()),
            constructor: Some(" QtGui.QColor ".into()),
            columns: Some("char".into()),
            swatch_width: Some("4".into()),
            promote_alpha: Some("yes".into()),
            named: Some("orange=#ffa500; teal = 0,128,128".into()),
        };
        let cfg = LensConfig::default().overlay_env(&env);
        assert!(!cfg.enabled);
        assert_eq!(cfg.constructor, "QtGui.QColor");
        assert_eq!(cfg.column_unit, ColumnUnit::Char);
        assert_eq!(cfg.swatch_width, 4);
        assert_eq!(cfg.encoding_policy, EncodingPolicy::PromoteAlpha);
        assert_eq!(cfg.named_colors.get("orange"), Some([255, 165, 0]));
        assert_eq!(cfg.named_colors.get("teal"), Some([0, 128, 128]));
        assert_eq!(cfg.named_colors.get("red"), Some([255, 0, 0]));
    }

    #[test]
    fn test_overlay_env_ignores_malformed_values() {
        let env = EnvSettings {
            enabled: Some("maybe".into()),
            constructor: Some("   ".into()),
            columns: Some("graphemes".into()),
            swatch_width: Some("99".into()),
            promote_alpha: Some("sometimes".into()),
            named: Some("bogus; bad=#12; worse=300,0,0".into()),
        };
        assert_eq!(LensConfig::default().overlay_env(&env), LensConfig::default());
    }

    #[test]
    fn test_empty_env_changes_nothing() {
        let cfg = LensConfig::default().overlay_env(&EnvSettings::default());
        assert_eq!(cfg, LensConfig::default());
    }

    #[test]
    fn test_builder_setters() {
        let cfg = LensConfig::new()
            .enabled(false)
            .constructor("Color")
            .column_unit(ColumnUnit::Byte)
            .swatch_width(100)
            .encoding_policy(EncodingPolicy::PromoteAlpha)
            .named_color("ink", [1, 2, 3]);
        assert!(!cfg.enabled);
        assert_eq!(cfg.constructor, "Color");
        assert_eq!(cfg.column_unit, ColumnUnit::Byte);
        assert_eq!(cfg.swatch_width, MAX_SWATCH_WIDTH);
        assert_eq!(cfg.encoding_policy, EncodingPolicy::PromoteAlpha);
        assert_eq!(cfg.named_colors.get("ink"), Some([1, 2, 3]));
    }

    #[test]
    fn test_codec_and_locator_follow_config() {
        let cfg = LensConfig::new()
            .constructor("Color")
            .column_unit(ColumnUnit::Byte)
            .named_color("ink", [1, 2, 3]);
        let codec = cfg.codec();
        assert_eq!(codec.constructor(), "Color");
        assert!(codec.parse("\"ink\"").is_ok());

        let locator = cfg.locator().unwrap();
        assert_eq!(locator.column_unit(), ColumnUnit::Byte);
        let found = locator.find_all("é Color('ink') QColor(1, 2, 3)");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].span.start_pos.character, 3);
        // The name is matched as plain text, so `QColor` contains `Color`.
        assert_eq!(found[1].original_text, "Color(1, 2, 3)");
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool(" 0 "), Some(false));
        assert_eq!(parse_bool(""), None);
    }
}
