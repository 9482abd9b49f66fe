//! Terminal color samples.
//!
//! A swatch is a run of blank cells painted with the color's background.
//! Alpha is not shown: the terminal's own background is unknown, so there is
//! nothing meaningful to blend against.

use std::io::IsTerminal;

use crossterm::style::{Color, ContentStyle};

use crate::color::ColorValue;

/// How swatches are painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SwatchMode {
    /// 24-bit background color.
    TrueColor,
    /// Nearest entry of the 256-color palette.
    EightBit,
    /// No swatch at all.
    #[default]
    Off,
}

struct EnvSettings {
    no_color: Option<String>,
    colorterm: Option<String>,
    term: Option<String>,
}

fn read_env_settings() -> EnvSettings {
    EnvSettings {
        no_color: std::env::var("NO_COLOR").ok(),
        colorterm: std::env::var("COLORTERM").ok(),
        term: std::env::var("TERM").ok(),
    }
}

/// Pick a swatch mode for stdout from `NO_COLOR`, `COLORTERM` and `TERM`.
#[must_use]
pub fn detect_swatch_mode() -> SwatchMode {
    detect_swatch_mode_with(&read_env_settings(), std::io::stdout().is_terminal())
}

fn detect_swatch_mode_with(env: &EnvSettings, is_tty: bool) -> SwatchMode {
    // https://no-color.org/
    if env.no_color.as_deref().is_some_and(|v| !v.is_empty()) {
        return SwatchMode::Off;
    }
    if !is_tty {
        return SwatchMode::Off;
    }

    if let Some(colorterm) = env.colorterm.as_deref() {
        let colorterm = colorterm.trim().to_lowercase();
        if colorterm == "truecolor" || colorterm == "24bit" {
            return SwatchMode::TrueColor;
        }
    }

    let term = env
        .term
        .as_deref()
        .map(|t| t.trim().to_lowercase())
        .unwrap_or_default();
    if term == "dumb" || term == "unknown" {
        return SwatchMode::Off;
    }
    match term.rsplit('-').next().unwrap_or("") {
        "direct" => SwatchMode::TrueColor,
        _ => SwatchMode::EightBit,
    }
}

/// Paint `width` cells in the color of `value`.
#[must_use]
pub fn render_swatch(value: &ColorValue, width: usize, mode: SwatchMode) -> String {
    let background = match mode {
        SwatchMode::Off => return String::new(),
        SwatchMode::TrueColor => Color::Rgb {
            r: value.red,
            g: value.green,
            b: value.blue,
        },
        SwatchMode::EightBit => {
            Color::AnsiValue(rgb_to_eight_bit(value.red, value.green, value.blue))
        }
    };
    if width == 0 {
        return String::new();
    }
    let style = ContentStyle {
        background_color: Some(background),
        ..ContentStyle::default()
    };
    style.apply(" ".repeat(width)).to_string()
}

/// Nearest color in the xterm 256-color palette.
///
/// Low-saturation colors go to the 24-step gray ramp, everything else to the
/// 6×6×6 cube.
#[must_use]
pub fn rgb_to_eight_bit(red: u8, green: u8, blue: u8) -> u8 {
    let max = red.max(green).max(blue);
    let min = red.min(green).min(blue);
    let lightness = (f64::from(max) + f64::from(min)) / 510.0;
    let delta = f64::from(max - min) / 255.0;
    let saturation = if delta == 0.0 {
        0.0
    } else {
        delta / (1.0 - (2.0 * lightness - 1.0).abs())
    };

    if saturation < 0.15 {
        if lightness < 0.04 {
            return 16;
        }
        if lightness > 0.96 {
            return 231;
        }
        #[expect(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            reason = "lightness is in 0.04-0.96 so the index is 0-24"
        )]
        let gray = ((lightness - 0.04) / 0.92 * 24.0).round() as u8;
        return 232 + gray.min(23);
    }

    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "values are in 0-5 range"
    )]
    let quantize = |v: u8| -> u8 {
        if v < 95 {
            (f64::from(v) / 95.0).round() as u8
        } else {
            1 + ((f64::from(v) - 95.0) / 40.0).round() as u8
        }
        .min(5)
    };

    16 + quantize(red) * 36 + quantize(green) * 6 + quantize(blue)
}
