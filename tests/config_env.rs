//! `LensConfig::from_env` against the real process environment.
//!
//! Every test is `#[serial]` because the environment is process-global.

mod common;

use common::{init_test_logging, with_env_vars};
use qcolor_lens::prelude::*;
use serial_test::serial;

const ALL_VARS: [&str; 6] = [
    "QCOLOR_LENS_ENABLED",
    "QCOLOR_LENS_CONSTRUCTOR",
    "QCOLOR_LENS_COLUMNS",
    "QCOLOR_LENS_SWATCH_WIDTH",
    "QCOLOR_LENS_PROMOTE_ALPHA",
    "QCOLOR_LENS_NAMED",
];

/// Clear every lens variable, then apply `vars` on top.
fn with_lens_env<R>(vars: &[(&str, &str)], f: impl FnOnce() -> R) -> R {
    let mut settings: Vec<(&str, Option<&str>)> = ALL_VARS.iter().map(|k| (*k, None)).collect();
    for (key, value) in vars {
        if let Some(slot) = settings.iter_mut().find(|(k, _)| k == key) {
            slot.1 = Some(*value);
        }
    }
    with_env_vars(&settings, f)
}

#[test]
#[serial]
fn from_env_without_variables_is_default() {
    init_test_logging();
    let cfg = with_lens_env(&[], LensConfig::from_env);
    assert_eq!(cfg, LensConfig::default());
}

#[test]
#[serial]
fn from_env_reads_every_variable() {
    init_test_logging();
    let cfg = with_lens_env(
        &[
            ("QCOLOR_LENS_ENABLED", "false"),
            ("QCOLOR_LENS_CONSTRUCTOR", "QtGui.QColor"),
            ("QCOLOR_LENS_COLUMNS", "byte"),
            ("QCOLOR_LENS_SWATCH_WIDTH", "0"),
            ("QCOLOR_LENS_PROMOTE_ALPHA", "on"),
            ("QCOLOR_LENS_NAMED", "brand=#3daee9"),
        ],
        LensConfig::from_env,
    );

    assert!(!cfg.enabled);
    assert_eq!(cfg.constructor, "QtGui.QColor");
    assert_eq!(cfg.column_unit, ColumnUnit::Byte);
    assert_eq!(cfg.swatch_width, 0);
    assert_eq!(cfg.encoding_policy, EncodingPolicy::PromoteAlpha);
    assert_eq!(cfg.named_colors.get("brand"), Some([0x3d, 0xae, 0xe9]));
}

#[test]
#[serial]
fn from_env_named_colors_reach_the_codec() {
    init_test_logging();
    let cfg = with_lens_env(
        &[("QCOLOR_LENS_NAMED", "ink=10,20,30")],
        LensConfig::from_env,
    );
    let found = cfg.locator().unwrap().find_all("QColor('ink')");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].value.channels(), [10, 20, 30, 255]);
}

#[test]
#[serial]
fn from_env_ignores_garbage() {
    init_test_logging();
    let cfg = with_lens_env(
        &[
            ("QCOLOR_LENS_ENABLED", "perhaps"),
            ("QCOLOR_LENS_COLUMNS", "pixels"),
            ("QCOLOR_LENS_SWATCH_WIDTH", "-1"),
        ],
        LensConfig::from_env,
    );
    assert_eq!(cfg, LensConfig::default());
}
