//! Property-based tests for qcolor_lens.
//!
//! Uses proptest to check the codec round-trip laws and the locator's span
//! bookkeeping over generated input.

use proptest::prelude::*;

use qcolor_lens::codec::{self, Codec, Rejection};
use qcolor_lens::color::{ColorEncoding, ColorValue};
use qcolor_lens::edit::{ChannelEdit, EncodingPolicy, clamp_channel, plan_edit};
use qcolor_lens::locator::{ColumnUnit, LineIndex, find};

// ============================================================================
// Custom Strategies
// ============================================================================

fn rgb() -> impl Strategy<Value = (u8, u8, u8)> {
    (any::<u8>(), any::<u8>(), any::<u8>())
}

fn rgba() -> impl Strategy<Value = (u8, u8, u8, u8)> {
    (any::<u8>(), any::<u8>(), any::<u8>(), any::<u8>())
}

/// Whitespace the scanner has to tolerate around tokens.
fn padding() -> impl Strategy<Value = String> {
    "[ \t\n]{0,3}"
}

/// Picker input, including values the UI has to clamp.
fn picker_value() -> impl Strategy<Value = f64> {
    prop_oneof![
        -1000.0f64..1000.0,
        Just(f64::NAN),
        Just(f64::INFINITY),
        Just(f64::NEG_INFINITY),
    ]
}

/// Argument text of a formatted call.
fn args_of(call: &str) -> &str {
    call.strip_prefix("QColor(")
        .and_then(|rest| rest.strip_suffix(')'))
        .unwrap_or(call)
}

// ============================================================================
// Codec round trips
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn triple_round_trips((r, g, b) in rgb()) {
        let value = ColorValue::new(r, g, b, 255, ColorEncoding::Triple);
        let parsed = codec::parse(args_of(&codec::format(&value))).unwrap();
        prop_assert_eq!(parsed.channels(), [r, g, b, 255]);
        prop_assert_eq!(parsed.encoding, ColorEncoding::Triple);
    }

    #[test]
    fn quad_parses_all_channels((r, g, b, a) in rgba()) {
        let parsed = codec::parse(&format!("{r}, {g}, {b}, {a}")).unwrap();
        prop_assert_eq!(parsed.channels(), [r, g, b, a]);
        prop_assert_eq!(parsed.encoding, ColorEncoding::Quad);
    }

    #[test]
    fn hex_round_trips((r, g, b, a) in rgba()) {
        let value = ColorValue::new(r, g, b, a, ColorEncoding::Hex);
        let call = codec::format(&value);
        let parsed = codec::parse(args_of(&call)).unwrap();
        prop_assert_eq!(parsed.channels(), [r, g, b, a]);
        prop_assert_eq!(parsed.encoding, ColorEncoding::Hex);
        // 6 digits when opaque, 8 otherwise, plus `("#` and `")`.
        let digits = if a == 255 { 6 } else { 8 };
        prop_assert_eq!(call.len(), "QColor(\"#\")".len() + digits);
    }

    #[test]
    fn channel_tokens_tolerate_whitespace(
        (r, g, b) in rgb(),
        pads in prop::collection::vec(padding(), 6),
    ) {
        let args = format!(
            "{}{r}{},{}{g}{},{}{b}{}",
            pads[0], pads[1], pads[2], pads[3], pads[4], pads[5]
        );
        let parsed = codec::parse(&args).unwrap();
        prop_assert_eq!(parsed.channels(), [r, g, b, 255]);
    }

    #[test]
    fn out_of_range_channels_reject(bad in 256u32..100_000, slot in 0usize..3) {
        let mut channels = ["0".to_string(), "0".to_string(), "0".to_string()];
        channels[slot] = bad.to_string();
        let result = codec::parse(&channels.join(", "));
        prop_assert_eq!(result, Err(Rejection::OutOfRange(bad.to_string())));
    }

    #[test]
    fn named_edits_never_produce_names(name in "(black|white|red|green|blue|yellow|cyan|magenta|gray|darkGray|lightGray)", (r, g, b) in rgb()) {
        let named = codec::parse(&format!("\"{name}\"")).unwrap();
        prop_assert_eq!(named.encoding, ColorEncoding::Named);
        let call = codec::format(&named.with_channels(r, g, b, 255));
        let expected = format!("QColor(\"#{:02x}{:02x}{:02x}\")", r, g, b);
        prop_assert_eq!(call, expected);
    }
}

// ============================================================================
// Edit layer
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn planned_edit_parses_back_to_clamped_input(
        red in picker_value(),
        green in picker_value(),
        blue in picker_value(),
        alpha in picker_value(),
        source in prop_oneof![
            Just("QColor(1, 2, 3)"),
            Just("QColor(1, 2, 3, 4)"),
            Just("QColor(\"#010203\")"),
            Just("QColor('red')"),
        ],
    ) {
        let codec = Codec::new();
        let target = find(source).next().unwrap();
        let edit = ChannelEdit::new(red, green, blue, alpha);
        let plan = plan_edit(&codec, &target, &edit, EncodingPolicy::PromoteAlpha);

        let reparsed = find(&plan.text).next().unwrap().value;
        let expected = [
            clamp_channel(red),
            clamp_channel(green),
            clamp_channel(blue),
            clamp_channel(alpha),
        ];
        let [red, green, blue, _] = reparsed.channels();
        prop_assert_eq!([red, green, blue], [expected[0], expected[1], expected[2]]);
        if reparsed.encoding.carries_alpha() {
            prop_assert_eq!(reparsed.alpha, expected[3]);
        } else {
            prop_assert_eq!(expected[3], 255);
        }
    }
}

// ============================================================================
// Locator
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn spans_cover_original_text(text in "(QColor\\(|[0-9]{1,3}|, |\\)|\"#[0-9a-f]{3,8}\"|'red'|é|😀|\n| ){0,40}") {
        let mut last_end = 0;
        for found in find(&text) {
            prop_assert!(found.span.start >= last_end);
            prop_assert_eq!(&text[found.span.range()], found.original_text.as_str());
            prop_assert!(found.span.start_pos <= found.span.end_pos);
            last_end = found.span.end;
        }
    }

    #[test]
    fn line_index_inverts_on_char_boundaries(text in "[a-z é😀\n]{0,60}", unit_idx in 0usize..3) {
        let unit = [ColumnUnit::Byte, ColumnUnit::Char, ColumnUnit::Utf16][unit_idx];
        let index = LineIndex::new(&text, unit);
        for (offset, _) in text.char_indices().chain(std::iter::once((text.len(), ' '))) {
            let position = index.position_at(offset);
            prop_assert_eq!(index.offset_at(position), Some(offset));
        }
    }
}
