#![allow(clippy::unwrap_used)]

use rust_decimal_macros::dec;

use super::util::*;

// ── truncate ──────────────────────────────────────────────────

#[test]
fn test_truncate_fits() {
    assert_eq!(truncate("Groceries", 18), "Groceries");
    assert_eq!(truncate("Groceries", 9), "Groceries");
    assert_eq!(truncate("", 5), "");
}

#[test]
fn test_truncate_long_name() {
    assert_eq!(truncate("Eating out with friends", 10), "Eating ou…");
}

#[test]
fn test_truncate_edges() {
    assert_eq!(truncate("Transport", 0), "");
    assert_eq!(truncate("Transport", 1), "…");
}

#[test]
fn test_truncate_multibyte() {
    assert_eq!(truncate("Épicerie fine", 5), "Épic…");
    assert_eq!(truncate("日本語テスト", 4), "日本語…");
}

// ── format_amount ─────────────────────────────────────────────

#[test]
fn test_format_amount_thousands() {
    assert_eq!(format_amount(dec!(1234.56)), "$1,234.56");
    assert_eq!(format_amount(dec!(1000000)), "$1,000,000.00");
    assert_eq!(format_amount(dec!(999.99)), "$999.99");
}

#[test]
fn test_format_amount_zero_and_small() {
    assert_eq!(format_amount(dec!(0)), "$0.00");
    assert_eq!(format_amount(dec!(5)), "$5.00");
    assert_eq!(format_amount(dec!(1.5)), "$1.50");
}

#[test]
fn test_format_amount_overspent_remaining() {
    assert_eq!(format_amount(dec!(-50)), "-$50.00");
    assert_eq!(format_amount(dec!(-12345.6)), "-$12,345.60");
}

// ── parse_amount ──────────────────────────────────────────────

#[test]
fn test_parse_amount_plain() {
    assert_eq!(parse_amount("400"), Some(dec!(400)));
    assert_eq!(parse_amount(" 12.75 "), Some(dec!(12.75)));
    assert_eq!(parse_amount("0.1"), Some(dec!(0.1)));
}

#[test]
fn test_parse_amount_currency_formatting() {
    assert_eq!(parse_amount("$1,200.00"), Some(dec!(1200)));
    assert_eq!(parse_amount("1_000"), Some(dec!(1000)));
}

#[test]
fn test_parse_amount_keeps_sign() {
    assert_eq!(parse_amount("-3"), Some(dec!(-3)));
}

#[test]
fn test_parse_amount_rejects_garbage() {
    assert_eq!(parse_amount(""), None);
    assert_eq!(parse_amount("$"), None);
    assert_eq!(parse_amount("ten"), None);
    assert_eq!(parse_amount("1.2.3"), None);
}

// ── usage_bar ─────────────────────────────────────────────────

#[test]
fn test_usage_bar_fill() {
    assert_eq!(usage_bar(dec!(0), 4), "[░░░░]");
    assert_eq!(usage_bar(dec!(0.5), 4), "[██░░]");
    assert_eq!(usage_bar(dec!(0.7), 10), "[███████░░░]");
    assert_eq!(usage_bar(dec!(1), 4), "[████]");
}

#[test]
fn test_usage_bar_clamps() {
    assert_eq!(usage_bar(dec!(1.05), 4), "[████]");
    assert_eq!(usage_bar(dec!(-1), 4), "[░░░░]");
    assert_eq!(usage_bar(dec!(0.5), 0), "[]");
}

// ── cursor helpers ────────────────────────────────────────────

#[test]
fn test_scroll_down_keeps_cursor_visible() {
    let (mut index, mut scroll) = (0, 0);
    for _ in 0..5 {
        scroll_down(&mut index, &mut scroll, 10, 3);
    }
    assert_eq!(index, 5);
    assert_eq!(scroll, 3);

    for _ in 0..20 {
        scroll_down(&mut index, &mut scroll, 10, 3);
    }
    assert_eq!(index, 9);
}

#[test]
fn test_scroll_up_stops_at_top() {
    let (mut index, mut scroll) = (2, 2);
    scroll_up(&mut index, &mut scroll);
    assert_eq!((index, scroll), (1, 1));
    scroll_up(&mut index, &mut scroll);
    scroll_up(&mut index, &mut scroll);
    assert_eq!((index, scroll), (0, 0));
}

#[test]
fn test_clamp_cursor_after_delete() {
    let (mut index, mut scroll) = (4, 3);
    clamp_cursor(&mut index, &mut scroll, 3);
    assert_eq!((index, scroll), (2, 2));

    clamp_cursor(&mut index, &mut scroll, 0);
    assert_eq!((index, scroll), (0, 0));
}
