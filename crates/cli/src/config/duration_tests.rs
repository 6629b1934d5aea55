// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use super::*;
use std::time::Duration;
use yare::parameterized;

#[parameterized(
    seconds = { "30s", Duration::from_secs(30) },
    fractional_seconds = { "1.5s", Duration::from_millis(1500) },
    milliseconds = { "500ms", Duration::from_millis(500) },
    minutes = { "5m", Duration::from_secs(300) },
    hours = { "1h", Duration::from_secs(3600) },
    padded = { "  30s  ", Duration::from_secs(30) },
    inner_space = { "500 ms", Duration::from_millis(500) },
)]
fn parses(input: &str, expected: Duration) {
    assert_eq!(parse_duration(input).unwrap(), expected);
}

#[test]
fn rejects_empty_string() {
    let err = parse_duration("").unwrap_err();
    assert!(err.contains("empty"));
}

#[test]
fn rejects_missing_unit() {
    let err = parse_duration("30").unwrap_err();
    assert!(err.contains("invalid duration format"));
}

#[test]
fn rejects_negative_seconds() {
    assert!(parse_duration("-1s").is_err());
}

#[parameterized(
    millis = { Duration::from_millis(250), "250ms" },
    zero = { Duration::ZERO, "0ms" },
    seconds = { Duration::from_secs(45), "45s" },
    minutes = { Duration::from_secs(600), "10m" },
    hours = { Duration::from_secs(7200), "2h" },
)]
fn formats(input: Duration, expected: &str) {
    assert_eq!(format_duration(input), expected);
    assert_eq!(parse_duration(expected).unwrap(), input);
}
