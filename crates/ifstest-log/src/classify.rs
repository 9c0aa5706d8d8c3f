// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Line classification
//!
//! Pure predicates over a single line of IFSTest output. None of them carry
//! state; the parser decides what a class means in its current state.

use std::sync::LazyLock;

use regex::Regex;

/// Number of dashes in a separator rule
pub const SEPARATOR_WIDTH: usize = 50;

static KEY_VALUE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w+)\s+:(.*)$").expect("valid key/value regex"));

// The optional digit is leftover debug output the tool sometimes prints
// right before the first test block.
static FIRST_TEST_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d?Test\s+:(.*)$").expect("valid first test line regex"));

static CONTINUATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(.+)$").expect("valid continuation regex"));

/// A single line sorted into the classes the grammar cares about
///
/// Classes are tried in declaration order, so a `Key   :value` line is never
/// taken for a continuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line<'a> {
    /// Empty line
    Blank,
    /// A rule of exactly [`SEPARATOR_WIDTH`] dashes
    Separator,
    /// `Key   :value`
    KeyValue {
        /// Word characters before the colon
        key: &'a str,
        /// Everything after the colon, untrimmed
        value: &'a str,
    },
    /// Any other non-empty line, with surrounding whitespace removed
    Continuation(&'a str),
}

/// Strip a trailing `\n` or `\r\n`
#[must_use]
pub fn strip_terminator(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// True iff the line is empty once its terminator is removed
#[must_use]
pub fn is_blank(line: &str) -> bool {
    strip_terminator(line).is_empty()
}

/// True iff the line is a run of exactly 50 dashes
#[must_use]
pub fn is_separator(line: &str) -> bool {
    let line = strip_terminator(line);
    line.len() == SEPARATOR_WIDTH && line.bytes().all(|b| b == b'-')
}

/// Match a `Key   :value` line, returning the key and the raw value
#[must_use]
pub fn match_key_value(line: &str) -> Option<(&str, &str)> {
    let caps = KEY_VALUE_RE.captures(strip_terminator(line))?;
    Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
}

/// Match the `Test   :name` line that opens a test block
#[must_use]
pub fn match_first_test_line(line: &str) -> Option<&str> {
    let caps = FIRST_TEST_LINE_RE.captures(strip_terminator(line))?;
    Some(caps.get(1)?.as_str())
}

/// Match any non-empty line, returning its trimmed text
///
/// A whitespace-only line matches with an empty text.
#[must_use]
pub fn match_continuation(line: &str) -> Option<&str> {
    let caps = CONTINUATION_RE.captures(strip_terminator(line))?;
    Some(caps.get(1)?.as_str().trim())
}

/// Classify a line
#[must_use]
pub fn classify(line: &str) -> Line<'_> {
    if is_blank(line) {
        Line::Blank
    } else if is_separator(line) {
        Line::Separator
    } else if let Some((key, value)) = match_key_value(line) {
        Line::KeyValue { key, value }
    } else {
        // Every non-blank line matches the continuation pattern
        Line::Continuation(match_continuation(line).unwrap_or_default())
    }
}
