// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Property-based tests for ifstest-log
//!
//! Generated logs follow the IFSTest grammar; the parser must agree with the
//! generator on what they contain.

use ifstest_log::parser::{Event, parse_reader, parse_str};
use ifstest_log::{END_OF_GROUP_STATUS, ParseError, StateName};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

/// A field key that is not `Test` or `Status`
fn extra_key() -> impl Strategy<Value = String> {
    "[A-Z][A-Za-z]{2,12}".prop_filter("reserved key", |k| k != "Test" && k != "Status")
}

/// Continuation text: never blank, never starting with a word followed by a colon
fn continuation_text() -> impl Strategy<Value = String> {
    "[a-z]{1,8}( [a-z.]{1,8}){0,4}"
}

/// A generated test block and whether it is an end-of-group marker
fn block() -> impl Strategy<Value = (String, bool)> {
    (
        "[A-Za-z]{1,20}",
        any::<bool>(),
        prop::collection::vec((extra_key(), "[ -~&&[^:]]{0,20}"), 0..4),
    )
        .prop_map(|(name, end_of_group, extras)| {
            let status = if end_of_group {
                END_OF_GROUP_STATUS
            } else {
                "00000000 (IFSTEST_SUCCESS)"
            };
            let mut text = format!("Test         :{name}\nStatus       :{status}\n");
            for (key, value) in extras {
                text.push_str(&format!("{key}    :{value}\n"));
            }
            text.push('\n');
            (text, end_of_group)
        })
}

fn wrap(body: &str) -> String {
    format!("\n\n{0}\nheader line\n{0}\n{body}", "-".repeat(50))
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_record_count_excludes_end_of_group(blocks in prop::collection::vec(block(), 0..20)) {
        let body: String = blocks.iter().map(|(text, _)| text.as_str()).collect();
        let expected = blocks.iter().filter(|(_, eog)| !eog).count();

        let mut finished = 0;
        let stats = parse_reader(wrap(&body).as_bytes(), |e| {
            if e == Event::Finished {
                finished += 1;
            }
        })
        .expect("generated log should parse");

        prop_assert_eq!(stats.records, expected);
        prop_assert_eq!(stats.end_of_group, blocks.len() - expected);
        prop_assert_eq!(finished, 1);
    }

    #[test]
    fn prop_continuations_join_trimmed_with_spaces(
        parts in prop::collection::vec(continuation_text(), 1..6),
        indent in "[ \t]{0,4}",
    ) {
        let mut body = String::from("Test         :Foo\nStatus       :00000000 (IFSTEST_SUCCESS)\nDescription  :\n");
        for part in &parts {
            body.push_str(&format!("{indent}{part}  \n"));
        }
        body.push('\n');

        let records = parse_str(&wrap(&body)).expect("should parse");
        let expected = parts.join(" ");
        prop_assert_eq!(records[0].get("Description"), Some(expected.as_str()));
    }

    #[test]
    fn prop_reparse_same_fields(blocks in prop::collection::vec(block(), 1..10)) {
        let body: String = blocks.iter().map(|(text, _)| text.as_str()).collect();
        let log = wrap(&body);
        let first = parse_str(&log).expect("first");
        let second = parse_str(&log).expect("second");
        let first: Vec<_> = first.into_iter().map(|r| r.fields).collect();
        let second: Vec<_> = second.into_iter().map(|r| r.fields).collect();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_non_test_line_between_blocks_fails(key in extra_key(), value in "[a-z]{0,10}") {
        let log = wrap(&format!("{key}    :{value}\n"));
        let err = parse_str(&log).unwrap_err();
        let is_wait_for_test_case = matches!(
            err,
            ParseError::UnexpectedLine { state: StateName::WaitForTestCase, .. }
        );
        prop_assert!(is_wait_for_test_case);
    }

    #[test]
    fn prop_arbitrary_input_never_panics(input in ".{0,400}") {
        let _ = parse_str(&input);
    }
}
