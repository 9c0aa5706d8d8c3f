// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Fuzz target for line classification

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use ifstest_log::classify::{self, Line};

#[derive(Debug, Arbitrary)]
struct Input<'a> {
    line: &'a str,
    crlf: bool,
}

fuzz_target!(|input: Input<'_>| {
    let line = if input.crlf {
        format!("{}\r\n", input.line)
    } else {
        input.line.to_string()
    };

    match classify::classify(&line) {
        Line::Blank => assert!(classify::is_blank(&line)),
        Line::Separator => assert!(classify::is_separator(&line)),
        Line::KeyValue { key, .. } => assert!(!key.is_empty()),
        Line::Continuation(_) => assert!(!classify::is_blank(&line)),
    }
});
