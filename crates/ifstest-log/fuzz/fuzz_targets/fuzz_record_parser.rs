// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Fuzz target for the streaming record parser
//!
//! Feeds arbitrary text line-by-line. The parser may reject it but must never
//! panic, and must stay stopped once it has failed.

#![no_main]

use libfuzzer_sys::fuzz_target;

use ifstest_log::RecordParser;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let mut parser = RecordParser::new();

        for line in input.lines() {
            if parser.feed(line).is_err() {
                assert!(parser.feed(line).is_err());
                return;
            }
        }

        let _ = parser.finish();
    }
});
