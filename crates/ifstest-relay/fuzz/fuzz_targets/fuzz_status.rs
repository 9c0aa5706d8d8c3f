// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Fuzz target for status string mapping

#![no_main]

use libfuzzer_sys::fuzz_target;

use ifstest_relay::outcome::{TestOutcome, lookup, map_status, parse_status};

fuzz_target!(|status: &str| {
    let outcome = map_status(Some(status));

    match parse_status(status) {
        None => assert_eq!(outcome, TestOutcome::Ignored),
        Some((code, name)) => {
            assert_eq!(outcome, lookup(code, name).unwrap_or(TestOutcome::Failed));
        }
    }
});
