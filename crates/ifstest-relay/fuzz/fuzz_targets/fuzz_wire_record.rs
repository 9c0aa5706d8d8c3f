// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Fuzz target for parsing a log and serializing its records
//!
//! Whatever the parser accepts must convert and serialize cleanly.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use ifstest_log::parser::parse_str;
use ifstest_relay::wire::WireRecord;

#[derive(Debug, Arbitrary)]
struct Input<'a> {
    body: &'a str,
    prefix: &'a str,
}

fuzz_target!(|input: Input<'_>| {
    let log = format!("\n{0}\nheader\n{0}\n{1}", "-".repeat(50), input.body);
    let Ok(records) = parse_str(&log) else {
        return;
    };

    for record in &records {
        let wire = WireRecord::from_raw(record, input.prefix);
        assert!(wire.file_name.starts_with(input.prefix));
        let json = serde_json::to_string(&wire).expect("wire records always serialize");
        let back: WireRecord = serde_json::from_str(&json).expect("serialized record parses");
        assert_eq!(back, wire);
    }
});
