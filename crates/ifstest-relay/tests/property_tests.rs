// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Property-based tests for ifstest-relay
//!
//! These tests use proptest to check the status mapping and the wire
//! conversion against arbitrary field values.

use chrono::{TimeDelta, Utc};
use ifstest_log::RawRecord;
use indexmap::IndexMap;
use proptest::prelude::*;

use ifstest_relay::outcome::{TestOutcome, map_status, parse_status};
use ifstest_relay::wire::{NO_GROUP, TEST_FRAMEWORK, WireRecord};

// ============================================================================
// Strategies
// ============================================================================

/// Field values as they appear after a `key :` prefix
fn field_value() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        "[A-Za-z0-9_.\\\\:() ]{1,40}",
        ".{0,60}",
    ]
}

/// Status strings, well-formed or not
fn status_value() -> impl Strategy<Value = String> {
    prop_oneof![
        ("[0-9A-F]{8}", "[A-Z0-9_]{1,30}").prop_map(|(c, n)| format!("{c} ({n})")),
        "[0-9a-fA-F]{1,10} \\([A-Za-z_]{0,10}\\)",
        ".{0,40}",
    ]
}

fn raw_record(fields: Vec<(&str, String)>, millis: i64) -> RawRecord {
    let start_time = Utc::now();
    RawRecord {
        fields: fields
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect::<IndexMap<_, _>>(),
        start_time,
        end_time: start_time + TimeDelta::milliseconds(millis),
    }
}

// ============================================================================
// Status mapping
// ============================================================================

proptest! {
    #[test]
    fn prop_unparseable_status_is_ignored(status in status_value()) {
        if parse_status(&status).is_none() {
            prop_assert_eq!(map_status(Some(&status)), TestOutcome::Ignored);
        }
    }

    #[test]
    fn prop_parseable_status_is_never_ignored(
        code in "[0-9A-F]{8}",
        name in "[A-Z0-9_]{1,30}",
        trailer in "( .{0,10})?",
    ) {
        let status = format!("{code} ({name}){trailer}");
        prop_assert!(parse_status(&status).is_some());
        prop_assert_ne!(map_status(Some(&status)), TestOutcome::Ignored);
    }

    #[test]
    fn prop_parse_status_round_trips_code(code in any::<u32>(), name in "[A-Z][A-Z0-9_]{0,20}") {
        let status = format!("{code:08X} ({name})");
        prop_assert_eq!(parse_status(&status), Some((code, name.as_str())));
    }
}

// ============================================================================
// Wire conversion
// ============================================================================

proptest! {
    #[test]
    fn prop_wire_record_carries_fields(
        name in field_value(),
        group in proptest::option::of(field_value()),
        prefix in "[a-z0-9/_-]{0,12}",
        status in status_value(),
        millis in -5_000i64..50_000,
    ) {
        let mut fields = vec![("Test", name.clone())];
        if let Some(group) = &group {
            fields.push(("Group", group.clone()));
        }
        fields.push(("Status", status.clone()));

        let wire = WireRecord::from_raw(&raw_record(fields, millis), &prefix);

        prop_assert_eq!(&wire.test_name, &name);
        prop_assert_eq!(wire.test_framework.as_str(), TEST_FRAMEWORK);
        let expected_file = format!("{prefix}{}", group.as_deref().unwrap_or(NO_GROUP));
        prop_assert_eq!(&wire.file_name, &expected_file);
        prop_assert_eq!(wire.outcome, map_status(Some(&status)));
        prop_assert_eq!(wire.duration_milliseconds, u64::try_from(millis.max(0)).unwrap());
        prop_assert!(wire.error_message.is_none());
        prop_assert!(wire.std_err.is_none());
        prop_assert_eq!(wire.std_out.lines().count(), if group.is_some() { 3 } else { 2 });
    }

    #[test]
    fn prop_std_err_needs_both_nt_statuses(
        expected in proptest::option::of(field_value()),
        last in proptest::option::of(field_value()),
    ) {
        let mut fields = vec![("Test", "Foo".to_string())];
        if let Some(v) = &last {
            fields.push(("LastNtStatus", v.clone()));
        }
        if let Some(v) = &expected {
            fields.push(("ExpectedNtStatus", v.clone()));
        }
        fields.push(("Status", "C000001E (IFSTEST_TEST_NTAPI_FAILURE_CODE)".to_string()));

        let wire = WireRecord::from_raw(&raw_record(fields, 0), "");
        prop_assert_eq!(wire.std_err.is_some(), expected.is_some() && last.is_some());
    }

    #[test]
    fn prop_wire_json_has_expected_keys(name in field_value(), description in proptest::option::of(field_value())) {
        let mut fields = vec![("Test", name)];
        if let Some(d) = &description {
            fields.push(("Description", d.clone()));
        }
        let wire = WireRecord::from_raw(&raw_record(fields, 1), "");
        let json = serde_json::to_value(&wire).unwrap();

        for key in ["testName", "testFramework", "fileName", "outcome", "durationMilliseconds", "StdOut"] {
            prop_assert!(json.get(key).is_some(), "missing {}", key);
        }
        prop_assert_eq!(json.get("ErrorMessage").is_some(), description.is_some());
        prop_assert!(json.get("StdErr").is_none());
    }
}
