// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Wire format of the results API
//!
//! One [`WireRecord`] per parsed test case; batches are posted as a JSON array.

use ifstest_log::RawRecord;
use serde::{Deserialize, Serialize};

use crate::outcome::{TestOutcome, map_status};

/// Value of `testFramework` on every record
pub const TEST_FRAMEWORK: &str = "IFSTest";

/// Test name used when a record has no `Test` field
pub const NO_NAME: &str = "<no-name>";

/// Group name used when a record has no `Group` field
pub const NO_GROUP: &str = "<no-group>";

/// A test result as the results API expects it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireRecord {
    /// Value of the `Test` field
    pub test_name: String,
    /// Always [`TEST_FRAMEWORK`]
    pub test_framework: String,
    /// Prefix followed by the `Group` field
    pub file_name: String,
    /// Outcome derived from the `Status` field
    pub outcome: TestOutcome,
    /// Time the parser spent inside the block
    pub duration_milliseconds: u64,
    /// Value of the `Description` field
    #[serde(rename = "ErrorMessage", skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Human-readable dump of all fields
    #[serde(rename = "StdOut")]
    pub std_out: String,
    /// NT status mismatch, when the record reports both sides
    #[serde(rename = "StdErr", skip_serializing_if = "Option::is_none")]
    pub std_err: Option<String>,
}

impl WireRecord {
    /// Convert a parsed record, prepending `prefix` to the file name
    #[must_use]
    pub fn from_raw(record: &RawRecord, prefix: &str) -> Self {
        let std_err = match (record.get("ExpectedNtStatus"), record.get("LastNtStatus")) {
            (Some(expected), Some(last)) => Some(format!(
                "ExpectedNtStatus was {expected}, but got LastNtStatus {last}"
            )),
            _ => None,
        };

        Self {
            test_name: record.test_name().unwrap_or(NO_NAME).to_string(),
            test_framework: TEST_FRAMEWORK.to_string(),
            file_name: format!("{prefix}{}", record.get("Group").unwrap_or(NO_GROUP)),
            outcome: map_status(record.status()),
            duration_milliseconds: record.duration_ms(),
            error_message: record.get("Description").map(str::to_string),
            std_out: dump_fields(record),
            std_err,
        }
    }
}

/// Render every field as an aligned `key: value` line, in input order
#[must_use]
pub fn dump_fields(record: &RawRecord) -> String {
    record
        .fields
        .iter()
        .map(|(key, value)| format!("{key:<16}: {value}"))
        .collect::<Vec<_>>()
        .join("\n")
}
