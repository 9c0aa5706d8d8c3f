// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Mapping from IFSTest status codes to result API outcomes

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Outcome vocabulary of the results API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TestOutcome {
    /// No outcome recorded
    None,
    /// Still running
    Running,
    /// Test passed
    Passed,
    /// Test failed
    Failed,
    /// Result should not be counted
    Ignored,
    /// Test was skipped
    Skipped,
    /// Result could not be determined
    Inconclusive,
    /// Test was not found
    NotFound,
    /// Test run was cancelled
    Cancelled,
    /// Test cannot run in this environment
    NotRunnable,
}

static STATUS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9A-F]{8}) \(([A-Z0-9_]+)\)").expect("valid status regex"));

// The high bits of the code would give a rough severity, but a few codes do
// not follow it, so every known status is listed explicitly.
const STATUS_TABLE: &[(u32, &str, TestOutcome)] = &[
    (0x0000_0000, "IFSTEST_SUCCESS", TestOutcome::Passed),
    (0x0000_0001, "IFSTEST_SUCCESS_NOT_SUPPORTED", TestOutcome::Skipped),
    // Test body passed but cleanup did not; worth a look
    (0x4000_000C, "IFSTEST_INFO_PROBLEM_IN_CLEANUP", TestOutcome::Failed),
    (0xC000_0015, "IFSTEST_TEST_ATTRIBUTE_ERROR", TestOutcome::Failed),
    (0xC000_001F, "IFSTEST_TEST_IOSTATUSBLOCK_FAILURE", TestOutcome::Failed),
    (0xC000_0014, "IFSTEST_TEST_ALLOCATION_SIZE_ERROR", TestOutcome::Failed),
    (0xC000_001E, "IFSTEST_TEST_NTAPI_FAILURE_CODE", TestOutcome::Failed),
    (0xC000_0058, "IFSTEST_TEST_WIN32_FAILURE", TestOutcome::Failed),
    (0xC000_002E, "IFSTEST_TEST_UNICODE_NAME_PRESERVED", TestOutcome::Failed),
    (0xC000_005E, "IFSTEST_TEST_QUOTA_TEST_NOT_RUN", TestOutcome::NotRunnable),
    (0x8000_0010, "IFSTEST_TEST_NOT_SUPPORTED", TestOutcome::NotRunnable),
    // Usually means IFSTest was not started from a clean directory
    (0xC000_0092, "IFSTEST_SETUP_NTAPI_CREATE_DIR_FAILURE", TestOutcome::None),
];

/// Parse a status string into its numeric code and symbolic name
///
/// Expects `XXXXXXXX (NAME)`, eight upper-case hex digits then the name in
/// parentheses. Trailing text is ignored.
#[must_use]
pub fn parse_status(status: &str) -> Option<(u32, &str)> {
    let caps = STATUS_RE.captures(status)?;
    let code = u32::from_str_radix(caps.get(1)?.as_str(), 16).ok()?;
    Some((code, caps.get(2)?.as_str()))
}

/// Look up a known (code, name) pair
#[must_use]
pub fn lookup(code: u32, name: &str) -> Option<TestOutcome> {
    STATUS_TABLE
        .iter()
        .find(|(c, n, _)| *c == code && *n == name)
        .map(|(_, _, outcome)| *outcome)
}

/// Map a record's `Status` field to an outcome
///
/// Unparseable or missing statuses are `Ignored`; well-formed but unknown
/// statuses are `Failed` and logged.
#[must_use]
pub fn map_status(status: Option<&str>) -> TestOutcome {
    let Some((code, name)) = status.and_then(parse_status) else {
        return TestOutcome::Ignored;
    };

    lookup(code, name).unwrap_or_else(|| {
        warn!(status = status.unwrap_or_default(), "Unknown status");
        TestOutcome::Failed
    })
}
