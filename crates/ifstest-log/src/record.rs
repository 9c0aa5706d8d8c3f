//! Parsed test case records

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Status value of the structural block the tool prints at the end of a group
pub const END_OF_GROUP_STATUS: &str = "40000006 (IFSTEST_INFO_END_OF_GROUP)";

/// One parsed test case block
///
/// Fields keep the order they appeared in the log. The timestamps are taken
/// by the parser when the block opens and closes; they are not part of the
/// input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Field name to value, in input order
    pub fields: IndexMap<String, String>,
    /// When the block's first line was read
    pub start_time: DateTime<Utc>,
    /// When the block's terminating blank line was read
    pub end_time: DateTime<Utc>,
}

impl RawRecord {
    /// Look up a field value
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// The `Test` field
    #[must_use]
    pub fn test_name(&self) -> Option<&str> {
        self.get("Test")
    }

    /// The `Status` field
    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.get("Status")
    }

    /// Whether this block only marks the end of a test group
    #[must_use]
    pub fn is_end_of_group(&self) -> bool {
        self.status() == Some(END_OF_GROUP_STATUS)
    }

    /// Time between the block opening and closing, in milliseconds
    #[must_use]
    pub fn duration_ms(&self) -> u64 {
        u64::try_from((self.end_time - self.start_time).num_milliseconds()).unwrap_or(0)
    }
}
