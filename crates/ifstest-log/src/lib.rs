// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! ifstest-log: IFSTest log processing for ifstest-relay
//!
//! This library crate turns the text log written by the IFSTest file system
//! conformance suite into structured test case records.
//!
//! # Example
//!
//! ```no_run
//! use ifstest_log::parser::{Event, parse_reader};
//!
//! let file = std::fs::File::open("ifstest.log").unwrap();
//! let stats = parse_reader(std::io::BufReader::new(file), |event| {
//!     if let Event::Record(record) = event {
//!         println!("{:?}: {:?}", record.test_name(), record.status());
//!     }
//! })
//! .unwrap();
//! println!("{} records", stats.records);
//! ```

pub mod classify;
pub mod error;
pub mod parser;
pub mod record;

pub use error::{LogError, ParseError};
pub use parser::{
    Event, ParseStats, ParserState, RecordParser, StateName, decode_line, parse_reader, parse_str,
    transition,
};
pub use record::{END_OF_GROUP_STATUS, RawRecord};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{LogError, ParseError};
    pub use crate::parser::{Event, RecordParser, parse_reader};
    pub use crate::record::RawRecord;
}
