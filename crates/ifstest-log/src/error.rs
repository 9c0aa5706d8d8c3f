// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Error types for ifstest-log

use thiserror::Error;

use crate::parser::StateName;

/// Errors raised by the record parser
///
/// Every variant is fatal: the parse stops and no partially built record is
/// salvaged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A line that the current state has no transition for
    #[error("State {state}: Unexpected line: \"{line}\"")]
    UnexpectedLine {
        /// State the parser was in
        state: StateName,
        /// The offending line, without its line terminator
        line: String,
    },

    /// Input ended outside of a state that accepts end of file
    #[error("State {state}: Unexpected end of file")]
    UnexpectedEof {
        /// State the parser was in
        state: StateName,
    },

    /// A test block ended without a `Status` field
    #[error("Test case {test:?} ended without a Status field")]
    MissingStatus {
        /// Value of the block's `Test` field
        test: String,
    },

    /// Input was fed after the parser finished or failed
    #[error("Parser has already stopped")]
    Stopped,
}

/// Errors that can occur while reading and parsing an IFSTest log
#[derive(Debug, Error)]
pub enum LogError {
    /// Malformed or truncated log
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Error reading the log
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
