// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! IFSTest log parsing
//!
//! The log is a loosely delimited text stream:
//!
//! ```text
//!
//! --------------------------------------------------
//! +++Microsoft (R) Installable File System Test+++
//! --------------------------------------------------
//! Test         :OpenCreateGeneral
//! Group        :OpenCreateParameters
//! Status       :C000001E (IFSTEST_TEST_NTAPI_FAILURE_CODE)
//! Description  :
//! A failure was encountered when trying to create the file
//! in the directory (\??\W:\opcreatp).
//!
//! ```
//!
//! Parsing is a line-at-a-time state machine. [`transition`] is the pure step
//! function; [`RecordParser`] owns the current state and feeds it lines.
//!
//! # Example
//!
//! ```
//! use ifstest_log::parser::{Event, RecordParser};
//!
//! let mut parser = RecordParser::new();
//! let log = format!("\n{0}\nheader\n{0}\nTest   :Foo\nStatus :00000000 (IFSTEST_SUCCESS)\n\n", "-".repeat(50));
//! let mut records = Vec::new();
//! for line in log.lines() {
//!     if let Some(Event::Record(record)) = parser.feed(line).unwrap() {
//!         records.push(record);
//!     }
//! }
//! assert!(matches!(parser.finish().unwrap(), Some(Event::Finished)));
//! assert_eq!(records[0].test_name(), Some("Foo"));
//! ```

use std::borrow::Cow;
use std::fmt;
use std::io::BufRead;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use tracing::debug;

use crate::classify::{self, Line};
use crate::error::{LogError, ParseError};
use crate::record::RawRecord;

// ============================================================================
// States
// ============================================================================

/// Name of a parser state, used in diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateName {
    /// Leading blank lines before the header rule
    WaitForHeader,
    /// Free-form header text between the two rules
    Header,
    /// Between test blocks
    WaitForTestCase,
    /// Inside a test block
    ProcessTestCase,
    /// End of input reached cleanly
    Final,
}

impl fmt::Display for StateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::WaitForHeader => "WaitForHeader",
            Self::Header => "Header",
            Self::WaitForTestCase => "WaitForTestCase",
            Self::ProcessTestCase => "ProcessTestCase",
            Self::Final => "Final",
        };
        f.write_str(name)
    }
}

/// A test block being assembled
///
/// The most recent `key:value` pair stays pending until the next key or the
/// closing blank line, because continuation lines may still extend it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRecord {
    fields: IndexMap<String, String>,
    key: String,
    value: String,
    start_time: DateTime<Utc>,
}

impl PendingRecord {
    fn open(test_name: &str, now: DateTime<Utc>) -> Self {
        Self {
            fields: IndexMap::new(),
            key: "Test".to_string(),
            value: test_name.to_string(),
            start_time: now,
        }
    }

    fn commit(&mut self) {
        let key = std::mem::take(&mut self.key);
        let value = std::mem::take(&mut self.value);
        self.fields.insert(key, value);
    }

    fn start_key(&mut self, key: &str, value: &str) {
        self.commit();
        self.key = key.to_string();
        self.value = value.to_string();
    }

    fn continue_value(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if !self.value.is_empty() {
            self.value.push(' ');
        }
        self.value.push_str(text);
    }

    fn close(mut self, now: DateTime<Utc>) -> Result<RawRecord, ParseError> {
        self.commit();
        if !self.fields.contains_key("Status") {
            return Err(ParseError::MissingStatus {
                test: self.fields.get("Test").cloned().unwrap_or_default(),
            });
        }
        Ok(RawRecord {
            fields: self.fields,
            start_time: self.start_time,
            end_time: now,
        })
    }
}

/// Current state of the parser, carrying the data it buffers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParserState {
    /// See [`StateName::WaitForHeader`]
    WaitForHeader,
    /// See [`StateName::Header`]
    Header,
    /// See [`StateName::WaitForTestCase`]
    WaitForTestCase,
    /// See [`StateName::ProcessTestCase`]
    ProcessTestCase(PendingRecord),
    /// See [`StateName::Final`]
    Final,
}

impl ParserState {
    /// Name of this state
    #[must_use]
    pub fn name(&self) -> StateName {
        match self {
            Self::WaitForHeader => StateName::WaitForHeader,
            Self::Header => StateName::Header,
            Self::WaitForTestCase => StateName::WaitForTestCase,
            Self::ProcessTestCase(_) => StateName::ProcessTestCase,
            Self::Final => StateName::Final,
        }
    }
}

/// One unit of parser input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input<'a> {
    /// A line, with or without its terminator
    Line(&'a str),
    /// End of input
    Eof,
}

/// Something the parser produced while changing state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A completed test record
    Record(RawRecord),
    /// A completed end-of-group block, which is not a test result
    EndOfGroup,
    /// The parser reached its final state
    Finished,
}

// ============================================================================
// Transition function
// ============================================================================

/// Advance the state machine by one input
///
/// `now` timestamps a block when it opens or closes.
///
/// # Errors
///
/// Returns [`ParseError::UnexpectedLine`] or [`ParseError::UnexpectedEof`] when
/// the current state has no transition for the input,
/// [`ParseError::MissingStatus`] when a block closes without a `Status`, and
/// [`ParseError::Stopped`] when called in the final state.
pub fn transition(
    state: ParserState,
    input: Input<'_>,
    now: DateTime<Utc>,
) -> Result<(ParserState, Option<Event>), ParseError> {
    let line = match input {
        Input::Line(line) => line,
        Input::Eof => {
            return match state {
                ParserState::WaitForTestCase => Ok((ParserState::Final, Some(Event::Finished))),
                ParserState::Final => Err(ParseError::Stopped),
                other => Err(ParseError::UnexpectedEof { state: other.name() }),
            };
        }
    };

    let unexpected = |state: StateName| ParseError::UnexpectedLine {
        state,
        line: classify::strip_terminator(line).to_string(),
    };

    match state {
        ParserState::WaitForHeader => match classify::classify(line) {
            Line::Blank => Ok((ParserState::WaitForHeader, None)),
            Line::Separator => Ok((ParserState::Header, None)),
            _ => Err(unexpected(StateName::WaitForHeader)),
        },
        ParserState::Header => {
            if classify::is_separator(line) {
                Ok((ParserState::WaitForTestCase, None))
            } else {
                Ok((ParserState::Header, None))
            }
        }
        ParserState::WaitForTestCase => {
            if classify::is_blank(line) {
                Ok((ParserState::WaitForTestCase, None))
            } else if let Some(name) = classify::match_first_test_line(line) {
                let pending = PendingRecord::open(name, now);
                Ok((ParserState::ProcessTestCase(pending), None))
            } else {
                Err(unexpected(StateName::WaitForTestCase))
            }
        }
        ParserState::ProcessTestCase(mut pending) => match classify::classify(line) {
            Line::Blank => {
                let record = pending.close(now)?;
                let event = if record.is_end_of_group() {
                    Event::EndOfGroup
                } else {
                    Event::Record(record)
                };
                Ok((ParserState::WaitForTestCase, Some(event)))
            }
            Line::Separator => Err(unexpected(StateName::ProcessTestCase)),
            Line::KeyValue { key, value } => {
                pending.start_key(key, value);
                Ok((ParserState::ProcessTestCase(pending), None))
            }
            Line::Continuation(text) => {
                pending.continue_value(text);
                Ok((ParserState::ProcessTestCase(pending), None))
            }
        },
        ParserState::Final => Err(ParseError::Stopped),
    }
}

// ============================================================================
// Streaming parser
// ============================================================================

/// Counts of what a parse produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    /// Lines consumed
    pub lines: usize,
    /// Test records emitted
    pub records: usize,
    /// End-of-group blocks discarded
    pub end_of_group: usize,
}

/// A streaming parser for IFSTest output
///
/// Feed it lines as they arrive; each call yields at most one [`Event`].
/// After any error the parser stays stopped.
#[derive(Debug)]
pub struct RecordParser {
    state: Option<ParserState>,
    stats: ParseStats,
}

impl RecordParser {
    /// Create a parser waiting for the header
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Some(ParserState::WaitForHeader),
            stats: ParseStats::default(),
        }
    }

    /// Name of the current state, `None` after a fatal error
    #[must_use]
    pub fn state_name(&self) -> Option<StateName> {
        self.state.as_ref().map(ParserState::name)
    }

    /// Whether the parser reached its final state
    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(self.state, Some(ParserState::Final))
    }

    /// Counts so far
    #[must_use]
    pub fn stats(&self) -> ParseStats {
        self.stats
    }

    /// Process a single line
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] if the line is not valid in the current state.
    pub fn feed(&mut self, line: &str) -> Result<Option<Event>, ParseError> {
        self.stats.lines += 1;
        self.step(Input::Line(line))
    }

    /// Signal end of input
    ///
    /// Returns `Some(Event::Finished)` the first time the final state is
    /// reached this way.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::UnexpectedEof`] unless the parser is between test
    /// blocks.
    pub fn finish(&mut self) -> Result<Option<Event>, ParseError> {
        self.step(Input::Eof)
    }

    fn step(&mut self, input: Input<'_>) -> Result<Option<Event>, ParseError> {
        let state = self.state.take().ok_or(ParseError::Stopped)?;
        let before = state.name();
        let (next, event) = transition(state, input, Utc::now())?;
        if next.name() != before {
            debug!(from = %before, to = %next.name(), "Parser state change");
        }
        self.state = Some(next);

        match &event {
            Some(Event::Record(_)) => self.stats.records += 1,
            Some(Event::EndOfGroup) => self.stats.end_of_group += 1,
            Some(Event::Finished) | None => {}
        }
        Ok(event)
    }
}

impl Default for RecordParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a whole log from a reader, handing each event to `on_event`
///
/// Reading stops early if the parser reaches its final state before the end
/// of the reader. `Event::Finished` is delivered exactly once, last. Bytes
/// that are not valid UTF-8 are replaced with U+FFFD.
///
/// # Errors
///
/// Returns `LogError::Io` if reading fails and `LogError::Parse` on malformed
/// input. Events delivered before the error stand.
pub fn parse_reader<R: BufRead>(
    mut reader: R,
    mut on_event: impl FnMut(Event),
) -> Result<ParseStats, LogError> {
    let mut parser = RecordParser::new();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        if let Some(event) = parser.feed(&decode_line(&buf))? {
            on_event(event);
        }
        if parser.is_finished() {
            return Ok(parser.stats());
        }
    }

    if let Some(event) = parser.finish()? {
        on_event(event);
    }
    Ok(parser.stats())
}

/// Decode one raw input line
///
/// IFSTest writes in the console code page, so a line may carry bytes that
/// are not UTF-8. They are replaced with U+FFFD and the line is still parsed.
#[must_use]
pub fn decode_line(raw: &[u8]) -> Cow<'_, str> {
    let line = String::from_utf8_lossy(raw);
    if matches!(line, Cow::Owned(_)) {
        debug!("Replaced invalid UTF-8 in input line");
    }
    line
}

/// Parse a complete log held in memory, returning its test records
///
/// # Errors
///
/// Returns `ParseError` if the log is malformed or truncated.
pub fn parse_str(log: &str) -> Result<Vec<RawRecord>, ParseError> {
    let mut parser = RecordParser::new();
    let mut records = Vec::new();

    for line in log.lines() {
        if let Some(Event::Record(record)) = parser.feed(line)? {
            records.push(record);
        }
        if parser.is_finished() {
            return Ok(records);
        }
    }

    parser.finish()?;
    Ok(records)
}
