//! ifstest-relay library
//!
//! Parses IFSTest output and forwards the test case results to the AppVeyor
//! build worker API in batches. Exported for the binary and integration tests.

pub mod config;
pub mod driver;
pub mod outcome;
pub mod queue;
pub mod sender;
pub mod wire;
