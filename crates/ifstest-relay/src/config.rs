//! Configuration for the ifstest-relay binary
//!
//! Command line arguments with environment fallbacks: where to read the log,
//! where to send results, and logging options.

use std::path::PathBuf;

use clap::Parser;

use crate::sender::{BATCH_PATH, DEFAULT_BATCH_SIZE};

/// IFSTest to AppVeyor - parse IFSTest output and submit test case results
///
/// Without an API URL the converted results are printed to stdout instead.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "ifstest-relay")]
#[command(version, about, long_about = None)]
pub struct Config {
    /// File to read the IFSTest output from
    ///
    /// Defaults to stdin. `-` also means stdin.
    pub input: Option<PathBuf>,

    /// Prefix added to the file name of every submitted test case
    ///
    /// Useful to distinguish multiple invocations of the same tests.
    #[arg(long, default_value = "")]
    pub prefix: String,

    /// Base URL of the AppVeyor build worker API
    ///
    /// Batches are posted to `<URL>/api/tests/batch`.
    #[arg(long, env = "APPVEYOR_API_URL")]
    pub api_url: Option<String>,

    /// Maximum number of test cases per submitted batch
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Echo every input line to stdout while parsing
    #[arg(long, default_value = "false")]
    pub passthrough: bool,

    /// Enable verbose logging (debug level)
    ///
    /// Logs are written to stderr so they never mix with printed results.
    #[arg(short, long, default_value = "false")]
    pub verbose: bool,

    /// Quiet mode - suppress info-level logs
    ///
    /// Only errors and warnings will be logged.
    #[arg(short, long, default_value = "false")]
    pub quiet: bool,
}

impl Config {
    /// Input file, or `None` for stdin
    #[must_use]
    pub fn input_path(&self) -> Option<&PathBuf> {
        self.input.as_ref().filter(|p| p.as_os_str() != "-")
    }

    /// Records per batch, using the default if not specified
    #[must_use]
    pub fn batch_size(&self) -> usize {
        self.batch_size.unwrap_or(DEFAULT_BATCH_SIZE)
    }

    /// API base URL without a trailing slash, if configured
    #[must_use]
    pub fn endpoint(&self) -> Option<&str> {
        self.api_url
            .as_deref()
            .map(|url| url.trim_end_matches('/'))
            .filter(|url| !url.is_empty())
    }

    /// URL batches are posted to, if an endpoint is configured
    #[must_use]
    pub fn batch_url(&self) -> Option<String> {
        self.endpoint()
            .map(|endpoint| format!("{endpoint}/{BATCH_PATH}"))
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The input file is specified but doesn't exist
    /// - The batch size is zero
    /// - The API URL is not an http(s) URL
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Pipes and character devices are valid inputs; only absence is an error
        if let Some(input) = self.input_path()
            && !input.exists()
        {
            return Err(ConfigError::InputNotFound(input.clone()));
        }

        if self.batch_size == Some(0) {
            return Err(ConfigError::InvalidBatchSize);
        }

        if let Some(endpoint) = self.endpoint() {
            let url = reqwest::Url::parse(endpoint)
                .map_err(|e| ConfigError::InvalidApiUrl(endpoint.to_string(), e.to_string()))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(ConfigError::InvalidApiUrl(
                    endpoint.to_string(),
                    format!("unsupported scheme {}", url.scheme()),
                ));
            }
        }

        Ok(())
    }

    /// Get the log level based on verbose/quiet flags
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.quiet {
            tracing::Level::WARN
        } else {
            tracing::Level::INFO
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Input file not found
    #[error("Input file not found: {0}")]
    InputNotFound(PathBuf),

    /// Batch size of zero
    #[error("Batch size must be at least 1")]
    InvalidBatchSize,

    /// API URL could not be parsed or is not http(s)
    #[error("Invalid API URL {0}: {1}")]
    InvalidApiUrl(String, String),
}
