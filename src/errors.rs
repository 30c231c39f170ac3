//! Unified error handling for mxtally.
//!
//! A `thiserror`-based model with:
//!   * Typed variants for the failure domains the pipeline actually has
//!   * A categorization layer (`ErrorCategory`) for diagnostics & reporting
//!   * Helper constructors
//!   * `From` conversions for common lower-level errors
//!
//! Fatal errors (input source, configuration, strict-mode address failures)
//! propagate to the binary edge. Per-domain resolution problems never become
//! errors at all: the resolver absorbs them into skip records (see
//! `resolver::SkippedDomain`), and the variants here only carry them between
//! the lookup seam and that absorption point.

use std::io;

use thiserror::Error;

/// High-level classification for diagnostics / structured reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Network,
    Io,
    Internal,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorCategory::Input => "input",
            ErrorCategory::Network => "network",
            ErrorCategory::Io => "io",
            ErrorCategory::Internal => "internal",
        };
        f.write_str(s)
    }
}

/// Primary application error type.
#[derive(Error, Debug)]
pub enum MxTallyError {
    // ------------------------ Input / Validation ----------------------------
    #[error("Address '{address}' has no domain separator")]
    InvalidAddress { address: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    // ----------------------------- Network ----------------------------------
    #[error("MX lookup failed for {domain}: {reason}")]
    Resolution { domain: String, reason: String },

    #[error("MX lookup timed out after {seconds}s: {domain}")]
    LookupTimeout { domain: String, seconds: u64 },

    // ----------------------------- I/O / FS ---------------------------------
    #[error("Input source unavailable during {operation} on {path}: {source}")]
    SourceUnavailable {
        path: String,
        operation: String,
        #[source]
        source: io::Error,
    },

    // ---------------------------- Internal ----------------------------------
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl MxTallyError {
    /// Categorize the error for diagnostics.
    pub fn category(&self) -> ErrorCategory {
        use MxTallyError::*;
        match self {
            InvalidAddress { .. } | Configuration { .. } => ErrorCategory::Input,
            Resolution { .. } | LookupTimeout { .. } => ErrorCategory::Network,
            SourceUnavailable { .. } => ErrorCategory::Io,
            Internal { .. } => ErrorCategory::Internal,
        }
    }

    // ---------------------------- Constructors -----------------------------

    pub fn invalid_address(address: impl Into<String>) -> Self {
        Self::InvalidAddress {
            address: address.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn resolution(domain: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Resolution {
            domain: domain.into(),
            reason: reason.into(),
        }
    }

    pub fn lookup_timeout(domain: impl Into<String>, seconds: u64) -> Self {
        Self::LookupTimeout {
            domain: domain.into(),
            seconds,
        }
    }

    pub fn source_unavailable(
        path: impl Into<String>,
        operation: impl Into<String>,
        source: io::Error,
    ) -> Self {
        Self::SourceUnavailable {
            path: path.into(),
            operation: operation.into(),
            source,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }
}

/// Public result alias.
pub type Result<T> = std::result::Result<T, MxTallyError>;

/// Map bare IO errors into `SourceUnavailable` (generic context).
impl From<io::Error> for MxTallyError {
    fn from(e: io::Error) -> Self {
        MxTallyError::SourceUnavailable {
            path: "<unknown>".into(),
            operation: "unspecified".into(),
            source: e,
        }
    }
}

impl From<tokio::time::error::Elapsed> for MxTallyError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        // Domain name not available at this conversion point; callers wrap
        // via `lookup_timeout` where context is known.
        MxTallyError::LookupTimeout {
            domain: "<unknown>".into(),
            seconds: 0,
        }
    }
}

/// Extension trait for enriching IO results with path + operation context.
pub trait IoResultExt<T> {
    fn with_path(self, path: impl Into<String>, operation: impl Into<String>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::result::Result<T, io::Error> {
    fn with_path(self, path: impl Into<String>, operation: impl Into<String>) -> Result<T> {
        self.map_err(|e| MxTallyError::source_unavailable(path.into(), operation.into(), e))
    }
}
