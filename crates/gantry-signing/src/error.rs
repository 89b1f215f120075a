//! Error types for signing operations

use thiserror::Error;

/// Result type alias for signing operations
pub type Result<T> = std::result::Result<T, SigningError>;

/// Signing-related errors
#[derive(Debug, Error)]
pub enum SigningError {
    /// Configuration error (no usable key, no package to sign, ...)
    #[error("{0}")]
    Config(String),

    /// External tool exited non-zero
    #[error("{tool} failed with exit code {status}: {stderr}")]
    Tool {
        tool: String,
        status: i32,
        stderr: String,
    },

    /// External tool exceeded its timeout
    #[error("{tool} timed out after {secs} seconds")]
    ToolTimeout { tool: String, secs: u64 },

    /// The keyring holds no usable signing identity
    #[error("Unable to read GPG User ID")]
    IdentityResolution,

    /// A signature check line did not match any accepted outcome
    #[error("{line}")]
    Verification { line: String },

    /// Macro key not in the accepted table
    #[error("Unknown RPM signing macro: {0}")]
    UnknownMacro(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SigningError {
    /// Exit code contract: configuration, identity, and verification errors
    /// exit 1; an external tool's own exit code is propagated.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Tool { status, .. } if *status > 0 => *status,
            _ => 1,
        }
    }
}
