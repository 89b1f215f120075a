//! Run configuration
//!
//! Secrets arrive as CLI flags or environment variables; that transport
//! concern lives in the binary. The library only sees this struct.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::command::DEFAULT_TOOL_TIMEOUT;

/// Where the private signing key comes from.
///
/// The tri-state is deliberate: an unset option means "sign with whatever
/// the ambient keyring holds", while an explicitly empty value follows the
/// CI convention that an empty secret turns signing off for the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeySource {
    /// Option unset: use the ambient keyring as-is, no reset or import.
    Ambient,
    /// Option set to the empty string: signing is disabled for this run.
    Disabled,
    /// Path to a private key file: reset the keyring and import it.
    File(PathBuf),
}

impl KeySource {
    /// Map the raw option value onto the tri-state.
    pub fn from_option(value: Option<&str>) -> Self {
        match value {
            None => Self::Ambient,
            Some("") => Self::Disabled,
            Some(path) => Self::File(PathBuf::from(path)),
        }
    }
}

/// Everything one signing run needs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SigningConfig {
    /// Directory holding the built packages.
    pub packages_dir: PathBuf,

    /// Private key source (tri-state, see [`KeySource`]).
    pub key_source: KeySource,

    /// Public key registered with the RPM trust database (RPM path only).
    pub public_key: Option<PathBuf>,

    /// GPG passphrase; alters the RPM macro set and the DEB sign call.
    pub passphrase: Option<String>,

    /// The keyring this run operates on. An explicit handle rather than
    /// implicit ambient filesystem state.
    pub keyring_home: PathBuf,

    /// Suppress echoing of underlying tool output.
    pub quiet: bool,

    /// Per-invocation subprocess timeout.
    #[serde(skip, default = "default_timeout")]
    pub tool_timeout: Duration,
}

fn default_timeout() -> Duration {
    DEFAULT_TOOL_TIMEOUT
}

impl SigningConfig {
    pub fn new(packages_dir: impl Into<PathBuf>) -> Self {
        Self {
            packages_dir: packages_dir.into(),
            key_source: KeySource::Ambient,
            public_key: None,
            passphrase: None,
            keyring_home: default_keyring_home(),
            quiet: false,
            tool_timeout: DEFAULT_TOOL_TIMEOUT,
        }
    }
}

/// Conventional per-user GPG trust-store location.
pub fn default_keyring_home() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".gnupg")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_source_tri_state() {
        assert_eq!(KeySource::from_option(None), KeySource::Ambient);
        assert_eq!(KeySource::from_option(Some("")), KeySource::Disabled);
        assert_eq!(
            KeySource::from_option(Some("/keys/release.asc")),
            KeySource::File(PathBuf::from("/keys/release.asc"))
        );
    }
}
