//! Gantry Signing - Package signing and verification for release pipelines
//!
//! Takes a directory of built release artifacts (`.rpm` or `.deb`
//! packages), applies a cryptographic signature using a managed GPG
//! keyring, and verifies that every artifact carries a valid signature
//! before the release may proceed. Acceptance is all-or-nothing across
//! the batch.
//!
//! External tools (gpg, rpm, dpkg-sig) are driven through the
//! [`command::CommandRunner`] seam so the whole pipeline is testable
//! without real cryptographic binaries.
//!
//! The keyring directory is shared mutable state with no locking
//! discipline: at most one signing run per host is assumed, and callers
//! must serialize externally.

pub mod backend;
pub mod backends;
pub mod command;
pub mod config;
pub mod error;
pub mod identity;
pub mod keyring;
pub mod macros;
pub mod package;
pub mod run;

pub use backend::SignerBackend;
pub use backends::{DebSigner, RpmSigner};
pub use command::{CommandOutput, CommandRunner, CommandSpec, ProcessRunner};
pub use config::{KeySource, SigningConfig};
pub use error::{Result, SigningError};
pub use keyring::KeyringManager;
pub use macros::MacroSet;
pub use package::{PackageKind, PackageSet};
pub use run::{execute, SigningReport};
