//! Signer backend trait
//!
//! Each package kind has its own signing and verification tooling
//! behind a common seam.

use crate::error::Result;
use crate::package::{PackageKind, PackageSet};

/// A backend signs a whole batch in one tool invocation per phase.
/// Batching keeps passphrase and macro state consistent across the set
/// instead of re-establishing it per file.
#[async_trait::async_trait]
pub trait SignerBackend: Send + Sync {
    /// The package kind this backend handles
    fn kind(&self) -> PackageKind;

    /// Sign every package in the set. An empty set is a no-op success.
    async fn sign(&self, packages: &PackageSet) -> Result<()>;

    /// Verify every package in the set; any failure aborts the batch —
    /// there is no partial acceptance.
    async fn verify(&self, packages: &PackageSet) -> Result<()>;
}
