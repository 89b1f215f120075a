//! DEB signing backend

use tracing::{info, instrument};

use crate::backend::SignerBackend;
use crate::command::{CommandRunner, CommandSpec};
use crate::error::Result;
use crate::package::{PackageKind, PackageSet};

/// Signs and verifies `.deb` batches via dpkg-sig. Verification trusts
/// the tool's exit code; there is no per-line parsing on this path.
pub struct DebSigner<'a> {
    runner: &'a dyn CommandRunner,
    passphrase: Option<String>,
    quiet: bool,
}

impl<'a> DebSigner<'a> {
    pub fn new(runner: &'a dyn CommandRunner, passphrase: Option<String>, quiet: bool) -> Self {
        Self {
            runner,
            passphrase,
            quiet,
        }
    }
}

#[async_trait::async_trait]
impl SignerBackend for DebSigner<'_> {
    fn kind(&self) -> PackageKind {
        PackageKind::Deb
    }

    #[instrument(skip(self, packages), fields(count = packages.len()))]
    async fn sign(&self, packages: &PackageSet) -> Result<()> {
        if packages.is_empty() {
            return Ok(());
        }

        let mut args = vec!["--sign".to_string(), "builder".to_string()];
        if let Some(passphrase) = &self.passphrase {
            // Same literal-argument exposure as the RPM macro override.
            args.push("-g".to_string());
            args.push(format!("--batch --no-tty --passphrase {passphrase}"));
        }
        args.extend(packages.paths());

        let spec = CommandSpec::with_args("dpkg-sig", args).quiet(self.quiet);
        self.runner.run_checked(&spec).await?;
        info!(count = packages.len(), "deb batch signed");
        Ok(())
    }

    #[instrument(skip(self, packages), fields(count = packages.len()))]
    async fn verify(&self, packages: &PackageSet) -> Result<()> {
        if packages.is_empty() {
            return Ok(());
        }

        let mut args = vec!["--verify".to_string()];
        args.extend(packages.paths());

        let spec = CommandSpec::with_args("dpkg-sig", args).quiet(self.quiet);
        self.runner.run_checked(&spec).await?;
        info!(count = packages.len(), "deb batch verified");
        Ok(())
    }
}
