//! Keyring lifecycle management
//!
//! The keyring is a shared mutable trust store. A run that supplies its
//! own private key resets the store and repopulates it; otherwise the
//! ambient configuration is used untouched. There is no teardown — the
//! trust store is meant to persist past the run.

use std::path::{Path, PathBuf};

use tracing::{debug, instrument, warn};

use crate::command::{CommandRunner, CommandSpec};
use crate::error::Result;

/// Explicit handle on the keyring this run operates on.
pub struct KeyringManager<'a> {
    runner: &'a dyn CommandRunner,
    home: PathBuf,
    quiet: bool,
}

impl<'a> KeyringManager<'a> {
    pub fn new(runner: &'a dyn CommandRunner, home: impl Into<PathBuf>, quiet: bool) -> Self {
        Self {
            runner,
            home: home.into(),
            quiet,
        }
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    fn gpg(&self, args: &[&str]) -> CommandSpec {
        let mut argv = vec![
            "--homedir".to_string(),
            self.home.to_string_lossy().to_string(),
            "--batch".to_string(),
        ];
        argv.extend(args.iter().map(|a| a.to_string()));
        CommandSpec::with_args("gpg", argv).quiet(self.quiet)
    }

    /// Delete existing public and secret keys from the keyring.
    ///
    /// Best-effort idempotent cleanup: an empty keyring, a failed
    /// listing, or a failed delete never aborts the run.
    #[instrument(skip(self), fields(home = %self.home.display()))]
    pub async fn reset(&self) -> Result<()> {
        for fpr in self.list_fingerprints("--list-secret-keys").await {
            let spec = self.gpg(&["--yes", "--delete-secret-keys", &fpr]);
            if let Ok(out) = self.runner.run(&spec).await {
                if !out.success() {
                    debug!(%fpr, stderr = %out.stderr, "secret key delete failed, continuing");
                }
            }
        }

        for fpr in self.list_fingerprints("--list-keys").await {
            let spec = self.gpg(&["--yes", "--delete-keys", &fpr]);
            if let Ok(out) = self.runner.run(&spec).await {
                if !out.success() {
                    debug!(%fpr, stderr = %out.stderr, "public key delete failed, continuing");
                }
            }
        }

        Ok(())
    }

    /// Import a private key file, non-interactive. Tolerates failure:
    /// a malformed or already-present key surfaces later, through
    /// identity resolution or the signing call itself.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub async fn import_private_key(&self, path: &Path) -> Result<()> {
        let spec = self.gpg(&["--yes", "--import", &path.to_string_lossy()]);
        match self.runner.run(&spec).await {
            Ok(out) if !out.success() => {
                warn!(stderr = %out.stderr, "private key import failed, continuing");
            }
            Err(err) => {
                warn!(%err, "private key import failed, continuing");
            }
            Ok(_) => {}
        }
        Ok(())
    }

    /// Register a public key with the RPM trust database. Unlike the
    /// gpg-side operations this one is fatal on failure.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub async fn import_public_key(&self, path: &Path) -> Result<()> {
        let spec = CommandSpec::with_args(
            "rpm",
            vec!["--import".to_string(), path.to_string_lossy().to_string()],
        )
        .quiet(self.quiet);
        self.runner.run_checked(&spec).await?;
        Ok(())
    }

    /// Fingerprints in the keyring, per the colon-format listing.
    /// Any failure yields an empty list.
    async fn list_fingerprints(&self, listing: &str) -> Vec<String> {
        let spec = self.gpg(&["--with-colons", listing]);
        let output = match self.runner.run(&spec).await {
            Ok(out) if out.success() => out,
            _ => return Vec::new(),
        };

        output
            .stdout
            .lines()
            .filter(|line| line.starts_with("fpr:"))
            // fingerprint lives in field 10 of the colon format
            .filter_map(|line| line.split(':').nth(9))
            .filter(|fpr| !fpr.is_empty())
            .map(|fpr| fpr.to_string())
            .collect()
    }
}
