//! Run orchestration
//!
//! One run walks Idle → KeyringPrepared → Signed → Verified → Done as
//! straight-line control flow; any error is terminal for the whole
//! batch and the run must be re-invoked from the start.

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::backend::SignerBackend;
use crate::backends::{DebSigner, RpmSigner};
use crate::command::CommandRunner;
use crate::config::{KeySource, SigningConfig};
use crate::error::Result;
use crate::identity::resolve_identity;
use crate::keyring::KeyringManager;
use crate::macros::MacroSet;
use crate::package::{self, PackageKind, PackageSet};

/// Outcome of a signing run: the names signed and verified, or the
/// skipped marker when signing was disabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SigningReport {
    /// Backend selected for the run, if any.
    pub backend: Option<PackageKind>,
    /// Every package in the batch, signed and verified. Never a subset.
    pub packages: Vec<String>,
    /// True when signing was explicitly disabled for the run.
    pub skipped: bool,
}

impl SigningReport {
    fn skipped() -> Self {
        Self {
            backend: None,
            packages: Vec::new(),
            skipped: true,
        }
    }
}

/// Sign and verify every package in the configured directory.
///
/// All-or-nothing: on success the report lists the full batch; on any
/// error no subset is reported as trustworthy.
#[instrument(skip(config, runner), fields(dir = %config.packages_dir.display()))]
pub async fn execute(config: &SigningConfig, runner: &dyn CommandRunner) -> Result<SigningReport> {
    // An explicitly empty key means signing is turned off for this run,
    // not misconfigured. No subprocess is invoked at all.
    if config.key_source == KeySource::Disabled {
        info!("signing disabled, skipping run");
        return Ok(SigningReport::skipped());
    }

    let kind = package::require_kind(&config.packages_dir)?;
    let packages = PackageSet::discover(&config.packages_dir, kind)?;
    info!(%kind, count = packages.len(), "selected signing backend");

    let keyring = KeyringManager::new(runner, &config.keyring_home, config.quiet);
    if let KeySource::File(path) = &config.key_source {
        keyring.reset().await?;
        keyring.import_private_key(path).await?;
    }

    match kind {
        PackageKind::Rpm => {
            if let Some(public_key) = &config.public_key {
                keyring.import_public_key(public_key).await?;
            }
            let identity = resolve_identity(runner, &config.keyring_home, config.quiet).await?;
            let macros = MacroSet::for_signing(
                &identity,
                &config.keyring_home,
                config.passphrase.as_deref(),
            );
            let signer = RpmSigner::new(runner, macros, config.quiet);
            signer.sign(&packages).await?;
            signer.verify(&packages).await?;
        }
        PackageKind::Deb => {
            let signer = DebSigner::new(runner, config.passphrase.clone(), config.quiet);
            signer.sign(&packages).await?;
            signer.verify(&packages).await?;
        }
    }

    Ok(SigningReport {
        backend: Some(kind),
        packages: packages.names().to_vec(),
        skipped: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::fake::FakeRunner;
    use crate::error::SigningError;
    use std::fs::File;
    use std::path::PathBuf;

    const PACKET_LISTING: &str = ":user ID packet: \"Release Engineering <rel@example.com>\"\n";

    fn config_for(dir: &tempfile::TempDir) -> SigningConfig {
        let mut config = SigningConfig::new(dir.path());
        config.keyring_home = PathBuf::from("/tmp/gnupg");
        config.quiet = true;
        config
    }

    #[tokio::test]
    async fn empty_key_skips_without_any_subprocess() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("app-1.0-1.x86_64.rpm")).unwrap();

        let mut config = config_for(&dir);
        config.key_source = KeySource::from_option(Some(""));

        let runner = FakeRunner::new();
        let report = execute(&config, &runner).await.unwrap();

        assert!(report.skipped);
        assert!(report.packages.is_empty());
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn directory_without_packages_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("notes.txt")).unwrap();

        let runner = FakeRunner::new();
        let err = execute(&config_for(&dir), &runner).await.unwrap_err();
        assert!(matches!(err, SigningError::Config(msg) if msg == "No package to sign"));
    }

    #[tokio::test]
    async fn ambient_key_rpm_run_signs_and_verifies_the_single_package() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("app-1.0-1.x86_64.rpm")).unwrap();

        let runner = FakeRunner::new();
        runner.push_output(0, "KEYBLOCK", ""); // gpg --export
        runner.push_output(0, PACKET_LISTING, ""); // gpg --list-packets
        runner.push_output(0, "", ""); // rpm --addsign
        runner.push_output(0, "/pkgs/app-1.0-1.x86_64.rpm: gpg OK\n", ""); // rpm --checksig

        let report = execute(&config_for(&dir), &runner).await.unwrap();

        assert_eq!(report.backend, Some(PackageKind::Rpm));
        assert_eq!(report.packages, vec!["app-1.0-1.x86_64.rpm"]);
        assert!(!report.skipped);

        // Ambient key source: no reset, no import. First call is the
        // identity export, then packet listing, then sign, then verify.
        let calls = runner.calls();
        assert_eq!(calls.len(), 4);
        assert!(calls[0].args.contains(&"--export".to_string()));
        assert!(calls[2].args.contains(&"--addsign".to_string()));
        assert!(calls[3].args.contains(&"--checksig".to_string()));
    }

    #[tokio::test]
    async fn supplied_key_resets_and_imports_before_signing() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("app-1.0-1.x86_64.rpm")).unwrap();

        let mut config = config_for(&dir);
        config.key_source = KeySource::File(PathBuf::from("/keys/release.asc"));
        config.public_key = Some(PathBuf::from("/keys/release.pub"));
        config.passphrase = Some("secret".to_string());

        let runner = FakeRunner::new();
        runner.push_output(2, "", "no secret keys"); // list-secret-keys
        runner.push_output(2, "", "no public keys"); // list-keys
        runner.push_output(0, "", ""); // gpg --import
        runner.push_output(0, "", ""); // rpm --import
        runner.push_output(0, "KEYBLOCK", ""); // gpg --export
        runner.push_output(0, PACKET_LISTING, ""); // gpg --list-packets
        runner.push_output(0, "", ""); // rpm --addsign
        runner.push_output(0, "/pkgs/app-1.0-1.x86_64.rpm: digests signatures OK\n", "");

        let report = execute(&config, &runner).await.unwrap();
        assert_eq!(report.packages.len(), 1);

        let calls = runner.calls();
        assert!(calls[2].args.contains(&"--import".to_string()));
        assert_eq!(calls[3].program, "rpm");
        assert!(calls[3].args.contains(&"--import".to_string()));

        // the passphrase reaches the sign call through the macro set
        let sign_args = &calls[6].args;
        assert!(sign_args
            .iter()
            .any(|a| a.starts_with("__gpg_sign_cmd") && a.contains("--passphrase \"secret\"")));
    }

    #[tokio::test]
    async fn deb_run_uses_the_deb_backend_and_no_identity_resolution() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("tool_1.2_amd64.deb")).unwrap();

        let mut config = config_for(&dir);
        config.passphrase = Some("secret".to_string());

        let runner = FakeRunner::new();
        let report = execute(&config, &runner).await.unwrap();

        assert_eq!(report.backend, Some(PackageKind::Deb));
        assert_eq!(report.packages, vec!["tool_1.2_amd64.deb"]);

        let calls = runner.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].program, "dpkg-sig");
        assert_eq!(calls[1].args[0], "--verify");
    }

    #[tokio::test]
    async fn deb_verifier_failure_surfaces_the_tool_error() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("tool_1.2_amd64.deb")).unwrap();

        let runner = FakeRunner::new();
        runner.push_output(0, "", ""); // sign
        runner.push_output(2, "", "dpkg-sig: BADSIG tool_1.2_amd64.deb"); // verify

        let err = execute(&config_for(&dir), &runner).await.unwrap_err();
        match err {
            SigningError::Tool { status, stderr, .. } => {
                assert_eq!(status, 2);
                assert!(stderr.contains("BADSIG"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn mixed_directory_processes_only_the_selected_kind() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("app-1.0-1.x86_64.rpm")).unwrap();
        File::create(dir.path().join("tool_1.2_amd64.deb")).unwrap();

        let runner = FakeRunner::new();
        runner.push_output(0, "KEYBLOCK", "");
        runner.push_output(0, PACKET_LISTING, "");
        runner.push_output(0, "", "");
        runner.push_output(0, "/pkgs/app-1.0-1.x86_64.rpm: gpg OK\n", "");
        // whichever kind wins detection, the other is silently ignored
        let report = execute(&config_for(&dir), &runner).await.unwrap();
        assert_eq!(report.packages.len(), 1);
        let name = &report.packages[0];
        assert!(name.ends_with(".rpm") || name.ends_with(".deb"));
    }
}
