//! CLI definition and command handling
//!
//! Every option is accepted as a flag or an environment variable; both
//! are transports for the same configuration contract. The library only
//! ever sees the resolved [`SigningConfig`].

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use console::style;
use tracing::info;

use gantry_signing::{
    config::default_keyring_home, run, KeySource, ProcessRunner, SigningConfig, SigningReport,
};

/// Gantry - sign and verify a directory of release packages
#[derive(Debug, Parser)]
#[command(name = "gantry")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory holding the built packages (.rpm or .deb)
    #[arg(required = true)]
    pub packages_dir: PathBuf,

    /// Path to a private key file. Unset: sign with the ambient
    /// keyring. Empty: signing is disabled for this run.
    #[arg(long, env = "GANTRY_PRIVATE_KEY")]
    pub private_key: Option<String>,

    /// Path to a public key to register with the RPM trust database
    #[arg(long, env = "GANTRY_PUBLIC_KEY")]
    pub public_key: Option<PathBuf>,

    /// GPG passphrase for the signing key
    #[arg(long, env = "GANTRY_PASSPHRASE")]
    pub passphrase: Option<String>,

    /// Keyring directory (defaults to ~/.gnupg)
    #[arg(long, env = "GANTRY_KEYRING_HOME")]
    pub keyring_home: Option<PathBuf>,

    /// Per-invocation subprocess timeout in seconds
    #[arg(long, env = "GANTRY_TIMEOUT_SECS", default_value = "600")]
    pub timeout_secs: u64,

    /// Suppress echoing of underlying tool output
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output
    Json,
}

impl Cli {
    /// Execute the signing run
    pub fn execute(&self) -> anyhow::Result<()> {
        let config = self.to_config();
        info!(dir = %config.packages_dir.display(), "executing signing run");

        let runner = ProcessRunner::with_timeout(config.tool_timeout);
        let rt = tokio::runtime::Runtime::new()?;
        let report = rt.block_on(run::execute(&config, &runner))?;

        self.print_report(&report)?;
        Ok(())
    }

    fn to_config(&self) -> SigningConfig {
        SigningConfig {
            packages_dir: self.packages_dir.clone(),
            key_source: KeySource::from_option(self.private_key.as_deref()),
            public_key: self.public_key.clone(),
            passphrase: self.passphrase.clone(),
            keyring_home: self
                .keyring_home
                .clone()
                .unwrap_or_else(default_keyring_home),
            quiet: self.quiet,
            tool_timeout: Duration::from_secs(self.timeout_secs),
        }
    }

    fn print_report(&self, report: &SigningReport) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(report)?);
            }
            OutputFormat::Text => {
                if report.skipped {
                    println!("Signing disabled, no packages processed.");
                } else if !self.quiet {
                    println!("{}", style("Signed packages:").bold());
                    for name in &report.packages {
                        println!(" - {name}");
                    }
                } else {
                    // quiet suppresses the listing, never the outcome
                    println!(
                        "{}",
                        style(format!(
                            "Signed and verified {} package(s)",
                            report.packages.len()
                        ))
                        .green()
                    );
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_private_key_means_ambient_signing() {
        let cli = Cli::parse_from(["gantry", "/pkgs"]);
        let config = cli.to_config();
        assert_eq!(config.key_source, KeySource::Ambient);
        assert_eq!(config.tool_timeout, Duration::from_secs(600));
    }

    #[test]
    fn empty_private_key_disables_signing() {
        let cli = Cli::parse_from(["gantry", "/pkgs", "--private-key", ""]);
        assert_eq!(cli.to_config().key_source, KeySource::Disabled);
    }

    #[test]
    fn key_path_and_passphrase_flow_into_the_config() {
        let cli = Cli::parse_from([
            "gantry",
            "/pkgs",
            "--private-key",
            "/keys/release.asc",
            "--passphrase",
            "secret",
            "--keyring-home",
            "/ci/.gnupg",
        ]);
        let config = cli.to_config();
        assert_eq!(
            config.key_source,
            KeySource::File(PathBuf::from("/keys/release.asc"))
        );
        assert_eq!(config.passphrase.as_deref(), Some("secret"));
        assert_eq!(config.keyring_home, PathBuf::from("/ci/.gnupg"));
    }
}
