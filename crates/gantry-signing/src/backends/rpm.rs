//! RPM signing backend

use tracing::{info, instrument};

use crate::backend::SignerBackend;
use crate::command::{CommandRunner, CommandSpec};
use crate::error::{Result, SigningError};
use crate::macros::MacroSet;
use crate::package::{PackageKind, PackageSet};

/// Checksig outcomes accepted as a valid signature. Any other line is a
/// fatal verification failure, reported verbatim.
const ACCEPTED_SUFFIXES: [&str; 3] = ["gpg OK", "pgp md5 OK", "digests signatures OK"];

/// Signs and verifies `.rpm` batches via the rpm tool and a macro set.
pub struct RpmSigner<'a> {
    runner: &'a dyn CommandRunner,
    macros: MacroSet,
    quiet: bool,
}

impl<'a> RpmSigner<'a> {
    pub fn new(runner: &'a dyn CommandRunner, macros: MacroSet, quiet: bool) -> Self {
        Self {
            runner,
            macros,
            quiet,
        }
    }

    /// Validate one checksig output line: trailing whitespace stripped,
    /// the remainder must end with an accepted suffix.
    fn check_line(line: &str) -> Result<()> {
        let line = line.trim_end();
        if ACCEPTED_SUFFIXES.iter().any(|s| line.ends_with(s)) {
            Ok(())
        } else {
            Err(SigningError::Verification {
                line: line.to_string(),
            })
        }
    }
}

#[async_trait::async_trait]
impl SignerBackend for RpmSigner<'_> {
    fn kind(&self) -> PackageKind {
        PackageKind::Rpm
    }

    #[instrument(skip(self, packages), fields(count = packages.len()))]
    async fn sign(&self, packages: &PackageSet) -> Result<()> {
        if packages.is_empty() {
            return Ok(());
        }

        let mut args = self.macros.render_args();
        args.push("--addsign".to_string());
        args.extend(packages.paths());

        let spec = CommandSpec::with_args("rpm", args).quiet(self.quiet);
        self.runner.run_checked(&spec).await?;
        info!(count = packages.len(), "rpm batch signed");
        Ok(())
    }

    #[instrument(skip(self, packages), fields(count = packages.len()))]
    async fn verify(&self, packages: &PackageSet) -> Result<()> {
        if packages.is_empty() {
            return Ok(());
        }

        let mut args = vec!["--checksig".to_string()];
        args.extend(packages.paths());

        let spec = CommandSpec::with_args("rpm", args).quiet(self.quiet);
        // Checksig exits non-zero when a signature is bad; the per-line
        // diagnostic takes precedence so the offending package's exact
        // output line reaches the operator.
        let output = self.runner.run(&spec).await?;

        for line in output.stdout.lines().filter(|l| !l.trim().is_empty()) {
            Self::check_line(line)?;
        }

        if !output.success() {
            return Err(SigningError::Tool {
                tool: "rpm".to_string(),
                status: output.status,
                stderr: if output.stderr.is_empty() {
                    output.stdout
                } else {
                    output.stderr
                },
            });
        }

        info!(count = packages.len(), "rpm batch verified");
        Ok(())
    }
}
