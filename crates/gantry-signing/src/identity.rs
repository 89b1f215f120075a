//! Signing identity resolution
//!
//! The RPM backend needs the key owner's user-ID string for its macro
//! set. The identity is recovered by exporting the active public key and
//! scanning the packet listing for the user ID packet.

use std::path::Path;

use tracing::{debug, instrument};

use crate::command::{CommandRunner, CommandSpec};
use crate::error::{Result, SigningError};

const USER_ID_MARKER: &str = "user ID packet";

/// Derive the signing identity from the current keyring contents.
#[instrument(skip(runner), fields(home = %keyring_home.display()))]
pub async fn resolve_identity(
    runner: &dyn CommandRunner,
    keyring_home: &Path,
    quiet: bool,
) -> Result<String> {
    let export = CommandSpec::with_args(
        "gpg",
        vec![
            "--homedir".to_string(),
            keyring_home.to_string_lossy().to_string(),
            "--batch".to_string(),
            "--armor".to_string(),
            "--export".to_string(),
        ],
    )
    .quiet(true);
    let exported = runner.run_checked(&export).await?;

    let list = CommandSpec::new("gpg", &["--list-packets"])
        .stdin(exported.stdout.into_bytes())
        .quiet(quiet);
    let packets = runner.run_checked(&list).await?;

    let identity = parse_user_id(&packets.stdout).ok_or(SigningError::IdentityResolution)?;
    debug!(%identity, "resolved signing identity");
    Ok(identity)
}

/// Extract the user ID from a packet listing: the quoted value after the
/// final colon of the line carrying the user-ID marker.
fn parse_user_id(output: &str) -> Option<String> {
    for line in output.lines() {
        if !line.contains(USER_ID_MARKER) {
            continue;
        }
        let value = match line.rfind(':') {
            Some(idx) => &line[idx + 1..],
            None => continue,
        };
        let value = value.trim().trim_matches('"').trim();
        if !value.is_empty() {
            return Some(value.to_string());
        }
    }
    None
}
