//! Typed RPM signing macro builder
//!
//! The RPM signer is configured through `--define` macros. The set of
//! keys the signing subsystem consumes is closed, so the builder
//! validates keys against that table instead of accepting free-form
//! strings.
//!
//! Security note: when a passphrase is supplied it is embedded as a
//! literal argument in the low-level sign command and is visible in
//! process listings for the duration of the call. This is a deliberate
//! legacy trade-off kept for compatibility with existing signing
//! pipelines, not an oversight.

use std::path::Path;

use crate::error::{Result, SigningError};

/// Backend selection macro.
pub const SIGNATURE: &str = "_signature";
/// Keyring home path macro.
pub const GPG_PATH: &str = "_gpg_path";
/// Signing identity macro.
pub const GPG_NAME: &str = "_gpg_name";
/// Low-level sign command override macro.
pub const GPG_SIGN_CMD: &str = "__gpg_sign_cmd";

const KNOWN_KEYS: [&str; 4] = [SIGNATURE, GPG_PATH, GPG_NAME, GPG_SIGN_CMD];

/// Ordered macro key/value set, rendered as `--define` argument pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MacroSet {
    entries: Vec<(String, String)>,
}

impl MacroSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a macro, rejecting keys outside the accepted table.
    /// Redefining a key replaces its value in place.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<()> {
        if !KNOWN_KEYS.contains(&key) {
            return Err(SigningError::UnknownMacro(key.to_string()));
        }
        self.insert(key, value.into());
        Ok(())
    }

    fn insert(&mut self, key: &str, value: String) {
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key.to_string(), value));
        }
    }

    /// The macro set for one signing run: backend, keyring home, and
    /// identity always; the sign-command override only with a
    /// passphrase.
    pub fn for_signing(identity: &str, keyring_home: &Path, passphrase: Option<&str>) -> Self {
        let mut macros = Self::new();
        macros.insert(SIGNATURE, "gpg".to_string());
        macros.insert(GPG_PATH, keyring_home.to_string_lossy().to_string());
        macros.insert(GPG_NAME, identity.to_string());

        if let Some(passphrase) = passphrase {
            macros.insert(GPG_SIGN_CMD, sign_command_override(passphrase));
        }

        macros
    }

    /// Render to `--define "<key> <value>"` argument pairs, preserving
    /// insertion order.
    pub fn render_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.entries.len() * 2);
        for (key, value) in &self.entries {
            args.push("--define".to_string());
            args.push(format!("{key} {value}"));
        }
        args
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Non-interactive gpg sign invocation: version-3 signatures, batch
/// mode, no armor, literal passphrase, secure-memory warnings off,
/// identity via `-u`, digest fixed to SHA-256.
fn sign_command_override(passphrase: &str) -> String {
    format!(
        "%{{__gpg}} gpg --force-v3-sigs --batch --no-armor \
         --passphrase \"{passphrase}\" --no-secmem-warning \
         -u \"%{{_gpg_name}}\" -sbo %{{__signature_filename}} \
         --digest-algo sha256 %{{__plaintext_filename}}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_macro_key_is_rejected() {
        let mut macros = MacroSet::new();
        let err = macros.set("_fancy_key", "value").unwrap_err();
        assert!(matches!(err, SigningError::UnknownMacro(k) if k == "_fancy_key"));

        macros.set(GPG_NAME, "Release <rel@example.com>").unwrap();
        assert_eq!(macros.get(GPG_NAME), Some("Release <rel@example.com>"));
    }

    #[test]
    fn signing_set_without_passphrase_has_no_command_override() {
        let macros = MacroSet::for_signing("Rel <rel@example.com>", Path::new("/home/ci/.gnupg"), None);

        assert_eq!(macros.get(SIGNATURE), Some("gpg"));
        assert_eq!(macros.get(GPG_PATH), Some("/home/ci/.gnupg"));
        assert_eq!(macros.get(GPG_NAME), Some("Rel <rel@example.com>"));
        assert_eq!(macros.get(GPG_SIGN_CMD), None);
    }

    #[test]
    fn passphrase_override_pins_sha256_and_batch_mode() {
        let macros =
            MacroSet::for_signing("Rel <rel@example.com>", Path::new("/home/ci/.gnupg"), Some("secret"));

        let cmd = macros.get(GPG_SIGN_CMD).unwrap();
        assert!(cmd.contains("--force-v3-sigs"));
        assert!(cmd.contains("--batch"));
        assert!(cmd.contains("--no-armor"));
        assert!(cmd.contains("--passphrase \"secret\""));
        assert!(cmd.contains("--no-secmem-warning"));
        assert!(cmd.contains("-u \"%{_gpg_name}\""));
        assert!(cmd.contains("--digest-algo sha256"));
    }

    #[test]
    fn sets_differ_only_in_the_embedded_passphrase() {
        let home = Path::new("/home/ci/.gnupg");
        let a = MacroSet::for_signing("Rel", home, Some("p1"));
        let b = MacroSet::for_signing("Rel", home, Some("p2"));

        let a_args = a.render_args();
        let b_args = b.render_args();
        assert_eq!(a_args.len(), b_args.len());

        let diffs: Vec<_> = a_args
            .iter()
            .zip(b_args.iter())
            .filter(|(x, y)| x != y)
            .collect();
        assert_eq!(diffs.len(), 1);
        assert_eq!(
            diffs[0].0.replace("\"p1\"", "\"p2\""),
            *diffs[0].1
        );
    }

    #[test]
    fn render_preserves_insertion_order() {
        let macros = MacroSet::for_signing("Rel", Path::new("/g"), None);
        let args = macros.render_args();
        assert_eq!(args[1], "_signature gpg");
        assert_eq!(args[3], "_gpg_path /g");
        assert_eq!(args[5], "_gpg_name Rel");
    }
}
