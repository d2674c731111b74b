//! Checksum manifest and end-of-parse validation.

use crate::score::Track;

use super::error::{ChecksumError, ParseError, SyntaxError};

/// The `KEY = INTEGER` entries collected from `%%CHECK:` blocks.
///
/// Declaration order is kept for error reporting. A repeated key overwrites
/// its earlier value.
#[derive(Debug, Default)]
pub struct CheckManifest {
    entries: Vec<(String, u32)>,
}

impl CheckManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one entry, overwriting an earlier declaration of the same key.
    pub fn insert(&mut self, key: impl Into<String>, value: u32) {
        let key = key.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    pub fn get(&self, key: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|&(_, v)| v)
    }
}

/// Check every track against the bar grid and the manifest.
///
/// Bar misalignment fails fast. Checksum violations are collected so the
/// author sees every stale total at once: per track in document order, a
/// missing or mismatched `<name>_Total` entry; then, in declaration order,
/// entries that name no track.
pub fn validate(
    tracks: &[Track],
    manifest: &CheckManifest,
    bar_steps: u32,
) -> Result<(), ParseError> {
    for track in tracks {
        let total = track.total_steps();
        if total % bar_steps != 0 {
            return Err(SyntaxError::arithmetic(format!(
                "track '{}' holds {total} steps, not a whole number of {bar_steps}-step bars",
                track.name
            ))
            .into());
        }
    }

    let mut errors = Vec::new();
    let mut expected = Vec::with_capacity(tracks.len());

    for track in tracks {
        let key = format!("{}_Total", track.name);
        let computed = track.total_steps();
        match manifest.get(&key) {
            None => errors.push(ChecksumError::MissingKey {
                track: track.name.clone(),
                key: key.clone(),
            }),
            Some(declared) if declared != computed => errors.push(ChecksumError::Mismatch {
                key: key.clone(),
                declared,
                computed,
            }),
            Some(_) => {}
        }
        expected.push(key);
    }

    for (key, _) in &manifest.entries {
        if !expected.iter().any(|k| k == key) {
            errors.push(ChecksumError::UnknownKey { key: key.clone() });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ParseError::Validation(errors))
    }
}
