//! Deterministic artifact naming
//!
//! A run produces three names from the cluster name, the secret selection
//! and the capture time:
//!
//! ```text
//! {base}-{YYYY-MM-DD_HH-MM-SS}.yaml           plaintext file
//! {base}-{YYYY-MM-DD_HH-MM-SS}.yaml.age.asc   encrypted file
//! {prefix}/{encrypted file}                   object key
//! ```

use crate::config::SecretSelection;
use chrono::{DateTime, Utc};

/// `YYYY-MM-DD_HH-MM-SS`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Suffix appended to the plaintext name for the armored age file
pub const ENCRYPTED_SUFFIX: &str = ".age.asc";

/// Names of the files and object key produced by one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupArtifact {
    pub plaintext_name: String,
    pub encrypted_name: String,
    pub object_key: String,
}

impl BackupArtifact {
    pub fn new(
        cluster_name: &str,
        selection: &SecretSelection,
        captured_at: DateTime<Utc>,
        path_prefix: &str,
    ) -> Self {
        let base = base_name(cluster_name, selection);
        let timestamp = captured_at.format(TIMESTAMP_FORMAT);

        let plaintext_name = format!("{}-{}.yaml", base, timestamp);
        let encrypted_name = format!("{}{}", plaintext_name, ENCRYPTED_SUFFIX);
        let object_key = join_key(path_prefix, &encrypted_name);

        Self {
            plaintext_name,
            encrypted_name,
            object_key,
        }
    }
}

/// `{cluster}-{name}`, or `{cluster}-{key}-{value}` with `/` made filesystem-safe
fn base_name(cluster_name: &str, selection: &SecretSelection) -> String {
    match selection {
        SecretSelection::ByName(name) => format!("{}-{}", cluster_name, name),
        SecretSelection::ByLabel { key, value } => {
            format!("{}-{}-{}", cluster_name, key, value).replace('/', "_")
        }
    }
}

/// Slash-join `prefix` and `name` into a clean key
///
/// Empty and `.` segments are dropped and `..` removes the segment before it.
/// A leading `/` is kept, and `..` cannot climb above it.
pub fn join_key(prefix: &str, name: &str) -> String {
    let rooted = prefix.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();

    for segment in prefix.split('/').chain(name.split('/')) {
        match segment {
            "" | "." => {}
            ".." => match segments.last().copied() {
                Some(last) if last != ".." => {
                    segments.pop();
                }
                _ if rooted => {}
                _ => segments.push(".."),
            },
            _ => segments.push(segment),
        }
    }

    let joined = segments.join("/");
    if rooted {
        format!("/{}", joined)
    } else {
        joined
    }
}
