//! Change detection between `twa-manifest.json` and a generated project.
//!
//! The checksum side-file is a heuristic used to warn the user that the
//! project is stale and should be regenerated; it is not a correctness
//! guarantee.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

pub const CHECKSUM_FILE_NAME: &str = "manifest-checksum.txt";

pub fn compute_checksum(data: &[u8]) -> String {
    let digest = Sha256::digest(data);
    digest.iter().map(|byte| format!("{byte:02x}")).collect()
}

/// Records the checksum of the manifest the project was last generated from.
pub fn write_checksum_file(manifest_path: &Path, target_dir: &Path) -> Result<()> {
    let contents = fs::read(manifest_path)
        .with_context(|| format!("Reading `{}`", manifest_path.display()))?;
    let checksum_file = target_dir.join(CHECKSUM_FILE_NAME);
    fs::write(&checksum_file, compute_checksum(&contents))
        .with_context(|| format!("Writing `{}`", checksum_file.display()))?;
    Ok(())
}

/// Whether the manifest changed since the project was last generated. A
/// missing checksum file counts as stale.
pub fn project_is_stale(manifest_path: &Path, target_dir: &Path) -> Result<bool> {
    let checksum_file = target_dir.join(CHECKSUM_FILE_NAME);
    let recorded = match fs::read_to_string(&checksum_file) {
        Ok(recorded) => recorded,
        Err(_) => return Ok(true),
    };
    let contents = fs::read(manifest_path)
        .with_context(|| format!("Reading `{}`", manifest_path.display()))?;
    Ok(recorded.trim() != compute_checksum(&contents))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn checksums_are_stable_and_content_sensitive() {
        assert_eq!(compute_checksum(b"abc"), compute_checksum(b"abc"));
        assert_ne!(compute_checksum(b"abc"), compute_checksum(b"abd"));
    }

    #[test]
    fn detects_a_changed_manifest() {
        let dir = tempdir().unwrap();
        let manifest_path = dir.path().join("twa-manifest.json");
        fs::write(&manifest_path, b"{\"name\":\"a\"}").unwrap();

        // No checksum file yet: stale.
        assert!(project_is_stale(&manifest_path, dir.path()).unwrap());

        write_checksum_file(&manifest_path, dir.path()).unwrap();
        assert!(!project_is_stale(&manifest_path, dir.path()).unwrap());

        fs::write(&manifest_path, b"{\"name\":\"b\"}").unwrap();
        assert!(project_is_stale(&manifest_path, dir.path()).unwrap());
    }
}
