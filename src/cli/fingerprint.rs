//! `fingerprint`: maintain the fingerprint list and emit `assetlinks.json`.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::core::assetlinks::generate_asset_links;
use crate::core::manifest::{Fingerprint, TwaManifest};

use super::input::validate_sha256_fingerprint;
use super::{manifest_path, ASSETLINKS_FILE_NAME};

#[derive(Args)]
pub struct FingerprintArgs {
    #[clap(subcommand)]
    pub command: FingerprintCommand,
    /// Path to the twa-manifest.json. Defaults to ./twa-manifest.json
    #[clap(long, global = true)]
    pub manifest: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum FingerprintCommand {
    /// Add a SHA-256 certificate fingerprint
    Add {
        fingerprint: String,
        /// A label for the fingerprint, e.g. "Play signing key"
        #[clap(long)]
        name: Option<String>,
    },
    /// Remove a fingerprint
    Remove { fingerprint: String },
    /// List the stored fingerprints
    List,
    /// Write assetlinks.json for the stored fingerprints
    GenerateAssetLinks {
        /// Output file. Defaults to ./assetlinks.json
        #[clap(long)]
        output: Option<PathBuf>,
    },
}

pub fn run(args: FingerprintArgs) -> Result<()> {
    let manifest_file = manifest_path(args.manifest.as_deref());
    let mut manifest = TwaManifest::load(&manifest_file)?;

    match args.command {
        FingerprintCommand::Add { fingerprint, name } => {
            let value = validate_sha256_fingerprint(&fingerprint)
                .map_err(|error| anyhow::anyhow!(error))?;
            log::info!("Adding fingerprint {value}");
            manifest.fingerprints.push(Fingerprint { name, value });
            manifest.save(&manifest_file)?;
            write_asset_links(&manifest, None)
        }
        FingerprintCommand::Remove { fingerprint } => {
            let before = manifest.fingerprints.len();
            manifest
                .fingerprints
                .retain(|entry| !entry.value.eq_ignore_ascii_case(&fingerprint));
            if manifest.fingerprints.len() == before {
                log::warn!("No stored fingerprint matches {fingerprint}");
            } else {
                log::info!("Removed fingerprint {fingerprint}");
            }
            manifest.save(&manifest_file)?;
            write_asset_links(&manifest, None)
        }
        FingerprintCommand::List => {
            for fingerprint in &manifest.fingerprints {
                println!(
                    "\t{}: {}",
                    fingerprint.name.as_deref().unwrap_or("<unnamed>"),
                    fingerprint.value
                );
            }
            Ok(())
        }
        FingerprintCommand::GenerateAssetLinks { output } => {
            write_asset_links(&manifest, output.as_deref())
        }
    }
}

fn write_asset_links(manifest: &TwaManifest, output: Option<&Path>) -> Result<()> {
    let fingerprints: Vec<&str> = manifest
        .fingerprints
        .iter()
        .map(|fingerprint| fingerprint.value.as_str())
        .collect();
    let contents = generate_asset_links(&manifest.package_id, &fingerprints);
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(ASSETLINKS_FILE_NAME));
    std::fs::write(&output, contents)?;
    log::info!(
        "Digital Asset Links file written to {}. Publish it at \
         https://{}/.well-known/assetlinks.json",
        output.display(),
        manifest.host
    );
    Ok(())
}
