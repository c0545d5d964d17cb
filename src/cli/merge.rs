//! `merge`: refresh the saved manifest from a re-fetched web manifest.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;

use crate::core::fetch::fetch_web_manifest;
use crate::core::manifest::TwaManifest;

use super::{build_fetcher, load_or_create_config, manifest_path};

#[derive(Args)]
pub struct MergeArgs {
    /// Web manifest fields to keep unchanged (e.g. --ignore name --ignore icons)
    #[clap(long)]
    pub ignore: Vec<String>,
    /// Path to the twa-manifest.json. Defaults to ./twa-manifest.json
    #[clap(long)]
    pub manifest: Option<PathBuf>,
}

pub fn run(args: MergeArgs) -> Result<()> {
    let config = load_or_create_config()?;
    let manifest_file = manifest_path(args.manifest.as_deref());
    let old = TwaManifest::load(&manifest_file)?;

    let Some(url) = old.web_manifest_url.clone() else {
        bail!(
            "`{}` has no webManifestUrl. Re-run `twa-wrap init` to link it to a web manifest",
            manifest_file.display()
        );
    };

    let fetcher = build_fetcher(&config)?;
    log::info!("Fetching Web Manifest {url}");
    let web_manifest = fetch_web_manifest(&fetcher, &url)?;

    let fields_to_ignore: Vec<&str> = args.ignore.iter().map(String::as_str).collect();
    let merged = TwaManifest::merge(&fields_to_ignore, &url, &web_manifest, &old);
    merged.save(&manifest_file)?;
    log::info!("Merged the web manifest into {}", manifest_file.display());
    log::info!("Run `twa-wrap update` to regenerate the project with the new values");
    Ok(())
}
