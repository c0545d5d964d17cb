//! `validate`: check the saved manifest without generating anything.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;

use crate::core::manifest::TwaManifest;
use crate::core::util::validate_package_id;

use super::manifest_path;

#[derive(Args)]
pub struct ValidateArgs {
    /// Path to the twa-manifest.json. Defaults to ./twa-manifest.json
    #[clap(long)]
    pub manifest: Option<PathBuf>,
}

pub fn run(args: ValidateArgs) -> Result<()> {
    let manifest_file = manifest_path(args.manifest.as_deref());
    let manifest = TwaManifest::load(&manifest_file)?;

    if let Err(error) = manifest.validate() {
        bail!("`{}` is invalid: {error}", manifest_file.display());
    }
    if let Err(error) = validate_package_id(&manifest.package_id) {
        bail!("`{}` is invalid: {error}", manifest_file.display());
    }

    log::info!("`{}` is a valid TWA Manifest", manifest_file.display());
    Ok(())
}
