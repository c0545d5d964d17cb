//! `update`: bump versions and regenerate the project from the saved
//! manifest.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::core::generator::TwaGenerator;
use crate::core::manifest::TwaManifest;

use super::input::prompt_parsed;
use super::{
    build_fetcher, generate_project, generator_app_name, load_or_create_config, manifest_path,
    target_directory,
};

#[derive(Args)]
pub struct UpdateArgs {
    /// Use this appVersionName instead of deriving one
    #[clap(long)]
    pub app_version_name: Option<String>,
    /// Keep appVersionCode and appVersionName unchanged
    #[clap(long)]
    pub skip_version_upgrade: bool,
    /// Path to the twa-manifest.json. Defaults to ./twa-manifest.json
    #[clap(long)]
    pub manifest: Option<PathBuf>,
    /// Project directory. Defaults to the current one
    #[clap(long)]
    pub directory: Option<PathBuf>,
}

pub fn run(args: UpdateArgs) -> Result<()> {
    let config = load_or_create_config()?;
    let manifest_file = manifest_path(args.manifest.as_deref());
    let target_dir = target_directory(args.directory.as_deref())?;

    let mut manifest = TwaManifest::load(&manifest_file)?;
    manifest.generator_app = generator_app_name();

    if !args.skip_version_upgrade {
        let (version_name, version_code) =
            next_versions(&manifest, args.app_version_name.as_deref())?;
        log::info!("Upgrading to versionName {version_name} / versionCode {version_code}");
        manifest.app_version_name = version_name;
        manifest.app_version_code = version_code;
    }
    manifest.save(&manifest_file)?;

    TwaGenerator::remove_project(&target_dir)?;
    let fetcher = build_fetcher(&config)?;
    generate_project(&fetcher, &config, &manifest, &manifest_file, &target_dir)
}

/// The new version pair: the code always increments; the name comes from the
/// argument, mirrors the code when it previously did, or is prompted for.
fn next_versions(manifest: &TwaManifest, arg: Option<&str>) -> Result<(String, u32)> {
    let previous_code = manifest.app_version_code;
    let code = previous_code + 1;

    if let Some(name) = arg {
        return Ok((name.to_string(), code));
    }

    if manifest.app_version_name == previous_code.to_string() {
        return Ok((code.to_string(), code));
    }

    let name = prompt_parsed("New appVersionName", None, |input| {
        crate::core::util::validate_not_empty(input, "appVersionName").map(|()| input.to_string())
    })?;
    Ok((name, code))
}
