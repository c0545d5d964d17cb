//! `init`: bootstrap a project from a web manifest URL.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::Args;
use url::Url;

use crate::android::jdk::JdkHelper;
use crate::android::keytool::{CreateKeyOptions, KeyOptions, KeyTool};
use crate::core::fetch::fetch_web_manifest;
use crate::core::manifest::TwaManifest;

use super::input::{
    self, prompt_confirm, prompt_parsed, prompt_password, validate_color,
    validate_package_id_input,
};
use super::{
    build_fetcher, generate_project, generator_app_name, load_or_create_config, target_directory,
    TWA_MANIFEST_FILE_NAME,
};

#[derive(Args)]
pub struct InitArgs {
    /// URL of the web app manifest to wrap
    #[clap(long)]
    pub manifest: String,
    /// Directory to generate the project into. Defaults to the current one
    #[clap(long)]
    pub directory: Option<PathBuf>,
}

pub fn run(args: InitArgs) -> Result<()> {
    let url = Url::parse(&args.manifest)
        .map_err(|_| anyhow::anyhow!("\"{}\" is not a valid URL", args.manifest))?;

    let config = load_or_create_config()?;
    let fetcher = build_fetcher(&config)?;

    log::info!("Fetching Web Manifest {url}");
    let web_manifest = fetch_web_manifest(&fetcher, &url)?;
    let mut manifest = TwaManifest::from_web_manifest_json(&url, &web_manifest);
    manifest.generator_app = generator_app_name();

    edit_interactively(&mut manifest)?;

    if let Err(error) = manifest.validate() {
        bail!("Invalid TWA Manifest: {error}");
    }

    let target_dir = target_directory(args.directory.as_deref())?;
    std::fs::create_dir_all(&target_dir)?;
    let manifest_file = target_dir.join(TWA_MANIFEST_FILE_NAME);
    manifest.save(&manifest_file)?;
    log::info!("Saved the TWA Manifest to {}", manifest_file.display());

    generate_project(&fetcher, &config, &manifest, &manifest_file, &target_dir)?;

    offer_signing_key(&manifest, &target_dir, &config)?;

    log::info!("Project ready. Run `twa-wrap build` inside {} to build it", target_dir.display());
    Ok(())
}

/// Walks the user through the fields that usually need a human decision,
/// prefilled with the values derived from the web manifest.
fn edit_interactively(manifest: &mut TwaManifest) -> Result<()> {
    manifest.name = prompt_parsed("Application name", Some(&manifest.name), |input| {
        crate::core::util::validate_not_empty(input, "name").map(|()| input.to_string())
    })?;

    manifest.launcher_name = prompt_parsed(
        "Launcher name (max 12 characters)",
        Some(&manifest.launcher_name),
        |input| {
            crate::core::util::validate_not_empty(input, "launcherName")?;
            if input.chars().count() > 12 {
                return Err("launcher name must have at most 12 characters".to_string());
            }
            Ok(input.to_string())
        },
    )?;

    manifest.package_id = prompt_parsed(
        "Application package id",
        Some(&manifest.package_id),
        validate_package_id_input,
    )?;

    manifest.theme_color = prompt_parsed(
        "Status bar color",
        Some(&manifest.theme_color.to_hex()),
        validate_color,
    )?;

    manifest.background_color = prompt_parsed(
        "Splash screen background color",
        Some(&manifest.background_color.to_hex()),
        validate_color,
    )?;

    if manifest.icon_url.is_none() {
        let icon_url = prompt_parsed(
            "Icon URL (at least 512x512)",
            None,
            input::validate_image_url,
        )?;
        manifest.icon_url = Some(icon_url.to_string());
    }

    manifest.enable_notifications =
        prompt_confirm("Enable notification delegation?", manifest.enable_notifications)?;

    manifest.signing_key.path = prompt_parsed(
        "Signing key store location",
        Some(&manifest.signing_key.path),
        |input| {
            crate::core::util::validate_not_empty(input, "signing key path")
                .map(|()| input.to_string())
        },
    )?;

    manifest.signing_key.alias = prompt_parsed(
        "Signing key alias",
        Some(&manifest.signing_key.alias),
        |input| {
            crate::core::util::validate_not_empty(input, "signing key alias")
                .map(|()| input.to_string())
        },
    )?;

    Ok(())
}

/// Offers to create the signing key when the configured keystore is missing.
fn offer_signing_key(
    manifest: &TwaManifest,
    target_dir: &Path,
    config: &crate::core::config::ToolConfig,
) -> Result<()> {
    let key_path = target_dir.join(&manifest.signing_key.path);
    if key_path.exists() {
        return Ok(());
    }

    if !prompt_confirm(
        &format!(
            "No signing key found at {}. Create one now?",
            key_path.display()
        ),
        true,
    )? {
        log::warn!("Skipping key creation. The project cannot be signed without one");
        return Ok(());
    }

    let full_name = prompt_parsed("Key: first and last name", None, non_empty)?;
    let organizational_unit = prompt_parsed("Key: organizational unit", None, non_empty)?;
    let organization = prompt_parsed("Key: organization", None, non_empty)?;
    let country = prompt_parsed("Key: two-letter country code", None, |input| {
        if input.chars().count() == 2 {
            Ok(input.to_uppercase())
        } else {
            Err("country code must have exactly 2 letters".to_string())
        }
    })?;
    let password = prompt_password("Key store password")?;
    let keypassword = prompt_password("Key password")?;

    let jdk = JdkHelper::new(config);
    let keytool = KeyTool::new(&jdk);
    keytool.create_signing_key(
        &CreateKeyOptions {
            key: KeyOptions {
                path: &key_path.to_string_lossy(),
                alias: &manifest.signing_key.alias,
                password: &password,
                keypassword: &keypassword,
            },
            full_name: &full_name,
            organizational_unit: &organizational_unit,
            organization: &organization,
            country: &country,
        },
        false,
    )
}

fn non_empty(input: &str) -> Result<String, String> {
    crate::core::util::validate_not_empty(input, "value").map(|()| input.to_string())
}
