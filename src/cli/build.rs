//! `build`: compile, align and sign the generated project.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;

use crate::android::gradle::GradleWrapper;
use crate::android::jdk::JdkHelper;
use crate::android::keytool::{KeyOptions, KeyTool};
use crate::android::sdk::AndroidSdkTools;
use crate::core::assetlinks::generate_asset_links;
use crate::core::checksum::project_is_stale;
use crate::core::generator::TwaGenerator;
use crate::core::manifest::{SigningKeyInfo, TwaManifest};

use super::input::{prompt_confirm, prompt_password};
use super::{
    build_fetcher, generate_project, load_or_create_config, manifest_path, target_directory,
    ASSETLINKS_FILE_NAME,
};

// Where Gradle leaves the unsigned release artifacts.
const APK_BUILD_OUTPUT: &str = "app/build/outputs/apk/release/app-release-unsigned.apk";
const AAB_BUILD_OUTPUT: &str = "app/build/outputs/bundle/release/app-release.aab";
const APK_ALIGNED: &str = "app-release-unsigned-aligned.apk";
const APK_SIGNED: &str = "app-release-signed.apk";

/// Passwords can be supplied through the environment for unattended builds.
const KEYSTORE_PASSWORD_ENV: &str = "TWA_WRAP_KEYSTORE_PASSWORD";
const KEY_PASSWORD_ENV: &str = "TWA_WRAP_KEY_PASSWORD";

#[derive(Args)]
pub struct BuildArgs {
    /// Build the APK without signing it
    #[clap(long)]
    pub skip_signing: bool,
    /// Also build an Android App Bundle for Play distribution
    #[clap(long)]
    pub app_bundle: bool,
    /// Path to the twa-manifest.json. Defaults to ./twa-manifest.json
    #[clap(long)]
    pub manifest: Option<PathBuf>,
    /// Project directory. Defaults to the current one
    #[clap(long)]
    pub directory: Option<PathBuf>,
}

struct SigningKeyPasswords {
    keystore_password: String,
    key_password: String,
}

pub fn run(args: BuildArgs) -> Result<()> {
    let config = load_or_create_config()?;
    let manifest_file = manifest_path(args.manifest.as_deref());
    let target_dir = target_directory(args.directory.as_deref())?;
    let manifest = TwaManifest::load(&manifest_file)?;

    regenerate_if_stale(&config, &manifest, &manifest_file, &target_dir)?;

    let jdk = JdkHelper::new(&config);
    let sdk = AndroidSdkTools::new(&config, &jdk);
    if !sdk.check_build_tools() {
        bail!(
            "Android SDK build-tools not found under `{}`. Install them with the SDK manager",
            sdk.android_home().display()
        );
    }

    log::info!("Building the Android project...");
    let gradle = GradleWrapper::new(&sdk, &target_dir);
    gradle.assemble_release()?;

    if args.app_bundle {
        gradle.bundle_release()?;
        log::info!(
            "App Bundle at {}. Play App Signing signs it on upload",
            target_dir.join(AAB_BUILD_OUTPUT).display()
        );
    }

    let unsigned_apk = target_dir.join(APK_BUILD_OUTPUT);
    if args.skip_signing {
        log::info!("Signing skipped. Unsigned APK at {}", unsigned_apk.display());
        return Ok(());
    }

    let passwords = get_passwords(&manifest.signing_key)?;

    let aligned_apk = target_dir.join(APK_ALIGNED);
    let signed_apk = target_dir.join(APK_SIGNED);
    sdk.zipalign(&unsigned_apk, &aligned_apk)?;
    sdk.apksigner(
        &manifest.signing_key.path,
        &passwords.keystore_password,
        &manifest.signing_key.alias,
        &passwords.key_password,
        &aligned_apk,
        &signed_apk,
    )?;
    log::info!("Signed APK at {}", signed_apk.display());

    write_asset_links(&jdk, &manifest, &passwords, &target_dir);
    Ok(())
}

/// Warns when the manifest changed since the project was generated and
/// offers to regenerate before building.
fn regenerate_if_stale(
    config: &crate::core::config::ToolConfig,
    manifest: &TwaManifest,
    manifest_file: &Path,
    target_dir: &Path,
) -> Result<()> {
    if !project_is_stale(manifest_file, target_dir)? {
        return Ok(());
    }
    if !prompt_confirm(
        "The manifest changed since the project was generated. Regenerate it now?",
        true,
    )? {
        log::warn!("Building against a stale project");
        return Ok(());
    }

    TwaGenerator::remove_project(target_dir)?;
    let fetcher = build_fetcher(config)?;
    generate_project(&fetcher, config, manifest, manifest_file, target_dir)
}

fn get_passwords(signing_key: &SigningKeyInfo) -> Result<SigningKeyPasswords> {
    let env_keystore = std::env::var(KEYSTORE_PASSWORD_ENV).ok();
    let env_key = std::env::var(KEY_PASSWORD_ENV).ok();
    if let (Some(keystore_password), Some(key_password)) = (env_keystore, env_key) {
        log::info!("Using signing key passwords from the environment");
        return Ok(SigningKeyPasswords {
            keystore_password,
            key_password,
        });
    }

    log::info!(
        "Signing with key \"{}\" from {}",
        signing_key.alias,
        signing_key.path
    );
    Ok(SigningKeyPasswords {
        keystore_password: prompt_password("Key store password")?,
        key_password: prompt_password("Key password")?,
    })
}

/// Generates `assetlinks.json` from the signing key's SHA-256 fingerprint.
/// Failure is logged but never fails the build: the APK is already signed.
fn write_asset_links(
    jdk: &JdkHelper,
    manifest: &TwaManifest,
    passwords: &SigningKeyPasswords,
    target_dir: &Path,
) {
    let result = (|| -> Result<PathBuf> {
        let keytool = KeyTool::new(jdk);
        let key_info = keytool.key_info(&KeyOptions {
            path: &manifest.signing_key.path,
            alias: &manifest.signing_key.alias,
            password: &passwords.keystore_password,
            keypassword: &passwords.key_password,
        })?;
        let sha256 = key_info
            .sha256()
            .context("keytool output has no SHA256 fingerprint")?;
        let contents = generate_asset_links(&manifest.package_id, &[sha256]);
        let output = target_dir.join(ASSETLINKS_FILE_NAME);
        std::fs::write(&output, contents)?;
        Ok(output)
    })();

    match result {
        Ok(output) => log::info!(
            "Digital Asset Links file written to {}. Publish it at \
             https://{}/.well-known/assetlinks.json",
            output.display(),
            manifest.host
        ),
        Err(error) => log::warn!("Failed to generate the Digital Asset Links file: {error:#}"),
    }
}
