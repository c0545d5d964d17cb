//! The CLI subcommands and their shared plumbing.

pub mod build;
pub mod doctor;
pub mod fingerprint;
pub mod init;
pub mod input;
pub mod install;
pub mod merge;
pub mod update;
pub mod validate;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::core::checksum::write_checksum_file;
use crate::core::config::{config_path, ToolConfig};
use crate::core::fetch::HttpFetcher;
use crate::core::generator::TwaGenerator;
use crate::core::manifest::TwaManifest;

pub const TWA_MANIFEST_FILE_NAME: &str = "twa-manifest.json";
pub const ASSETLINKS_FILE_NAME: &str = "assetlinks.json";

/// Environment variable overriding the bundled project template directory.
pub const TEMPLATE_DIR_ENV: &str = "TWA_WRAP_TEMPLATE_DIR";

/// The name recorded as `generatorApp` in manifests this tool touches.
pub fn generator_app_name() -> String {
    format!("twa-wrap/{}", crate::core::config::VERSION)
}

pub fn manifest_path(arg: Option<&Path>) -> PathBuf {
    arg.map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(TWA_MANIFEST_FILE_NAME))
}

pub fn target_directory(arg: Option<&Path>) -> Result<PathBuf> {
    match arg {
        Some(dir) => Ok(dir.to_path_buf()),
        None => std::env::current_dir().context("Could not determine the current directory"),
    }
}

/// Loads the tool config, prompting for the toolchain paths on first use.
pub fn load_or_create_config() -> Result<ToolConfig> {
    let path = config_path()?;
    if let Some(config) = ToolConfig::load(&path)? {
        return Ok(config);
    }

    log::info!("No config found. Creating one at {}", path.display());
    let jdk_path: PathBuf = input::prompt_parsed("Path to the JDK", None, |input| {
        let path = PathBuf::from(input);
        if path.is_dir() {
            Ok(path)
        } else {
            Err(format!("\"{input}\" is not a directory"))
        }
    })?;
    let android_sdk_path: PathBuf =
        input::prompt_parsed("Path to the Android SDK", None, |input| {
            let path = PathBuf::from(input);
            if path.is_dir() {
                Ok(path)
            } else {
                Err(format!("\"{input}\" is not a directory"))
            }
        })?;

    let config = ToolConfig::new(jdk_path, android_sdk_path);
    config.save(&path)?;
    Ok(config)
}

/// The project template shipped with the tool. Resolution order: the config
/// override, `$TWA_WRAP_TEMPLATE_DIR`, `template-project` next to the
/// executable, and finally the source checkout (for `cargo run`).
pub fn resolve_template_dir(config: &ToolConfig) -> Result<PathBuf> {
    if let Some(dir) = &config.template_dir {
        return Ok(dir.clone());
    }
    if let Ok(dir) = std::env::var(TEMPLATE_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let candidate = dir.join("template-project");
            if candidate.is_dir() {
                return Ok(candidate);
            }
        }
    }
    let checkout = Path::new(env!("CARGO_MANIFEST_DIR")).join("template-project");
    if checkout.is_dir() {
        return Ok(checkout);
    }
    bail!(
        "Could not locate the project template. Set `template_dir` in the config \
         or the {TEMPLATE_DIR_ENV} environment variable"
    );
}

pub fn build_fetcher(config: &ToolConfig) -> Result<HttpFetcher> {
    HttpFetcher::new(Duration::from_secs(config.fetch_timeout_secs()))
}

/// Generates the project and records the manifest checksum alongside it.
pub fn generate_project(
    fetcher: &HttpFetcher,
    config: &ToolConfig,
    manifest: &TwaManifest,
    manifest_file: &Path,
    target_dir: &Path,
) -> Result<()> {
    let template_dir = resolve_template_dir(config)?;
    log::info!("Generating the Android project...");
    let generator = TwaGenerator::new(fetcher);
    generator.create_project(manifest, &template_dir, target_dir)?;
    write_checksum_file(manifest_file, target_dir)?;
    let display_dir =
        dunce::canonicalize(target_dir).unwrap_or_else(|_| target_dir.to_path_buf());
    log::info!("Project generated at {}", display_dir.display());
    Ok(())
}
