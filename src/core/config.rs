//! Persisted tool configuration.
//!
//! Stores the paths to the external toolchains (JDK, Android SDK) plus a few
//! knobs, as TOML under the user's home directory. The file is created on
//! first use by the CLI prompting for the paths.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::fetch::DEFAULT_FETCH_TIMEOUT_SECS;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const CONFIG_DIR_NAME: &str = ".twa-wrap";
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Environment variable overriding the config file location. Mostly useful
/// for tests and CI.
pub const CONFIG_PATH_ENV: &str = "TWA_WRAP_CONFIG";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolConfig {
    pub jdk_path: PathBuf,
    pub android_sdk_path: PathBuf,
    /// Timeout for every manifest and icon download, in seconds.
    #[serde(default)]
    pub fetch_timeout_secs: Option<u64>,
    /// Overrides the bundled project template.
    #[serde(default)]
    pub template_dir: Option<PathBuf>,
}

impl ToolConfig {
    pub fn new(jdk_path: PathBuf, android_sdk_path: PathBuf) -> Self {
        Self {
            jdk_path,
            android_sdk_path,
            fetch_timeout_secs: None,
            template_dir: None,
        }
    }

    pub fn fetch_timeout_secs(&self) -> u64 {
        self.fetch_timeout_secs.unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS)
    }

    /// Reads the config from `path`. A missing file yields `None`; a
    /// malformed file is an error rather than silently dropping the user's
    /// settings.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).with_context(|| format!("Reading `{}`", path.display()))
            }
        };
        let config = toml::from_str(&contents)
            .with_context(|| format!("Parsing `{}`", path.display()))?;
        Ok(Some(config))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Creating `{}`", parent.display()))?;
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents).with_context(|| format!("Writing `{}`", path.display()))?;
        Ok(())
    }
}

/// The config file location: `$TWA_WRAP_CONFIG` when set, otherwise
/// `~/.twa-wrap/config.toml`.
pub fn config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        return Ok(PathBuf::from(path));
    }
    let home = home_dir().context("Could not determine the home directory")?;
    Ok(home.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

fn home_dir() -> Option<PathBuf> {
    #[cfg(windows)]
    let var = std::env::var("USERPROFILE");
    #[cfg(not(windows))]
    let var = std::env::var("HOME");
    var.ok().map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn with_config_file(content: &str, f: impl Fn(PathBuf)) {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&file_path, content).unwrap();
        f(file_path)
    }

    #[test]
    fn should_load_a_complete_config() {
        with_config_file(
            r#"
                jdk_path = "/opt/jdk-17"
                android_sdk_path = "/opt/android-sdk"
                fetch_timeout_secs = 10
            "#,
            |path| {
                let config = ToolConfig::load(&path).unwrap().unwrap();
                assert_eq!(config.jdk_path, PathBuf::from("/opt/jdk-17"));
                assert_eq!(config.android_sdk_path, PathBuf::from("/opt/android-sdk"));
                assert_eq!(config.fetch_timeout_secs(), 10);
            },
        );
    }

    #[test]
    fn should_default_the_optional_settings() {
        with_config_file(
            r#"
                jdk_path = "/opt/jdk-17"
                android_sdk_path = "/opt/android-sdk"
            "#,
            |path| {
                let config = ToolConfig::load(&path).unwrap().unwrap();
                assert_eq!(config.fetch_timeout_secs(), DEFAULT_FETCH_TIMEOUT_SECS);
                assert!(config.template_dir.is_none());
            },
        );
    }

    #[test]
    fn should_yield_none_for_a_missing_file() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope").join(CONFIG_FILE_NAME);
        assert!(ToolConfig::load(&missing).unwrap().is_none());
    }

    #[test]
    fn should_error_on_a_malformed_file() {
        with_config_file("jdk_path = [not toml", |path| {
            assert!(ToolConfig::load(&path).is_err());
        });
    }

    #[test]
    fn should_round_trip_through_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);
        let config = ToolConfig::new("/opt/jdk".into(), "/opt/sdk".into());
        config.save(&path).unwrap();
        assert_eq!(ToolConfig::load(&path).unwrap(), Some(config));
    }
}
