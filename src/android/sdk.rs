//! Wrapper around the Android SDK build and platform tools.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use crate::core::config::ToolConfig;

use super::jdk::JdkHelper;
use super::process::{execute_file, execute_interactive};

/// The build-tools release the generated project is built and signed with.
pub const BUILD_TOOLS_VERSION: &str = "34.0.0";

pub struct AndroidSdkTools<'a> {
    android_sdk_path: PathBuf,
    jdk: &'a JdkHelper,
}

impl<'a> AndroidSdkTools<'a> {
    pub fn new(config: &ToolConfig, jdk: &'a JdkHelper) -> Self {
        Self {
            android_sdk_path: config.android_sdk_path.clone(),
            jdk,
        }
    }

    pub fn android_home(&self) -> &Path {
        &self.android_sdk_path
    }

    fn build_tools_dir(&self) -> PathBuf {
        self.android_home()
            .join("build-tools")
            .join(BUILD_TOOLS_VERSION)
    }

    fn build_tool(&self, name: &str) -> PathBuf {
        let name = if cfg!(windows) {
            format!("{name}.bat")
        } else {
            name.to_string()
        };
        self.build_tools_dir().join(name)
    }

    /// Whether the expected build-tools release is installed.
    pub fn check_build_tools(&self) -> bool {
        self.build_tools_dir().exists()
    }

    /// The JDK environment extended with `ANDROID_HOME`.
    pub fn env(&self) -> HashMap<String, String> {
        let mut env = self.jdk.env();
        env.insert(
            "ANDROID_HOME".to_string(),
            self.android_home().to_string_lossy().to_string(),
        );
        env
    }

    /// Aligns an APK with `zipalign`.
    pub fn zipalign(&self, input: &Path, output: &Path) -> Result<()> {
        self.ensure_build_tools()?;
        execute_file(
            self.build_tool("zipalign"),
            &[
                "-v",
                "-f",
                "-p",
                "4",
                &input.to_string_lossy(),
                &output.to_string_lossy(),
            ],
            &self.env(),
            None,
        )?;
        Ok(())
    }

    /// Signs an APK with `apksigner` using the configured signing key.
    pub fn apksigner(
        &self,
        keystore: &str,
        keystore_password: &str,
        alias: &str,
        key_password: &str,
        input: &Path,
        output: &Path,
    ) -> Result<()> {
        self.ensure_build_tools()?;
        execute_file(
            self.build_tool("apksigner"),
            &[
                "sign",
                "--ks",
                keystore,
                "--ks-key-alias",
                alias,
                "--ks-pass",
                &format!("pass:{keystore_password}"),
                "--key-pass",
                &format!("pass:{key_password}"),
                "--out",
                &output.to_string_lossy(),
                &input.to_string_lossy(),
            ],
            &self.env(),
            None,
        )?;
        Ok(())
    }

    /// Installs an APK on a connected device via `adb install`.
    pub fn install(&self, apk: &Path) -> Result<()> {
        let adb = self.android_home().join("platform-tools").join(if cfg!(windows) {
            "adb.exe"
        } else {
            "adb"
        });
        if !adb.exists() {
            bail!(
                "adb not found at `{}`. Install the Android SDK platform-tools",
                adb.display()
            );
        }
        execute_interactive(
            adb,
            &["install", "-r", &apk.to_string_lossy()],
            &self.env(),
            None,
        )
    }

    fn ensure_build_tools(&self) -> Result<()> {
        if !self.check_build_tools() {
            bail!(
                "Android SDK build-tools {BUILD_TOOLS_VERSION} not found under `{}`. \
                 Install them with the SDK manager",
                self.build_tools_dir().display()
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_sets_android_home() {
        let config = ToolConfig::new("/opt/jdk".into(), "/opt/android-sdk".into());
        let jdk = JdkHelper::new(&config);
        let sdk = AndroidSdkTools::new(&config, &jdk);
        let env = sdk.env();
        assert_eq!(
            env.get("ANDROID_HOME").map(String::as_str),
            Some("/opt/android-sdk")
        );
        assert_eq!(env.get("JAVA_HOME").map(String::as_str), Some("/opt/jdk"));
    }

    #[test]
    fn missing_build_tools_fail_with_a_named_path() {
        let config = ToolConfig::new("/opt/jdk".into(), "/nonexistent-sdk".into());
        let jdk = JdkHelper::new(&config);
        let sdk = AndroidSdkTools::new(&config, &jdk);
        let err = sdk
            .zipalign(Path::new("in.apk"), Path::new("out.apk"))
            .unwrap_err();
        assert!(err.to_string().contains(BUILD_TOOLS_VERSION));
    }
}
