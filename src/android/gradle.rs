//! Wrapper around the Gradle wrapper scripts of a generated project.

use std::path::{Path, PathBuf};

use anyhow::Result;

use super::process::execute_interactive;
use super::sdk::AndroidSdkTools;

pub struct GradleWrapper<'a> {
    sdk: &'a AndroidSdkTools<'a>,
    project_dir: PathBuf,
}

impl<'a> GradleWrapper<'a> {
    pub fn new(sdk: &'a AndroidSdkTools<'a>, project_dir: &Path) -> Self {
        Self {
            sdk,
            project_dir: project_dir.to_path_buf(),
        }
    }

    fn gradle_cmd(&self) -> PathBuf {
        if cfg!(windows) {
            self.project_dir.join("gradlew.bat")
        } else {
            self.project_dir.join("gradlew")
        }
    }

    /// Builds the release APK (`gradlew assembleRelease`).
    pub fn assemble_release(&self) -> Result<()> {
        self.execute_gradle_command(&["assembleRelease", "--stacktrace"])
    }

    /// Builds the release App Bundle (`gradlew bundleRelease`).
    pub fn bundle_release(&self) -> Result<()> {
        self.execute_gradle_command(&["bundleRelease", "--stacktrace"])
    }

    fn execute_gradle_command(&self, args: &[&str]) -> Result<()> {
        execute_interactive(
            self.gradle_cmd(),
            args,
            &self.sdk.env(),
            Some(&self.project_dir),
        )
    }
}
