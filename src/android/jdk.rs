//! JDK environment assembly.
//!
//! Builds the environment the Java tools run under: `JAVA_HOME` pointing at
//! the configured JDK and its `bin` directory prepended to `PATH`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::core::config::ToolConfig;

use super::process::current_env;

pub struct JdkHelper {
    jdk_path: PathBuf,
}

impl JdkHelper {
    pub fn new(config: &ToolConfig) -> Self {
        Self {
            jdk_path: config.jdk_path.clone(),
        }
    }

    /// The effective `JAVA_HOME`. macOS JDK archives nest the actual home
    /// under `Contents/Home`.
    pub fn java_home(&self) -> PathBuf {
        if cfg!(target_os = "macos") {
            let nested = self.jdk_path.join("Contents").join("Home");
            if nested.exists() {
                return nested;
            }
        }
        self.jdk_path.clone()
    }

    pub fn java_bin(&self) -> PathBuf {
        self.java_home().join("bin")
    }

    /// The `java` executable itself, used by `doctor` to sanity-check the
    /// configured path.
    pub fn java_executable(&self) -> PathBuf {
        let name = if cfg!(windows) { "java.exe" } else { "java" };
        self.java_bin().join(name)
    }

    /// A copy of the process environment with `JAVA_HOME` and `PATH` set up
    /// for the configured JDK.
    pub fn env(&self) -> HashMap<String, String> {
        let mut env = current_env();
        env.insert(
            "JAVA_HOME".to_string(),
            self.java_home().to_string_lossy().to_string(),
        );
        let path = env.get("PATH").cloned().unwrap_or_default();
        env.insert(
            "PATH".to_string(),
            join_path(&self.java_bin(), &path),
        );
        env
    }
}

fn join_path(prefix: &Path, rest: &str) -> String {
    let separator = if cfg!(windows) { ';' } else { ':' };
    if rest.is_empty() {
        prefix.to_string_lossy().to_string()
    } else {
        format!("{}{separator}{rest}", prefix.to_string_lossy())
    }
}
