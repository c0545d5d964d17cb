//! `doctor`: sanity-check the configured toolchain paths.

use anyhow::{bail, Result};

use crate::android::jdk::JdkHelper;
use crate::android::sdk::{AndroidSdkTools, BUILD_TOOLS_VERSION};
use crate::core::config::{config_path, ToolConfig};

pub fn run() -> Result<()> {
    let path = config_path()?;
    let Some(config) = ToolConfig::load(&path)? else {
        bail!(
            "No config found at {}. Run any command that needs the toolchain to create it",
            path.display()
        );
    };

    let mut problems = 0;
    let mut check = |ok: bool, label: &str, detail: String| {
        if ok {
            log::info!("✅ {label}: {detail}");
        } else {
            log::error!("❌ {label}: {detail}");
            problems += 1;
        }
    };

    let jdk = JdkHelper::new(&config);
    let java = jdk.java_executable();
    check(
        java.exists(),
        "JDK",
        format!("java executable at {}", java.display()),
    );

    let sdk = AndroidSdkTools::new(&config, &jdk);
    check(
        sdk.android_home().is_dir(),
        "Android SDK",
        format!("SDK root at {}", sdk.android_home().display()),
    );
    check(
        sdk.check_build_tools(),
        "Build tools",
        format!(
            "build-tools {BUILD_TOOLS_VERSION} under {}",
            sdk.android_home().display()
        ),
    );

    if problems > 0 {
        bail!("{problems} problem(s) found. Fix the paths in {}", path.display());
    }
    log::info!("Everything looks good");
    Ok(())
}
