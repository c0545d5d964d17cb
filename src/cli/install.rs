//! `install`: push the signed APK to a connected device.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;

use crate::android::jdk::JdkHelper;
use crate::android::sdk::AndroidSdkTools;

use super::load_or_create_config;

const DEFAULT_APK: &str = "app-release-signed.apk";

#[derive(Args)]
pub struct InstallArgs {
    /// APK to install. Defaults to ./app-release-signed.apk
    #[clap(long)]
    pub apk: Option<PathBuf>,
}

pub fn run(args: InstallArgs) -> Result<()> {
    let config = load_or_create_config()?;
    let apk = args.apk.unwrap_or_else(|| PathBuf::from(DEFAULT_APK));
    if !apk.exists() {
        bail!(
            "`{}` not found. Run `twa-wrap build` first or pass --apk",
            apk.display()
        );
    }

    let jdk = JdkHelper::new(&config);
    let sdk = AndroidSdkTools::new(&config, &jdk);
    log::info!("Installing {}", apk.display());
    sdk.install(&apk)
}
