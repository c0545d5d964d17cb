//! Generation of the Android project from a canonical manifest.
//!
//! The generator copies a static template tree, runs `${field}` substitution
//! over the build file, the Android manifest and the Java sources, and
//! renders the icon assets into every required density bucket. Re-running
//! with an unchanged manifest produces byte-identical output.

pub mod features;
pub mod template;

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::Value;

use super::fetch::{fetch_json, Fetch};
use super::images::Icon;
use super::manifest::shortcut::ShortcutInfo;
use super::manifest::TwaManifest;
use super::util::{escape_gradle_string, escape_json_string};
use features::FeatureManager;
use template::{render, TemplateContext};

/// Files copied verbatim from the template directory.
const COPY_FILE_LIST: &[&str] = &[
    "settings.gradle",
    "gradle.properties",
    "build.gradle",
    "gradlew",
    "gradlew.bat",
    "gradle/wrapper/gradle-wrapper.properties",
    "app/src/main/res/values/colors.xml",
    "app/src/main/res/xml/filepaths.xml",
    "app/src/main/res/xml/shortcuts.xml",
    "app/src/main/res/mipmap-anydpi-v26/ic_launcher.xml",
    "app/src/main/res/drawable-anydpi/shortcut_legacy_background.xml",
];

/// Files run through `${field}` substitution.
const TEMPLATE_FILE_LIST: &[&str] = &["app/build.gradle", "app/src/main/AndroidManifest.xml"];

const JAVA_DIR: &str = "app/src/main/java";

/// Java sources templated into the application's package directory.
const JAVA_FILE_LIST: &[&str] = &[
    "LauncherActivity.java",
    "Application.java",
    "DelegationService.java",
];

/// Entries excluded from the copy when the manifest has no maskable icon.
const MASKABLE_ONLY_FILE_LIST: &[&str] = &["app/src/main/res/mipmap-anydpi-v26/ic_launcher.xml"];

/// Everything `create_project` may have written, removed on rollback.
const DELETE_PROJECT_FILE_LIST: &[&str] = &[
    "settings.gradle",
    "gradle.properties",
    "build.gradle",
    "gradlew",
    "gradlew.bat",
    "store_icon.png",
    "gradle",
    "app",
];

struct IconDefinition {
    dest: &'static str,
    size: u32,
}

const LAUNCHER_IMAGES: &[IconDefinition] = &[
    IconDefinition { dest: "app/src/main/res/mipmap-mdpi/ic_launcher.png", size: 48 },
    IconDefinition { dest: "app/src/main/res/mipmap-hdpi/ic_launcher.png", size: 72 },
    IconDefinition { dest: "app/src/main/res/mipmap-xhdpi/ic_launcher.png", size: 96 },
    IconDefinition { dest: "app/src/main/res/mipmap-xxhdpi/ic_launcher.png", size: 144 },
    IconDefinition { dest: "app/src/main/res/mipmap-xxxhdpi/ic_launcher.png", size: 192 },
    IconDefinition { dest: "store_icon.png", size: 512 },
];

const SPLASH_IMAGES: &[IconDefinition] = &[
    IconDefinition { dest: "app/src/main/res/drawable-mdpi/splash.png", size: 300 },
    IconDefinition { dest: "app/src/main/res/drawable-hdpi/splash.png", size: 450 },
    IconDefinition { dest: "app/src/main/res/drawable-xhdpi/splash.png", size: 600 },
    IconDefinition { dest: "app/src/main/res/drawable-xxhdpi/splash.png", size: 900 },
    IconDefinition { dest: "app/src/main/res/drawable-xxxhdpi/splash.png", size: 1200 },
];

const ADAPTIVE_IMAGES: &[IconDefinition] = &[
    IconDefinition { dest: "app/src/main/res/mipmap-mdpi/ic_maskable.png", size: 82 },
    IconDefinition { dest: "app/src/main/res/mipmap-hdpi/ic_maskable.png", size: 123 },
    IconDefinition { dest: "app/src/main/res/mipmap-xhdpi/ic_maskable.png", size: 164 },
    IconDefinition { dest: "app/src/main/res/mipmap-xxhdpi/ic_maskable.png", size: 246 },
    IconDefinition { dest: "app/src/main/res/mipmap-xxxhdpi/ic_maskable.png", size: 328 },
];

const NOTIFICATION_IMAGES: &[IconDefinition] = &[
    IconDefinition { dest: "app/src/main/res/drawable-mdpi/ic_notification_icon.png", size: 24 },
    IconDefinition { dest: "app/src/main/res/drawable-hdpi/ic_notification_icon.png", size: 36 },
    IconDefinition { dest: "app/src/main/res/drawable-xhdpi/ic_notification_icon.png", size: 48 },
    IconDefinition { dest: "app/src/main/res/drawable-xxhdpi/ic_notification_icon.png", size: 72 },
    IconDefinition { dest: "app/src/main/res/drawable-xxxhdpi/ic_notification_icon.png", size: 96 },
];

/// The drawable buckets generated for one shortcut asset.
fn shortcut_images(asset_name: &str) -> Vec<(String, u32)> {
    [
        ("mdpi", 48),
        ("hdpi", 72),
        ("xhdpi", 96),
        ("xxhdpi", 144),
        ("xxxhdpi", 192),
    ]
    .into_iter()
    .map(|(density, size)| {
        (
            format!("app/src/main/res/drawable-{density}/{asset_name}.png"),
            size,
        )
    })
    .collect()
}

const WEB_MANIFEST_LOCATION: &str = "app/src/main/res/raw/web_app_manifest.json";

/// Generates TWA projects from a canonical manifest.
pub struct TwaGenerator<'a> {
    fetcher: &'a dyn Fetch,
}

impl<'a> TwaGenerator<'a> {
    pub fn new(fetcher: &'a dyn Fetch) -> Self {
        Self { fetcher }
    }

    /// Creates the Android project for `manifest` under `target_dir`.
    ///
    /// The manifest is validated before anything is written; a manifest
    /// missing a mandatory field fails fast without partial generation.
    pub fn create_project(
        &self,
        manifest: &TwaManifest,
        template_dir: &Path,
        target_dir: &Path,
    ) -> Result<()> {
        if let Err(error) = manifest.validate() {
            bail!("Invalid TWA Manifest: {error}");
        }

        let aggregate = FeatureManager::new(manifest);
        let context = template_context(manifest, &aggregate);

        self.copy_static_files(manifest, template_dir, target_dir)?;
        set_executable(&target_dir.join("gradlew"))?;

        for file in TEMPLATE_FILE_LIST {
            apply_template(
                &template_dir.join(file),
                &target_dir.join(file),
                &context,
            )?;
        }
        self.apply_java_templates(manifest, template_dir, target_dir, &context)?;

        if let Some(icon_url) = &manifest.icon_url {
            let icon = Icon::fetch(self.fetcher, icon_url)?;
            for def in LAUNCHER_IMAGES {
                icon.write_png(target_dir, def.dest, def.size, None)?;
            }
            for def in SPLASH_IMAGES {
                icon.write_png(target_dir, def.dest, def.size, Some(manifest.background_color))?;
            }
        }

        self.generate_shortcut_assets(manifest, template_dir, target_dir)?;

        if let Some(maskable_icon_url) = &manifest.maskable_icon_url {
            let icon = Icon::fetch(self.fetcher, maskable_icon_url)?;
            for def in ADAPTIVE_IMAGES {
                icon.write_png(target_dir, def.dest, def.size, None)?;
            }
        }

        if let Some(monochrome_icon_url) = &manifest.monochrome_icon_url {
            let icon = Icon::fetch(self.fetcher, monochrome_icon_url)?;
            let tinted = icon.tinted(manifest.theme_color);
            for def in NOTIFICATION_IMAGES {
                tinted.write_png(target_dir, def.dest, def.size, None)?;
            }
        }

        if manifest.web_manifest_url.is_some() {
            self.write_web_manifest(manifest, target_dir)?;
        }

        Ok(())
    }

    /// Removes everything a previous `create_project` run wrote. Manual
    /// rollback; generation itself never cleans up partial output.
    pub fn remove_project(target_dir: &Path) -> Result<()> {
        for entry in DELETE_PROJECT_FILE_LIST {
            let path = target_dir.join(entry);
            if !path.exists() {
                continue;
            }
            if path.is_dir() {
                fs::remove_dir_all(&path)
                    .with_context(|| format!("Removing `{}`", path.display()))?;
            } else {
                fs::remove_file(&path)
                    .with_context(|| format!("Removing `{}`", path.display()))?;
            }
        }
        Ok(())
    }

    fn copy_static_files(
        &self,
        manifest: &TwaManifest,
        template_dir: &Path,
        target_dir: &Path,
    ) -> Result<()> {
        for file in COPY_FILE_LIST {
            if manifest.maskable_icon_url.is_none() && MASKABLE_ONLY_FILE_LIST.contains(file) {
                continue;
            }
            let source = template_dir.join(file);
            let dest = target_dir.join(file);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Creating `{}`", parent.display()))?;
            }
            fs::copy(&source, &dest)
                .with_context(|| format!("Copying `{}`", source.display()))?;
        }
        Ok(())
    }

    fn apply_java_templates(
        &self,
        manifest: &TwaManifest,
        template_dir: &Path,
        target_dir: &Path,
        context: &TemplateContext,
    ) -> Result<()> {
        let package_path: Vec<&str> = manifest.package_id.split('.').collect();
        let mut dest_dir = target_dir.join(JAVA_DIR);
        for segment in package_path {
            dest_dir = dest_dir.join(segment);
        }
        for file in JAVA_FILE_LIST {
            apply_template(
                &template_dir.join(JAVA_DIR).join(file),
                &dest_dir.join(file),
                context,
            )?;
        }
        Ok(())
    }

    fn generate_shortcut_assets(
        &self,
        manifest: &TwaManifest,
        template_dir: &Path,
        target_dir: &Path,
    ) -> Result<()> {
        for (i, shortcut) in manifest.shortcuts.iter().enumerate() {
            let asset_name = ShortcutInfo::asset_name(i);
            let monochrome_asset_name = format!("{asset_name}_monochrome");
            let maskable_asset_name = format!("{asset_name}_maskable");

            let mut context = TemplateContext::new();
            context.insert("assetName", asset_name.clone());
            context.insert("monochromeAssetName", monochrome_asset_name.clone());
            context.insert("maskableAssetName", maskable_asset_name.clone());

            // Monochrome icons work on every API level on their own.
            if let Some(url) = &shortcut.chosen_monochrome_icon_url {
                for source in [
                    "app/src/main/res/drawable-anydpi/shortcut_monochrome.xml",
                    "app/src/main/res/drawable-anydpi-v26/shortcut_monochrome.xml",
                ] {
                    let dest = source.replace("shortcut_monochrome", &asset_name);
                    apply_template(&template_dir.join(source), &target_dir.join(dest), &context)?;
                }

                let icon = Icon::fetch(self.fetcher, url)?;
                let tinted = icon.tinted(manifest.theme_color);
                for (dest, size) in shortcut_images(&monochrome_asset_name) {
                    tinted.write_png(target_dir, &dest, size, None)?;
                }
                continue;
            }

            let Some(icon_url) = &shortcut.chosen_icon_url else {
                bail!(
                    "Shortcut {} is missing both an icon and a monochrome icon",
                    shortcut.name
                );
            };

            if let Some(maskable_url) = &shortcut.chosen_maskable_icon_url {
                let source = "app/src/main/res/drawable-anydpi-v26/shortcut_maskable.xml";
                let dest = source.replace("shortcut_maskable", &asset_name);
                apply_template(&template_dir.join(source), &target_dir.join(dest), &context)?;

                let maskable = Icon::fetch(self.fetcher, maskable_url)?;
                for (dest, size) in shortcut_images(&maskable_asset_name) {
                    maskable.write_png(target_dir, &dest, size, None)?;
                }
            }

            let icon = Icon::fetch(self.fetcher, icon_url)?;
            for (dest, size) in shortcut_images(&asset_name) {
                icon.write_png(target_dir, &dest, size, None)?;
            }
        }
        Ok(())
    }

    /// Embeds the raw web manifest as a runtime resource, with `start_url`
    /// pinned to the URL the TWA actually launches.
    fn write_web_manifest(&self, manifest: &TwaManifest, target_dir: &Path) -> Result<()> {
        let url = manifest
            .web_manifest_url
            .as_ref()
            .context("The TWA Manifest does not have a webManifestUrl")?;

        let mut web_manifest: Value = fetch_json(self.fetcher, url)?;
        if let Some(object) = web_manifest.as_object_mut() {
            object.insert(
                "start_url".to_string(),
                Value::String(manifest.start_url.clone()),
            );
        }

        let dest = target_dir.join(WEB_MANIFEST_LOCATION);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Creating `{}`", parent.display()))?;
        }
        fs::write(&dest, serde_json::to_string(&web_manifest)?)
            .with_context(|| format!("Writing `{}`", dest.display()))?;
        Ok(())
    }
}

fn apply_template(source: &Path, dest: &Path, context: &TemplateContext) -> Result<()> {
    let input = fs::read_to_string(source)
        .with_context(|| format!("Reading template `{}`", source.display()))?;
    let output = render(&input, context)
        .with_context(|| format!("Rendering template `{}`", source.display()))?;
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).with_context(|| format!("Creating `{}`", parent.display()))?;
    }
    fs::write(dest, output).with_context(|| format!("Writing `{}`", dest.display()))?;
    Ok(())
}

#[cfg(unix)]
fn set_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
        .with_context(|| format!("Setting permissions on `{}`", path.display()))
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> Result<()> {
    Ok(())
}

/// The substitution values for the templated files: the manifest fields under
/// their persisted camelCase names plus the feature aggregate blocks.
fn template_context(manifest: &TwaManifest, aggregate: &FeatureManager) -> TemplateContext {
    let mut context = TemplateContext::new();
    context.insert("packageId", manifest.package_id.clone());
    context.insert("host", manifest.host.clone());
    context.insert("name", escape_gradle_string(&manifest.name));
    context.insert(
        "launcherName",
        escape_gradle_string(&manifest.launcher_name),
    );
    context.insert("display", manifest.display.to_string());
    context.insert("themeColor", manifest.theme_color.to_hex());
    context.insert("navigationColor", manifest.navigation_color.to_hex());
    context.insert("backgroundColor", manifest.background_color.to_hex());
    context.insert("startUrl", manifest.start_url.clone());
    context.insert("launchUrl", manifest.launch_url());
    context.insert("appVersionCode", manifest.app_version_code.to_string());
    context.insert("appVersionName", manifest.app_version_name.clone());
    context.insert(
        "splashScreenFadeOutDuration",
        manifest.splash_screen_fade_out_duration.to_string(),
    );
    context.insert("generatorApp", manifest.generator_app.clone());
    context.insert("fallbackType", manifest.fallback_type.to_string());
    context.insert(
        "enableNotifications",
        manifest.enable_notifications.to_string(),
    );
    context.insert("orientation", manifest.orientation.to_string());
    context.insert(
        "androidOrientation",
        manifest
            .orientation
            .to_android_screen_orientation()
            .to_string(),
    );
    context.insert(
        "shortcuts",
        escape_gradle_string(&manifest.generate_shortcuts()),
    );
    context.insert(
        "webManifestUrl",
        manifest
            .web_manifest_url
            .as_ref()
            .map(|url| url.to_string())
            .unwrap_or_default(),
    );
    context.insert("assetStatements", escape_json_string(&asset_statements(manifest)));

    for (name, value) in aggregate.template_fields() {
        context.insert(name, value);
    }
    context
}

/// The `asset_statements` string resource linking the app to its site.
fn asset_statements(manifest: &TwaManifest) -> String {
    format!(
        r#"[{{ "relation": ["delegate_permission/common.handle_all_urls"], "target": {{ "namespace": "web", "site": "https://{}" }} }}]"#,
        manifest.host
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortcut_image_paths_follow_the_asset_name() {
        let images = shortcut_images("shortcut_2");
        assert_eq!(images.len(), 5);
        assert_eq!(
            images[0].0,
            "app/src/main/res/drawable-mdpi/shortcut_2.png"
        );
        assert_eq!(images[0].1, 48);
        assert_eq!(
            images[4].0,
            "app/src/main/res/drawable-xxxhdpi/shortcut_2.png"
        );
        assert_eq!(images[4].1, 192);
    }

    #[test]
    fn template_context_covers_the_manifest_fields() {
        let manifest = TwaManifest {
            package_id: "com.example.twa".to_string(),
            host: "example.com".to_string(),
            name: "Andre's App".to_string(),
            start_url: "/app".to_string(),
            icon_url: Some("https://example.com/icon.png".to_string()),
            ..Default::default()
        };
        let aggregate = FeatureManager::new(&manifest);
        let context = template_context(&manifest, &aggregate);

        assert_eq!(context["packageId"], "com.example.twa");
        assert_eq!(context["launchUrl"], "https://example.com/app");
        // Quotes troublesome for Gradle are escaped.
        assert_eq!(context["name"], "Andre\\\\\\'s App");
        assert!(context["buildDependencies"].contains("androidbrowserhelper"));
        assert!(context["assetStatements"].contains("example.com"));
    }

    #[test]
    fn validation_failure_stops_generation_before_any_io() {
        let fetcher = PanicFetcher;
        let generator = TwaGenerator::new(&fetcher);
        let manifest = TwaManifest::default();
        let err = generator
            .create_project(&manifest, Path::new("/nonexistent"), Path::new("/nonexistent"))
            .unwrap_err();
        assert!(err.to_string().contains("Invalid TWA Manifest"));
    }

    struct PanicFetcher;

    impl Fetch for PanicFetcher {
        fn fetch(
            &self,
            _url: &str,
        ) -> Result<crate::core::fetch::FetchResponse, crate::core::fetch::FetchError> {
            panic!("no network access expected");
        }
    }
}
