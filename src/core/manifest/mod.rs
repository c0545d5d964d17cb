//! The canonical TWA manifest.
//!
//! `TwaManifest` combines defaults derived from a fetched web manifest with
//! user overrides and is persisted as `twa-manifest.json`, the durable source
//! of truth every other command reads back.

pub mod color;
pub mod file_handler;
pub mod protocol;
pub mod shortcut;
pub mod web;

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::core::util::generate_package_id;
use color::Color;
use file_handler::{process_file_handlers, FileHandler};
use protocol::{process_protocol_handlers, ProtocolHandler};
use shortcut::ShortcutInfo;
use web::{find_suitable_icon, WebManifest, WebManifestIcon};

// The minimum size needed for the app icon.
const MIN_ICON_SIZE: u32 = 512;

// The minimum size needed for the notification icon.
const MIN_NOTIFICATION_ICON_SIZE: u32 = 48;

// As described on https://developer.chrome.com/apps/manifest/name#short_name
const SHORT_NAME_MAX_SIZE: usize = 12;

const MAX_SHORTCUTS: usize = 4;

const DEFAULT_APP_NAME: &str = "My TWA";
const DEFAULT_SPLASHSCREEN_FADEOUT_DURATION: u32 = 300;
const DEFAULT_APP_VERSION_CODE: u32 = 1;
const DEFAULT_SIGNING_KEY_PATH: &str = "./android.keystore";
const DEFAULT_SIGNING_KEY_ALIAS: &str = "android";
const DEFAULT_GENERATOR_APP: &str = "unknown";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DisplayMode {
    #[default]
    Standalone,
    Fullscreen,
    FullscreenSticky,
}

impl FromStr for DisplayMode {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input {
            "standalone" => Ok(Self::Standalone),
            "fullscreen" => Ok(Self::Fullscreen),
            "fullscreen-sticky" => Ok(Self::FullscreenSticky),
            _ => Err(format!("invalid display mode \"{input}\"")),
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Standalone => "standalone",
            Self::Fullscreen => "fullscreen",
            Self::FullscreenSticky => "fullscreen-sticky",
        })
    }
}

/// Screen orientations understood by androidbrowserhelper.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Orientation {
    #[default]
    Default,
    Any,
    Natural,
    Landscape,
    Portrait,
    PortraitPrimary,
    PortraitSecondary,
    LandscapePrimary,
    LandscapeSecondary,
}

impl Orientation {
    /// Maps the web orientation lock to the `android:screenOrientation`
    /// value used for the launcher activity.
    pub fn to_android_screen_orientation(self) -> &'static str {
        match self {
            Self::Portrait => "userPortrait",
            Self::PortraitPrimary => "portrait",
            Self::PortraitSecondary => "reversePortrait",
            Self::Landscape => "userLandscape",
            Self::LandscapePrimary => "landscape",
            Self::LandscapeSecondary => "reverseLandscape",
            Self::Default | Self::Any | Self::Natural => "unspecified",
        }
    }
}

impl FromStr for Orientation {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input {
            "default" => Ok(Self::Default),
            "any" => Ok(Self::Any),
            "natural" => Ok(Self::Natural),
            "landscape" => Ok(Self::Landscape),
            "portrait" => Ok(Self::Portrait),
            "portrait-primary" => Ok(Self::PortraitPrimary),
            "portrait-secondary" => Ok(Self::PortraitSecondary),
            "landscape-primary" => Ok(Self::LandscapePrimary),
            "landscape-secondary" => Ok(Self::LandscapeSecondary),
            _ => Err(format!("invalid orientation \"{input}\"")),
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Default => "default",
            Self::Any => "any",
            Self::Natural => "natural",
            Self::Landscape => "landscape",
            Self::Portrait => "portrait",
            Self::PortraitPrimary => "portrait-primary",
            Self::PortraitSecondary => "portrait-secondary",
            Self::LandscapePrimary => "landscape-primary",
            Self::LandscapeSecondary => "landscape-secondary",
        })
    }
}

/// What the app falls back to on devices without a TWA-capable browser.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackType {
    #[default]
    Customtabs,
    Webview,
}

impl fmt::Display for FallbackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Customtabs => "customtabs",
            Self::Webview => "webview",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningKeyInfo {
    pub path: String,
    pub alias: String,
}

impl Default for SigningKeyInfo {
    fn default() -> Self {
        Self {
            path: DEFAULT_SIGNING_KEY_PATH.to_string(),
            alias: DEFAULT_SIGNING_KEY_ALIAS.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerprint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub value: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocationDelegationConfig {
    pub enabled: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppsFlyerConfig {
    pub enabled: bool,
    pub apps_flyer_id: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FirstRunFlagConfig {
    pub enabled: bool,
    pub query_parameter_name: String,
}

/// Optional feature modules toggled per project.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Features {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_delegation: Option<LocationDelegationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apps_flyer: Option<AppsFlyerConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_run_flag: Option<FirstRunFlagConfig>,
}

/// The persisted manifest used to generate the TWA project.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TwaManifest {
    pub package_id: String,
    pub host: String,
    pub name: String,
    pub launcher_name: String,
    pub display: DisplayMode,
    pub theme_color: Color,
    pub navigation_color: Color,
    pub background_color: Color,
    /// The start path for the TWA, relative to the domain.
    pub start_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maskable_icon_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monochrome_icon_url: Option<String>,
    pub splash_screen_fade_out_duration: u32,
    pub signing_key: SigningKeyInfo,
    pub app_version_code: u32,
    /// Older manifests persisted this field as `appVersion`.
    #[serde(alias = "appVersion")]
    pub app_version_name: String,
    pub shortcuts: Vec<ShortcutInfo>,
    pub protocol_handlers: Vec<ProtocolHandler>,
    pub file_handlers: Vec<FileHandler>,
    pub fallback_type: FallbackType,
    pub enable_notifications: bool,
    pub orientation: Orientation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_manifest_url: Option<Url>,
    pub generator_app: String,
    pub retained_bundles: Vec<String>,
    pub fingerprints: Vec<Fingerprint>,
    pub features: Features,
}

impl Default for TwaManifest {
    fn default() -> Self {
        Self {
            package_id: String::new(),
            host: String::new(),
            name: String::new(),
            launcher_name: String::new(),
            display: DisplayMode::default(),
            theme_color: Color::WHITE,
            navigation_color: Color::BLACK,
            background_color: Color::WHITE,
            start_url: String::new(),
            icon_url: None,
            maskable_icon_url: None,
            monochrome_icon_url: None,
            splash_screen_fade_out_duration: DEFAULT_SPLASHSCREEN_FADEOUT_DURATION,
            signing_key: SigningKeyInfo::default(),
            app_version_code: DEFAULT_APP_VERSION_CODE,
            app_version_name: DEFAULT_APP_VERSION_CODE.to_string(),
            shortcuts: Vec::new(),
            protocol_handlers: Vec::new(),
            file_handlers: Vec::new(),
            fallback_type: FallbackType::default(),
            enable_notifications: false,
            orientation: Orientation::default(),
            web_manifest_url: None,
            generator_app: DEFAULT_GENERATOR_APP.to_string(),
            retained_bundles: Vec::new(),
            fingerprints: Vec::new(),
            features: Features::default(),
        }
    }
}

impl TwaManifest {
    /// Builds a manifest from a fetched web manifest, filling a default for
    /// every optional field.
    pub fn from_web_manifest_json(web_manifest_url: &Url, web_manifest: &WebManifest) -> Self {
        let icon = find_suitable_icon(&web_manifest.icons, "any", MIN_ICON_SIZE);
        let maskable_icon = find_suitable_icon(&web_manifest.icons, "maskable", MIN_ICON_SIZE);
        let monochrome_icon =
            find_suitable_icon(&web_manifest.icons, "monochrome", MIN_NOTIFICATION_ICON_SIZE);

        let full_start_url = resolve_start_url(web_manifest_url, web_manifest.start_url.as_deref());
        let scope_url = resolve_scope_url(web_manifest_url, web_manifest, &full_start_url);

        let shortcuts = collect_shortcuts(web_manifest_url, web_manifest);
        let protocol_handlers =
            collect_protocol_handlers(web_manifest, &full_start_url, &scope_url);
        let file_handlers = collect_file_handlers(web_manifest, &full_start_url, &scope_url);

        let name = web_manifest
            .name
            .as_deref()
            .or(web_manifest.short_name.as_deref())
            .unwrap_or(DEFAULT_APP_NAME)
            .to_string();

        let launcher_name = web_manifest
            .short_name
            .clone()
            .or_else(|| {
                web_manifest
                    .name
                    .as_ref()
                    .map(|name| name.chars().take(SHORT_NAME_MAX_SIZE).collect())
            })
            .unwrap_or_else(|| DEFAULT_APP_NAME.to_string());

        let host = web_manifest_url.host_str().unwrap_or_default().to_string();

        TwaManifest {
            package_id: generate_package_id(&host).unwrap_or_default(),
            name,
            launcher_name,
            display: parse_or_default(web_manifest.display.as_deref(), "display"),
            orientation: parse_or_default(web_manifest.orientation.as_deref(), "orientation"),
            theme_color: parse_color_or(web_manifest.theme_color.as_deref(), Color::WHITE),
            navigation_color: Color::BLACK,
            background_color: parse_color_or(web_manifest.background_color.as_deref(), Color::WHITE),
            start_url: path_and_search(&full_start_url),
            icon_url: resolve_icon_url(web_manifest_url, icon),
            maskable_icon_url: resolve_icon_url(web_manifest_url, maskable_icon),
            monochrome_icon_url: resolve_icon_url(web_manifest_url, monochrome_icon),
            shortcuts,
            protocol_handlers,
            file_handlers,
            web_manifest_url: Some(web_manifest_url.clone()),
            host,
            ..Default::default()
        }
    }

    /// Re-derives web-manifest-backed fields from a freshly fetched web
    /// manifest, keeping the old value for every field named in
    /// `fields_to_ignore` and falling back to the old value when the new
    /// manifest omits a field.
    pub fn merge(
        fields_to_ignore: &[&str],
        web_manifest_url: &Url,
        web_manifest: &WebManifest,
        old: &TwaManifest,
    ) -> Self {
        let ignored = |field: &str| fields_to_ignore.contains(&field);

        let full_start_url = resolve_start_url(web_manifest_url, web_manifest.start_url.as_deref());
        let scope_url = resolve_scope_url(web_manifest_url, web_manifest, &full_start_url);

        let new_icon_url = |field: &str, purpose: &str, min_size: u32, old_url: &Option<String>| {
            if ignored(field) {
                return old_url.clone();
            }
            let icon = find_suitable_icon(&web_manifest.icons, purpose, min_size);
            resolve_icon_url(web_manifest_url, icon).or_else(|| old_url.clone())
        };

        let mut manifest = old.clone();
        if !ignored("name") {
            if let Some(name) = web_manifest.name.as_deref().or(web_manifest.short_name.as_deref())
            {
                manifest.name = name.to_string();
            }
        }
        if !ignored("short_name") {
            if let Some(launcher_name) = web_manifest.short_name.clone().or_else(|| {
                web_manifest
                    .name
                    .as_ref()
                    .map(|name| name.chars().take(SHORT_NAME_MAX_SIZE).collect())
            }) {
                manifest.launcher_name = launcher_name;
            }
        }
        if !ignored("display") {
            if let Some(display) = web_manifest.display.as_deref() {
                manifest.display = parse_or_default(Some(display), "display");
            }
        }
        if !ignored("themeColor") {
            if let Some(color) = web_manifest.theme_color.as_deref() {
                manifest.theme_color = parse_color_or(Some(color), old.theme_color);
            }
        }
        if !ignored("backgroundColor") {
            if let Some(color) = web_manifest.background_color.as_deref() {
                manifest.background_color = parse_color_or(Some(color), old.background_color);
            }
        }
        if !ignored("startUrl") {
            manifest.start_url = path_and_search(&full_start_url);
        }
        if !ignored("shortcuts") {
            manifest.shortcuts = collect_shortcuts(web_manifest_url, web_manifest);
        }
        if !ignored("protocolHandlers") {
            manifest.protocol_handlers =
                collect_protocol_handlers(web_manifest, &full_start_url, &scope_url);
        }
        if !ignored("fileHandlers") {
            manifest.file_handlers =
                collect_file_handlers(web_manifest, &full_start_url, &scope_url);
        }
        manifest.icon_url = new_icon_url("icons", "any", MIN_ICON_SIZE, &old.icon_url);
        manifest.maskable_icon_url =
            new_icon_url("maskableIcons", "maskable", MIN_ICON_SIZE, &old.maskable_icon_url);
        manifest.monochrome_icon_url = new_icon_url(
            "monochromeIcons",
            "monochrome",
            MIN_NOTIFICATION_ICON_SIZE,
            &old.monochrome_icon_url,
        );
        manifest.web_manifest_url = Some(web_manifest_url.clone());
        manifest
    }

    /// Checks that every field required to generate a project is present.
    pub fn validate(&self) -> Result<(), String> {
        crate::core::util::validate_not_empty(&self.host, "host")?;
        crate::core::util::validate_not_empty(&self.name, "name")?;
        crate::core::util::validate_not_empty(&self.start_url, "startUrl")?;
        match &self.icon_url {
            Some(icon_url) => crate::core::util::validate_not_empty(icon_url, "iconUrl"),
            None => Err("iconUrl cannot be empty".to_string()),
        }
    }

    /// The `shortcuts` string resource parsed by androidbrowserhelper.
    pub fn generate_shortcuts(&self) -> String {
        let entries: Vec<String> = self
            .shortcuts
            .iter()
            .enumerate()
            .map(|(i, shortcut)| shortcut.to_gradle_entry(i))
            .collect();
        format!("[{}]", entries.join(","))
    }

    /// The absolute URL the generated app opens on launch.
    pub fn launch_url(&self) -> String {
        format!("https://{}{}", self.host, self.start_url)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Reading `{}`", path.display()))?;
        let mut manifest: TwaManifest = serde_json::from_str(&contents)
            .with_context(|| format!("Parsing `{}`", path.display()))?;
        // Older manifests may not have a launcher name.
        if manifest.launcher_name.is_empty() {
            manifest.launcher_name = manifest.name.clone();
        }
        Ok(manifest)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("Writing `{}`", path.display()))?;
        Ok(())
    }
}

fn resolve_start_url(web_manifest_url: &Url, start_url: Option<&str>) -> Url {
    web_manifest_url
        .join(start_url.unwrap_or("/"))
        .unwrap_or_else(|_| web_manifest_url.clone())
}

/// The manifest scope, defaulting to the directory of the resolved start URL.
fn resolve_scope_url(web_manifest_url: &Url, web_manifest: &WebManifest, start_url: &Url) -> Url {
    web_manifest
        .scope
        .as_deref()
        .and_then(|scope| web_manifest_url.join(scope).ok())
        .unwrap_or_else(|| start_url.join(".").unwrap_or_else(|_| start_url.clone()))
}

/// The origin is dropped on purpose: the TWA always opens against `host`.
fn path_and_search(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    }
}

fn resolve_icon_url(web_manifest_url: &Url, icon: Option<&WebManifestIcon>) -> Option<String> {
    icon.and_then(|icon| web_manifest_url.join(&icon.src).ok())
        .map(|url| url.to_string())
}

fn collect_shortcuts(web_manifest_url: &Url, web_manifest: &WebManifest) -> Vec<ShortcutInfo> {
    let mut shortcuts = Vec::new();
    for (i, shortcut) in web_manifest.shortcuts.iter().enumerate() {
        match ShortcutInfo::from_shortcut_json(web_manifest_url, shortcut) {
            Ok(info) => shortcuts.push(info),
            Err(message) => log::warn!("Skipping shortcut[{i}] for {message}."),
        }
        if shortcuts.len() == MAX_SHORTCUTS {
            break;
        }
    }
    shortcuts
}

fn collect_protocol_handlers(
    web_manifest: &WebManifest,
    start_url: &Url,
    scope_url: &Url,
) -> Vec<ProtocolHandler> {
    let (accepted, rejections) =
        process_protocol_handlers(&web_manifest.protocol_handlers, start_url, scope_url);
    for rejection in rejections {
        log::warn!(
            "Ignoring protocol handler {:?}: {}",
            rejection.input.protocol.as_deref().unwrap_or("<missing>"),
            rejection.reason
        );
    }
    accepted
}

fn collect_file_handlers(
    web_manifest: &WebManifest,
    start_url: &Url,
    scope_url: &Url,
) -> Vec<FileHandler> {
    let (accepted, rejections) =
        process_file_handlers(&web_manifest.file_handlers, start_url, scope_url);
    for rejection in rejections {
        log::warn!(
            "Ignoring file handler {:?}: {}",
            rejection.input.action.as_deref().unwrap_or("<missing>"),
            rejection.reason
        );
    }
    accepted
}

fn parse_or_default<T: FromStr<Err = String> + Default>(input: Option<&str>, field: &str) -> T {
    match input {
        None => T::default(),
        Some(value) => value.parse().unwrap_or_else(|err: String| {
            log::warn!("Falling back to the default {field}: {err}");
            T::default()
        }),
    }
}

fn parse_color_or(input: Option<&str>, default: Color) -> Color {
    match input {
        None => default,
        Some(value) => value.parse().unwrap_or_else(|err| {
            log::warn!("{err}; falling back to {default}");
            default
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn web_manifest(json: &str) -> WebManifest {
        serde_json::from_str(json).unwrap()
    }

    fn manifest_url() -> Url {
        Url::parse("https://pwa-directory.appspot.com/manifest.json").unwrap()
    }

    #[test]
    fn derives_defaults_from_a_minimal_web_manifest() {
        let manifest =
            TwaManifest::from_web_manifest_json(&manifest_url(), &web_manifest("{}"));

        assert_eq!(manifest.host, "pwa-directory.appspot.com");
        assert_eq!(manifest.package_id, "com.appspot.pwa_directory.twa");
        assert_eq!(manifest.name, "My TWA");
        assert_eq!(manifest.launcher_name, "My TWA");
        assert_eq!(manifest.start_url, "/");
        assert_eq!(manifest.theme_color, Color::WHITE);
        assert_eq!(manifest.navigation_color, Color::BLACK);
        assert_eq!(manifest.background_color, Color::WHITE);
        assert_eq!(manifest.display, DisplayMode::Standalone);
        assert_eq!(manifest.splash_screen_fade_out_duration, 300);
        assert_eq!(manifest.app_version_code, 1);
        assert_eq!(manifest.app_version_name, "1");
        assert_eq!(manifest.signing_key.path, "./android.keystore");
        assert_eq!(manifest.signing_key.alias, "android");
        assert_eq!(manifest.fallback_type, FallbackType::Customtabs);
        assert!(!manifest.enable_notifications);
        assert!(manifest.icon_url.is_none());
        assert_eq!(
            manifest.web_manifest_url.as_ref().map(Url::as_str),
            Some("https://pwa-directory.appspot.com/manifest.json")
        );
    }

    #[test]
    fn derives_fields_from_a_full_web_manifest() {
        let manifest = TwaManifest::from_web_manifest_json(
            &manifest_url(),
            &web_manifest(
                r##"{
                    "name": "PWA Directory",
                    "short_name": "PwaDirectory",
                    "start_url": "/?utm_source=homescreen",
                    "display": "fullscreen",
                    "orientation": "landscape",
                    "theme_color": "#00ff00",
                    "background_color": "#7cc0ff",
                    "icons": [
                        {"src": "/favicons/any.png", "sizes": "512x512", "purpose": "any"},
                        {"src": "/favicons/maskable.png", "sizes": "512x512", "purpose": "maskable"}
                    ]
                }"##,
            ),
        );

        assert_eq!(manifest.name, "PWA Directory");
        assert_eq!(manifest.launcher_name, "PwaDirectory");
        assert_eq!(manifest.start_url, "/?utm_source=homescreen");
        assert_eq!(manifest.display, DisplayMode::Fullscreen);
        assert_eq!(manifest.orientation, Orientation::Landscape);
        assert_eq!(manifest.theme_color, Color::rgb(0, 0xFF, 0));
        assert_eq!(manifest.background_color, Color::rgb(0x7C, 0xC0, 0xFF));
        assert_eq!(
            manifest.icon_url.as_deref(),
            Some("https://pwa-directory.appspot.com/favicons/any.png")
        );
        assert_eq!(
            manifest.maskable_icon_url.as_deref(),
            Some("https://pwa-directory.appspot.com/favicons/maskable.png")
        );
    }

    #[test]
    fn name_falls_back_to_short_name_and_truncates_launcher_name() {
        let manifest = TwaManifest::from_web_manifest_json(
            &manifest_url(),
            &web_manifest(r#"{"name": "An Extremely Long App Name"}"#),
        );
        assert_eq!(manifest.name, "An Extremely Long App Name");
        assert_eq!(manifest.launcher_name, "An Extremely");

        let manifest = TwaManifest::from_web_manifest_json(
            &manifest_url(),
            &web_manifest(r#"{"short_name": "Short"}"#),
        );
        assert_eq!(manifest.name, "Short");
        assert_eq!(manifest.launcher_name, "Short");
    }

    #[test]
    fn caps_shortcuts_at_four_and_drops_invalid_entries() {
        let shortcut = |name: &str, sizes: &str| {
            format!(
                r#"{{"name": "{name}", "url": "/{name}", "icons": [{{"src": "/{name}.png", "sizes": "{sizes}"}}]}}"#
            )
        };
        let manifest_json = format!(
            r#"{{"shortcuts": [{},{},{},{},{},{}]}}"#,
            shortcut("one", "96x96"),
            shortcut("two", "96x96"),
            // Icon below the 96px minimum is dropped without affecting order.
            shortcut("small", "48x48"),
            shortcut("three", "96x96"),
            shortcut("four", "96x96"),
            shortcut("five", "96x96"),
        );
        let manifest =
            TwaManifest::from_web_manifest_json(&manifest_url(), &web_manifest(&manifest_json));

        let names: Vec<_> = manifest.shortcuts.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["one", "two", "three", "four"]);
    }

    #[test]
    fn validate_requires_exactly_the_four_mandatory_fields() {
        let valid = TwaManifest {
            host: "example.com".to_string(),
            name: "Example".to_string(),
            start_url: "/".to_string(),
            icon_url: Some("https://example.com/icon.png".to_string()),
            ..Default::default()
        };
        assert!(valid.validate().is_ok());

        for field in ["host", "name", "startUrl", "iconUrl"] {
            let mut manifest = valid.clone();
            match field {
                "host" => manifest.host.clear(),
                "name" => manifest.name.clear(),
                "startUrl" => manifest.start_url.clear(),
                "iconUrl" => manifest.icon_url = None,
                _ => unreachable!(),
            }
            let error = manifest.validate().unwrap_err();
            assert!(error.contains(field), "{error} should mention {field}");
        }

        // No other field affects the result.
        let mut stripped = valid;
        stripped.package_id.clear();
        stripped.launcher_name.clear();
        stripped.web_manifest_url = None;
        assert!(stripped.validate().is_ok());
    }

    #[test]
    fn accepts_the_legacy_app_version_key_on_read() {
        let manifest: TwaManifest = serde_json::from_str(
            r#"{
                "packageId": "com.example.twa",
                "host": "example.com",
                "name": "Example",
                "startUrl": "/",
                "appVersion": "2.1.0"
            }"#,
        )
        .unwrap();
        assert_eq!(manifest.app_version_name, "2.1.0");
    }

    #[test]
    fn writes_app_version_name_never_the_legacy_key() {
        let manifest = TwaManifest {
            app_version_name: "3".to_string(),
            ..Default::default()
        };
        let value = serde_json::to_value(&manifest).unwrap();
        assert_eq!(value["appVersionName"], "3");
        assert!(value.get("appVersion").is_none());
    }

    #[test]
    fn persisted_manifest_round_trips() {
        let manifest = TwaManifest::from_web_manifest_json(
            &manifest_url(),
            &web_manifest(
                r#"{
                    "name": "PWA Directory",
                    "icons": [{"src": "/icon.png", "sizes": "512x512"}],
                    "protocol_handlers": [{"protocol": "web+tea", "url": "?drink=%s"}]
                }"#,
            ),
        );

        let json = serde_json::to_string(&manifest).unwrap();
        let restored: TwaManifest = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.name, manifest.name);
        assert_eq!(restored.theme_color, manifest.theme_color);
        assert_eq!(restored.protocol_handlers, manifest.protocol_handlers);
        assert_eq!(restored.web_manifest_url, manifest.web_manifest_url);
    }

    #[test]
    fn merge_keeps_ignored_fields_and_fills_omitted_ones() {
        let old = TwaManifest {
            host: "example.com".to_string(),
            name: "Old Name".to_string(),
            launcher_name: "Old".to_string(),
            start_url: "/old".to_string(),
            icon_url: Some("https://example.com/old-icon.png".to_string()),
            theme_color: Color::rgb(1, 2, 3),
            ..Default::default()
        };

        let merged = TwaManifest::merge(
            &["name"],
            &manifest_url(),
            &web_manifest(
                r#"{
                    "name": "New Name",
                    "start_url": "/new",
                    "icons": [{"src": "/new-icon.png", "sizes": "512x512"}]
                }"#,
            ),
            &old,
        );

        // "name" ignored, so the old value stays.
        assert_eq!(merged.name, "Old Name");
        assert_eq!(merged.start_url, "/new");
        assert_eq!(
            merged.icon_url.as_deref(),
            Some("https://pwa-directory.appspot.com/new-icon.png")
        );
        // Theme color omitted from the new manifest, old value kept.
        assert_eq!(merged.theme_color, Color::rgb(1, 2, 3));
    }

    #[test]
    fn merge_falls_back_to_old_icon_when_the_new_manifest_has_none() {
        let old = TwaManifest {
            icon_url: Some("https://example.com/old-icon.png".to_string()),
            ..Default::default()
        };
        let merged = TwaManifest::merge(&[], &manifest_url(), &web_manifest("{}"), &old);
        assert_eq!(
            merged.icon_url.as_deref(),
            Some("https://example.com/old-icon.png")
        );
    }

    #[test]
    fn generates_the_shortcuts_resource_string() {
        let manifest = TwaManifest {
            shortcuts: vec![
                ShortcutInfo {
                    name: "One".to_string(),
                    short_name: "One".to_string(),
                    url: "https://example.com/one".to_string(),
                    chosen_icon_url: Some("https://example.com/one.png".to_string()),
                    chosen_maskable_icon_url: None,
                    chosen_monochrome_icon_url: None,
                },
                ShortcutInfo {
                    name: "Two".to_string(),
                    short_name: "Two".to_string(),
                    url: "https://example.com/two".to_string(),
                    chosen_icon_url: Some("https://example.com/two.png".to_string()),
                    chosen_maskable_icon_url: None,
                    chosen_monochrome_icon_url: None,
                },
            ],
            ..Default::default()
        };
        assert_eq!(
            manifest.generate_shortcuts(),
            "[[name:'One', short_name:'One', url:'https://example.com/one', icon:'shortcut_0'],\
             [name:'Two', short_name:'Two', url:'https://example.com/two', icon:'shortcut_1']]"
        );
    }
}
