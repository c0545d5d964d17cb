//! App shortcut entries derived from the web manifest.

use serde::{Deserialize, Serialize};
use url::Url;

use super::web::{find_suitable_icon, WebManifestIcon, WebManifestShortcut};

// As described on https://developer.chrome.com/apps/manifest/name#short_name
const SHORT_NAME_MAX_SIZE: usize = 12;

// The minimum size needed for a shortcut icon.
const MIN_SHORTCUT_ICON_SIZE: u32 = 96;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortcutInfo {
    pub name: String,
    pub short_name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chosen_icon_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chosen_maskable_icon_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chosen_monochrome_icon_url: Option<String>,
}

impl ShortcutInfo {
    /// Name of the drawable assets generated for the shortcut at `index`.
    pub fn asset_name(index: usize) -> String {
        format!("shortcut_{index}")
    }

    /// The entry written into the `shortcuts` string resource, in the format
    /// androidbrowserhelper parses at runtime.
    pub fn to_gradle_entry(&self, index: usize) -> String {
        format!(
            "[name:'{}', short_name:'{}', url:'{}', icon:'{}']",
            self.name,
            self.short_name,
            self.url,
            Self::asset_name(index)
        )
    }

    /// Builds a shortcut from a raw manifest entry.
    ///
    /// An entry must carry a name (or short name), a url and an icon of at
    /// least 96px. Maskable icons need an equivalent `any` icon for older API
    /// levels, so an entry with only a maskable icon is rejected; `any` and
    /// monochrome icons work everywhere.
    pub fn from_shortcut_json(
        web_manifest_url: &Url,
        shortcut: &WebManifestShortcut,
    ) -> Result<ShortcutInfo, String> {
        let name = shortcut
            .name
            .as_deref()
            .or(shortcut.short_name.as_deref())
            .unwrap_or_default();

        let url = shortcut.url.as_deref().unwrap_or_default();
        if name.is_empty() || url.is_empty() || shortcut.icons.is_empty() {
            return Err("missing metadata".to_string());
        }

        let icon = find_suitable_icon(&shortcut.icons, "any", MIN_SHORTCUT_ICON_SIZE);
        let maskable_icon = find_suitable_icon(&shortcut.icons, "maskable", MIN_SHORTCUT_ICON_SIZE);
        let monochrome_icon =
            find_suitable_icon(&shortcut.icons, "monochrome", MIN_SHORTCUT_ICON_SIZE);

        if icon.is_none() && monochrome_icon.is_none() {
            return Err("not finding a suitable icon".to_string());
        }

        let resolve = |icon: Option<&WebManifestIcon>| -> Option<String> {
            icon.and_then(|icon| web_manifest_url.join(&icon.src).ok())
                .map(|url| url.to_string())
        };

        let short_name = shortcut
            .short_name
            .clone()
            .unwrap_or_else(|| name.chars().take(SHORT_NAME_MAX_SIZE).collect());

        let url = web_manifest_url
            .join(url)
            .map_err(|_| format!("invalid shortcut url \"{url}\""))?;

        Ok(ShortcutInfo {
            name: name.to_string(),
            short_name,
            url: url.to_string(),
            chosen_icon_url: resolve(icon),
            chosen_maskable_icon_url: resolve(maskable_icon),
            chosen_monochrome_icon_url: resolve(monochrome_icon),
        })
    }
}
