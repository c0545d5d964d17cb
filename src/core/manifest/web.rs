//! Raw web app manifest model, as fetched from the PWA's server.
//!
//! Only the fields the generator cares about are modelled; everything else in
//! the JSON is ignored.

use serde::Deserialize;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct WebManifest {
    pub name: Option<String>,
    pub short_name: Option<String>,
    pub start_url: Option<String>,
    pub scope: Option<String>,
    pub display: Option<String>,
    pub orientation: Option<String>,
    pub theme_color: Option<String>,
    pub background_color: Option<String>,
    #[serde(default)]
    pub icons: Vec<WebManifestIcon>,
    #[serde(default)]
    pub shortcuts: Vec<WebManifestShortcut>,
    #[serde(default)]
    pub protocol_handlers: Vec<ProtocolHandlerJson>,
    #[serde(default)]
    pub file_handlers: Vec<FileHandlerJson>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct WebManifestIcon {
    pub src: String,
    /// Space-separated list of `WxH` tokens, e.g. `"48x48 96x96"`.
    pub sizes: Option<String>,
    /// Space-separated purpose tokens (`any`, `maskable`, `monochrome`).
    pub purpose: Option<String>,
    #[serde(rename = "type")]
    pub mime_type: Option<String>,
}

impl WebManifestIcon {
    /// The largest numeric dimension across all `sizes` tokens, 0 when the
    /// field is absent or unparsable.
    pub fn size(&self) -> u32 {
        self.sizes
            .as_deref()
            .unwrap_or("0x0")
            .split_ascii_whitespace()
            .map(parse_size_token)
            .max()
            .unwrap_or(0)
    }

    fn purposes(&self) -> impl Iterator<Item = &str> {
        self.purpose
            .as_deref()
            .unwrap_or("any")
            .split_ascii_whitespace()
    }

    pub fn has_purpose(&self, purpose: &str) -> bool {
        self.purposes().any(|p| p == purpose)
    }
}

/// Parses the leading integer of a size token, so `"96x96"` yields 96 and
/// `"any"` yields 0.
fn parse_size_token(token: &str) -> u32 {
    let digits: String = token.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct WebManifestShortcut {
    pub name: Option<String>,
    pub short_name: Option<String>,
    pub url: Option<String>,
    #[serde(default)]
    pub icons: Vec<WebManifestIcon>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ProtocolHandlerJson {
    pub protocol: Option<String>,
    pub url: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct FileHandlerJson {
    pub action: Option<String>,
    /// Maps a mime type to its accepted file extensions. A `BTreeMap` keeps
    /// the generated intent filters in a stable order across runs.
    pub accept: Option<std::collections::BTreeMap<String, Vec<String>>>,
}

/// Finds the largest icon matching `purpose`, or `None` when no icon
/// qualifies or the best candidate is smaller than `min_size`.
///
/// Ties are broken by input order: the strict `>` comparison keeps the
/// earliest maximum, so the result is deterministic for a given icon list.
pub fn find_suitable_icon<'a>(
    icons: &'a [WebManifestIcon],
    purpose: &str,
    min_size: u32,
) -> Option<&'a WebManifestIcon> {
    let mut largest: Option<(&WebManifestIcon, u32)> = None;
    for icon in icons {
        if !icon.has_purpose(purpose) {
            continue;
        }
        let size = icon.size();
        match largest {
            Some((_, largest_size)) if size <= largest_size => {}
            _ => largest = Some((icon, size)),
        }
    }

    match largest {
        Some((_, size)) if min_size > 0 && size < min_size => None,
        Some((icon, _)) => Some(icon),
        None => None,
    }
}
