//! Input validation and interactive prompts.
//!
//! The validators are pure `&str -> Result<T, String>` functions so they can
//! be tested without a terminal; the prompt wrappers loop a `dialoguer`
//! prompt until the validator accepts the input.

use std::str::FromStr;

use anyhow::Result;
use dialoguer::{Confirm, Input, Password};
use url::Url;

use crate::core::manifest::color::Color;
use crate::core::manifest::{DisplayMode, Orientation};
use crate::core::util::validate_package_id;

const MIN_KEY_PASSWORD_LENGTH: usize = 6;

pub fn validate_color(input: &str) -> Result<Color, String> {
    input.parse()
}

pub fn validate_url(input: &str) -> Result<Url, String> {
    let url = Url::parse(input).map_err(|_| format!("invalid URL \"{input}\""))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(format!("URL must be http or https, got \"{scheme}\"")),
    }
}

/// Validates a URL that should point at a bitmap image. The check is based on
/// the path extension; a URL without a recognizable extension passes and is
/// caught later by the content-type check on download.
pub fn validate_image_url(input: &str) -> Result<Url, String> {
    let url = validate_url(input)?;
    let path = url.path().to_ascii_lowercase();
    if path.ends_with(".svg") || path.ends_with(".svgz") {
        return Err("SVG images are not supported".to_string());
    }
    Ok(url)
}

/// Like [`validate_image_url`], but an empty input is accepted as "no icon".
pub fn validate_optional_image_url(input: &str) -> Result<Option<Url>, String> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    validate_image_url(input).map(Some)
}

pub fn validate_display_mode(input: &str) -> Result<DisplayMode, String> {
    DisplayMode::from_str(input)
}

pub fn validate_orientation(input: &str) -> Result<Orientation, String> {
    Orientation::from_str(input)
}

pub fn validate_package_id_input(input: &str) -> Result<String, String> {
    validate_package_id(input)?;
    Ok(input.to_string())
}

pub fn validate_version_code(input: &str) -> Result<u32, String> {
    let code: u32 = input
        .trim()
        .parse()
        .map_err(|_| format!("\"{input}\" is not a number"))?;
    if code == 0 {
        return Err("version code must be at least 1".to_string());
    }
    Ok(code)
}

pub fn validate_key_password(input: &str) -> Result<String, String> {
    if input.len() < MIN_KEY_PASSWORD_LENGTH {
        return Err(format!(
            "password must have at least {MIN_KEY_PASSWORD_LENGTH} characters"
        ));
    }
    Ok(input.to_string())
}

/// A SHA-256 certificate fingerprint: 32 colon-separated hex pairs.
pub fn validate_sha256_fingerprint(input: &str) -> Result<String, String> {
    let input = input.trim().to_uppercase();
    let pairs: Vec<&str> = input.split(':').collect();
    let well_formed = pairs.len() == 32
        && pairs
            .iter()
            .all(|pair| pair.len() == 2 && pair.chars().all(|c| c.is_ascii_hexdigit()));
    if !well_formed {
        return Err(format!("\"{input}\" is not a SHA-256 fingerprint"));
    }
    Ok(input)
}

/// Prompts until `parse` accepts the input.
pub fn prompt_parsed<T>(
    message: &str,
    default: Option<&str>,
    parse: impl Fn(&str) -> Result<T, String>,
) -> Result<T> {
    loop {
        let mut input = Input::<String>::new().with_prompt(message).allow_empty(true);
        if let Some(default) = default {
            input = input.default(default.to_string());
        }
        let value = input.interact_text()?;
        match parse(value.trim()) {
            Ok(parsed) => return Ok(parsed),
            Err(error) => eprintln!("{error}"),
        }
    }
}

pub fn prompt_confirm(message: &str, default: bool) -> Result<bool> {
    Ok(Confirm::new()
        .with_prompt(message)
        .default(default)
        .interact()?)
}

pub fn prompt_password(message: &str) -> Result<String> {
    loop {
        let value = Password::new().with_prompt(message).interact()?;
        match validate_key_password(&value) {
            Ok(password) => return Ok(password),
            Err(error) => eprintln!("{error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_urls() {
        assert!(validate_url("https://example.com/manifest.json").is_ok());
        assert!(validate_url("http://example.com").is_ok());
        assert!(validate_url("ftp://example.com").is_err());
        assert!(validate_url("not a url").is_err());
    }

    #[test]
    fn validates_image_urls_by_extension() {
        assert!(validate_image_url("https://example.com/icon.png").is_ok());
        assert!(validate_image_url("https://example.com/icon").is_ok());
        assert!(validate_image_url("https://example.com/icon.svg").is_err());
        assert!(validate_image_url("https://example.com/icon.SVG").is_err());
    }

    #[test]
    fn optional_image_url_accepts_empty_input() {
        assert_eq!(validate_optional_image_url("  "), Ok(None));
        assert!(validate_optional_image_url("https://example.com/icon.png")
            .unwrap()
            .is_some());
    }

    #[test]
    fn validates_version_codes() {
        assert_eq!(validate_version_code("3"), Ok(3));
        assert!(validate_version_code("0").is_err());
        assert!(validate_version_code("abc").is_err());
    }

    #[test]
    fn validates_key_passwords() {
        assert!(validate_key_password("secret").is_ok());
        assert!(validate_key_password("short").is_err());
    }

    #[test]
    fn validates_sha256_fingerprints() {
        let fingerprint = [
            "11", "22", "33", "44", "55", "66", "77", "88", "99", "00", "AA", "BB", "CC", "DD",
            "EE", "FF", "11", "22", "33", "44", "55", "66", "77", "88", "99", "00", "AA", "BB",
            "CC", "DD", "EE", "FF",
        ]
        .join(":");
        assert_eq!(validate_sha256_fingerprint(&fingerprint), Ok(fingerprint.clone()));

        // Lowercase input is normalized.
        assert_eq!(
            validate_sha256_fingerprint(&fingerprint.to_lowercase()),
            Ok(fingerprint)
        );

        assert!(validate_sha256_fingerprint("AA:BB").is_err());
        assert!(validate_sha256_fingerprint("not a fingerprint").is_err());
    }

    #[test]
    fn validates_display_modes_and_orientations() {
        assert_eq!(validate_display_mode("standalone"), Ok(DisplayMode::Standalone));
        assert!(validate_display_mode("browser").is_err());
        assert_eq!(validate_orientation("portrait"), Ok(Orientation::Portrait));
        assert!(validate_orientation("diagonal").is_err());
    }
}
