//! Protocol handler normalization.
//!
//! Web manifests may register custom scheme handlers. Only a fixed set of
//! schemes (plus `web+…` ones) is allowed in the generated Android project,
//! and every handler URL must stay inside the manifest's scope.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use super::web::ProtocolHandlerJson;

/// Schemes that may be registered without the `web+` prefix.
/// `mms`, `sms`, `smsto` and `tel` are not supported.
const ALLOWED_SCHEMES: &[&str] = &[
    "bitcoin",
    "ftp",
    "ftps",
    "geo",
    "im",
    "irc",
    "ircs",
    "magnet",
    "mailto",
    "matrix",
    "news",
    "nntp",
    "openpgp4fpr",
    "sftp",
    "sip",
    "ssh",
    "urn",
    "webcal",
    "wtai",
    "xmpp",
];

/// A validated protocol handler, ready for the generated project.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolHandler {
    pub protocol: String,
    pub url: String,
}

/// Why a protocol or file handler entry was dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum HandlerRejection {
    #[error("missing a required field")]
    MissingField,
    #[error("protocol scheme is not allowed")]
    InvalidScheme,
    #[error("url is missing the %s placeholder")]
    MissingPlaceholder,
    #[error("url could not be parsed")]
    InvalidUrl,
    #[error("absolute url must use https")]
    SchemeNotHttps,
    #[error("url origin does not match the manifest scope")]
    OriginMismatch,
    #[error("url path is outside the manifest scope")]
    OutOfScope,
}

/// A dropped handler entry together with the reason it was dropped.
#[derive(Clone, Debug)]
pub struct Rejection<T> {
    pub input: T,
    pub reason: HandlerRejection,
}

/// Lowercases `protocol` and checks it against the allow-list. `web+` schemes
/// are accepted when the suffix is one or more letters.
pub fn normalize_protocol(protocol: &str) -> Option<String> {
    let normalized = protocol.to_lowercase();

    if ALLOWED_SCHEMES.contains(&normalized.as_str()) {
        return Some(normalized);
    }

    if let Some(suffix) = normalized.strip_prefix("web+") {
        if !suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_lowercase()) {
            return Some(normalized);
        }
    }

    None
}

/// Resolves and validates a handler URL.
///
/// Absolute URLs must be https, share the scope's origin and stay under the
/// scope's path. URLs that do not parse as absolute are resolved against
/// `start_url` and returned without the scope checks: a relative URL cannot
/// escape the manifest's own origin, so it is trusted as-is.
pub fn normalize_url(
    url: &str,
    start_url: &Url,
    scope_url: &Url,
    require_placeholder: bool,
) -> Result<String, HandlerRejection> {
    if require_placeholder && !url.contains("%s") {
        return Err(HandlerRejection::MissingPlaceholder);
    }

    if let Ok(absolute) = Url::parse(url) {
        if absolute.scheme() != "https" {
            return Err(HandlerRejection::SchemeNotHttps);
        }
        if absolute.origin() != scope_url.origin() {
            return Err(HandlerRejection::OriginMismatch);
        }
        if !absolute.path().starts_with(scope_url.path()) {
            return Err(HandlerRejection::OutOfScope);
        }
        return Ok(absolute.to_string());
    }

    match start_url.join(url) {
        Ok(resolved) => Ok(resolved.to_string()),
        Err(_) => Err(HandlerRejection::InvalidUrl),
    }
}

/// Validates raw `protocol_handlers` entries, returning the accepted handlers
/// and the dropped entries with their reasons. The caller decides whether to
/// log the rejections; a malformed entry never fails the whole manifest.
pub fn process_protocol_handlers(
    handlers: &[ProtocolHandlerJson],
    start_url: &Url,
    scope_url: &Url,
) -> (Vec<ProtocolHandler>, Vec<Rejection<ProtocolHandlerJson>>) {
    let mut accepted = Vec::new();
    let mut rejections = Vec::new();

    for handler in handlers {
        let (protocol, url) = match (&handler.protocol, &handler.url) {
            (Some(protocol), Some(url)) => (protocol, url),
            _ => {
                rejections.push(Rejection {
                    input: handler.clone(),
                    reason: HandlerRejection::MissingField,
                });
                continue;
            }
        };

        let protocol = match normalize_protocol(protocol) {
            Some(protocol) => protocol,
            None => {
                rejections.push(Rejection {
                    input: handler.clone(),
                    reason: HandlerRejection::InvalidScheme,
                });
                continue;
            }
        };

        match normalize_url(url, start_url, scope_url, true) {
            Ok(url) => accepted.push(ProtocolHandler { protocol, url }),
            Err(reason) => rejections.push(Rejection {
                input: handler.clone(),
                reason,
            }),
        }
    }

    (accepted, rejections)
}
