//! File handler normalization.
//!
//! Unlike protocol handlers, a file handler's action URL is always resolved
//! against the start URL first and then checked against the scope, whether it
//! was written as absolute or relative.

use serde::{Deserialize, Serialize};
use url::Url;

use super::protocol::{HandlerRejection, Rejection};
use super::web::FileHandlerJson;

/// A validated file handler, ready for the generated project.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileHandler {
    pub action_url: String,
    pub mime_types: Vec<String>,
}

fn normalize_action_url(
    url: &str,
    start_url: &Url,
    scope_url: &Url,
) -> Result<String, HandlerRejection> {
    let resolved = start_url.join(url).map_err(|_| HandlerRejection::InvalidUrl)?;

    if resolved.scheme() != "https" {
        return Err(HandlerRejection::SchemeNotHttps);
    }
    if resolved.origin() != scope_url.origin() {
        return Err(HandlerRejection::OriginMismatch);
    }
    if !resolved.path().starts_with(scope_url.path()) {
        return Err(HandlerRejection::OutOfScope);
    }

    Ok(resolved.to_string())
}

/// Validates raw `file_handlers` entries. Entries missing `action` or
/// `accept`, with zero mime types, or failing URL validation are dropped and
/// reported; the caller decides whether to log.
pub fn process_file_handlers(
    handlers: &[FileHandlerJson],
    start_url: &Url,
    scope_url: &Url,
) -> (Vec<FileHandler>, Vec<Rejection<FileHandlerJson>>) {
    let mut accepted = Vec::new();
    let mut rejections = Vec::new();

    for handler in handlers {
        let (action, accept) = match (&handler.action, &handler.accept) {
            (Some(action), Some(accept)) if !accept.is_empty() => (action, accept),
            _ => {
                rejections.push(Rejection {
                    input: handler.clone(),
                    reason: HandlerRejection::MissingField,
                });
                continue;
            }
        };

        match normalize_action_url(action, start_url, scope_url) {
            Ok(action_url) => accepted.push(FileHandler {
                action_url,
                mime_types: accept.keys().cloned().collect(),
            }),
            Err(reason) => rejections.push(Rejection {
                input: handler.clone(),
                reason,
            }),
        }
    }

    (accepted, rejections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn urls() -> (Url, Url) {
        let start = Url::parse("https://test.com/app/start").unwrap();
        let scope = Url::parse("https://test.com/app/").unwrap();
        (start, scope)
    }

    fn accept(mime_types: &[&str]) -> Option<BTreeMap<String, Vec<String>>> {
        Some(
            mime_types
                .iter()
                .map(|m| (m.to_string(), vec![]))
                .collect(),
        )
    }

    #[test]
    fn resolves_relative_actions_and_collects_mime_types() {
        let (start, scope) = urls();
        let handlers = vec![FileHandlerJson {
            action: Some("open-file".to_string()),
            accept: accept(&["image/png", "image/jpeg"]),
        }];

        let (accepted, rejections) = process_file_handlers(&handlers, &start, &scope);
        assert!(rejections.is_empty());
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].action_url, "https://test.com/app/open-file");
        assert_eq!(accepted[0].mime_types, vec!["image/jpeg", "image/png"]);
    }

    #[test]
    fn drops_entries_missing_action_or_accept() {
        let (start, scope) = urls();
        let handlers = vec![
            FileHandlerJson {
                action: None,
                accept: accept(&["image/png"]),
            },
            FileHandlerJson {
                action: Some("open".to_string()),
                accept: None,
            },
            FileHandlerJson {
                action: Some("open".to_string()),
                accept: accept(&[]),
            },
        ];

        let (accepted, rejections) = process_file_handlers(&handlers, &start, &scope);
        assert!(accepted.is_empty());
        assert_eq!(rejections.len(), 3);
        assert!(rejections
            .iter()
            .all(|r| r.reason == HandlerRejection::MissingField));
    }

    #[test]
    fn enforces_scope_on_absolute_actions() {
        let (start, scope) = urls();
        let handlers = vec![
            FileHandlerJson {
                action: Some("https://other.com/app/open".to_string()),
                accept: accept(&["image/png"]),
            },
            FileHandlerJson {
                action: Some("https://test.com/outside/open".to_string()),
                accept: accept(&["image/png"]),
            },
        ];

        let (accepted, rejections) = process_file_handlers(&handlers, &start, &scope);
        assert!(accepted.is_empty());
        let reasons: Vec<_> = rejections.iter().map(|r| r.reason).collect();
        assert_eq!(
            reasons,
            vec![HandlerRejection::OriginMismatch, HandlerRejection::OutOfScope]
        );
    }
}
