//! Digital Asset Links statement generation.
//!
//! The statement list published at
//! `https://<host>/.well-known/assetlinks.json` is what lets Android verify
//! the app is allowed to handle the site's URLs.

use serde_json::{json, Value};

/// Builds the `assetlinks.json` content for a package and its signing key
/// fingerprints.
pub fn generate_asset_links(package_id: &str, sha256_fingerprints: &[&str]) -> String {
    let statements: Vec<Value> = sha256_fingerprints
        .iter()
        .map(|fingerprint| {
            json!({
                "relation": ["delegate_permission/common.handle_all_urls"],
                "target": {
                    "namespace": "android_app",
                    "package_name": package_id,
                    "sha256_cert_fingerprints": [fingerprint],
                },
            })
        })
        .collect();
    serde_json::to_string_pretty(&Value::Array(statements))
        .expect("assetlinks serialization cannot fail")
}
