//! Wrapper around the JDK `keytool` command.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{bail, Result};

use super::jdk::JdkHelper;
use super::process::execute_file;

/// Parsed `keytool -list -v` output. Only the certificate fingerprints are
/// extracted.
#[derive(Debug, PartialEq, Eq)]
pub struct KeyInfo {
    pub fingerprints: BTreeMap<String, String>,
}

impl KeyInfo {
    pub fn sha256(&self) -> Option<&str> {
        self.fingerprints.get("SHA256").map(String::as_str)
    }
}

pub struct KeyOptions<'a> {
    pub path: &'a str,
    pub alias: &'a str,
    pub password: &'a str,
    pub keypassword: &'a str,
}

pub struct CreateKeyOptions<'a> {
    pub key: KeyOptions<'a>,
    pub full_name: &'a str,
    pub organizational_unit: &'a str,
    pub organization: &'a str,
    pub country: &'a str,
}

pub struct KeyTool<'a> {
    jdk: &'a JdkHelper,
}

impl<'a> KeyTool<'a> {
    pub fn new(jdk: &'a JdkHelper) -> Self {
        Self { jdk }
    }

    /// Creates a new signing key. An existing keystore is left untouched
    /// unless `overwrite` is set.
    pub fn create_signing_key(&self, options: &CreateKeyOptions, overwrite: bool) -> Result<()> {
        if Path::new(options.key.path).exists() {
            if !overwrite {
                log::info!("Signing key already exists at {}", options.key.path);
                return Ok(());
            }
            fs::remove_file(options.key.path)?;
        }

        let dname = format!(
            "cn={}, ou={}, o={}, c={}",
            escape_dname(options.full_name),
            escape_dname(options.organizational_unit),
            escape_dname(options.organization),
            escape_dname(options.country),
        );

        execute_file(
            "keytool",
            &[
                "-genkeypair",
                "-dname",
                &dname,
                "-alias",
                options.key.alias,
                "-keypass",
                options.key.keypassword,
                "-keystore",
                options.key.path,
                "-storepass",
                options.key.password,
                "-validity",
                "20000",
                "-keyalg",
                "RSA",
            ],
            &self.jdk.env(),
            None,
        )?;
        log::info!("Signing Key created successfully");
        Ok(())
    }

    /// Runs `keytool -list -v` and returns the raw output.
    pub fn list(&self, options: &KeyOptions) -> Result<String> {
        if !Path::new(options.path).exists() {
            bail!("Couldn't find signing key at \"{}\"", options.path);
        }
        let output = execute_file(
            "keytool",
            &[
                // Forces the language to 'en' in order to get the expected
                // formatting. The JVM ignores LANG and LC_ALL here.
                "-J-Duser.language=en",
                "-list",
                "-v",
                "-keystore",
                options.path,
                "-alias",
                options.alias,
                "-storepass",
                options.password,
                "-keypass",
                options.keypassword,
            ],
            &self.jdk.env(),
            None,
        )?;
        Ok(output.stdout)
    }

    pub fn key_info(&self, options: &KeyOptions) -> Result<KeyInfo> {
        Ok(parse_key_info(&self.list(options)?))
    }
}

/// Commas in keytool dname values must be escaped, so `te,st` becomes
/// `te\,st`.
fn escape_dname(input: &str) -> String {
    input.replace(',', "\\,")
}

/// Extracts the SHA1/SHA256 fingerprints out of `keytool -list -v` output.
pub fn parse_key_info(raw: &str) -> KeyInfo {
    let mut fingerprints = BTreeMap::new();
    for line in raw.lines() {
        let line = line.trim();
        for tag in ["SHA1", "SHA256"] {
            if let Some(rest) = line.strip_prefix(tag) {
                if let Some(value) = rest.strip_prefix(':') {
                    fingerprints.insert(tag.to_string(), value.trim().to_string());
                }
            }
        }
    }
    KeyInfo { fingerprints }
}
