//! `${field}` substitution for the templated project files.
//!
//! Deliberately minimal: no conditionals, no loops. Anything that needs
//! repetition (permissions, intent filters, code snippets) is pre-rendered
//! into a single string by the feature manager before substitution.

use std::collections::BTreeMap;

use anyhow::{bail, Result};

/// The values available to a template. Field names match the camelCase keys
/// of the persisted manifest.
pub type TemplateContext = BTreeMap<&'static str, String>;

/// Replaces every `${field}` in `input` with its value from `context`.
///
/// A placeholder with no matching field is an error: a typo in a template
/// must not silently leak `${...}` into a generated build file. A lone `$`
/// without a brace passes through untouched.
pub fn render(input: &str, context: &TemplateContext) -> Result<String> {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        output.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            bail!("unterminated placeholder in template: `{}`", &rest[start..]);
        };
        let field = &after[..end];
        match context.get(field) {
            Some(value) => output.push_str(value),
            None => bail!("unknown template field `{field}`"),
        }
        rest = &after[end + 1..];
    }
    output.push_str(rest);
    Ok(output)
}
