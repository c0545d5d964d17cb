//! Small helpers shared across the manifest and generator layers.

/// Characters allowed in an Android application id. Everything else is
/// replaced with `_` when deriving a package id from a hostname.
/// https://developer.android.com/guide/topics/manifest/manifest-element.html#package
fn is_allowed_package_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}

// Java keywords cannot be used as package segments. The convention is to
// prefix the segment with an underscore.
// https://docs.oracle.com/javase/specs/jls/se11/html/jls-3.html#jls-3.9
const JAVA_KEYWORDS: &[&str] = &[
    "abstract",
    "assert",
    "boolean",
    "break",
    "byte",
    "case",
    "catch",
    "char",
    "class",
    "const",
    "continue",
    "default",
    "do",
    "double",
    "else",
    "enum",
    "extends",
    "final",
    "finally",
    "float",
    "for",
    "goto",
    "if",
    "implements",
    "import",
    "instanceof",
    "int",
    "interface",
    "long",
    "native",
    "new",
    "package",
    "private",
    "protected",
    "public",
    "return",
    "short",
    "static",
    "strictfp",
    "super",
    "switch",
    "synchronized",
    "this",
    "throw",
    "throws",
    "transient",
    "try",
    "void",
    "volatile",
    "while",
];

/// Generates an Android application id from a hostname, reversing the
/// dot-separated labels and appending a `twa` label.
///
/// Characters that are not valid in a package id are replaced with `_`.
/// No structural validation happens here; [`validate_package_id`] is the
/// authoritative check and runs when the manifest is validated.
pub fn generate_package_id(host: &str) -> Option<String> {
    let host = host.trim();
    if host.is_empty() {
        return None;
    }

    let mut segments = Vec::new();
    for part in host.split('.').rev() {
        if part.trim().is_empty() {
            continue;
        }
        if JAVA_KEYWORDS.contains(&part) {
            segments.push(format!("_{part}"));
        } else {
            segments.push(part.to_string());
        }
    }

    if segments.is_empty() {
        return None;
    }

    segments.push("twa".to_string());
    let package_id = segments
        .join(".")
        .chars()
        .map(|c| if is_allowed_package_char(c) { c } else { '_' })
        .collect();
    Some(package_id)
}

/// Validates that a string is neither empty nor whitespace-only.
pub fn validate_not_empty(input: &str, field_name: &str) -> Result<(), String> {
    if input.trim().is_empty() {
        return Err(format!("{field_name} cannot be empty"));
    }
    Ok(())
}

/// Validates an Android application id.
/// https://developer.android.com/studio/build/application-id
///
/// - At least two `.`-separated segments.
/// - Each segment starts with a letter.
/// - Segments contain only `[a-zA-Z0-9_]`.
/// - No segment is a Java keyword.
pub fn validate_package_id(input: &str) -> Result<(), String> {
    validate_not_empty(input, "packageId")?;

    let parts: Vec<&str> = input.split('.').collect();
    if parts.len() < 2 {
        return Err("packageId must have at least 2 sections separated by \".\"".to_string());
    }

    for part in parts {
        if JAVA_KEYWORDS.contains(&part) {
            return Err(format!(
                "Invalid packageId section: \"{part}\". {part} is a Java keyword and cannot be \
                 used as a package section. Consider adding an \"_\" before the section name."
            ));
        }

        let mut chars = part.chars();
        let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
        if !starts_with_letter || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(format!(
                "Invalid packageId section: \"{part}\". Only alphanumeric characters and \
                 underscore [a-zA-Z0-9_] are allowed in packageId sections. Each section must \
                 start with a letter [a-zA-Z]"
            ));
        }
    }
    Ok(())
}

/// Escapes `"` for embedding inside a double-quoted JSON string that is
/// itself written into a generated source file.
pub fn escape_json_string(input: &str) -> String {
    input.replace('"', "\\\\\"")
}

/// Escapes `\` and `'` for a string written to the generated Gradle file.
/// The escapes are doubled because the value passes through Gradle before
/// reaching AAPT.
pub fn escape_gradle_string(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '\\' | '\'' => {
                escaped.push_str("\\\\\\");
                escaped.push(c);
            }
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_package_id_from_host() {
        assert_eq!(
            generate_package_id("pwa-directory-test.appspot.com").as_deref(),
            Some("com.appspot.pwa_directory_test.twa")
        );
    }

    #[test]
    fn generation_does_not_reject_leading_digits() {
        // Rejecting digit-leading segments is validate_package_id's job.
        assert_eq!(
            generate_package_id("1pwadirectory").as_deref(),
            Some("1pwadirectory.twa")
        );
    }

    #[test]
    fn skips_empty_host_labels() {
        assert_eq!(
            generate_package_id("..example..com.").as_deref(),
            Some("com.example.twa")
        );
    }

    #[test]
    fn prefixes_java_keyword_labels() {
        assert_eq!(
            generate_package_id("do.example.com").as_deref(),
            Some("com.example._do.twa")
        );
    }

    #[test]
    fn rejects_empty_host() {
        assert_eq!(generate_package_id(""), None);
        assert_eq!(generate_package_id("   "), None);
        assert_eq!(generate_package_id("..."), None);
    }

    #[test]
    fn validates_package_id_segments() {
        assert!(validate_package_id("com.example.twa").is_ok());
        assert!(validate_package_id("com").is_err());
        assert!(validate_package_id("com..twa").is_err());
        assert!(validate_package_id("1pwadirectory.twa").is_err());
        assert!(validate_package_id("com.example-dash.twa").is_err());
        assert!(validate_package_id("com.class.twa").is_err());
    }

    #[test]
    fn validate_not_empty_trims_whitespace() {
        assert!(validate_not_empty("host", "host").is_ok());
        assert_eq!(
            validate_not_empty("  ", "host"),
            Err("host cannot be empty".to_string())
        );
    }

    #[test]
    fn escapes_gradle_strings() {
        assert_eq!(escape_gradle_string("Andre's Code"), "Andre\\\\\\'s Code");
        assert_eq!(escape_gradle_string("plain"), "plain");
    }
}
