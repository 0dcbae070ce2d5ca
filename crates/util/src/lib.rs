use once_cell::sync::Lazy;
use regex::Regex;

pub mod path_processing;
pub use path_processing::{IDENTITIES_PATH_ENV, default_identities_path, expand_tilde};

static SECRET_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(--private-key[ =])(\S+)",
        r#"(?i)("?private_key"?\s*[:=]\s*"?)([0-9a-fx]+)"#,
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

/// Redacts values that look like secrets in a string.
///
/// Used on rendered command lines before they are logged, since account
/// registration passes private keys as arguments.
pub fn redact_sensitive(input: &str) -> String {
    let mut redacted = input.to_string();
    for re in SECRET_PATTERNS.iter() {
        redacted = re
            .replace_all(&redacted, |caps: &regex::Captures| {
                let prefix = caps.get(1).map(|m| m.as_str()).unwrap_or("");
                format!("{}<redacted>", prefix)
            })
            .to_string();
    }
    redacted
}
