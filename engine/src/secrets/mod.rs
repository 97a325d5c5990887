pub mod string;

pub use string::SecretString;

use regex::Regex;
use sdk::errors::EngineError;
use std::sync::OnceLock;

/// Variable consulted when the configured key variable is unset.
pub const FALLBACK_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Regex patterns for detecting common secret formats.
/// These are compiled once and reused for performance.
static SECRET_PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();

/// Initializes and returns the secret detection patterns.
///
/// Patterns match:
/// - OpenAI-style API keys: sk-[a-zA-Z0-9]{20,}
/// - Bearer tokens: Bearer\s+[^\s]{20,}
fn get_secret_patterns() -> &'static Vec<Regex> {
    SECRET_PATTERNS.get_or_init(|| {
        vec![
            // Covers sk-proj-, sk-test- and proxy keys sharing the prefix
            Regex::new(r"sk-[a-zA-Z0-9\-_]{20,}").expect("Invalid API key pattern"),
            Regex::new(r"Bearer\s+[^\s]{20,}").expect("Invalid Bearer pattern"),
        ]
    })
}

/// Replace anything that looks like a credential with `[REDACTED]`.
///
/// Provider error bodies are echoed into task logs and tracing output, so
/// they pass through here first.
pub fn scrub_secrets(text: &str) -> String {
    let mut result = text.to_string();
    for pattern in get_secret_patterns() {
        result = pattern.replace_all(&result, "[REDACTED]").to_string();
    }
    result
}

/// Read the LLM API key from the environment.
///
/// `var` is tried first, then [`FALLBACK_API_KEY_ENV`]. Blank values count
/// as missing.
pub fn api_key_from_env(var: &str) -> Result<SecretString, EngineError> {
    [var, FALLBACK_API_KEY_ENV]
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .map(SecretString::new)
        .find(|key| !key.is_empty())
        .ok_or_else(|| EngineError::MissingApiKey(var.to_string()))
}
