use serde_json::Value;
use std::io::{self, Read};

/// Read a loan document piped on stdin, JSON or YAML.
/// Returns None when stdin is a TTY or blank.
pub fn read_stdin() -> Result<Option<Value>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    parse_document(&buffer)
}

/// JSON first; anything that is not JSON is tried as YAML. A YAML scalar
/// (e.g. a stray word) is not a loan document and is rejected.
fn parse_document(text: &str) -> Result<Option<Value>, Box<dyn std::error::Error>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        tracing::debug!(bytes = trimmed.len(), "stdin parsed as JSON");
        return Ok(Some(value));
    }

    let value: Value = serde_yaml::from_str(trimmed)
        .map_err(|e| format!("stdin is neither JSON nor YAML: {e}"))?;
    if !value.is_object() {
        return Err("stdin must contain a JSON or YAML mapping".into());
    }
    tracing::debug!(bytes = trimmed.len(), "stdin parsed as YAML");
    Ok(Some(value))
}
