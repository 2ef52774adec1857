use serde::de::DeserializeOwned;
use std::io::{self, Read};

/// Read a piped loan input from stdin, as JSON or else YAML.
/// Returns None for an interactive terminal or an empty pipe.
pub fn read_stdin<T: DeserializeOwned>() -> Result<Option<T>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    parse_piped(&buffer)
}

fn parse_piped<T: DeserializeOwned>(raw: &str) -> Result<Option<T>, Box<dyn std::error::Error>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    match serde_json::from_str(trimmed) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(json_err) if trimmed.starts_with('{') => {
            Err(format!("Failed to parse stdin as JSON: {}", json_err).into())
        }
        Err(_) => serde_yaml::from_str(trimmed)
            .map(Some)
            .map_err(|e| format!("Failed to parse stdin as YAML: {}", e).into()),
    }
}
