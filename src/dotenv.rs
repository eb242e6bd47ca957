//! `.env` file reading and writing.
//!
//! Parsing is `dotenvy`'s grammar (`export ` prefix, `#` comments, single-
//! and double-quoted values, `$VAR` substitution outside single quotes)
//! with variable names additionally held to [`validate_key`]. Nothing is
//! loaded into the process environment here.

use std::path::Path;

use crate::core::types::EnvMap;
use crate::core::validation::validate_key;
use crate::error::{DotenvError, Result};

/// Parse a `.env` file.
pub fn parse_file(path: &Path) -> Result<EnvMap> {
    if !path.exists() {
        return Err(DotenvError::NotFound(path.display().to_string()).into());
    }
    let contents = std::fs::read_to_string(path)?;
    Ok(parse_str(&contents, &path.display().to_string())?)
}

/// Parse `.env` contents. `origin` labels errors.
///
/// Later assignments of the same key win.
pub fn parse_str(contents: &str, origin: &str) -> std::result::Result<EnvMap, DotenvError> {
    let invalid = |line: usize, reason: String| DotenvError::InvalidLine {
        path: origin.to_string(),
        line,
        reason,
    };

    let mut parsed = EnvMap::new();
    for item in dotenvy::from_read_iter(contents.as_bytes()) {
        let (key, value) = match item {
            Ok(pair) => pair,
            Err(dotenvy::Error::LineParse(text, _)) => {
                let line = line_containing(contents, &text);
                return Err(invalid(line, format!("cannot parse '{}'", text.trim())));
            }
            Err(e) => return Err(invalid(0, e.to_string())),
        };

        validate_key(&key).map_err(|e| invalid(line_assigning(contents, &key), e.to_string()))?;
        parsed.insert(key, value);
    }

    Ok(parsed)
}

/// 1-based number of the line `text` starts on, or 0 if it can't be found.
fn line_containing(contents: &str, text: &str) -> usize {
    let first = text.lines().next().unwrap_or_default().trim();
    contents
        .lines()
        .position(|line| line.trim() == first)
        .map_or(0, |i| i + 1)
}

/// 1-based number of the first line assigning `key`, or 0.
fn line_assigning(contents: &str, key: &str) -> usize {
    contents
        .lines()
        .position(|line| {
            let line = line.trim_start();
            let line = line.strip_prefix("export ").unwrap_or(line).trim_start();
            line.strip_prefix(key)
                .is_some_and(|rest| rest.trim_start().starts_with('='))
        })
        .map_or(0, |i| i + 1)
}

/// Render a mapping as `.env` lines.
///
/// Values containing whitespace, `#`, `=`, `$`, quotes or backslashes are
/// double-quoted and escaped so that [`parse_str`] reads them back
/// unchanged.
pub fn render_dotenv(map: &EnvMap) -> String {
    let mut output = String::new();

    for (key, value) in map {
        let needs_quotes = value.is_empty()
            || value
                .chars()
                .any(|c| matches!(c, ' ' | '#' | '=' | '$' | '"' | '\'' | '\\' | '\n' | '\r' | '\t'));
        if needs_quotes {
            output.push_str(&format!("{}=\"{}\"\n", key, escape(value)));
        } else {
            output.push_str(&format!("{}={}\n", key, value));
        }
    }

    output
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '$' => out.push_str("\\$"),
            '\n' => out.push_str("\\n"),
            other => out.push(other),
        }
    }
    out
}

/// Render a mapping as a pretty JSON object.
pub fn render_json(map: &EnvMap) -> Result<String> {
    Ok(serde_json::to_string_pretty(map)?)
}
