//! Run-file template text handling.
//!
//! Templates use `{name}` placeholders with `{{` / `}}` for literal braces.
//! Values come from a typed parameter record; a placeholder the record does
//! not define is an error rather than silently left in the output.

use std::sync::LazyLock;

use anyhow::{Context, Result, bail};
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::error::RunError;

static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{|\}\}|\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder pattern is valid")
});

/// Drop `#` comments and surrounding whitespace from every line.
pub fn strip_comments(raw: &str) -> String {
    raw.lines()
        .map(|line| match line.find('#') {
            Some(idx) => line[..idx].trim(),
            None => line.trim(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Substitute `params` into `template`.
///
/// `params` must serialize to a JSON object; its fields are the placeholder
/// names. `template_name` only labels errors.
pub fn render<T: Serialize>(template_name: &str, template: &str, params: &T) -> Result<String> {
    let value = serde_json::to_value(params)
        .with_context(|| format!("serialize parameters for {template_name}"))?;
    let Value::Object(fields) = value else {
        bail!("parameters for {template_name} must be a record");
    };

    let mut out = String::with_capacity(template.len());
    let mut last = 0;
    for caps in PLACEHOLDER_RE.captures_iter(template) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        out.push_str(&template[last..whole.start()]);
        match caps.get(1) {
            // `{{` or `}}`
            None => out.push_str(&whole.as_str()[..1]),
            Some(name) => {
                let value = fields
                    .get(name.as_str())
                    .ok_or_else(|| RunError::UnknownPlaceholder {
                        template: template_name.to_string(),
                        name: name.as_str().to_string(),
                    })?;
                push_value(&mut out, value);
            }
        }
        last = whole.end();
    }
    out.push_str(&template[last..]);
    Ok(out)
}

fn push_value(out: &mut String, value: &Value) {
    match value {
        Value::String(s) => out.push_str(s),
        Value::Null => {}
        other => out.push_str(&other.to_string()),
    }
}
