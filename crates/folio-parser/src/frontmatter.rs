//! YAML front matter splitting.

use folio_core::Metadata;
use serde_json::Value;

/// Front matter failure, converted to a parse error by the caller.
#[derive(Debug, thiserror::Error)]
pub(crate) enum FrontMatterError {
    #[error("front matter is not terminated by a '---' line")]
    Unterminated,
    #[error("front matter must be a mapping, found {0}")]
    NotMapping(&'static str),
    #[error("invalid front matter YAML")]
    Yaml(#[source] serde_yaml::Error),
}

/// Split a leading `---` delimited YAML block from the document body.
///
/// Returns empty metadata and the full input when no block is present.
/// The closing delimiter may be `---` or `...`.
pub(crate) fn split(source: &str) -> Result<(Metadata, &str), FrontMatterError> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    let Some(rest) = strip_delimiter_line(source) else {
        return Ok((Metadata::new(), source));
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        let trimmed = line.trim_end();
        if trimmed == "---" || trimmed == "..." {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Ok((decode(yaml)?, body));
        }
        offset += line.len();
    }

    Err(FrontMatterError::Unterminated)
}

fn strip_delimiter_line(source: &str) -> Option<&str> {
    let rest = source.strip_prefix("---")?;
    let rest = rest.trim_start_matches([' ', '\t']);
    rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n'))
}

fn decode(yaml: &str) -> Result<Metadata, FrontMatterError> {
    if yaml.trim().is_empty() {
        return Ok(Metadata::new());
    }

    let value: Value = serde_yaml::from_str(yaml).map_err(FrontMatterError::Yaml)?;
    match value {
        Value::Object(map) => Ok(map.into_iter().collect()),
        Value::Null => Ok(Metadata::new()),
        Value::Bool(_) => Err(FrontMatterError::NotMapping("a boolean")),
        Value::Number(_) => Err(FrontMatterError::NotMapping("a number")),
        Value::String(_) => Err(FrontMatterError::NotMapping("a string")),
        Value::Array(_) => Err(FrontMatterError::NotMapping("a sequence")),
    }
}
