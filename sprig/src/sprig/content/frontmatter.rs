use std::path::Path;

use serde::de::DeserializeOwned;
use serde_yaml::{Mapping, Value};

use crate::sprig::error::{BuildError, Result};
use crate::sprig::types::PageMetadata;

const DELIMITER: &str = "---";

/// A document split into its metadata and Markdown body.
#[derive(Debug, Default, PartialEq)]
pub struct FrontMatter {
    pub metadata: PageMetadata,
    pub body: String,
}

impl FrontMatter {
    /// Split `content` on a leading `---` block.
    ///
    /// No opening delimiter means no metadata and the whole text is body.
    /// An opening delimiter without a closing one is an error.
    pub fn split(content: &str, path: &Path) -> Result<Self> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let mut lines = content.lines();

        if lines.next().map(str::trim_end) != Some(DELIMITER) {
            return Ok(FrontMatter {
                metadata: PageMetadata::default(),
                body: content.trim().to_string(),
            });
        }

        let mut fm_lines = vec![];
        let mut closed = false;
        for line in lines.by_ref() {
            if line.trim_end() == DELIMITER {
                closed = true;
                break;
            }
            fm_lines.push(line);
        }

        if !closed {
            return Err(BuildError::MalformedFrontMatter {
                path: path.to_path_buf(),
            });
        }

        let remainder = lines.collect::<Vec<&str>>().join("\n");
        let metadata = decode(&fm_lines.join("\n"), path)?;

        Ok(FrontMatter {
            metadata,
            body: remainder.trim().to_string(),
        })
    }
}

fn decode(yaml_str: &str, path: &Path) -> Result<PageMetadata> {
    if yaml_str.trim().is_empty() {
        return Ok(PageMetadata::default());
    }

    let decode_err = |field: Option<&str>, message: String| BuildError::FrontMatterDecode {
        path: path.to_path_buf(),
        field: field.map(str::to_string),
        message,
    };

    let parsed: Value =
        serde_yaml::from_str(yaml_str).map_err(|e| decode_err(None, e.to_string()))?;
    let map = match parsed {
        Value::Mapping(map) => map,
        Value::Null => return Ok(PageMetadata::default()),
        other => {
            return Err(decode_err(
                None,
                format!("expected a mapping at the top level, found {}", kind(&other)),
            ));
        }
    };

    // Fields are decoded one at a time so a mismatch can name its key.
    let text = |name: &'static str| -> Result<Option<String>> {
        decode_text(&map, name).map_err(|e| decode_err(Some(name), e.to_string()))
    };

    Ok(PageMetadata {
        title: text("title")?,
        date: text("date")?,
        tags: decode_field(&map, "tags")
            .map_err(|e| decode_err(Some("tags"), e.to_string()))?,
        slug: text("slug")?,
        layout: text("layout")?,
    })
}

fn decode_field<T: DeserializeOwned>(map: &Mapping, name: &str) -> serde_yaml::Result<Option<T>> {
    match map.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_yaml::from_value(value.clone()).map(Some),
    }
}

/// Text fields take any scalar as written: `title: 1984` is the title "1984".
fn decode_text(map: &Mapping, name: &str) -> serde_yaml::Result<Option<String>> {
    match map.get(name) {
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        _ => decode_field(map, name),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
