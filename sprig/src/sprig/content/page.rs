use std::path::{Component, Path};

use chrono::NaiveDate;

use crate::sprig::content::frontmatter::FrontMatter;
use crate::sprig::content::markdown::render_markdown;
use crate::sprig::error::{BuildError, Result};
use crate::sprig::types::{DATE_FORMAT, DEFAULT_LAYOUT, Page, output_path_for, slug_from_path};

impl Page {
    /// Turn one source file into a `Page`. Pure: the caller has already read
    /// `raw`.
    pub fn build(source_path: &Path, content_root: &Path, raw: &[u8]) -> Result<Page> {
        let text = std::str::from_utf8(raw).map_err(|source| BuildError::InvalidUtf8 {
            path: source_path.to_path_buf(),
            source,
        })?;

        let FrontMatter { metadata, body } = FrontMatter::split(text, source_path)?;

        let date = parse_date(metadata.date.as_deref(), source_path)?;

        let layout = non_empty(metadata.layout)
            .unwrap_or_else(|| DEFAULT_LAYOUT.to_string());

        let slug = match non_empty(metadata.slug) {
            Some(explicit) => validate_slug(&explicit, source_path)?,
            None => slug_from_path(source_path, content_root).ok_or_else(|| {
                BuildError::OutsideContentRoot {
                    path: source_path.to_path_buf(),
                    root: content_root.to_path_buf(),
                }
            })?,
        };

        let output_path = output_path_for(&slug);
        let html = render_markdown(&body, source_path)?;

        Ok(Page {
            title: metadata.title.unwrap_or_default(),
            date,
            tags: metadata.tags.unwrap_or_default(),
            slug,
            layout,
            body,
            html,
            output_path,
            source_path: source_path.to_path_buf(),
        })
    }
}

fn parse_date(raw: Option<&str>, path: &Path) -> Result<Option<NaiveDate>> {
    let Some(value) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    let invalid = |reason: String| BuildError::InvalidDateFormat {
        path: path.to_path_buf(),
        value: value.to_string(),
        reason,
    };

    // chrono alone would also take `2024-5-1` and `+2024-05-01`.
    if !is_iso_date_shape(value) {
        return Err(invalid("expected four-digit year, two-digit month and day".into()));
    }

    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map(Some)
        .map_err(|e| invalid(e.to_string()))
}

fn is_iso_date_shape(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Explicit slugs become directories under the output root, so they must stay
/// relative and free of `.`/`..` segments.
fn validate_slug(raw: &str, path: &Path) -> Result<String> {
    let invalid = |reason| BuildError::InvalidSlug {
        path: path.to_path_buf(),
        slug: raw.to_string(),
        reason,
    };

    if raw.contains('\\') {
        return Err(invalid("backslashes are not allowed"));
    }

    let slug = raw.trim_matches('/');
    if slug.is_empty() {
        return Err(invalid("slug is empty"));
    }

    for segment in slug.split('/') {
        if segment.is_empty() {
            return Err(invalid("empty path segment"));
        }
        if !matches!(Path::new(segment).components().next(), Some(Component::Normal(_))) {
            return Err(invalid("`.` and `..` segments are not allowed"));
        }
    }

    Ok(slug.to_string())
}
