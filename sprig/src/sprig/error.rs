use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = BuildError> = std::result::Result<T, E>;

/// Everything that can stop a site build.
///
/// Each variant carries enough context (source path, page slug or template
/// name) for the message to point at the offending input on its own.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("malformed front matter in {}: opening `---` has no closing delimiter", .path.display())]
    MalformedFrontMatter { path: PathBuf },

    #[error("invalid front matter in {}{}: {message}", .path.display(), field_suffix(.field))]
    FrontMatterDecode {
        path: PathBuf,
        field: Option<String>,
        message: String,
    },

    #[error("invalid date format in {}: {value:?} is not YYYY-MM-DD ({reason})", .path.display())]
    InvalidDateFormat {
        path: PathBuf,
        value: String,
        reason: String,
    },

    #[error("{} is not valid UTF-8", .path.display())]
    InvalidUtf8 {
        path: PathBuf,
        #[source]
        source: std::str::Utf8Error,
    },

    #[error("invalid slug {slug:?} in {}: {reason}", .path.display())]
    InvalidSlug {
        path: PathBuf,
        slug: String,
        reason: &'static str,
    },

    #[error("{} is not inside content root {}", .path.display(), .root.display())]
    OutsideContentRoot { path: PathBuf, root: PathBuf },

    #[error("rendering markdown in {}: {message}", .path.display())]
    Markdown { path: PathBuf, message: String },

    #[error("filesystem error at {}: {source}", .path.display())]
    FileSystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("walking content root {}: {source}", .root.display())]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("loading templates from {}: {message}", .path.display())]
    TemplateLoad { path: PathBuf, message: String },

    #[error("page {slug:?} uses layout {layout:?}, but no such template was loaded")]
    TemplateNotFound { slug: String, layout: String },

    #[error("rendering {target:?} with template {template:?}: {source}")]
    TemplateExecution {
        target: String,
        template: String,
        #[source]
        source: Box<handlebars::RenderError>,
    },

    #[error("this builder has already run; create a new one for another build")]
    AlreadyRan,
}

impl BuildError {
    pub(crate) fn fs(path: impl Into<PathBuf>, source: io::Error) -> Self {
        BuildError::FileSystem {
            path: path.into(),
            source,
        }
    }

    /// The source file this error is about, when there is one.
    pub fn source_path(&self) -> Option<&std::path::Path> {
        match self {
            BuildError::MalformedFrontMatter { path }
            | BuildError::FrontMatterDecode { path, .. }
            | BuildError::InvalidDateFormat { path, .. }
            | BuildError::InvalidUtf8 { path, .. }
            | BuildError::InvalidSlug { path, .. }
            | BuildError::OutsideContentRoot { path, .. }
            | BuildError::Markdown { path, .. }
            | BuildError::FileSystem { path, .. }
            | BuildError::TemplateLoad { path, .. } => Some(path),
            BuildError::Walk { root, .. } => Some(root),
            BuildError::TemplateNotFound { .. }
            | BuildError::TemplateExecution { .. }
            | BuildError::AlreadyRan => None,
        }
    }
}

fn field_suffix(field: &Option<String>) -> String {
    match field {
        Some(name) => format!(" (field `{name}`)"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_error_names_field() {
        let err = BuildError::FrontMatterDecode {
            path: PathBuf::from("content/post.md"),
            field: Some("tags".into()),
            message: "expected a sequence".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("content/post.md"), "{msg}");
        assert!(msg.contains("field `tags`"), "{msg}");
    }

    #[test]
    fn decode_error_without_field() {
        let err = BuildError::FrontMatterDecode {
            path: PathBuf::from("a.md"),
            field: None,
            message: "bad yaml".into(),
        };
        assert_eq!(err.to_string(), "invalid front matter in a.md: bad yaml");
    }

    #[test]
    fn source_path_points_at_file() {
        let err = BuildError::MalformedFrontMatter {
            path: PathBuf::from("x/y.md"),
        };
        assert_eq!(err.source_path(), Some(std::path::Path::new("x/y.md")));
        assert!(BuildError::AlreadyRan.source_path().is_none());
    }
}
