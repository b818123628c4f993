use std::path::{Path, PathBuf};

use confik::{Configuration, EnvSource};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use self::yaml::YamlFileSource;
use crate::sprig::builder::BuildOptions;
use crate::sprig::content::WalkPolicy;

pub const CONFIG_FILE: &str = "sprig.yml";

const DEFAULT_TITLE: &str = "Index";
const DEFAULT_CONTENT_DIR: &str = "content";
const DEFAULT_OUTPUT_DIR: &str = "output";
const DEFAULT_TEMPLATE_DIR: &str = "templates";

#[derive(Debug, Clone, Default, Serialize, Deserialize, Configuration)]
pub struct SiteSettings {
    /// Title handed to every template as `site.title`, and to the index as `title`.
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Configuration)]
pub struct PathsConfig {
    pub content: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub templates: Option<PathBuf>,
}

/// Settings read from `sprig.yml`, with environment variables layered on top
/// (`SITE__TITLE`, `PATHS__OUTPUT`, `ON_ERROR`, ...). Every key is optional.
///
/// ```yaml
/// site:
///   title: My notes
/// paths:
///   content: content
///   output: public
///   templates: layouts
/// on_error: collect
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, Configuration)]
pub struct SiteConfig {
    #[confik(default)]
    #[serde(default)]
    pub site: SiteSettings,
    #[confik(default)]
    #[serde(default)]
    pub paths: PathsConfig,
    pub on_error: Option<WalkPolicy>,
}

impl SiteConfig {
    /// Load `path` (if present) and environment overrides, falling back to the
    /// defaults when either fails to parse.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::try_load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                warn!(
                    "Failed to load {} or env overrides: {err}. Using defaults.",
                    path.display()
                );
                SiteConfig::default()
            }
        }
    }

    pub fn try_load(path: &Path) -> Result<Self, confik::Error> {
        let mut builder = SiteConfig::builder();

        if path.exists() {
            info!("Reading configuration from {}", path.display());
            builder.override_with(YamlFileSource::new(path));
        }

        builder.override_with(EnvSource::new());
        builder.try_build()
    }

    pub fn title(&self) -> &str {
        self.site.title.as_deref().unwrap_or(DEFAULT_TITLE)
    }

    pub fn content_dir(&self) -> &Path {
        dir_or(&self.paths.content, DEFAULT_CONTENT_DIR)
    }

    pub fn output_dir(&self) -> &Path {
        dir_or(&self.paths.output, DEFAULT_OUTPUT_DIR)
    }

    pub fn template_dir(&self) -> &Path {
        dir_or(&self.paths.templates, DEFAULT_TEMPLATE_DIR)
    }

    pub fn walk_policy(&self) -> WalkPolicy {
        self.on_error.unwrap_or_default()
    }

    pub fn build_options(&self) -> BuildOptions {
        BuildOptions::new(self.content_dir(), self.output_dir(), self.template_dir())
            .with_title(self.title())
            .with_walk_policy(self.walk_policy())
    }
}

fn dir_or<'a>(value: &'a Option<PathBuf>, default: &'static str) -> &'a Path {
    value.as_deref().unwrap_or_else(|| Path::new(default))
}

mod yaml {
    use std::error::Error;
    use std::path::PathBuf;

    use confik::{ConfigurationBuilder, Source};
    use serde::de::DeserializeOwned;

    #[derive(Debug)]
    pub struct YamlFileSource {
        path: PathBuf,
    }

    impl YamlFileSource {
        pub fn new(path: impl Into<PathBuf>) -> Self {
            Self { path: path.into() }
        }
    }

    impl<T> Source<T> for YamlFileSource
    where
        T: DeserializeOwned + ConfigurationBuilder,
    {
        fn allows_secrets(&self) -> bool {
            false
        }

        fn provide(&self) -> Result<T, Box<dyn Error + Sync + Send>> {
            let contents = std::fs::read_to_string(&self.path)?;
            let parsed = serde_yaml::from_str(&contents)?;
            Ok(parsed)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn defaults_match_conventional_layout() {
        let cfg = SiteConfig::default();
        assert_eq!(cfg.title(), "Index");
        assert_eq!(cfg.content_dir(), Path::new("content"));
        assert_eq!(cfg.output_dir(), Path::new("output"));
        assert_eq!(cfg.template_dir(), Path::new("templates"));
        assert_eq!(cfg.walk_policy(), WalkPolicy::FailFast);
    }

    #[test]
    fn reads_yaml_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(
            &path,
            "site:\n  title: Notes\npaths:\n  output: public\non_error: collect\n",
        )
        .unwrap();

        let cfg = SiteConfig::try_load(&path).unwrap();
        assert_eq!(cfg.title(), "Notes");
        assert_eq!(cfg.output_dir(), Path::new("public"));
        assert_eq!(cfg.content_dir(), Path::new("content"));
        assert_eq!(cfg.walk_policy(), WalkPolicy::Collect);

        let opts = cfg.build_options();
        assert_eq!(opts.site_title, "Notes");
        assert_eq!(opts.walk_policy, WalkPolicy::Collect);
    }

    #[test]
    fn unparsable_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "on_error: sometimes\n").unwrap();

        let cfg = SiteConfig::load(&path);
        assert_eq!(cfg.walk_policy(), WalkPolicy::FailFast);
    }
}
