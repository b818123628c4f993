pub mod builder;
pub mod config;
pub mod content;
pub mod error;
pub mod templates;
pub mod types;

pub use builder::{BuildOptions, BuildReport, BuildStage, SiteBuilder, build};
pub use config::SiteConfig;
pub use content::{ContentWalker, WalkPolicy};
pub use error::{BuildError, Result};
pub use templates::TemplateSet;
pub use types::{IndexView, Page, PageContext, PageView};

