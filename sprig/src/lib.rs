//! Turn a tree of Markdown notes into a static HTML site.
//!
//! Every `.md` file under the content root becomes `<slug>/index.html`,
//! rendered through a handlebars layout, and the output root gets an
//! `index.html` listing every page newest first.

pub mod sprig;

use std::path::Path;

use anyhow::{Context, bail};
use log::warn;

pub use crate::sprig::{BuildError, BuildReport, SiteConfig, build};

/// Load configuration from `config_path` and run one build with it.
pub fn run(config_path: impl AsRef<Path>) -> anyhow::Result<BuildReport> {
    let config = SiteConfig::load(config_path);
    let opts = config.build_options();

    let report = sprig::SiteBuilder::new(opts.clone())
        .run()
        .with_context(|| format!("building {}", opts.content_dir.display()))?;

    for err in &report.skipped {
        warn!("skipped: {err}");
    }
    if !report.skipped.is_empty() {
        bail!(
            "{} source file(s) failed and were skipped; the rest of the site was written to {}",
            report.skipped.len(),
            opts.output_dir.display()
        );
    }

    Ok(report)
}
