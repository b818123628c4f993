use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::sprig::content::{ContentWalker, WalkPolicy};
use crate::sprig::error::{BuildError, Result};
use crate::sprig::templates::TemplateSet;
use crate::sprig::types::{INDEX_FILE, IndexView, Page};

/// Where a build is. Stages only move forward; any error lands in `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BuildStage {
    Init,
    TemplatesLoaded,
    PagesCollected,
    PagesSorted,
    OutputDirReady,
    PagesRendered,
    IndexRendered,
    Done,
    Failed,
}

impl fmt::Display for BuildStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub content_dir: PathBuf,
    pub output_dir: PathBuf,
    pub template_dir: PathBuf,
    pub site_title: String,
    pub walk_policy: WalkPolicy,
}

impl BuildOptions {
    pub fn new(
        content_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        template_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            content_dir: content_dir.into(),
            output_dir: output_dir.into(),
            template_dir: template_dir.into(),
            site_title: "Index".into(),
            walk_policy: WalkPolicy::default(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.site_title = title.into();
        self
    }

    pub fn with_walk_policy(mut self, policy: WalkPolicy) -> Self {
        self.walk_policy = policy;
        self
    }
}

/// What a successful build produced.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Output paths of the rendered pages, relative to the output root, in
    /// index order.
    pub pages_written: Vec<String>,
    pub index_path: PathBuf,
    /// Source files that failed and were skipped. Only ever non-empty with
    /// [`WalkPolicy::Collect`].
    pub skipped: Vec<BuildError>,
}

/// Build the site in `input_dir` into `output_dir` with the layouts in
/// `template_dir`, stopping at the first error.
pub fn build(
    input_dir: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    template_dir: impl AsRef<Path>,
) -> Result<BuildReport> {
    let opts = BuildOptions::new(
        input_dir.as_ref(),
        output_dir.as_ref(),
        template_dir.as_ref(),
    );
    SiteBuilder::new(opts).run()
}

/// Runs one build, exactly once.
///
/// Files written before a failure are left in place.
pub struct SiteBuilder {
    opts: BuildOptions,
    stage: BuildStage,
}

impl SiteBuilder {
    pub fn new(opts: BuildOptions) -> Self {
        Self {
            opts,
            stage: BuildStage::Init,
        }
    }

    pub fn stage(&self) -> BuildStage {
        self.stage
    }

    pub fn run(&mut self) -> Result<BuildReport> {
        if self.stage != BuildStage::Init {
            return Err(BuildError::AlreadyRan);
        }

        info!(
            "Building {} into {}",
            self.opts.content_dir.display(),
            self.opts.output_dir.display()
        );

        match self.execute() {
            Ok(report) => {
                self.advance(BuildStage::Done);
                info!(
                    "Built {} pages and {}",
                    report.pages_written.len(),
                    report.index_path.display()
                );
                Ok(report)
            }
            Err(err) => {
                debug!("build failed during {}: {err}", self.stage);
                self.stage = BuildStage::Failed;
                Err(err)
            }
        }
    }

    fn execute(&mut self) -> Result<BuildReport> {
        let templates = TemplateSet::load(&self.opts.template_dir)?;
        self.advance(BuildStage::TemplatesLoaded);

        let walker = ContentWalker::new(&self.opts.content_dir);
        let outcome = walker.collect(self.opts.walk_policy)?;
        let mut pages = outcome.pages;
        self.advance(BuildStage::PagesCollected);

        sort_pages(&mut pages);
        warn_on_duplicates(&pages);
        self.advance(BuildStage::PagesSorted);

        let out_root = self.opts.output_dir.clone();
        fs::create_dir_all(&out_root).map_err(|e| BuildError::fs(&out_root, e))?;
        self.advance(BuildStage::OutputDirReady);

        let mut pages_written = Vec::with_capacity(pages.len());
        for page in &pages {
            let html = templates.render_page(page, &self.opts.site_title)?;
            write_output(&out_root.join(page.output_path()), &html)?;
            debug!("wrote {} ({})", page.output_path(), page.source_path().display());
            pages_written.push(page.output_path().to_string());
        }
        self.advance(BuildStage::PagesRendered);

        let view = IndexView::new(&self.opts.site_title, &pages);
        let html = templates.render_index(&view)?;
        let index_path = out_root.join(INDEX_FILE);
        write_output(&index_path, &html)?;
        self.advance(BuildStage::IndexRendered);

        Ok(BuildReport {
            pages_written,
            index_path,
            skipped: outcome.skipped,
        })
    }

    fn advance(&mut self, next: BuildStage) {
        debug_assert!(next > self.stage, "{} -> {}", self.stage, next);
        debug!("build stage {} -> {}", self.stage, next);
        self.stage = next;
    }
}

/// Newest first. Stable, so equal dates (and undated pages, which count as the
/// oldest) keep discovery order.
pub fn sort_pages(pages: &mut [Page]) {
    pages.sort_by(|a, b| b.sort_date().cmp(&a.sort_date()));
}

fn warn_on_duplicates(pages: &[Page]) {
    let mut seen: HashMap<&str, &Path> = HashMap::new();
    for page in pages {
        if let Some(first) = seen.insert(page.output_path(), page.source_path()) {
            warn!(
                "{} and {} both render to {}; the later one wins",
                first.display(),
                page.source_path().display(),
                page.output_path()
            );
        }
    }
}

/// Rendered text goes in with one write, so a failed render never leaves a
/// partial file behind.
fn write_output(path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| BuildError::fs(parent, e))?;
    }
    fs::write(path, html).map_err(|e| BuildError::fs(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn page(name: &str, date: Option<&str>) -> Page {
        let raw = match date {
            Some(d) => format!("---\ndate: {d}\n---\n"),
            None => String::new(),
        };
        Page::build(
            &Path::new("content").join(format!("{name}.md")),
            Path::new("content"),
            raw.as_bytes(),
        )
        .unwrap()
    }

    fn order(pages: &[Page]) -> Vec<&str> {
        pages.iter().map(Page::slug).collect()
    }

    #[test]
    fn sorts_newest_first() {
        let mut pages = vec![
            page("jan", Some("2024-01-01")),
            page("mar", Some("2024-03-01")),
            page("feb", Some("2024-02-01")),
        ];
        sort_pages(&mut pages);
        assert_eq!(order(&pages), ["mar", "feb", "jan"]);
        assert_eq!(pages[0].date(), NaiveDate::from_ymd_opt(2024, 3, 1));
    }

    #[test]
    fn undated_pages_sort_last_in_discovery_order() {
        let mut pages = vec![
            page("undated-a", None),
            page("old", Some("1970-01-01")),
            page("undated-b", None),
            page("new", Some("2024-01-01")),
        ];
        sort_pages(&mut pages);
        assert_eq!(order(&pages), ["new", "old", "undated-a", "undated-b"]);
    }

    #[test]
    fn ties_keep_discovery_order() {
        let mut pages = vec![
            page("b", Some("2024-01-01")),
            page("a", Some("2024-01-01")),
        ];
        sort_pages(&mut pages);
        assert_eq!(order(&pages), ["b", "a"]);
    }

    #[test]
    fn options_builder() {
        let opts = BuildOptions::new("in", "out", "tpl")
            .with_title("Garden")
            .with_walk_policy(WalkPolicy::Collect);
        assert_eq!(opts.content_dir, PathBuf::from("in"));
        assert_eq!(opts.site_title, "Garden");
        assert_eq!(opts.walk_policy, WalkPolicy::Collect);
    }
}
