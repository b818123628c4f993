use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_LAYOUT: &str = "page";
pub const INDEX_TEMPLATE: &str = "index";
pub const INDEX_FILE: &str = "index.html";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Fields recognised in a document's front matter. Anything else is ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
}

/// One parsed source document. Built once by `Page::build` and read-only
/// afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct Page {
    pub(crate) title: String,
    pub(crate) date: Option<NaiveDate>,
    pub(crate) tags: Vec<String>,
    pub(crate) slug: String,
    pub(crate) layout: String,
    pub(crate) body: String,
    pub(crate) html: String,
    pub(crate) output_path: String,
    pub(crate) source_path: PathBuf,
}

impl Page {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn layout(&self) -> &str {
        &self.layout
    }

    /// Markdown source with front matter removed.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Rendered HTML fragment. Trusted: templates emit it unescaped.
    pub fn html(&self) -> &str {
        &self.html
    }

    /// `<slug>/index.html`, relative to the output root, `/`-separated.
    pub fn output_path(&self) -> &str {
        &self.output_path
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Key used for newest-first ordering. Undated pages count as the oldest.
    pub fn sort_date(&self) -> NaiveDate {
        self.date.unwrap_or(NaiveDate::MIN)
    }
}

pub fn output_path_for(slug: &str) -> String {
    format!("{slug}/{INDEX_FILE}")
}

/// Slug for a file that doesn't declare one: its path under `content_root`
/// without the extension, always `/`-separated.
pub fn slug_from_path(path: &Path, content_root: &Path) -> Option<String> {
    let rel = path.strip_prefix(content_root).ok()?;
    let segments: Vec<String> = rel
        .with_extension("")
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    let slug = segments.join("/").replace('\\', "/");
    if slug.is_empty() { None } else { Some(slug) }
}

/// View of the site handed to every template.
#[derive(Clone, Debug, Serialize)]
pub struct SiteView<'a> {
    pub title: &'a str,
}

/// What a layout template can see of a page.
#[derive(Clone, Debug, Serialize)]
pub struct PageView<'a> {
    pub title: &'a str,
    /// `YYYY-MM-DD`, or null so `{{#if page.date}}` works in strict mode.
    pub date: Option<String>,
    pub tags: &'a [String],
    pub slug: &'a str,
    pub layout: &'a str,
    pub url: String,
    pub content: &'a str,
}

impl<'a> From<&'a Page> for PageView<'a> {
    fn from(page: &'a Page) -> Self {
        PageView {
            title: &page.title,
            date: page.date.map(|d| d.format(DATE_FORMAT).to_string()),
            tags: &page.tags,
            slug: &page.slug,
            layout: &page.layout,
            url: format!("/{}/", page.slug),
            content: &page.html,
        }
    }
}

/// Context for a single page render: `{{page.title}}`, `{{site.title}}`.
#[derive(Clone, Debug, Serialize)]
pub struct PageContext<'a> {
    pub site: SiteView<'a>,
    pub page: PageView<'a>,
}

/// Context for the index template: the site title and every page, newest first.
/// `site` is repeated so layouts shared with pages can use `{{site.title}}`.
#[derive(Clone, Debug, Serialize)]
pub struct IndexView<'a> {
    pub site: SiteView<'a>,
    pub title: &'a str,
    pub pages: Vec<PageView<'a>>,
}

impl<'a> IndexView<'a> {
    pub fn new(title: &'a str, pages: &'a [Page]) -> Self {
        Self {
            site: SiteView { title },
            title,
            pages: pages.iter().map(PageView::from).collect(),
        }
    }
}
