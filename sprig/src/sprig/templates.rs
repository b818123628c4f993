use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use handlebars::Handlebars;
use log::debug;
use serde::Serialize;
use walkdir::WalkDir;

use crate::sprig::error::{BuildError, Result};
use crate::sprig::types::{INDEX_TEMPLATE, IndexView, Page, PageContext, PageView, SiteView};

/// Every layout in a template directory, parsed once and shared by reference
/// for the rest of a build.
///
/// Top-level `*.html` files are registered under their file stem (`post.html`
/// is layout `post`); files in subdirectories are registered as partials
/// named by their relative path without extension (`partials/nav`). Any
/// template can include another with `{{> name}}`, and a layout can extend a
/// parent by wrapping it in a partial block and overriding inline partials:
///
/// ```handlebars
/// {{#> base}}
///   {{#*inline "content"}}<article>{{{page.content}}}</article>{{/inline}}
/// {{/base}}
/// ```
///
/// Rendering is strict: a template that references a field the view doesn't
/// have fails instead of printing nothing.
pub struct TemplateSet {
    registry: Handlebars<'static>,
    // The registry keeps partials alongside templates; only these are layouts.
    layouts: BTreeSet<String>,
    root: PathBuf,
}

impl TemplateSet {
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        let mut layouts = BTreeSet::new();

        let load_err = |path: &Path, message: String| BuildError::TemplateLoad {
            path: path.to_path_buf(),
            message,
        };

        for entry in WalkDir::new(dir)
            .follow_links(true)
            .min_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| load_err(dir, e.to_string()))?;
            let path = entry.path();
            if !entry.file_type().is_file() || path.extension() != Some(OsStr::new("html")) {
                continue;
            }

            let rel = path
                .strip_prefix(dir)
                .map_err(|e| load_err(path, e.to_string()))?;
            let name = rel.with_extension("").to_string_lossy().replace('\\', "/");
            let source =
                fs::read_to_string(path).map_err(|e| load_err(path, e.to_string()))?;

            if entry.depth() == 1 {
                registry
                    .register_template_string(&name, source)
                    .map_err(|e| load_err(path, e.to_string()))?;
                debug!("registered template {name}");
                layouts.insert(name);
            } else {
                registry
                    .register_partial(&name, source)
                    .map_err(|e| load_err(path, e.to_string()))?;
                debug!("registered partial {name}");
            }
        }

        if !layouts.contains(INDEX_TEMPLATE) {
            return Err(load_err(
                dir,
                format!("required template `{INDEX_TEMPLATE}.html` is missing"),
            ));
        }

        Ok(Self {
            registry,
            layouts,
            root: dir.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn has_layout(&self, name: &str) -> bool {
        self.layouts.contains(name)
    }

    /// Names of the registered layouts, sorted.
    pub fn layouts(&self) -> Vec<&str> {
        self.layouts.iter().map(String::as_str).collect()
    }

    /// Render `page` with its own layout.
    pub fn render_page(&self, page: &Page, site_title: &str) -> Result<String> {
        if !self.has_layout(page.layout()) {
            return Err(BuildError::TemplateNotFound {
                slug: page.slug().to_string(),
                layout: page.layout().to_string(),
            });
        }

        let ctx = PageContext {
            site: SiteView { title: site_title },
            page: PageView::from(page),
        };
        self.render(page.layout(), page.slug(), &ctx)
    }

    pub fn render_index(&self, view: &IndexView<'_>) -> Result<String> {
        self.render(INDEX_TEMPLATE, INDEX_TEMPLATE, view)
    }

    fn render<T: Serialize>(&self, template: &str, target: &str, data: &T) -> Result<String> {
        self.registry
            .render(template, data)
            .map_err(|source| BuildError::TemplateExecution {
                target: target.to_string(),
                template: template.to_string(),
                source: Box::new(source),
            })
    }
}
