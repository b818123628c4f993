use std::fs;
use std::path::{Path, PathBuf};

use confik::Configuration;
use log::{trace, warn};
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::sprig::error::{BuildError, Result};
use crate::sprig::types::Page;

/// What to do when a single source file can't be read or parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Configuration)]
#[serde(rename_all = "snake_case")]
#[confik(forward(serde(rename_all = "snake_case")))]
pub enum WalkPolicy {
    /// Abort on the first bad file.
    #[default]
    FailFast,
    /// Record the failure, skip the file and keep going.
    Collect,
}

/// Pages found under a content root, in discovery order, plus any per-file
/// failures that were skipped.
#[derive(Debug, Default)]
pub struct WalkOutcome {
    pub pages: Vec<Page>,
    pub skipped: Vec<BuildError>,
}

pub struct ContentWalker {
    root: PathBuf,
}

impl ContentWalker {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lazily parse every `.md` file under the root. Entries are visited in
    /// file-name order so discovery order is stable across runs. Symlinks are
    /// followed.
    pub fn pages(&self) -> impl Iterator<Item = Result<Page>> + '_ {
        WalkDir::new(&self.root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(move |entry| {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(source) => return Some(Err(self.walk_error(source))),
                };

                if !entry.file_type().is_file() || !is_markdown(entry.path()) {
                    trace!("skipping {}", entry.path().display());
                    return None;
                }

                Some(self.load(entry.path()))
            })
    }

    /// Drain [`pages`](Self::pages) under `policy`.
    pub fn collect(&self, policy: WalkPolicy) -> Result<WalkOutcome> {
        let mut outcome = WalkOutcome::default();
        for page in self.pages() {
            match (page, policy) {
                (Ok(page), _) => outcome.pages.push(page),
                (Err(err), WalkPolicy::FailFast) => return Err(err),
                // The root itself being unusable is never a per-file problem.
                (Err(err), WalkPolicy::Collect) if is_root_error(&err) => return Err(err),
                (Err(err), WalkPolicy::Collect) => {
                    warn!("skipping file: {err}");
                    outcome.skipped.push(err);
                }
            }
        }
        Ok(outcome)
    }

    fn load(&self, path: &Path) -> Result<Page> {
        let raw = fs::read(path).map_err(|e| BuildError::fs(path, e))?;
        Page::build(path, &self.root, &raw)
    }

    fn walk_error(&self, source: walkdir::Error) -> BuildError {
        BuildError::Walk {
            root: self.root.clone(),
            source,
        }
    }
}

fn is_root_error(err: &BuildError) -> bool {
    match err {
        BuildError::Walk { source, .. } => source.depth() == 0,
        _ => false,
    }
}

fn is_markdown(path: &Path) -> bool {
    path.extension().map(|ext| ext == "md").unwrap_or(false)
}
