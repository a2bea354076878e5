//! Flat filename index behind the `/drop/<filename>` shortcut.
//!
//! [`build`] walks the served root and assigns every regular file exactly one
//! shortcut name. The first file met in traversal order keeps its bare name;
//! later files with a taken name get a numeric suffix before the extension
//! (`tool.sh`, `tool-1.sh`, `tool-2.sh`). Traversal is sorted by file name at
//! every level, so the assignment is stable across builds of the same tree.
//!
//! A generated name can take the name of a file met later in traversal. With
//! `a/tool.sh`, `b/tool.sh` and `c/tool-1.sh`, the second file is indexed as
//! `tool-1.sh` and the third becomes `tool-1-1.sh`. Every file still has one
//! shortcut and stays reachable by its full path.
//!
//! A built [`FileIndex`] is immutable. [`IndexStore`] holds the current snapshot
//! and replaces it wholesale on rebuild, so readers never see a partial map.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use globset::{Glob, GlobSet, GlobSetBuilder};
use tokio::sync::RwLock;
use tokio::task;
use walkdir::{DirEntry, WalkDir};

#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("served root {} is not a directory", .0.display())]
    RootNotDirectory(PathBuf),
    #[error("invalid exclude pattern: {0}")]
    InvalidExclude(#[from] globset::Error),
    #[error("index build task failed: {0}")]
    Join(#[from] task::JoinError),
}

#[derive(Debug, Clone)]
pub struct IndexOptions {
    /// Index dot-prefixed files and descend into dot-prefixed directories.
    pub include_hidden: bool,
    /// Globs matched against the relative path; matches stay out of the index.
    pub excludes: Vec<String>,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self { include_hidden: true, excludes: Vec::new() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileIndexEntry {
    /// Name served under `/drop/`.
    pub shortcut: String,
    /// Bare filename on disk.
    pub name: String,
    /// Forward-slash separated path relative to the served root.
    pub relpath: String,
    pub size: u64,
    pub modified: Option<SystemTime>,
}

#[derive(Debug, Default)]
pub struct FileIndex {
    entries: Vec<FileIndexEntry>,
    by_shortcut: HashMap<String, usize>,
    // Next suffix to try per bare name; taken names only accumulate, so the
    // smallest free suffix never goes below it.
    next_suffix: HashMap<String, usize>,
}

impl FileIndex {
    /// Exact, case-sensitive shortcut lookup.
    pub fn resolve(&self, shortcut: &str) -> Option<&FileIndexEntry> {
        self.by_shortcut.get(shortcut).map(|&i| &self.entries[i])
    }

    /// All indexed files in traversal order.
    pub fn entries(&self) -> &[FileIndexEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, name: String, relpath: String, size: u64, modified: Option<SystemTime>) {
        let shortcut = if self.by_shortcut.contains_key(&name) {
            let n = self.next_suffix.entry(name.clone()).or_insert(1);
            let mut candidate = disambiguate(&name, *n);
            while self.by_shortcut.contains_key(&candidate) {
                *n += 1;
                candidate = disambiguate(&name, *n);
            }
            *n += 1;
            candidate
        } else {
            name.clone()
        };
        self.by_shortcut.insert(shortcut.clone(), self.entries.len());
        self.entries.push(FileIndexEntry { shortcut, name, relpath, size, modified });
    }
}

/// `tool.sh` -> `tool-<n>.sh`. Splits on the last dot; a leading dot does not
/// start an extension, so `.bashrc` becomes `.bashrc-<n>`.
pub fn disambiguate(name: &str, n: usize) -> String {
    match name.rfind('.') {
        Some(dot) if dot > 0 => format!("{}-{}{}", &name[..dot], n, &name[dot..]),
        _ => format!("{}-{}", name, n),
    }
}

/// Forward-slash relative form of `path` beneath `root`, or `None` when `path`
/// is outside `root` or has a component that is not valid UTF-8.
pub fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let mut parts = Vec::new();
    for component in rel.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(parts.join("/"))
}

fn build_globset(patterns: &[String]) -> Result<GlobSet, globset::Error> {
    let mut builder = GlobSetBuilder::new();
    for p in patterns {
        builder.add(Glob::new(p)?);
    }
    builder.build()
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_str().is_some_and(|s| s.starts_with('.'))
}

/// Walks `root` and indexes every regular file beneath it.
///
/// Symlinks are not followed and are not indexed. Entries that cannot be read
/// are skipped with a warning rather than failing the whole build.
pub fn build(root: &Path, options: &IndexOptions) -> Result<FileIndex, IndexError> {
    if !root.is_dir() {
        return Err(IndexError::RootNotDirectory(root.to_path_buf()));
    }
    let excludes = build_globset(&options.excludes)?;
    let mut index = FileIndex::default();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| options.include_hidden || !is_hidden(e));

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!("skipping unreadable entry while indexing: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(relpath) = relative_path(root, entry.path()) else {
            tracing::warn!(path = %entry.path().display(), "skipping file with a non UTF-8 path");
            continue;
        };
        if excludes.is_match(&relpath) {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        let (size, modified) = match entry.metadata() {
            Ok(md) => (md.len(), md.modified().ok()),
            Err(_) => (0, None),
        };
        index.insert(name, relpath, size, modified);
    }

    Ok(index)
}

/// Shared holder of the current index snapshot.
#[derive(Clone)]
pub struct IndexStore {
    root: Arc<PathBuf>,
    options: Arc<IndexOptions>,
    current: Arc<RwLock<Arc<FileIndex>>>,
}

impl IndexStore {
    /// Builds the initial snapshot for `root`.
    pub async fn open(root: PathBuf, options: IndexOptions) -> Result<Self, IndexError> {
        let root = Arc::new(root);
        let options = Arc::new(options);
        let initial = Self::build_blocking(root.clone(), options.clone()).await?;
        Ok(Self { root, options, current: Arc::new(RwLock::new(Arc::new(initial))) })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The snapshot currently in place.
    pub async fn snapshot(&self) -> Arc<FileIndex> {
        self.current.read().await.clone()
    }

    /// Builds a fresh snapshot and swaps it in once complete.
    pub async fn rebuild(&self) -> Result<Arc<FileIndex>, IndexError> {
        let fresh = Arc::new(Self::build_blocking(self.root.clone(), self.options.clone()).await?);
        *self.current.write().await = fresh.clone();
        tracing::debug!(files = fresh.len(), "rebuilt drop index");
        Ok(fresh)
    }

    async fn build_blocking(
        root: Arc<PathBuf>,
        options: Arc<IndexOptions>,
    ) -> Result<FileIndex, IndexError> {
        task::spawn_blocking(move || build(&root, &options)).await?
    }
}
