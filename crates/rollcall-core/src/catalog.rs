//! Message catalog loading.
//!
//! Each category lives in its own `messages_<category>.json` file holding a
//! JSON array of template strings. Catalogs are read once at startup and
//! never change afterwards. A broken file costs only its own category: it
//! loads as an empty template list and the rest of the catalog is kept.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::types::has_placeholder;

/// File name prefix identifying catalog files.
const FILE_PREFIX: &str = "messages_";

/// File extension of catalog files.
const FILE_EXTENSION: &str = "json";

/// Errors that abort a catalog load.
///
/// Problems with individual category files are never surfaced here.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The catalog directory exists but could not be listed.
    #[error("failed to read catalog directory {path}: {source}")]
    Io {
        /// The directory being listed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

/// Read-only mapping from category name to its ordered templates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    categories: BTreeMap<String, Vec<String>>,
}

impl Catalog {
    /// Load every `messages_<category>.json` file in `dir`.
    ///
    /// A missing directory yields an empty catalog.
    pub async fn load_dir(dir: &Path) -> Result<Self, CatalogError> {
        let mut entries = match tokio::fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(dir = %dir.display(), "catalog directory not found, no categories loaded");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(CatalogError::Io {
                    path: dir.to_path_buf(),
                    source,
                });
            }
        };

        let mut files: Vec<(String, PathBuf)> = Vec::new();
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(source) => {
                    return Err(CatalogError::Io {
                        path: dir.to_path_buf(),
                        source,
                    });
                }
            };
            let path = entry.path();
            // `metadata` follows symlinks, so linked category files load too.
            let is_file = tokio::fs::metadata(&path)
                .await
                .is_ok_and(|meta| meta.is_file());
            if let Some(category) = category_from_path(&path).filter(|_| is_file) {
                files.push((category, path));
            }
        }
        files.sort();

        let mut catalog = Self::default();
        for (category, path) in files {
            if catalog.categories.contains_key(&category) {
                warn!(
                    category,
                    path = %path.display(),
                    "duplicate category file ignored"
                );
                continue;
            }
            let templates = match tokio::fs::read_to_string(&path).await {
                Ok(raw) => parse_templates(&category, &raw),
                Err(e) => {
                    warn!(category, path = %path.display(), error = %e, "failed to read category file");
                    Vec::new()
                }
            };
            catalog.categories.insert(category, templates);
        }

        info!(
            dir = %dir.display(),
            categories = catalog.categories.len(),
            templates = catalog.template_count(),
            "message catalog loaded"
        );
        Ok(catalog)
    }

    /// Build a catalog from in-memory categories.
    ///
    /// Names and templates go through the same normalization as files.
    pub fn from_categories<I, N, T>(categories: I) -> Self
    where
        I: IntoIterator<Item = (N, Vec<T>)>,
        N: Into<String>,
        T: Into<String>,
    {
        let categories = categories
            .into_iter()
            .map(|(name, templates)| {
                let name: String = name.into();
                let name = name.to_lowercase();
                let templates = sanitize(&name, templates.into_iter().map(Into::into));
                (name, templates)
            })
            .collect();
        Self { categories }
    }

    /// Whether a category with this name exists (possibly empty).
    pub fn contains(&self, name: &str) -> bool {
        self.categories.contains_key(name)
    }

    /// Templates for a category, or `None` if it does not exist.
    pub fn templates(&self, name: &str) -> Option<&[String]> {
        self.categories.get(name).map(Vec::as_slice)
    }

    /// All category names in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.categories.keys().cloned().collect()
    }

    /// Names of categories with at least one template.
    pub fn non_empty_names(&self) -> Vec<String> {
        self.categories
            .iter()
            .filter(|(_, templates)| !templates.is_empty())
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Iterate categories with their templates.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.categories
            .iter()
            .map(|(name, templates)| (name.as_str(), templates.as_slice()))
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Whether no categories were loaded.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Total templates across all categories.
    pub fn template_count(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }
}

/// Derive the category name from a `messages_<category>.json` path.
fn category_from_path(path: &Path) -> Option<String> {
    if path.extension().and_then(|ext| ext.to_str()) != Some(FILE_EXTENSION) {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    let category = stem.strip_prefix(FILE_PREFIX)?;
    if category.is_empty() {
        return None;
    }
    Some(category.to_lowercase())
}

/// Parse one category file. Malformed content yields an empty list.
fn parse_templates(category: &str, raw: &str) -> Vec<String> {
    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(templates) => sanitize(category, templates),
        Err(e) => {
            warn!(category, error = %e, "category file is not a JSON array of strings");
            Vec::new()
        }
    }
}

/// Drop templates without a placeholder and collapse duplicates.
fn sanitize(category: &str, templates: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut kept = Vec::new();
    for template in templates {
        if !has_placeholder(&template) {
            warn!(category, template, "template without name placeholder skipped");
            continue;
        }
        if seen.insert(template.clone()) {
            kept.push(template);
        }
    }
    kept
}
