//! Rate catalog files (`group_*.json`).

use std::path::{Path, PathBuf};

use rates_model::Rate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{IngestError, Result};

pub const CATALOG_PREFIX: &str = "group_";
pub const CATALOG_EXTENSION: &str = "json";

/// Meta key holding the enrichment date.
pub const META_ENRICHED_DATE: &str = "enriched_date";
/// Meta key holding the crosswalk version tag.
pub const META_CROSSWALK_VERSION: &str = "crosswalk_version";

/// Contents of one catalog file. Unknown top-level keys are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogDocument {
    #[serde(default)]
    pub meta: Map<String, Value>,
    #[serde(default)]
    pub rates: Vec<Rate>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A catalog document and where it came from.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub path: PathBuf,
    pub document: CatalogDocument,
}

impl Catalog {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| IngestError::io(path, e))?;
        let document: CatalogDocument =
            serde_json::from_str(&content).map_err(|e| IngestError::Json {
                path: path.to_path_buf(),
                source: e,
            })?;
        debug!(path = %path.display(), rates = document.rates.len(), "loaded catalog");
        Ok(Self {
            path: path.to_path_buf(),
            document,
        })
    }

    /// Write the document back as pretty JSON.
    pub fn save(&self) -> Result<()> {
        let mut content =
            serde_json::to_string_pretty(&self.document).map_err(|e| IngestError::Json {
                path: self.path.clone(),
                source: e,
            })?;
        content.push('\n');
        std::fs::write(&self.path, content).map_err(|e| IngestError::io(&self.path, e))
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn rates(&self) -> &[Rate] {
        &self.document.rates
    }

    pub fn rates_mut(&mut self) -> &mut [Rate] {
        &mut self.document.rates
    }

    /// Record when and against which crosswalk the catalog was enriched.
    pub fn stamp(&mut self, enriched_date: &str, crosswalk_version: &str) {
        let meta = &mut self.document.meta;
        meta.insert(
            META_ENRICHED_DATE.to_string(),
            Value::String(enriched_date.to_string()),
        );
        meta.insert(
            META_CROSSWALK_VERSION.to_string(),
            Value::String(crosswalk_version.to_string()),
        );
    }
}

fn is_catalog_file(path: &Path) -> bool {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(CATALOG_EXTENSION));
    let has_prefix = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with(CATALOG_PREFIX));
    is_json && has_prefix && path.is_file()
}

/// Catalog files in `dir`, sorted by file name.
pub fn discover_catalogs(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::io(dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| IngestError::io(dir, e))?.path();
        if is_catalog_file(&path) {
            files.push(path);
        }
    }

    if files.is_empty() {
        return Err(IngestError::MissingCatalogs {
            dir: dir.to_path_buf(),
        });
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Load every catalog in `dir`, in file name order.
pub fn load_catalogs(dir: &Path) -> Result<Vec<Catalog>> {
    discover_catalogs(dir)?
        .into_iter()
        .map(|path| Catalog::load(&path))
        .collect()
}
