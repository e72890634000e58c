//! Loading and saving of crosswalks, rate catalogs and override tables.
#![deny(unsafe_code)]

pub mod catalog;
pub mod crosswalk;
pub mod error;
pub mod overrides;

pub use catalog::{Catalog, CatalogDocument, discover_catalogs, load_catalogs};
pub use crosswalk::{compute_file_sha256, crosswalk_version, load_crosswalk, load_index};
pub use error::{IngestError, Result};
pub use overrides::{OverrideConfig, load_overrides, parse_overrides};
