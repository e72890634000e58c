//! Crosswalk CSV loading and fingerprinting.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use rates_map::{CrosswalkIndex, DuplicatePolicy};
use rates_model::{CrosswalkEntry, WorkSectionMapping};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::{IngestError, Result};

const BUFFER_SIZE: usize = 65536;

/// Hex characters of the SHA-256 kept in a crosswalk version tag.
pub const VERSION_HASH_LEN: usize = 12;

/// One row of the crosswalk CSV. Columns not listed here are ignored.
#[derive(Debug, Deserialize)]
struct CrosswalkRow {
    nrm1_l4_code: String,
    #[serde(default)]
    nrm1_l3_code: String,
    nrm1_l2_code: String,
    #[serde(default)]
    nrm1_description: String,
    #[serde(default)]
    nrm1_unit: String,
    #[serde(default)]
    nrm2_primary_ws: String,
    #[serde(default)]
    nrm2_primary_ws_name: String,
    #[serde(default)]
    nrm2_primary_items: String,
    #[serde(default)]
    nrm2_secondary_ws: String,
    #[serde(default)]
    matched_keywords: String,
    #[serde(default)]
    notes: String,
}

impl From<CrosswalkRow> for CrosswalkEntry {
    fn from(row: CrosswalkRow) -> Self {
        CrosswalkEntry {
            level4_code: row.nrm1_l4_code.trim().to_string(),
            level3_code: row.nrm1_l3_code.trim().to_string(),
            level2_code: row.nrm1_l2_code.trim().to_string(),
            description: row.nrm1_description.trim().to_string(),
            unit: row.nrm1_unit.trim().to_string(),
            work_sections: WorkSectionMapping {
                primary: row.nrm2_primary_ws.trim().to_string(),
                primary_name: row.nrm2_primary_ws_name.trim().to_string(),
                primary_items: row.nrm2_primary_items.trim().to_string(),
                secondary: row.nrm2_secondary_ws.trim().to_string(),
            },
            matched_keywords: row.matched_keywords,
            notes: row.notes,
        }
    }
}

/// Read crosswalk entries in file order. Rows without a level-4 code are skipped.
pub fn load_crosswalk(path: &Path) -> Result<Vec<CrosswalkEntry>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_path(path)
        .map_err(|e| IngestError::Csv {
            path: path.to_path_buf(),
            source: e,
        })?;

    let mut entries = Vec::new();
    for result in reader.deserialize::<CrosswalkRow>() {
        let row = result.map_err(|e| IngestError::Csv {
            path: path.to_path_buf(),
            source: e,
        })?;
        if row.nrm1_l4_code.trim().is_empty() {
            debug!(path = %path.display(), "skipping crosswalk row without level-4 code");
            continue;
        }
        entries.push(CrosswalkEntry::from(row));
    }
    Ok(entries)
}

/// Load and index a crosswalk.
pub fn load_index(path: &Path, policy: DuplicatePolicy) -> Result<CrosswalkIndex> {
    let entries = load_crosswalk(path)?;
    let index = CrosswalkIndex::build_with(entries, policy)?;
    info!(
        path = %path.display(),
        entries = index.len(),
        groups = index.group_count(),
        "loaded crosswalk"
    );
    Ok(index)
}

/// Compute the SHA-256 of a file as lowercase hex.
pub fn compute_file_sha256(path: &Path) -> Result<String> {
    let file = File::open(path).map_err(|e| IngestError::io(path, e))?;
    let mut reader = BufReader::with_capacity(BUFFER_SIZE, file);

    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; BUFFER_SIZE];
    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .map_err(|e| IngestError::io(path, e))?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Version tag stamped into enriched catalogs: `<file name>@<sha256 prefix>`.
pub fn crosswalk_version(path: &Path) -> Result<String> {
    let digest = compute_file_sha256(path)?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(format!("{name}@{}", &digest[..VERSION_HASH_LEN]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str = "nrm1_l4_code,nrm1_l3_code,nrm1_l2_code,nrm1_description,nrm1_unit,nrm2_primary_ws,nrm2_primary_ws_name,nrm2_primary_items,nrm2_secondary_ws,confidence,matched_keywords,notes";

    fn write_csv(dir: &Path, body: &str) -> std::path::PathBuf {
        let path = dir.join("crosswalk.csv");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "{HEADER}").unwrap();
        write!(file, "{body}").unwrap();
        path
    }

    #[test]
    fn rows_map_to_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "5.4.1.1,5.4.1,5.4,Hot water system installation,nr,WS33,Mechanical services,1-4,\"WS34, WS38\",High,\"hot water, heater\",\n\
             ,,5.4,orphan row,nr,,,,,,,\n",
        );
        let entries = load_crosswalk(&path).unwrap();
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.level2_code, "5.4");
        assert_eq!(entry.work_sections.primary_items, "1-4");
        assert_eq!(entry.secondary_mappings(), vec!["WS33", "WS34", "WS38"]);
        assert_eq!(entry.matched_keywords, "hot water, heater");
    }

    #[test]
    fn duplicate_codes_surface_as_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "5.4.1.1,5.4.1,5.4,Hot water,nr,,,,,,,\n5.4.1.1,5.4.1,5.4,Hot water,nr,,,,,,,\n",
        );
        let err = load_index(&path, DuplicatePolicy::Reject).unwrap_err();
        assert!(matches!(err, IngestError::Load(_)));
        assert!(load_index(&path, DuplicatePolicy::LastWriteWins).is_ok());
    }

    #[test]
    fn header_only_crosswalk_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "");
        let err = load_index(&path, DuplicatePolicy::Reject).unwrap_err();
        assert!(matches!(
            err,
            IngestError::Load(rates_map::LoadError::EmptyCrosswalk)
        ));
    }

    #[test]
    fn version_tag_uses_name_and_digest_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("xwalk.csv");
        std::fs::write(&path, b"abc").unwrap();
        // sha256("abc") = ba7816bf8f01cfea...
        assert_eq!(crosswalk_version(&path).unwrap(), "xwalk.csv@ba7816bf8f01");
    }
}
