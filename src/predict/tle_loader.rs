use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::predict::error::PredictError;
use crate::predict::types::OrbitalElements;

/// One record pulled out of a catalog, before its fields are decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TleGroup {
    pub name: Option<String>,
    pub line1: String,
    pub line2: String,
}

/// Result of decoding a catalog: the usable records plus the ones that failed.
#[derive(Debug, Default)]
pub struct Catalog {
    pub satellites: Vec<OrbitalElements>,
    pub rejected: Vec<PredictError>,
}

/// Split TLE text into groups. Three-line groups (name, line 1, line 2) and
/// bare two-line groups are accepted; anything else is skipped line by line
/// until the text lines up again.
pub fn split_groups(content: &str) -> Vec<TleGroup> {
    let lines: Vec<&str> = content
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();

    let mut result = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if lines[i].starts_with("1 ") && i + 1 < lines.len() && lines[i + 1].starts_with("2 ") {
            result.push(TleGroup {
                name: None,
                line1: lines[i].to_string(),
                line2: lines[i + 1].to_string(),
            });
            i += 2;
        } else if i + 2 < lines.len()
            && lines[i + 1].starts_with("1 ")
            && lines[i + 2].starts_with("2 ")
        {
            result.push(TleGroup {
                name: Some(lines[i].to_string()),
                line1: lines[i + 1].to_string(),
                line2: lines[i + 2].to_string(),
            });
            i += 3;
        } else {
            warn!("Skipping unexpected TLE line: {:?}", lines[i]);
            i += 1;
        }
    }

    result
}

/// Decode every group in `content`. A bad record never stops the others.
pub fn parse_catalog(content: &str) -> Catalog {
    let mut catalog = Catalog::default();
    for group in split_groups(content) {
        match OrbitalElements::from_tle(group.name, &group.line1, &group.line2) {
            Ok(elements) => catalog.satellites.push(elements),
            Err(e) => {
                warn!("Skipping TLE record: {}", e);
                catalog.rejected.push(e);
            }
        }
    }
    catalog
}

/// Loads every `.tle`/`.txt` file under a folder, or a single file.
pub struct TleLoader {
    tle_path: PathBuf,
    satellites: BTreeMap<u64, OrbitalElements>,
    rejected: usize,
}

impl TleLoader {
    pub fn new(tle_path: PathBuf) -> Self {
        Self {
            tle_path,
            satellites: BTreeMap::new(),
            rejected: 0,
        }
    }

    pub fn load_all(&mut self) -> Result<(), PredictError> {
        if !self.tle_path.exists() {
            return Err(PredictError::DirectoryNotFound(
                self.tle_path.display().to_string(),
            ));
        }

        self.satellites.clear();
        self.rejected = 0;

        if self.tle_path.is_file() {
            let path = self.tle_path.clone();
            self.load_file(&path)?;
        } else {
            let mut files = Vec::new();
            for entry in fs::read_dir(&self.tle_path)? {
                let path = entry?.path();
                let is_tle = path
                    .extension()
                    .map(|ext| ext == "tle" || ext == "txt")
                    .unwrap_or(false);
                if path.is_file() && is_tle {
                    files.push(path);
                }
            }
            files.sort();

            for path in files {
                if let Err(e) = self.load_file(&path) {
                    warn!("Failed to read TLE file {}: {}", path.display(), e);
                }
            }
        }

        info!(
            "Loaded {} satellites from {} ({} records rejected)",
            self.satellites.len(),
            self.tle_path.display(),
            self.rejected
        );
        Ok(())
    }

    fn load_file(&mut self, path: &Path) -> Result<(), PredictError> {
        let content = fs::read_to_string(path)?;
        let catalog = parse_catalog(&content);
        self.rejected += catalog.rejected.len();
        for elements in catalog.satellites {
            self.satellites.insert(elements.norad_id, elements);
        }
        Ok(())
    }

    /// Loaded satellites in NORAD id order.
    pub fn satellites(&self) -> Vec<&OrbitalElements> {
        self.satellites.values().collect()
    }

    pub fn get(&self, norad_id: u64) -> Option<&OrbitalElements> {
        self.satellites.get(&norad_id)
    }

    pub fn rejected(&self) -> usize {
        self.rejected
    }
}
