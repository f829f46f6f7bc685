// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Where model files come from.

use crate::error::{Result, ViewerError};
use std::path::{Path, PathBuf};

/// A demo model offered by the load buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub file_name: &'static str,
    pub label: &'static str,
}

pub const DEMO_CATALOG: [CatalogEntry; 2] = [
    CatalogEntry {
        file_name: "GEALAN_S9000_Door_1100x2000-IFC4.ifc",
        label: "Load Door",
    },
    CatalogEntry {
        file_name: "GEALAN_S9000_Double_Vent_Window_1400x1200-IFC4.ifc",
        label: "Load Window",
    },
];

/// Model id of a file: the name with its first `.ifc` removed
pub fn model_id(file_name: &str) -> String {
    file_name.replacen(".ifc", "", 1)
}

/// Accept bare `*.ifc` file names only
pub fn validate_file_name(file_name: &str) -> Result<()> {
    let valid = !file_name.is_empty()
        && !file_name.contains(['/', '\\', '\0'])
        && !file_name.contains("..")
        && file_name.to_ascii_lowercase().ends_with(".ifc");
    if valid {
        Ok(())
    } else {
        Err(ViewerError::InvalidFileName(file_name.to_string()))
    }
}

pub trait ModelSource {
    fn fetch(&self, file_name: &str) -> Result<Vec<u8>>;
}

/// Model files served from a directory (`/objects/<file>.ifc`)
#[derive(Debug, Clone)]
pub struct ObjectsDir {
    root: PathBuf,
    max_bytes: Option<u64>,
}

impl ObjectsDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_bytes: None,
        }
    }

    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = Some(max_bytes);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, file_name: &str) -> Result<PathBuf> {
        validate_file_name(file_name)?;
        Ok(self.root.join(file_name))
    }

    /// IFC files present in the directory, sorted by name
    pub fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if validate_file_name(name).is_ok() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

impl ModelSource for ObjectsDir {
    fn fetch(&self, file_name: &str) -> Result<Vec<u8>> {
        let path = self.path_for(file_name)?;

        let metadata = match std::fs::metadata(&path) {
            Ok(metadata) if metadata.is_file() => metadata,
            Ok(_) => return Err(ViewerError::NotFound(file_name.to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ViewerError::NotFound(file_name.to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(limit) = self.max_bytes {
            if metadata.len() > limit {
                return Err(ViewerError::TooLarge {
                    file: file_name.to_string(),
                    size: metadata.len(),
                    limit,
                });
            }
        }

        let bytes = std::fs::read(&path)?;
        tracing::debug!(file = file_name, bytes = bytes.len(), "Model file read");
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixtures() -> ObjectsDir {
        ObjectsDir::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("../../tests/models"))
    }

    #[test]
    fn test_model_id_strips_first_extension() {
        assert_eq!(
            model_id("GEALAN_S9000_Door_1100x2000-IFC4.ifc"),
            "GEALAN_S9000_Door_1100x2000-IFC4"
        );
        assert_eq!(model_id("a.ifc.ifc"), "a.ifc");
        assert_eq!(model_id("noext"), "noext");
    }

    #[test]
    fn test_file_name_validation() {
        assert!(validate_file_name("door.ifc").is_ok());
        assert!(validate_file_name("DOOR.IFC").is_ok());
        for bad in ["", "../secret.ifc", "a/b.ifc", "a\\b.ifc", "door.txt", "x..ifc"] {
            assert!(
                matches!(validate_file_name(bad), Err(ViewerError::InvalidFileName(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_catalog_names_are_valid() {
        for entry in DEMO_CATALOG {
            assert!(validate_file_name(entry.file_name).is_ok());
        }
    }

    #[test]
    fn test_fetch_and_list() {
        let dir = fixtures();
        let bytes = dir.fetch("door_1100x2000.ifc").unwrap();
        assert!(bytes.starts_with(b"ISO-10303-21;"));

        let names = dir.list().unwrap();
        assert!(names.contains(&"door_1100x2000.ifc".to_string()));
        assert!(names.contains(&"window_1400x1200.ifc".to_string()));
    }

    #[test]
    fn test_fetch_errors() {
        let dir = fixtures();
        assert!(matches!(dir.fetch("missing.ifc"), Err(ViewerError::NotFound(_))));
        assert!(matches!(
            dir.clone().with_max_bytes(10).fetch("door_1100x2000.ifc"),
            Err(ViewerError::TooLarge { limit: 10, .. })
        ));
    }
}
