//! Pipeline configuration: where the databases, the CSV export, and the
//! log files live. Loaded from a JSON file, with every field optional
//! and defaulting to paths under `./data/`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Source database with the cademycode_* relations.
    pub source_db: PathBuf,
    /// Output database holding `students_analysis`.
    pub output_db: PathBuf,
    /// CSV export destination.
    pub csv_path: PathBuf,
    /// General info-level log file.
    pub log_file: PathBuf,
    /// Warning-and-above changelog file.
    pub changelog_file: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source_db: PathBuf::from("data/cademycode.db"),
            output_db: PathBuf::from("data/cademycode_analysis.db"),
            csv_path: PathBuf::from("data/students_analysis.csv"),
            log_file: PathBuf::from("data/pipeline.log"),
            changelog_file: PathBuf::from("data/changelog.log"),
        }
    }
}

impl PipelineConfig {
    /// Loads the configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config = serde_json::from_str(&raw)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_point_at_data_dir() {
        let config = PipelineConfig::default();
        assert_eq!(config.source_db, PathBuf::from("data/cademycode.db"));
        assert_eq!(config.csv_path, PathBuf::from("data/students_analysis.csv"));
    }

    #[test]
    fn test_from_file_with_partial_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(br#"{"source_db": "/srv/cademycode.db"}"#).unwrap();

        let config = PipelineConfig::from_file(&path).unwrap();
        assert_eq!(config.source_db, PathBuf::from("/srv/cademycode.db"));
        // Unspecified fields keep their defaults.
        assert_eq!(config.output_db, PathBuf::from("data/cademycode_analysis.db"));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, br#"{"sorce_db": "/typo.db"}"#).unwrap();

        let err = PipelineConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseJson(_)));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = PipelineConfig::from_file(Path::new("/nonexistent/config.json")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }
}
