//! Configuration and data directory management.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Paths to all Scrubber data directories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPaths {
    /// Root data directory (e.g., `data/`).
    pub root: PathBuf,
    /// Key-value store directory (`data/store/`).
    pub store: PathBuf,
}

impl DataPaths {
    /// Create data paths from a root directory. Creates directories if needed.
    pub fn new(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        let paths = Self {
            store: root.join("store"),
            root,
        };
        std::fs::create_dir_all(&paths.store)?;
        Ok(paths)
    }
}

/// Backend holding custom recognizers and templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local map, lost on restart.
    Memory,
    /// SQLite file under `data/store/`.
    Sqlite,
}

impl std::str::FromStr for StoreBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "sqlite" => Ok(Self::Sqlite),
            other => Err(Error::Config(format!("unknown store backend '{}'", other))),
        }
    }
}

/// Top-level Scrubber configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrubberConfig {
    /// HTTP server port.
    pub port: u16,
    /// Data directory paths.
    pub data_paths: DataPaths,
    /// Where recognizers and templates are persisted.
    pub store_backend: StoreBackend,
    /// Findings scoring at or below this are discarded by the analyzer.
    pub min_score: f32,
    /// Deadline for a single document scan. `None` disables it.
    pub scan_timeout: Option<Duration>,
}

impl ScrubberConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env(data_dir: impl AsRef<Path>) -> Result<Self> {
        Self::from_lookup(data_dir, |key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary variable source.
    pub fn from_lookup(
        data_dir: impl AsRef<Path>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let port = match lookup("PORT") {
            Some(p) => p
                .parse()
                .map_err(|_| Error::Config(format!("invalid PORT '{}'", p)))?,
            None => 8080,
        };

        let store_backend = match lookup("SCRUBBER_STORE") {
            Some(b) => b.parse()?,
            None => StoreBackend::Sqlite,
        };

        let min_score = match lookup("SCRUBBER_MIN_SCORE") {
            Some(s) => {
                let score: f32 = s
                    .parse()
                    .map_err(|_| Error::Config(format!("invalid SCRUBBER_MIN_SCORE '{}'", s)))?;
                if !(0.0..=1.0).contains(&score) {
                    return Err(Error::Config(format!(
                        "SCRUBBER_MIN_SCORE must be within [0, 1], got {}",
                        score
                    )));
                }
                score
            }
            None => 0.0,
        };

        let scan_timeout = match lookup("SCRUBBER_SCAN_TIMEOUT_SECS") {
            Some(s) => {
                let secs: u64 = s.parse().map_err(|_| {
                    Error::Config(format!("invalid SCRUBBER_SCAN_TIMEOUT_SECS '{}'", s))
                })?;
                (secs > 0).then(|| Duration::from_secs(secs))
            }
            None => Some(Duration::from_secs(30)),
        };

        let data_paths = DataPaths::new(data_dir)?;

        debug!(
            port,
            store = ?store_backend,
            min_score,
            scan_timeout = ?scan_timeout,
            root = %data_paths.root.display(),
            "Resolved configuration"
        );

        Ok(Self {
            port,
            data_paths,
            store_backend,
            min_score,
            scan_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let dir = TempDir::new().unwrap();
        let config = ScrubberConfig::from_lookup(dir.path(), lookup(&[])).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.store_backend, StoreBackend::Sqlite);
        assert_eq!(config.min_score, 0.0);
        assert_eq!(config.scan_timeout, Some(Duration::from_secs(30)));
        assert!(config.data_paths.store.is_dir());
    }

    #[test]
    fn test_overrides() {
        let dir = TempDir::new().unwrap();
        let config = ScrubberConfig::from_lookup(
            dir.path(),
            lookup(&[
                ("PORT", "9001"),
                ("SCRUBBER_STORE", "Memory"),
                ("SCRUBBER_MIN_SCORE", "0.4"),
                ("SCRUBBER_SCAN_TIMEOUT_SECS", "0"),
            ]),
        )
        .unwrap();
        assert_eq!(config.port, 9001);
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert!((config.min_score - 0.4).abs() < f32::EPSILON);
        assert_eq!(config.scan_timeout, None);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let dir = TempDir::new().unwrap();
        for vars in [
            [("PORT", "http")],
            [("SCRUBBER_STORE", "redis")],
            [("SCRUBBER_MIN_SCORE", "1.5")],
            [("SCRUBBER_SCAN_TIMEOUT_SECS", "-1")],
        ] {
            let err = ScrubberConfig::from_lookup(dir.path(), lookup(&vars)).unwrap_err();
            assert!(matches!(err, Error::Config(_)), "{:?} -> {}", vars, err);
        }
    }
}
