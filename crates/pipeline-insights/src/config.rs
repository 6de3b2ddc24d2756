//! Configuration for the pipeline insights tool

use anyhow::{Context, Result};
use pipeline_core::DatasetKind;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::constants;

// =============================================================================
// File-based Configuration (config.toml)
// =============================================================================

/// Configuration loaded from config.toml; every field is optional
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub server: ServerConfig,
    pub data: DataConfig,
}

/// HTTP server section
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// IP address to bind
    pub host: String,
    pub port: u16,
    /// Origins allowed by CORS (empty allows any origin)
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: constants::DEFAULT_HOST.to_string(),
            port: constants::DEFAULT_PORT,
            allowed_origins: Vec::new(),
        }
    }
}

/// Record export location
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataConfig {
    pub dir: PathBuf,
    pub files: DataFiles,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(constants::DEFAULT_DATA_DIR),
            files: DataFiles::default(),
        }
    }
}

/// File name of each dataset's export, relative to the data directory
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataFiles {
    pub customer_types: String,
    pub industries: String,
    pub acv_ranges: String,
    pub teams: String,
}

impl Default for DataFiles {
    fn default() -> Self {
        Self {
            customer_types: constants::CUSTOMER_TYPES_FILENAME.to_string(),
            industries: constants::INDUSTRIES_FILENAME.to_string(),
            acv_ranges: constants::ACV_RANGES_FILENAME.to_string(),
            teams: constants::TEAMS_FILENAME.to_string(),
        }
    }
}

impl DataFiles {
    pub fn file_name(&self, kind: DatasetKind) -> &str {
        match kind {
            DatasetKind::CustomerTypes => &self.customer_types,
            DatasetKind::Industries => &self.industries,
            DatasetKind::AcvRanges => &self.acv_ranges,
            DatasetKind::Teams => &self.teams,
        }
    }
}

impl FileConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content).with_context(|| {
            format!(
                "Failed to parse {}. Check for:\n\
                 - Unknown sections or keys (only [server] and [data] are recognized)\n\
                 - Invalid TOML syntax (missing quotes, brackets, etc.)\n\
                 - Incorrect data types (port must be a number)",
                path.display()
            )
        })
    }

    /// Load `path` if it exists, otherwise fall back to defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            Ok(Self::default())
        }
    }
}

// =============================================================================
// Runtime Configuration
// =============================================================================

/// Resolved configuration after CLI overrides
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the record exports
    pub data_dir: PathBuf,
    pub data_files: DataFiles,
    /// Address the HTTP server binds to
    pub listen_addr: SocketAddr,
    pub allowed_origins: Vec<String>,
}

impl Config {
    /// Create config from file config and optional CLI overrides
    pub fn from_file(
        file_config: FileConfig,
        data_dir: Option<PathBuf>,
        port: Option<u16>,
    ) -> Result<Self> {
        let server = file_config.server;
        let port = port.unwrap_or(server.port);
        let listen_addr: SocketAddr = format!("{}:{}", server.host, port)
            .parse()
            .with_context(|| format!("Invalid server address '{}:{}'", server.host, port))?;

        Ok(Self {
            data_dir: data_dir.unwrap_or(file_config.data.dir),
            data_files: file_config.data.files,
            listen_addr,
            allowed_origins: server.allowed_origins,
        })
    }

    /// Full path of a dataset's export file
    pub fn data_path(&self, kind: DatasetKind) -> PathBuf {
        self.data_dir.join(self.data_files.file_name(kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let file_config = FileConfig::load_or_default(&dir.path().join("missing.toml")).unwrap();
        let config = Config::from_file(file_config, None, None).unwrap();

        assert_eq!(config.listen_addr, "127.0.0.1:5000".parse::<SocketAddr>().unwrap());
        assert!(config.allowed_origins.is_empty());
        assert_eq!(
            config.data_path(DatasetKind::CustomerTypes),
            PathBuf::from("./data").join("Customer type.json")
        );
        assert_eq!(
            config.data_path(DatasetKind::Teams),
            PathBuf::from("./data").join("Team.json")
        );
    }

    #[test]
    fn test_partial_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
            [server]
            port = 8080
            allowed_origins = ["http://localhost:3000"]

            [data.files]
            teams = "teams-2024.json"
            "#,
        )
        .unwrap();

        let config = Config::from_file(FileConfig::load(&path).unwrap(), None, None).unwrap();
        assert_eq!(config.listen_addr, "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(config.allowed_origins, vec!["http://localhost:3000"]);
        assert_eq!(config.data_files.teams, "teams-2024.json");
        assert_eq!(config.data_files.industries, "Account Industry.json");
    }

    #[test]
    fn test_cli_overrides_win() {
        let file_config = FileConfig::default();
        let config =
            Config::from_file(file_config, Some(PathBuf::from("/srv/exports")), Some(9000)).unwrap();
        assert_eq!(config.listen_addr.port(), 9000);
        assert_eq!(
            config.data_path(DatasetKind::AcvRanges),
            PathBuf::from("/srv/exports/ACV Range.json")
        );
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nbind = \"0.0.0.0\"\n").unwrap();
        assert!(FileConfig::load(&path).is_err());
    }

    #[test]
    fn test_invalid_host_is_rejected() {
        let mut file_config = FileConfig::default();
        file_config.server.host = "not a host".to_string();
        assert!(Config::from_file(file_config, None, None).is_err());
    }
}
