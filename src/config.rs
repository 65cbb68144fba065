//! TOML-based dashboard configuration.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use serde::Deserialize;

use crate::error::Error;
use crate::table::paginate::DEFAULT_PAGE_SIZES;

/// Top-level dashboard configuration parsed from TOML.
///
/// Every section is optional and falls back to its defaults. Load from TOML
/// with [`DashboardConfig::from_toml_file`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DashboardConfig {
    /// Mock data-source parameters.
    #[serde(default)]
    pub source: SourceConfig,
    /// Table defaults.
    #[serde(default)]
    pub table: TableConfig,
    /// CSV export destination.
    #[serde(default)]
    pub export: ExportConfig,
    /// HTTP API listener.
    #[serde(default)]
    pub server: ServerConfig,
}

/// Mock data-source parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    /// Random seed for generated consumption values.
    pub seed: u64,
    /// Fixed "today" (`YYYY-MM-DD`); the local date when absent.
    pub today: Option<NaiveDate>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            today: None,
        }
    }
}

impl SourceConfig {
    pub fn resolved_today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }
}

/// Table defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TableConfig {
    /// Initial rows per page (must be one of `page_sizes`).
    pub page_size: usize,
    /// Page sizes offered to the user.
    pub page_sizes: Vec<usize>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            page_sizes: DEFAULT_PAGE_SIZES.to_vec(),
        }
    }
}

impl TableConfig {
    /// Page size for a request: `requested` if offered, else the default.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPageSize` for zero and `PageSizeNotOffered` for any
    /// size missing from `page_sizes`.
    pub fn resolve_page_size(&self, requested: Option<usize>) -> crate::Result<usize> {
        match requested {
            None => Ok(self.page_size),
            Some(0) => Err(Error::InvalidPageSize(0)),
            Some(size) if self.page_sizes.contains(&size) => Ok(size),
            Some(size) => Err(Error::PageSizeNotOffered {
                size,
                offered: self.page_sizes.clone(),
            }),
        }
    }
}

/// CSV export destination.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// Directory exported files are written to.
    pub directory: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
        }
    }
}

/// HTTP API listener.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"table.page_size"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {}: {}", self.field, self.message)
    }
}

impl DashboardConfig {
    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "config".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let t = &self.table;

        if t.page_size == 0 {
            errors.push(ConfigError {
                field: "table.page_size".into(),
                message: "must be > 0".into(),
            });
        }
        if t.page_sizes.is_empty() {
            errors.push(ConfigError {
                field: "table.page_sizes".into(),
                message: "must not be empty".into(),
            });
        }
        if t.page_sizes.contains(&0) {
            errors.push(ConfigError {
                field: "table.page_sizes".into(),
                message: "entries must be > 0".into(),
            });
        }
        if t.page_size > 0 && !t.page_sizes.is_empty() && !t.page_sizes.contains(&t.page_size) {
            errors.push(ConfigError {
                field: "table.page_size".into(),
                message: format!("must be one of {:?}", t.page_sizes),
            });
        }

        if self.server.port == 0 {
            errors.push(ConfigError {
                field: "server.port".into(),
                message: "must be > 0".into(),
            });
        }
        if self.server.host.trim().is_empty() {
            errors.push(ConfigError {
                field: "server.host".into(),
                message: "must not be empty".into(),
            });
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = DashboardConfig::default();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "defaults should be valid: {errors:?}");
        assert_eq!(cfg.table.page_size, 10);
        assert_eq!(cfg.table.page_sizes, vec![5, 10, 20, 50]);
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[source]
seed = 7
today = "2025-05-12"

[table]
page_size = 20
page_sizes = [10, 20]

[export]
directory = "/tmp/exports"

[server]
host = "0.0.0.0"
port = 8080
"#;
        let cfg = DashboardConfig::from_toml_str(toml);
        assert!(cfg.is_ok(), "valid TOML should parse: {:?}", cfg.err());
        let cfg = cfg.ok();
        assert_eq!(cfg.as_ref().map(|c| c.source.seed), Some(7));
        assert_eq!(
            cfg.as_ref().map(|c| c.source.resolved_today()),
            NaiveDate::from_ymd_opt(2025, 5, 12)
        );
        assert_eq!(cfg.as_ref().map(|c| c.table.page_size), Some(20));
        assert_eq!(cfg.as_ref().map(|c| c.server.port), Some(8080));
        assert!(cfg.as_ref().is_some_and(|c| c.validate().is_empty()));
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[table]
page_size = 10
rows_per_screen = 40
"#;
        assert!(DashboardConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn malformed_date_is_rejected() {
        let toml = r#"
[source]
today = "12/05/2025"
"#;
        let err = DashboardConfig::from_toml_str(toml).err();
        assert!(err.is_some_and(|e| e.field == "toml"));
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let cfg = DashboardConfig::from_toml_str("[source]\nseed = 99\n").ok();
        assert_eq!(cfg.as_ref().map(|c| c.source.seed), Some(99));
        assert_eq!(cfg.as_ref().map(|c| c.table.page_size), Some(10));
        assert_eq!(cfg.as_ref().map(|c| c.server.port), Some(3000));
    }

    #[test]
    fn validation_catches_zero_page_size() {
        let mut cfg = DashboardConfig::default();
        cfg.table.page_size = 0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "table.page_size"));
    }

    #[test]
    fn validation_catches_page_size_not_offered() {
        let mut cfg = DashboardConfig::default();
        cfg.table.page_size = 25;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "table.page_size" && e.message.contains("one of")));
    }

    #[test]
    fn validation_catches_empty_sizes_and_zero_port() {
        let mut cfg = DashboardConfig::default();
        cfg.table.page_sizes.clear();
        cfg.server.port = 0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "table.page_sizes"));
        assert!(errors.iter().any(|e| e.field == "server.port"));
    }

    #[test]
    fn only_offered_page_sizes_resolve() {
        let table = TableConfig::default();
        assert_eq!(table.resolve_page_size(None).ok(), Some(10));
        assert_eq!(table.resolve_page_size(Some(20)).ok(), Some(20));
        assert!(matches!(
            table.resolve_page_size(Some(7)),
            Err(Error::PageSizeNotOffered { size: 7, .. })
        ));
        assert!(matches!(table.resolve_page_size(Some(0)), Err(Error::InvalidPageSize(0))));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = DashboardConfig::from_toml_file(Path::new("/nonexistent/dash.toml")).err();
        assert!(err.is_some_and(|e| e.message.contains("/nonexistent/dash.toml")));
    }
}
