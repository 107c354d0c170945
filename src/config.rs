use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Free-form label for the loaded profile.
    pub profile_name: String,
    pub parser: ParserRules,
    pub summary: SummaryRules,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            profile_name: "base".to_string(),
            parser: ParserRules::default(),
            summary: SummaryRules::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserRules {
    /// chrono format of the bracketed timestamp column
    pub timestamp_format: String,
    /// Size recorded when the size column is "-"
    pub missing_size: i64,
    pub report_unparsed: bool,
}

impl Default for ParserRules {
    fn default() -> Self {
        Self {
            timestamp_format: "%d/%b/%Y:%H:%M:%S %z".to_string(),
            missing_size: 0,
            report_unparsed: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryRules {
    pub top_n: usize,
    pub image_extensions: Vec<String>,
}

impl Default for SummaryRules {
    fn default() -> Self {
        Self {
            top_n: 3,
            image_extensions: [".png", ".jpg", ".gif", ".ico", ".jpeg"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

pub fn load_config(path: Option<&Path>) -> Result<QueryConfig, ConfigError> {
    if let Some(path) = path {
        load_config_from_path(path)
    } else {
        Ok(default_config().clone())
    }
}

pub fn load_config_from_path(path: &Path) -> Result<QueryConfig, ConfigError> {
    let path_display = path.display().to_string();
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path_display.clone(),
        source,
    })?;

    toml::from_str::<QueryConfig>(&raw).map_err(|source| ConfigError::Parse {
        path: path_display,
        source,
    })
}

pub fn default_config() -> &'static QueryConfig {
    static DEFAULT_CONFIG: LazyLock<QueryConfig> = LazyLock::new(QueryConfig::default);
    &DEFAULT_CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: QueryConfig = toml::from_str(
            r#"
profile_name = "nginx"

[summary]
top_n = 10
"#,
        )
        .unwrap();

        assert_eq!(config.profile_name, "nginx");
        assert_eq!(config.summary.top_n, 10);
        assert_eq!(config.summary.image_extensions.len(), 5);
        assert_eq!(config.parser.timestamp_format, "%d/%b/%Y:%H:%M:%S %z");
        assert!(config.parser.report_unparsed);
    }

    #[test]
    fn test_load_config_without_path_is_default() {
        let config = load_config(None).unwrap();
        assert_eq!(config.profile_name, "base");
        assert_eq!(config.parser.missing_size, 0);
    }

    #[test]
    fn test_missing_config_file_is_read_error() {
        let result = load_config(Some(Path::new("/nonexistent/query.toml")));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
