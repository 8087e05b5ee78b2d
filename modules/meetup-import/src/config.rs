use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

pub const DEFAULT_CONFIG_PATH: &str = "config.yml";
pub const DEFAULT_OUTPUT_PATH: &str = "meetup.html";

const SUPPORTED_SCHEMES: &[&str] = &[
    "bolt", "bolt+s", "bolt+ssc", "neo4j", "neo4j+s", "neo4j+ssc",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("an event id is required: meetup-import <EVENT_ID>")]
    MissingEventId,

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("config key `{0}` must not be empty")]
    EmptyValue(&'static str),

    #[error("unsupported neo4j_scheme {0:?} (expected one of bolt, neo4j, with optional +s/+ssc)")]
    UnsupportedScheme(String),
}

/// Command line: `meetup-import <EVENT_ID> [SKIP_SCHEMA_SETUP] [DROP_DB_ON_INIT]`.
#[derive(Debug, Parser)]
#[command(name = "meetup-import")]
#[command(about = "Import a Meetup event into Neo4j and render its topic chart")]
pub struct Cli {
    /// Meetup event id
    pub event_id: String,

    /// Skip constraint and index creation (any truthy value)
    #[arg(action = clap::ArgAction::Set, value_parser = parse_flag, default_value = "0")]
    pub skip_schema_setup: bool,

    /// Delete every node and relationship before importing (any truthy value)
    #[arg(action = clap::ArgAction::Set, value_parser = parse_flag, default_value = "0")]
    pub drop_db_on_init: bool,

    /// YAML config file
    #[arg(long, env = "MEETUP_IMPORT_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Where the topic chart is written
    #[arg(long, default_value = DEFAULT_OUTPUT_PATH)]
    pub output: PathBuf,
}

/// Permissive boolean: blank, `0`, `false`, `no` and `off` are false,
/// anything else is true.
pub fn parse_flag(raw: &str) -> Result<bool, String> {
    let v = raw.trim().to_ascii_lowercase();
    Ok(!matches!(v.as_str(), "" | "0" | "false" | "no" | "off"))
}

/// YAML-backed configuration loaded from disk.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub meetup_api_key: String,
    pub neo4j_scheme: String,
    pub neo4j_host: String,
    pub neo4j_port: u16,
    pub neo4j_user: String,
    pub neo4j_password: String,
    #[serde(default = "default_api_url")]
    pub meetup_api_url: String,
    #[serde(default = "default_rate_limit_ms")]
    pub meetup_rate_limit_ms: u64,
}

fn default_api_url() -> String {
    meetup_client::BASE_URL.to_string()
}

fn default_rate_limit_ms() -> u64 {
    meetup_client::DEFAULT_MEMBER_GROUPS_INTERVAL.as_millis() as u64
}

impl FileConfig {
    /// Bolt URI assembled from scheme, host and port.
    pub fn neo4j_uri(&self) -> String {
        format!("{}://{}:{}", self.neo4j_scheme, self.neo4j_host, self.neo4j_port)
    }

    pub fn member_groups_interval(&self) -> Duration {
        Duration::from_millis(self.meetup_rate_limit_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("meetup_api_key", &self.meetup_api_key),
            ("neo4j_scheme", &self.neo4j_scheme),
            ("neo4j_host", &self.neo4j_host),
            ("neo4j_user", &self.neo4j_user),
            ("neo4j_password", &self.neo4j_password),
            ("meetup_api_url", &self.meetup_api_url),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::EmptyValue(key));
            }
        }

        if !SUPPORTED_SCHEMES.contains(&self.neo4j_scheme.as_str()) {
            return Err(ConfigError::UnsupportedScheme(self.neo4j_scheme.clone()));
        }
        Ok(())
    }

    /// Log the effective configuration without secrets.
    pub fn log_redacted(&self) {
        info!(
            neo4j_uri = %self.neo4j_uri(),
            neo4j_user = %self.neo4j_user,
            neo4j_password = "<redacted>",
            meetup_api_url = %self.meetup_api_url,
            meetup_api_key = "<redacted>",
            meetup_rate_limit_ms = self.meetup_rate_limit_ms,
            "Configuration loaded"
        );
    }
}

/// Load, parse and validate a YAML config file.
pub fn load_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: FileConfig =
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    config.validate()?;
    Ok(config)
}

/// Everything a run needs, resolved from the command line and the config file.
#[derive(Debug, Clone)]
pub struct Settings {
    pub event_id: String,
    pub skip_schema_setup: bool,
    pub drop_db_on_init: bool,
    pub output_path: PathBuf,
    pub file: FileConfig,
}

impl Settings {
    /// The event id is checked before the config file is touched.
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        let event_id = cli.event_id.trim().to_string();
        if event_id.is_empty() {
            return Err(ConfigError::MissingEventId);
        }

        let file = load_config(&cli.config)?;
        Ok(Self {
            event_id,
            skip_schema_setup: cli.skip_schema_setup,
            drop_db_on_init: cli.drop_db_on_init,
            output_path: cli.output,
            file,
        })
    }
}
