pub mod config;
pub mod convert;
pub mod importer;
pub mod render;
pub mod traits;

#[cfg(test)]
mod testing;

pub use config::{Cli, ConfigError, FileConfig, Settings};
pub use importer::{ImportOptions, ImportSummary, Importer};
pub use render::{render_topic_chart, write_topic_chart, TOPIC_COUNT_THRESHOLD};
pub use traits::{GraphStore, MeetupApi, Neo4jStore};
