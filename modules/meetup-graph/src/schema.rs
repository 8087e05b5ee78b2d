use neo4rs::query;
use thiserror::Error;
use tracing::{info, warn};

use crate::GraphClient;

/// Uniqueness constraints as (label, property).
pub const UNIQUE_CONSTRAINTS: [(&str, &str); 5] = [
    ("Event", "id"),
    ("Group", "id"),
    ("Member", "id"),
    ("Topic", "id"),
    ("Country", "code"),
];

/// Plain property indexes as (label, property).
pub const INDEXES: [(&str, &str); 1] = [("City", "name")];

#[derive(Debug, Error)]
pub enum SchemaError {
    /// Labels and property keys cannot be query parameters, so they are
    /// spliced into the statement and must be plain identifiers.
    #[error("invalid schema identifier: {0:?}")]
    InvalidIdentifier(String),

    #[error(transparent)]
    Graph(#[from] neo4rs::Error),
}

/// Create every constraint and index the import relies on. Idempotent.
pub async fn setup_schema(client: &GraphClient) -> Result<(), SchemaError> {
    info!("Creating schema constraints and indexes...");

    for (label, property) in UNIQUE_CONSTRAINTS {
        ensure_constraint(client, label, property).await?;
    }
    info!(count = UNIQUE_CONSTRAINTS.len(), "Uniqueness constraints ensured");

    for (label, property) in INDEXES {
        ensure_index(client, label, property).await?;
    }
    info!(count = INDEXES.len(), "Property indexes ensured");

    Ok(())
}

/// Ensure a uniqueness constraint on `(:label).property`.
pub async fn ensure_constraint(
    client: &GraphClient,
    label: &str,
    property: &str,
) -> Result<(), SchemaError> {
    let cypher = constraint_statement(label, property)?;
    run_ignoring_exists(client, &cypher).await?;
    Ok(())
}

/// Ensure a range index on `(:label).property`.
pub async fn ensure_index(
    client: &GraphClient,
    label: &str,
    property: &str,
) -> Result<(), SchemaError> {
    let cypher = index_statement(label, property)?;
    run_ignoring_exists(client, &cypher).await?;
    Ok(())
}

/// Delete every node and relationship. Constraints and indexes survive.
pub async fn wipe_all(client: &GraphClient) -> Result<(), neo4rs::Error> {
    warn!("Dropping all nodes and relationships");
    client.run(query("MATCH (n) DETACH DELETE n")).await
}

fn constraint_statement(label: &str, property: &str) -> Result<String, SchemaError> {
    let label = identifier(label)?;
    let property = identifier(property)?;
    Ok(format!(
        "CREATE CONSTRAINT {}_{}_unique IF NOT EXISTS FOR (n:{label}) REQUIRE n.{property} IS UNIQUE",
        label.to_lowercase(),
        property.to_lowercase(),
    ))
}

fn index_statement(label: &str, property: &str) -> Result<String, SchemaError> {
    let label = identifier(label)?;
    let property = identifier(property)?;
    Ok(format!(
        "CREATE INDEX {}_{}_index IF NOT EXISTS FOR (n:{label}) ON (n.{property})",
        label.to_lowercase(),
        property.to_lowercase(),
    ))
}

fn identifier(s: &str) -> Result<&str, SchemaError> {
    let mut chars = s.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(s)
    } else {
        Err(SchemaError::InvalidIdentifier(s.to_string()))
    }
}

/// A differently named constraint on the same property (left by an older
/// run) makes `IF NOT EXISTS` fail with "equivalent ..."; that is not an error.
async fn run_ignoring_exists(client: &GraphClient, cypher: &str) -> Result<(), neo4rs::Error> {
    match client.run(query(cypher)).await {
        Ok(_) => Ok(()),
        Err(e) => {
            let msg = e.to_string().to_lowercase();
            if msg.contains("already exists") || msg.contains("equivalent") {
                warn!("Already exists (skipped): {}", cypher.chars().take(80).collect::<String>());
                Ok(())
            } else {
                Err(e)
            }
        }
    }
}
