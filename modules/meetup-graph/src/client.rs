use neo4rs::{ConfigBuilder, Graph, Query, Row};

/// Thin wrapper around neo4rs::Graph providing connection setup.
///
/// The import issues one statement at a time, so the pool is capped at a
/// single connection.
#[derive(Clone)]
pub struct GraphClient {
    graph: Graph,
}

impl GraphClient {
    /// Connect to Neo4j with the given credentials.
    pub async fn connect(uri: &str, user: &str, password: &str) -> Result<Self, neo4rs::Error> {
        let config = ConfigBuilder::default()
            .uri(uri)
            .user(user)
            .password(password)
            .fetch_size(500)
            .max_connections(1)
            .build()?;
        let graph = Graph::connect(config).await?;
        Ok(Self { graph })
    }

    /// Run a statement, discarding any rows.
    pub async fn run(&self, q: Query) -> Result<(), neo4rs::Error> {
        self.graph.run(q).await
    }

    /// Run a statement and collect every row.
    pub async fn execute(&self, q: Query) -> Result<Vec<Row>, neo4rs::Error> {
        let mut stream = self.graph.execute(q).await?;
        let mut rows = Vec::new();
        while let Some(row) = stream.next().await? {
            rows.push(row);
        }
        Ok(rows)
    }
}
