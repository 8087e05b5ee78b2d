use neo4rs::query;

use crate::types::TopicCount;
use crate::GraphClient;

/// Read-only aggregate queries over an imported event.
pub struct GraphReader {
    client: GraphClient,
}

impl GraphReader {
    pub fn new(client: GraphClient) -> Self {
        Self { client }
    }

    /// Count, per Topic, the (member, group) paths where the member said yes
    /// to the event and belongs to a group tagged with that topic. Keeps
    /// topics whose count is strictly greater than `min_count`.
    pub async fn topic_popularity(
        &self,
        event_id: &str,
        min_count: i64,
    ) -> Result<Vec<TopicCount>, neo4rs::Error> {
        let q = query(
            "MATCH (event:Event {id: $event_id})<-[:PARTICIPATE]-(m:Member)
             MATCH (m)-[:MEMBER_OF]->(g:Group)<-[:TAGS_GROUP]-(t:Topic)
             WITH t.name AS topic, count(*) AS c
             WHERE c > $min_count
             RETURN topic, c
             ORDER BY c DESC, topic",
        )
        .param("event_id", event_id)
        .param("min_count", min_count);

        let rows = self.client.execute(q).await?;
        let topics = rows
            .iter()
            .filter_map(|row| {
                let topic: String = row.get("topic").ok()?;
                let count: i64 = row.get("c").unwrap_or(0);
                Some(TopicCount { topic, count })
            })
            .collect();

        Ok(topics)
    }
}
