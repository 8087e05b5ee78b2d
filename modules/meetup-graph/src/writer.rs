use neo4rs::{query, BoltInteger, BoltMap, BoltString, BoltType};
use tracing::debug;

use crate::types::{
    EventNode, GroupNode, Location, MemberNode, OrganizerRef, RsvpKind, RsvpLink, TopicNode,
};
use crate::GraphClient;

const PARTICIPATE_QUERY: &str = "MATCH (e:Event {id: $event_id})
     UNWIND $rsvps AS rsvp
     MATCH (m:Member {id: rsvp.member_id})
     MERGE (m)-[:PARTICIPATE {rsvp_id: rsvp.id}]->(e)
     RETURN count(m) AS linked";

const DECLINED_QUERY: &str = "MATCH (e:Event {id: $event_id})
     UNWIND $rsvps AS rsvp
     MATCH (m:Member {id: rsvp.member_id})
     MERGE (m)-[:DECLINED {rsvp_id: rsvp.id}]->(e)
     RETURN count(m) AS linked";

/// Write-side wrapper for the graph.
///
/// Every method is a MERGE keyed on natural ids, so replaying an import
/// against the same data leaves node and relationship counts unchanged.
pub struct GraphWriter {
    client: GraphClient,
}

impl GraphWriter {
    pub fn new(client: GraphClient) -> Self {
        Self { client }
    }

    /// Create or update an Event node.
    pub async fn upsert_event(&self, event: &EventNode) -> Result<(), neo4rs::Error> {
        let q = query(
            "MERGE (e:Event {id: $id})
             SET e.name = $name,
                 e.description = $description,
                 e.url = $url",
        )
        .param("id", event.id.as_str())
        .param("name", event.name.as_str())
        .param("description", event.description.clone())
        .param("url", event.url.as_str());

        self.client.run(q).await
    }

    /// Create or update a Group, its City/Country and the Topics tagging it.
    /// The organizer is written separately by [`Self::upsert_organizer`].
    pub async fn upsert_group(&self, group: &GroupNode) -> Result<(), neo4rs::Error> {
        let q = query(
            "MERGE (g:Group {id: $id})
             SET g.name = $name,
                 g.description = $description,
                 g.url = $url",
        )
        .param("id", group.id)
        .param("name", group.name.as_str())
        .param("description", group.description.clone())
        .param("url", group.url.as_str());
        self.client.run(q).await?;

        if let Some(location) = &group.location {
            self.link_group_location(group.id, location).await?;
        }

        if !group.topics.is_empty() {
            self.tag_group(group.id, &group.topics).await?;
        }

        debug!(group_id = group.id, topics = group.topics.len(), "Group upserted");
        Ok(())
    }

    async fn link_group_location(
        &self,
        group_id: i64,
        location: &Location,
    ) -> Result<(), neo4rs::Error> {
        let q = query(
            "MATCH (g:Group {id: $group_id})
             MERGE (city:City {name: $city})
             MERGE (country:Country {code: $country})
             MERGE (g)-[:GROUP_IN_CITY]->(city)
             MERGE (city)-[:IN_COUNTRY]->(country)",
        )
        .param("group_id", group_id)
        .param("city", location.city.as_str())
        .param("country", location.country.as_str());

        self.client.run(q).await
    }

    async fn tag_group(&self, group_id: i64, topics: &[TopicNode]) -> Result<(), neo4rs::Error> {
        let topic_data: Vec<BoltType> = topics
            .iter()
            .map(|t| {
                BoltType::Map(BoltMap::from_iter(vec![
                    (
                        BoltString::from("id"),
                        BoltType::Integer(BoltInteger::new(t.id)),
                    ),
                    (
                        BoltString::from("name"),
                        BoltType::String(BoltString::from(t.name.as_str())),
                    ),
                ]))
            })
            .collect();

        // Topic names are only set on creation; the id is the identity.
        let q = query(
            "MATCH (g:Group {id: $group_id})
             UNWIND $topics AS topic
             MERGE (t:Topic {id: topic.id})
             ON CREATE SET t.name = topic.name
             MERGE (t)-[:TAGS_GROUP]->(g)",
        )
        .param("group_id", group_id)
        .param("topics", topic_data);

        self.client.run(q).await
    }

    /// Link a Group to the Event it organises.
    pub async fn link_group_organises_event(
        &self,
        group_id: i64,
        event_id: &str,
    ) -> Result<(), neo4rs::Error> {
        let q = query(
            "MATCH (g:Group {id: $group_id}), (e:Event {id: $event_id})
             MERGE (g)-[:ORGANISE_EVENT]->(e)",
        )
        .param("group_id", group_id)
        .param("event_id", event_id);

        self.client.run(q).await
    }

    /// Upsert a group's organizer. An existing Member keeps its name.
    pub async fn upsert_organizer(
        &self,
        group_id: i64,
        organizer: &OrganizerRef,
    ) -> Result<(), neo4rs::Error> {
        let q = query(
            "MATCH (g:Group {id: $group_id})
             MERGE (m:Member {id: $member_id})
             ON CREATE SET m.name = $name
             MERGE (m)-[:ORGANISE_GROUP]->(g)",
        )
        .param("group_id", group_id)
        .param("member_id", organizer.member_id)
        .param("name", organizer.name.as_str());

        self.client.run(q).await
    }

    /// Make sure a Member exists for a secondary group's organizer, without
    /// an ORGANISE_GROUP edge. An existing Member keeps its name.
    pub async fn ensure_member(&self, organizer: &OrganizerRef) -> Result<(), neo4rs::Error> {
        let q = query(
            "MERGE (m:Member {id: $member_id})
             ON CREATE SET m.name = $name",
        )
        .param("member_id", organizer.member_id)
        .param("name", organizer.name.as_str());

        self.client.run(q).await
    }

    /// Create or update a Member and where they live.
    pub async fn upsert_member(&self, member: &MemberNode) -> Result<(), neo4rs::Error> {
        let q = query(
            "MERGE (m:Member {id: $id})
             SET m.name = $name,
                 m.avatar = $avatar,
                 m.joined_time = $joined_time",
        )
        .param("id", member.id)
        .param("name", member.name.as_str())
        .param("avatar", member.avatar.clone())
        .param("joined_time", member.joined_time);
        self.client.run(q).await?;

        if let Some(location) = &member.location {
            let q = query(
                "MATCH (m:Member {id: $id})
                 MERGE (city:City {name: $city})
                 MERGE (country:Country {code: $country})
                 MERGE (m)-[:LIVES_IN]->(city)
                 MERGE (city)-[:IN_COUNTRY]->(country)",
            )
            .param("id", member.id)
            .param("city", location.city.as_str())
            .param("country", location.country.as_str());
            self.client.run(q).await?;
        }

        Ok(())
    }

    pub async fn link_member_of(&self, member_id: i64, group_id: i64) -> Result<(), neo4rs::Error> {
        let q = query(
            "MATCH (m:Member {id: $member_id}), (g:Group {id: $group_id})
             MERGE (m)-[:MEMBER_OF]->(g)",
        )
        .param("member_id", member_id)
        .param("group_id", group_id);

        self.client.run(q).await
    }

    /// Link RSVPs to the event as PARTICIPATE or DECLINED, tagged with the
    /// rsvp id. Only Members already in the graph are matched. Returns how
    /// many RSVPs found their Member.
    pub async fn link_rsvps(
        &self,
        event_id: &str,
        kind: RsvpKind,
        rsvps: &[RsvpLink],
    ) -> Result<u64, neo4rs::Error> {
        if rsvps.is_empty() {
            return Ok(0);
        }

        let rsvp_data: Vec<BoltType> = rsvps
            .iter()
            .map(|r| {
                BoltType::Map(BoltMap::from_iter(vec![
                    (
                        BoltString::from("id"),
                        BoltType::Integer(BoltInteger::new(r.rsvp_id)),
                    ),
                    (
                        BoltString::from("member_id"),
                        BoltType::Integer(BoltInteger::new(r.member_id)),
                    ),
                ]))
            })
            .collect();

        let cypher = match kind {
            RsvpKind::Participate => PARTICIPATE_QUERY,
            RsvpKind::Declined => DECLINED_QUERY,
        };
        let q = query(cypher)
            .param("event_id", event_id)
            .param("rsvps", rsvp_data);

        let rows = self.client.execute(q).await?;
        let linked: i64 = rows
            .first()
            .and_then(|row| row.get("linked").ok())
            .unwrap_or(0);

        debug!(event_id, rel = kind.rel_type(), sent = rsvps.len(), linked, "RSVPs linked");
        Ok(linked.max(0) as u64)
    }
}
