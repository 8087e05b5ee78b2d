// Trait seams for the importer's two collaborators.
//
// MeetupApi covers every read against the Meetup API, GraphStore every
// write and read against Neo4j. Tests swap in MockMeetup / MockGraph:
// no network, no database.

use anyhow::Result;
use async_trait::async_trait;

use meetup_client::{Event, Group, Member, MeetupClient, Rsvp};
use meetup_graph::{
    schema, EventNode, GraphClient, GraphReader, GraphWriter, GroupNode, MemberNode,
    OrganizerRef, RsvpKind, RsvpLink, TopicCount,
};

// ---------------------------------------------------------------------------
// MeetupApi
// ---------------------------------------------------------------------------

#[async_trait]
pub trait MeetupApi: Send + Sync {
    async fn event(&self, id: &str) -> Result<Event>;

    async fn groups_by_urlname(&self, urlname: &str) -> Result<Vec<Group>>;

    async fn groups_by_member_id(&self, member_id: i64) -> Result<Vec<Group>>;

    async fn members(&self, group_id: i64) -> Result<Vec<Member>>;

    async fn rsvps(&self, event_id: &str) -> Result<Vec<Rsvp>>;
}

#[async_trait]
impl MeetupApi for MeetupClient {
    async fn event(&self, id: &str) -> Result<Event> {
        Ok(self.get_event(id).await?)
    }

    async fn groups_by_urlname(&self, urlname: &str) -> Result<Vec<Group>> {
        Ok(self.get_groups_by_urlname(urlname).await?)
    }

    async fn groups_by_member_id(&self, member_id: i64) -> Result<Vec<Group>> {
        Ok(self.get_groups_by_member_id(member_id).await?)
    }

    async fn members(&self, group_id: i64) -> Result<Vec<Member>> {
        Ok(self.get_members(group_id).await?)
    }

    async fn rsvps(&self, event_id: &str) -> Result<Vec<Rsvp>> {
        Ok(self.get_rsvps(event_id).await?)
    }
}

// ---------------------------------------------------------------------------
// GraphStore
// ---------------------------------------------------------------------------

#[async_trait]
pub trait GraphStore: Send + Sync {
    async fn ensure_constraint(&self, label: &str, property: &str) -> Result<()>;

    async fn ensure_index(&self, label: &str, property: &str) -> Result<()>;

    /// Delete every node and relationship.
    async fn wipe_all(&self) -> Result<()>;

    async fn upsert_event(&self, event: &EventNode) -> Result<()>;

    /// Group plus its City/Country and Topics. Not the organizer.
    async fn upsert_group(&self, group: &GroupNode) -> Result<()>;

    async fn link_group_organises_event(&self, group_id: i64, event_id: &str) -> Result<()>;

    async fn upsert_organizer(&self, group_id: i64, organizer: &OrganizerRef) -> Result<()>;

    /// Member stub for an organizer, no ORGANISE_GROUP.
    async fn ensure_member(&self, organizer: &OrganizerRef) -> Result<()>;

    /// Member plus LIVES_IN City/Country.
    async fn upsert_member(&self, member: &MemberNode) -> Result<()>;

    async fn link_member_of(&self, member_id: i64, group_id: i64) -> Result<()>;

    /// Returns how many RSVPs matched an existing Member.
    async fn link_rsvps(&self, event_id: &str, kind: RsvpKind, rsvps: &[RsvpLink])
        -> Result<u64>;

    async fn topic_popularity(&self, event_id: &str, min_count: i64) -> Result<Vec<TopicCount>>;
}

/// Neo4j-backed store: schema helpers, writer and reader over one connection.
pub struct Neo4jStore {
    client: GraphClient,
    writer: GraphWriter,
    reader: GraphReader,
}

impl Neo4jStore {
    pub fn new(client: GraphClient) -> Self {
        Self {
            writer: GraphWriter::new(client.clone()),
            reader: GraphReader::new(client.clone()),
            client,
        }
    }
}

#[async_trait]
impl GraphStore for Neo4jStore {
    async fn ensure_constraint(&self, label: &str, property: &str) -> Result<()> {
        Ok(schema::ensure_constraint(&self.client, label, property).await?)
    }

    async fn ensure_index(&self, label: &str, property: &str) -> Result<()> {
        Ok(schema::ensure_index(&self.client, label, property).await?)
    }

    async fn wipe_all(&self) -> Result<()> {
        Ok(schema::wipe_all(&self.client).await?)
    }

    async fn upsert_event(&self, event: &EventNode) -> Result<()> {
        Ok(self.writer.upsert_event(event).await?)
    }

    async fn upsert_group(&self, group: &GroupNode) -> Result<()> {
        Ok(self.writer.upsert_group(group).await?)
    }

    async fn link_group_organises_event(&self, group_id: i64, event_id: &str) -> Result<()> {
        Ok(self
            .writer
            .link_group_organises_event(group_id, event_id)
            .await?)
    }

    async fn upsert_organizer(&self, group_id: i64, organizer: &OrganizerRef) -> Result<()> {
        Ok(self.writer.upsert_organizer(group_id, organizer).await?)
    }

    async fn ensure_member(&self, organizer: &OrganizerRef) -> Result<()> {
        Ok(self.writer.ensure_member(organizer).await?)
    }

    async fn upsert_member(&self, member: &MemberNode) -> Result<()> {
        Ok(self.writer.upsert_member(member).await?)
    }

    async fn link_member_of(&self, member_id: i64, group_id: i64) -> Result<()> {
        Ok(self.writer.link_member_of(member_id, group_id).await?)
    }

    async fn link_rsvps(
        &self,
        event_id: &str,
        kind: RsvpKind,
        rsvps: &[RsvpLink],
    ) -> Result<u64> {
        Ok(self.writer.link_rsvps(event_id, kind, rsvps).await?)
    }

    async fn topic_popularity(&self, event_id: &str, min_count: i64) -> Result<Vec<TopicCount>> {
        Ok(self.reader.topic_popularity(event_id, min_count).await?)
    }
}
