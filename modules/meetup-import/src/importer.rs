use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use meetup_client::{Event, Group, Member};
use meetup_graph::schema::{INDEXES, UNIQUE_CONSTRAINTS};
use meetup_graph::{GroupNode, RsvpKind};

use crate::convert::{event_node, group_node, member_node, partition_rsvps};
use crate::traits::{GraphStore, MeetupApi};

#[derive(Debug, Clone, Copy, Default)]
pub struct ImportOptions {
    /// Assume constraints and indexes exist from an earlier run.
    pub skip_schema_setup: bool,
    /// Delete the whole graph before importing.
    pub drop_db_on_init: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportSummary {
    pub event_id: String,
    pub event_name: String,
    pub group_id: i64,
    pub members: usize,
    /// Distinct groups written, the organising group included.
    pub groups: usize,
    pub participants: u64,
    pub declined: u64,
    /// RSVPs whose member was not in the graph and so were not linked.
    pub unmatched_rsvps: u64,
}

/// A group member joined with every group they belong to.
#[derive(Debug, Clone)]
pub struct MemberEntry {
    pub member: Member,
    pub groups: Vec<Group>,
}

/// Sequences the API reads and graph writes for one event.
///
/// There is no transaction spanning the steps: a failure leaves the graph
/// partially written, and a re-run converges because every write merges.
pub struct Importer {
    api: Arc<dyn MeetupApi>,
    store: Arc<dyn GraphStore>,
    options: ImportOptions,
}

impl Importer {
    pub fn new(api: Arc<dyn MeetupApi>, store: Arc<dyn GraphStore>, options: ImportOptions) -> Self {
        Self {
            api,
            store,
            options,
        }
    }

    pub async fn run(&self, event_id: &str) -> Result<ImportSummary> {
        self.prepare_graph().await?;

        let event = self.import_event(event_id).await?;
        let group = self.import_event_group(&event).await?;

        let members = self
            .api
            .members(group.id)
            .await
            .with_context(|| format!("Failed to fetch members of group {}", group.id))?;
        info!(group_id = group.id, count = members.len(), "Fetched group members");

        let roster = self.collect_member_groups(members).await?;
        let groups = self.write_roster(&roster, group.id).await?;

        let mut summary = ImportSummary {
            event_id: event.id.clone(),
            event_name: event.name.clone(),
            group_id: group.id,
            members: roster.len(),
            groups,
            ..Default::default()
        };
        self.import_rsvps(&event.id, &mut summary).await?;

        info!(
            event_id = %summary.event_id,
            members = summary.members,
            groups = summary.groups,
            participants = summary.participants,
            declined = summary.declined,
            unmatched_rsvps = summary.unmatched_rsvps,
            "Import complete"
        );
        Ok(summary)
    }

    /// Schema setup and wipe are controlled independently.
    async fn prepare_graph(&self) -> Result<()> {
        if self.options.skip_schema_setup {
            info!("Skipping schema creation");
        } else {
            for (label, property) in UNIQUE_CONSTRAINTS {
                self.store
                    .ensure_constraint(label, property)
                    .await
                    .with_context(|| format!("Failed to create constraint on {label}.{property}"))?;
            }
            for (label, property) in INDEXES {
                self.store
                    .ensure_index(label, property)
                    .await
                    .with_context(|| format!("Failed to create index on {label}.{property}"))?;
            }
        }

        if self.options.drop_db_on_init {
            info!("Dropping graph before import");
            self.store
                .wipe_all()
                .await
                .context("Failed to wipe the graph")?;
        }
        Ok(())
    }

    async fn import_event(&self, event_id: &str) -> Result<Event> {
        let event = self
            .api
            .event(event_id)
            .await
            .with_context(|| format!("Failed to fetch event {event_id}"))?;

        self.store
            .upsert_event(&event_node(&event))
            .await
            .context("Failed to upsert event")?;

        info!(event_id = %event.id, name = %event.name, "Event imported");
        Ok(event)
    }

    /// The event's group, its location and topics, its organizer, and the
    /// ORGANISE_EVENT link.
    async fn import_event_group(&self, event: &Event) -> Result<GroupNode> {
        let urlname = &event.group.urlname;
        let groups = self
            .api
            .groups_by_urlname(urlname)
            .await
            .with_context(|| format!("Failed to fetch group {urlname}"))?;
        let group = groups
            .first()
            .map(group_node)
            .with_context(|| format!("No group found for urlname {urlname}"))?;

        self.write_group(&group, true).await?;
        self.store
            .link_group_organises_event(group.id, &event.id)
            .await
            .context("Failed to link group to event")?;

        info!(group_id = group.id, name = %group.name, topics = group.topics.len(), "Group imported");
        Ok(group)
    }

    /// Only the event's own group gets an ORGANISE_GROUP edge; for a
    /// member's other groups the organizer is merged as a bare Member.
    async fn write_group(&self, group: &GroupNode, link_organizer: bool) -> Result<()> {
        self.store
            .upsert_group(group)
            .await
            .with_context(|| format!("Failed to upsert group {}", group.id))?;

        let Some(organizer) = &group.organizer else {
            return Ok(());
        };
        let written = if link_organizer {
            self.store.upsert_organizer(group.id, organizer).await
        } else {
            self.store.ensure_member(organizer).await
        };
        written.with_context(|| format!("Failed to upsert organizer of group {}", group.id))
    }

    /// One groups lookup per member, in member order. The client spaces
    /// these calls out; this loop only sequences them.
    async fn collect_member_groups(
        &self,
        members: Vec<Member>,
    ) -> Result<BTreeMap<i64, MemberEntry>> {
        let mut roster = BTreeMap::new();
        for member in members {
            if roster.contains_key(&member.id) {
                continue;
            }
            let groups = self
                .api
                .groups_by_member_id(member.id)
                .await
                .with_context(|| format!("Failed to fetch groups of member {}", member.id))?;
            debug!(member_id = member.id, groups = groups.len(), "Fetched member groups");
            roster.insert(member.id, MemberEntry { member, groups });
        }
        Ok(roster)
    }

    /// Write every member, then each group they belong to and MEMBER_OF.
    /// Returns the number of distinct groups written.
    async fn write_roster(
        &self,
        roster: &BTreeMap<i64, MemberEntry>,
        event_group_id: i64,
    ) -> Result<usize> {
        let mut written: HashSet<i64> = HashSet::from([event_group_id]);

        for entry in roster.values() {
            let member = member_node(&entry.member);
            info!(member_id = member.id, name = %member.name, "Inserting member");
            self.store
                .upsert_member(&member)
                .await
                .with_context(|| format!("Failed to upsert member {}", member.id))?;

            for group in &entry.groups {
                if written.insert(group.id) {
                    self.write_group(&group_node(group), false).await?;
                }
                self.store
                    .link_member_of(member.id, group.id)
                    .await
                    .with_context(|| {
                        format!("Failed to link member {} to group {}", member.id, group.id)
                    })?;
            }
        }
        Ok(written.len())
    }

    async fn import_rsvps(&self, event_id: &str, summary: &mut ImportSummary) -> Result<()> {
        let rsvps = self
            .api
            .rsvps(event_id)
            .await
            .with_context(|| format!("Failed to fetch RSVPs of event {event_id}"))?;
        let partition = partition_rsvps(&rsvps);
        if partition.ignored > 0 {
            debug!(count = partition.ignored, "Ignoring RSVPs that are neither yes nor no");
        }

        info!(yes = partition.yes.len(), no = partition.no.len(), "Inserting RSVPs");
        summary.participants = self
            .store
            .link_rsvps(event_id, RsvpKind::Participate, &partition.yes)
            .await
            .context("Failed to link PARTICIPATE RSVPs")?;
        summary.declined = self
            .store
            .link_rsvps(event_id, RsvpKind::Declined, &partition.no)
            .await
            .context("Failed to link DECLINED RSVPs")?;

        let sent = (partition.yes.len() + partition.no.len()) as u64;
        summary.unmatched_rsvps = sent.saturating_sub(summary.participants + summary.declined);
        if summary.unmatched_rsvps > 0 {
            warn!(
                count = summary.unmatched_rsvps,
                "RSVPs from members not in the graph were not linked"
            );
        }
        Ok(())
    }
}
