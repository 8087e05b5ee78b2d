// Test mocks for the importer.
//
// Two mocks matching the two trait boundaries:
// - MockMeetup (MeetupApi): HashMap-based canned API responses plus a call log
// - MockGraph (GraphStore): stateful in-memory graph with MERGE/MATCH semantics
//
// Plus record builders and a small "London" fixture shared by the tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;

use meetup_client::{
    Event, EventGroup, Group, Member, Organizer, Photo, Rsvp, RsvpMember, RsvpResponse, Topic,
};
use meetup_graph::{
    EventNode, GroupNode, Location, MemberNode, OrganizerRef, RsvpKind, RsvpLink, TopicCount,
};

use crate::traits::{GraphStore, MeetupApi};

// ---------------------------------------------------------------------------
// Record builders
// ---------------------------------------------------------------------------

pub const EVENT_ID: &str = "219163343";

pub fn event(id: &str, urlname: &str) -> Event {
    Event {
        id: id.to_string(),
        name: "Graph Night".to_string(),
        description: Some("<p>Talks and pizza</p>".to_string()),
        event_url: format!("http://www.meetup.com/{urlname}/events/{id}/"),
        group: EventGroup {
            urlname: urlname.to_string(),
        },
    }
}

pub fn group(
    id: i64,
    urlname: &str,
    city: &str,
    country: &str,
    topics: &[(i64, &str)],
    organizer_id: i64,
) -> Group {
    Group {
        id,
        name: format!("Group {urlname}"),
        description: Some(format!("All about {urlname}")),
        urlname: urlname.to_string(),
        city: Some(city.to_string()),
        country: Some(country.to_string()),
        topics: topics
            .iter()
            .map(|(id, name)| Topic {
                id: *id,
                name: name.to_string(),
            })
            .collect(),
        organizer: Some(Organizer {
            member_id: organizer_id,
            name: format!("Organizer {organizer_id}"),
        }),
    }
}

pub fn member(id: i64, city: Option<&str>, country: Option<&str>) -> Member {
    Member {
        id,
        name: format!("Member {id}"),
        city: city.map(str::to_string),
        country: country.map(str::to_string),
        joined: Some(1_400_000_000_000 + id),
        photo: Some(Photo {
            thumb_link: Some(format!("http://photos.example/{id}/thumb.jpeg")),
        }),
    }
}

pub fn rsvp(rsvp_id: i64, member_id: i64, response: RsvpResponse) -> Rsvp {
    Rsvp {
        rsvp_id,
        response,
        member: RsvpMember { member_id },
    }
}

/// Event 219163343 organised by group 100 (London). Three members; two of
/// them also belong to group 200 (Berlin). RSVPs: 10 yes, 11 no, 999 yes
/// (never a member), 12 waitlisted.
pub fn london_meetup() -> MockMeetup {
    let london = group(100, "graphdb-london", "london", "gb", &[(1, "NoSQL"), (2, "Graphs")], 1);
    let berlin = group(200, "rust-berlin", "berlin", "DE", &[(3, "Rust"), (2, "Graphs")], 50);

    MockMeetup::new()
        .on_event(event(EVENT_ID, "graphdb-london"))
        .on_group(london.clone())
        .on_members(
            100,
            vec![
                member(10, Some("paris"), Some("fr")),
                member(11, None, Some("us")),
                member(12, Some("london"), Some("gb")),
            ],
        )
        .on_member_groups(10, vec![london.clone(), berlin.clone()])
        .on_member_groups(11, vec![london.clone()])
        .on_member_groups(12, vec![london, berlin])
        .on_rsvps(
            EVENT_ID,
            vec![
                rsvp(1, 10, RsvpResponse::Yes),
                rsvp(2, 11, RsvpResponse::No),
                rsvp(3, 999, RsvpResponse::Yes),
                rsvp(4, 12, RsvpResponse::Waitlist),
            ],
        )
}

// ---------------------------------------------------------------------------
// MockMeetup
// ---------------------------------------------------------------------------

/// Canned API. Unknown events are an error; unknown list lookups return
/// an empty list, as the real API does.
pub struct MockMeetup {
    events: HashMap<String, Event>,
    groups_by_urlname: HashMap<String, Vec<Group>>,
    groups_by_member: HashMap<i64, Vec<Group>>,
    members: HashMap<i64, Vec<Member>>,
    rsvps: HashMap<String, Vec<Rsvp>>,
    calls: Mutex<Vec<String>>,
}

impl MockMeetup {
    pub fn new() -> Self {
        Self {
            events: HashMap::new(),
            groups_by_urlname: HashMap::new(),
            groups_by_member: HashMap::new(),
            members: HashMap::new(),
            rsvps: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn on_event(mut self, event: Event) -> Self {
        self.events.insert(event.id.clone(), event);
        self
    }

    pub fn on_group(mut self, group: Group) -> Self {
        self.groups_by_urlname
            .entry(group.urlname.clone())
            .or_default()
            .push(group);
        self
    }

    pub fn on_member_groups(mut self, member_id: i64, groups: Vec<Group>) -> Self {
        self.groups_by_member.insert(member_id, groups);
        self
    }

    pub fn on_members(mut self, group_id: i64, members: Vec<Member>) -> Self {
        self.members.insert(group_id, members);
        self
    }

    pub fn on_rsvps(mut self, event_id: &str, rsvps: Vec<Rsvp>) -> Self {
        self.rsvps.insert(event_id.to_string(), rsvps);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl MeetupApi for MockMeetup {
    async fn event(&self, id: &str) -> Result<Event> {
        self.record(format!("event {id}"));
        match self.events.get(id) {
            Some(event) => Ok(event.clone()),
            None => bail!("Not found: event {id}"),
        }
    }

    async fn groups_by_urlname(&self, urlname: &str) -> Result<Vec<Group>> {
        self.record(format!("groups_by_urlname {urlname}"));
        Ok(self.groups_by_urlname.get(urlname).cloned().unwrap_or_default())
    }

    async fn groups_by_member_id(&self, member_id: i64) -> Result<Vec<Group>> {
        self.record(format!("groups_by_member_id {member_id}"));
        Ok(self.groups_by_member.get(&member_id).cloned().unwrap_or_default())
    }

    async fn members(&self, group_id: i64) -> Result<Vec<Member>> {
        self.record(format!("members {group_id}"));
        Ok(self.members.get(&group_id).cloned().unwrap_or_default())
    }

    async fn rsvps(&self, event_id: &str) -> Result<Vec<Rsvp>> {
        self.record(format!("rsvps {event_id}"));
        Ok(self.rsvps.get(event_id).cloned().unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// MockGraph
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rel {
    pub kind: &'static str,
    pub from: String,
    pub to: String,
    pub rsvp_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberProps {
    pub name: String,
    pub avatar: Option<String>,
    pub joined_time: Option<i64>,
}

#[derive(Default)]
struct GraphState {
    ops: Vec<String>,
    events: HashMap<String, EventNode>,
    groups: HashMap<i64, (String, Option<String>, String)>,
    members: HashMap<i64, MemberProps>,
    topics: HashMap<i64, String>,
    cities: HashSet<String>,
    countries: HashSet<String>,
    rels: HashSet<Rel>,
}

impl GraphState {
    fn link(&mut self, kind: &'static str, from: String, to: String) {
        self.rels.insert(Rel {
            kind,
            from,
            to,
            rsvp_id: None,
        });
    }

    fn locate(&mut self, from: String, kind: &'static str, location: &Location) {
        self.cities.insert(location.city.clone());
        self.countries.insert(location.country.clone());
        let city = format!("City:{}", location.city);
        self.link(kind, from, city.clone());
        self.link("IN_COUNTRY", city, format!("Country:{}", location.country));
    }
}

/// In-memory graph. Node identity is the natural key, MERGE never
/// duplicates and MATCH-guarded writes are skipped when a node is missing.
pub struct MockGraph {
    state: Mutex<GraphState>,
}

impl MockGraph {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(GraphState::default()),
        }
    }

    /// Every store call, in order, e.g. `"constraint Event.id"`, `"wipe"`.
    pub fn ops(&self) -> Vec<String> {
        self.state.lock().unwrap().ops.clone()
    }

    pub fn node_count(&self, label: &str) -> usize {
        let s = self.state.lock().unwrap();
        match label {
            "Event" => s.events.len(),
            "Group" => s.groups.len(),
            "Member" => s.members.len(),
            "Topic" => s.topics.len(),
            "City" => s.cities.len(),
            "Country" => s.countries.len(),
            other => panic!("unknown label {other}"),
        }
    }

    pub fn total_nodes(&self) -> usize {
        ["Event", "Group", "Member", "Topic", "City", "Country"]
            .iter()
            .map(|label| self.node_count(label))
            .sum()
    }

    pub fn rel_count(&self, kind: &str) -> usize {
        let s = self.state.lock().unwrap();
        s.rels.iter().filter(|r| r.kind == kind).count()
    }

    pub fn total_rels(&self) -> usize {
        self.state.lock().unwrap().rels.len()
    }

    pub fn has_rel(&self, kind: &str, from: &str, to: &str) -> bool {
        let s = self.state.lock().unwrap();
        s.rels
            .iter()
            .any(|r| r.kind == kind && r.from == from && r.to == to)
    }

    pub fn rsvp_rel(&self, kind: &str, member_id: i64, event_id: &str) -> Option<i64> {
        let s = self.state.lock().unwrap();
        let from = format!("Member:{member_id}");
        let to = format!("Event:{event_id}");
        s.rels
            .iter()
            .find(|r| r.kind == kind && r.from == from && r.to == to)
            .and_then(|r| r.rsvp_id)
    }

    pub fn member(&self, id: i64) -> Option<MemberProps> {
        self.state.lock().unwrap().members.get(&id).cloned()
    }

    pub fn topic_name(&self, id: i64) -> Option<String> {
        self.state.lock().unwrap().topics.get(&id).cloned()
    }
}

#[async_trait]
impl GraphStore for MockGraph {
    async fn ensure_constraint(&self, label: &str, property: &str) -> Result<()> {
        let mut s = self.state.lock().unwrap();
        s.ops.push(format!("constraint {label}.{property}"));
        Ok(())
    }

    async fn ensure_index(&self, label: &str, property: &str) -> Result<()> {
        let mut s = self.state.lock().unwrap();
        s.ops.push(format!("index {label}.{property}"));
        Ok(())
    }

    async fn wipe_all(&self) -> Result<()> {
        let mut s = self.state.lock().unwrap();
        let ops = std::mem::take(&mut s.ops);
        *s = GraphState::default();
        s.ops = ops;
        s.ops.push("wipe".to_string());
        Ok(())
    }

    async fn upsert_event(&self, event: &EventNode) -> Result<()> {
        let mut s = self.state.lock().unwrap();
        s.ops.push(format!("upsert_event {}", event.id));
        s.events.insert(event.id.clone(), event.clone());
        Ok(())
    }

    async fn upsert_group(&self, group: &GroupNode) -> Result<()> {
        let mut s = self.state.lock().unwrap();
        s.ops.push(format!("upsert_group {}", group.id));
        s.groups.insert(
            group.id,
            (group.name.clone(), group.description.clone(), group.url.clone()),
        );

        let key = format!("Group:{}", group.id);
        if let Some(location) = &group.location {
            s.locate(key.clone(), "GROUP_IN_CITY", location);
        }
        for topic in &group.topics {
            s.topics.entry(topic.id).or_insert_with(|| topic.name.clone());
            s.link("TAGS_GROUP", format!("Topic:{}", topic.id), key.clone());
        }
        Ok(())
    }

    async fn link_group_organises_event(&self, group_id: i64, event_id: &str) -> Result<()> {
        let mut s = self.state.lock().unwrap();
        s.ops.push(format!("organise_event {group_id} {event_id}"));
        if s.groups.contains_key(&group_id) && s.events.contains_key(event_id) {
            s.link(
                "ORGANISE_EVENT",
                format!("Group:{group_id}"),
                format!("Event:{event_id}"),
            );
        }
        Ok(())
    }

    async fn upsert_organizer(&self, group_id: i64, organizer: &OrganizerRef) -> Result<()> {
        let mut s = self.state.lock().unwrap();
        s.ops.push(format!("upsert_organizer {group_id} {}", organizer.member_id));
        if !s.groups.contains_key(&group_id) {
            return Ok(());
        }
        s.members
            .entry(organizer.member_id)
            .or_insert_with(|| MemberProps {
                name: organizer.name.clone(),
                avatar: None,
                joined_time: None,
            });
        s.link(
            "ORGANISE_GROUP",
            format!("Member:{}", organizer.member_id),
            format!("Group:{group_id}"),
        );
        Ok(())
    }

    async fn ensure_member(&self, organizer: &OrganizerRef) -> Result<()> {
        let mut s = self.state.lock().unwrap();
        s.ops.push(format!("ensure_member {}", organizer.member_id));
        s.members
            .entry(organizer.member_id)
            .or_insert_with(|| MemberProps {
                name: organizer.name.clone(),
                avatar: None,
                joined_time: None,
            });
        Ok(())
    }

    async fn upsert_member(&self, member: &MemberNode) -> Result<()> {
        let mut s = self.state.lock().unwrap();
        s.ops.push(format!("upsert_member {}", member.id));
        s.members.insert(
            member.id,
            MemberProps {
                name: member.name.clone(),
                avatar: member.avatar.clone(),
                joined_time: member.joined_time,
            },
        );
        if let Some(location) = &member.location {
            s.locate(format!("Member:{}", member.id), "LIVES_IN", location);
        }
        Ok(())
    }

    async fn link_member_of(&self, member_id: i64, group_id: i64) -> Result<()> {
        let mut s = self.state.lock().unwrap();
        s.ops.push(format!("member_of {member_id} {group_id}"));
        if s.members.contains_key(&member_id) && s.groups.contains_key(&group_id) {
            s.link(
                "MEMBER_OF",
                format!("Member:{member_id}"),
                format!("Group:{group_id}"),
            );
        }
        Ok(())
    }

    async fn link_rsvps(
        &self,
        event_id: &str,
        kind: RsvpKind,
        rsvps: &[RsvpLink],
    ) -> Result<u64> {
        let mut s = self.state.lock().unwrap();
        s.ops.push(format!("link_rsvps {} {}", kind.rel_type(), rsvps.len()));
        if !s.events.contains_key(event_id) {
            return Ok(0);
        }

        let mut linked = 0;
        for r in rsvps {
            if !s.members.contains_key(&r.member_id) {
                continue;
            }
            s.rels.insert(Rel {
                kind: kind.rel_type(),
                from: format!("Member:{}", r.member_id),
                to: format!("Event:{event_id}"),
                rsvp_id: Some(r.rsvp_id),
            });
            linked += 1;
        }
        Ok(linked)
    }

    async fn topic_popularity(&self, event_id: &str, min_count: i64) -> Result<Vec<TopicCount>> {
        let mut s = self.state.lock().unwrap();
        s.ops.push(format!("topic_popularity {event_id} {min_count}"));

        let event_key = format!("Event:{event_id}");
        let mut counts: HashMap<String, i64> = HashMap::new();
        for participate in s
            .rels
            .iter()
            .filter(|r| r.kind == "PARTICIPATE" && r.to == event_key)
        {
            for member_of in s
                .rels
                .iter()
                .filter(|r| r.kind == "MEMBER_OF" && r.from == participate.from)
            {
                for tag in s
                    .rels
                    .iter()
                    .filter(|r| r.kind == "TAGS_GROUP" && r.to == member_of.to)
                {
                    let topic_id: i64 = tag.from.trim_start_matches("Topic:").parse()?;
                    if let Some(name) = s.topics.get(&topic_id) {
                        *counts.entry(name.clone()).or_default() += 1;
                    }
                }
            }
        }

        let mut topics: Vec<TopicCount> = counts
            .into_iter()
            .filter(|(_, count)| *count > min_count)
            .map(|(topic, count)| TopicCount { topic, count })
            .collect();
        topics.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.topic.cmp(&b.topic)));
        Ok(topics)
    }
}
