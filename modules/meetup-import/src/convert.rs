//! Mapping from Meetup API records to graph nodes.
//!
//! City and country values are normalized here, so every record reaches the
//! store with the same merge keys regardless of how the API cased them.

use meetup_client::{Event, Group, Member, Rsvp, RsvpResponse};
use meetup_graph::{EventNode, GroupNode, Location, MemberNode, OrganizerRef, RsvpLink, TopicNode};

pub fn event_node(event: &Event) -> EventNode {
    EventNode {
        id: event.id.clone(),
        name: event.name.clone(),
        description: event.description.clone(),
        url: event.event_url.clone(),
    }
}

pub fn group_node(group: &Group) -> GroupNode {
    GroupNode {
        id: group.id,
        name: group.name.clone(),
        description: group.description.clone(),
        url: group.urlname.clone(),
        location: Location::from_raw(group.city.as_deref(), group.country.as_deref()),
        topics: group
            .topics
            .iter()
            .map(|t| TopicNode {
                id: t.id,
                name: t.name.clone(),
            })
            .collect(),
        organizer: group.organizer.as_ref().map(|o| OrganizerRef {
            member_id: o.member_id,
            name: o.name.clone(),
        }),
    }
}

pub fn member_node(member: &Member) -> MemberNode {
    MemberNode {
        id: member.id,
        name: member.name.clone(),
        avatar: member.thumb_link().map(str::to_string),
        joined_time: member.joined,
        location: Location::from_raw(member.city.as_deref(), member.country.as_deref()),
    }
}

/// RSVPs split by response. Anything other than yes/no is counted and skipped.
#[derive(Debug, Default, PartialEq)]
pub struct RsvpPartition {
    pub yes: Vec<RsvpLink>,
    pub no: Vec<RsvpLink>,
    pub ignored: usize,
}

pub fn partition_rsvps(rsvps: &[Rsvp]) -> RsvpPartition {
    let mut partition = RsvpPartition::default();
    for rsvp in rsvps {
        let link = RsvpLink {
            rsvp_id: rsvp.rsvp_id,
            member_id: rsvp.member.member_id,
        };
        match rsvp.response {
            RsvpResponse::Yes => partition.yes.push(link),
            RsvpResponse::No => partition.no.push(link),
            RsvpResponse::Waitlist | RsvpResponse::Other => partition.ignored += 1,
        }
    }
    partition
}
