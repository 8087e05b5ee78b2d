use serde::Serialize;

/// An `Event` node.
#[derive(Debug, Clone, PartialEq)]
pub struct EventNode {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub url: String,
}

/// A `Group` node together with what hangs off it: location and topics.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupNode {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub url: String,
    pub location: Option<Location>,
    pub topics: Vec<TopicNode>,
    pub organizer: Option<OrganizerRef>,
}

/// A `Member` node.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberNode {
    pub id: i64,
    pub name: String,
    pub avatar: Option<String>,
    pub joined_time: Option<i64>,
    pub location: Option<Location>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopicNode {
    pub id: i64,
    pub name: String,
}

/// Minimal member identity for a group organizer.
#[derive(Debug, Clone, PartialEq)]
pub struct OrganizerRef {
    pub member_id: i64,
    pub name: String,
}

/// Normalized City/Country merge keys. Only built when both are present.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    pub city: String,
    pub country: String,
}

impl Location {
    /// Normalize raw API values. Returns `None` if either is missing or blank.
    pub fn from_raw(city: Option<&str>, country: Option<&str>) -> Option<Self> {
        Some(Self {
            city: normalize_city(city?)?,
            country: normalize_country(country?)?,
        })
    }
}

/// Which relationship an RSVP becomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RsvpKind {
    Participate,
    Declined,
}

impl RsvpKind {
    pub fn rel_type(self) -> &'static str {
        match self {
            RsvpKind::Participate => "PARTICIPATE",
            RsvpKind::Declined => "DECLINED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RsvpLink {
    pub rsvp_id: i64,
    pub member_id: i64,
}

/// One row of the topic popularity aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicCount {
    pub topic: String,
    pub count: i64,
}

/// Upper-case the first character, leave the rest alone ("london" -> "London").
pub fn normalize_city(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let mut chars = trimmed.chars();
    let first = chars.next()?;
    Some(first.to_uppercase().chain(chars).collect())
}

/// Country codes are stored upper-case ("gb" -> "GB").
pub fn normalize_country(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_uppercase())
}
