use serde::Deserialize;

// --- Paging envelope ---

/// Envelope returned by every v2 list endpoint.
///
/// The records below model only the fields the import reads; serde skips
/// the rest of the payload.
#[derive(Debug, Clone, Deserialize)]
pub struct ResultPage<T> {
    pub results: Vec<T>,
    #[serde(default)]
    pub meta: Option<PageMeta>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageMeta {
    /// Fully qualified URL of the next page. Empty on the last page.
    #[serde(default)]
    pub next: String,
}

impl<T> ResultPage<T> {
    /// The next page URL, if the API reported one.
    pub fn next_url(&self) -> Option<&str> {
        self.meta
            .as_ref()
            .map(|m| m.next.trim())
            .filter(|next| !next.is_empty())
    }
}

// --- Events ---

/// A single event from `/2/event/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub event_url: String,
    pub group: EventGroup,
}

/// The group summary embedded in an event.
#[derive(Debug, Clone, Deserialize)]
pub struct EventGroup {
    pub urlname: String,
}

// --- Groups ---

#[derive(Debug, Clone, Deserialize)]
pub struct Group {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub urlname: String,
    #[serde(default)]
    pub city: Option<String>,
    /// Two-letter country code, usually lower case ("gb").
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub topics: Vec<Topic>,
    #[serde(default)]
    pub organizer: Option<Organizer>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Topic {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Organizer {
    pub member_id: i64,
    pub name: String,
}

// --- Members ---

#[derive(Debug, Clone, Deserialize)]
pub struct Member {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    /// Milliseconds since the epoch.
    #[serde(default)]
    pub joined: Option<i64>,
    #[serde(default)]
    pub photo: Option<Photo>,
}

impl Member {
    pub fn thumb_link(&self) -> Option<&str> {
        self.photo.as_ref().and_then(|p| p.thumb_link.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Photo {
    #[serde(default)]
    pub thumb_link: Option<String>,
}

// --- RSVPs ---

#[derive(Debug, Clone, Deserialize)]
pub struct Rsvp {
    pub rsvp_id: i64,
    pub response: RsvpResponse,
    pub member: RsvpMember,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RsvpResponse {
    Yes,
    No,
    Waitlist,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RsvpMember {
    pub member_id: i64,
}
