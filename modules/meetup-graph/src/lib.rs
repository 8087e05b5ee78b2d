pub mod client;
pub mod reader;
pub mod schema;
pub mod types;
pub mod writer;

#[cfg(feature = "test-utils")]
pub mod testutil;

pub use client::GraphClient;
pub use neo4rs::query;
pub use reader::GraphReader;
pub use schema::SchemaError;
pub use types::{
    normalize_city, normalize_country, EventNode, GroupNode, Location, MemberNode, OrganizerRef,
    RsvpKind, RsvpLink, TopicCount, TopicNode,
};
pub use writer::GraphWriter;
