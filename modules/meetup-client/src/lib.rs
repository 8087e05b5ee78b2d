pub mod error;
pub mod rate_limit;
pub mod types;

pub use error::{MeetupError, Result};
pub use rate_limit::{RateGate, DEFAULT_MEMBER_GROUPS_INTERVAL};
pub use types::{
    Event, EventGroup, Group, Member, Organizer, PageMeta, Photo, ResultPage, Rsvp, RsvpMember,
    RsvpResponse, Topic,
};

use std::time::Duration;

use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

pub const BASE_URL: &str = "https://api.meetup.com";

/// Page size requested from list endpoints. 200 is the v2 maximum.
const PAGE_SIZE: u32 = 200;

/// Key-authenticated client for the Meetup v2 REST API.
///
/// Every call is a plain GET. Nothing is cached, so calling a method twice
/// repeats the requests. List endpoints follow `meta.next` until the last page.
pub struct MeetupClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    member_groups_gate: RateGate,
}

impl MeetupClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: BASE_URL.to_string(),
            member_groups_gate: RateGate::default(),
        }
    }

    /// Point the client at a different API host (staging, local proxy).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Spacing enforced between successive `get_groups_by_member_id` calls.
    pub fn with_member_groups_interval(mut self, interval: Duration) -> Self {
        self.member_groups_gate = RateGate::new(interval);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch one event by id.
    pub async fn get_event(&self, id: &str) -> Result<Event> {
        let url = format!("{}/2/event/{}", self.base_url, id);
        tracing::debug!(event_id = id, "Fetching event");

        let resp = self.authed(self.client.get(&url)).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(MeetupError::NotFound(format!("event {id}")));
        }

        let resp = check_status(resp).await?;
        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Groups matching a URL name. The API returns at most one, wrapped in a list.
    pub async fn get_groups_by_urlname(&self, urlname: &str) -> Result<Vec<Group>> {
        self.get_list("/2/groups", &[("group_urlname", urlname.to_string())])
            .await
    }

    /// Every group a member belongs to. Rate-gated.
    pub async fn get_groups_by_member_id(&self, member_id: i64) -> Result<Vec<Group>> {
        self.member_groups_gate.wait().await;
        self.get_list("/2/groups", &[("member_id", member_id.to_string())])
            .await
    }

    pub async fn get_members(&self, group_id: i64) -> Result<Vec<Member>> {
        self.get_list("/2/members", &[("group_id", group_id.to_string())])
            .await
    }

    pub async fn get_rsvps(&self, event_id: &str) -> Result<Vec<Rsvp>> {
        self.get_list("/2/rsvps", &[("event_id", event_id.to_string())])
            .await
    }

    fn authed(&self, req: RequestBuilder) -> RequestBuilder {
        req.query(&[("key", self.api_key.as_str()), ("sign", "true")])
    }

    /// Fetch every page of a list endpoint.
    async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let url = format!("{}{}", self.base_url, path);
        let first = self
            .authed(self.client.get(&url))
            .query(&[("page", PAGE_SIZE)])
            .query(params);

        let mut page: ResultPage<T> = self.fetch_page(first).await?;
        let mut items = Vec::new();
        let mut pages = 1usize;

        loop {
            // meta.next already carries the key and the first request's filters.
            let next = page.next_url().map(str::to_string);
            items.extend(page.results);

            let Some(next) = next else { break };
            pages += 1;
            page = self.fetch_page(self.client.get(&next)).await?;
        }

        tracing::debug!(path, pages, count = items.len(), "Fetched list");
        Ok(items)
    }

    async fn fetch_page<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<ResultPage<T>> {
        let resp = check_status(req.send().await?).await?;
        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

async fn check_status(resp: Response) -> Result<Response> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(MeetupError::Api {
            status: status.as_u16(),
            message: body,
        });
    }
    Ok(resp)
}
