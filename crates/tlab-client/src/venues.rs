//! Venues (`/venues`).

use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::fetch::FetchClient;
use crate::normalize::decode_list;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Venue {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
}

impl Venue {
    /// `address, postal_code city`, skipping missing parts.
    pub fn one_line_address(&self) -> String {
        let locality = [self.postal_code.as_deref(), self.city.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        [self.address.as_deref().unwrap_or(""), locality.as_str()]
            .into_iter()
            .filter(|s| !s.trim().is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VenueDraft {
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub capacity: Option<u32>,
    pub description: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct VenueClient {
    fetch: FetchClient,
}

impl VenueClient {
    pub(crate) fn new(fetch: FetchClient) -> Self {
        Self { fetch }
    }

    pub async fn list(&self) -> Result<Vec<Venue>, ApiError> {
        decode_list(self.fetch.get("venues").await?, "GET venues")
    }

    pub async fn get(&self, id: i64) -> Result<Venue, ApiError> {
        self.fetch.get_json(&format!("venues/{id}")).await
    }

    pub async fn create(&self, draft: &VenueDraft) -> Result<Venue, ApiError> {
        if draft.name.trim().is_empty() {
            return Err(ApiError::Validation("venue name must not be empty".into()));
        }
        self.fetch.send_json(Method::POST, "venues", draft).await
    }

    pub async fn update(&self, id: i64, draft: &VenueDraft) -> Result<Venue, ApiError> {
        self.fetch
            .send_json(Method::PUT, &format!("venues/{id}"), draft)
            .await
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.fetch
            .send_empty(Method::DELETE, &format!("venues/{id}"))
            .await
            .map(|_| ())
    }
}
