//! Activity catalogue (`/activities`).

use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::fetch::{path_with_query, FetchClient};
use crate::normalize::{decode_list, first_non_blank};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub title_de: Option<String>,
    #[serde(default)]
    pub title_en: Option<String>,
    #[serde(default)]
    pub title_ua: Option<String>,
    #[serde(default)]
    pub description_de: Option<String>,
    #[serde(default)]
    pub description_en: Option<String>,
    #[serde(default)]
    pub description_ua: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub active: bool,
}

impl Activity {
    pub fn display_title(&self) -> &str {
        first_non_blank(&[
            self.title_en.as_deref(),
            self.title_de.as_deref(),
            self.name.as_deref(),
            self.title_ua.as_deref(),
        ])
        .unwrap_or("Activity")
    }

    pub fn description(&self) -> Option<&str> {
        first_non_blank(&[
            self.description_en.as_deref(),
            self.description_de.as_deref(),
            self.description_ua.as_deref(),
        ])
    }
}

/// Optional list filters. Blank fields are not sent.
#[derive(Debug, Clone, Default)]
pub struct ActivityFilter {
    pub kind: Option<String>,
    pub age_group: Option<String>,
    pub day: Option<String>,
}

impl ActivityFilter {
    fn path(&self) -> String {
        path_with_query(
            "activities",
            &[
                ("type", self.kind.as_deref().unwrap_or("")),
                ("ageGroup", self.age_group.as_deref().unwrap_or("")),
                ("day", self.day.as_deref().unwrap_or("")),
            ],
        )
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDraft {
    pub title_de: String,
    pub title_en: String,
    pub title_ua: String,
    pub description_de: Option<String>,
    pub description_en: Option<String>,
    pub description_ua: Option<String>,
    pub price: f64,
    pub duration_minutes: u32,
    pub active: bool,
}

#[derive(Debug, Clone)]
pub struct ActivityClient {
    fetch: FetchClient,
}

impl ActivityClient {
    pub(crate) fn new(fetch: FetchClient) -> Self {
        Self { fetch }
    }

    /// Calls `GET {base_url}/activities` with the filter's query parameters.
    pub async fn list(&self, filter: &ActivityFilter) -> Result<Vec<Activity>, ApiError> {
        let path = filter.path();
        decode_list(self.fetch.get(&path).await?, &format!("GET {path}"))
    }

    pub async fn get(&self, id: i64) -> Result<Activity, ApiError> {
        self.fetch.get_json(&format!("activities/{id}")).await
    }

    pub async fn create(&self, draft: &ActivityDraft) -> Result<Activity, ApiError> {
        self.fetch.send_json(Method::POST, "activities", draft).await
    }

    pub async fn update(&self, id: i64, draft: &ActivityDraft) -> Result<Activity, ApiError> {
        self.fetch
            .send_json(Method::PUT, &format!("activities/{id}"), draft)
            .await
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.fetch
            .send_empty(Method::DELETE, &format!("activities/{id}"))
            .await
            .map(|_| ())
    }
}
