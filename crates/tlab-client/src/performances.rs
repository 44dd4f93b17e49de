//! Performances (`/performances`).

use chrono::NaiveDateTime;
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::fetch::FetchClient;
use crate::normalize::decode_list;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Performance {
    pub id: i64,
    #[serde(default)]
    pub workshop_id: Option<i64>,
    #[serde(default)]
    pub workshop_title: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "date")]
    pub performance_date: Option<NaiveDateTime>,
    #[serde(default, alias = "venueName")]
    pub venue: Option<String>,
    #[serde(default)]
    pub max_attendees: Option<u32>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceDraft {
    pub workshop_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub performance_date: Option<NaiveDateTime>,
    pub venue: Option<String>,
    pub max_attendees: Option<u32>,
    pub status: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PerformanceClient {
    fetch: FetchClient,
}

impl PerformanceClient {
    pub(crate) fn new(fetch: FetchClient) -> Self {
        Self { fetch }
    }

    /// Calls `GET {base_url}/performances`, soonest first. Undated entries
    /// sort last.
    pub async fn list(&self) -> Result<Vec<Performance>, ApiError> {
        let mut items: Vec<Performance> =
            decode_list(self.fetch.get("performances").await?, "GET performances")?;
        items.sort_by_key(|p| (p.performance_date.is_none(), p.performance_date));
        Ok(items)
    }

    pub async fn get(&self, id: i64) -> Result<Performance, ApiError> {
        self.fetch.get_json(&format!("performances/{id}")).await
    }

    pub async fn create(&self, draft: &PerformanceDraft) -> Result<Performance, ApiError> {
        self.fetch.send_json(Method::POST, "performances", draft).await
    }

    pub async fn update(&self, id: i64, draft: &PerformanceDraft) -> Result<Performance, ApiError> {
        self.fetch
            .send_json(Method::PUT, &format!("performances/{id}"), draft)
            .await
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.fetch
            .send_empty(Method::DELETE, &format!("performances/{id}"))
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn legacy_field_names_are_accepted() {
        let p: Performance = serde_json::from_value(json!({
            "id": 9,
            "title": "Sommerfest",
            "date": "2026-07-04T18:00:00",
            "venueName": "Aula"
        }))
        .unwrap();
        assert_eq!(p.venue.as_deref(), Some("Aula"));
        assert_eq!(
            p.performance_date.map(|d| d.to_string()).as_deref(),
            Some("2026-07-04 18:00:00")
        );
    }
}
