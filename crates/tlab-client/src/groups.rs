//! Course groups: scheduled slots of a workshop or activity.

use chrono::NaiveDateTime;
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::fetch::{path_with_query, FetchClient};
use crate::normalize::{decode_list, first_non_blank};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
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
    pub start_date_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub end_date_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(default)]
    pub enrolled_count: Option<u32>,
    #[serde(default)]
    pub workshop_id: Option<i64>,
    #[serde(default)]
    pub workshop_title: Option<String>,
    #[serde(default)]
    pub activity_id: Option<i64>,
    #[serde(default)]
    pub teacher_id: Option<i64>,
    #[serde(default)]
    pub active: bool,
}

impl Group {
    pub fn display_title(&self) -> String {
        first_non_blank(&[
            self.name.as_deref(),
            self.title_en.as_deref(),
            self.title_de.as_deref(),
            self.title_ua.as_deref(),
        ])
        .map(str::to_string)
        .unwrap_or_else(|| format!("Group #{}", self.id))
    }

    /// Remaining places, when the group has a capacity.
    pub fn free_places(&self) -> Option<u32> {
        self.capacity
            .map(|cap| cap.saturating_sub(self.enrolled_count.unwrap_or(0)))
    }
}

/// Reference to another entity by ID, as the group endpoints expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdRef {
    pub id: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupDraft {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date_time: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date_time: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workshop: Option<IdRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity: Option<IdRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teacher: Option<IdRef>,
}

/// Client for `/groups`.
#[derive(Debug, Clone)]
pub struct GroupClient {
    fetch: FetchClient,
}

impl GroupClient {
    pub(crate) fn new(fetch: FetchClient) -> Self {
        Self { fetch }
    }

    /// Calls `GET {base_url}/groups[?workshopId=]`.
    pub async fn list(&self, workshop_id: Option<i64>) -> Result<Vec<Group>, ApiError> {
        let workshop = workshop_id.map(|id| id.to_string()).unwrap_or_default();
        let path = path_with_query("groups", &[("workshopId", &workshop)]);
        decode_list(self.fetch.get(&path).await?, &format!("GET {path}"))
    }

    /// Calls `GET {base_url}/groups/activity/{id}`.
    pub async fn by_activity(&self, activity_id: i64) -> Result<Vec<Group>, ApiError> {
        let path = format!("groups/activity/{activity_id}");
        decode_list(self.fetch.get(&path).await?, &format!("GET {path}"))
    }

    /// Calls `GET {base_url}/groups/teacher/{id}`.
    pub async fn by_teacher(&self, teacher_id: i64) -> Result<Vec<Group>, ApiError> {
        let path = format!("groups/teacher/{teacher_id}");
        decode_list(self.fetch.get(&path).await?, &format!("GET {path}"))
    }

    pub async fn get(&self, id: i64) -> Result<Group, ApiError> {
        self.fetch.get_json(&format!("groups/{id}")).await
    }

    pub async fn create(&self, draft: &GroupDraft) -> Result<Group, ApiError> {
        if draft.name.trim().is_empty() {
            return Err(ApiError::Validation("group name must not be empty".into()));
        }
        self.fetch.send_json(Method::POST, "groups", draft).await
    }

    pub async fn update(&self, id: i64, draft: &GroupDraft) -> Result<Group, ApiError> {
        self.fetch
            .send_json(Method::PUT, &format!("groups/{id}"), draft)
            .await
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.fetch
            .send_empty(Method::DELETE, &format!("groups/{id}"))
            .await
            .map(|_| ())
    }
}
