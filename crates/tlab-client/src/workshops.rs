//! Typed client for workshops and enrollment into them.
//!
//! | Method | Path                         | Operation             |
//! |--------|------------------------------|-----------------------|
//! | GET    | `/workshops`                 | List (`upcoming`, `q`) |
//! | GET    | `/workshops/{id}`            | Get by ID             |
//! | POST   | `/workshops`                 | Create                |
//! | PUT    | `/workshops/{id}`            | Update                |
//! | DELETE | `/workshops/{id}`            | Delete                |
//! | POST   | `/workshops/{id}/enroll`     | Enroll current user   |

use chrono::{NaiveDate, NaiveDateTime};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::fetch::{path_with_query, FetchClient};
use crate::normalize::decode_list;

/// Workshop as returned by list and detail endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workshop {
    pub id: i64,
    #[serde(default, alias = "workshopName")]
    pub title: String,
    #[serde(default, alias = "description")]
    pub short_description: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub max_participants: Option<u32>,
    #[serde(default)]
    pub teacher_id: Option<i64>,
    #[serde(default)]
    pub venue_id: Option<i64>,
    #[serde(default)]
    pub venue_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl Workshop {
    /// Status shown for the workshop; the backend omits it for drafts.
    pub fn status_label(&self) -> String {
        self.status
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(str::to_uppercase)
            .unwrap_or_else(|| "DRAFT".to_string())
    }

    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            "Untitled"
        } else {
            &self.title
        }
    }
}

/// Create/update payload.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkshopDraft {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venue_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_participants: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl WorkshopDraft {
    fn validate(&self) -> Result<(), ApiError> {
        if self.title.trim().is_empty() {
            return Err(ApiError::Validation("workshop title must not be empty".into()));
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                return Err(ApiError::Validation(
                    "workshop end date must not precede its start date".into(),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EnrollRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    group_id: Option<i64>,
}

/// An enrollment of the current user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub workshop_id: Option<i64>,
    #[serde(default, alias = "workshopName")]
    pub workshop_title: Option<String>,
    #[serde(default)]
    pub group_id: Option<i64>,
    #[serde(default)]
    pub group_title: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

impl Enrollment {
    /// Status after enrolling; the backend confirms immediately when it
    /// reports nothing.
    pub fn status_label(&self) -> &str {
        self.status.as_deref().unwrap_or("CONFIRMED")
    }
}

/// List filter.
#[derive(Debug, Clone, Default)]
pub struct WorkshopQuery {
    pub upcoming: bool,
    pub search: Option<String>,
}

/// Client for workshop endpoints.
#[derive(Debug, Clone)]
pub struct WorkshopClient {
    fetch: FetchClient,
}

impl WorkshopClient {
    pub(crate) fn new(fetch: FetchClient) -> Self {
        Self { fetch }
    }

    /// Calls `GET {base_url}/workshops`.
    pub async fn list(&self, query: &WorkshopQuery) -> Result<Vec<Workshop>, ApiError> {
        let upcoming = if query.upcoming { "true" } else { "" };
        let search = query.search.as_deref().unwrap_or("");
        let path = path_with_query("workshops", &[("upcoming", upcoming), ("q", search)]);
        let payload = self.fetch.get(&path).await?;
        decode_list(payload, &format!("GET {path}"))
    }

    /// Calls `GET {base_url}/workshops/{id}`.
    pub async fn get(&self, id: i64) -> Result<Workshop, ApiError> {
        self.fetch.get_json(&format!("workshops/{id}")).await
    }

    /// Calls `POST {base_url}/workshops`.
    pub async fn create(&self, draft: &WorkshopDraft) -> Result<Workshop, ApiError> {
        draft.validate()?;
        self.fetch.send_json(Method::POST, "workshops", draft).await
    }

    /// Calls `PUT {base_url}/workshops/{id}`.
    pub async fn update(&self, id: i64, draft: &WorkshopDraft) -> Result<Workshop, ApiError> {
        draft.validate()?;
        self.fetch
            .send_json(Method::PUT, &format!("workshops/{id}"), draft)
            .await
    }

    /// Calls `DELETE {base_url}/workshops/{id}`.
    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.fetch
            .send_empty(Method::DELETE, &format!("workshops/{id}"))
            .await
            .map(|_| ())
    }

    /// Enroll the current user, optionally into a specific group.
    ///
    /// Calls `POST {base_url}/workshops/{id}/enroll`.
    pub async fn enroll(
        &self,
        workshop_id: i64,
        group_id: Option<i64>,
    ) -> Result<Enrollment, ApiError> {
        let path = format!("workshops/{workshop_id}/enroll");
        let enrollment: Option<Enrollment> = self
            .fetch
            .send_json(Method::POST, &path, &EnrollRequest { group_id })
            .await?;
        Ok(enrollment.unwrap_or(Enrollment {
            id: None,
            workshop_id: Some(workshop_id),
            workshop_title: None,
            group_id,
            group_title: None,
            status: None,
            created_at: None,
        }))
    }
}
