//! Contact/feedback form submission (`POST /feedbacks`).

use serde::{Deserialize, Serialize};

use crate::auth::validate_email;
use crate::error::ApiError;
use crate::fetch::FetchClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackType {
    #[default]
    General,
    Bug,
    Suggestion,
    Praise,
}

impl std::str::FromStr for FeedbackType {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "general" => Ok(Self::General),
            "bug" => Ok(Self::Bug),
            "suggestion" => Ok(Self::Suggestion),
            "praise" => Ok(Self::Praise),
            other => Err(ApiError::Validation(format!("unknown feedback type: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackForm {
    pub feedback_type: FeedbackType,
    pub subject: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
}

impl FeedbackForm {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.subject.trim().is_empty() || self.message.trim().is_empty() {
            return Err(ApiError::Validation("subject and message are required".into()));
        }
        if let Some(email) = self.email.as_deref().filter(|e| !e.trim().is_empty()) {
            validate_email(email)?;
        }
        if let Some(rating) = self.rating {
            if !(1..=5).contains(&rating) {
                return Err(ApiError::Validation("rating must be between 1 and 5".into()));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub rating: Option<u8>,
}

#[derive(Debug, Clone)]
pub struct FeedbackClient {
    fetch: FetchClient,
}

impl FeedbackClient {
    pub(crate) fn new(fetch: FetchClient) -> Self {
        Self { fetch }
    }

    /// Calls `POST {base_url}/feedbacks`. The backend may answer with an
    /// empty body.
    pub async fn submit(&self, form: &FeedbackForm) -> Result<Option<Feedback>, ApiError> {
        form.validate()?;
        self.fetch
            .send_json(reqwest::Method::POST, "feedbacks", form)
            .await
    }
}
