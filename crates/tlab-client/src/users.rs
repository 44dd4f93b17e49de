//! # User Accounts
//!
//! | Method | Path                          | Who      |
//! |--------|-------------------------------|----------|
//! | GET    | `/users/me`                   | any user |
//! | PUT    | `/users/me`                   | any user |
//! | PUT    | `/users/me/password`          | any user |
//! | GET    | `/users/me/enrollments`       | any user |
//! | DELETE | `/enrollments/{id}`           | owner    |
//! | GET    | `/users`                      | admin    |
//! | GET    | `/users/search?query=`        | admin    |
//! | GET    | `/users/role/{role}`          | admin    |
//! | PUT    | `/users/{id}/role?role=`      | admin    |
//! | DELETE | `/users/{id}`                 | admin    |
//! | GET    | `/users/stats/count`          | admin    |
//!
//! Admin endpoints answer 403 for other roles; that surfaces as
//! [`ApiError::Status`] with `status_code() == Some(403)` and leaves the
//! session alone.

use chrono::{NaiveDate, NaiveDateTime};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::auth::Role;
use crate::error::ApiError;
use crate::fetch::{path_with_query, FetchClient};
use crate::normalize::decode_list;
use crate::workshops::Enrollment;

/// Minimum length of a new password.
pub const MIN_NEW_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub email_verified: Option<bool>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

impl UserProfile {
    pub fn full_name(&self) -> String {
        [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Fields a user may change on their own profile. Unset fields are left
/// untouched by the backend.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

impl std::fmt::Debug for PasswordChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PasswordChange([REDACTED])")
    }
}

impl PasswordChange {
    fn validate(&self) -> Result<(), ApiError> {
        if self.current_password.is_empty() {
            return Err(ApiError::Validation("current password is required".into()));
        }
        if self.new_password.chars().count() < MIN_NEW_PASSWORD_LEN {
            return Err(ApiError::Validation(format!(
                "new password must be at least {MIN_NEW_PASSWORD_LEN} characters"
            )));
        }
        if self.new_password == self.current_password {
            return Err(ApiError::Validation(
                "new password must differ from the current one".into(),
            ));
        }
        Ok(())
    }
}

/// Account counts for the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    #[serde(default)]
    pub total_users: u64,
    #[serde(default)]
    pub active_users: u64,
    #[serde(default)]
    pub user_count: u64,
    #[serde(default)]
    pub teacher_count: u64,
    #[serde(default)]
    pub admin_count: u64,
}

#[derive(Debug, Clone)]
pub struct UserClient {
    fetch: FetchClient,
}

impl UserClient {
    pub(crate) fn new(fetch: FetchClient) -> Self {
        Self { fetch }
    }

    pub async fn me(&self) -> Result<UserProfile, ApiError> {
        self.fetch.get_json("users/me").await
    }

    /// Update the own profile and mirror the new name into the session's
    /// user summary.
    pub async fn update_me(&self, update: &ProfileUpdate) -> Result<UserProfile, ApiError> {
        let profile: UserProfile = self.fetch.send_json(Method::PUT, "users/me", update).await?;
        self.fetch
            .session()
            .update_user(profile.first_name.as_deref(), profile.last_name.as_deref());
        Ok(profile)
    }

    pub async fn change_password(&self, change: &PasswordChange) -> Result<(), ApiError> {
        change.validate()?;
        let _: Option<serde_json::Value> = self
            .fetch
            .send_json(Method::PUT, "users/me/password", change)
            .await?;
        Ok(())
    }

    pub async fn my_enrollments(&self) -> Result<Vec<Enrollment>, ApiError> {
        decode_list(
            self.fetch.get("users/me/enrollments").await?,
            "GET users/me/enrollments",
        )
    }

    pub async fn cancel_enrollment(&self, enrollment_id: i64) -> Result<(), ApiError> {
        self.fetch
            .send_empty(Method::DELETE, &format!("enrollments/{enrollment_id}"))
            .await
            .map(|_| ())
    }

    pub async fn list(&self) -> Result<Vec<UserProfile>, ApiError> {
        decode_list(self.fetch.get("users").await?, "GET users")
    }

    pub async fn search(&self, query: &str) -> Result<Vec<UserProfile>, ApiError> {
        let path = path_with_query("users/search", &[("query", query.trim())]);
        decode_list(self.fetch.get(&path).await?, &format!("GET {path}"))
    }

    pub async fn by_role(&self, role: Role) -> Result<Vec<UserProfile>, ApiError> {
        let path = format!("users/role/{role}");
        decode_list(self.fetch.get(&path).await?, &format!("GET {path}"))
    }

    pub async fn get(&self, id: i64) -> Result<UserProfile, ApiError> {
        self.fetch.get_json(&format!("users/{id}")).await
    }

    pub async fn set_role(&self, id: i64, role: Role) -> Result<UserProfile, ApiError> {
        if role == Role::Unknown {
            return Err(ApiError::Validation("cannot assign an unknown role".into()));
        }
        let path = path_with_query(&format!("users/{id}/role"), &[("role", role.as_str())]);
        let payload = self.fetch.send_empty(Method::PUT, &path).await?;
        payload.decode(&format!("PUT {path}"))
    }

    pub async fn deactivate(&self, id: i64) -> Result<(), ApiError> {
        self.fetch
            .send_empty(Method::DELETE, &format!("users/{id}"))
            .await
            .map(|_| ())
    }

    pub async fn stats(&self) -> Result<UserStats, ApiError> {
        self.fetch.get_json("users/stats/count").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn password_change_rules() {
        let ok = PasswordChange {
            current_password: "old-secret".into(),
            new_password: "new-secret".into(),
        };
        assert!(ok.validate().is_ok());

        let short = PasswordChange {
            new_password: "short".into(),
            ..ok.clone()
        };
        assert!(short.validate().is_err());

        let same = PasswordChange {
            new_password: "old-secret".into(),
            ..ok.clone()
        };
        assert!(same.validate().is_err());
        assert!(!format!("{ok:?}").contains("secret"));
    }

    #[test]
    fn profile_update_sends_only_set_fields() {
        let update = ProfileUpdate {
            city: Some("Leipzig".into()),
            ..ProfileUpdate::default()
        };
        assert_eq!(serde_json::to_value(&update).unwrap(), json!({"city": "Leipzig"}));
    }

    #[test]
    fn full_name_joins_present_parts() {
        let p: UserProfile = serde_json::from_value(json!({
            "id": 1, "email": "a@b.com", "firstName": "Anna", "role": "TEACHER"
        }))
        .unwrap();
        assert_eq!(p.full_name(), "Anna");
        assert_eq!(p.role, Some(Role::Teacher));
    }
}
