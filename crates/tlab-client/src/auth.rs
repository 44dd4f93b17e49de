//! # Login, Registration, Logout
//!
//! Calls `POST /auth/login` and `POST /auth/register`, validates form input
//! before anything goes over the wire, and records the issued token in the
//! [`SessionStore`](crate::session::SessionStore).
//!
//! ## Token lifetime
//!
//! The backend reports `expiresIn` in **seconds**. When the field is
//! missing the session is given one day ([`DEFAULT_EXPIRES_IN_SECS`]).
//!
//! ## 401 on login
//!
//! A 401 from the login or register endpoint means the submitted
//! credentials were rejected. It is reported as a normal
//! [`ApiError::Status`] and does not trigger the session-expiry redirect.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::fetch::FetchClient;
use crate::navigator::LOGIN_PAGE;
use crate::session::UserSummary;

/// Session lifetime assumed when the backend omits `expiresIn`.
pub const DEFAULT_EXPIRES_IN_SECS: u64 = 86_400;

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 6;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
});

// -- Roles --------------------------------------------------------------------

/// Account role as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    User,
    Teacher,
    Admin,
    BusinessOwner,
    /// Roles introduced by the backend after this client was built.
    #[serde(other)]
    Unknown,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Teacher => "TEACHER",
            Role::Admin => "ADMIN",
            Role::BusinessOwner => "BUSINESS_OWNER",
            Role::Unknown => "UNKNOWN",
        }
    }

    /// Page a user of this role lands on after login.
    pub fn landing_page(&self) -> &'static str {
        match self {
            Role::Admin => "/pages/admin/dashboard.html",
            Role::Teacher => "/pages/teacher/dashboard.html",
            _ => "/pages/dashboard/dashboard.html",
        }
    }

    /// Whether the role may use the management dashboard.
    pub fn can_manage(&self) -> bool {
        matches!(self, Role::Admin | Role::Teacher | Role::BusinessOwner)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USER" => Ok(Role::User),
            "TEACHER" => Ok(Role::Teacher),
            "ADMIN" => Ok(Role::Admin),
            "BUSINESS_OWNER" => Ok(Role::BusinessOwner),
            other => Err(ApiError::Validation(format!("unknown role: {other}"))),
        }
    }
}

// -- Wire types ---------------------------------------------------------------

#[derive(Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// Login/registration response.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    /// Token lifetime in seconds.
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
}

impl std::fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginResponse")
            .field("token", &"[REDACTED]")
            .field("expires_in", &self.expires_in)
            .field("id", &self.id)
            .field("email", &self.email)
            .field("role", &self.role)
            .finish()
    }
}

impl LoginResponse {
    pub fn user_summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            role: self.role,
        }
    }

    pub fn expires_in_secs(&self) -> u64 {
        self.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS)
    }

    pub fn landing_page(&self) -> &'static str {
        self.role.unwrap_or(Role::User).landing_page()
    }
}

// -- Validation ---------------------------------------------------------------

pub fn validate_email(email: &str) -> Result<(), ApiError> {
    if EMAIL_RE.is_match(email.trim()) {
        Ok(())
    } else {
        Err(ApiError::Validation("invalid email address".into()))
    }
}

/// Registration form as entered by the user.
#[derive(Clone, Default)]
pub struct RegistrationForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub accepted_terms: bool,
    pub accepted_privacy: bool,
}

impl std::fmt::Debug for RegistrationForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationForm")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("accepted_terms", &self.accepted_terms)
            .field("accepted_privacy", &self.accepted_privacy)
            .finish()
    }
}

impl RegistrationForm {
    pub fn validate(&self) -> Result<(), ApiError> {
        if !self.accepted_terms || !self.accepted_privacy {
            return Err(ApiError::Validation(
                "terms and privacy policy must be accepted".into(),
            ));
        }
        if self.first_name.trim().is_empty() || self.last_name.trim().is_empty() {
            return Err(ApiError::Validation("first and last name are required".into()));
        }
        validate_email(&self.email)?;
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ApiError::Validation(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        if self.password != self.confirm_password {
            return Err(ApiError::Validation("passwords do not match".into()));
        }
        Ok(())
    }
}

// -- Client -------------------------------------------------------------------

/// Authentication flows on top of the fetch client.
#[derive(Debug, Clone)]
pub struct AuthClient {
    fetch: FetchClient,
}

impl AuthClient {
    pub(crate) fn new(fetch: FetchClient) -> Self {
        Self { fetch }
    }

    /// Log in and persist the issued session.
    ///
    /// Calls `POST {base_url}/auth/login`.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let email = email.trim();
        validate_email(email)?;
        if password.is_empty() {
            return Err(ApiError::Validation("password is required".into()));
        }
        let resp: LoginResponse = self
            .fetch
            .send_credentials("auth/login", &LoginRequest { email, password })
            .await?;
        self.persist(&resp);
        tracing::info!(user_id = ?resp.id, role = ?resp.role, "logged in");
        Ok(resp)
    }

    /// Register a new account and persist the issued session.
    ///
    /// Calls `POST {base_url}/auth/register`.
    pub async fn register(&self, form: &RegistrationForm) -> Result<LoginResponse, ApiError> {
        form.validate()?;
        let body = RegisterRequest {
            first_name: form.first_name.trim(),
            last_name: form.last_name.trim(),
            email: form.email.trim(),
            password: &form.password,
        };
        let resp: LoginResponse = self.fetch.send_credentials("auth/register", &body).await?;
        self.persist(&resp);
        tracing::info!(user_id = ?resp.id, "registered");
        Ok(resp)
    }

    /// Drop the session and send the user to the login page.
    pub fn logout(&self) {
        self.fetch.session().clear();
        self.fetch.navigator().navigate(LOGIN_PAGE);
    }

    /// Landing page for an already-live session, if there is one.
    ///
    /// A live session without a readable user summary is cleared, since
    /// there is no role to route by.
    pub fn resume(&self) -> Option<&'static str> {
        let session = self.fetch.session();
        if !session.is_live() {
            return None;
        }
        match session.user() {
            Some(user) => Some(user.role.unwrap_or(Role::User).landing_page()),
            None => {
                session.clear();
                None
            }
        }
    }

    fn persist(&self, resp: &LoginResponse) {
        let user = resp.user_summary();
        self.fetch
            .session()
            .persist(&resp.token, resp.expires_in_secs(), Some(&user));
    }
}
