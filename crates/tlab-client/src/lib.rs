//! # tlab-client -- Typed Rust client for the Lebens Rhythmus booking API
//!
//! Layers, bottom up:
//!
//! - [`storage`] and [`clock`]: the persistence medium and time source the
//!   session depends on, both injectable.
//! - [`session`]: the [`SessionStore`] holding token, expiry, and user
//!   summary.
//! - [`fetch`]: the [`FetchClient`], the only place that talks HTTP. It
//!   injects the bearer token and turns every response into a
//!   [`Payload`](fetch::Payload) or an [`ApiError`].
//! - [`auth`] and the resource modules: typed calls on top of the fetch
//!   client.
//!
//! ## Path Convention
//!
//! All resource paths are relative to [`ApiConfig::base_url`], which already
//! ends in `/api/v1`. `workshops/7` resolves to
//! `https://api.tlab29.com/api/v1/workshops/7` in production.

pub mod activities;
pub mod auth;
pub mod clock;
pub mod config;
pub mod error;
pub mod feedback;
pub mod fetch;
pub mod groups;
pub mod navigator;
pub mod normalize;
pub mod performances;
pub mod session;
pub mod storage;
pub mod users;
pub mod venues;
pub mod workshops;

use std::sync::Arc;

pub use auth::Role;
pub use config::ApiConfig;
pub use error::{ApiError, NormalizedError};
pub use fetch::{FetchClient, Payload};
pub use navigator::{Navigator, LOGIN_PAGE};
pub use session::{SessionStore, UserSummary};

/// Top-level client. Every sub-client shares one [`FetchClient`], and with
/// it one session and one connection pool.
#[derive(Debug, Clone)]
pub struct LebensClient {
    fetch: FetchClient,
    auth: auth::AuthClient,
    workshops: workshops::WorkshopClient,
    groups: groups::GroupClient,
    activities: activities::ActivityClient,
    venues: venues::VenueClient,
    performances: performances::PerformanceClient,
    users: users::UserClient,
    feedback: feedback::FeedbackClient,
}

impl LebensClient {
    pub fn new(
        config: ApiConfig,
        session: SessionStore,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ApiError> {
        Ok(Self::from_fetch(FetchClient::new(config, session, navigator)?))
    }

    pub fn from_fetch(fetch: FetchClient) -> Self {
        Self {
            auth: auth::AuthClient::new(fetch.clone()),
            workshops: workshops::WorkshopClient::new(fetch.clone()),
            groups: groups::GroupClient::new(fetch.clone()),
            activities: activities::ActivityClient::new(fetch.clone()),
            venues: venues::VenueClient::new(fetch.clone()),
            performances: performances::PerformanceClient::new(fetch.clone()),
            users: users::UserClient::new(fetch.clone()),
            feedback: feedback::FeedbackClient::new(fetch.clone()),
            fetch,
        }
    }

    /// Raw authenticated requests, for endpoints without a typed wrapper.
    pub fn fetch(&self) -> &FetchClient {
        &self.fetch
    }

    pub fn session(&self) -> &SessionStore {
        self.fetch.session()
    }

    pub fn auth(&self) -> &auth::AuthClient {
        &self.auth
    }

    pub fn workshops(&self) -> &workshops::WorkshopClient {
        &self.workshops
    }

    pub fn groups(&self) -> &groups::GroupClient {
        &self.groups
    }

    pub fn activities(&self) -> &activities::ActivityClient {
        &self.activities
    }

    pub fn venues(&self) -> &venues::VenueClient {
        &self.venues
    }

    pub fn performances(&self) -> &performances::PerformanceClient {
        &self.performances
    }

    pub fn users(&self) -> &users::UserClient {
        &self.users
    }

    pub fn feedback(&self) -> &feedback::FeedbackClient {
        &self.feedback
    }
}
