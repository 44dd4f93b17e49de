//! # tlab-cli -- Command-Line Front End
//!
//! Provides the `tlab` command, a terminal client for the booking API
//! built on [`tlab_client`].
//!
//! ## Subcommands
//!
//! - `tlab login` / `register` / `logout` / `whoami` / `enrollments`
//! - `tlab workshops` / `enroll` / `groups` / `activities` / `venues` /
//!   `performances`
//! - `tlab feedback`
//!
//! ## Session file
//!
//! The session is kept in a JSON file so consecutive invocations share a
//! login. Location, first match wins: `--session-file`,
//! `$TLAB_SESSION_FILE`, `<config dir>/tlab29/session.json`.
//!
//! ## Exit codes
//!
//! `0` success, `1` any failure, `2` the backend rejected the session.

pub mod account;
pub mod catalog;
pub mod contact;
pub mod output;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use tlab_client::clock::SystemClock;
use tlab_client::navigator::TracingNavigator;
use tlab_client::storage::FileStorage;
use tlab_client::{ApiConfig, ApiError, LebensClient, SessionStore};

/// Exit code when the backend answered 401 and the session was dropped.
pub const EXIT_UNAUTHORIZED: u8 = 2;

/// Everything a subcommand needs.
#[derive(Debug, Clone)]
pub struct Context {
    pub client: LebensClient,
    /// Print raw JSON instead of one-line summaries.
    pub json: bool,
}

impl Context {
    pub fn new(api_url: Option<&str>, session_file: &Path, json: bool) -> Result<Self> {
        Ok(Self {
            client: build_client(api_url, session_file)?,
            json,
        })
    }
}

/// Where the session file lives when none is given explicitly.
pub fn default_session_file() -> Result<PathBuf> {
    let base = dirs::config_dir().context("no configuration directory on this platform")?;
    Ok(base.join("tlab29").join("session.json"))
}

/// `explicit` if given (flag or environment, resolved by clap), else the
/// platform default.
pub fn resolve_session_file(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => default_session_file(),
    }
}

pub fn build_client(api_url: Option<&str>, session_file: &Path) -> Result<LebensClient> {
    let config = match api_url {
        Some(url) => ApiConfig::with_base_url(url),
        None => ApiConfig::from_env(),
    }
    .context("invalid API configuration")?;
    tracing::debug!(base_url = %config.base_url, session_file = %session_file.display(), "client configured");

    let session = SessionStore::new(
        Arc::new(FileStorage::new(session_file)),
        Arc::new(SystemClock),
    );
    LebensClient::new(config, session, Arc::new(TracingNavigator)).context("failed to build HTTP client")
}

/// Exit code for a failed command.
pub fn exit_code_for(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<ApiError>() {
        Some(api) if api.is_unauthorized() => EXIT_UNAUTHORIZED,
        _ => 1,
    }
}
