use std::path::PathBuf;

use traxlio_db::StorageScope;
use traxlio_remote::{RemoteConfig, Session};

pub const DEFAULT_DB_PATH: &str = "traxlio.db";
pub const DEFAULT_SHARE_BASE_URL: &str = "http://localhost:3000";

/// Runtime settings read from the environment (after `.env` is loaded).
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub db_path: PathBuf,
    /// Keep everything in memory for this run only.
    pub demo_mode: bool,
    pub remote: RemoteConfig,
    pub session: Option<Session>,
    pub share_base_url: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let session = match (non_empty("TRAXLIO_USER_ID"), non_empty("TRAXLIO_ACCESS_TOKEN")) {
            (Some(user_id), Some(access_token)) => Some(Session {
                user_id,
                access_token,
            }),
            _ => None,
        };

        Self {
            db_path: non_empty("TRAXLIO_DB_PATH")
                .unwrap_or_else(|| DEFAULT_DB_PATH.into())
                .into(),
            demo_mode: non_empty("TRAXLIO_DEMO_MODE")
                .is_some_and(|v| matches!(v.trim(), "true" | "1" | "yes")),
            remote: RemoteConfig::new(
                non_empty("TRAXLIO_REMOTE_URL").unwrap_or_default(),
                non_empty("TRAXLIO_REMOTE_ANON_KEY").unwrap_or_default(),
            ),
            session,
            share_base_url: non_empty("TRAXLIO_SHARE_BASE_URL")
                .unwrap_or_else(|| DEFAULT_SHARE_BASE_URL.into()),
        }
    }

    pub fn scope(&self) -> StorageScope {
        StorageScope::from_demo_flag(self.demo_mode, self.db_path.clone())
    }
}
