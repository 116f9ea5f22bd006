/// Value shipped in sample environment files; treated as "not configured".
pub const PLACEHOLDER_URL: &str = "your-project-url";

/// Connection settings for the hosted backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteConfig {
    pub url: String,
    pub anon_key: String,
}

impl RemoteConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            anon_key: anon_key.into(),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty()
            && !self.anon_key.trim().is_empty()
            && self.url.trim() != PLACEHOLDER_URL
    }
}

/// An authenticated user of the hosted backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub access_token: String,
}
