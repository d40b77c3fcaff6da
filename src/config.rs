use std::collections::BTreeMap;

use crate::events::TokenUsage;
use crate::timeout::StreamTimeouts;
use crate::url::DEFAULT_STUDIO_BASE_URL;

/// Transport configuration for Studio chat requests.
///
/// Everything here is resolved once, before the session starts, and treated
/// as immutable for its whole lifetime. In particular the access token comes
/// from the caller's auth layer and is never refreshed or cached by this
/// crate.
#[derive(Debug, Clone)]
pub struct StudioApiConfig {
    /// Bearer token passed to `Authorization`.
    pub access_token: String,
    /// Base URL for the Studio functions host.
    pub base_url: String,
    /// Additional headers merged into request headers.
    pub extra_headers: BTreeMap<String, String>,
    /// Inactivity and absolute-duration timers for the read loop.
    pub timeouts: StreamTimeouts,
    /// Usage attached to the synthetic final payload when the terminal frame
    /// is lost and no usage was observed mid-stream. `None` synthesizes no
    /// usage at all.
    pub lost_terminal_usage: Option<TokenUsage>,
}

impl Default for StudioApiConfig {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            base_url: DEFAULT_STUDIO_BASE_URL.to_string(),
            extra_headers: BTreeMap::new(),
            timeouts: StreamTimeouts::default(),
            lost_terminal_usage: None,
        }
    }
}

impl StudioApiConfig {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeouts(mut self, timeouts: StreamTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn with_lost_terminal_usage(mut self, usage: TokenUsage) -> Self {
        self.lost_terminal_usage = Some(usage);
        self
    }

    pub fn insert_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.insert(key.into(), value.into());
        self
    }

    pub fn with_headers(mut self, headers: impl IntoIterator<Item = (String, String)>) -> Self {
        self.extra_headers.extend(headers);
        self
    }
}
