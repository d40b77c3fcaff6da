use std::time::Duration;

/// Inactivity window shared by both session kinds.
pub const DEFAULT_INACTIVITY_TIMEOUT: Duration = Duration::from_secs(60);
/// Absolute duration ceiling for ordinary chat sessions.
pub const STANDARD_SESSION_CAP: Duration = Duration::from_secs(300);
/// Absolute duration ceiling for long-running builder sessions.
pub const BUILDER_SESSION_CAP: Duration = Duration::from_secs(1200);

/// Timer policy for one streaming session.
///
/// Both timers are measured independently of backend behavior: `inactivity`
/// restarts whenever a read yields bytes, `max_duration` never restarts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamTimeouts {
    /// Maximum gap between reads before the session is treated as ended.
    pub inactivity: Duration,
    /// Hard ceiling on total session duration, regardless of activity.
    pub max_duration: Duration,
}

impl StreamTimeouts {
    pub fn new(inactivity: Duration, max_duration: Duration) -> Self {
        Self {
            inactivity,
            max_duration,
        }
    }

    /// Policy for ordinary conversational sessions.
    pub fn standard() -> Self {
        Self::new(DEFAULT_INACTIVITY_TIMEOUT, STANDARD_SESSION_CAP)
    }

    /// Policy for builder sessions, which stream file batches for longer.
    pub fn builder() -> Self {
        Self::new(DEFAULT_INACTIVITY_TIMEOUT, BUILDER_SESSION_CAP)
    }
}

impl Default for StreamTimeouts {
    fn default() -> Self {
        Self::standard()
    }
}
