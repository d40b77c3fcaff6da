use serde::Serialize;

/// Canonical output unit consumed by the chat UI state machine.
///
/// A session emits exactly one `start`…`finish` bracket and exactly one
/// `text-start`…`text-end` pair, keyed by a `message_id`/`part_id` pair that
/// is generated once per session and stable across every chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum LifecycleChunk {
    Start { message_id: String },
    StartStep,
    TextStart { id: String },
    TextDelta { id: String, delta: String },
    TextEnd { id: String },
    FinishStep,
    Finish,
}

impl LifecycleChunk {
    /// True for the chunk that closes the whole session bracket.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finish)
    }
}

/// Why a session's output stream closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// The backend sent a semantic `done` frame.
    Done,
    /// The backend reported an error frame; the lifecycle still closed
    /// cleanly.
    BackendError,
    /// The connection ended without a terminal frame.
    EndOfStream,
    /// No bytes arrived within the inactivity window.
    Inactivity,
    /// The absolute session-duration ceiling fired.
    DurationCap,
    /// The caller's cancellation signal fired.
    Cancelled,
}

impl CloseReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Done => "done",
            Self::BackendError => "backend_error",
            Self::EndOfStream => "end_of_stream",
            Self::Inactivity => "inactivity",
            Self::DurationCap => "duration_cap",
            Self::Cancelled => "cancelled",
        }
    }
}
