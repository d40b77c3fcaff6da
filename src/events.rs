use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Backend event decoded from one `data:` frame, after normalization.
///
/// Frames with an unrecognized `type` (or no JSON at all) never reach this
/// enum; the SSE parser drops them without touching session state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StudioStreamEvent {
    /// Keep-alive. Receiving any bytes already resets the inactivity timer,
    /// so this carries no other effect.
    Heartbeat,
    /// Cumulative whole-message snapshot, not a token delta.
    Partial { object: MessageSnapshot },
    Done {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        object: Option<MessageSnapshot>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        usage: Option<TokenUsage>,
    },
    Error {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        object: Option<MessageSnapshot>,
    },
    FileOperation(FileOperation),
    BuildStatus(BuildStatus),
}

/// Whole-object snapshot carried by `partial` (and terminal) frames.
///
/// `message` normally grows by prefix from one snapshot to the next;
/// violations are tolerated downstream, never rejected here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MessageSnapshot {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_responses: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase_output: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase_complete: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

/// Pass-through file mutation announced by a builder session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileOperation {
    pub op: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Pass-through build progress announced by a builder session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildStatus {
    pub step: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files_completed: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files_total: Option<u32>,
}

/// Token accounting reported by the terminal frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TokenUsage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<u64>,
}

/// Side-channel projection of a snapshot: everything except the message
/// text, plus usage when the terminal frame reported it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StructuredData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_responses: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase_output: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase_complete: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

impl StructuredData {
    pub fn from_snapshot(snapshot: &MessageSnapshot) -> Self {
        Self {
            suggested_responses: snapshot.suggested_responses.clone(),
            conversation_title: snapshot.conversation_title.clone(),
            phase_output: snapshot.phase_output.clone(),
            phase_complete: snapshot.phase_complete,
            metadata: snapshot.metadata.clone(),
            error: None,
            usage: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.suggested_responses.is_none()
            && self.conversation_title.is_none()
            && self.phase_output.is_none()
            && self.phase_complete.is_none()
            && self.metadata.is_none()
            && self.error.is_none()
            && self.usage.is_none()
    }

    /// Field-by-field merge: `self` wins, `fallback` fills fields the
    /// terminal payload stripped for size.
    pub fn merged_over(mut self, fallback: Option<&StructuredData>) -> Self {
        let Some(fallback) = fallback else {
            return self;
        };
        if self.suggested_responses.is_none() {
            self.suggested_responses = fallback.suggested_responses.clone();
        }
        if self.conversation_title.is_none() {
            self.conversation_title = fallback.conversation_title.clone();
        }
        if self.phase_output.is_none() {
            self.phase_output = fallback.phase_output.clone();
        }
        if self.phase_complete.is_none() {
            self.phase_complete = fallback.phase_complete;
        }
        if self.metadata.is_none() {
            self.metadata = fallback.metadata.clone();
        }
        if self.usage.is_none() {
            self.usage = fallback.usage.clone();
        }
        self
    }
}
