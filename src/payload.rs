use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Canonical request payload for the streaming chat endpoint.
///
/// Identifiers are resolved by the caller before construction; a temporary
/// conversation id that was promoted to a real one must be re-resolved by the
/// caller, not by this transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub conversation_id: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub design_phase: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_type: Option<String>,
    /// Always `"continue"` on the current wire contract.
    #[serde(default = "default_action")]
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
}

fn default_action() -> String {
    "continue".to_string()
}

impl ChatRequest {
    pub fn new(conversation_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            message: message.into(),
            context: None,
            design_phase: None,
            section_id: None,
            agent_type: None,
            action: default_action(),
            project_id: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<Value>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_design_phase(mut self, phase: impl Into<String>) -> Self {
        self.design_phase = Some(phase.into());
        self
    }

    pub fn with_section_id(mut self, section_id: impl Into<String>) -> Self {
        self.section_id = Some(section_id.into());
        self
    }

    pub fn with_agent_type(mut self, agent_type: impl Into<String>) -> Self {
        self.agent_type = Some(agent_type.into());
        self
    }

    pub fn with_project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }
}
