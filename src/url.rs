/// Default base URL for Studio chat transport requests.
pub const DEFAULT_STUDIO_BASE_URL: &str = "https://api.studio.app/functions/v1";

/// Normalize a base URL to the streaming chat endpoint.
///
/// Normalization rules:
/// 1) keep `/chat-stream` unchanged
/// 2) append `/chat-stream` otherwise
pub fn normalize_chat_url(input: &str) -> String {
    let base = if input.trim().is_empty() {
        DEFAULT_STUDIO_BASE_URL
    } else {
        input.trim()
    };

    let trimmed = base.trim_end_matches('/');
    if trimmed.ends_with("/chat-stream") {
        return trimmed.to_string();
    }
    format!("{trimmed}/chat-stream")
}
