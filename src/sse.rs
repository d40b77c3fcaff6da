use crate::events::StudioStreamEvent;

/// Sentinel frame some hosts append between payloads. Not a terminal
/// signal on this wire; the terminal signal is the `done`-typed object.
const DONE_SENTINEL: &str = "[DONE]";

/// Incremental decoder for the backend's `data: <json>` line protocol.
///
/// Feeds of arbitrary byte chunks are accepted; a trailing partial line is
/// carried over to the next feed so lines are never split across reads.
/// Malformed UTF-8 degrades lossily and malformed JSON drops the single
/// line, so one bad frame can never abort a session.
#[derive(Debug, Default)]
pub struct SseLineParser {
    buffer: String,
}

impl SseLineParser {
    /// Feed raw bytes into the parser and drain the events they complete.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<StudioStreamEvent> {
        self.buffer.push_str(&String::from_utf8_lossy(bytes));
        let mut events = Vec::new();

        while let Some(split) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=split).collect();
            if let Some(event) = decode_line(line.trim_end_matches(['\n', '\r'])) {
                events.push(event);
            }
        }

        events
    }

    /// Parse a complete SSE payload string in one shot.
    pub fn parse_frames(input: &str) -> Vec<StudioStreamEvent> {
        let mut parser = Self::default();
        parser.feed(input.as_bytes())
    }

    /// True when no truncated line is pending.
    pub fn is_empty_buffer(&self) -> bool {
        self.buffer.trim().is_empty()
    }
}

fn decode_line(line: &str) -> Option<StudioStreamEvent> {
    let payload = line.strip_prefix("data:")?.trim();
    if payload.is_empty() || payload == DONE_SENTINEL {
        return None;
    }

    match serde_json::from_str(payload) {
        Ok(event) => Some(event),
        Err(error) => {
            tracing::debug!(%error, "dropping undecodable frame");
            None
        }
    }
}
