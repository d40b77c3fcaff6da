//! Transport-only streaming chat client for the Studio conversational
//! backend.
//!
//! This crate owns one concern: it sends a single chat POST, consumes the
//! backend's custom SSE stream of whole-object snapshots, and re-exposes it
//! as a canonical, strictly ordered lifecycle-chunk sequence
//! (`start` → `start-step` → `text-start` → `text-delta`* → `text-end` →
//! `finish-step` → `finish`). It survives silent backends, truncated
//! streams, malformed frames, and absolute-duration limits; structured
//! payloads (suggestions, phase signals, file operations, build progress,
//! usage) travel on separate side channels.
//!
//! It intentionally contains no auth/login code, no persistence, and no UI
//! coupling.

pub mod chunks;
pub mod client;
pub mod config;
pub mod delta;
pub mod error;
pub mod events;
pub mod headers;
pub mod payload;
pub mod session;
pub mod sink;
pub mod sse;
pub mod timeout;
pub mod url;

pub use chunks::{CloseReason, LifecycleChunk};
pub use client::{CancellationSignal, StreamResult, StreamSummary, StudioApiClient};
pub use config::StudioApiConfig;
pub use delta::DeltaCursor;
pub use error::StudioApiError;
pub use events::{
    BuildStatus, FileOperation, MessageSnapshot, StructuredData, StudioStreamEvent, TokenUsage,
};
pub use payload::ChatRequest;
pub use session::{SessionEffects, StreamSession};
pub use sink::{NoopSink, SideChannelSink, SinkError};
pub use sse::SseLineParser;
pub use timeout::StreamTimeouts;
pub use url::normalize_chat_url;
