use uuid::Uuid;

use crate::chunks::{CloseReason, LifecycleChunk};
use crate::delta::DeltaCursor;
use crate::events::{
    BuildStatus, FileOperation, MessageSnapshot, StructuredData, StudioStreamEvent, TokenUsage,
};

/// Everything produced by applying one backend event (or one terminal
/// condition) to a session.
///
/// Lifecycle chunks and side-channel payloads travel on separate fields so
/// the caller can route them to separate consumer channels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionEffects {
    pub chunks: Vec<LifecycleChunk>,
    pub structured: Option<StructuredData>,
    pub file_operation: Option<FileOperation>,
    pub build_status: Option<BuildStatus>,
    /// Set exactly once, by whichever path closes the session first.
    pub closed: Option<CloseReason>,
}

/// Per-request lifecycle state machine.
///
/// Owns every mutable bit of one streaming session (started/ended flags,
/// the delta cursor, the cached structured payload) and exposes pure
/// transitions, so the transition table is testable without any networking.
/// Each session is owned by exactly one client invocation; nothing here is
/// shared across sessions.
#[derive(Debug)]
pub struct StreamSession {
    message_id: String,
    part_id: String,
    cursor: DeltaCursor,
    started: bool,
    text_end_emitted: bool,
    terminated: bool,
    last_partial: Option<StructuredData>,
    lost_terminal_usage: Option<TokenUsage>,
}

impl StreamSession {
    pub fn new() -> Self {
        Self {
            message_id: format!("msg_{}", Uuid::new_v4().simple()),
            part_id: format!("part_{}", Uuid::new_v4().simple()),
            cursor: DeltaCursor::default(),
            started: false,
            text_end_emitted: false,
            terminated: false,
            last_partial: None,
            lost_terminal_usage: None,
        }
    }

    /// Usage synthesized into the fallback payload when the terminal frame
    /// is lost and no usage was ever observed. Product policy, not a
    /// structural requirement.
    pub fn with_lost_terminal_usage(mut self, usage: Option<TokenUsage>) -> Self {
        self.lost_terminal_usage = usage;
        self
    }

    pub fn message_id(&self) -> &str {
        &self.message_id
    }

    pub fn part_id(&self) -> &str {
        &self.part_id
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Apply one decoded backend event. Events after termination are
    /// dropped; the consumer contract forbids chunks past `finish`.
    pub fn apply(&mut self, event: StudioStreamEvent) -> SessionEffects {
        if self.terminated {
            return SessionEffects::default();
        }

        match event {
            StudioStreamEvent::Heartbeat => SessionEffects::default(),
            StudioStreamEvent::Partial { object } => self.on_partial(object),
            StudioStreamEvent::Done { object, usage } => self.on_done(object, usage),
            StudioStreamEvent::Error { message, object } => self.on_error(message, object),
            StudioStreamEvent::FileOperation(op) => SessionEffects {
                file_operation: Some(op),
                ..SessionEffects::default()
            },
            StudioStreamEvent::BuildStatus(status) => SessionEffects {
                build_status: Some(status),
                ..SessionEffects::default()
            },
        }
    }

    /// Implicit terminal: end-of-stream, inactivity, or the duration cap,
    /// with no `done`/`error` frame observed. Recovers the cached partial
    /// payload so phase signals are not lost to a truncated connection.
    pub fn finish_interrupted(&mut self, reason: CloseReason) -> SessionEffects {
        if self.terminated {
            return SessionEffects::default();
        }

        let mut effects = SessionEffects::default();
        let mut recovered = self.last_partial.clone().unwrap_or_default();
        if recovered.usage.is_none() {
            recovered.usage = self.lost_terminal_usage.clone();
        }
        if !recovered.is_empty() {
            effects.structured = Some(recovered);
        }
        self.close(&mut effects, reason);
        effects
    }

    /// Forced clean termination with no recovery payload: caller cancel,
    /// or lifecycle closure ahead of surfacing a read fault.
    pub fn terminate(&mut self, reason: CloseReason) -> SessionEffects {
        let mut effects = SessionEffects::default();
        self.close(&mut effects, reason);
        effects
    }

    fn on_partial(&mut self, snapshot: MessageSnapshot) -> SessionEffects {
        let mut effects = SessionEffects::default();
        self.ensure_started(&mut effects.chunks);

        if let Some(delta) = self.cursor.advance(&snapshot.message) {
            effects.chunks.push(LifecycleChunk::TextDelta {
                id: self.part_id.clone(),
                delta,
            });
        }

        let structured = StructuredData::from_snapshot(&snapshot);
        if !structured.is_empty() {
            // Cache only payloads that carry something: a later
            // message-only snapshot must not clobber phase signals.
            self.last_partial = Some(structured.clone());
            effects.structured = Some(structured);
        }

        effects
    }

    fn on_done(
        &mut self,
        object: Option<MessageSnapshot>,
        usage: Option<TokenUsage>,
    ) -> SessionEffects {
        let mut effects = SessionEffects::default();
        self.ensure_started(&mut effects.chunks);

        let mut structured = StructuredData::default();
        if let Some(snapshot) = &object {
            // The terminal text is authoritative; emit whatever suffix the
            // snapshots never delivered.
            if let Some(delta) = self.cursor.advance(&snapshot.message) {
                effects.chunks.push(LifecycleChunk::TextDelta {
                    id: self.part_id.clone(),
                    delta,
                });
            }
            structured = StructuredData::from_snapshot(snapshot);
        }
        structured.usage = usage;

        let merged = structured.merged_over(self.last_partial.as_ref());
        if !merged.is_empty() {
            effects.structured = Some(merged);
        }

        self.close(&mut effects, CloseReason::Done);
        effects
    }

    fn on_error(
        &mut self,
        message: Option<String>,
        object: Option<MessageSnapshot>,
    ) -> SessionEffects {
        let mut effects = SessionEffects::default();
        self.ensure_started(&mut effects.chunks);

        let mut structured = object
            .as_ref()
            .map(StructuredData::from_snapshot)
            .unwrap_or_default();
        structured.error = message;

        let merged = structured.merged_over(self.last_partial.as_ref());
        if !merged.is_empty() {
            effects.structured = Some(merged);
        }

        self.close(&mut effects, CloseReason::BackendError);
        effects
    }

    /// Clean termination, idempotent across every trigger path. Emits any
    /// missing opening chunks first so the bracket is balanced even when
    /// the session never streamed text.
    fn close(&mut self, effects: &mut SessionEffects, reason: CloseReason) {
        if self.terminated {
            return;
        }

        self.ensure_started(&mut effects.chunks);
        if !self.text_end_emitted {
            effects.chunks.push(LifecycleChunk::TextEnd {
                id: self.part_id.clone(),
            });
            effects.chunks.push(LifecycleChunk::FinishStep);
            effects.chunks.push(LifecycleChunk::Finish);
            self.text_end_emitted = true;
        }
        self.terminated = true;
        effects.closed = Some(reason);
    }

    fn ensure_started(&mut self, chunks: &mut Vec<LifecycleChunk>) {
        if self.started {
            return;
        }

        chunks.push(LifecycleChunk::Start {
            message_id: self.message_id.clone(),
        });
        chunks.push(LifecycleChunk::StartStep);
        chunks.push(LifecycleChunk::TextStart {
            id: self.part_id.clone(),
        });
        self.started = true;
    }
}

impl Default for StreamSession {
    fn default() -> Self {
        Self::new()
    }
}
