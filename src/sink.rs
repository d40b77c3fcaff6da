use crate::events::{BuildStatus, FileOperation, StructuredData};

/// Error surfaced by a consumer sink. Sink failures are logged and
/// swallowed; they never interrupt frame processing or prevent lifecycle
/// termination.
pub type SinkError = Box<dyn std::error::Error + Send + Sync>;

/// Caller-supplied destination for non-text payloads.
///
/// Structured data, file operations, and build status travel here, outside
/// the lifecycle chunk sequence. All methods default to no-ops so consumers
/// implement only the channels they care about.
pub trait SideChannelSink {
    fn structured(&mut self, _data: &StructuredData) -> Result<(), SinkError> {
        Ok(())
    }

    fn file_operation(&mut self, _op: &FileOperation) -> Result<(), SinkError> {
        Ok(())
    }

    fn build_status(&mut self, _status: &BuildStatus) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Sink that discards every payload.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl SideChannelSink for NoopSink {}

/// Forwarding guard: a failing sink must not stop the session.
pub(crate) fn guard_sink(channel: &'static str, result: Result<(), SinkError>) {
    if let Err(error) = result {
        tracing::warn!(channel, %error, "side-channel sink failed; continuing");
    }
}
