use std::future::Future;
use std::sync::{atomic::AtomicBool, atomic::Ordering, Arc};
use std::time::Duration;

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response, StatusCode};
use tokio::time::{timeout_at, Instant};

use crate::chunks::{CloseReason, LifecycleChunk};
use crate::config::StudioApiConfig;
use crate::error::{parse_error_message, parse_retry_after, StudioApiError};
use crate::headers::build_headers;
use crate::payload::ChatRequest;
use crate::session::{SessionEffects, StreamSession};
use crate::sink::{guard_sink, NoopSink, SideChannelSink};
use crate::sse::SseLineParser;
use crate::url::normalize_chat_url;

/// Optional cancellation signal shared across request and stream loops.
pub type CancellationSignal = Arc<AtomicBool>;

const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(25);

#[derive(Debug)]
pub struct StudioApiClient {
    http: Client,
    config: StudioApiConfig,
}

/// How one streaming session ended, reported after the handler has seen
/// every chunk.
#[derive(Debug, Clone)]
pub struct StreamSummary {
    pub close_reason: CloseReason,
    pub message_id: String,
    pub part_id: String,
}

/// A collected session run: every chunk in emission order plus the summary.
#[derive(Debug, Clone)]
pub struct StreamResult {
    pub chunks: Vec<LifecycleChunk>,
    pub summary: StreamSummary,
}

/// Outcome of racing one body read against the session deadlines.
///
/// Explicit three-way shape: a timeout is never conflated with a genuine
/// end-of-stream, and the losing side of the race has no effects.
enum ReadOutcome {
    Bytes(reqwest::Result<Bytes>),
    Eof,
    TimedOut,
    Cancelled,
}

impl StudioApiClient {
    pub fn new(config: StudioApiConfig) -> Result<Self, StudioApiError> {
        // No blanket request timeout; SSE bodies stay open for minutes.
        // The inactivity and duration guards own all timing.
        let http = Client::builder().build().map_err(StudioApiError::from)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &StudioApiConfig {
        &self.config
    }

    pub fn normalized_endpoint(&self) -> String {
        normalize_chat_url(&self.config.base_url)
    }

    pub fn build_headers(&self) -> Result<HeaderMap, StudioApiError> {
        let headers = build_headers(&self.config)?;
        let mut out = HeaderMap::new();
        for (key, value) in headers {
            out.insert(
                HeaderName::from_bytes(key.as_bytes())
                    .map_err(|_| StudioApiError::InvalidHeader(format!("invalid key: {key}")))?,
                HeaderValue::from_str(&value).map_err(|_| {
                    StudioApiError::InvalidHeader(format!("invalid value for {key}"))
                })?,
            );
        }
        Ok(out)
    }

    pub fn build_request(
        &self,
        request: &ChatRequest,
    ) -> Result<reqwest::RequestBuilder, StudioApiError> {
        let headers = self.build_headers()?;
        Ok(self
            .http
            .post(self.normalized_endpoint())
            .headers(headers)
            .json(request))
    }

    /// Send the request and classify the response before any streaming.
    ///
    /// HTTP 429 becomes [`StudioApiError::RateLimited`] with `retryAfter`
    /// parsed from the body; any other non-2xx becomes
    /// [`StudioApiError::Status`]. Neither creates session state.
    pub async fn send(
        &self,
        request: &ChatRequest,
        cancellation: Option<&CancellationSignal>,
    ) -> Result<Response, StudioApiError> {
        let response = await_or_cancel(self.build_request(request)?.send(), cancellation)
            .await?
            .map_err(StudioApiError::from)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = await_or_cancel(response.text(), cancellation)
            .await?
            .unwrap_or_default();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(StudioApiError::RateLimited {
                retry_after: parse_retry_after(&body),
            });
        }
        Err(StudioApiError::Status(
            status,
            parse_error_message(status, &body),
        ))
    }

    /// Stream one chat session, delivering lifecycle chunks in order to
    /// `on_chunk` and side-channel payloads to `sink`.
    ///
    /// The returned summary is `Ok` on every cleanly terminated path,
    /// including timeouts, truncated streams, backend error frames, and
    /// caller cancellation. The chunk sequence is always balanced first.
    /// Only pre-stream failures and mid-stream network faults return `Err`,
    /// and the fault path still balances the chunk sequence before
    /// surfacing the error.
    pub async fn stream_with_handler<S, F>(
        &self,
        request: &ChatRequest,
        cancellation: Option<&CancellationSignal>,
        sink: &mut S,
        mut on_chunk: F,
    ) -> Result<StreamSummary, StudioApiError>
    where
        S: SideChannelSink,
        F: FnMut(LifecycleChunk),
    {
        let response = self.send(request, cancellation).await?;
        let mut bytes = response.bytes_stream();
        let mut parser = SseLineParser::default();
        let mut session = StreamSession::new()
            .with_lost_terminal_usage(self.config.lost_terminal_usage.clone());

        let started_at = Instant::now();
        let absolute_deadline = started_at + self.config.timeouts.max_duration;
        let mut inactivity_deadline = started_at + self.config.timeouts.inactivity;

        let close_reason = loop {
            let read_deadline = inactivity_deadline.min(absolute_deadline);
            match next_read(&mut bytes, read_deadline, cancellation).await {
                ReadOutcome::Bytes(Ok(chunk)) => {
                    inactivity_deadline = Instant::now() + self.config.timeouts.inactivity;
                    let mut closed = None;
                    for event in parser.feed(&chunk) {
                        let effects = session.apply(event);
                        dispatch(effects, sink, &mut on_chunk, &mut closed);
                        if closed.is_some() {
                            break;
                        }
                    }
                    if let Some(reason) = closed {
                        // Semantic terminal observed: stop reading now
                        // rather than waiting for the server to close the
                        // connection. Dropping the stream cancels the read.
                        break reason;
                    }
                }
                ReadOutcome::Bytes(Err(error)) => {
                    // Balance the lifecycle first so the consumer leaves
                    // its pending state, then surface the network fault.
                    let effects = session.terminate(CloseReason::EndOfStream);
                    dispatch(effects, sink, &mut on_chunk, &mut None);
                    return Err(StudioApiError::Request(error));
                }
                ReadOutcome::Eof => {
                    if !parser.is_empty_buffer() {
                        tracing::debug!("discarding truncated trailing frame at end of stream");
                    }
                    let effects = session.finish_interrupted(CloseReason::EndOfStream);
                    dispatch(effects, sink, &mut on_chunk, &mut None);
                    break CloseReason::EndOfStream;
                }
                ReadOutcome::TimedOut => {
                    let reason = if Instant::now() >= absolute_deadline {
                        CloseReason::DurationCap
                    } else {
                        CloseReason::Inactivity
                    };
                    let effects = session.finish_interrupted(reason);
                    dispatch(effects, sink, &mut on_chunk, &mut None);
                    break reason;
                }
                ReadOutcome::Cancelled => {
                    let effects = session.terminate(CloseReason::Cancelled);
                    dispatch(effects, sink, &mut on_chunk, &mut None);
                    break CloseReason::Cancelled;
                }
            }
        };

        tracing::debug!(reason = close_reason.as_str(), "chat stream closed");
        Ok(StreamSummary {
            close_reason,
            message_id: session.message_id().to_string(),
            part_id: session.part_id().to_string(),
        })
    }

    /// Stream one chat session and collect every chunk.
    pub async fn stream(
        &self,
        request: &ChatRequest,
        cancellation: Option<&CancellationSignal>,
    ) -> Result<StreamResult, StudioApiError> {
        let mut chunks = Vec::new();
        let mut sink = NoopSink;
        let summary = self
            .stream_with_handler(request, cancellation, &mut sink, |chunk| chunks.push(chunk))
            .await?;

        Ok(StreamResult { chunks, summary })
    }
}

fn dispatch<S, F>(
    effects: SessionEffects,
    sink: &mut S,
    on_chunk: &mut F,
    closed: &mut Option<CloseReason>,
) where
    S: SideChannelSink,
    F: FnMut(LifecycleChunk),
{
    if let Some(data) = &effects.structured {
        guard_sink("structured", sink.structured(data));
    }
    if let Some(op) = &effects.file_operation {
        guard_sink("file_operation", sink.file_operation(op));
    }
    if let Some(status) = &effects.build_status {
        guard_sink("build_status", sink.build_status(status));
    }
    for chunk in effects.chunks {
        on_chunk(chunk);
    }
    if effects.closed.is_some() {
        *closed = effects.closed;
    }
}

async fn next_read<S>(
    stream: &mut S,
    deadline: Instant,
    cancellation: Option<&CancellationSignal>,
) -> ReadOutcome
where
    S: Stream<Item = reqwest::Result<Bytes>> + Unpin,
{
    loop {
        if is_cancelled(cancellation) {
            return ReadOutcome::Cancelled;
        }

        let slice = Instant::now() + CANCEL_POLL_INTERVAL;
        match timeout_at(slice.min(deadline), stream.next()).await {
            Ok(Some(chunk)) => return ReadOutcome::Bytes(chunk),
            Ok(None) => return ReadOutcome::Eof,
            Err(_) if Instant::now() >= deadline => return ReadOutcome::TimedOut,
            Err(_) => continue,
        }
    }
}

fn is_cancelled(cancel: Option<&CancellationSignal>) -> bool {
    cancel.is_some_and(|token| token.load(Ordering::Acquire))
}

async fn await_or_cancel<F>(
    future: F,
    cancellation: Option<&CancellationSignal>,
) -> Result<F::Output, StudioApiError>
where
    F: Future,
{
    if cancellation.is_none() {
        return Ok(future.await);
    }

    let mut future = Box::pin(future);

    loop {
        if is_cancelled(cancellation) {
            return Err(StudioApiError::Cancelled);
        }

        if let Ok(output) = tokio::time::timeout(CANCEL_POLL_INTERVAL, &mut future).await {
            return Ok(output);
        }
    }
}
