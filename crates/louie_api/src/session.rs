//! Lifecycle of one streamed chat response: line framing, the dual timeout
//! policy and idle-completion classification.

use std::time::{Duration, Instant};

use futures_util::{Stream, StreamExt};

use crate::config::{
    DEFAULT_CHUNK_TIMEOUT, DEFAULT_IDLE_COMPLETION_MIN_LINES, DEFAULT_SLOW_RESPONSE_THRESHOLD,
    DEFAULT_TOTAL_TIMEOUT,
};
use crate::error::LouieApiError;
use crate::lines::LineBuffer;
use crate::reconcile::{Ingest, StreamReconciler};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamPolicy {
    pub total_timeout: Duration,
    pub chunk_timeout: Duration,
    pub idle_completion_min_lines: usize,
    pub slow_response_threshold: Duration,
}

impl Default for StreamPolicy {
    fn default() -> Self {
        Self {
            total_timeout: DEFAULT_TOTAL_TIMEOUT,
            chunk_timeout: DEFAULT_CHUNK_TIMEOUT,
            idle_completion_min_lines: DEFAULT_IDLE_COMPLETION_MIN_LINES,
            slow_response_threshold: DEFAULT_SLOW_RESPONSE_THRESHOLD,
        }
    }
}

/// Why reading stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEnd {
    /// Server closed the body.
    Closed,
    /// Idle read after enough lines; the server was holding the connection.
    Idle,
    /// Overall budget ran out mid-read; whatever arrived is kept.
    BudgetExhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamStats {
    pub lines_received: usize,
    pub elapsed: Duration,
    pub end: StreamEnd,
}

impl StreamStats {
    pub fn is_slow(&self, policy: &StreamPolicy) -> bool {
        self.elapsed > policy.slow_response_threshold
    }
}

/// An idle-read timeout is normal completion once enough lines arrived;
/// before that it is a genuine timeout.
pub fn classify_idle_timeout(
    lines_received: usize,
    elapsed: Duration,
    policy: &StreamPolicy,
) -> Result<StreamEnd, LouieApiError> {
    if lines_received >= policy.idle_completion_min_lines {
        Ok(StreamEnd::Idle)
    } else {
        Err(LouieApiError::StreamTimeout {
            elapsed,
            lines_received,
            chunk_timeout: policy.chunk_timeout,
            total_timeout: policy.total_timeout,
        })
    }
}

/// Longest wait for response headers: one chunk interval, capped by the
/// overall budget.
pub fn header_timeout(policy: &StreamPolicy) -> Duration {
    policy.chunk_timeout.min(policy.total_timeout)
}

/// Reads `stream` to completion under `policy`, feeding every non-blank line
/// to `reconciler`. `on_line` observes each ingest outcome as it happens.
pub async fn drive_stream<S, B, E, F>(
    stream: S,
    policy: &StreamPolicy,
    reconciler: &mut StreamReconciler,
    on_line: F,
) -> Result<StreamStats, LouieApiError>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    LouieApiError: From<E>,
    F: FnMut(&StreamReconciler, &Ingest),
{
    drive_stream_since(Instant::now(), stream, policy, reconciler, on_line).await
}

/// Like [`drive_stream`], charging the overall budget from `started`, which
/// is when the request was sent rather than when the body began.
pub async fn drive_stream_since<S, B, E, F>(
    started: Instant,
    stream: S,
    policy: &StreamPolicy,
    reconciler: &mut StreamReconciler,
    mut on_line: F,
) -> Result<StreamStats, LouieApiError>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    LouieApiError: From<E>,
    F: FnMut(&StreamReconciler, &Ingest),
{
    let mut stream = std::pin::pin!(stream);
    let mut buffer = LineBuffer::default();
    let mut lines_received = 0usize;

    let end = loop {
        let remaining = policy.total_timeout.saturating_sub(started.elapsed());
        if remaining.is_zero() {
            break StreamEnd::BudgetExhausted;
        }
        let budget_bound = remaining < policy.chunk_timeout;
        let wait = remaining.min(policy.chunk_timeout);

        match tokio::time::timeout(wait, stream.next()).await {
            Ok(Some(chunk)) => {
                let chunk = chunk.map_err(LouieApiError::from)?;
                for line in buffer.feed(chunk.as_ref()) {
                    ingest_line(&line, reconciler, &mut lines_received, &mut on_line);
                }
            }
            Ok(None) => {
                if let Some(line) = buffer.finish() {
                    ingest_line(&line, reconciler, &mut lines_received, &mut on_line);
                }
                break StreamEnd::Closed;
            }
            Err(_) if budget_bound => break StreamEnd::BudgetExhausted,
            Err(_) => break classify_idle_timeout(lines_received, started.elapsed(), policy)?,
        }
    };

    let stats = StreamStats {
        lines_received,
        elapsed: started.elapsed(),
        end,
    };

    match stats.end {
        StreamEnd::BudgetExhausted => tracing::warn!(
            lines_received = stats.lines_received,
            total_timeout_secs = policy.total_timeout.as_secs_f64(),
            "overall timeout reached, keeping partial response"
        ),
        StreamEnd::Idle => tracing::debug!(
            lines_received = stats.lines_received,
            "stream idle after response, treating as complete"
        ),
        StreamEnd::Closed => {}
    }

    if stats.is_slow(policy) {
        tracing::warn!(
            elapsed_secs = stats.elapsed.as_secs_f64(),
            "Louie API request took {:.1}s to complete. This is normal for complex agentic \
             flows, but if you're seeing timeouts, consider increasing the timeout.",
            stats.elapsed.as_secs_f64()
        );
    }

    Ok(stats)
}

fn ingest_line<F>(
    line: &str,
    reconciler: &mut StreamReconciler,
    lines_received: &mut usize,
    on_line: &mut F,
) where
    F: FnMut(&StreamReconciler, &Ingest),
{
    *lines_received += 1;
    let outcome = reconciler.ingest(line);
    on_line(reconciler, &outcome);
}
