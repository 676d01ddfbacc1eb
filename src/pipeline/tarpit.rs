//! Tarpit response discipline.
//!
//! # Responsibilities
//! - Produce a bounded-but-very-large, slowly delivered padding stream
//! - Yield the task between chunks so sibling connections are never starved
//! - Stop promptly when the peer disconnects (the stream is dropped)
//!
//! # Design Decisions
//! - The ceiling is an explicit `max_chunks` parameter, not an infinite loop:
//!   resource use per connection stays bounded even against clients that
//!   never read and never disconnect
//! - The per-chunk pause is `tokio::time::sleep`, a true yield point
//! - Concurrency is capped by a semaphore held through [`TarpitGuard`];
//!   hyper drops the body stream on peer disconnect, which drops the guard
//!   and frees the slot at the next chunk boundary

use std::convert::Infallible;
use std::time::Duration;

use bytes::Bytes;
use futures_util::stream::{self, Stream};
use tokio::sync::OwnedSemaphorePermit;

use crate::config::TarpitConfig;
use crate::observability::metrics;

/// Streams padding chunks at a deliberately slow cadence.
#[derive(Debug, Clone)]
pub struct TarpitStreamer {
    max_chunks: u64,
    chunk_bytes: usize,
    interval: Duration,
    jitter_ms: u64,
}

impl TarpitStreamer {
    pub fn new(max_chunks: u64, chunk_bytes: usize, interval: Duration, jitter_ms: u64) -> Self {
        Self {
            max_chunks,
            chunk_bytes,
            interval,
            jitter_ms,
        }
    }

    pub fn from_config(config: &TarpitConfig) -> Self {
        Self::new(
            config.max_chunks,
            config.chunk_bytes,
            Duration::from_millis(config.chunk_interval_ms),
            config.jitter_ms,
        )
    }

    /// The byte stream served as the tarpit response body.
    ///
    /// `guard` travels with the stream and is dropped when the stream
    /// completes or is cancelled, releasing whatever it holds (semaphore
    /// permit, metrics gauge).
    pub fn stream<G>(&self, guard: G) -> impl Stream<Item = Result<Bytes, Infallible>> + Send
    where
        G: Send + 'static,
    {
        let chunk = Bytes::from(vec![b' '; self.chunk_bytes]);
        let max_chunks = self.max_chunks;
        let interval = self.interval;
        let jitter_ms = self.jitter_ms;

        stream::unfold((0u64, guard), move |(sent, guard)| {
            // Bytes clones share the one padding allocation.
            let chunk = chunk.clone();
            async move {
                if sent >= max_chunks {
                    return None;
                }
                if sent > 0 {
                    tokio::time::sleep(pause(interval, jitter_ms)).await;
                }
                Some((Ok(chunk), (sent + 1, guard)))
            }
        })
    }
}

fn pause(interval: Duration, jitter_ms: u64) -> Duration {
    if jitter_ms == 0 {
        interval
    } else {
        interval + Duration::from_millis(fastrand::u64(..=jitter_ms))
    }
}

/// Holds one tarpit concurrency slot for the lifetime of a stream.
pub struct TarpitGuard {
    _permit: OwnedSemaphorePermit,
}

impl TarpitGuard {
    pub fn new(permit: OwnedSemaphorePermit) -> Self {
        metrics::tarpit_opened();
        Self { _permit: permit }
    }
}

impl Drop for TarpitGuard {
    fn drop(&mut self) {
        metrics::tarpit_closed();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    struct DropFlag(Arc<AtomicBool>);

    impl Drop for DropFlag {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn emits_exactly_max_chunks_then_ends() {
        let streamer = TarpitStreamer::new(3, 16, Duration::from_secs(1), 0);
        let chunks: Vec<_> = streamer.stream(()).collect().await;
        assert_eq!(chunks.len(), 3);
        for chunk in chunks {
            assert_eq!(chunk.unwrap().len(), 16);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn first_chunk_is_immediate() {
        let streamer = TarpitStreamer::new(5, 8, Duration::from_secs(3600), 0);
        let mut stream = Box::pin(streamer.stream(()));
        // No sleep precedes the first chunk, even with a huge interval.
        let first = tokio::time::timeout(Duration::from_millis(1), stream.next()).await;
        assert!(first.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_stream_releases_the_guard() {
        let cancelled = Arc::new(AtomicBool::new(false));
        let streamer = TarpitStreamer::new(100_000, 16, Duration::from_secs(1), 0);
        let mut stream = Box::pin(streamer.stream(DropFlag(cancelled.clone())));

        assert!(stream.next().await.is_some());
        assert!(!cancelled.load(Ordering::SeqCst));

        // Peer disconnect: hyper drops the body stream.
        drop(stream);
        assert!(cancelled.load(Ordering::SeqCst));
    }
}
