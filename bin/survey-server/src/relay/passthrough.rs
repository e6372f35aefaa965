//! Event-stream pass-through from an upstream provider to the browser.
//!
//! Each upstream event's data is forwarded verbatim as one outgoing chunk.
//! The terminal sentinel closes the outgoing stream; nothing is forwarded
//! after that, even if the upstream keeps sending.

use std::fmt::Display;
use std::io;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, trace, warn};

use super::sse::{SseDecoder, SseEvent};

/// Data value marking the end of a completion stream.
pub const TERMINAL_SENTINEL: &str = "[DONE]";

/// Outgoing stream lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayPhase {
    Streaming,
    Closed,
}

/// Decides, event by event, what reaches the outgoing stream.
#[derive(Debug)]
pub struct PassThrough {
    phase: RelayPhase,
}

impl Default for PassThrough {
    fn default() -> Self {
        Self::new()
    }
}

impl PassThrough {
    pub fn new() -> Self {
        Self {
            phase: RelayPhase::Streaming,
        }
    }

    pub fn phase(&self) -> RelayPhase {
        self.phase
    }

    pub fn is_closed(&self) -> bool {
        self.phase == RelayPhase::Closed
    }

    /// Returns the payload to forward, or `None` when the event is the
    /// sentinel or arrives after close.
    pub fn accept(&mut self, event: SseEvent) -> Option<Bytes> {
        match self.phase {
            RelayPhase::Closed => None,
            RelayPhase::Streaming if event.data == TERMINAL_SENTINEL => {
                self.phase = RelayPhase::Closed;
                None
            }
            RelayPhase::Streaming => Some(Bytes::from(event.data)),
        }
    }
}

/// Re-frame an upstream event-stream body as a stream of raw payloads.
///
/// A background task reads the upstream body and hands payloads over a
/// channel of capacity one, so at most one chunk is buffered between the
/// two sides. The task stops on the sentinel, on upstream end or error, or
/// as soon as the receiving side (the client connection) is dropped, even
/// while waiting on a silent upstream.
pub fn relay_events<S, E>(upstream: S) -> ReceiverStream<Result<Bytes, io::Error>>
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    let (tx, rx) = mpsc::channel(1);

    tokio::spawn(async move {
        let mut upstream = std::pin::pin!(upstream);
        let mut decoder = SseDecoder::new();
        let mut relay = PassThrough::new();
        let mut forwarded = 0usize;

        loop {
            // An idle upstream must not outlive the client.
            let next = tokio::select! {
                next = upstream.next() => next,
                () = tx.closed() => {
                    debug!(forwarded, "client disconnected while upstream idle; dropping upstream");
                    return;
                }
            };
            let Some(chunk) = next else { break };
            let chunk = match chunk {
                Ok(c) => c,
                Err(e) => {
                    warn!(error = %e, forwarded, "upstream stream failed");
                    let _ = tx.send(Err(io::Error::other(e.to_string()))).await;
                    return;
                }
            };

            for event in decoder.feed(&chunk) {
                if let Some(name) = &event.event {
                    trace!(event = %name, "named upstream event");
                }
                if let Some(payload) = relay.accept(event) {
                    if tx.send(Ok(payload)).await.is_err() {
                        debug!(forwarded, "client disconnected; dropping upstream");
                        return;
                    }
                    forwarded += 1;
                }
                if relay.is_closed() {
                    debug!(forwarded, "terminal sentinel received; closing stream");
                    return;
                }
            }
        }

        debug!(forwarded, phase = ?relay.phase(), "upstream ended without terminal sentinel");
    });

    ReceiverStream::new(rx)
}

#[cfg(test)]
mod test {
    use super::*;
    use std::convert::Infallible;

    fn ev(data: &str) -> SseEvent {
        SseEvent {
            event: None,
            data: data.to_owned(),
        }
    }

    #[test]
    fn sentinel_closes_and_later_events_are_dropped() {
        let mut p = PassThrough::new();
        assert_eq!(p.accept(ev("Hello")), Some(Bytes::from("Hello")));
        assert_eq!(p.phase(), RelayPhase::Streaming);
        assert_eq!(p.accept(ev("[DONE]")), None);
        assert!(p.is_closed());
        assert_eq!(p.accept(ev("late")), None);
        assert!(p.is_closed());
    }

    #[test]
    fn sentinel_must_match_exactly() {
        let mut p = PassThrough::new();
        assert_eq!(p.accept(ev(" [DONE]")), Some(Bytes::from(" [DONE]")));
        assert!(!p.is_closed());
    }

    async fn collect(rx: ReceiverStream<Result<Bytes, io::Error>>) -> Vec<Result<Bytes, String>> {
        rx.map(|r| r.map_err(|e| e.to_string())).collect().await
    }

    #[tokio::test]
    async fn forwards_payloads_in_order_then_closes() {
        let chunks = vec![
            Ok::<_, Infallible>(Bytes::from("data: Hello\n\n")),
            Ok(Bytes::from("data:  world\n\n")),
            Ok(Bytes::from("data: [DONE]\n\n")),
            Ok(Bytes::from("data: ignored\n\n")),
        ];
        let out = collect(relay_events(futures::stream::iter(chunks))).await;
        assert_eq!(out, vec![Ok(Bytes::from("Hello")), Ok(Bytes::from(" world"))]);
    }

    #[tokio::test]
    async fn several_events_in_one_chunk() {
        let chunks = vec![Ok::<_, Infallible>(Bytes::from(
            "data: a\n\ndata: b\n\ndata: [DONE]\n\ndata: c\n\n",
        ))];
        let out = collect(relay_events(futures::stream::iter(chunks))).await;
        assert_eq!(out, vec![Ok(Bytes::from("a")), Ok(Bytes::from("b"))]);
    }

    #[tokio::test]
    async fn upstream_end_without_sentinel_closes_stream() {
        let chunks = vec![Ok::<_, Infallible>(Bytes::from("data: only\n\n"))];
        let out = collect(relay_events(futures::stream::iter(chunks))).await;
        assert_eq!(out, vec![Ok(Bytes::from("only"))]);
    }

    #[tokio::test]
    async fn upstream_error_is_surfaced_last() {
        let chunks = vec![
            Ok(Bytes::from("data: partial\n\n")),
            Err("connection reset"),
        ];
        let out = collect(relay_events(futures::stream::iter(chunks))).await;
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], Ok(Bytes::from("partial")));
        assert_eq!(out[1], Err("connection reset".to_owned()));
    }

    #[tokio::test]
    async fn dropped_receiver_stops_the_pump() {
        let (probe_tx, mut probe_rx) = mpsc::channel::<()>(1);
        // Endless upstream; the probe sender is dropped once the task exits.
        let upstream = futures::stream::repeat_with(move || {
            let _keep = &probe_tx;
            Ok::<_, Infallible>(Bytes::from("data: tick\n\n"))
        });
        let rx = relay_events(upstream);
        drop(rx);
        assert!(probe_rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn disconnect_during_idle_upstream_stops_the_pump() {
        let (probe_tx, mut probe_rx) = mpsc::channel::<()>(1);
        // One frame, then silence; the probe sender lives as long as the upstream.
        let upstream = futures::stream::iter([Ok::<_, Infallible>(Bytes::from("data: hi\n\n"))])
            .chain(futures::stream::pending())
            .map(move |chunk| {
                let _keep = &probe_tx;
                chunk
            });

        let mut rx = relay_events(upstream);
        assert_eq!(rx.next().await.unwrap().unwrap(), Bytes::from("hi"));
        drop(rx);

        let exited = tokio::time::timeout(std::time::Duration::from_secs(2), probe_rx.recv()).await;
        assert!(matches!(exited, Ok(None)));
    }
}
