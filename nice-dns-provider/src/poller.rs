//! Change propagation poller
//!
//! Tracks one submitted change from `PENDING` to `INSYNC` on a background
//! task. The caller gets a [`ChangeWatch`] that delivers every transition as a
//! [`PollEvent`] and can stop the loop at any time. Dropping the handle stops
//! it too, so an abandoned watch never keeps a timer alive.
//!
//! Per attempt the events are, in order: `Attempt` with the fetched snapshot,
//! then exactly one of `Pending`, `InSync` or `Error`. A failed fetch has no
//! snapshot and emits only `Error`.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::Stream;
use serde::Serialize;
use tokio::sync::{Notify, mpsc, watch};

use crate::error::{DnsError, Result};
use crate::types::{ChangeInfo, ChangeStatus};

/// Where a poll session currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PollState {
    /// Spawned, first attempt not yet issued.
    Started,
    /// A status fetch is in flight.
    Attempting,
    /// Last fetch said `PENDING`; waiting for the next attempt.
    Pending,
    InSync,
    Failed,
    Cancelled,
}

impl PollState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::InSync | Self::Failed | Self::Cancelled)
    }
}

/// Why a poll session failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "camelCase")]
pub enum PollFailure {
    /// The status fetch itself failed.
    Fetch(DnsError),
    /// The provider reported a status other than `PENDING` or `INSYNC`.
    UnexpectedStatus(ChangeInfo),
}

/// One observable poller transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum PollEvent {
    /// A fetch completed; `attempt` counts from 1.
    Attempt { attempt: u32, change: ChangeInfo },
    Pending(ChangeInfo),
    InSync(ChangeInfo),
    Error(PollFailure),
}

impl PollEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::InSync(_) | Self::Error(_))
    }

    /// Short event name (`attempt`, `pending`, `insync`, `error`).
    pub fn name(&self) -> &'static str {
        match self {
            Self::Attempt { .. } => "attempt",
            Self::Pending(_) => "pending",
            Self::InSync(_) => "insync",
            Self::Error(_) => "error",
        }
    }
}

/// How a poll session ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "data", rename_all = "camelCase")]
pub enum PollOutcome {
    InSync(ChangeInfo),
    Failed(PollFailure),
    Cancelled,
}

/// Handle to a running poll session.
///
/// Events are buffered from the moment the handle is created, so nothing is
/// missed between spawning and the first `next_event` call.
#[derive(Debug)]
pub struct ChangeWatch {
    change_id: String,
    events: mpsc::UnboundedReceiver<PollEvent>,
    state: watch::Receiver<PollState>,
    cancel: Arc<Notify>,
    outcome: Option<PollOutcome>,
}

impl ChangeWatch {
    /// Spawn a poll loop on the current tokio runtime.
    ///
    /// `fetch` is called once immediately and then `every` after each
    /// `PENDING` result, until a terminal state or cancellation.
    pub fn spawn<F, Fut>(change_id: impl Into<String>, every: Duration, fetch: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<ChangeInfo>> + Send + 'static,
    {
        let change_id = change_id.into();
        let (event_tx, events) = mpsc::unbounded_channel();
        let (state_tx, state) = watch::channel(PollState::Started);
        let cancel = Arc::new(Notify::new());

        tokio::spawn(run(
            change_id.clone(),
            every,
            fetch,
            event_tx,
            state_tx,
            Arc::clone(&cancel),
        ));

        Self {
            change_id,
            events,
            state,
            cancel,
            outcome: None,
        }
    }

    pub fn change_id(&self) -> &str {
        &self.change_id
    }

    /// Current state of the loop.
    pub fn state(&self) -> PollState {
        *self.state.borrow()
    }

    /// Stop scheduling further attempts. An in-flight fetch is abandoned.
    pub fn cancel(&self) {
        self.cancel.notify_one();
    }

    /// Next event, or `None` once the loop has ended and all events were read.
    pub async fn next_event(&mut self) -> Option<PollEvent> {
        let event = self.events.recv().await;
        self.record(event.as_ref());
        event
    }

    /// Drain events until the loop ends and report how it ended.
    pub async fn wait(mut self) -> PollOutcome {
        while self.next_event().await.is_some() {}
        self.outcome.take().unwrap_or(PollOutcome::Cancelled)
    }

    fn record(&mut self, event: Option<&PollEvent>) {
        match event {
            Some(PollEvent::InSync(change)) => {
                self.outcome = Some(PollOutcome::InSync(change.clone()));
            }
            Some(PollEvent::Error(failure)) => {
                self.outcome = Some(PollOutcome::Failed(failure.clone()));
            }
            _ => {}
        }
    }
}

impl Stream for ChangeWatch {
    type Item = PollEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        let polled = this.events.poll_recv(cx);
        if let Poll::Ready(event) = &polled {
            this.record(event.as_ref());
        }
        polled
    }
}

impl Drop for ChangeWatch {
    fn drop(&mut self) {
        self.cancel.notify_one();
    }
}

async fn run<F, Fut>(
    change_id: String,
    every: Duration,
    mut fetch: F,
    events: mpsc::UnboundedSender<PollEvent>,
    state: watch::Sender<PollState>,
    cancel: Arc<Notify>,
) where
    F: FnMut() -> Fut + Send,
    Fut: Future<Output = Result<ChangeInfo>> + Send,
{
    // A closed receiver means the handle is gone; cancel has been signalled.
    let emit = |event: PollEvent| {
        let _ = events.send(event);
    };

    let mut attempt: u32 = 0;
    loop {
        attempt = attempt.saturating_add(1);
        state.send_replace(PollState::Attempting);
        log::debug!("[poller] {change_id}: attempt {attempt}");

        let fetched = tokio::select! {
            biased;
            () = cancel.notified() => {
                log::debug!("[poller] {change_id}: cancelled during fetch");
                state.send_replace(PollState::Cancelled);
                return;
            }
            result = fetch() => result,
        };

        let change = match fetched {
            Ok(change) => change,
            Err(e) => {
                log::warn!("[poller] {change_id}: status fetch failed: {e}");
                state.send_replace(PollState::Failed);
                emit(PollEvent::Error(PollFailure::Fetch(e)));
                return;
            }
        };

        emit(PollEvent::Attempt {
            attempt,
            change: change.clone(),
        });

        match change.status {
            ChangeStatus::Pending => {
                state.send_replace(PollState::Pending);
                emit(PollEvent::Pending(change));
            }
            ChangeStatus::InSync => {
                log::debug!("[poller] {change_id}: in sync after {attempt} attempt(s)");
                state.send_replace(PollState::InSync);
                emit(PollEvent::InSync(change));
                return;
            }
            ChangeStatus::Other(ref status) => {
                log::warn!("[poller] {change_id}: unexpected status {status}");
                state.send_replace(PollState::Failed);
                emit(PollEvent::Error(PollFailure::UnexpectedStatus(change)));
                return;
            }
        }

        tokio::select! {
            biased;
            () = cancel.notified() => {
                log::debug!("[poller] {change_id}: cancelled");
                state.send_replace(PollState::Cancelled);
                return;
            }
            () = tokio::time::sleep(every) => {}
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::Utc;
    use futures::StreamExt;

    use super::*;

    fn change(status: &str) -> ChangeInfo {
        ChangeInfo {
            change_id: "C1".to_string(),
            url: "/change/C1".to_string(),
            status: ChangeStatus::from(status.to_string()),
            submitted_at: Utc::now(),
        }
    }

    /// Fetcher that replays `script`, repeating the last entry once exhausted.
    fn scripted(
        script: Vec<Result<ChangeInfo>>,
    ) -> (
        Arc<AtomicUsize>,
        impl FnMut() -> futures::future::Ready<Result<ChangeInfo>> + Send + 'static,
    ) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let script = Mutex::new(script.into_iter().collect::<VecDeque<_>>());
        let fetch = move || {
            counter.fetch_add(1, Ordering::SeqCst);
            let mut script = script.lock().unwrap();
            let next = if script.len() > 1 {
                script.pop_front().unwrap()
            } else {
                script.front().cloned().unwrap()
            };
            futures::future::ready(next)
        };
        (calls, fetch)
    }

    #[tokio::test(start_paused = true)]
    async fn pending_pending_insync() {
        let (calls, fetch) = scripted(vec![
            Ok(change("PENDING")),
            Ok(change("PENDING")),
            Ok(change("INSYNC")),
        ]);
        let watch = ChangeWatch::spawn("C1", Duration::from_secs(1), fetch);
        assert_eq!(watch.state(), PollState::Started);

        let names: Vec<_> = watch.map(|e| e.name()).collect().await;
        assert_eq!(
            names,
            vec!["attempt", "pending", "attempt", "pending", "attempt", "insync"]
        );
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn attempts_are_numbered_and_spaced() {
        let (_, fetch) = scripted(vec![Ok(change("PENDING")), Ok(change("INSYNC"))]);
        let start = tokio::time::Instant::now();
        let mut watch = ChangeWatch::spawn("C1", Duration::from_secs(5), fetch);

        let first = watch.next_event().await.unwrap();
        assert!(matches!(first, PollEvent::Attempt { attempt: 1, .. }));
        watch.next_event().await.unwrap();
        let second = watch.next_event().await.unwrap();
        assert!(matches!(second, PollEvent::Attempt { attempt: 2, .. }));
        assert!(start.elapsed() >= Duration::from_secs(5));

        let outcome = watch.wait().await;
        assert!(matches!(outcome, PollOutcome::InSync(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_error_emits_only_error() {
        let (_, fetch) = scripted(vec![Err(DnsError::ChangeNotFound {
            provider: "test".to_string(),
            change_id: "C1".to_string(),
            fault: crate::error::ApiFault::new("NoSuchChange", "no change"),
        })]);
        let mut watch = ChangeWatch::spawn("C1", Duration::from_secs(1), fetch);

        let event = watch.next_event().await.unwrap();
        assert!(matches!(event, PollEvent::Error(PollFailure::Fetch(_))));
        assert!(watch.next_event().await.is_none());
        assert_eq!(watch.state(), PollState::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_status_is_terminal_failure() {
        let (calls, fetch) = scripted(vec![Ok(change("FAILED"))]);
        let watch = ChangeWatch::spawn("C1", Duration::from_secs(1), fetch);
        let events: Vec<_> = watch.collect().await;

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].name(), "attempt");
        assert!(matches!(
            &events[1],
            PollEvent::Error(PollFailure::UnexpectedStatus(c)) if c.status.as_str() == "FAILED"
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_scheduling() {
        let (calls, fetch) = scripted(vec![Ok(change("PENDING"))]);
        let mut watch = ChangeWatch::spawn("C1", Duration::from_secs(1), fetch);

        watch.next_event().await.unwrap();
        assert_eq!(watch.next_event().await.unwrap().name(), "pending");
        watch.cancel();

        assert!(watch.next_event().await.is_none());
        assert_eq!(watch.state(), PollState::Cancelled);
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(watch.wait().await, PollOutcome::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_handle_cancels() {
        let (calls, fetch) = scripted(vec![Ok(change("PENDING"))]);
        let mut watch = ChangeWatch::spawn("C1", Duration::from_secs(1), fetch);
        watch.next_event().await.unwrap();
        drop(watch);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
