// ── Fixed-cadence polling controller ──
//
// Keeps one remote resource fresh: fetch once immediately, then every
// `interval`, plus out-of-band manual refreshes. Each fetch runs in its own
// task so a slow response never delays the next tick. Every fetch carries a
// sequence number and only commits if it is newer than the last committed
// one, so a slow old response can never overwrite fresher state.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::DEFAULT_POLL_INTERVAL;
use crate::error::CoreError;

type FetchFn<T> = Box<dyn Fn() -> BoxFuture<'static, Result<T, CoreError>> + Send + Sync>;

// ── Config / state ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerConfig {
    pub interval: Duration,
    pub enabled: bool,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            enabled: true,
        }
    }
}

/// Everything a view needs to render a polled resource.
#[derive(Debug)]
pub struct PollState<T> {
    /// Last successful payload. Survives later failures.
    pub data: Option<Arc<T>>,
    /// Message of the most recent failure, cleared by the next success.
    pub error: Option<String>,
    pub loading: bool,
    pub last_updated: Option<DateTime<Utc>>,
    /// Sequence number of the fetch that produced this state.
    pub sequence: u64,
}

impl<T> Clone for PollState<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            error: self.error.clone(),
            loading: self.loading,
            last_updated: self.last_updated,
            sequence: self.sequence,
        }
    }
}

impl<T> Default for PollState<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            loading: false,
            last_updated: None,
            sequence: 0,
        }
    }
}

// ── Poller ───────────────────────────────────────────────────────

/// Owning handle to a running poll loop.
///
/// Dropping the handle (or calling [`shutdown`](Self::shutdown)) stops the
/// timer. Fetches already in flight run to completion, but their results
/// are discarded.
pub struct Poller<T: Send + Sync + 'static> {
    inner: Arc<PollerInner<T>>,
    enabled: watch::Sender<bool>,
}

struct PollerInner<T> {
    fetch: FetchFn<T>,
    state: watch::Sender<PollState<T>>,
    issued: AtomicU64,
    cancel: CancellationToken,
}

impl<T: Send + Sync + 'static> Poller<T> {
    /// Start polling. Must be called inside a Tokio runtime.
    ///
    /// The poll loop stops when `parent` is cancelled or the handle drops.
    pub fn spawn<F, Fut>(fetch: F, config: PollerConfig, parent: &CancellationToken) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, CoreError>> + Send + 'static,
    {
        let (state, _) = watch::channel(PollState {
            loading: config.enabled,
            ..PollState::default()
        });
        let (enabled, enabled_rx) = watch::channel(config.enabled);

        let inner = Arc::new(PollerInner {
            fetch: Box::new(move || fetch().boxed()),
            state,
            issued: AtomicU64::new(0),
            cancel: parent.child_token(),
        });

        tokio::spawn(cadence_task(Arc::clone(&inner), config.interval, enabled_rx));

        Self { inner, enabled }
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<PollState<T>> {
        self.inner.state.subscribe()
    }

    /// Clone the current state.
    pub fn snapshot(&self) -> PollState<T> {
        self.inner.state.borrow().clone()
    }

    /// Trigger one fetch outside the timer cadence. The timer keeps its phase.
    pub fn refresh(&self) {
        if self.inner.cancel.is_cancelled() {
            return;
        }
        self.inner.state.send_modify(|s| s.loading = true);
        spawn_fetch(&self.inner);
    }

    /// Pause or resume the cadence. Resuming fetches immediately.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.send_if_modified(|current| {
            let changed = *current != enabled;
            *current = enabled;
            changed
        });
    }

    pub fn is_enabled(&self) -> bool {
        *self.enabled.borrow()
    }

    /// Stop the timer and drop every result still in flight.
    pub fn shutdown(&self) {
        self.inner.cancel.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }
}

impl<T: Send + Sync + 'static> Drop for Poller<T> {
    fn drop(&mut self) {
        self.inner.cancel.cancel();
    }
}

impl<T> PollerInner<T> {
    /// Apply a finished fetch unless the poller is gone or a newer fetch
    /// already committed.
    fn commit(&self, seq: u64, result: Result<T, CoreError>) {
        if self.cancel.is_cancelled() {
            debug!(seq, "poller shut down, dropping fetch result");
            return;
        }

        self.state.send_if_modified(|state| {
            if seq <= state.sequence {
                debug!(seq, committed = state.sequence, "discarding stale response");
                return false;
            }
            state.sequence = seq;
            state.loading = false;
            match result {
                Ok(data) => {
                    state.data = Some(Arc::new(data));
                    state.error = None;
                    state.last_updated = Some(Utc::now());
                }
                Err(e) => {
                    warn!(seq, error = %e, "poll fetch failed");
                    state.error = Some(e.display_message());
                }
            }
            true
        });
    }
}

fn spawn_fetch<T: Send + Sync + 'static>(inner: &Arc<PollerInner<T>>) {
    let seq = inner.issued.fetch_add(1, Ordering::SeqCst) + 1;
    let fut = (inner.fetch)();
    let inner = Arc::clone(inner);
    tokio::spawn(async move {
        let result = fut.await;
        inner.commit(seq, result);
    });
}

async fn cadence_task<T: Send + Sync + 'static>(
    inner: Arc<PollerInner<T>>,
    period: Duration,
    mut enabled: watch::Receiver<bool>,
) {
    let cancel = inner.cancel.clone();

    'outer: loop {
        if !*enabled.borrow_and_update() {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                res = enabled.changed() => {
                    if res.is_err() {
                        break;
                    }
                    continue;
                }
            }
        }

        // First tick completes immediately.
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break 'outer,
                res = enabled.changed() => {
                    if res.is_err() {
                        break 'outer;
                    }
                    if !*enabled.borrow_and_update() {
                        debug!("polling paused");
                        continue 'outer;
                    }
                }
                _ = interval.tick() => spawn_fetch(&inner),
            }
        }
    }
    debug!("poll loop stopped");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;

    const INTERVAL: Duration = Duration::from_secs(10);

    async fn settle() {
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
    }

    fn counting_poller(
        calls: &Arc<AtomicUsize>,
        config: PollerConfig,
        cancel: &CancellationToken,
    ) -> Poller<usize> {
        let calls = Arc::clone(calls);
        Poller::spawn(
            move || {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move { Ok::<_, CoreError>(n) }
            },
            config,
            cancel,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn fetches_immediately_then_every_interval() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cancel = CancellationToken::new();
        let poller = counting_poller(
            &calls,
            PollerConfig {
                interval: INTERVAL,
                enabled: true,
            },
            &cancel,
        );

        settle().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(poller.snapshot().data.as_deref(), Some(&1));
        assert!(poller.snapshot().last_updated.is_some());

        tokio::time::advance(Duration::from_secs(9)).await;
        settle().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(1)).await;
        settle().await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        tokio::time::advance(INTERVAL).await;
        settle().await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(poller.snapshot().data.as_deref(), Some(&3));
    }

    #[tokio::test(start_paused = true)]
    async fn failure_preserves_previous_data() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let cancel = CancellationToken::new();
        let poller = Poller::spawn(
            move || {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if n == 1 {
                        Ok(n)
                    } else {
                        Err(CoreError::Api {
                            message: "HTTP 500".into(),
                            status: Some(500),
                        })
                    }
                }
            },
            PollerConfig::default(),
            &cancel,
        );

        settle().await;
        tokio::time::advance(DEFAULT_POLL_INTERVAL).await;
        settle().await;

        let state = poller.snapshot();
        assert_eq!(state.data.as_deref(), Some(&1));
        assert_eq!(state.error.as_deref(), Some("HTTP 500"));
        assert!(!state.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_response_is_discarded() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let cancel = CancellationToken::new();
        let poller = Poller::spawn(
            move || {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if n == 1 {
                        tokio::time::sleep(Duration::from_secs(5)).await;
                    }
                    Ok::<_, CoreError>(n)
                }
            },
            PollerConfig {
                interval: Duration::from_secs(60),
                enabled: true,
            },
            &cancel,
        );

        settle().await;
        poller.refresh();
        settle().await;
        assert_eq!(poller.snapshot().data.as_deref(), Some(&2));

        tokio::time::advance(Duration::from_secs(6)).await;
        settle().await;
        let state = poller.snapshot();
        assert_eq!(state.data.as_deref(), Some(&2));
        assert_eq!(state.sequence, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_sets_loading_and_keeps_timer_phase() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cancel = CancellationToken::new();
        let poller = counting_poller(&calls, PollerConfig::default(), &cancel);
        let rx = poller.subscribe();

        settle().await;
        tokio::time::advance(Duration::from_secs(4)).await;
        poller.refresh();
        assert!(rx.borrow().loading);
        settle().await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        // The regular tick still lands at t=10s.
        tokio::time::advance(Duration::from_secs(6)).await;
        settle().await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_stops_timer_and_drops_in_flight_results() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let cancel = CancellationToken::new();
        let poller = Poller::spawn(
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async move {
                    tokio::time::sleep(Duration::from_secs(3)).await;
                    Ok::<_, CoreError>("late")
                }
            },
            PollerConfig::default(),
            &cancel,
        );
        let rx = poller.subscribe();

        settle().await;
        poller.shutdown();
        tokio::time::advance(Duration::from_secs(30)).await;
        settle().await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(rx.borrow().data.is_none());
        assert!(poller.is_shut_down());
    }

    #[tokio::test(start_paused = true)]
    async fn parent_cancellation_stops_polling() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cancel = CancellationToken::new();
        let _poller = counting_poller(&calls, PollerConfig::default(), &cancel);

        settle().await;
        cancel.cancel();
        tokio::time::advance(Duration::from_secs(30)).await;
        settle().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn disabled_poller_waits_until_enabled() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cancel = CancellationToken::new();
        let poller = counting_poller(
            &calls,
            PollerConfig {
                interval: INTERVAL,
                enabled: false,
            },
            &cancel,
        );

        settle().await;
        tokio::time::advance(Duration::from_secs(25)).await;
        settle().await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        poller.set_enabled(true);
        settle().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        poller.set_enabled(false);
        settle().await;
        tokio::time::advance(Duration::from_secs(25)).await;
        settle().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(poller.snapshot().data.as_deref(), Some(&1));
    }
}
