//! Event lifecycle scheduler.
//!
//! # Responsibility
//! - Re-derive event status from calendar dates, on demand and on a fixed
//!   wall-clock interval.
//!
//! # Invariants
//! - "Today" is the UTC calendar date, truncated to day granularity.
//! - Refreshes are mutually exclusive: on-demand calls and timer ticks
//!   serialize on one guard, and a tick runs to completion before the
//!   timer waits again.
//! - A refresh with no date or data change applies zero transitions.

use crate::db::SnapshotStore;
use crate::model::event::next_status;
use crate::repo::event_repo::{EventRepository, StoreEventRepository};
use crate::repo::RepoResult;
use chrono::{NaiveDate, Utc};
use log::{debug, error, info};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

/// Interval between periodic refreshes when none is specified.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Re-derives event status from calendar dates against the store.
pub struct EventLifecycle {
    store: Arc<SnapshotStore>,
    refresh_guard: Mutex<()>,
}

impl EventLifecycle {
    pub fn new(store: Arc<SnapshotStore>) -> Self {
        Self {
            store,
            refresh_guard: Mutex::new(()),
        }
    }

    /// Re-evaluates every event against today's UTC date.
    ///
    /// Idempotent; collaborators call this before reading the event
    /// collection. Returns the number of transitions applied.
    pub fn refresh(&self) -> RepoResult<usize> {
        self.refresh_on(Utc::now().date_naive())
    }

    /// Re-evaluates every event against an explicit date.
    pub fn refresh_on(&self, today: NaiveDate) -> RepoResult<usize> {
        let _guard = self
            .refresh_guard
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let repo = StoreEventRepository::new(&self.store);
        let mut transitions = 0;
        for event in repo.list_all()? {
            let next = next_status(event.status, event.date, event.end_date, today);
            if next != event.status {
                repo.set_status(event.id, next)?;
                transitions += 1;
                info!(
                    "event=lifecycle_transition module=service status=ok event_id={} from={} to={}",
                    event.id,
                    event.status.as_str(),
                    next.as_str()
                );
            }
        }

        if transitions > 0 {
            info!(
                "event=lifecycle_refresh module=service status=ok today={today} transitions={transitions}"
            );
        } else {
            debug!("event=lifecycle_refresh module=service status=ok today={today} transitions=0");
        }
        Ok(transitions)
    }

    /// Starts the periodic refresh timer.
    ///
    /// The returned handle stops the timer when dropped or via
    /// [`LifecycleTimer::stop`]; stopping joins the background thread.
    pub fn start_timer(self: &Arc<Self>, interval: Duration) -> LifecycleTimer {
        let lifecycle = Arc::clone(self);
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let handle = thread::spawn(move || loop {
            match stop_rx.recv_timeout(interval) {
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {
                    if let Err(err) = lifecycle.refresh() {
                        error!("event=lifecycle_refresh module=service status=error error={err}");
                    }
                }
            }
        });

        info!(
            "event=lifecycle_timer module=service status=start interval_s={}",
            interval.as_secs()
        );
        LifecycleTimer {
            stop: stop_tx,
            handle: Some(handle),
        }
    }
}

/// Handle to the periodic refresh thread.
pub struct LifecycleTimer {
    stop: mpsc::Sender<()>,
    handle: Option<thread::JoinHandle<()>>,
}

impl LifecycleTimer {
    /// Stops the timer and joins the background thread.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let _ = self.stop.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
            info!("event=lifecycle_timer module=service status=stopped");
        }
    }
}

impl Drop for LifecycleTimer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
