//! Dashboard controller
//!
//! Owns the dashboard state and is its only writer. Network operations
//! suspend only the calling task; the state lock is never held across an
//! await, so other operations (and the auto-refresh timer) keep running.
//! Overlapping fetches are not coalesced: the last response to arrive wins.

pub mod events;
pub mod refresh;
pub mod state;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::sync::broadcast;

use crate::client::Backend;
use crate::model::Filter;
use crate::view::DashboardView;

pub use events::{ConsoleEventListener, DashboardEvent, EventEmitter};
pub use refresh::RefreshTask;
pub use state::{Control, Controls, DashboardState, BACKEND_UNREACHABLE};

/// Handle to the dashboard. Clones share the same state.
#[derive(Clone)]
pub struct DashboardController {
    inner: Arc<Inner>,
}

/// Non-owning handle, for listeners that must not keep the dashboard alive
#[derive(Clone)]
pub struct WeakDashboardController {
    inner: Weak<Inner>,
}

impl WeakDashboardController {
    pub fn upgrade(&self) -> Option<DashboardController> {
        self.inner.upgrade().map(|inner| DashboardController { inner })
    }
}

struct Inner {
    backend: Arc<dyn Backend>,
    state: Mutex<DashboardState>,
    events: EventEmitter,
    refresh_interval: Duration,
    /// Running auto-refresh task; dropping it stops the timer
    refresh_task: Mutex<Option<RefreshTask>>,
}

impl Inner {
    fn state(&self) -> MutexGuard<'_, DashboardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Clone, Copy)]
enum Flag {
    Loading,
    Running,
}

/// Clears a busy flag when dropped, whatever way the operation ends
struct FlagGuard<'a> {
    inner: &'a Inner,
    flag: Flag,
}

impl<'a> FlagGuard<'a> {
    /// Set the flag and clear the error, as every network attempt does
    fn raise(inner: &'a Inner, flag: Flag) -> Self {
        let mut state = inner.state();
        match flag {
            Flag::Loading => state.is_loading = true,
            Flag::Running => state.is_running = true,
        }
        state.error = None;
        Self { inner, flag }
    }
}

impl Drop for FlagGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.inner.state();
        match self.flag {
            Flag::Loading => state.is_loading = false,
            Flag::Running => state.is_running = false,
        }
    }
}

impl DashboardController {
    /// Create a controller without touching the network
    pub fn new(backend: Arc<dyn Backend>, refresh_interval: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                backend,
                state: Mutex::new(DashboardState::default()),
                events: EventEmitter::default(),
                refresh_interval,
                refresh_task: Mutex::new(None),
            }),
        }
    }

    /// Create a controller and perform the initial fetch, once
    pub async fn mount(backend: Arc<dyn Backend>, refresh_interval: Duration) -> Self {
        let controller = Self::new(backend, refresh_interval);
        controller.fetch_results().await;
        controller
    }

    pub fn downgrade(&self) -> WeakDashboardController {
        WeakDashboardController {
            inner: Arc::downgrade(&self.inner),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.inner.events.subscribe()
    }

    pub fn refresh_interval(&self) -> Duration {
        self.inner.refresh_interval
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> DashboardState {
        self.inner.state().clone()
    }

    /// Render model for the current state
    pub fn view(&self) -> DashboardView {
        DashboardView::from_state(&self.inner.state())
    }

    /// Replace the result list with the backend's.
    ///
    /// On failure the previous results stay and `error` is set. The outcome
    /// event is emitted once `is_loading` is already cleared.
    pub async fn fetch_results(&self) {
        let inner = &*self.inner;
        let outcome = {
            let _loading = FlagGuard::raise(inner, Flag::Loading);
            inner.events.emit(DashboardEvent::FetchStarted);

            match inner.backend.fetch_results().await {
                Ok(results) => {
                    let count = results.len();
                    inner.state().results = results;
                    log::debug!("fetched {} results", count);
                    DashboardEvent::FetchSucceeded { count }
                }
                Err(e) => {
                    log::error!("Error fetching results: {}", e);
                    inner.state().error = Some(BACKEND_UNREACHABLE.to_string());
                    DashboardEvent::FetchFailed {
                        reason: e.to_string(),
                    }
                }
            }
        };
        inner.events.emit(outcome);
    }

    /// Trigger a run, then fetch the new results.
    ///
    /// `is_running` stays set during the follow-up fetch, so both busy flags
    /// are raised at the same time for a while.
    pub async fn run_tests(&self) {
        let inner = &*self.inner;
        let failure = {
            let _running = FlagGuard::raise(inner, Flag::Running);
            inner.events.emit(DashboardEvent::RunStarted);

            match inner.backend.run_tests().await {
                Ok(()) => {
                    inner.events.emit(DashboardEvent::RunSucceeded);
                    self.fetch_results().await;
                    None
                }
                Err(e) => {
                    log::error!("Error running tests: {}", e);
                    inner.state().error = Some(BACKEND_UNREACHABLE.to_string());
                    Some(DashboardEvent::RunFailed {
                        reason: e.to_string(),
                    })
                }
            }
        };
        if let Some(event) = failure {
            inner.events.emit(event);
        }
    }

    /// Drop all results and the error; flags are left alone
    pub fn clear_results(&self) {
        {
            let mut state = self.inner.state();
            state.results.clear();
            state.error = None;
        }
        self.inner.events.emit(DashboardEvent::Cleared);
    }

    pub fn set_filter(&self, filter: Filter) {
        self.inner.state().filter = filter;
        self.inner.events.emit(DashboardEvent::FilterChanged { filter });
    }

    pub fn set_search_term(&self, term: impl Into<String>) {
        let term = term.into();
        self.inner.state().search_term = term.clone();
        self.inner.events.emit(DashboardEvent::SearchChanged { term });
    }

    /// Start or stop the periodic refresh.
    ///
    /// Must be called from within a tokio runtime when enabling.
    pub fn set_auto_refresh(&self, enabled: bool) {
        {
            let mut state = self.inner.state();
            if state.auto_refresh == enabled {
                return;
            }
            state.auto_refresh = enabled;
        }

        let task = enabled
            .then(|| RefreshTask::spawn(self.downgrade(), self.inner.refresh_interval));
        // Replacing the slot drops (and aborts) any previous task
        *self
            .inner
            .refresh_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = task;

        self.inner
            .events
            .emit(DashboardEvent::AutoRefreshChanged { enabled });
    }

    /// Stop background work. Also happens when the last handle is dropped.
    pub fn shutdown(&self) {
        self.set_auto_refresh(false);
    }
}
