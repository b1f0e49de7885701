//! Periodic background refresh.

use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::WeakDashboardController;

/// Recurring fetch tied to a controller.
///
/// The task only holds a weak handle, so it never keeps the dashboard alive;
/// dropping the `RefreshTask` aborts it.
pub struct RefreshTask {
    handle: JoinHandle<()>,
}

impl RefreshTask {
    /// Fetch every `period`, first tick one period from now
    pub fn spawn(controller: WeakDashboardController, period: Duration) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                let Some(controller) = controller.upgrade() else {
                    break;
                };
                log::debug!("auto-refresh tick");
                controller.fetch_results().await;
            }
        });

        Self { handle }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for RefreshTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
