use crate::model::Filter;
use tokio::sync::broadcast;

/// Dashboard state changes, for real-time front-ends
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardEvent {
    // Fetch
    FetchStarted,
    FetchSucceeded { count: usize },
    FetchFailed { reason: String },

    // Run
    RunStarted,
    RunSucceeded,
    RunFailed { reason: String },

    // Local mutations
    Cleared,
    FilterChanged { filter: Filter },
    SearchChanged { term: String },
    AutoRefreshChanged { enabled: bool },
}

impl DashboardEvent {
    /// True when a fetch finished, successfully or not
    pub fn is_fetch_outcome(&self) -> bool {
        matches!(
            self,
            DashboardEvent::FetchSucceeded { .. } | DashboardEvent::FetchFailed { .. }
        )
    }
}

/// Event emitter for broadcasting dashboard events
pub struct EventEmitter {
    sender: broadcast::Sender<DashboardEvent>,
}

impl EventEmitter {
    pub fn new() -> (Self, broadcast::Receiver<DashboardEvent>) {
        let (sender, receiver) = broadcast::channel(100);
        (Self { sender }, receiver)
    }

    pub fn emit(&self, event: DashboardEvent) {
        // No subscribers is fine
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        let (sender, _) = broadcast::channel(100);
        Self { sender }
    }
}

use super::WeakDashboardController;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::Duration as StdDuration;

/// Console event listener: spinners for in-flight requests, redraw after fetches
pub struct ConsoleEventListener;

impl ConsoleEventListener {
    /// Runs until the controller is dropped (the channel closes).
    ///
    /// With `redraw`, the whole dashboard is printed again after every fetch.
    pub async fn listen(
        mut receiver: broadcast::Receiver<DashboardEvent>,
        controller: WeakDashboardController,
        redraw: bool,
    ) {
        use colored::Colorize;
        use indicatif::ProgressDrawTarget;
        use std::io::IsTerminal;

        // Hidden target when piped, to avoid terminal escape codes
        let multi = if std::io::stdout().is_terminal() {
            MultiProgress::new()
        } else {
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
        };

        let mut run_spinner: Option<ProgressBar> = None;
        let mut load_spinner: Option<ProgressBar> = None;

        loop {
            let event = match receiver.recv().await {
                Ok(event) => event,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    log::debug!("console listener skipped {} events", skipped);
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            };

            match event {
                DashboardEvent::RunStarted => {
                    run_spinner = Some(spinner(&multi, "Running Tests..."));
                }

                DashboardEvent::RunSucceeded => {
                    if let Some(pb) = run_spinner.take() {
                        pb.finish_and_clear();
                    }
                    multi
                        .println(format!("{} Test run complete", "✓".green()))
                        .ok();
                }

                DashboardEvent::RunFailed { reason } => {
                    if let Some(pb) = run_spinner.take() {
                        pb.finish_and_clear();
                    }
                    multi
                        .println(format!("{} Test run failed: {}", "✗".red(), reason.dimmed()))
                        .ok();
                }

                DashboardEvent::FetchStarted => {
                    load_spinner = Some(spinner(&multi, "Loading test results..."));
                }

                DashboardEvent::FetchSucceeded { count } => {
                    if let Some(pb) = load_spinner.take() {
                        pb.finish_and_clear();
                    }
                    if redraw {
                        redraw_dashboard(&controller);
                    } else {
                        multi
                            .println(format!("{} Loaded {} results", "✓".green(), count))
                            .ok();
                    }
                }

                DashboardEvent::FetchFailed { reason } => {
                    if let Some(pb) = load_spinner.take() {
                        pb.finish_and_clear();
                    }
                    if redraw {
                        redraw_dashboard(&controller);
                    } else {
                        multi
                            .println(format!("{} Refresh failed: {}", "✗".red(), reason.dimmed()))
                            .ok();
                    }
                }

                DashboardEvent::AutoRefreshChanged { enabled } => {
                    let state = if enabled {
                        "on".green()
                    } else {
                        "off".yellow()
                    };
                    multi.println(format!("  Auto-refresh: {}", state)).ok();
                }

                DashboardEvent::Cleared
                | DashboardEvent::FilterChanged { .. }
                | DashboardEvent::SearchChanged { .. } => {
                    if redraw {
                        redraw_dashboard(&controller);
                    }
                }
            }
        }

        for pb in [run_spinner, load_spinner].into_iter().flatten() {
            pb.finish_and_clear();
        }
    }
}

fn spinner(multi: &MultiProgress, message: &'static str) -> ProgressBar {
    let pb = multi.add(ProgressBar::new_spinner());
    pb.set_style(ProgressStyle::default_spinner().tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "));
    pb.set_message(message);
    pb.enable_steady_tick(StdDuration::from_millis(100));
    pb
}

fn redraw_dashboard(controller: &WeakDashboardController) {
    if let Some(controller) = controller.upgrade() {
        println!("{}", crate::render::console::render(&controller.view()));
    }
}
