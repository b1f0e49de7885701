//! Interactive dashboard.
//!
//! Reads one command per line. Run and Refresh are dispatched in the
//! background so the prompt stays usable; while a control is disabled its
//! command is refused instead of queued.

use anyhow::Result;
use colored::Colorize;
use std::future::Future;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::controller::{ConsoleEventListener, DashboardController};
use crate::model::Filter;
use crate::render::{self, OutputFormat};

/// A parsed shell line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Run,
    Refresh,
    Clear,
    Filter(Filter),
    /// Empty term clears the search
    Search(String),
    Auto(bool),
    Show,
    Export {
        format: OutputFormat,
        path: PathBuf,
    },
    Help,
    Quit,
}

impl ShellCommand {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (line, ""),
        };

        match head.to_lowercase().as_str() {
            "run" => Ok(ShellCommand::Run),
            "refresh" | "r" => Ok(ShellCommand::Refresh),
            "clear" => Ok(ShellCommand::Clear),
            "filter" | "f" => {
                if rest.is_empty() {
                    return Err("Usage: filter <all|pass|fail|flaky>".to_string());
                }
                rest.parse().map(ShellCommand::Filter)
            }
            "search" | "s" => Ok(ShellCommand::Search(rest.to_string())),
            "auto" => match rest.to_lowercase().as_str() {
                "on" | "true" | "1" => Ok(ShellCommand::Auto(true)),
                "off" | "false" | "0" => Ok(ShellCommand::Auto(false)),
                _ => Err("Usage: auto <on|off>".to_string()),
            },
            "show" | "ls" => Ok(ShellCommand::Show),
            "export" => {
                let mut parts = rest.split_whitespace();
                match (parts.next(), parts.next()) {
                    (Some(format), Some(path)) => {
                        let format: OutputFormat = format.parse().map_err(|e| format!("{}", e))?;
                        Ok(ShellCommand::Export {
                            format,
                            path: PathBuf::from(path),
                        })
                    }
                    _ => Err("Usage: export <html|json|junit|table> <path>".to_string()),
                }
            }
            "help" | "?" => Ok(ShellCommand::Help),
            "quit" | "exit" | "q" => Ok(ShellCommand::Quit),
            other => Err(format!("Unknown command: {} (type 'help')", other)),
        }
    }
}

/// One-at-a-time dispatcher for a background action.
///
/// The busy flag is raised before the task is spawned, so a second command
/// typed before the task starts is still refused.
#[derive(Clone, Default)]
pub struct Trigger {
    busy: Arc<AtomicBool>,
}

impl Trigger {
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Spawn `action` unless one is already in flight. Returns whether it was spawned.
    pub fn fire<F>(&self, action: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return false;
        }

        let reset = BusyReset(self.busy.clone());
        tokio::spawn(async move {
            let _reset = reset;
            action.await;
        });
        true
    }
}

/// Lowers the busy flag however the action ends, panics included
struct BusyReset(Arc<AtomicBool>);

impl Drop for BusyReset {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub async fn run_shell(controller: DashboardController) -> Result<()> {
    let listener = tokio::spawn(ConsoleEventListener::listen(
        controller.subscribe(),
        controller.downgrade(),
        false,
    ));

    println!("{}", render::console::render(&controller.view()));
    print_help();

    let run_trigger = Trigger::default();
    let refresh_trigger = Trigger::default();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("{} ", "flakesense>".blue().bold());
        std::io::stdout().flush()?;

        let line = match lines.next_line().await? {
            Some(line) => line,
            None => break, // EOF
        };
        if line.trim().is_empty() {
            continue;
        }

        let command = match ShellCommand::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                println!("{} {}", "⚠".yellow(), e);
                continue;
            }
        };

        match command {
            ShellCommand::Run => {
                let enabled = controller.snapshot().controls().run.enabled;
                let dispatched = enabled && {
                    let controller = controller.clone();
                    run_trigger.fire(async move { controller.run_tests().await })
                };
                if !dispatched {
                    println!("{} Tests are already running", "⏳".yellow());
                }
            }

            ShellCommand::Refresh => {
                let enabled = controller.snapshot().controls().refresh.enabled;
                let dispatched = enabled && {
                    let controller = controller.clone();
                    refresh_trigger.fire(async move { controller.fetch_results().await })
                };
                if !dispatched {
                    println!("{} Already loading", "⏳".yellow());
                }
            }

            ShellCommand::Clear => {
                controller.clear_results();
                println!("{} Results cleared", "✓".green());
            }

            ShellCommand::Filter(filter) => {
                controller.set_filter(filter);
                println!("{}", render::console::render(&controller.view()));
            }

            ShellCommand::Search(term) => {
                controller.set_search_term(term);
                println!("{}", render::console::render(&controller.view()));
            }

            ShellCommand::Auto(enabled) => controller.set_auto_refresh(enabled),

            ShellCommand::Show => {
                println!("{}", render::console::render(&controller.view()));
            }

            ShellCommand::Export { format, path } => {
                if let Err(e) = render::write(&controller.view(), format, Some(&path)) {
                    println!("{} Export failed: {:#}", "❌".red(), e);
                }
            }

            ShellCommand::Help => print_help(),

            ShellCommand::Quit => break,
        }
    }

    controller.shutdown();
    listener.abort();

    println!("\nBye!");
    Ok(())
}

fn print_help() {
    println!("{}", "Commands:".bold());
    println!("  run                      Trigger a test run, then refresh");
    println!("  refresh                  Fetch the latest results");
    println!("  clear                    Clear the result list");
    println!("  filter <all|pass|fail|flaky>");
    println!("  search [term]            Search name, type and log (no term clears)");
    println!("  auto <on|off>            Refresh every few seconds");
    println!("  show                     Redraw the dashboard");
    println!("  export <format> <path>   Save a snapshot (html, json, junit, table)");
    println!("  quit                     Exit\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::oneshot;

    #[test]
    fn test_parse_commands() {
        assert_eq!(ShellCommand::parse("run"), Ok(ShellCommand::Run));
        assert_eq!(ShellCommand::parse("  REFRESH "), Ok(ShellCommand::Refresh));
        assert_eq!(
            ShellCommand::parse("filter flaky"),
            Ok(ShellCommand::Filter(Filter::Flaky))
        );
        assert_eq!(
            ShellCommand::parse("search Payment gateway"),
            Ok(ShellCommand::Search("Payment gateway".to_string()))
        );
        assert_eq!(
            ShellCommand::parse("search"),
            Ok(ShellCommand::Search(String::new()))
        );
        assert_eq!(ShellCommand::parse("auto on"), Ok(ShellCommand::Auto(true)));
        assert_eq!(ShellCommand::parse("auto off"), Ok(ShellCommand::Auto(false)));
        assert_eq!(
            ShellCommand::parse("export html out/report.html"),
            Ok(ShellCommand::Export {
                format: OutputFormat::Html,
                path: PathBuf::from("out/report.html"),
            })
        );
        assert_eq!(ShellCommand::parse("exit"), Ok(ShellCommand::Quit));
    }

    #[test]
    fn test_parse_errors() {
        assert!(ShellCommand::parse("filter").is_err());
        assert!(ShellCommand::parse("filter broken").is_err());
        assert!(ShellCommand::parse("auto maybe").is_err());
        assert!(ShellCommand::parse("export pdf x.pdf").is_err());
        assert!(ShellCommand::parse("export html").is_err());
        assert!(ShellCommand::parse("dance").is_err());
    }

    #[tokio::test]
    async fn test_trigger_refuses_while_busy() {
        let trigger = Trigger::default();
        let (release, gate) = oneshot::channel::<()>();
        let (done_tx, done_rx) = oneshot::channel::<()>();

        assert!(trigger.fire(async move {
            let _ = gate.await;
            let _ = done_tx.send(());
        }));
        assert!(trigger.is_busy());
        // Refused even before the first task has been polled
        assert!(!trigger.fire(async {}));

        release.send(()).unwrap();
        done_rx.await.unwrap();
        // The flag is cleared right after the action completes
        while trigger.is_busy() {
            tokio::task::yield_now().await;
        }
        assert!(trigger.fire(async {}));
    }

    #[tokio::test]
    async fn test_trigger_recovers_after_panic() {
        let trigger = Trigger::default();
        assert!(trigger.fire(async { panic!("backend exploded") }));

        while trigger.is_busy() {
            tokio::task::yield_now().await;
        }
        assert!(trigger.fire(async {}));
    }
}
