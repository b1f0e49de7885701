use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use flakesense::controller::ConsoleEventListener;
use flakesense::render::{self, OutputFormat};
use flakesense::{shell, Config, DashboardController, Filter, HttpBackend};

#[derive(Parser)]
#[command(name = "flakesense")]
#[command(version)]
#[command(about = "Trigger test runs and inspect flaky and failing tests", long_about = None)]
struct Cli {
    /// Backend base URL (default: $FLAKESENSE_API_URL or http://localhost:5001)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Request timeout in seconds (default: none)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive dashboard
    Dashboard {
        /// Start with auto-refresh enabled
        #[arg(long, default_value = "false")]
        auto: bool,

        /// Auto-refresh period in seconds
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Fetch and print the current results
    Results(ViewArgs),

    /// Trigger a test run, then print the results
    Run(ViewArgs),

    /// Re-print the dashboard after every automatic refresh
    Watch {
        /// Refresh period in seconds
        #[arg(long)]
        interval: Option<u64>,

        /// Show only: all, pass, fail, flaky
        #[arg(short, long, default_value = "all")]
        filter: Filter,

        /// Case-insensitive search over name, type and log
        #[arg(short, long)]
        search: Option<String>,
    },
}

#[derive(Args)]
struct ViewArgs {
    /// Show only: all, pass, fail, flaky
    #[arg(short, long, default_value = "all")]
    filter: Filter,

    /// Case-insensitive search over name, type and log
    #[arg(short, long)]
    search: Option<String>,

    /// Output format (table, json, html, junit)
    #[arg(long, default_value = "table")]
    format: OutputFormat,

    /// Output file path (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = Config::from_env()
        .with_api_url(cli.api_url)
        .with_timeout_secs(cli.timeout);

    match cli.command {
        Commands::Dashboard { auto, interval } => {
            let config = config.with_refresh_secs(interval);
            let backend = Arc::new(HttpBackend::new(&config)?);

            println!(
                "{} Connecting to {}",
                "▶".green().bold(),
                backend.base_url().cyan()
            );
            let controller = DashboardController::mount(backend, config.refresh_interval).await;
            if auto {
                controller.set_auto_refresh(true);
            }
            shell::run_shell(controller).await?;
        }

        Commands::Results(args) => {
            let backend = Arc::new(HttpBackend::new(&config)?);
            let controller = DashboardController::mount(backend, config.refresh_interval).await;
            print_and_check(&controller, &args)?;
        }

        Commands::Run(args) => {
            let backend = Arc::new(HttpBackend::new(&config)?);
            let controller = DashboardController::new(backend, config.refresh_interval);

            let progress = format!("{} Running tests...", "▶".green().bold());
            if prints_table(&args) {
                println!("{}", progress);
            } else {
                eprintln!("{}", progress);
            }
            controller.run_tests().await;
            print_and_check(&controller, &args)?;
        }

        Commands::Watch {
            interval,
            filter,
            search,
        } => {
            let config = config.with_refresh_secs(interval);
            let backend = Arc::new(HttpBackend::new(&config)?);
            let controller = DashboardController::new(backend, config.refresh_interval);
            controller.set_filter(filter);
            if let Some(term) = search {
                controller.set_search_term(term);
            }

            watch(controller).await?;
        }
    }

    Ok(())
}

/// Whether stdout carries the console table rather than a JSON/HTML/XML document
fn prints_table(args: &ViewArgs) -> bool {
    args.format == OutputFormat::Table || args.output.is_some()
}

/// Print the dashboard in the requested format; fail if the backend was unreachable
fn print_and_check(controller: &DashboardController, args: &ViewArgs) -> anyhow::Result<()> {
    controller.set_filter(args.filter);
    if let Some(term) = &args.search {
        controller.set_search_term(term.clone());
    }

    let view = controller.view();
    render::write(&view, args.format, args.output.as_deref())?;

    if let Some(error) = view.error {
        anyhow::bail!(error);
    }
    Ok(())
}

async fn watch(controller: DashboardController) -> anyhow::Result<()> {
    let stop_flag = Arc::new(AtomicBool::new(false));
    let stop_flag_handler = stop_flag.clone();
    ctrlc::set_handler(move || {
        stop_flag_handler.store(true, Ordering::SeqCst);
    })?;

    controller.fetch_results().await;
    println!("{}", render::console::render(&controller.view()));

    // Redraws after every later fetch
    let listener = tokio::spawn(ConsoleEventListener::listen(
        controller.subscribe(),
        controller.downgrade(),
        true,
    ));
    controller.set_auto_refresh(true);

    println!(
        "{} Refreshing every {}s. Press Ctrl+C to stop.",
        "↻".blue(),
        controller.refresh_interval().as_secs()
    );

    while !stop_flag.load(Ordering::SeqCst) {
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    controller.shutdown();
    listener.abort();
    println!("\n{} Stopped watching.", "■".blue().bold());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view_args(argv: &[&str]) -> ViewArgs {
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Run(args) | Commands::Results(args) => args,
            _ => panic!("expected a run or results command"),
        }
    }

    #[test]
    fn test_documents_keep_stdout_clean() {
        assert!(prints_table(&view_args(&["flakesense", "run"])));
        assert!(!prints_table(&view_args(&["flakesense", "run", "--format", "json"])));
        assert!(!prints_table(&view_args(&["flakesense", "run", "--format", "junit"])));
        assert!(!prints_table(&view_args(&["flakesense", "results", "--format", "html"])));
        assert!(prints_table(&view_args(&[
            "flakesense",
            "run",
            "--format",
            "json",
            "-o",
            "out.json"
        ])));
    }

    #[test]
    fn test_parse_watch() {
        let cli = Cli::try_parse_from(["flakesense", "watch", "--interval", "3", "-f", "flaky"])
            .unwrap();
        match cli.command {
            Commands::Watch { interval, filter, .. } => {
                assert_eq!(interval, Some(3));
                assert_eq!(filter, Filter::Flaky);
            }
            _ => panic!("expected watch"),
        }
    }
}
