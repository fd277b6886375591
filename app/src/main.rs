//! Terminal todo list backed by a hosted table.
//!
//! Connection settings come from flags or the `SUPABASE_URL`,
//! `SUPABASE_ANON_KEY` and `TODO_TABLE` environment variables. Logs go to a
//! file because the terminal belongs to the UI.

use anyhow::Context;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use todo_app::telemetry::{self, Metrics};
use todo_app::{TodoAction, TodoEnvironment, TodoReducer, TodoState, TodoStore, tui};
use todo_table::{RestTaskTable, TableConfig, config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How long quitting waits for a remote call that is still running
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Parser, Debug)]
#[command(name = "todo")]
#[command(about = "Todo list stored in a hosted table", long_about = None)]
struct Cli {
    /// Project URL, e.g. `https://xyz.supabase.co`
    #[arg(long, env = config::URL_VAR)]
    url: String,

    /// Anonymous API key of the project
    #[arg(long, env = config::KEY_VAR, hide_env_values = true)]
    api_key: String,

    /// Table holding the tasks
    #[arg(long, env = config::TABLE_VAR, default_value = config::DEFAULT_TABLE)]
    table: String,

    /// File receiving the log output
    #[arg(long, default_value = "todo.log")]
    log_file: PathBuf,

    /// Serve Prometheus metrics on this address, e.g. `127.0.0.1:9000`
    #[arg(long)]
    metrics_addr: Option<SocketAddr>,

    /// Seconds before a remote call is abandoned and reported as failed
    #[arg(long, default_value_t = config::DEFAULT_TIMEOUT.as_secs())]
    request_timeout: u64,
}

fn init_tracing(path: &Path) -> anyhow::Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,todo_app=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_file)?;
    let metrics = telemetry::install(cli.metrics_addr)?;

    let config = TableConfig::new(cli.url, cli.api_key)
        .with_table(cli.table)
        .with_timeout(Duration::from_secs(cli.request_timeout));
    tracing::info!(?config, "Starting todo list");

    let env = TodoEnvironment::new(Arc::new(RestTaskTable::new(config)));
    let store = TodoStore::new(TodoState::new(), TodoReducer::new(), env);

    // Initial load; the UI shows "Loading todos..." until it lands.
    store.send(TodoAction::Refresh).await?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let result = tui::run(&mut terminal, &store).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(error) = store.shutdown(SHUTDOWN_TIMEOUT).await {
        tracing::warn!(%error, "Remote call still running at exit");
    }
    if let Metrics::Local(handle) = metrics {
        tracing::info!(counters = %handle.render(), "Stopped");
    } else {
        tracing::info!("Stopped");
    }

    result
}
