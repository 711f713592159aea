mod app;
mod domain;
mod input;
mod notifications;
mod persistence;
mod relay;
mod report;
mod session;
mod sync;
mod ticker;
mod ui;

use anyhow::{Context, Result};
use app::AppState;
use clap::{Args, Parser, Subcommand};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use persistence::{ensure_data_dir, init_local_data_dir, log_file, BridgeInfo, FileStore, FocusRepository, DEFAULT_QUOTA_BYTES};
use ratatui::{backend::CrosstermBackend, Terminal};
use relay::RelayArgs;
use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "focus")]
#[command(about = "A Pomodoro focus assistant: tasks split into steps, streaks, achievements and chat reminders", long_about = None)]
struct Cli {
    #[command(flatten)]
    bridge: BridgeArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Binding of this client to a chat user, forwarded to the relay on sync
#[derive(Args)]
struct BridgeArgs {
    /// Chat user id
    #[arg(long, env = "FOCUS_USER_ID", global = true)]
    user_id: Option<String>,

    /// Chat id reminders are sent to
    #[arg(long, env = "FOCUS_CHAT_ID", global = true)]
    chat_id: Option<String>,

    /// Launch auth token sent with every sync
    #[arg(long = "auth", env = "FOCUS_AUTH", global = true, hide_env_values = true)]
    auth_token: Option<String>,

    /// Relay sync endpoint, e.g. http://127.0.0.1:3000/api/sync
    #[arg(long, env = "FOCUS_SYNC_URL", global = true)]
    sync_url: Option<String>,
}

impl From<BridgeArgs> for BridgeInfo {
    fn from(args: BridgeArgs) -> Self {
        BridgeInfo {
            user_id: args.user_id,
            chat_id: args.chat_id,
            auth_token: args.auth_token,
            sync_url: args.sync_url,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a local .focus directory in the current directory
    Init,
    /// Generate a progress report
    Report {
        /// Date to stamp the report with (YYYY-MM-DD format). Defaults to today.
        #[arg(short, long)]
        date: Option<String>,
        /// Output file path. Defaults to <data dir>/report-YYYY-MM-DD.md
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Run the chat-bot webhook and reminder relay
    Serve(RelayArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Init) => {
            let data_dir = init_local_data_dir()?;
            println!("Initialized focus directory: {}", data_dir.display());
            println!();
            println!("Focus will now use this local directory for its data.");
            println!("Run 'focus' to start.");
            Ok(())
        }
        Some(Commands::Report { date, output }) => {
            let report_date = if let Some(date_str) = date {
                chrono::NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
                    .map_err(|e| anyhow::anyhow!("Invalid date format. Use YYYY-MM-DD: {}", e))?
            } else {
                chrono::Local::now().date_naive()
            };

            let data_dir = ensure_data_dir()?;
            let repo = open_repository(&data_dir);
            let output_path = output.map(std::path::PathBuf::from);

            println!("Generating report for {}...", report_date);
            let report_path = report::generate_report(&repo, &data_dir, report_date, output_path)?;
            println!("Report generated: {}", report_path.display());
            Ok(())
        }
        Some(Commands::Serve(args)) => run_relay(args),
        None => run_tui(cli.bridge.into()),
    }
}

fn open_repository(data_dir: &Path) -> FocusRepository {
    let store = FileStore::new(data_dir).with_quota(DEFAULT_QUOTA_BYTES);
    FocusRepository::new(Box::new(store))
}

/// Log to a file in the data directory; the terminal belongs to the UI
fn init_file_logging(data_dir: &Path) -> Result<()> {
    let path = log_file(data_dir);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "focus=info".into()),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn run_relay(args: RelayArgs) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "focus=info,tower_http=info".into()),
        )
        .init();

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime.block_on(relay::serve(args))
}

fn run_tui(bridge: BridgeInfo) -> Result<()> {
    let data_dir = ensure_data_dir()?;
    eprintln!("Using focus directory: {}", data_dir.display());
    init_file_logging(&data_dir)?;

    let mut app = AppState::new(open_repository(&data_dir));
    app.bind_bridge(bridge);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // An unfinished session is discarded on exit; only the blobs are saved
    if let Err(e) = app.save() {
        error!("Error saving state: {:#}", e);
        eprintln!("Error saving state: {}", e);
    }

    if let Err(err) = result {
        eprintln!("Error: {}", err);
    }

    info!("Exited");
    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut AppState) -> Result<()> {
    let tick_rate = ticker::tick_duration();

    loop {
        terminal.draw(|f| ui::render(f, app))?;

        // Handle events with timeout for ticking
        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                // Only process key press events (ignore key release)
                if key.kind == KeyEventKind::Press && input::handle_key(app, key)? {
                    return Ok(());
                }
            }
        }

        // Completes the session once its countdown runs out
        app.tick();

        // Autosave if needed
        if app.needs_save {
            if let Err(e) = app.save() {
                error!("Autosave failed: {:#}", e);
                app.needs_save = false;
            }
        }
    }
}
