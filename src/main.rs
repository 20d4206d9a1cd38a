use std::fs::{self, OpenOptions};
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use muxdeck::app::App;
use muxdeck::clipboard::Clipboard;
use muxdeck::config::Config;
use muxdeck::event_loop::run_app;
use muxdeck::session::PinStore;
use muxdeck::tmux::{InstanceId, TmuxClient};

/// Browse, pin and drive tmux sessions from one screen.
#[derive(Debug, Parser)]
#[command(name = "muxdeck", version)]
struct Args {
    /// Seconds between session list refreshes
    #[arg(long, value_name = "SECS")]
    refresh_interval: Option<u64>,

    /// Sidebar width as a percentage of the screen (10-50)
    #[arg(long, value_name = "PCT")]
    sidebar_width: Option<u8>,

    /// tmux socket name (`tmux -L`)
    #[arg(long, short = 'L')]
    socket: Option<String>,

    /// tmux binary to run
    #[arg(long, value_name = "PATH")]
    tmux: Option<String>,

    /// Write logs here instead of the cache directory
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `muxdeck=trace`; overrides MUXDECK_LOG
    #[arg(long, value_name = "FILTER")]
    log_level: Option<String>,
}

impl Args {
    fn apply(&self, config: &mut Config) {
        if let Some(secs) = self.refresh_interval {
            config.refresh.interval_secs = secs;
        }
        if let Some(pct) = self.sidebar_width {
            config.layout.sidebar_width_pct = pct;
        }
        if let Some(socket) = &self.socket {
            config.tmux.socket = Some(socket.clone());
        }
        if let Some(tmux) = &self.tmux {
            config.tmux.command = tmux.clone();
        }
        config.validate();
    }
}

/// The TUI owns the terminal, so logs go to a file or nowhere.
fn init_logging(args: &Args) {
    let filter = match &args.log_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_env("MUXDECK_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
    };

    let path = args
        .log_file
        .clone()
        .or_else(|| dirs::cache_dir().map(|dir| dir.join("muxdeck").join("muxdeck.log")));
    let file = path.and_then(|path| {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).ok()?;
        }
        OpenOptions::new().create(true).append(true).open(path).ok()
    });

    let _ = match file {
        Some(file) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .try_init(),
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::sink)
            .try_init(),
    };
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    if !io::stdin().is_terminal() {
        anyhow::bail!("muxdeck must be run in an interactive terminal");
    }

    let mut config = Config::load().context("Failed to load configuration")?;
    args.apply(&mut config);
    init_logging(&args);

    let instance = InstanceId::generate();
    let client = TmuxClient::new(config.tmux_settings(), instance.clone());
    let version = client
        .version()
        .await
        .with_context(|| format!("Could not run '{}'", config.tmux.command))?;
    info!(%version, %instance, "starting muxdeck");

    let pins = PinStore::load().unwrap_or_else(|err| {
        warn!(%err, "could not load pins, starting with none");
        PinStore::empty()
    });

    let mut app = App::new(config, client, pins, Clipboard::system());
    app.tmux_version = Some(version);

    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode - are you in a terminal?")?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )
    .context("Failed to setup terminal")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal (always try to restore even on error)
    let _ = disable_raw_mode();
    let _ = execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    );
    let _ = terminal.show_cursor();

    result
}
