use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use crossterm::{
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use env_logger::{Builder, Env, Target};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::Terminal;

use spacecade::app::App;
use spacecade::config::{ArcadeConfig, ArcadeSettings, ServerConfig};
use spacecade::event::{Event, EventHandler};
use spacecade::server::run_server;
use spacecade::ui;

/// Longest step a single tick may simulate.
const MAX_TICK_MS: u128 = 100;

#[derive(Parser)]
#[command(name = "spacecade", version, about = "Space mini-games in the terminal, plus the portfolio backend")]
struct Cli {
    /// TOML config file (default: ./spacecade.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// Run the arcade (default)
    Play,
    /// Serve /api/resume and /api/contact
    Serve,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = ArcadeConfig::load(cli.config.as_deref()).context("loading configuration")?;

    match cli.command.unwrap_or(Command::Play) {
        Command::Play => {
            init_file_logging(&config.arcade)?;
            run_tui(&config.arcade)
        }
        Command::Serve => {
            Builder::from_env(Env::default().default_filter_or("info")).init();
            serve(config.server)
        }
    }
}

/// The alternate screen owns stdout/stderr, so the arcade logs to a file.
fn init_file_logging(settings: &ArcadeSettings) -> anyhow::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&settings.log_file)
        .with_context(|| format!("opening log file {}", settings.log_file.display()))?;
    Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting tokio runtime")?;
    runtime.block_on(async {
        tokio::select! {
            result = run_server(config, None) => result,
            _ = tokio::signal::ctrl_c() => {
                log::info!("interrupted, shutting down");
                Ok(())
            }
        }
    })
}

fn run_tui(settings: &ArcadeSettings) -> anyhow::Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    // Release events need the kitty protocol; otherwise input falls back to timeouts.
    let enhanced = matches!(supports_keyboard_enhancement(), Ok(true));
    if enhanced {
        execute!(stdout, PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES))?;
    }
    log::info!("terminal key release reporting: {}", enhanced);
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, settings);

    // Restore terminal
    if enhanced {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, settings: &ArcadeSettings) -> anyhow::Result<()> {
    let mut app = App::new(settings);
    let event_handler = EventHandler::new(settings.tick_rate_ms);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|frame| ui::render(frame, &app))?;

        match event_handler.next()? {
            Event::Tick => {
                let now = Instant::now();
                let dt = now.duration_since(last_tick).as_millis().min(MAX_TICK_MS) as u64;
                last_tick = now;
                app.on_tick(dt);
            }
            Event::Key(key) => app.on_key(key),
            Event::Resize => {}
        }

        if app.should_quit {
            break;
        }
    }

    app.unmount();
    log::info!("bye; best total {}", app.scoreboard.total());
    Ok(())
}
