use anyhow::{Result, anyhow};
use clap::Parser;

mod app;
mod config;
mod gemini;
mod handler;
mod location;
mod tui;
mod ui;

use app::{App, LocationStatus};
use config::Config;
use gemini::GeminiClient;
use tui::EventHandler;

#[derive(Parser)]
#[command(name = "towpro")]
#[command(version, about = "Terminal chat client for TowPro emergency roadside dispatch")]
struct Cli {
    /// Override the Gemini API base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Skip the startup geolocation lookup
    #[arg(long)]
    no_location: bool,
}

// Log to a file; stdout/stderr belong to the terminal UI.
// Tail with: tail -f /tmp/towpro.log. TOWPRO_DEBUG=1-3 controls verbosity.
fn init_logging() {
    let debug_level = std::env::var("TOWPRO_DEBUG")
        .ok()
        .and_then(|v| v.parse::<u8>().ok())
        .unwrap_or(0);

    if debug_level > 0 {
        let level = match debug_level {
            1 => tracing::Level::WARN,
            2 => tracing::Level::INFO,
            _ => tracing::Level::DEBUG,
        };

        let file_appender = tracing_appender::rolling::never(std::env::temp_dir(), "towpro.log");
        tracing_subscriber::fmt()
            .with_writer(file_appender)
            .with_max_level(level)
            .with_ansi(false)
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let config = Config::load().unwrap_or_else(|_| Config::new());

    let api_key = config.resolve_api_key().ok_or_else(|| {
        anyhow!("No API key found. Set GEMINI_API_KEY or add \"api_key\" to the config file.")
    })?;
    let base_url = cli
        .base_url
        .or(config.base_url)
        .unwrap_or_else(|| gemini::DEFAULT_BASE_URL.to_string());

    let mut app = App::new(GeminiClient::new(&api_key, &base_url));

    // One-shot location acquisition; the session runs fine without it
    if cli.no_location {
        app.location_status = LocationStatus::Denied;
    } else {
        app.location_status = LocationStatus::Requesting;
        app.location_task = Some(tokio::spawn(location::resolve()));
    }

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let result = run(&mut terminal, &mut app).await;
    tui::restore()?;

    result
}

async fn run(terminal: &mut tui::Tui, app: &mut App) -> Result<()> {
    let mut events = EventHandler::new();

    loop {
        poll_background_tasks(app).await;

        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event)?,
            None => break,
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Reap finished background tasks. Runs every loop iteration; the tick
/// event guarantees an iteration at least every 300ms.
async fn poll_background_tasks(app: &mut App) {
    if app
        .send_task
        .as_ref()
        .is_some_and(|task| task.is_finished())
    {
        if let Some(task) = app.send_task.take() {
            let result = match task.await {
                Ok(result) => result,
                Err(join_err) => Err(anyhow!("dispatch task panicked: {join_err}")),
            };
            app.complete_request(result);
        }
    }

    if app
        .location_task
        .as_ref()
        .is_some_and(|task| task.is_finished())
    {
        if let Some(task) = app.location_task.take() {
            match task.await {
                Ok(Ok(coords)) => app.location_granted(coords),
                Ok(Err(err)) => {
                    tracing::warn!("location lookup failed: {err:#}");
                    app.location_denied();
                }
                Err(join_err) => {
                    tracing::warn!("location task panicked: {join_err}");
                    app.location_denied();
                }
            }
        }
    }
}
