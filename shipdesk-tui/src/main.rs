//! Shipdesk operator console entry point.

use crossterm::{
    event::{self, Event as CrosstermEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use shipdesk_tui::api_client::RestClient;
use shipdesk_tui::config::TuiConfig;
use shipdesk_tui::error::TuiError;
use shipdesk_tui::events::TuiEvent;
use shipdesk_tui::state::App;
use shipdesk_tui::telemetry;
use shipdesk_tui::views::render_view;
use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), TuiError> {
    let config = TuiConfig::load()?;
    telemetry::init_logging(&config.log_path, config.log_filter.as_deref())?;
    info!(api = %config.api_base_url, "Starting Shipdesk console");

    let client = Arc::new(RestClient::new(&config)?);
    let mut app = App::new(config, client.clone(), client.clone(), client);

    let mut terminal = setup_terminal()?;
    let _guard = TerminalGuard;
    app.width = terminal.size()?.width;

    let (event_tx, mut event_rx) = mpsc::channel::<TuiEvent>(256);
    spawn_input_reader(event_tx.clone());

    let mut ticker = tokio::time::interval(app.config.tick());

    loop {
        terminal.draw(|f| render_view(f, &app))?;

        tokio::select! {
            _ = ticker.tick() => {
                app.dispatch_fetches(Instant::now(), &event_tx);
            }
            Some(event) = event_rx.recv() => {
                if app.handle_event(event).await {
                    break;
                }
                app.dispatch_fetches(Instant::now(), &event_tx);
            }
        }
    }

    info!("Shipdesk console exiting");
    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>, TuiError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = execute!(stdout, LeaveAlternateScreen);
    }
}

fn spawn_input_reader(sender: mpsc::Sender<TuiEvent>) {
    std::thread::spawn(move || loop {
        if let Ok(true) = event::poll(Duration::from_millis(200)) {
            if let Ok(evt) = event::read() {
                let forwarded = match evt {
                    CrosstermEvent::Key(key) => sender.blocking_send(TuiEvent::Input(key)),
                    CrosstermEvent::Resize(width, height) => {
                        sender.blocking_send(TuiEvent::Resize { width, height })
                    }
                    _ => Ok(()),
                };
                if forwarded.is_err() {
                    break;
                }
            }
        }
    });
}
