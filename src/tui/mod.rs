pub mod action;
pub mod handlers;
pub mod state;
pub mod view;

use crate::client::{ApiError, RestClient};
use crate::config::Config;
use crate::logging;
use crate::manager::{self, Outcome, Request};
use crate::paths::AppPaths;

use action::{Action, AppEvent};
use handlers::{handle_app_event, handle_key_event, handle_undelivered};
use state::AppState;
use view::draw;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, MouseEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::{env, io, time::Duration};
use tokio::sync::mpsc;

fn print_usage() {
    println!("Usage: eventdesk [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --url <URL>   Server origin (default taken from config.toml)");
    println!("  -h, --help    Show this help");
}

pub async fn run() -> Result<()> {
    // --- 1. PREAMBLE & CONFIG ---
    let args: Vec<String> = env::args().skip(1).collect();
    let mut url_override = None;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                return Ok(());
            }
            "--url" => match iter.next() {
                Some(url) => url_override = Some(url.clone()),
                None => {
                    eprintln!("--url needs a value");
                    return Ok(());
                }
            },
            other => {
                eprintln!("Unknown argument: {}", other);
                print_usage();
                return Ok(());
            }
        }
    }

    let log_path = logging::init()?;
    logging::install_panic_hook();
    log::info!("eventdesk starting, logging to {:?}", log_path);

    let mut config = Config::load()?;
    if !AppPaths::get_config_file_path()?.exists() {
        // First run: write the defaults so there is something to edit
        if let Err(e) = config.save() {
            log::warn!("Could not write default config: {}", e);
        } else if let Ok(path) = Config::get_path_string() {
            log::info!("Wrote default config to {}", path);
        }
    }
    if let Some(url) = url_override {
        config.base_url = url;
    }

    // --- 2. TERMINAL SETUP ---
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // --- 3. STATE INIT ---
    let mut app_state = AppState::new();
    app_state.server = config.base_url.clone();

    let (action_tx, action_rx) = mpsc::channel(10);
    let (event_tx, mut event_rx) = mpsc::channel(10);

    // --- 4. NETWORK TASK ---
    tokio::spawn(network_loop(config, action_rx, event_tx));

    // --- 5. UI LOOP ---
    let result: Result<()> = async {
        loop {
            terminal.draw(|f| draw(f, &mut app_state))?;

            // A. Network Events
            while let Ok(event) = event_rx.try_recv() {
                handle_app_event(&mut app_state, event);
            }

            // B. User Input
            if event::poll(Duration::from_millis(50))? {
                match event::read()? {
                    Event::Mouse(mouse) => match mouse.kind {
                        MouseEventKind::ScrollDown => app_state.next(),
                        MouseEventKind::ScrollUp => app_state.previous(),
                        _ => {}
                    },
                    Event::Key(key) if key.kind == event::KeyEventKind::Press => {
                        if let Some(action) = handle_key_event(key, &mut app_state) {
                            if action == Action::Quit {
                                let _ = action_tx.send(action).await;
                                break;
                            }
                            if let Err(mpsc::error::SendError(action)) =
                                action_tx.send(action).await
                            {
                                handle_undelivered(&mut app_state, action);
                            }
                        }
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }
    .await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

/// Owns the HTTP client. Runs one request per action, in arrival order,
/// and reports each outcome back to the UI.
async fn network_loop(
    config: Config,
    mut action_rx: mpsc::Receiver<Action>,
    event_tx: mpsc::Sender<AppEvent>,
) {
    let client = match RestClient::from_config(&config) {
        Ok(c) => c,
        Err(e) => {
            log::error!("Could not set up HTTP client: {}", e);
            let _ = event_tx
                .send(AppEvent::Status(format!("Error: {}", e)))
                .await;
            reject_all(e.to_string(), action_rx, event_tx).await;
            return;
        }
    };
    let _ = event_tx
        .send(AppEvent::Status(format!("Connecting to {}...", client.base_url())))
        .await;

    // Initial fetch
    let _ = event_tx
        .send(AppEvent::Done(manager::execute(&client, Request::List).await))
        .await;

    while let Some(Action::Send(request)) = action_rx.recv().await {
        let outcome = manager::execute(&client, request).await;
        if event_tx.send(AppEvent::Done(outcome)).await.is_err() {
            break;
        }
    }
}

/// Without a client every request fails at once, but each one is still
/// answered so the UI can release its in-flight markers.
async fn reject_all(
    reason: String,
    mut action_rx: mpsc::Receiver<Action>,
    event_tx: mpsc::Sender<AppEvent>,
) {
    while let Some(Action::Send(request)) = action_rx.recv().await {
        let failed = Outcome::Failed {
            id: request.target().cloned(),
            error: ApiError::Unavailable(reason.clone()),
        };
        if event_tx.send(AppEvent::Done(failed)).await.is_err() {
            break;
        }
    }
}
