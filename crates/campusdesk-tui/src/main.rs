//! CampusDesk - a terminal admin panel for the student records API.
//!
//! This application provides a fast, keyboard-driven interface for
//! signing in, browsing the student roster, and reading/sending messages.

mod app;
mod ui;
mod utils;

use std::io::{self, Write};
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use campusdesk_core::api::ApiClient;
use campusdesk_core::auth::{CredentialStore, Session};
use campusdesk_core::config::Config;

use app::{App, AppState};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Log file name in the data directory
const LOG_FILE: &str = "campusdesk.log";

/// Initialize the tracing subscriber for logging.
///
/// The terminal is owned by the UI, so logs go to a file in the data
/// directory. Use the RUST_LOG env var to control the log level.
fn init_tracing() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let dir = Config::data_dir().ok()?;
    std::fs::create_dir_all(&dir).ok()?;

    let appender = tracing_appender::rolling::never(dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();

    Some(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    // Check for CLI commands
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && args[1] == "--login" {
        return login_cli().await;
    }

    // Initialize logging
    let _guard = init_tracing();
    info!("CampusDesk starting");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app (hydrates any stored session)
    let mut app = App::new()?;

    if app.is_authenticated() {
        app.refresh_all();
    } else {
        app.start_login();
    }

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("CampusDesk shutting down");
    Ok(())
}

/// Prompt-based login for setting up a session without the TUI
async fn login_cli() -> Result<()> {
    println!("\n=== CampusDesk Login ===\n");

    let mut config = Config::load().unwrap_or_default();
    let scheme = config.credential_scheme;
    let api = ApiClient::new(config.resolved_api_url(), scheme)?;

    let email = if let Some(ref last_email) = config.last_email {
        print!("Email [{}]: ", last_email);
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let input = input.trim();

        if input.is_empty() {
            last_email.clone()
        } else {
            input.to_string()
        }
    } else {
        print!("Email: ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        input.trim().to_string()
    };

    if email.is_empty() {
        return Err(anyhow::anyhow!("An email address is required"));
    }

    let password = if CredentialStore::has_credentials(&email) {
        print!("Use stored password? [Y/n]: ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        if input.trim().to_lowercase() != "n" {
            CredentialStore::get_password(&email)?
        } else {
            rpassword::prompt_password("Password: ")?
        }
    } else {
        rpassword::prompt_password("Password: ")?
    };

    println!("\nAuthenticating...");

    let resp = api.login(&email, &password).await?;

    if let Err(e) = CredentialStore::store(&email, &password) {
        eprintln!("Warning: failed to store credentials: {}", e);
    }

    config.last_email = Some(email);
    config.save()?;

    let mut session = Session::new(scheme, Config::data_dir()?);
    session.login(resp.access_token, resp.refresh_token, resp.student);

    if let Some(student) = session.student() {
        println!("Logged in as {} ({}).\n", student.full_name(), student.email);
    }
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                // Handle input
                if handle_input(app, key).await? {
                    return Ok(());
                }
            }
        }

        // Check for completed background tasks
        app.check_background_tasks();

        // Check if we should quit
        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}
