//! Terminal user interface for the film catalog
//!
//! A menu of the five catalog entities, a generic list/add/edit screen for
//! each, plus login, registration and profile screens.

pub mod app;
pub mod components;
pub mod request_state;
pub mod screens;
pub mod traits;
pub mod ui;

use std::io;

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{error, info};

pub use app::{App, Route};

use crate::api::ApiClient;
use crate::config::Config;

/// Set up the terminal, run the app until the user quits, restore the terminal
pub async fn run_tui(config: Config) -> Result<()> {
    let api = ApiClient::from_config(&config).context("Failed to build HTTP client")?;
    let mut app = App::new(config, api);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    info!("Starting main application loop");
    let result = app.run(&mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    match &result {
        Ok(()) => info!("TUI exited successfully"),
        Err(e) => error!("TUI encountered an error: {}", e),
    }
    result
}
