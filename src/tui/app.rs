//! Main TUI application state and logic

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};
use tracing::{debug, info};

use super::screens::*;
use super::traits::{Screen, ScreenAction};
use super::ui::{centered_rect, Styles};
use crate::api::ApiClient;
use crate::catalog::EntityKind;
use crate::config::Config;
use crate::models::RecordId;

/// Application routes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Menu,
    Login,
    Register,
    Profile,
    List(EntityKind),
    Add(EntityKind),
    Edit(EntityKind, RecordId),
}

impl Route {
    pub fn name(&self) -> String {
        match self {
            Route::Menu => "Main Menu".to_string(),
            Route::Login => "Login".to_string(),
            Route::Register => "Register".to_string(),
            Route::Profile => "Profile".to_string(),
            Route::List(kind) => kind.descriptor().title.to_string(),
            Route::Add(kind) => format!("Add {}", kind.descriptor().singular),
            Route::Edit(kind, id) => format!("Edit {} {}", kind.descriptor().singular, id),
        }
    }

    /// Form routes are left for good once submitted, so they are never
    /// returned to through history
    fn is_transient(&self) -> bool {
        matches!(
            self,
            Route::Login | Route::Register | Route::Add(_) | Route::Edit(..)
        )
    }
}

/// Main TUI application state
pub struct App {
    /// Client every screen performs its calls through
    pub api: ApiClient,
    /// Application configuration
    pub config: Config,

    screen: Box<dyn Screen>,
    history: Vec<Route>,

    // Global application state
    pub should_quit: bool,
    pub show_help_popup: bool,
    pub status_message: Option<String>,
    pub error_message: Option<String>,
}

impl App {
    /// Create a new TUI application on the main menu
    pub fn new(config: Config, api: ApiClient) -> Self {
        let mut app = Self {
            api,
            config,
            screen: Box::new(MainMenuScreen::new(None)),
            history: Vec::new(),
            should_quit: false,
            show_help_popup: false,
            status_message: None,
            error_message: None,
        };
        app.screen = app.build_screen(Route::Menu);
        app
    }

    /// Current route
    pub fn route(&self) -> Route {
        self.screen.route()
    }

    /// Run the main application loop
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        match self.api.session().username() {
            Some(username) => self.set_status(format!("Signed in as {}", username)),
            None => self.set_status("Not signed in - choose Login from the menu".to_string()),
        }

        loop {
            terminal.draw(|f| self.draw(f))?;

            // The pending state has been drawn; now run the queued call
            if self.screen.has_pending() {
                self.perform_pending().await;
                continue;
            }

            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key_event(key);
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Run the current screen's queued network call, if any
    pub async fn perform_pending(&mut self) {
        if self.screen.has_pending() {
            let action = self.screen.perform(&self.api).await;
            self.apply(action);
        }
    }

    /// Handle keyboard input events
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        let typing = self.screen.captures_text();

        match key.code {
            KeyCode::F(1) => {
                self.show_help_popup = !self.show_help_popup;
                return;
            }
            KeyCode::Char('?') if !typing => {
                self.show_help_popup = !self.show_help_popup;
                return;
            }
            KeyCode::Esc if self.show_help_popup => {
                self.show_help_popup = false;
                return;
            }
            KeyCode::Char('q') if !typing => {
                self.should_quit = true;
                return;
            }
            _ => {}
        }

        if !self.show_help_popup {
            let action = self.screen.handle_key_event(key);
            self.apply(action);
        }
    }

    /// Apply an action returned by a screen
    pub fn apply(&mut self, action: ScreenAction) {
        match action {
            ScreenAction::NavigateTo(route) => self.navigate_to(route),
            ScreenAction::NavigateBack => self.navigate_back(),
            ScreenAction::Quit => self.should_quit = true,
            ScreenAction::SetStatus(message) => self.set_status(message),
            ScreenAction::SetError(message) => self.set_error(message),
            ScreenAction::ClearMessages => self.clear_messages(),
            ScreenAction::None => {}
        }
    }

    /// Open a route with a fresh screen. Returning to a route already in the
    /// history unwinds the history to it.
    pub fn navigate_to(&mut self, route: Route) {
        let current = self.route();
        if let Some(index) = self.history.iter().position(|r| *r == route) {
            self.history.truncate(index);
        } else if !current.is_transient() && current != route {
            self.history.push(current);
        }
        debug!("Navigate {:?} -> {:?}", current, route);
        self.screen = self.build_screen(route);
        self.clear_messages();
    }

    /// Go back to the previous route, or the menu
    pub fn navigate_back(&mut self) {
        let previous = self.history.pop().unwrap_or(Route::Menu);
        self.screen = self.build_screen(previous);
        self.clear_messages();
    }

    fn build_screen(&self, route: Route) -> Box<dyn Screen> {
        match route {
            Route::Menu => Box::new(MainMenuScreen::new(self.api.session().username())),
            Route::Login => Box::new(LoginScreen::new()),
            Route::Register => Box::new(RegisterScreen::new()),
            Route::Profile => Box::new(ProfileScreen::new(self.api.session().get())),
            Route::List(kind) => Box::new(EntityListScreen::new(kind, self.config.page_size)),
            Route::Add(kind) => Box::new(EntityFormScreen::add(kind)),
            Route::Edit(kind, id) => {
                info!("Editing {} {}", kind.as_str(), id);
                Box::new(EntityFormScreen::edit(kind, id))
            }
        }
    }

    /// Draw the UI
    pub fn draw(&mut self, f: &mut Frame) {
        let size = f.size();

        // Main layout: status bar at bottom, content area above
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.screen.draw(f, chunks[0]);
        self.draw_status_bar(f, chunks[1]);

        if self.show_help_popup {
            self.draw_help_popup(f, size);
        }
    }

    /// Draw status bar with current route and shortcuts
    fn draw_status_bar(&self, f: &mut Frame, area: Rect) {
        let status_text = if let Some(ref err) = self.error_message {
            format!("Error: {}", err)
        } else if let Some(ref msg) = self.status_message {
            format!("Status: {}", msg)
        } else {
            format!(
                "cineadmin - {} | ESC: Back | Q: Quit | F1/?: Help",
                self.route().name()
            )
        };

        let style = if self.error_message.is_some() {
            Styles::error()
        } else if self.status_message.is_some() {
            Styles::success()
        } else {
            Styles::inactive()
        };

        let status_bar = Paragraph::new(status_text)
            .style(style)
            .block(Block::default().borders(Borders::ALL));

        f.render_widget(status_bar, area);
    }

    /// Draw help popup with context-sensitive shortcuts
    fn draw_help_popup(&self, f: &mut Frame, area: Rect) {
        let popup_area = centered_rect(80, 70, area);

        f.render_widget(Clear, popup_area);

        let help_content = format!(
            "Global Shortcuts:\n\
            ESC - Go back\n\
            Q - Quit application (outside text fields)\n\
            F1 / ? - Toggle this help\n\n{}",
            self.screen.help()
        );
        let help_popup = Paragraph::new(help_content)
            .block(
                Block::default()
                    .title("Help - Context Shortcuts")
                    .borders(Borders::ALL)
                    .style(Style::default().fg(Color::Yellow)),
            )
            .style(Style::default().fg(Color::White));

        f.render_widget(help_popup, popup_area);
    }

    /// Set status message
    pub fn set_status(&mut self, message: String) {
        self.status_message = Some(message);
        self.error_message = None;
    }

    /// Set error message
    pub fn set_error(&mut self, message: String) {
        self.error_message = Some(message);
        self.status_message = None;
    }

    /// Clear status and error messages
    pub fn clear_messages(&mut self) {
        self.status_message = None;
        self.error_message = None;
    }
}
