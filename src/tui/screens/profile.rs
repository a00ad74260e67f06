//! Signed-in account details and logout

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tracing::error;

use crate::api::{auth, ApiClient};
use crate::models::Session;
use crate::tui::{
    app::Route,
    traits::{Screen, ScreenAction},
    ui::{centered_rect, truncate_string, Styles},
};

pub struct ProfileScreen {
    pub session: Option<Session>,
    logout_queued: bool,
}

impl ProfileScreen {
    pub fn new(session: Option<Session>) -> Self {
        Self {
            session,
            logout_queued: false,
        }
    }
}

#[async_trait::async_trait]
impl Screen for ProfileScreen {
    fn draw(&mut self, f: &mut Frame, area: Rect) {
        let area = centered_rect(60, 50, area);
        let lines = match &self.session {
            Some(session) => vec![
                Line::from(vec![
                    Span::styled("Username: ", Styles::info()),
                    Span::styled(session.username.clone(), Styles::title()),
                ]),
                Line::from(vec![
                    Span::styled("Token:    ", Styles::info()),
                    Span::raw(truncate_string(&session.token, 24)),
                ]),
                Line::from(""),
                Line::from(Span::styled("l: log out  Esc: back", Styles::inactive())),
            ],
            None => vec![
                Line::from(Span::styled("Not signed in", Styles::warning())),
                Line::from(""),
                Line::from(Span::styled("i: log in  Esc: back", Styles::inactive())),
            ],
        };

        let profile = Paragraph::new(lines).block(
            Block::default()
                .title("Profile")
                .borders(Borders::ALL)
                .border_style(Styles::active_border()),
        );
        f.render_widget(profile, area);
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> ScreenAction {
        match key.code {
            KeyCode::Esc => ScreenAction::NavigateBack,
            KeyCode::Char('l') if self.session.is_some() => {
                self.logout_queued = true;
                ScreenAction::None
            }
            KeyCode::Char('i') if self.session.is_none() => ScreenAction::NavigateTo(Route::Login),
            _ => ScreenAction::None,
        }
    }

    fn route(&self) -> Route {
        Route::Profile
    }

    fn help(&self) -> &'static str {
        "Profile:\n\
        l - Log out\n\
        i - Log in (when signed out)\n\
        Esc - Back"
    }

    fn has_pending(&self) -> bool {
        self.logout_queued
    }

    async fn perform(&mut self, api: &ApiClient) -> ScreenAction {
        if !std::mem::take(&mut self.logout_queued) {
            return ScreenAction::None;
        }
        match auth::logout(api) {
            Ok(()) => {
                self.session = None;
                ScreenAction::NavigateTo(Route::Menu)
            }
            Err(e) => {
                error!("Logout failed: {}", e);
                ScreenAction::SetError(format!("Logout failed: {}", e))
            }
        }
    }
}
