//! Account registration screen

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::api::auth::{self, RegisterForm};
use crate::api::ApiClient;
use crate::tui::{
    app::Route,
    components::{Form, FormField, FormFieldType},
    request_state::RequestState,
    traits::{FormHandler, Screen, ScreenAction},
    ui::{centered_rect, Styles},
};

pub struct RegisterScreen {
    pub form: Form,
    pub state: RequestState<()>,
    queued: Option<RegisterForm>,
    pub error: Option<String>,
}

impl Default for RegisterScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterScreen {
    pub fn new() -> Self {
        Self {
            form: Form::new(vec![
                FormField::new("email", "Email", FormFieldType::Text),
                FormField::new("password", "Password", FormFieldType::Password),
                FormField::new("confirm_password", "Confirm password", FormFieldType::Password),
            ]),
            state: RequestState::default(),
            queued: None,
            error: None,
        }
    }

    pub fn submit(&mut self) {
        if self.state.is_pending() {
            return;
        }
        self.form.clear_errors();
        let account = RegisterForm {
            email: self.form.value("email").trim().to_string(),
            password: self.form.value("password").to_string(),
            confirm_password: self.form.value("confirm_password").to_string(),
        };
        match account.check() {
            Ok(()) => {
                self.error = None;
                self.state.start();
                self.queued = Some(account);
            }
            Err(invalid) => {
                self.form.set_error(&invalid.field, &invalid.message);
                self.error = Some(invalid.message);
            }
        }
    }
}

#[async_trait::async_trait]
impl Screen for RegisterScreen {
    fn draw(&mut self, f: &mut Frame, area: Rect) {
        let area = centered_rect(60, 80, area);
        let block = Block::default()
            .title("Register")
            .borders(Borders::ALL)
            .border_style(Styles::active_border());
        let inner = block.inner(area);
        f.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(9), Constraint::Length(2), Constraint::Min(0)])
            .split(inner);

        self.form.render(f, chunks[0]);

        let line = if self.state.is_pending() {
            Line::from(Span::styled("Creating account...", Styles::info()))
        } else if let Some(ref error) = self.error {
            Line::from(Span::styled(error.clone(), Styles::error()))
        } else {
            Line::from(Span::styled(
                "Enter: register  Ctrl-L: sign in instead  Esc: back",
                Styles::inactive(),
            ))
        };
        f.render_widget(Paragraph::new(line), chunks[1]);
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> ScreenAction {
        match key.code {
            KeyCode::Esc => return ScreenAction::NavigateBack,
            KeyCode::Char('l') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return ScreenAction::NavigateTo(Route::Login);
            }
            KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => self.submit(),
            KeyCode::Tab | KeyCode::Down => self.form.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.form.previous_field(),
            KeyCode::Enter => {
                if self.form.is_last_field() {
                    self.submit();
                } else {
                    self.form.next_field();
                }
            }
            _ => {
                self.form.handle_edit_key(key);
            }
        }
        ScreenAction::None
    }

    fn route(&self) -> Route {
        Route::Register
    }

    fn help(&self) -> &'static str {
        "Register:\n\
        Tab / ↑/↓ - Switch field\n\
        Enter - Next field, or register from the last one\n\
        Ctrl+L - Go to login\n\
        Esc - Back"
    }

    fn has_pending(&self) -> bool {
        self.queued.is_some()
    }

    async fn perform(&mut self, api: &ApiClient) -> ScreenAction {
        let Some(account) = self.queued.take() else {
            return ScreenAction::None;
        };
        match auth::register(api, &account).await {
            Ok(()) => {
                self.state.succeed(());
                ScreenAction::NavigateTo(Route::Login)
            }
            Err(failure) => {
                let message = failure.to_string();
                self.state.fail(message.clone());
                self.error = Some(message);
                ScreenAction::None
            }
        }
    }

    fn captures_text(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockTransport;
    use reqwest::Method;
    use serde_json::json;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn fill(screen: &mut RegisterScreen, email: &str, password: &str, confirm: &str) {
        for (i, text) in [email, password, confirm].iter().enumerate() {
            screen.form.set_current_field(i);
            for c in text.chars() {
                screen.handle_key_event(key(KeyCode::Char(c)));
            }
        }
    }

    #[tokio::test]
    async fn test_register_navigates_to_login() {
        let mock = MockTransport::new().respond_empty("POST /api/Account/Register", 200);
        let api = mock.client();
        let mut screen = RegisterScreen::new();
        fill(&mut screen, "ada@example.com", "pw", "pw");
        screen.handle_key_event(key(KeyCode::Enter));

        let action = screen.perform(&api).await;
        assert_eq!(action, ScreenAction::NavigateTo(Route::Login));
        assert_eq!(
            mock.requests()[0].body,
            Some(json!({"email": "ada@example.com", "password": "pw", "confirmPassword": "pw"}))
        );
    }

    #[tokio::test]
    async fn test_mismatched_passwords_not_sent() {
        let mock = MockTransport::new();
        let mut screen = RegisterScreen::new();
        fill(&mut screen, "ada@example.com", "pw", "wp");
        screen.handle_key_event(key(KeyCode::Enter));

        assert!(!screen.has_pending());
        assert_eq!(screen.error.as_deref(), Some("Passwords must match"));
        assert_eq!(mock.count(Method::POST), 0);
    }

    #[tokio::test]
    async fn test_server_rejection_shown_inline() {
        let mock = MockTransport::new().respond("POST /api/Account/Register", 400, json!({}));
        let api = mock.client();
        let mut screen = RegisterScreen::new();
        fill(&mut screen, "ada@example.com", "pw", "pw");
        screen.handle_key_event(key(KeyCode::Enter));
        assert_eq!(screen.perform(&api).await, ScreenAction::None);
        assert_eq!(screen.error.as_deref(), Some("Registration failed"));
    }
}
