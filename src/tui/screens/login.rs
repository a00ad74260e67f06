//! Sign-in screen

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::api::auth::{self, LoginForm};
use crate::api::ApiClient;
use crate::tui::{
    app::Route,
    components::{Form, FormField, FormFieldType},
    request_state::RequestState,
    traits::{FormHandler, Screen, ScreenAction},
    ui::{centered_rect, Styles},
};

pub struct LoginScreen {
    pub form: Form,
    pub state: RequestState<()>,
    queued: Option<LoginForm>,
    pub error: Option<String>,
}

impl Default for LoginScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl LoginScreen {
    pub fn new() -> Self {
        Self {
            form: Form::new(vec![
                FormField::new("username", "Username", FormFieldType::Text),
                FormField::new("password", "Password", FormFieldType::Password),
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
        let credentials = LoginForm {
            username: self.form.value("username").to_string(),
            password: self.form.value("password").to_string(),
        };
        match credentials.check() {
            Ok(()) => {
                self.error = None;
                self.state.start();
                self.queued = Some(credentials);
            }
            Err(invalid) => {
                self.form.set_error(&invalid.field, &invalid.message);
                self.error = Some(invalid.message);
            }
        }
    }
}

#[async_trait::async_trait]
impl Screen for LoginScreen {
    fn draw(&mut self, f: &mut Frame, area: Rect) {
        let area = centered_rect(60, 80, area);
        let block = Block::default()
            .title("Login")
            .borders(Borders::ALL)
            .border_style(Styles::active_border());
        let inner = block.inner(area);
        f.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(6), Constraint::Length(2), Constraint::Min(0)])
            .split(inner);

        self.form.render(f, chunks[0]);

        let line = if self.state.is_pending() {
            Line::from(Span::styled("Signing in...", Styles::info()))
        } else if let Some(ref error) = self.error {
            Line::from(Span::styled(error.clone(), Styles::error()))
        } else {
            Line::from(Span::styled(
                "Enter: sign in  Ctrl-R: create an account  Esc: back",
                Styles::inactive(),
            ))
        };
        f.render_widget(Paragraph::new(line), chunks[1]);
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> ScreenAction {
        match key.code {
            KeyCode::Esc => return ScreenAction::NavigateBack,
            KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return ScreenAction::NavigateTo(Route::Register);
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
        Route::Login
    }

    fn help(&self) -> &'static str {
        "Login:\n\
        Tab / ↑/↓ - Switch field\n\
        Enter - Next field, or sign in from the password\n\
        Ctrl+R - Register a new account\n\
        Esc - Back"
    }

    fn has_pending(&self) -> bool {
        self.queued.is_some()
    }

    async fn perform(&mut self, api: &ApiClient) -> ScreenAction {
        let Some(credentials) = self.queued.take() else {
            return ScreenAction::None;
        };
        match auth::login(api, &credentials).await {
            Ok(_) => {
                self.state.succeed(());
                ScreenAction::NavigateTo(Route::Profile)
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
    use serde_json::json;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(screen: &mut LoginScreen, text: &str) {
        for c in text.chars() {
            screen.handle_key_event(key(KeyCode::Char(c)));
        }
    }

    #[tokio::test]
    async fn test_login_then_bearer_on_next_request() {
        let mock = MockTransport::new()
            .respond("POST /api/Account/login", 200, json!({"token": "tok-123", "username": "ada"}))
            .respond("GET Film", 200, json!([]));
        let api = mock.client();

        let mut screen = LoginScreen::new();
        type_text(&mut screen, "ada");
        screen.handle_key_event(key(KeyCode::Enter));
        type_text(&mut screen, "pw");
        screen.handle_key_event(key(KeyCode::Enter));
        assert!(screen.has_pending());

        let action = screen.perform(&api).await;
        assert_eq!(action, ScreenAction::NavigateTo(Route::Profile));
        assert_eq!(api.session().username().as_deref(), Some("ada"));

        api.read_collection("Film").await.unwrap();
        let last = mock.requests().pop().unwrap();
        assert_eq!(last.bearer.as_deref(), Some("tok-123"));
    }

    #[tokio::test]
    async fn test_empty_username_rejected_locally() {
        let mock = MockTransport::new();
        let mut screen = LoginScreen::new();
        screen.handle_key_event(key(KeyCode::Tab));
        type_text(&mut screen, "pw");
        screen.handle_key_event(key(KeyCode::Enter));

        assert!(!screen.has_pending());
        assert_eq!(screen.error.as_deref(), Some("Please Enter Your Username"));
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn test_missing_token_message() {
        let mock = MockTransport::new().respond("POST /api/Account/login", 200, json!({}));
        let api = mock.client();
        let mut screen = LoginScreen::new();
        type_text(&mut screen, "ada");
        screen.handle_key_event(key(KeyCode::Tab));
        type_text(&mut screen, "pw");
        screen.handle_key_event(key(KeyCode::Enter));
        screen.perform(&api).await;
        assert_eq!(screen.error.as_deref(), Some("Login failed. Please try again."));
        assert!(!api.session().is_signed_in());
    }
}
