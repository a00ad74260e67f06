//! Generic add/edit screen for one catalog entity

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use serde_json::Value;
use tracing::{error, warn};

use crate::api::ApiClient;
use crate::catalog::{crud, EntityDescriptor, EntityKind, FormValues};
use crate::models::RecordId;
use crate::tui::{
    app::Route,
    components::Form,
    request_state::RequestState,
    traits::{FormHandler, Screen, ScreenAction},
    ui::Styles,
};

/// Whether the form creates a new record or edits an existing one
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormMode {
    Add,
    Edit(RecordId),
}

#[derive(Debug, Clone, PartialEq)]
enum FormTask {
    Load,
    Submit(Value),
}

pub struct EntityFormScreen {
    pub kind: EntityKind,
    pub mode: FormMode,
    pub form: Form,
    /// Fetch of the record being edited; `Success` straight away in add mode
    pub load: RequestState<()>,
    pub submit: RequestState<()>,
    /// Values as fetched, in edit mode
    loaded: Option<FormValues>,
    queued: Option<FormTask>,
    /// Single error line shown under the form
    pub error: Option<String>,
}

impl EntityFormScreen {
    pub fn add(kind: EntityKind) -> Self {
        let mut load = RequestState::default();
        load.succeed(());
        Self {
            kind,
            mode: FormMode::Add,
            form: Form::for_entity(kind.descriptor()),
            load,
            submit: RequestState::default(),
            loaded: None,
            queued: None,
            error: None,
        }
    }

    /// Edit screen; the record fetch is queued immediately
    pub fn edit(kind: EntityKind, id: RecordId) -> Self {
        let mut load = RequestState::default();
        load.start();
        Self {
            kind,
            mode: FormMode::Edit(id),
            form: Form::for_entity(kind.descriptor()),
            load,
            submit: RequestState::default(),
            loaded: None,
            queued: Some(FormTask::Load),
            error: None,
        }
    }

    fn descriptor(&self) -> &'static EntityDescriptor {
        self.kind.descriptor()
    }

    /// Validate and queue the create/update call. Invalid input never
    /// reaches the network.
    pub fn submit(&mut self) {
        if self.submit.is_pending() || !self.load.is_success() {
            return;
        }

        self.form.clear_errors();
        let values: FormValues = self.form.values();
        let payload = match &self.loaded {
            Some(loaded) => values.to_update_payload(self.descriptor(), loaded),
            None => values.to_payload(self.descriptor()),
        };
        match payload {
            Ok(body) => {
                self.error = None;
                self.submit.start();
                self.queued = Some(FormTask::Submit(body));
            }
            Err(invalid) => {
                self.form.set_error(&invalid.field, &invalid.message);
                self.error = Some(invalid.message);
            }
        }
    }

    async fn load_record(&mut self, api: &ApiClient, id: RecordId) -> ScreenAction {
        let descriptor = self.descriptor();
        match crud::fetch_one(api, descriptor, id).await {
            Ok(record) => {
                let values = FormValues::from_record(descriptor, &record);
                self.form.load(&values);
                self.loaded = Some(values);
                self.load.succeed(());
                ScreenAction::ClearMessages
            }
            Err(e) => {
                error!("Failed to load {} {}: {}", descriptor.singular, id, e);
                let message = format!("Failed to load {} data.", descriptor.singular);
                self.load.fail(message.clone());
                self.error = Some(message.clone());
                ScreenAction::SetError(message)
            }
        }
    }

    async fn send(&mut self, api: &ApiClient, body: Value) -> ScreenAction {
        let descriptor = self.descriptor();
        let (result, fallback) = match self.mode {
            FormMode::Add => (
                crud::create(api, descriptor, &body).await,
                format!("Failed to add {}. Please try again.", descriptor.singular),
            ),
            FormMode::Edit(id) => (
                crud::update(api, descriptor, id, &body).await,
                format!("Failed to update {}. Please try again.", descriptor.singular),
            ),
        };

        match result {
            Ok(()) => {
                self.submit.succeed(());
                ScreenAction::NavigateTo(Route::List(self.kind))
            }
            Err(e) => {
                warn!("Saving {} failed: {}", descriptor.singular, e);
                let message = e.user_message(&fallback);
                self.submit.fail(message.clone());
                self.error = Some(message);
                ScreenAction::None
            }
        }
    }

    fn title(&self) -> String {
        let descriptor = self.descriptor();
        match self.mode {
            FormMode::Add => format!("Add {}", descriptor.singular),
            FormMode::Edit(id) => format!("Edit {} {}", descriptor.singular, id),
        }
    }

    fn draw_footer(&self, f: &mut Frame, area: Rect) {
        let line = if self.load.is_pending() {
            Line::from(Span::styled("Loading...", Styles::info()))
        } else if self.submit.is_pending() {
            Line::from(Span::styled("Saving...", Styles::info()))
        } else if let Some(ref error) = self.error {
            Line::from(Span::styled(error.clone(), Styles::error()))
        } else {
            Line::from(Span::styled(
                "Tab/↑/↓: move  Enter on last field or Ctrl-S: save  Esc: cancel",
                Styles::inactive(),
            ))
        };
        let footer = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        f.render_widget(footer, area);
    }
}

#[async_trait::async_trait]
impl Screen for EntityFormScreen {
    fn draw(&mut self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(area);

        let block = Block::default()
            .title(self.title())
            .borders(Borders::ALL)
            .border_style(Styles::active_border());
        let inner = block.inner(chunks[0]);
        f.render_widget(block, chunks[0]);

        if self.load.is_success() {
            self.form.render(f, inner);
        }
        self.draw_footer(f, chunks[1]);
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> ScreenAction {
        if key.code == KeyCode::Esc {
            return ScreenAction::NavigateBack;
        }
        if !self.load.is_success() {
            return ScreenAction::None;
        }

        match key.code {
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
        match self.mode {
            FormMode::Add => Route::Add(self.kind),
            FormMode::Edit(id) => Route::Edit(self.kind, id),
        }
    }

    fn help(&self) -> &'static str {
        "Form:\n\
        Tab / ↓ - Next field\n\
        Shift+Tab / ↑ - Previous field\n\
        Enter - Next field, or save on the last one\n\
        Ctrl+S - Save\n\
        ←/→ Home/End - Move cursor\n\
        Esc - Cancel"
    }

    fn has_pending(&self) -> bool {
        self.queued.is_some()
    }

    async fn perform(&mut self, api: &ApiClient) -> ScreenAction {
        match (self.queued.take(), self.mode) {
            (Some(FormTask::Load), FormMode::Edit(id)) => self.load_record(api, id).await,
            (Some(FormTask::Submit(body)), _) => self.send(api, body).await,
            _ => ScreenAction::None,
        }
    }

    fn captures_text(&self) -> bool {
        self.load.is_success()
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

    fn ctrl_s() -> KeyEvent {
        KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL)
    }

    fn type_text(screen: &mut EntityFormScreen, text: &str) {
        for c in text.chars() {
            screen.handle_key_event(key(KeyCode::Char(c)));
        }
    }

    #[tokio::test]
    async fn test_missing_field_blocks_request() {
        let mock = MockTransport::new();
        let mut screen = EntityFormScreen::add(EntityKind::Actor);
        type_text(&mut screen, "Delon");
        screen.handle_key_event(key(KeyCode::Tab));
        type_text(&mut screen, "Alain");
        screen.handle_key_event(ctrl_s());

        assert!(!screen.has_pending());
        assert_eq!(
            screen.error.as_deref(),
            Some("Please fill out the nationalite field.")
        );
        assert_eq!(screen.form.get_current_field(), 2);
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn test_add_sends_one_create_and_navigates() {
        let mock = MockTransport::new().respond("POST Categories", 201, json!({"categorieID": 4}));
        let api = mock.client();
        let mut screen = EntityFormScreen::add(EntityKind::Category);
        type_text(&mut screen, "Policier");
        screen.handle_key_event(key(KeyCode::Enter));
        assert!(screen.submit.is_pending());

        // a second submit while pending is ignored
        screen.handle_key_event(key(KeyCode::Enter));

        let action = screen.perform(&api).await;
        assert_eq!(action, ScreenAction::NavigateTo(Route::List(EntityKind::Category)));
        assert_eq!(mock.count(Method::POST), 1);
        assert_eq!(mock.requests()[0].body, Some(json!({"nom": "Policier"})));
    }

    #[tokio::test]
    async fn test_add_failure_keeps_values() {
        let mock = MockTransport::new().respond("POST langues", 400, json!({}));
        let api = mock.client();
        let mut screen = EntityFormScreen::add(EntityKind::Language);
        type_text(&mut screen, "Occitan");
        screen.handle_key_event(ctrl_s());

        let action = screen.perform(&api).await;
        assert_eq!(action, ScreenAction::None);
        assert_eq!(
            screen.error.as_deref(),
            Some("Failed to add language. Please try again.")
        );
        assert_eq!(screen.form.value("langues"), "Occitan");
    }

    #[tokio::test]
    async fn test_add_failure_uses_server_message() {
        let mock = MockTransport::new()
            .respond("POST langues", 409, json!({"message": "Language already exists"}));
        let api = mock.client();
        let mut screen = EntityFormScreen::add(EntityKind::Language);
        type_text(&mut screen, "Français");
        screen.handle_key_event(ctrl_s());
        screen.perform(&api).await;
        assert_eq!(screen.error.as_deref(), Some("Language already exists"));
    }

    #[tokio::test]
    async fn test_edit_shows_calendar_date_and_resends_it() {
        let mock = MockTransport::new()
            .respond(
                "GET Acteurs/7",
                200,
                json!({
                    "acteurID": 7,
                    "nom": "Moreau",
                    "prenom": "Jeanne",
                    "nationalite": "French",
                    "date_naissance": "1928-01-23T00:00:00"
                }),
            )
            .respond_empty("PUT Acteurs/7", 200);
        let api = mock.client();

        let mut screen = EntityFormScreen::edit(EntityKind::Actor, 7);
        assert!(screen.load.is_pending());
        assert!(screen.has_pending());
        screen.perform(&api).await;
        assert_eq!(screen.form.value("date_naissance"), "1928-01-23");

        screen.handle_key_event(ctrl_s());
        let action = screen.perform(&api).await;
        assert_eq!(action, ScreenAction::NavigateTo(Route::List(EntityKind::Actor)));

        let put = mock.requests().pop().unwrap();
        assert_eq!(put.method, Method::PUT);
        assert_eq!(put.body.unwrap()["date_naissance"], "1928-01-23");
    }

    #[tokio::test]
    async fn test_edit_saves_film_with_stored_poster() {
        let mock = MockTransport::new()
            .respond(
                "GET Film/5",
                200,
                json!({
                    "filmID": 5,
                    "nom": "Playtime",
                    "description": "Hulot in Paris",
                    "dateCreated": 1967,
                    "duree": 124,
                    "poster": "cover.webp",
                    "categorieID": 1,
                    "acteurPID": 2,
                    "acteurSID": null,
                    "editeurID": 3,
                    "langueID": 1,
                    "realisateurID": 4
                }),
            )
            .respond_empty("PUT Film/5", 200);
        let api = mock.client();

        let mut screen = EntityFormScreen::edit(EntityKind::Film, 5);
        screen.perform(&api).await;
        screen.handle_key_event(ctrl_s());
        assert_eq!(screen.error, None);

        let action = screen.perform(&api).await;
        assert_eq!(action, ScreenAction::NavigateTo(Route::List(EntityKind::Film)));
        let put = mock.requests().pop().unwrap();
        assert_eq!(put.body.unwrap()["poster"], "cover.webp");
    }

    #[tokio::test]
    async fn test_edit_load_failure() {
        let mock = MockTransport::new();
        let api = mock.client();
        let mut screen = EntityFormScreen::edit(EntityKind::Editor, 12);
        let action = screen.perform(&api).await;
        assert_eq!(
            action,
            ScreenAction::SetError("Failed to load editor data.".to_string())
        );

        // nothing to submit from a form that never loaded
        screen.handle_key_event(ctrl_s());
        assert!(!screen.has_pending());
    }

    #[tokio::test]
    async fn test_edit_failure_keeps_edits() {
        let mock = MockTransport::new()
            .respond("GET Categories/2", 200, json!({"categorieID": 2, "nom": "Drame"}))
            .respond("PUT Categories/2", 500, json!({}));
        let api = mock.client();
        let mut screen = EntityFormScreen::edit(EntityKind::Category, 2);
        screen.perform(&api).await;

        type_text(&mut screen, "s");
        screen.handle_key_event(ctrl_s());
        screen.perform(&api).await;
        assert_eq!(
            screen.error.as_deref(),
            Some("Failed to update category. Please try again.")
        );
        assert_eq!(screen.form.value("nom"), "Drames");
    }
}
