//! Generic list screen: one table per catalog entity, with delete

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tracing::error;

use crate::api::ApiClient;
use crate::catalog::{crud, EntityDescriptor, EntityKind};
use crate::models::{record_id, RecordId};
use crate::tui::{
    app::Route,
    components::DataTable,
    request_state::RequestState,
    traits::{Navigable, Paginated, Screen, ScreenAction},
    ui::Styles,
};

#[derive(Debug, Clone, Copy, PartialEq)]
enum ListTask {
    Load,
    Delete(RecordId),
}

/// List screen state
pub struct EntityListScreen {
    pub kind: EntityKind,
    pub table: DataTable,
    /// Holds the number of loaded rows once the fetch succeeded
    pub state: RequestState<usize>,
    queued: Option<ListTask>,
    pub editing_filter: bool,
    /// Record awaiting a y/n answer before it is deleted
    pub confirm_delete: Option<RecordId>,
}

impl EntityListScreen {
    /// New list screen; the collection fetch is queued immediately
    pub fn new(kind: EntityKind, page_size: usize) -> Self {
        let table = DataTable::new(kind.descriptor().columns.to_vec()).with_page_size(page_size);
        let mut screen = Self {
            kind,
            table,
            state: RequestState::default(),
            queued: None,
            editing_filter: false,
            confirm_delete: None,
        };
        screen.queue(ListTask::Load);
        screen
    }

    fn descriptor(&self) -> &'static EntityDescriptor {
        self.kind.descriptor()
    }

    fn queue(&mut self, task: ListTask) -> bool {
        if !self.state.start() {
            return false;
        }
        self.queued = Some(task);
        true
    }

    fn selected_id(&self) -> Option<RecordId> {
        self.table
            .selected_record()
            .and_then(|record| record_id(record, self.descriptor().key_field))
    }

    async fn load(&mut self, api: &ApiClient) -> ScreenAction {
        let descriptor = self.descriptor();
        match crud::fetch_all(api, descriptor).await {
            Ok(records) => {
                let count = records.len();
                self.table.set_records(records);
                self.state.succeed(count);
                ScreenAction::SetStatus(format!("Loaded {} {}", count, descriptor.title.to_lowercase()))
            }
            Err(e) => {
                error!("Failed to fetch {}: {}", descriptor.title, e);
                self.table.set_records(Vec::new());
                let message = format!("Failed to load {}: {}", descriptor.title.to_lowercase(), e);
                self.state.fail(message.clone());
                ScreenAction::SetError(message)
            }
        }
    }

    async fn delete(&mut self, api: &ApiClient, id: RecordId) -> ScreenAction {
        let descriptor = self.descriptor();
        let action = match crud::delete(api, descriptor, id).await {
            Ok(true) => {
                self.table.remove_by_id(descriptor.key_field, id);
                ScreenAction::SetStatus(format!("Deleted {} {}", descriptor.singular, id))
            }
            Ok(false) => ScreenAction::SetError(format!(
                "The server did not confirm deleting {} {}",
                descriptor.singular, id
            )),
            Err(e) => {
                error!("Failed to delete {} {}: {}", descriptor.singular, id, e);
                ScreenAction::SetError(
                    e.user_message(&format!("Failed to delete {}.", descriptor.singular)),
                )
            }
        };
        self.state.succeed(self.table.len());
        action
    }

    fn handle_filter_key(&mut self, key: KeyEvent) -> ScreenAction {
        match key.code {
            KeyCode::Char(c) => self.table.push_filter_char(c),
            KeyCode::Backspace => self.table.pop_filter_char(),
            KeyCode::Enter => self.editing_filter = false,
            KeyCode::Esc => {
                self.table.set_filter("");
                self.editing_filter = false;
            }
            _ => {}
        }
        ScreenAction::None
    }

    fn handle_confirm_key(&mut self, key: KeyEvent, id: RecordId) -> ScreenAction {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                self.confirm_delete = None;
                self.queue(ListTask::Delete(id));
                ScreenAction::None
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.confirm_delete = None;
                ScreenAction::SetStatus("Delete cancelled".to_string())
            }
            _ => ScreenAction::None,
        }
    }

    fn draw_header(&self, f: &mut Frame, area: Rect) {
        let descriptor = self.descriptor();
        let line = if let Some(id) = self.confirm_delete {
            Line::from(Span::styled(
                format!("Delete {} {}? (y/n)", descriptor.singular, id),
                Styles::warning(),
            ))
        } else if self.editing_filter {
            Line::from(vec![
                Span::styled("Filter: ", Styles::info()),
                Span::raw(self.table.filter().to_string()),
                Span::styled("_", Styles::active_border()),
            ])
        } else if self.state.is_pending() {
            Line::from(Span::styled("Loading...", Styles::info()))
        } else if let Some(message) = self.state.error() {
            Line::from(Span::styled(message.to_string(), Styles::error()))
        } else {
            Line::from(Span::styled(
                "a: add  e/Enter: edit  d: delete  /: filter  </>: column  s: sort  r: reload",
                Styles::inactive(),
            ))
        };

        let header = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        f.render_widget(header, area);
    }
}

#[async_trait::async_trait]
impl Screen for EntityListScreen {
    fn draw(&mut self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        self.draw_header(f, chunks[0]);
        let title = self.descriptor().title;
        self.table.render(f, chunks[1], title);
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> ScreenAction {
        if let Some(id) = self.confirm_delete {
            return self.handle_confirm_key(key, id);
        }
        if self.editing_filter {
            return self.handle_filter_key(key);
        }

        match key.code {
            KeyCode::Up => self.table.navigate_up(),
            KeyCode::Down => self.table.navigate_down(),
            KeyCode::Left | KeyCode::PageUp => self.table.previous_page(),
            KeyCode::Right | KeyCode::PageDown => self.table.next_page(),
            KeyCode::Home => self.table.go_to_first_page(),
            KeyCode::End => self.table.go_to_last_page(),
            KeyCode::Char('<') => self.table.previous_sort_column(),
            KeyCode::Char('>') => self.table.next_sort_column(),
            KeyCode::Char('s') => {
                if !self.table.cycle_sort() {
                    let header = self
                        .table
                        .columns()
                        .get(self.table.sort_cursor())
                        .map(|c| c.header)
                        .unwrap_or("");
                    return ScreenAction::SetStatus(format!("{} is not sortable", header));
                }
            }
            KeyCode::Char('/') => self.editing_filter = true,
            KeyCode::Char('a') => return ScreenAction::NavigateTo(Route::Add(self.kind)),
            KeyCode::Char('e') | KeyCode::Enter => {
                return match self.selected_id() {
                    Some(id) => ScreenAction::NavigateTo(Route::Edit(self.kind, id)),
                    None => ScreenAction::SetError("No record selected".to_string()),
                };
            }
            KeyCode::Char('d') => {
                if self.state.is_pending() {
                    return ScreenAction::None;
                }
                match self.selected_id() {
                    Some(id) => self.confirm_delete = Some(id),
                    None => return ScreenAction::SetError("No record selected".to_string()),
                }
            }
            KeyCode::Char('r') => {
                self.queue(ListTask::Load);
            }
            KeyCode::Esc => return ScreenAction::NavigateBack,
            _ => {}
        }
        ScreenAction::None
    }

    fn route(&self) -> Route {
        Route::List(self.kind)
    }

    fn help(&self) -> &'static str {
        "List:\n\
        ↑/↓ - Select row\n\
        ←/→ or Page Up/Down - Previous/next page\n\
        Home/End - First/last page\n\
        </> - Choose sort column\n\
        s - Sort ascending, descending, off\n\
        / - Filter (Enter keeps, Esc clears)\n\
        a - Add\n\
        e / Enter - Edit selected\n\
        d - Delete selected (asks y/n)\n\
        r - Reload"
    }

    fn has_pending(&self) -> bool {
        self.queued.is_some()
    }

    async fn perform(&mut self, api: &ApiClient) -> ScreenAction {
        match self.queued.take() {
            Some(ListTask::Load) => self.load(api).await,
            Some(ListTask::Delete(id)) => self.delete(api, id).await,
            None => ScreenAction::None,
        }
    }

    fn captures_text(&self) -> bool {
        self.editing_filter || self.confirm_delete.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockTransport;
    use crossterm::event::KeyModifiers;
    use ratatui::{backend::TestBackend, Terminal};
    use reqwest::Method;
    use serde_json::json;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn films() -> serde_json::Value {
        json!([
            {"filmID": 1, "nom": "Playtime", "dateCreated": 1967, "duree": 124, "poster": "playtime.jpg"},
            {"filmID": 2, "nom": "Mon Oncle", "dateCreated": 1958, "duree": 110, "poster": "oncle.png"},
            {"filmID": 3, "nom": "Trafic", "dateCreated": 1971, "duree": 96, "poster": "trafic.jpg"}
        ])
    }

    async fn loaded(mock: &MockTransport) -> (EntityListScreen, ApiClient) {
        let api = mock.client();
        let mut screen = EntityListScreen::new(EntityKind::Film, 10);
        assert!(screen.has_pending());
        screen.perform(&api).await;
        (screen, api)
    }

    #[tokio::test]
    async fn test_row_count_matches_fetch() {
        let mock = MockTransport::new().respond("GET Film", 200, films());
        let (screen, _) = loaded(&mock).await;
        assert_eq!(screen.table.len(), 3);
        assert_eq!(screen.table.page_records().len(), 3);
        assert_eq!(screen.state.value(), Some(&3));
        assert!(!screen.has_pending());
    }

    #[tokio::test]
    async fn test_load_failure_leaves_empty_table() {
        let mock = MockTransport::new().respond("GET Film", 500, json!({"message": "down"}));
        let (screen, _) = loaded(&mock).await;
        assert!(screen.table.is_empty());
        assert!(screen.state.error().unwrap().contains("down"));
    }

    #[tokio::test]
    async fn test_delete_removes_one_row() {
        let mock = MockTransport::new()
            .respond("GET Film", 200, films())
            .respond_empty("DELETE Film/2", 204);
        let (mut screen, api) = loaded(&mock).await;

        screen.handle_key_event(key(KeyCode::Down));
        screen.handle_key_event(key(KeyCode::Char('d')));
        assert_eq!(screen.confirm_delete, Some(2));
        assert!(!screen.has_pending(), "nothing is sent before confirmation");

        screen.handle_key_event(key(KeyCode::Char('y')));
        let action = screen.perform(&api).await;
        assert_eq!(action, ScreenAction::SetStatus("Deleted film 2".to_string()));

        assert_eq!(mock.count(Method::DELETE), 1);
        assert_eq!(mock.requests().last().unwrap().path, "Film/2");
        assert_eq!(screen.table.len(), 2);
        assert!(screen
            .table
            .records()
            .iter()
            .all(|r| record_id(r, "filmID") != Some(2)));
    }

    #[tokio::test]
    async fn test_delete_with_other_success_status_keeps_row() {
        let mock = MockTransport::new()
            .respond("GET Film", 200, films())
            .respond_empty("DELETE Film/1", 200);
        let (mut screen, api) = loaded(&mock).await;

        screen.handle_key_event(key(KeyCode::Char('d')));
        screen.handle_key_event(key(KeyCode::Char('y')));
        let action = screen.perform(&api).await;
        assert!(matches!(action, ScreenAction::SetError(_)));
        assert_eq!(screen.table.len(), 3);
    }

    #[tokio::test]
    async fn test_delete_cancelled() {
        let mock = MockTransport::new().respond("GET Film", 200, films());
        let (mut screen, _) = loaded(&mock).await;
        screen.handle_key_event(key(KeyCode::Char('d')));
        assert!(screen.captures_text());
        screen.handle_key_event(key(KeyCode::Char('n')));
        assert!(screen.confirm_delete.is_none());
        assert_eq!(mock.count(Method::DELETE), 0);
    }

    #[tokio::test]
    async fn test_edit_and_add_routes() {
        let mock = MockTransport::new().respond("GET Film", 200, films());
        let (mut screen, _) = loaded(&mock).await;
        assert_eq!(
            screen.handle_key_event(key(KeyCode::Enter)),
            ScreenAction::NavigateTo(Route::Edit(EntityKind::Film, 1))
        );
        assert_eq!(
            screen.handle_key_event(key(KeyCode::Char('a'))),
            ScreenAction::NavigateTo(Route::Add(EntityKind::Film))
        );
    }

    #[tokio::test]
    async fn test_filter_typing() {
        let mock = MockTransport::new().respond("GET Film", 200, films());
        let (mut screen, _) = loaded(&mock).await;
        screen.handle_key_event(key(KeyCode::Char('/')));
        for c in "oncle".chars() {
            screen.handle_key_event(key(KeyCode::Char(c)));
        }
        screen.handle_key_event(key(KeyCode::Enter));
        assert!(!screen.editing_filter);
        assert_eq!(screen.table.visible_len(), 1);
    }

    #[tokio::test]
    async fn test_reload_ignored_while_pending() {
        let mut screen = EntityListScreen::new(EntityKind::Actor, 10);
        screen.handle_key_event(key(KeyCode::Char('r')));
        assert_eq!(screen.queued, Some(ListTask::Load));
    }

    #[tokio::test]
    async fn test_draw_while_loading() {
        let mut screen = EntityListScreen::new(EntityKind::Category, 10);
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal
            .draw(|f| {
                let area = f.size();
                screen.draw(f, area)
            })
            .unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Loading..."));
        assert!(text.contains("No records"));
    }
}
