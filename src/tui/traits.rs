//! Core traits for the cineadmin TUI
//!
//! Every screen implements [`Screen`]; lists and forms share the
//! [`Navigable`], [`Paginated`] and [`FormHandler`] behaviour.

use crossterm::event::KeyEvent;
use ratatui::{layout::Rect, Frame};

use crate::api::ApiClient;
use crate::tui::app::Route;

/// Actions that can be returned from screen event handling
#[derive(Debug, Clone, PartialEq)]
pub enum ScreenAction {
    /// Navigate to a different route
    NavigateTo(Route),
    /// Go back to the previous route
    NavigateBack,
    /// Quit the application
    Quit,
    /// Set status message
    SetStatus(String),
    /// Set error message
    SetError(String),
    /// Clear messages
    ClearMessages,
    /// No action taken
    None,
}

/// Core trait for all TUI screens
#[async_trait::async_trait]
pub trait Screen: Send {
    /// Draw the screen content
    fn draw(&mut self, f: &mut Frame, area: Rect);

    /// Handle keyboard input and return an action for the app
    fn handle_key_event(&mut self, key: KeyEvent) -> ScreenAction;

    /// Route this screen was opened for
    fn route(&self) -> Route;

    /// Context help shown in the help popup
    fn help(&self) -> &'static str;

    /// Whether a network call is queued and waiting for [`Screen::perform`]
    fn has_pending(&self) -> bool {
        false
    }

    /// Run the queued network call. The app draws the pending state before
    /// calling this and calls it at most once per loop iteration.
    async fn perform(&mut self, _api: &ApiClient) -> ScreenAction {
        ScreenAction::None
    }

    /// True while typed characters belong to a text input, so global single
    /// letter shortcuts must not fire
    fn captures_text(&self) -> bool {
        false
    }
}

/// Trait for screens with navigable lists
pub trait Navigable {
    /// Move selection up
    fn navigate_up(&mut self);

    /// Move selection down
    fn navigate_down(&mut self);

    /// Get currently selected index
    fn get_selected_index(&self) -> Option<usize>;

    /// Set selected index
    fn set_selected_index(&mut self, index: Option<usize>);

    /// Get total number of items
    fn get_item_count(&self) -> usize;

    /// Navigate to first item
    fn navigate_to_first(&mut self) {
        if self.get_item_count() > 0 {
            self.set_selected_index(Some(0));
        }
    }

    /// Navigate to last item
    fn navigate_to_last(&mut self) {
        let count = self.get_item_count();
        if count > 0 {
            self.set_selected_index(Some(count - 1));
        }
    }
}

/// Trait for paginated content
pub trait Paginated {
    /// Get current page number (0-based)
    fn get_current_page(&self) -> usize;

    /// Set current page
    fn set_current_page(&mut self, page: usize);

    /// Get total number of pages
    fn get_total_pages(&self) -> usize;

    /// Get items per page
    fn get_items_per_page(&self) -> usize;

    /// Go to next page
    fn next_page(&mut self) {
        let current = self.get_current_page();
        let total = self.get_total_pages();
        if current + 1 < total {
            self.set_current_page(current + 1);
        }
    }

    /// Go to previous page
    fn previous_page(&mut self) {
        let current = self.get_current_page();
        if current > 0 {
            self.set_current_page(current - 1);
        }
    }

    /// Go to first page
    fn go_to_first_page(&mut self) {
        self.set_current_page(0);
    }

    /// Go to last page
    fn go_to_last_page(&mut self) {
        let total = self.get_total_pages();
        if total > 0 {
            self.set_current_page(total - 1);
        }
    }
}

/// Trait for form handling
pub trait FormHandler {
    /// Get current field index
    fn get_current_field(&self) -> usize;

    /// Set current field
    fn set_current_field(&mut self, field: usize);

    /// Get total number of fields
    fn get_field_count(&self) -> usize;

    /// Move to next field
    fn next_field(&mut self) {
        let total = self.get_field_count();
        if total > 0 {
            self.set_current_field((self.get_current_field() + 1) % total);
        }
    }

    /// Move to previous field
    fn previous_field(&mut self) {
        let current = self.get_current_field();
        let total = self.get_field_count();
        if total > 0 {
            self.set_current_field(if current == 0 { total - 1 } else { current - 1 });
        }
    }

    /// Whether focus is on the last field
    fn is_last_field(&self) -> bool {
        self.get_current_field() + 1 >= self.get_field_count()
    }

    /// Handle character input for current field
    fn handle_char_input(&mut self, c: char);

    /// Handle backspace for current field
    fn handle_backspace(&mut self);

    /// Handle delete for current field
    fn handle_delete(&mut self);
}
