//! Form field component for user input

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::catalog::{EntityDescriptor, FieldKind, FormValues};
use crate::tui::{traits::FormHandler, ui::Styles};

/// Type of form field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormFieldType {
    Text,
    Number,
    Date,
    /// Path of a local file; only its name is ever submitted
    File,
    /// Rendered masked
    Password,
}

impl From<FieldKind> for FormFieldType {
    fn from(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Text => FormFieldType::Text,
            FieldKind::Number => FormFieldType::Number,
            FieldKind::Date => FormFieldType::Date,
            FieldKind::File => FormFieldType::File,
        }
    }
}

/// Individual form field
#[derive(Debug, Clone)]
pub struct FormField {
    /// Wire key the value is stored under
    pub key: String,
    pub label: String,
    pub value: String,
    pub placeholder: String,
    pub field_type: FormFieldType,
    pub required: bool,
    pub is_focused: bool,
    /// Cursor position in characters
    pub cursor_position: usize,
    pub validation_error: Option<String>,
}

impl FormField {
    pub fn new(key: &str, label: &str, field_type: FormFieldType) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            value: String::new(),
            placeholder: String::new(),
            field_type,
            required: true,
            is_focused: false,
            cursor_position: 0,
            validation_error: None,
        }
    }

    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = placeholder.to_string();
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn set_value(&mut self, value: &str) {
        self.value = value.to_string();
        self.cursor_position = self.value.chars().count();
        self.validation_error = None;
    }

    pub fn set_focus(&mut self, focused: bool) {
        self.is_focused = focused;
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    fn char_count(&self) -> usize {
        self.value.chars().count()
    }

    pub fn insert_char(&mut self, c: char) {
        let at = self.byte_index(self.cursor_position);
        self.value.insert(at, c);
        self.cursor_position += 1;
        self.validation_error = None;
    }

    pub fn delete_char(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
            let at = self.byte_index(self.cursor_position);
            self.value.remove(at);
            self.validation_error = None;
        }
    }

    pub fn delete_char_forward(&mut self) {
        if self.cursor_position < self.char_count() {
            let at = self.byte_index(self.cursor_position);
            self.value.remove(at);
            self.validation_error = None;
        }
    }

    pub fn move_cursor_left(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
        }
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_position < self.char_count() {
            self.cursor_position += 1;
        }
    }

    pub fn move_cursor_to_start(&mut self) {
        self.cursor_position = 0;
    }

    pub fn move_cursor_to_end(&mut self) {
        self.cursor_position = self.char_count();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor_position = 0;
        self.validation_error = None;
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Text as shown on screen
    pub fn display_value(&self) -> String {
        match self.field_type {
            FormFieldType::Password => "*".repeat(self.char_count()),
            _ => self.value.clone(),
        }
    }

    /// Render the form field
    pub fn render(&self, f: &mut Frame, area: Rect) {
        let showing_placeholder = self.value.is_empty() && !self.placeholder.is_empty();
        let display_text = if showing_placeholder {
            self.placeholder.clone()
        } else {
            self.display_value()
        };

        let border_style = if self.validation_error.is_some() {
            Styles::error()
        } else if self.is_focused {
            Styles::active_border()
        } else {
            Styles::inactive_border()
        };

        let marker = if self.required { " *" } else { "" };
        let title = if let Some(ref error) = self.validation_error {
            format!("{}{} - {}", self.label, marker, error)
        } else {
            format!("{}{}", self.label, marker)
        };

        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border_style);

        let text_style = if showing_placeholder {
            Styles::inactive()
        } else {
            Styles::default()
        };

        let paragraph = Paragraph::new(display_text).style(text_style).block(block);
        f.render_widget(paragraph, area);

        if self.is_focused {
            let before: String = self.display_value().chars().take(self.cursor_position).collect();
            let cursor_x = area.x + 1 + before.width() as u16;
            let cursor_y = area.y + 1;
            if cursor_x < area.x + area.width.saturating_sub(1) {
                f.set_cursor(cursor_x, cursor_y);
            }
        }
    }
}

/// Form container that manages multiple fields
pub struct Form {
    pub fields: Vec<FormField>,
    pub current_field: usize,
}

impl Form {
    pub fn new(fields: Vec<FormField>) -> Self {
        let mut form = Self {
            fields,
            current_field: 0,
        };
        form.update_focus();
        form
    }

    /// One field per descriptor field, in descriptor order
    pub fn for_entity(descriptor: &EntityDescriptor) -> Self {
        let fields = descriptor
            .fields
            .iter()
            .map(|spec| {
                let field = FormField::new(spec.key, spec.label, spec.kind.into());
                let field = match spec.kind {
                    FieldKind::Date => field.with_placeholder("YYYY-MM-DD"),
                    FieldKind::File => field.with_placeholder("path/to/poster.jpg"),
                    _ => field,
                };
                if spec.required {
                    field
                } else {
                    field.optional()
                }
            })
            .collect();
        Self::new(fields)
    }

    fn update_focus(&mut self) {
        for (i, field) in self.fields.iter_mut().enumerate() {
            field.set_focus(i == self.current_field);
        }
    }

    pub fn get_current_field_mut(&mut self) -> Option<&mut FormField> {
        self.fields.get_mut(self.current_field)
    }

    pub fn value(&self, key: &str) -> &str {
        self.fields
            .iter()
            .find(|f| f.key == key)
            .map(|f| f.value.as_str())
            .unwrap_or("")
    }

    pub fn set_value(&mut self, key: &str, value: &str) {
        if let Some(field) = self.fields.iter_mut().find(|f| f.key == key) {
            field.set_value(value);
        }
    }

    /// Current text of every field
    pub fn values(&self) -> FormValues {
        let mut values = FormValues::new();
        for field in &self.fields {
            values.set(&field.key, field.value.clone());
        }
        values
    }

    /// Replace every field's text from loaded values
    pub fn load(&mut self, values: &FormValues) {
        for field in &mut self.fields {
            field.set_value(values.get(&field.key));
        }
    }

    /// Mark one field invalid and move focus to it
    pub fn set_error(&mut self, key: &str, message: &str) {
        if let Some(index) = self.fields.iter().position(|f| f.key == key) {
            self.fields[index].validation_error = Some(message.to_string());
            self.set_current_field(index);
        }
    }

    pub fn clear_errors(&mut self) {
        for field in &mut self.fields {
            field.validation_error = None;
        }
    }

    /// Apply a text editing key to the focused field. Returns `false` for keys
    /// that are not editing keys.
    pub fn handle_edit_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char(c) => self.handle_char_input(c),
            KeyCode::Backspace => self.handle_backspace(),
            KeyCode::Delete => self.handle_delete(),
            KeyCode::Left => {
                if let Some(field) = self.get_current_field_mut() {
                    field.move_cursor_left();
                }
            }
            KeyCode::Right => {
                if let Some(field) = self.get_current_field_mut() {
                    field.move_cursor_right();
                }
            }
            KeyCode::Home => {
                if let Some(field) = self.get_current_field_mut() {
                    field.move_cursor_to_start();
                }
            }
            KeyCode::End => {
                if let Some(field) = self.get_current_field_mut() {
                    field.move_cursor_to_end();
                }
            }
            _ => return false,
        }
        true
    }

    /// Render fields stacked vertically, scrolling to keep focus visible
    pub fn render(&self, f: &mut Frame, area: Rect) {
        const FIELD_HEIGHT: u16 = 3;
        let capacity = ((area.height / FIELD_HEIGHT) as usize).max(1);
        let first = if self.current_field >= capacity {
            self.current_field + 1 - capacity
        } else {
            0
        };
        let shown: Vec<&FormField> = self.fields.iter().skip(first).take(capacity).collect();

        let mut constraints: Vec<Constraint> = shown
            .iter()
            .map(|_| Constraint::Length(FIELD_HEIGHT))
            .collect();
        constraints.push(Constraint::Min(0));

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        for (field, chunk) in shown.iter().zip(chunks.iter()) {
            field.render(f, *chunk);
        }
    }
}

impl FormHandler for Form {
    fn get_current_field(&self) -> usize {
        self.current_field
    }

    fn set_current_field(&mut self, field: usize) {
        if field < self.fields.len() {
            self.current_field = field;
            self.update_focus();
        }
    }

    fn get_field_count(&self) -> usize {
        self.fields.len()
    }

    fn handle_char_input(&mut self, c: char) {
        if let Some(field) = self.get_current_field_mut() {
            field.insert_char(c);
        }
    }

    fn handle_backspace(&mut self) {
        if let Some(field) = self.get_current_field_mut() {
            field.delete_char();
        }
    }

    fn handle_delete(&mut self) {
        if let Some(field) = self.get_current_field_mut() {
            field.delete_char_forward();
        }
    }
}
