//! Generic data table: client-side pagination, sorting and global filtering
//! over any record array, driven by a column specification

use std::cmp::Ordering;

use ratatui::{
    layout::{Constraint, Rect},
    text::Span,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};
use serde_json::Value;

use crate::{
    catalog::ColumnSpec,
    models::{cell_text, record_id, Record, RecordId},
    tui::{
        traits::{Navigable, Paginated},
        ui::{truncate_string, Styles},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub column: usize,
    pub direction: SortDirection,
}

/// Table over an in-memory record array
pub struct DataTable {
    columns: Vec<ColumnSpec>,
    records: Vec<Record>,
    /// Indices into `records` after filtering and sorting
    view: Vec<usize>,
    filter: String,
    sort: Option<SortState>,
    sort_cursor: usize,
    current_page: usize,
    page_size: usize,
    pub state: TableState,
}

impl DataTable {
    pub fn new(columns: Vec<ColumnSpec>) -> Self {
        Self {
            columns,
            records: Vec::new(),
            view: Vec::new(),
            filter: String::new(),
            sort: None,
            sort_cursor: 0,
            current_page: 0,
            page_size: 10,
            state: TableState::default(),
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    /// Replace the data and reset pagination/selection
    pub fn set_records(&mut self, records: Vec<Record>) {
        self.records = records;
        self.current_page = 0;
        self.refresh_view();
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rows left after filtering
    pub fn visible_len(&self) -> usize {
        self.view.len()
    }

    /// Remove every record whose `key_field` equals `id`; returns how many went
    pub fn remove_by_id(&mut self, key_field: &str, id: RecordId) -> usize {
        let before = self.records.len();
        self.records.retain(|r| record_id(r, key_field) != Some(id));
        let removed = before - self.records.len();
        if removed > 0 {
            self.refresh_view();
        }
        removed
    }

    // Filtering

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: &str) {
        self.filter = filter.to_string();
        self.current_page = 0;
        self.refresh_view();
    }

    pub fn push_filter_char(&mut self, c: char) {
        let mut filter = self.filter.clone();
        filter.push(c);
        self.set_filter(&filter);
    }

    pub fn pop_filter_char(&mut self) {
        let mut filter = self.filter.clone();
        filter.pop();
        self.set_filter(&filter);
    }

    // Sorting

    pub fn sort(&self) -> Option<SortState> {
        self.sort
    }

    pub fn sort_cursor(&self) -> usize {
        self.sort_cursor
    }

    pub fn next_sort_column(&mut self) {
        if !self.columns.is_empty() {
            self.sort_cursor = (self.sort_cursor + 1) % self.columns.len();
        }
    }

    pub fn previous_sort_column(&mut self) {
        if !self.columns.is_empty() {
            self.sort_cursor = if self.sort_cursor == 0 {
                self.columns.len() - 1
            } else {
                self.sort_cursor - 1
            };
        }
    }

    /// Cycle the column under the sort cursor: ascending, descending, unsorted.
    /// Returns `false` when that column is not sortable.
    pub fn cycle_sort(&mut self) -> bool {
        let column = self.sort_cursor;
        if !self.columns.get(column).map(|c| c.sortable).unwrap_or(false) {
            return false;
        }

        self.sort = match self.sort {
            Some(SortState { column: c, direction: SortDirection::Ascending }) if c == column => {
                Some(SortState { column, direction: SortDirection::Descending })
            }
            Some(SortState { column: c, direction: SortDirection::Descending }) if c == column => {
                None
            }
            _ => Some(SortState { column, direction: SortDirection::Ascending }),
        };
        self.refresh_view();
        true
    }

    /// Sort by the column reading `accessor`. Returns `false` if there is no
    /// such sortable column.
    pub fn sort_by(&mut self, accessor: &str, direction: SortDirection) -> bool {
        let Some(column) = self
            .columns
            .iter()
            .position(|c| c.sortable && c.accessor.eq_ignore_ascii_case(accessor))
        else {
            return false;
        };
        self.sort_cursor = column;
        self.sort = Some(SortState { column, direction });
        self.refresh_view();
        true
    }

    // Paging and selection

    /// Records shown on the current page, in display order
    pub fn page_records(&self) -> Vec<&Record> {
        let start = self.current_page * self.page_size;
        self.view
            .iter()
            .skip(start)
            .take(self.page_size)
            .map(|&i| &self.records[i])
            .collect()
    }

    /// Every visible record in display order, ignoring pagination
    pub fn visible_records(&self) -> Vec<&Record> {
        self.view.iter().map(|&i| &self.records[i]).collect()
    }

    pub fn selected_record(&self) -> Option<&Record> {
        let selected = self.state.selected()?;
        let index = self.current_page * self.page_size + selected;
        self.view.get(index).map(|&i| &self.records[i])
    }

    /// Display text of every column for one record
    pub fn cells(&self, record: &Record) -> Vec<String> {
        self.columns
            .iter()
            .map(|c| c.display(record.get(c.accessor)))
            .collect()
    }

    fn refresh_view(&mut self) {
        let needle = self.filter.trim().to_lowercase();
        let mut view: Vec<usize> = (0..self.records.len())
            .filter(|&i| needle.is_empty() || self.matches(&self.records[i], &needle))
            .collect();

        if let Some(SortState { column, direction }) = self.sort {
            if let Some(spec) = self.columns.get(column) {
                let accessor = spec.accessor;
                view.sort_by(|&a, &b| {
                    let ord = compare_cells(
                        self.records[a].get(accessor),
                        self.records[b].get(accessor),
                    );
                    match direction {
                        SortDirection::Ascending => ord,
                        SortDirection::Descending => ord.reverse(),
                    }
                });
            }
        }

        self.view = view;
        let last_page = self.get_total_pages() - 1;
        if self.current_page > last_page {
            self.current_page = last_page;
        }
        self.clamp_selection();
    }

    fn matches(&self, record: &Record, needle: &str) -> bool {
        self.columns
            .iter()
            .filter(|c| c.filterable)
            .any(|c| c.display(record.get(c.accessor)).to_lowercase().contains(needle))
    }

    fn clamp_selection(&mut self) {
        let on_page = self.page_records().len();
        let selected = match (on_page, self.state.selected()) {
            (0, _) => None,
            (n, Some(i)) if i >= n => Some(n - 1),
            (_, Some(i)) => Some(i),
            (_, None) => Some(0),
        };
        self.state.select(selected);
    }

    /// Render the table with pagination info in the title
    pub fn render(&mut self, f: &mut Frame, area: Rect, title: &str) {
        let mut block_title = if self.records.is_empty() {
            format!("{} (Empty)", title)
        } else {
            format!(
                "{} ({}/{} - Page {}/{})",
                title,
                self.view.len(),
                self.records.len(),
                self.current_page + 1,
                self.get_total_pages()
            )
        };
        if !self.filter.is_empty() {
            block_title.push_str(&format!(" - filter: {}", self.filter));
        }

        let block = Block::default()
            .title(block_title)
            .borders(Borders::ALL)
            .border_style(Styles::active_border());

        if self.view.is_empty() {
            let message = if self.records.is_empty() {
                "No records".to_string()
            } else {
                format!("No records match '{}'", self.filter)
            };
            let empty = Paragraph::new(message).style(Styles::inactive()).block(block);
            f.render_widget(empty, area);
            return;
        }

        let header = Row::new(
            self.columns
                .iter()
                .enumerate()
                .map(|(i, c)| Cell::from(self.header_span(i, c))),
        )
        .style(Styles::title());

        let rows: Vec<Row> = self
            .page_records()
            .into_iter()
            .map(|record| {
                Row::new(
                    self.columns
                        .iter()
                        .map(|c| {
                            let text = c.display(record.get(c.accessor));
                            Cell::from(truncate_string(&text, c.width as usize))
                        })
                        .collect::<Vec<_>>(),
                )
            })
            .collect();

        let widths: Vec<Constraint> = self
            .columns
            .iter()
            .map(|c| Constraint::Length(c.width))
            .collect();

        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .highlight_style(Styles::selected())
            .highlight_symbol("> ");

        f.render_stateful_widget(table, area, &mut self.state);
    }

    fn header_span(&self, index: usize, column: &ColumnSpec) -> Span<'static> {
        let marker = match self.sort {
            Some(SortState { column: c, direction: SortDirection::Ascending }) if c == index => " ▲",
            Some(SortState { column: c, direction: SortDirection::Descending }) if c == index => " ▼",
            _ => "",
        };
        let label = format!("{}{}", column.header, marker);
        if index == self.sort_cursor {
            Span::styled(label, Styles::sort_cursor())
        } else {
            Span::raw(label)
        }
    }
}

/// Missing and null cells first, then numbers numerically, then everything
/// else as case-insensitive text
fn compare_cells(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(v: Option<&Value>) -> u8 {
        match v {
            None | Some(Value::Null) => 0,
            Some(Value::Number(_)) => 1,
            Some(_) => 2,
        }
    }

    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .unwrap_or(0.0)
            .total_cmp(&y.as_f64().unwrap_or(0.0)),
        _ => match rank(a).cmp(&rank(b)) {
            Ordering::Equal if rank(a) == 2 => {
                let (x, y) = (a.map(cell_text), b.map(cell_text));
                x.map(|s| s.to_lowercase()).cmp(&y.map(|s| s.to_lowercase()))
            }
            ord => ord,
        },
    }
}

impl Navigable for DataTable {
    fn navigate_up(&mut self) {
        let count = self.get_item_count();
        if count == 0 {
            return;
        }
        let selected = self.state.selected().unwrap_or(0);
        let new_selected = if selected == 0 { count - 1 } else { selected - 1 };
        self.state.select(Some(new_selected));
    }

    fn navigate_down(&mut self) {
        let count = self.get_item_count();
        if count == 0 {
            return;
        }
        let selected = self.state.selected().unwrap_or(0);
        self.state.select(Some((selected + 1) % count));
    }

    fn get_selected_index(&self) -> Option<usize> {
        self.state.selected()
    }

    fn set_selected_index(&mut self, index: Option<usize>) {
        self.state.select(index);
    }

    /// Rows on the current page
    fn get_item_count(&self) -> usize {
        self.page_records().len()
    }
}

impl Paginated for DataTable {
    fn get_current_page(&self) -> usize {
        self.current_page
    }

    fn set_current_page(&mut self, page: usize) {
        if page < self.get_total_pages() {
            self.current_page = page;
            self.state.select(if self.view.is_empty() { None } else { Some(0) });
        }
    }

    fn get_total_pages(&self) -> usize {
        if self.view.is_empty() {
            1
        } else {
            self.view.len().div_ceil(self.page_size)
        }
    }

    fn get_items_per_page(&self) -> usize {
        self.page_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::EntityKind;
    use ratatui::{backend::TestBackend, Terminal};
    use serde_json::json;

    fn actors(n: usize) -> Vec<Record> {
        (1..=n)
            .map(|i| {
                let prenom = if i % 2 == 0 { "Jeanne" } else { "Jean" };
                json!({
                    "acteurID": i,
                    "nom": format!("Nom{:02}", i),
                    "prenom": prenom,
                    "nationalite": "French",
                    "date_naissance": "1950-01-01T00:00:00"
                })
                .as_object()
                .cloned()
                .unwrap()
            })
            .collect()
    }

    fn table(n: usize) -> DataTable {
        let mut table =
            DataTable::new(EntityKind::Actor.descriptor().columns.to_vec()).with_page_size(10);
        table.set_records(actors(n));
        table
    }

    fn ids(records: Vec<&Record>) -> Vec<i64> {
        records.iter().map(|r| record_id(r, "acteurID").unwrap()).collect()
    }

    #[test]
    fn test_pagination() {
        let mut t = table(23);
        assert_eq!(t.len(), 23);
        assert_eq!(t.get_total_pages(), 3);
        assert_eq!(t.page_records().len(), 10);

        t.next_page();
        t.next_page();
        assert_eq!(t.get_current_page(), 2);
        assert_eq!(t.page_records().len(), 3);

        t.next_page();
        assert_eq!(t.get_current_page(), 2, "cannot page past the end");

        t.go_to_first_page();
        assert_eq!(ids(t.page_records())[0], 1);
    }

    #[test]
    fn test_empty_table_has_one_page() {
        let t = table(0);
        assert_eq!(t.get_total_pages(), 1);
        assert!(t.page_records().is_empty());
        assert!(t.selected_record().is_none());
    }

    #[test]
    fn test_sort_cycles() {
        let mut t = table(5);
        t.next_sort_column(); // nom
        assert!(t.cycle_sort());
        assert_eq!(ids(t.page_records()), vec![1, 2, 3, 4, 5]);

        assert!(t.cycle_sort());
        assert_eq!(t.sort().unwrap().direction, SortDirection::Descending);
        assert_eq!(ids(t.page_records()), vec![5, 4, 3, 2, 1]);

        assert!(t.cycle_sort());
        assert_eq!(t.sort(), None);
        assert_eq!(ids(t.page_records()), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_numeric_sort() {
        let mut t = table(12);
        assert!(t.sort_by("acteurID", SortDirection::Descending));
        assert_eq!(ids(t.page_records())[..3], [12, 11, 10]);
        assert!(!t.sort_by("nope", SortDirection::Ascending));
    }

    #[test]
    fn test_nulls_sort_first() {
        let mut t = table(3);
        let mut records = actors(3);
        records[1].insert("nom".to_string(), Value::Null);
        t.set_records(records);
        t.sort_by("nom", SortDirection::Ascending);
        assert_eq!(ids(t.page_records()), vec![2, 1, 3]);
    }

    #[test]
    fn test_mixed_cell_kinds_sort_by_rank() {
        let mut t = table(5);
        let mut records = actors(5);
        for (record, nom) in records.iter_mut().zip([
            json!(1967),
            json!("1967"),
            Value::Null,
            json!("abc"),
            json!(5),
        ]) {
            record.insert("nom".to_string(), nom);
        }
        t.set_records(records);
        t.sort_by("nom", SortDirection::Ascending);
        assert_eq!(ids(t.page_records()), vec![3, 5, 1, 2, 4]);

        let (n, s) = (json!(1967), json!("1967"));
        assert_eq!(compare_cells(Some(&n), Some(&s)), Ordering::Less);
        assert_eq!(compare_cells(Some(&s), Some(&n)), Ordering::Greater);
    }

    #[test]
    fn test_unsortable_column_refused() {
        let mut t = DataTable::new(vec![ColumnSpec {
            header: "Poster",
            accessor: "poster",
            sortable: false,
            filterable: false,
            width: 10,
            render: None,
        }]);
        assert!(!t.cycle_sort());
        assert_eq!(t.sort(), None);
    }

    #[test]
    fn test_global_filter_resets_page() {
        let mut t = table(25);
        t.next_page();
        t.set_filter("JEANNE");
        assert_eq!(t.get_current_page(), 0);
        assert_eq!(t.visible_len(), 12);
        assert!(ids(t.visible_records()).iter().all(|id| id % 2 == 0));

        t.set_filter("");
        assert_eq!(t.visible_len(), 25);
    }

    #[test]
    fn test_filter_uses_rendered_text() {
        let mut t = table(3);
        t.set_filter("1950-01-01");
        assert_eq!(t.visible_len(), 3);
        t.set_filter("T00:00");
        assert_eq!(t.visible_len(), 0);
    }

    #[test]
    fn test_remove_by_id() {
        let mut t = table(11);
        t.go_to_last_page();
        assert_eq!(t.remove_by_id("acteurID", 11), 1);
        assert_eq!(t.len(), 10);
        assert_eq!(t.get_current_page(), 0, "page clamped after last row went away");
        assert_eq!(t.remove_by_id("acteurID", 99), 0);
    }

    #[test]
    fn test_selection_follows_page() {
        let mut t = table(15);
        t.navigate_up();
        assert_eq!(record_id(t.selected_record().unwrap(), "acteurID"), Some(10));
        t.next_page();
        assert_eq!(record_id(t.selected_record().unwrap(), "acteurID"), Some(11));
    }

    #[test]
    fn test_render_empty_and_full() {
        let backend = TestBackend::new(100, 20);
        let mut terminal = Terminal::new(backend).unwrap();

        let mut empty = table(0);
        terminal
            .draw(|f| {
                let area = f.size();
                empty.render(f, area, "Actors")
            })
            .unwrap();

        let mut full = table(4);
        terminal
            .draw(|f| {
                let area = f.size();
                full.render(f, area, "Actors")
            })
            .unwrap();
        let buffer = terminal.backend().buffer();
        let text: String = buffer.content.iter().map(|c| c.symbol()).collect();
        assert!(text.contains("Nom01"));
        assert!(text.contains("Page 1/1"));
    }
}
