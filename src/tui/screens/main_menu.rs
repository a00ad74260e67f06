//! Main menu screen

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::catalog::EntityKind;
use crate::tui::{
    app::Route,
    traits::{Screen, ScreenAction},
    ui::Styles,
};

/// Main menu options
#[derive(Debug, Clone)]
pub struct MenuOption {
    pub title: String,
    pub description: String,
    pub shortcut: char,
    pub route: Route,
}

impl MenuOption {
    pub fn new(title: &str, description: &str, shortcut: char, route: Route) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            shortcut,
            route,
        }
    }
}

/// Main menu screen state
pub struct MainMenuScreen {
    pub menu_state: ListState,
    pub menu_options: Vec<MenuOption>,
    /// Signed-in username, if any
    pub signed_in_as: Option<String>,
}

impl MainMenuScreen {
    pub fn new(signed_in_as: Option<String>) -> Self {
        let mut menu_options: Vec<MenuOption> = EntityKind::ALL
            .iter()
            .map(|kind| {
                let descriptor = kind.descriptor();
                MenuOption::new(
                    descriptor.title,
                    &format!("List, add, edit and delete {}", descriptor.title.to_lowercase()),
                    descriptor.title.chars().next().unwrap_or('?'),
                    Route::List(*kind),
                )
            })
            .collect();

        if signed_in_as.is_some() {
            menu_options.push(MenuOption::new(
                "Profile",
                "Show the signed-in account and sign out",
                'P',
                Route::Profile,
            ));
        } else {
            menu_options.push(MenuOption::new("Login", "Sign in to the catalog API", 'I', Route::Login));
        }
        menu_options.push(MenuOption::new("Register", "Create a new account", 'R', Route::Register));

        let mut menu_state = ListState::default();
        menu_state.select(Some(0));

        Self {
            menu_state,
            menu_options,
            signed_in_as,
        }
    }

    fn draw_title(&self, f: &mut Frame, area: Rect) {
        let who = match &self.signed_in_as {
            Some(username) => format!("Signed in as {}", username),
            None => "Not signed in".to_string(),
        };
        let title = Paragraph::new(Line::from(vec![
            Span::styled("Film Catalog Admin", Styles::title()),
            Span::raw("  "),
            Span::styled(who, Styles::inactive()),
        ]))
        .block(Block::default().borders(Borders::ALL));
        f.render_widget(title, area);
    }

    fn draw_menu(&mut self, f: &mut Frame, area: Rect) {
        let selected = self.menu_state.selected();
        let items: Vec<ListItem> = self
            .menu_options
            .iter()
            .enumerate()
            .map(|(i, option)| {
                let style = if Some(i) == selected {
                    Styles::selected()
                } else {
                    Style::default()
                };

                ListItem::new(vec![
                    Line::from(vec![
                        Span::styled(format!("[{}] ", option.shortcut), Styles::info()),
                        Span::styled(option.title.clone(), style.add_modifier(Modifier::BOLD)),
                    ]),
                    Line::from(Span::styled(
                        format!("     {}", option.description),
                        if Some(i) == selected { style } else { Styles::inactive() },
                    )),
                ])
            })
            .collect();

        let menu = List::new(items)
            .block(
                Block::default()
                    .title("Main Menu")
                    .borders(Borders::ALL)
                    .border_style(Styles::active_border()),
            )
            .highlight_style(Styles::selected());

        f.render_stateful_widget(menu, area, &mut self.menu_state);
    }
}

impl Screen for MainMenuScreen {
    fn draw(&mut self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        self.draw_title(f, chunks[0]);
        self.draw_menu(f, chunks[1]);
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> ScreenAction {
        let count = self.menu_options.len();
        match key.code {
            KeyCode::Up => {
                let selected = self.menu_state.selected().unwrap_or(0);
                self.menu_state
                    .select(Some(if selected == 0 { count - 1 } else { selected - 1 }));
            }
            KeyCode::Down => {
                let selected = self.menu_state.selected().unwrap_or(0);
                self.menu_state.select(Some((selected + 1) % count));
            }
            KeyCode::Enter => {
                if let Some(option) = self
                    .menu_state
                    .selected()
                    .and_then(|i| self.menu_options.get(i))
                {
                    return ScreenAction::NavigateTo(option.route);
                }
            }
            KeyCode::Char(c) => {
                let upper_c = c.to_ascii_uppercase();
                if let Some(option) = self.menu_options.iter().find(|o| o.shortcut == upper_c) {
                    return ScreenAction::NavigateTo(option.route);
                }
            }
            _ => {}
        }
        ScreenAction::None
    }

    fn route(&self) -> Route {
        Route::Menu
    }

    fn help(&self) -> &'static str {
        "Main Menu:\n\
        ↑/↓ - Navigate menu\n\
        Enter - Select option\n\
        F/A/C/E/L - Films, Actors, Categories, Editors, Languages\n\
        I / P - Login or Profile\n\
        R - Register"
    }
}
