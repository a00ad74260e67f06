//! Screen modules for the cineadmin TUI

pub mod entity_form;
pub mod entity_list;
pub mod login;
pub mod main_menu;
pub mod profile;
pub mod register;

pub use entity_form::{EntityFormScreen, FormMode};
pub use entity_list::EntityListScreen;
pub use login::LoginScreen;
pub use main_menu::MainMenuScreen;
pub use profile::ProfileScreen;
pub use register::RegisterScreen;
