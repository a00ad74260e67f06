//! Reusable UI components shared by the catalog screens

pub mod data_table;
pub mod form_field;

pub use data_table::{DataTable, SortDirection, SortState};
pub use form_field::{Form, FormField, FormFieldType};
