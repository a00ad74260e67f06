//! cineadmin: terminal admin dashboard for a film catalog REST API

pub mod api;
pub mod catalog;
pub mod config;
pub mod models;
pub mod tui;
