//! High-score service: a SQLite-backed score store behind two JSON routes.

pub mod app;
pub mod args;
pub mod config;
pub mod routes;
pub mod store;
