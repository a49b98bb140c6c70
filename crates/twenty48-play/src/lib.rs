//! Terminal front end for 2048: a line-driven controller around one
//! `GameSession` and an async client for the high-score service.

pub mod client;
pub mod controller;

pub use client::{ClientError, ScoreClient};
pub use controller::{Command, Controller, Reply, ScoreEvent};
