//! Task Board
//!
//! A small task-tracking service: a JSON REST API over a task store, health
//! reporting for container probes, and a client view layer that drives the
//! API from a terminal.

pub mod api;
pub mod client;
pub mod config;
pub mod domain;
pub mod infrastructure;
