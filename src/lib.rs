// File: src/lib.rs
pub mod client;
pub mod config;
pub mod logging;
pub mod manager;
pub mod model;
pub mod paths;
pub mod store;

#[cfg(feature = "tui")]
pub mod tui;
