//! Library crate for user-panel.
//!
//! This crate exposes the building blocks of the panel:
//! - Key-value store adapter and its records (`store`, `model`)
//! - Search filters over users and the activity log (`search`)
//! - The panel core with its mutation handlers (`panel`)
//! - CSV and PDF exporters (`export`)
//! - Application state, update loop and rendering (`app`, `ui`)
//! - Configuration, logging, CLI and error types (`config`, `logging`, `cli`, `error`)
//!
//! It is used by the `user-panel` binary and by tests.
#![doc = include_str!("../README.md")]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod model;
pub mod panel;
pub mod search;
pub mod store;
pub mod ui;

// Re-export commonly used items at the crate root for convenience
/// Convenient error and result types shared across the crate.
pub use error::{DynError, PanelError, Result};
