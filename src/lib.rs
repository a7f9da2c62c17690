//! safecheck - Generate disaster & safety inspection checklists
//!
//! Selects questions from a fixed template catalog, gathers research from web,
//! academic, open-source and public-API sources, attaches the most relevant
//! items to each question and exports the result as markdown or JSON. Results
//! can be saved to a local SQLite store and browsed through a small JSON API.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod providers;
pub mod research;
pub mod server;
pub mod store;
pub mod util;

pub use error::{ChecklistError, Result};
