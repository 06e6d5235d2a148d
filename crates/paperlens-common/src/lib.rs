//! paperlens-common — Shared types, errors, and the sandboxed HTTP client
//! used across all Paperlens crates.

pub mod error;
pub mod models;
pub mod sandbox;

pub use error::{ApiError, PaperlensError, Result};
pub use models::{FigureTableKind, FigureTableRef, Paper, PaperRef, PaperSection};
