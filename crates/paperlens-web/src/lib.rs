//! paperlens-web — REST API and browser UI for Paperlens.
//!
//!   JSON routes   — search, stored papers/topics, Q&A, future works
//!   HTML pages    — /ui, /ui/search, /ui/qa, /ui/future-works

pub mod handlers;
pub mod router;
pub mod state;
