//! paperlens-kg — Paper/topic graph storage.
//!
//! `(:Paper {paper_id})-[:BELONGS_TO]->(:Topic {name})`, backed by Neo4j in
//! production and by an in-memory map in tests.

pub mod error;
pub mod repository;
pub mod neo4j;
pub mod memory;

pub use error::KgError;
pub use memory::MemoryGraph;
pub use neo4j::Neo4jGraph;
pub use repository::{sort_papers, PaperGraph};
