use thiserror::Error;

#[derive(Debug, Error)]
pub enum KgError {
    #[error("Neo4j error: {0}")]
    Neo4j(#[from] neo4rs::Error),

    #[error("Could not decode graph record: {0}")]
    Decode(String),
}

pub type Result<T> = std::result::Result<T, KgError>;
