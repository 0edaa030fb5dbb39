use thiserror::Error;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("store unreachable: {0}")]
    Unreachable(String),

    #[error("store query failed: {0}")]
    Query(String),

    #[error("malformed node returned by store: {0}")]
    Malformed(String),
}

impl From<neo4rs::Error> for GraphError {
    fn from(e: neo4rs::Error) -> Self {
        GraphError::Query(e.to_string())
    }
}
