pub mod error;
pub mod neo4j;
pub mod store;

#[cfg(any(test, feature = "testutil"))]
pub mod memory;

pub use error::GraphError;
pub use neo4j::Neo4jGraphStore;
pub use store::{GraphStore, NodeId, StoredNode};

#[cfg(any(test, feature = "testutil"))]
pub use memory::InMemoryGraphStore;
