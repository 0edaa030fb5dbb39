pub mod config;
pub mod error;
pub mod node;

pub use config::Config;
pub use error::CoreError;
pub use node::{HttpScheme, JobNode, JobStatus, NodeKind, SearchMode};
