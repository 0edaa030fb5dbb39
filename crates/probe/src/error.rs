use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("fetch failed: {0}")]
    Fetch(String),

    #[error("dns resolution failed: {0}")]
    Dns(String),
}
