use thiserror::Error;

/// Construction-time validation failures for core types (e.g. a ROOT node
/// requested with `requested_depth < 1`). Probe and store failures carry
/// their own `thiserror` enums (`ProbeError`, `GraphError`) and convert
/// straight into `anyhow::Error` at each binary's `main()` boundary; they
/// have no reason to pass through this type first.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
