use thiserror::Error;

/// Error returned to every awaiter of a failed load.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("engine failed to load: {0}")]
    Failed(String),
}
