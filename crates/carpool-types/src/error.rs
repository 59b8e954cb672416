use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("{kind} identifier must not be empty")]
    EmptyIdentifier { kind: &'static str },
}
