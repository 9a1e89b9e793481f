//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violations of the tree invariants.
/// Readers turn them into degraded models; they never reach the listing output as errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("no root assembly")]
    NoRootAssembly,

    #[error("multiple root assemblies: {}", .0.join(", "))]
    MultipleRootAssemblies(Vec<String>),

    #[error("cycle detected at label {0}")]
    LabelCycle(String),

    #[error("nesting deeper than {0} levels")]
    DepthExceeded(usize),
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
