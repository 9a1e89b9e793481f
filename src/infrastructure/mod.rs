//! Infrastructure layer: I/O implementations, CAD kernel boundary and DI container
//!
//! This layer implements I/O boundary traits and wires up services.

pub mod di;
pub mod error;
pub mod kernel;
pub mod traits;

pub use error::{InfraError, InfraResult};
