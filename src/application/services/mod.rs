//! Application services
//!
//! Concrete service implementations that orchestrate readers and domain logic.
//! Services depend on I/O boundary traits (DataSource, Logger) but are
//! themselves concrete structs, not traits.

mod listing;

pub use listing::{ListingService, OPEN_FAILURE_LINE};
