//! Dependency injection

mod service_container;

pub use service_container::{ServiceContainer, DEMO_CONTENT, DEMO_PREFIX};
