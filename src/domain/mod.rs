//! Domain layer: entities and business logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod entities;
pub mod error;
pub mod hierarchy;
pub mod listing;

pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use hierarchy::{AssemblyRecord, Hierarchy, HierarchyBuilder, PartRecord, MAX_DEPTH};
pub use listing::{canonical, render_lines, render_tree, ModelSummary};
