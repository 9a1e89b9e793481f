//! cadtree: list the assembly/part hierarchy of CAD models.
//!
//! Readers turn a raw stream (tagged lines, JSON records or a STEP file read
//! through a CAD kernel) into a [`domain::Model`]; the listing service renders
//! it as a deterministic, name-sorted listing.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
