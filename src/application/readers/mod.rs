//! Format readers
//!
//! Each reader turns a raw byte stream into a [`Model`]. Readers never fail:
//! malformed input yields a degraded model whose root name explains what went wrong.

mod records;
mod step;
mod tagged;

use std::io::Read;

use crate::domain::Model;

pub use records::{RecordsReader, INVALID_HIERARCHY};
pub use step::{StepReader, DEFAULT_STEP_TITLE};
pub use tagged::TaggedLineReader;

/// Strategy converting a raw stream into a model.
pub trait ModelReader: Send + Sync {
    fn read_model(&self, stream: &mut dyn Read) -> Model;
}
