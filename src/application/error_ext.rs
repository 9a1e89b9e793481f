//! Error conversion helpers for data source access

use std::io;

use crate::application::{ApplicationError, ApplicationResult};

/// Extension trait for converting `io::Result` to `ApplicationResult` with context.
pub trait IoResultExt<T> {
    /// Attach the locator that could not be opened.
    ///
    /// # Example
    /// ```ignore
    /// let stream = source.open(locator).with_locator(locator)?;
    /// ```
    fn with_locator(self, locator: &str) -> ApplicationResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_locator(self, locator: &str) -> ApplicationResult<T> {
        self.map_err(|source| ApplicationError::SourceUnavailable {
            locator: locator.to_string(),
            source,
        })
    }
}
