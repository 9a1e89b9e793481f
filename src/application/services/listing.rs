//! Model listing service
//!
//! Opens a locator, reads it with the configured format reader and renders
//! the canonical listing.

use std::sync::Arc;

use termtree::Tree;
use tracing::instrument;

use crate::application::readers::ModelReader;
use crate::application::{ApplicationResult, IoResultExt};
use crate::domain::{render_lines, render_tree, Model, ModelSummary};
use crate::infrastructure::traits::{DataSource, LogLevel, Logger};

/// Single line returned by [`ListingService::list`] when the locator cannot be opened.
pub const OPEN_FAILURE_LINE: &str = "ERROR: failed to open locator";

/// Lists the assembly/part structure behind a locator.
pub struct ListingService {
    source: Arc<dyn DataSource>,
    reader: Arc<dyn ModelReader>,
    logger: Arc<dyn Logger>,
}

impl ListingService {
    pub fn new(
        source: Arc<dyn DataSource>,
        reader: Arc<dyn ModelReader>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            source,
            reader,
            logger,
        }
    }

    /// Open and read the model behind `locator`.
    ///
    /// Only an unreachable locator is an error; unreadable content yields a
    /// degraded model.
    #[instrument(level = "debug", skip(self))]
    pub fn read(&self, locator: &str) -> ApplicationResult<Model> {
        self.logger
            .log(LogLevel::Info, &format!("Opening locator: {locator}"));

        let mut stream = match self.source.open(locator).with_locator(locator) {
            Ok(stream) => stream,
            Err(e) => {
                self.logger
                    .log(LogLevel::Error, &format!("Failed to open locator: {locator}"));
                return Err(e);
            }
        };

        let model = self.reader.read_model(&mut stream);
        self.logger.log(
            LogLevel::Debug,
            &format!("Read {}: {}", locator, ModelSummary::from(&model)),
        );
        Ok(model)
    }

    /// Listing lines, or the open failure as a typed error.
    pub fn try_list(&self, locator: &str) -> ApplicationResult<Vec<String>> {
        let model = self.read(locator)?;
        Ok(render_lines(&model))
    }

    /// Listing lines; an unreachable locator yields [`OPEN_FAILURE_LINE`] alone.
    pub fn list(&self, locator: &str) -> Vec<String> {
        self.try_list(locator)
            .unwrap_or_else(|_| vec![OPEN_FAILURE_LINE.to_string()])
    }

    /// Box-drawing rendering of the same listing.
    pub fn tree(&self, locator: &str) -> ApplicationResult<Tree<String>> {
        let model = self.read(locator)?;
        Ok(render_tree(&model))
    }
}
