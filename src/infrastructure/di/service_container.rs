//! Service container for dependency injection
//!
//! Wires settings into collaborators and services.

use std::sync::Arc;

use tracing::debug;

use crate::application::readers::{ModelReader, RecordsReader, StepReader, TaggedLineReader};
use crate::application::services::ListingService;
use crate::config::{LoggerKind, ModelFormat, Settings, SourceKind};
use crate::infrastructure::error::{InfraError, InfraResult};
use crate::infrastructure::kernel::{CadKernel, NullKernel};
use crate::infrastructure::traits::{
    DataSource, FileDataSource, JsonFileDataSource, Logger, MemoryDataSource, NullLogger,
    TracingLogger,
};

/// Locators with this prefix are served built-in demo content by the memory source.
pub const DEMO_PREFIX: &str = "mem:";

/// Tagged-line demo model.
pub const DEMO_CONTENT: &str =
    "Assembly: Engine\nPart: Piston\nPart: Valve\nEndAssembly\nAssembly: Frame\nPart: Bolt\nEndAssembly\n";

/// Container holding the collaborators of the listing use case.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Where locators are resolved
    pub source: Arc<dyn DataSource>,

    /// Format reader selected by `settings.format`
    pub reader: Arc<dyn ModelReader>,

    /// Sink for listing events
    pub logger: Arc<dyn Logger>,

    /// Set when `source` is the in-memory store
    memory: Option<Arc<MemoryDataSource>>,
}

impl ServiceContainer {
    /// Create a container with real implementations.
    ///
    /// STEP documents go through [`NullKernel`] unless a kernel binding is
    /// injected with [`ServiceContainer::with_kernel`].
    pub fn new(settings: Settings) -> InfraResult<Self> {
        Self::with_kernel(settings, Arc::new(NullKernel))
    }

    /// Create a container reading STEP documents through `kernel`.
    pub fn with_kernel(settings: Settings, kernel: Arc<dyn CadKernel>) -> InfraResult<Self> {
        Self::check_temp_dir(&settings)?;

        let memory =
            (settings.source == SourceKind::Memory).then(|| Arc::new(MemoryDataSource::new()));
        let source: Arc<dyn DataSource> = match (&memory, settings.source) {
            (Some(memory), _) => memory.clone(),
            (None, SourceKind::Json) => Arc::new(JsonFileDataSource::default()),
            (None, _) => Arc::new(FileDataSource),
        };
        let reader = Self::reader_for(&settings, kernel);
        let logger: Arc<dyn Logger> = match settings.logger {
            LoggerKind::Tracing => Arc::new(TracingLogger),
            LoggerKind::Quiet => Arc::new(NullLogger),
        };
        debug!(
            "wiring format={} source={} logger={}",
            settings.format, settings.source, settings.logger
        );

        let mut container = Self::with_deps(settings, source, reader, logger);
        container.memory = memory;
        Ok(container)
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        source: Arc<dyn DataSource>,
        reader: Arc<dyn ModelReader>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            source,
            reader,
            logger,
            memory: None,
        }
    }

    /// Reader matching the configured format.
    pub fn reader_for(settings: &Settings, kernel: Arc<dyn CadKernel>) -> Arc<dyn ModelReader> {
        match settings.format {
            ModelFormat::Tagged => Arc::new(TaggedLineReader::new()),
            ModelFormat::Records => Arc::new(RecordsReader::new()),
            ModelFormat::Step => Arc::new(
                StepReader::new(kernel)
                    .with_default_title(settings.step.default_title.clone())
                    .with_temp_dir(settings.step.temp_dir.clone()),
            ),
        }
    }

    fn check_temp_dir(settings: &Settings) -> InfraResult<()> {
        let Some(dir) = &settings.step.temp_dir else {
            return Ok(());
        };
        let metadata = std::fs::metadata(dir)
            .map_err(|e| InfraError::io(format!("step.temp_dir {}", dir.display()), e))?;
        if metadata.is_dir() {
            Ok(())
        } else {
            Err(InfraError::io(
                format!("step.temp_dir {}", dir.display()),
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a directory"),
            ))
        }
    }

    /// Register demo content for a `mem:` locator when the memory source is active.
    ///
    /// Returns true if content was registered.
    pub fn register_demo(&self, locator: &str) -> bool {
        match &self.memory {
            Some(memory) if locator.starts_with(DEMO_PREFIX) => {
                memory.register(locator, DEMO_CONTENT);
                true
            }
            _ => false,
        }
    }

    /// The listing use case over the wired collaborators.
    pub fn listing_service(&self) -> ListingService {
        ListingService::new(
            self.source.clone(),
            self.reader.clone(),
            self.logger.clone(),
        )
    }
}
