//! STEP reader backed by a CAD kernel
//!
//! The kernel only reads files, so the payload is spooled to a call-scoped
//! temporary file first. The file is removed when the guard drops, on every
//! return path.

use std::collections::HashSet;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::sync::{Arc, LazyLock};

use regex::bytes::Regex;
use tempfile::NamedTempFile;
use tracing::{debug, instrument, warn};

use crate::application::readers::ModelReader;
use crate::domain::{
    Assembly, AssemblyId, DomainError, DomainResult, Model, Part, PartId, MAX_DEPTH,
};
use crate::infrastructure::kernel::{CadKernel, Label, ShapeTool};

/// Root name used when the payload carries no title.
pub const DEFAULT_STEP_TITLE: &str = "STEP Model";

/// The title lives in the HEADER section, well before any data.
const HEADER_SCAN_LIMIT: usize = 64 * 1024;

static FILE_NAME_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"FILE_NAME\s*\(\s*'((?:[^']|'')*)'").ok());

/// Reads STEP payloads through a [`CadKernel`].
pub struct StepReader {
    kernel: Arc<dyn CadKernel>,
    default_title: String,
    temp_dir: Option<PathBuf>,
}

impl StepReader {
    pub fn new(kernel: Arc<dyn CadKernel>) -> Self {
        Self {
            kernel,
            default_title: DEFAULT_STEP_TITLE.to_string(),
            temp_dir: None,
        }
    }

    /// Root name used when the payload has no usable `FILE_NAME` title.
    pub fn with_default_title(mut self, title: impl Into<String>) -> Self {
        self.default_title = title.into();
        self
    }

    /// Directory for the spooled payload (default: system temp dir).
    pub fn with_temp_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.temp_dir = dir;
        self
    }

    /// Title from the `FILE_NAME('...'` header entry, if present and non-empty.
    pub fn extract_title(payload: &[u8]) -> Option<String> {
        let header = &payload[..payload.len().min(HEADER_SCAN_LIMIT)];
        let captures = FILE_NAME_PATTERN.as_ref()?.captures(header)?;
        let raw = captures.get(1)?.as_bytes();
        let title = String::from_utf8_lossy(raw).replace("''", "'");
        let title = title.trim();
        (!title.is_empty()).then(|| title.to_string())
    }

    fn spool(&self, payload: &[u8]) -> std::io::Result<NamedTempFile> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("cadtree-").suffix(".step");
        let mut file = match &self.temp_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        file.write_all(payload)?;
        file.flush()?;
        Ok(file)
    }

    #[instrument(level = "debug", skip(self, payload), fields(bytes = payload.len()))]
    fn read_payload(&self, payload: &[u8]) -> Model {
        let title = Self::extract_title(payload).unwrap_or_else(|| self.default_title.clone());

        // Dropping the guard deletes the file, whichever branch returns
        let spooled = match self.spool(payload) {
            Ok(file) => file,
            Err(e) => return Model::degraded(format!("Error creating temporary file: {e}")),
        };
        debug!("spooled payload to {}", spooled.path().display());

        let mut document = match self.kernel.read_file(spooled.path()) {
            Ok(document) => document,
            Err(e) => return Model::degraded(format!("Error reading STEP file: {e}")),
        };
        if let Err(e) = document.transfer() {
            return Model::degraded(format!("Error transferring STEP data: {e}"));
        }
        let tool = match document.shape_tool() {
            Ok(tool) => tool,
            Err(e) => return Model::degraded(format!("Error acquiring shape tool: {e}")),
        };

        match ShapeWalker::new(tool).walk(title) {
            Ok(root) => Model::new(root),
            Err(e) => Model::degraded(format!("Error walking shape tree: {e}")),
        }
    }
}

impl ModelReader for StepReader {
    fn read_model(&self, stream: &mut dyn Read) -> Model {
        let mut payload = Vec::new();
        if let Err(e) = stream.read_to_end(&mut payload) {
            warn!("cannot read STEP stream: {}", e);
            return Model::degraded(format!("Exception reading STEP file: {e}"));
        }
        if payload.is_empty() {
            return Model::degraded("Empty STEP file");
        }
        self.read_payload(&payload)
    }
}

/// Depth-first walk over the kernel's label structure.
struct ShapeWalker<'a> {
    tool: &'a dyn ShapeTool,
    /// Shared by all unnamed labels of one walk
    next_entity: usize,
    /// Labels on the current path
    active: HashSet<Label>,
}

impl<'a> ShapeWalker<'a> {
    fn new(tool: &'a dyn ShapeTool) -> Self {
        Self {
            tool,
            next_entity: 1,
            active: HashSet::new(),
        }
    }

    fn walk(mut self, title: String) -> DomainResult<Assembly> {
        let mut root = Assembly::new(title);
        for label in self.tool.free_shapes() {
            self.visit(label, &mut root, 1)?;
        }
        Ok(root)
    }

    fn display_name(&mut self, label: Label) -> String {
        match self.tool.name(label) {
            Some(name) if !name.is_empty() => name,
            _ => {
                let name = format!("Entity_{}", self.next_entity);
                self.next_entity += 1;
                name
            }
        }
    }

    fn visit(&mut self, label: Label, parent: &mut Assembly, depth: usize) -> DomainResult<()> {
        if depth > MAX_DEPTH {
            return Err(DomainError::DepthExceeded(MAX_DEPTH));
        }
        if !self.active.insert(label) {
            return Err(DomainError::LabelCycle(label.to_string()));
        }

        if self.tool.is_assembly(label) {
            let name = self.display_name(label);
            let mut assembly = Assembly::with_id(AssemblyId::new(label.to_string()), name);
            for component in self.tool.components(label) {
                self.visit(component, &mut assembly, depth + 1)?;
            }
            parent.push_child(assembly);
        } else if self.tool.is_component(label) {
            // References add no node of their own
            match self.tool.referred_shape(label) {
                Some(referred) => self.visit(referred, parent, depth + 1)?,
                None => warn!("skipping unresolved component {}", label),
            }
        } else if self.tool.is_simple_shape(label) {
            let name = self.display_name(label);
            parent.push_part(Part::with_id(PartId::new(label.to_string()), name));
        } else {
            let name = format!("{} (unknown)", self.display_name(label));
            parent.push_part(Part::with_id(PartId::new(label.to_string()), name));
        }

        self.active.remove(&label);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_is_read_from_file_name_header() {
        let payload = b"ISO-10303-21;\nHEADER;\nFILE_NAME( 'Ball Valve' ,'2024-01-01',(''),(''),'','','');\nENDSEC;";
        assert_eq!(
            StepReader::extract_title(payload),
            Some("Ball Valve".to_string())
        );
    }

    #[test]
    fn doubled_quotes_in_title_are_unescaped() {
        let payload = b"FILE_NAME('Bob''s bracket',";
        assert_eq!(
            StepReader::extract_title(payload),
            Some("Bob's bracket".to_string())
        );
    }

    #[test]
    fn blank_or_missing_title_is_none() {
        assert_eq!(StepReader::extract_title(b"FILE_NAME('   ',"), None);
        assert_eq!(StepReader::extract_title(b"HEADER; ENDSEC;"), None);
    }
}
