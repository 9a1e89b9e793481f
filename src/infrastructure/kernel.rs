//! CAD-kernel boundary
//!
//! The STEP adapter never parses exchange files itself. It hands the payload to
//! a [`CadKernel`] as a file and walks the label structure of the resulting
//! document through the [`ShapeTool`] introspection interface.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use generational_arena::{Arena, Index};
use thiserror::Error;

/// Handle to a label inside a kernel document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Label(Index);

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (slot, generation) = self.0.into_raw_parts();
        write!(f, "0:1:{}:{}", slot, generation)
    }
}

/// Status reported by the kernel's file reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStatus {
    Done,
    /// Nothing could be translated
    Void,
    /// Recoverable errors, nothing usable produced
    Error,
    /// Reader aborted
    Fail,
}

impl fmt::Display for ReadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ReadStatus::Done => "done",
            ReadStatus::Void => "void",
            ReadStatus::Error => "error",
            ReadStatus::Fail => "fail",
        };
        f.write_str(label)
    }
}

/// Failures raised by a kernel collaborator.
#[derive(Error, Debug)]
pub enum KernelError {
    #[error("no CAD kernel available: {0}")]
    Unavailable(String),

    #[error("reader returned status {0}")]
    ReadFailed(ReadStatus),

    #[error("transfer failed: {0}")]
    TransferFailed(String),

    #[error("shape tool unavailable: {0}")]
    ToolUnavailable(String),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for kernel operations.
pub type KernelResult<T> = Result<T, KernelError>;

/// Entry point of a CAD kernel binding.
pub trait CadKernel: Send + Sync {
    /// Read the exchange file at `path` into a fresh document.
    fn read_file(&self, path: &Path) -> KernelResult<Box<dyn KernelDocument>>;
}

/// A document produced by [`CadKernel::read_file`].
pub trait KernelDocument {
    /// Transfer the read entities into the document's label structure.
    fn transfer(&mut self) -> KernelResult<()>;

    /// Label introspection; only available after a successful transfer.
    fn shape_tool(&self) -> KernelResult<&dyn ShapeTool>;
}

/// Per-label introspection of a transferred document.
pub trait ShapeTool {
    /// Top-level labels that are not referenced by any assembly.
    fn free_shapes(&self) -> Vec<Label>;
    fn is_assembly(&self, label: Label) -> bool;
    /// A component is a placed reference to another label.
    fn is_component(&self, label: Label) -> bool;
    fn is_simple_shape(&self, label: Label) -> bool;
    fn components(&self, label: Label) -> Vec<Label>;
    fn referred_shape(&self, label: Label) -> Option<Label>;
    fn name(&self, label: Label) -> Option<String>;
}

// ============================================================
// NULL KERNEL
// ============================================================

/// Kernel used when no native binding is linked. Every read fails.
#[derive(Debug, Default)]
pub struct NullKernel;

impl CadKernel for NullKernel {
    fn read_file(&self, _path: &Path) -> KernelResult<Box<dyn KernelDocument>> {
        Err(KernelError::Unavailable(
            "this build has no native STEP binding".to_string(),
        ))
    }
}

// ============================================================
// IN-MEMORY KERNEL
// ============================================================

/// Classification of a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Assembly,
    Component,
    Simple,
    Unknown,
}

#[derive(Debug, Clone)]
struct LabelNode {
    kind: ShapeKind,
    name: Option<String>,
    components: Vec<Label>,
    referred: Option<Label>,
}

/// Label structure of a transferred document, stored in an arena.
#[derive(Debug, Clone, Default)]
pub struct LabelGraph {
    arena: Arena<LabelNode>,
    free: Vec<Label>,
}

impl LabelGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, kind: ShapeKind, name: Option<&str>) -> Label {
        Label(self.arena.insert(LabelNode {
            kind,
            name: name.map(str::to_string),
            components: Vec::new(),
            referred: None,
        }))
    }

    pub fn add_assembly(&mut self, name: Option<&str>) -> Label {
        self.insert(ShapeKind::Assembly, name)
    }

    pub fn add_simple_shape(&mut self, name: Option<&str>) -> Label {
        self.insert(ShapeKind::Simple, name)
    }

    pub fn add_unknown(&mut self, name: Option<&str>) -> Label {
        self.insert(ShapeKind::Unknown, name)
    }

    /// Place `referred` inside `assembly` through a new component label.
    pub fn add_component(&mut self, assembly: Label, referred: Label, name: Option<&str>) -> Label {
        let component = self.insert(ShapeKind::Component, name);
        if let Some(node) = self.arena.get_mut(component.0) {
            node.referred = Some(referred);
        }
        self.attach(assembly, component);
        component
    }

    /// Component reference whose target is not part of the document.
    pub fn add_dangling_component(&mut self, assembly: Label) -> Label {
        let component = self.insert(ShapeKind::Component, None);
        self.attach(assembly, component);
        component
    }

    /// Append `label` to the component list of `assembly`.
    pub fn attach(&mut self, assembly: Label, label: Label) {
        if let Some(node) = self.arena.get_mut(assembly.0) {
            node.components.push(label);
        }
    }

    pub fn add_free_shape(&mut self, label: Label) {
        self.free.push(label);
    }

    fn node(&self, label: Label) -> Option<&LabelNode> {
        self.arena.get(label.0)
    }

    fn kind(&self, label: Label) -> Option<ShapeKind> {
        self.node(label).map(|node| node.kind)
    }
}

impl ShapeTool for LabelGraph {
    fn free_shapes(&self) -> Vec<Label> {
        self.free.clone()
    }

    fn is_assembly(&self, label: Label) -> bool {
        self.kind(label) == Some(ShapeKind::Assembly)
    }

    fn is_component(&self, label: Label) -> bool {
        self.kind(label) == Some(ShapeKind::Component)
    }

    fn is_simple_shape(&self, label: Label) -> bool {
        self.kind(label) == Some(ShapeKind::Simple)
    }

    fn components(&self, label: Label) -> Vec<Label> {
        self.node(label)
            .map(|node| node.components.clone())
            .unwrap_or_default()
    }

    fn referred_shape(&self, label: Label) -> Option<Label> {
        self.node(label)
            .and_then(|node| node.referred)
            .filter(|referred| self.node(*referred).is_some())
    }

    fn name(&self, label: Label) -> Option<String> {
        self.node(label).and_then(|node| node.name.clone())
    }
}

/// Scripted kernel serving a prepared [`LabelGraph`] for every readable file.
///
/// Records the paths it was asked to read so callers can check temp file handling.
#[derive(Debug, Default)]
pub struct InMemoryKernel {
    graph: LabelGraph,
    read_status: Option<ReadStatus>,
    transfer_error: Option<String>,
    reads: Mutex<Vec<PathBuf>>,
}

impl InMemoryKernel {
    pub fn new(graph: LabelGraph) -> Self {
        Self {
            graph,
            ..Self::default()
        }
    }

    /// Make every read fail with `status`.
    pub fn with_read_status(mut self, status: ReadStatus) -> Self {
        self.read_status = Some(status);
        self
    }

    /// Make every transfer fail with `message`.
    pub fn with_transfer_error(mut self, message: impl Into<String>) -> Self {
        self.transfer_error = Some(message.into());
        self
    }

    /// Paths passed to `read_file`, in call order.
    pub fn reads(&self) -> Vec<PathBuf> {
        self.reads
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl CadKernel for InMemoryKernel {
    fn read_file(&self, path: &Path) -> KernelResult<Box<dyn KernelDocument>> {
        self.reads
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(path.to_path_buf());

        std::fs::metadata(path).map_err(|source| KernelError::Io {
            context: format!("stat {}", path.display()),
            source,
        })?;

        match self.read_status {
            Some(status) if status != ReadStatus::Done => Err(KernelError::ReadFailed(status)),
            _ => Ok(Box::new(MemoryDocument {
                graph: self.graph.clone(),
                transferred: false,
                transfer_error: self.transfer_error.clone(),
            })),
        }
    }
}

#[derive(Debug)]
struct MemoryDocument {
    graph: LabelGraph,
    transferred: bool,
    transfer_error: Option<String>,
}

impl KernelDocument for MemoryDocument {
    fn transfer(&mut self) -> KernelResult<()> {
        if let Some(message) = &self.transfer_error {
            return Err(KernelError::TransferFailed(message.clone()));
        }
        self.transferred = true;
        Ok(())
    }

    fn shape_tool(&self) -> KernelResult<&dyn ShapeTool> {
        if self.transferred {
            Ok(&self.graph)
        } else {
            Err(KernelError::ToolUnavailable(
                "document has not been transferred".to_string(),
            ))
        }
    }
}
