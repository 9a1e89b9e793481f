//! Hierarchy resolution for flat id/parent-id records.
//!
//! Records arrive as two flat lists. Assemblies reference their parent by id,
//! parts reference their owning assembly by id. The builder resolves these
//! references into one owned tree rooted at the single parentless assembly.

use std::collections::{BTreeMap, BTreeSet};

use crate::domain::entities::{Assembly, AssemblyId, Part, PartId};
use crate::domain::error::{DomainError, DomainResult};

/// Nesting limit for recursive tree assembly.
pub const MAX_DEPTH: usize = 1024;

/// Flat assembly record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyRecord {
    pub id: String,
    pub name: String,
    pub parent_id: Option<String>,
}

/// Flat part record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartRecord {
    pub id: String,
    pub name: String,
    pub assembly_id: String,
}

/// Outcome of resolving the records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hierarchy {
    pub root: Assembly,
    /// Ids of assemblies whose parent chain never reaches the root, sorted
    pub orphaned: Vec<String>,
}

/// Constructs a tree from flat assembly and part records.
///
/// Assemblies must be added before the parts that reference them.
#[derive(Debug, Default)]
pub struct HierarchyBuilder {
    assemblies: BTreeMap<String, Assembly>,
    children_of: BTreeMap<String, BTreeSet<String>>,
    roots: BTreeSet<String>,
}

impl HierarchyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an assembly. Returns false if the id was already registered.
    pub fn add_assembly(&mut self, record: AssemblyRecord) -> bool {
        if self.assemblies.contains_key(&record.id) {
            return false;
        }

        match record.parent_id {
            Some(parent_id) => {
                self.children_of
                    .entry(parent_id)
                    .or_default()
                    .insert(record.id.clone());
            }
            None => {
                self.roots.insert(record.id.clone());
            }
        }

        let assembly = Assembly::with_id(AssemblyId::new(record.id.clone()), record.name);
        self.assemblies.insert(record.id, assembly);
        true
    }

    /// Attach a part to its assembly. Returns false if the assembly id is unknown.
    pub fn add_part(&mut self, record: PartRecord) -> bool {
        match self.assemblies.get_mut(&record.assembly_id) {
            Some(assembly) => {
                assembly.push_part(Part::with_id(PartId::new(record.id), record.name));
                true
            }
            None => false,
        }
    }

    /// Number of registered assemblies.
    pub fn len(&self) -> usize {
        self.assemblies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assemblies.is_empty()
    }

    /// Assemble the tree from the single parentless assembly.
    ///
    /// Returns `Ok(None)` when no assemblies were registered at all.
    pub fn build(mut self) -> DomainResult<Option<Hierarchy>> {
        if self.assemblies.is_empty() {
            return Ok(None);
        }

        let root_id = match self.roots.len() {
            0 => return Err(DomainError::NoRootAssembly),
            1 => self.roots.iter().next().cloned().ok_or(DomainError::NoRootAssembly)?,
            _ => {
                return Err(DomainError::MultipleRootAssemblies(
                    self.roots.iter().cloned().collect(),
                ))
            }
        };

        let root = self
            .assemble(&root_id, 0)?
            .ok_or(DomainError::NoRootAssembly)?;

        // Whatever was not moved into the tree is unreachable from the root
        let orphaned = self.assemblies.into_keys().collect();

        Ok(Some(Hierarchy { root, orphaned }))
    }

    /// Move the assembly `id` out of the pool and attach its subtree.
    ///
    /// Removal doubles as the visited set: an id is taken at most once.
    fn assemble(&mut self, id: &str, depth: usize) -> DomainResult<Option<Assembly>> {
        if depth > MAX_DEPTH {
            return Err(DomainError::DepthExceeded(MAX_DEPTH));
        }
        let Some(mut assembly) = self.assemblies.remove(id) else {
            return Ok(None);
        };

        let child_ids = self.children_of.remove(id).unwrap_or_default();
        for child_id in child_ids {
            if let Some(child) = self.assemble(&child_id, depth + 1)? {
                assembly.push_child(child);
            }
        }

        Ok(Some(assembly))
    }
}
