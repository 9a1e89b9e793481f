//! Structured-record reader
//!
//! ```json
//! {
//!   "assemblies": [
//!     { "id": "root", "name": "Root", "parent_id": null },
//!     { "id": "engine", "name": "Engine", "parent_id": "root" }
//!   ],
//!   "parts": [
//!     { "id": "piston", "name": "Piston", "assembly_id": "engine" }
//!   ]
//! }
//! ```

use std::io::Read;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::application::readers::ModelReader;
use crate::domain::{AssemblyRecord, DomainResult, HierarchyBuilder, Model, PartRecord};

/// Prefix of the root name for documents whose hierarchy cannot be resolved.
pub const INVALID_HIERARCHY: &str = "Invalid assembly hierarchy";

#[derive(Debug, Deserialize)]
struct AssemblyEntry {
    id: String,
    name: String,
    #[serde(default)]
    parent_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PartEntry {
    id: String,
    name: String,
    assembly_id: String,
}

impl From<AssemblyEntry> for AssemblyRecord {
    fn from(entry: AssemblyEntry) -> Self {
        Self {
            id: entry.id,
            name: entry.name,
            parent_id: entry.parent_id,
        }
    }
}

impl From<PartEntry> for PartRecord {
    fn from(entry: PartEntry) -> Self {
        Self {
            id: entry.id,
            name: entry.name,
            assembly_id: entry.assembly_id,
        }
    }
}

/// Reads JSON documents with flat `assemblies` and `parts` record lists.
#[derive(Debug, Default)]
pub struct RecordsReader;

impl RecordsReader {
    pub fn new() -> Self {
        Self
    }

    /// Records of the array `key`; individually malformed records are skipped.
    fn entries<T: for<'de> Deserialize<'de>>(document: &Value, key: &str) -> Vec<T> {
        let Some(records) = document.get(key).and_then(Value::as_array) else {
            return Vec::new();
        };
        records
            .iter()
            .enumerate()
            .filter_map(|(i, record)| match T::deserialize(record) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    debug!("skipping {}[{}]: {}", key, i, e);
                    None
                }
            })
            .collect()
    }

    fn build(document: &Value) -> DomainResult<Model> {
        let mut builder = HierarchyBuilder::new();

        for entry in Self::entries::<AssemblyEntry>(document, "assemblies") {
            let id = entry.id.clone();
            if !builder.add_assembly(entry.into()) {
                warn!("skipping duplicate assembly id {}", id);
            }
        }
        for entry in Self::entries::<PartEntry>(document, "parts") {
            let (id, assembly_id) = (entry.id.clone(), entry.assembly_id.clone());
            if !builder.add_part(entry.into()) {
                warn!("skipping part {}: unknown assembly {}", id, assembly_id);
            }
        }

        let Some(hierarchy) = builder.build()? else {
            return Ok(Model::empty());
        };
        if !hierarchy.orphaned.is_empty() {
            warn!(
                "dropping assemblies unreachable from the root: {}",
                hierarchy.orphaned.join(", ")
            );
        }
        Ok(Model::new(hierarchy.root))
    }
}

impl ModelReader for RecordsReader {
    fn read_model(&self, stream: &mut dyn Read) -> Model {
        let document: Value = match serde_json::from_reader(stream) {
            Ok(document) => document,
            Err(e) => {
                warn!("unparsable record document: {}", e);
                return Model::empty();
            }
        };

        Self::build(&document).unwrap_or_else(|e| {
            warn!("cannot resolve assembly hierarchy: {}", e);
            Model::degraded(format!("{INVALID_HIERARCHY}: {e}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_with_wrong_field_type_is_skipped() {
        let document = json!({
            "assemblies": [
                { "id": "root", "name": "Root" },
                { "id": 7, "name": "Numeric" },
                { "id": "noname" }
            ]
        });

        let entries = RecordsReader::entries::<AssemblyEntry>(&document, "assemblies");

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "root");
    }

    #[test]
    fn missing_collection_yields_no_entries() {
        let entries = RecordsReader::entries::<PartEntry>(&json!({}), "parts");
        assert!(entries.is_empty());
    }

    #[test]
    fn non_object_document_is_an_empty_model() {
        let model = RecordsReader::build(&json!([1, 2, 3])).unwrap();
        assert_eq!(model, Model::empty());
    }
}
