//! Domain entities: core data structures

use std::fmt;

/// Root name used when a reader has nothing better to offer.
pub const DEFAULT_ROOT_NAME: &str = "Root";

/// Opaque part identity. Absent for readers whose input carries no ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PartId(pub Option<String>);

/// Opaque assembly identity. Absent for readers whose input carries no ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AssemblyId(pub Option<String>);

impl PartId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(Some(id.into()))
    }

    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl AssemblyId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(Some(id.into()))
    }

    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl fmt::Display for PartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.as_deref().unwrap_or("-"))
    }
}

impl fmt::Display for AssemblyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.as_deref().unwrap_or("-"))
    }
}

/// Leaf node of the assembly tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Part {
    pub id: PartId,
    /// Display name, may be empty
    pub name: String,
}

impl Part {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: PartId::default(),
            name: name.into(),
        }
    }

    pub fn with_id(id: PartId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Composite node grouping child assemblies and parts.
///
/// Children and parts are stored in insertion order, which carries no meaning:
/// renderers sort them before output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assembly {
    pub id: AssemblyId,
    pub name: String,
    pub children: Vec<Assembly>,
    pub parts: Vec<Part>,
}

impl Assembly {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_id(id: AssemblyId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn push_part(&mut self, part: Part) {
        self.parts.push(part);
    }

    pub fn push_child(&mut self, child: Assembly) {
        self.children.push(child);
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty() && self.parts.is_empty()
    }

    /// Number of assemblies in this subtree, including `self`.
    pub fn assembly_count(&self) -> usize {
        self.walk().count()
    }

    /// Number of parts in this subtree.
    pub fn part_count(&self) -> usize {
        self.walk().map(|(_, assembly)| assembly.parts.len()).sum()
    }

    /// Depth of the assembly tree; a lone assembly has depth 1.
    pub fn depth(&self) -> usize {
        self.walk().map(|(depth, _)| depth + 1).max().unwrap_or(1)
    }

    /// Pre-order walk yielding each assembly with its depth below `self`.
    ///
    /// Uses an explicit stack, so arbitrarily deep trees are safe to visit.
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            pending: vec![(0, self)],
        }
    }
}

/// Iterator returned by [`Assembly::walk`].
#[derive(Debug)]
pub struct Walk<'a> {
    pending: Vec<(usize, &'a Assembly)>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (usize, &'a Assembly);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, assembly) = self.pending.pop()?;
        self.pending
            .extend(assembly.children.iter().rev().map(|child| (depth + 1, child)));
        Some((depth, assembly))
    }
}

/// Result of one read operation: a single rooted tree.
///
/// The root always exists. Reader failures are reported through the root's
/// name rather than through an error value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    root: Assembly,
}

impl Model {
    pub fn new(root: Assembly) -> Self {
        Self { root }
    }

    /// Root-only model named "Root".
    pub fn empty() -> Self {
        Self::new(Assembly::new(DEFAULT_ROOT_NAME))
    }

    /// Root-only model whose name describes why reading failed.
    pub fn degraded(reason: impl Into<String>) -> Self {
        Self::new(Assembly::new(reason))
    }

    pub fn root(&self) -> &Assembly {
        &self.root
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Assembly {
        let mut engine = Assembly::new("Engine");
        engine.push_part(Part::new("Piston"));
        engine.push_part(Part::new("Valve"));
        let mut root = Assembly::new("Root");
        root.push_child(engine);
        root.push_child(Assembly::new("Frame"));
        root.push_part(Part::new("Bolt"));
        root
    }

    #[test]
    fn counts_cover_whole_subtree() {
        let root = sample();
        assert_eq!(root.assembly_count(), 3);
        assert_eq!(root.part_count(), 3);
        assert_eq!(root.depth(), 2);
    }

    #[test]
    fn walk_is_pre_order_with_depths() {
        let root = sample();

        let visited: Vec<(usize, &str)> = root
            .walk()
            .map(|(depth, assembly)| (depth, assembly.name.as_str()))
            .collect();

        assert_eq!(visited, vec![(0, "Root"), (1, "Engine"), (1, "Frame")]);
    }

    #[test]
    fn empty_model_has_named_root() {
        let model = Model::empty();
        assert_eq!(model.root().name, "Root");
        assert!(model.root().is_empty());
    }

    #[test]
    fn absent_ids_display_as_dash() {
        assert_eq!(PartId::default().to_string(), "-");
        assert_eq!(AssemblyId::new("a1").to_string(), "a1");
    }
}
