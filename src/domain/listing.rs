//! Deterministic rendering of a model.
//!
//! Readers insert children in whatever order their input dictates. Every
//! renderer here works on the canonical form of the tree, where parts and
//! child assemblies are sorted by name at every level.

use std::cmp::Ordering;
use std::fmt;

use itertools::Itertools;
use termtree::Tree;

use crate::domain::entities::{Assembly, Model};

const INDENT: &str = "  ";

/// Sorted copy of the subtree.
///
/// Parts are ordered by name. Child assemblies are ordered by name, and
/// siblings sharing a name by the pre-order token stream of their sorted
/// subtree, so the result does not depend on insertion order even with
/// duplicate names.
pub fn canonical(assembly: &Assembly) -> Assembly {
    fold_up(assembly, |source, mut children| {
        children.sort_by(compare_sorted);
        Assembly {
            id: source.id.clone(),
            name: source.name.clone(),
            children,
            parts: source
                .parts
                .iter()
                .cloned()
                .sorted_by(|a, b| a.name.cmp(&b.name))
                .collect(),
        }
    })
}

/// Flatten the model into indented listing lines.
///
/// ```text
/// Assembly: Root
///   Assembly: Engine
///     Part: Piston
/// ```
pub fn render_lines(model: &Model) -> Vec<String> {
    let root = canonical(model.root());
    let mut lines = Vec::with_capacity(root.assembly_count() + root.part_count());
    for (depth, assembly) in root.walk() {
        let indent = INDENT.repeat(depth);
        lines.push(format!("{indent}Assembly: {}", assembly.name));
        for part in &assembly.parts {
            lines.push(format!("{indent}{INDENT}Part: {}", part.name));
        }
    }
    lines
}

/// Render the model as a box-drawing tree, same ordering as [`render_lines`].
pub fn render_tree(model: &Model) -> Tree<String> {
    fold_up(&canonical(model.root()), |assembly, children| {
        let mut tree = Tree::new(format!("Assembly: {}", assembly.name));
        for part in &assembly.parts {
            tree.push(Tree::new(format!("Part: {}", part.name)));
        }
        for child in children {
            tree.push(child);
        }
        tree
    })
}

/// Post-order fold over the subtree with an explicit stack.
///
/// `leave` receives each assembly together with the folded values of its
/// children, in stored order.
fn fold_up<'a, T>(root: &'a Assembly, mut leave: impl FnMut(&'a Assembly, Vec<T>) -> T) -> T {
    struct Frame<'a, T> {
        source: &'a Assembly,
        done: Vec<T>,
    }

    impl<'a, T> Frame<'a, T> {
        fn new(source: &'a Assembly) -> Self {
            Self {
                source,
                done: Vec::with_capacity(source.children.len()),
            }
        }

        fn next_child(&self) -> Option<&'a Assembly> {
            self.source.children.get(self.done.len())
        }
    }

    let mut bottom = Frame::new(root);
    let mut stack: Vec<Frame<'a, T>> = Vec::new();
    loop {
        let top = stack.last_mut().unwrap_or(&mut bottom);
        if let Some(child) = top.next_child() {
            stack.push(Frame::new(child));
            continue;
        }
        match stack.pop() {
            Some(frame) => {
                let value = leave(frame.source, frame.done);
                stack.last_mut().unwrap_or(&mut bottom).done.push(value);
            }
            None => return leave(bottom.source, bottom.done),
        }
    }
}

/// Total order on sorted subtrees: name first, then structure.
fn compare_sorted(a: &Assembly, b: &Assembly) -> Ordering {
    a.name.cmp(&b.name).then_with(|| Tokens::of(a).cmp(Tokens::of(b)))
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Token<'a> {
    Open(&'a str),
    Part(&'a str),
    Close,
}

/// Lazy pre-order token stream of a subtree; comparison stops at the first difference.
struct Tokens<'a> {
    pending: Vec<Pending<'a>>,
}

enum Pending<'a> {
    Enter(&'a Assembly),
    Emit(Token<'a>),
}

impl<'a> Tokens<'a> {
    fn of(assembly: &'a Assembly) -> Self {
        Self {
            pending: vec![Pending::Enter(assembly)],
        }
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        match self.pending.pop()? {
            Pending::Enter(assembly) => {
                self.pending.push(Pending::Emit(Token::Close));
                self.pending
                    .extend(assembly.children.iter().rev().map(Pending::Enter));
                self.pending.extend(
                    assembly
                        .parts
                        .iter()
                        .rev()
                        .map(|part| Pending::Emit(Token::Part(&part.name))),
                );
                Some(Token::Open(&assembly.name))
            }
            Pending::Emit(token) => Some(token),
        }
    }
}

/// Size statistics of a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelSummary {
    pub assemblies: usize,
    pub parts: usize,
    pub depth: usize,
}

impl From<&Model> for ModelSummary {
    fn from(model: &Model) -> Self {
        let root = model.root();
        Self {
            assemblies: root.assembly_count(),
            parts: root.part_count(),
            depth: root.depth(),
        }
    }
}

impl fmt::Display for ModelSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} assemblies, {} parts, depth {}",
            self.assemblies, self.parts, self.depth
        )
    }
}
