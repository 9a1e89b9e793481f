//! Tagged-line reader
//!
//! ```text
//! Assembly: Engine
//! Part: Piston
//! Assembly: Head
//! Part: Valve
//! EndAssembly
//! EndAssembly
//! ```
//!
//! Every line is trimmed before matching. `Assembly:` opens a scope, `Part:`
//! adds a part to the innermost scope, `EndAssembly` closes it. Unknown lines
//! are ignored and scopes left open at end of input are closed implicitly.
//!
//! Lines are split on raw bytes; invalid UTF-8 is replaced, never fatal.
//! Assemblies nested deeper than [`MAX_DEPTH`] are flattened into the deepest
//! open scope and their `EndAssembly` lines are matched without closing it.

use std::io::{BufRead, BufReader, Read};

use tracing::{debug, warn};

use crate::application::readers::ModelReader;
use crate::domain::{Assembly, Model, Part, DEFAULT_ROOT_NAME, MAX_DEPTH};

const ASSEMBLY_PREFIX: &str = "Assembly:";
const PART_PREFIX: &str = "Part:";
const END_ASSEMBLY: &str = "EndAssembly";

#[derive(Debug, PartialEq, Eq)]
enum TaggedLine<'a> {
    Open(&'a str),
    Part(&'a str),
    End,
}

impl<'a> TaggedLine<'a> {
    fn parse(line: &'a str) -> Option<Self> {
        let line = line.trim();
        if let Some(name) = line.strip_prefix(ASSEMBLY_PREFIX) {
            Some(Self::Open(name.trim()))
        } else if let Some(name) = line.strip_prefix(PART_PREFIX) {
            Some(Self::Part(name.trim()))
        } else if line == END_ASSEMBLY {
            Some(Self::End)
        } else {
            None
        }
    }
}

/// Open scopes, innermost last. The root scope is never popped.
#[derive(Debug)]
struct ScopeStack {
    scopes: Vec<Assembly>,
    /// `Assembly:` lines past the depth limit still waiting for their `EndAssembly`
    flattened: usize,
}

impl ScopeStack {
    fn new() -> Self {
        Self {
            scopes: vec![Assembly::new(DEFAULT_ROOT_NAME)],
            flattened: 0,
        }
    }

    fn apply(&mut self, line: TaggedLine<'_>) {
        match line {
            TaggedLine::Open(name) => {
                if self.scopes.len() <= MAX_DEPTH {
                    self.scopes.push(Assembly::new(name));
                } else {
                    if self.flattened == 0 {
                        warn!(
                            "assemblies nested deeper than {} levels are flattened",
                            MAX_DEPTH
                        );
                    }
                    self.flattened += 1;
                }
            }
            TaggedLine::End if self.flattened > 0 => self.flattened -= 1,
            TaggedLine::Part(name) => {
                if let Some(scope) = self.scopes.last_mut() {
                    scope.push_part(Part::new(name));
                }
            }
            TaggedLine::End => {
                if !self.close_innermost() {
                    debug!("ignoring EndAssembly at root level");
                }
            }
        }
    }

    /// Attach the innermost scope to its parent. False when only the root is open.
    fn close_innermost(&mut self) -> bool {
        if self.scopes.len() < 2 {
            return false;
        }
        match (self.scopes.pop(), self.scopes.last_mut()) {
            (Some(finished), Some(parent)) => {
                parent.push_child(finished);
                true
            }
            _ => false,
        }
    }

    fn finish(mut self) -> Assembly {
        let open = self.scopes.len().saturating_sub(1);
        if open > 0 {
            debug!("closing {} unterminated assemblies at end of input", open);
        }
        while self.close_innermost() {}
        self.scopes
            .pop()
            .unwrap_or_else(|| Assembly::new(DEFAULT_ROOT_NAME))
    }
}

/// Stack-based reader for the `Assembly:` / `Part:` / `EndAssembly` format.
#[derive(Debug, Default)]
pub struct TaggedLineReader;

impl TaggedLineReader {
    pub fn new() -> Self {
        Self
    }
}

impl ModelReader for TaggedLineReader {
    fn read_model(&self, stream: &mut dyn Read) -> Model {
        let mut scopes = ScopeStack::new();
        let mut reader = BufReader::new(stream);
        let mut buf = Vec::new();

        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf);
                    if let Some(tagged) = TaggedLine::parse(&line) {
                        scopes.apply(tagged);
                    }
                }
                Err(e) => {
                    warn!("stopping tagged input at read error: {}", e);
                    break;
                }
            }
        }

        Model::new(scopes.finish())
    }
}
