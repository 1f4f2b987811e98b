//! Rendering of archive failures.
//!
//! A message names the scope that failed, what went wrong, which field was being decoded,
//! and then every enclosing scope up to the document root:
//!
//! ```text
//! YAML node of type Mapping (with size 1 and keys {other}) is missing entry for u32 value
//!  while accepting YAML node of type Mapping (with size 1 and keys {inner})
//!  while visiting Inner inner
//!  while accepting YAML node of type Mapping (with size 1 and keys {outer})
//!  while visiting Outer outer.
//! ```
//!
//! (shown wrapped; the real message is a single line)

use std::fmt::{self, Write as _};

use crate::archive::ReadArchive;
use crate::node::Node;

/// Shape of an archive scope as printed in messages. Map keys are sorted so the text
/// does not depend on document order.
pub(crate) enum NodeSummary<'n> {
    Node(&'n Node),
    /// A map-ish scope prints as the one-entry mapping it stands for.
    Mapish(&'n str),
}

impl fmt::Display for NodeSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeSummary::Mapish(key) => {
                write!(f, "YAML node of type Mapping (with size 1 and keys {{{key}}})")
            }
            NodeSummary::Node(node) => {
                write!(f, "YAML node of type {}", node.kind())?;
                if let Node::Map(mapping) = node {
                    write!(
                        f,
                        " (with size {} and keys {{{}}})",
                        mapping.len(),
                        mapping.sorted_keys().join(", ")
                    )?;
                }
                Ok(())
            }
        }
    }
}

/// The field an archive is currently decoding: its type tag and name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct VisitName {
    pub(crate) type_tag: &'static str,
    pub(crate) name: String,
}

impl fmt::Display for VisitName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.type_tag, self.name)
    }
}

struct FieldDescriptor(Option<VisitName>);

impl fmt::Display for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(visit) => visit.fmt(f),
            None => f.write_str("<root>"),
        }
    }
}

/// Build the full message for a failure noted at `origin`.
pub(crate) fn render(origin: &ReadArchive<'_>, note: &str) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write!(
        out,
        "{} {note} entry for {}",
        origin.summary(),
        FieldDescriptor(origin.current_visit())
    );
    let mut ancestor = origin.parent();
    while let Some(archive) = ancestor {
        let _ = write!(out, " while accepting {}", archive.summary());
        if let Some(visit) = archive.current_visit() {
            let _ = write!(out, " while visiting {visit}");
        }
        ancestor = archive.parent();
    }
    out.push('.');
    out
}
