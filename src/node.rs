//! Document tree consumed by the read archive.
//!
//! A [`Node`] is the already-parsed shape of one YAML document: nulls, opaque scalar
//! text, sequences and mappings. Aliases are expanded by the loader before a tree is
//! handed to the archive, so a `Node` never refers to another node.

use std::fmt;

use ahash::AHashMap;

/// Runtime shape of a [`Node`], used for expected-type checks and diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Null,
    Scalar,
    Sequence,
    Mapping,
}

impl NodeKind {
    /// Name used in error messages (`Null`, `Scalar`, `Sequence`, `Mapping`).
    pub const fn as_str(self) -> &'static str {
        match self {
            NodeKind::Null => "Null",
            NodeKind::Scalar => "Scalar",
            NodeKind::Sequence => "Sequence",
            NodeKind::Mapping => "Mapping",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One value of a YAML document tree.
///
/// Scalars keep their text untouched; turning that text into numbers, booleans or
/// other parseable types is done by whoever consumes the node.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Null,
    Scalar(String),
    Sequence(Vec<Node>),
    Map(Mapping),
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Null => NodeKind::Null,
            Node::Scalar(_) => NodeKind::Scalar,
            Node::Sequence(_) => NodeKind::Sequence,
            Node::Map(_) => NodeKind::Mapping,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Node::Null)
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Node::Scalar(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Node]> {
        match self {
            Node::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Node::Map(mapping) => Some(mapping),
            _ => None,
        }
    }

    pub fn as_mapping_mut(&mut self) -> Option<&mut Mapping> {
        match self {
            Node::Map(mapping) => Some(mapping),
            _ => None,
        }
    }

    /// Look up `key` when this node is a mapping.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_mapping().and_then(|m| m.get(key))
    }

    /// Total number of nodes in this subtree, the node itself included.
    pub(crate) fn count(&self) -> usize {
        match self {
            Node::Null | Node::Scalar(_) => 1,
            Node::Sequence(items) => 1 + items.iter().map(Node::count).sum::<usize>(),
            Node::Map(mapping) => 1 + mapping.values().map(Node::count).sum::<usize>(),
        }
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Node::Scalar(text.to_owned())
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Node::Scalar(text)
    }
}

impl From<Vec<Node>> for Node {
    fn from(items: Vec<Node>) -> Self {
        Node::Sequence(items)
    }
}

impl From<Mapping> for Node {
    fn from(mapping: Mapping) -> Self {
        Node::Map(mapping)
    }
}

/// Insertion-ordered mapping from text keys to nodes. Keys are unique.
#[derive(Clone, Default)]
pub struct Mapping {
    entries: Vec<(String, Node)>,
    /// key -> position in `entries`
    index: AHashMap<String, usize>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: AHashMap::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.index.get(key).and_then(|&pos| self.entries.get(pos)).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        let pos = *self.index.get(key)?;
        self.entries.get_mut(pos).map(|(_, v)| v)
    }

    /// Insert or replace. A replaced entry keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: Node) -> Option<Node> {
        let key = key.into();
        if let Some(&pos) = self.index.get(&key) {
            if let Some((_, slot)) = self.entries.get_mut(pos) {
                return Some(std::mem::replace(slot, value));
            }
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, value));
        None
    }

    /// Insert only when `key` is not present yet. Returns whether the entry was added.
    pub fn insert_if_absent(&mut self, key: &str, value: Node) -> bool {
        if self.contains_key(key) {
            return false;
        }
        self.index.insert(key.to_owned(), self.entries.len());
        self.entries.push((key.to_owned(), value));
        true
    }

    /// Remove `key`, preserving the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<Node> {
        let pos = self.index.remove(key)?;
        if pos >= self.entries.len() {
            return None;
        }
        let (_, value) = self.entries.remove(pos);
        for (later, _) in &self.entries[pos..] {
            if let Some(slot) = self.index.get_mut(later) {
                *slot -= 1;
            }
        }
        Some(value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Node> {
        self.entries.iter().map(|(_, v)| v)
    }

    /// Keys in lexicographic order; diagnostics only.
    pub fn sorted_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.keys().collect();
        keys.sort_unstable();
        keys
    }
}

impl PartialEq for Mapping {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl fmt::Debug for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Into<String>> FromIterator<(K, Node)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (K, Node)>>(iter: I) -> Self {
        let mut mapping = Mapping::new();
        for (key, value) in iter {
            mapping.insert(key, value);
        }
        mapping
    }
}

impl IntoIterator for Mapping {
    type Item = (String, Node);
    type IntoIter = std::vec::IntoIter<(String, Node)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
