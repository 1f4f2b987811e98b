//! Loader: YAML text to [`Node`] trees, built from `saphyr_parser` events.
//!
//! Responsibilities
//! - Classify scalars: plain `~`/`null`/empty and `!!null`-tagged scalars become `Null`,
//!   everything else keeps its text.
//! - Record anchors and expand aliases, so the archive only ever sees plain trees.
//! - Apply the duplicate key policy.
//! - Enforce depth, node count and alias expansion limits.
//!
//! Anchors are registered when their node is complete. An alias that refers to an anchor
//! still being built (a recursive structure) is reported as an unknown anchor.

use std::borrow::Cow;

use ahash::AHashMap;
use saphyr_parser::{Event, Parser, ScalarStyle, StrInput};
use tracing::debug;

use crate::error::{Error, Location, location_from_span};
use crate::node::{Mapping, Node};
use crate::options::{DuplicateKeyPolicy, LoadOptions};
use crate::tags::{is_null_tag, is_plain_null, is_str_tag};

/// Container under construction.
enum Frame {
    Seq {
        anchor: usize,
        items: Vec<Node>,
    },
    Map {
        anchor: usize,
        mapping: Mapping,
        /// Key read, value pending.
        key: Option<(String, Location)>,
    },
}

struct Loader<'a> {
    parser: Parser<'a, StrInput<'a>>,
    options: LoadOptions,
    /// Completed anchored nodes of the current document (id -> node).
    anchors: AHashMap<usize, Node>,
    /// Per-anchor expansion counters.
    expansions: AHashMap<usize, usize>,
    total_expansions: usize,
    stack: Vec<Frame>,
    nodes: usize,
    root: Option<Node>,
    document_start: Location,
    documents: Vec<(Node, Location)>,
}

impl<'a> Loader<'a> {
    fn new(input: &'a str, options: LoadOptions) -> Self {
        Self {
            parser: Parser::new_from_str(input),
            options,
            anchors: AHashMap::new(),
            expansions: AHashMap::new(),
            total_expansions: 0,
            stack: Vec::new(),
            nodes: 0,
            root: None,
            document_start: Location::UNKNOWN,
            documents: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<(Node, Location)>, Error> {
        while let Some(item) = self.parser.next() {
            let (event, span) = item.map_err(Error::from_scan_error)?;
            let location = location_from_span(&span);
            match event {
                Event::StreamStart | Event::StreamEnd | Event::Nothing => {}
                Event::DocumentStart(_) => {
                    self.reset_document();
                    self.document_start = location;
                }
                Event::DocumentEnd => self.finish_document(),
                Event::Scalar(value, style, anchor_id, tag) => {
                    let tag = tag.map(|t| t.to_string());
                    self.bump_nodes(1, location)?;
                    if self.expects_key() {
                        if anchor_id != 0 {
                            let node = scalar_node(value.clone(), style, tag.as_deref());
                            self.anchors.insert(anchor_id, node);
                        }
                        self.set_key(value.into_owned(), location);
                        continue;
                    }
                    if self.stack.is_empty()
                        && value.is_empty()
                        && matches!(style, ScalarStyle::Plain)
                        && tag.is_none()
                        && anchor_id == 0
                    {
                        // bare `---` with no content: not a document
                        continue;
                    }
                    let node = scalar_node(value, style, tag.as_deref());
                    if anchor_id != 0 {
                        self.anchors.insert(anchor_id, node.clone());
                    }
                    self.complete(node)?;
                }
                Event::SequenceStart(anchor_id, _tag) => {
                    self.open(location)?;
                    self.stack.push(Frame::Seq {
                        anchor: anchor_id,
                        items: Vec::new(),
                    });
                }
                Event::MappingStart(anchor_id, _tag) => {
                    self.open(location)?;
                    self.stack.push(Frame::Map {
                        anchor: anchor_id,
                        mapping: Mapping::new(),
                        key: None,
                    });
                }
                Event::SequenceEnd | Event::MappingEnd => {
                    let (anchor, node) = match self.stack.pop() {
                        Some(Frame::Seq { anchor, items }) => (anchor, Node::Sequence(items)),
                        Some(Frame::Map { anchor, mapping, .. }) => (anchor, Node::Map(mapping)),
                        None => {
                            return Err(Error::msg("list or mapping end with no start")
                                .with_location(location));
                        }
                    };
                    if anchor != 0 {
                        self.anchors.insert(anchor, node.clone());
                    }
                    self.complete(node)?;
                }
                Event::Alias(anchor_id) => {
                    let node = self.expand_alias(anchor_id, location)?;
                    if self.expects_key() {
                        let Node::Scalar(text) = node else {
                            return Err(Error::msg("alias used as a mapping key must refer to a scalar")
                                .with_location(location));
                        };
                        self.set_key(text, location);
                        continue;
                    }
                    self.complete(node)?;
                }
            }
        }
        // Streams without explicit document markers still produce one document.
        self.finish_document();
        Ok(self.documents)
    }

    fn reset_document(&mut self) {
        self.anchors.clear();
        self.expansions.clear();
        self.total_expansions = 0;
        self.stack.clear();
        self.nodes = 0;
        self.root = None;
    }

    fn finish_document(&mut self) {
        if let Some(root) = self.root.take() {
            debug!(nodes = self.nodes, "loaded YAML document");
            self.documents.push((root, self.document_start));
        }
        self.reset_document();
    }

    fn expects_key(&self) -> bool {
        matches!(self.stack.last(), Some(Frame::Map { key: None, .. }))
    }

    fn set_key(&mut self, text: String, location: Location) {
        if let Some(Frame::Map { key, .. }) = self.stack.last_mut() {
            *key = Some((text, location));
        }
    }

    fn open(&mut self, location: Location) -> Result<(), Error> {
        if self.expects_key() {
            return Err(Error::msg("non-scalar mapping keys are not supported").with_location(location));
        }
        self.bump_nodes(1, location)?;
        let depth = self.stack.len() + 1;
        if depth > self.options.max_depth {
            return Err(Error::limit(
                format!("nesting depth {depth} > {}", self.options.max_depth),
                location,
            ));
        }
        Ok(())
    }

    fn bump_nodes(&mut self, count: usize, location: Location) -> Result<(), Error> {
        self.nodes = self.nodes.saturating_add(count);
        if self.nodes > self.options.max_nodes {
            return Err(Error::limit(
                format!("node count {} > {}", self.nodes, self.options.max_nodes),
                location,
            ));
        }
        Ok(())
    }

    fn expand_alias(&mut self, anchor_id: usize, location: Location) -> Result<Node, Error> {
        let limits = self.options.alias_limits;
        let node = self
            .anchors
            .get(&anchor_id)
            .ok_or(Error::UnknownAnchor { id: anchor_id, location })?
            .clone();

        let count = self.expansions.entry(anchor_id).or_insert(0);
        *count += 1;
        if *count > limits.max_alias_expansions_per_anchor {
            return Err(Error::limit(
                format!(
                    "alias expansion limit exceeded for anchor id {anchor_id}: {} > {}",
                    count, limits.max_alias_expansions_per_anchor
                ),
                location,
            ));
        }
        self.total_expansions += 1;
        if self.total_expansions > limits.max_total_alias_expansions {
            return Err(Error::limit(
                format!(
                    "total alias expansions {} > {}",
                    self.total_expansions, limits.max_total_alias_expansions
                ),
                location,
            ));
        }
        self.bump_nodes(node.count(), location)?;
        Ok(node)
    }

    /// Attach a finished node to its container, or make it the document root.
    fn complete(&mut self, node: Node) -> Result<(), Error> {
        match self.stack.last_mut() {
            None => {
                self.root = Some(node);
                Ok(())
            }
            Some(Frame::Seq { items, .. }) => {
                items.push(node);
                Ok(())
            }
            Some(Frame::Map { mapping, key, .. }) => {
                let Some((key, location)) = key.take() else {
                    return Err(Error::msg("mapping value without a key"));
                };
                if !mapping.contains_key(&key) {
                    mapping.insert(key, node);
                    return Ok(());
                }
                match self.options.duplicate_keys {
                    DuplicateKeyPolicy::Error => {
                        Err(Error::msg(format!("duplicate mapping key: {key}")).with_location(location))
                    }
                    DuplicateKeyPolicy::FirstWins => Ok(()),
                    DuplicateKeyPolicy::LastWins => {
                        mapping.insert(key, node);
                        Ok(())
                    }
                }
            }
        }
    }
}

fn scalar_node(value: Cow<'_, str>, style: ScalarStyle, tag: Option<&str>) -> Node {
    if is_null_tag(tag) {
        return Node::Null;
    }
    if matches!(style, ScalarStyle::Plain) && !is_str_tag(tag) && is_plain_null(&value) {
        return Node::Null;
    }
    Node::Scalar(value.into_owned())
}

/// Load a single YAML document. An empty stream loads as [`Node::Null`].
///
/// ```rust
/// use saphyr_archive::{Node, load_str};
///
/// let node = load_str("a: [1, ~]\n").unwrap();
/// let items = node.get("a").and_then(Node::as_sequence).unwrap();
/// assert_eq!(items, &[Node::from("1"), Node::Null]);
/// ```
pub fn load_str(input: &str) -> Result<Node, Error> {
    load_str_with_options(input, LoadOptions::default())
}

/// Load a single YAML document with configurable [`LoadOptions`].
pub fn load_str_with_options(input: &str, options: LoadOptions) -> Result<Node, Error> {
    let mut documents = Loader::new(input, options).run()?.into_iter();
    let root = documents.next().map(|(node, _)| node).unwrap_or(Node::Null);
    if let Some((_, location)) = documents.next() {
        return Err(Error::msg(
            "multiple YAML documents detected; use load_all or from_multiple",
        )
        .with_location(location));
    }
    Ok(root)
}

/// Load a single YAML document from bytes, which must be UTF-8.
pub fn load_slice(bytes: &[u8]) -> Result<Node, Error> {
    let input = std::str::from_utf8(bytes).map_err(|e| Error::msg(format!("invalid UTF-8: {e}")))?;
    load_str(input)
}

/// Load every non-empty document of a YAML stream.
pub fn load_all(input: &str) -> Result<Vec<Node>, Error> {
    load_all_with_options(input, LoadOptions::default())
}

pub fn load_all_with_options(input: &str, options: LoadOptions) -> Result<Vec<Node>, Error> {
    let documents = Loader::new(input, options).run()?;
    Ok(documents.into_iter().map(|(node, _)| node).collect())
}
