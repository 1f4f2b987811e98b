//! The read archive: one scope of a document tree being decoded into a native value.
//!
//! A [`ReadArchive`] is created for the document root and then once per nested value
//! (struct field, map entry, sequence element, enum payload). Each nested archive keeps
//! a borrowed link to the archive that created it. The link is used only to render the
//! path of an error, never to read data, and it cannot outlive the decode call because
//! every archive lives on the stack of the call that made it.
//!
//! ```rust
//! use saphyr_archive::{NodeKind, Options, ReadArchive, load_str};
//!
//! let root = load_str("name: bob\n<<: { name: default, age: 5 }\n").unwrap();
//! let archive = ReadArchive::new(&root, Options::default()).unwrap();
//! assert_eq!(archive.maybe_get_field("age").and_then(|n| n.as_scalar()), Some("5"));
//!
//! let name = archive.get_field("name", NodeKind::Scalar).unwrap().unwrap();
//! assert_eq!(name.as_scalar(), Some("bob"));
//! assert!(archive.check_all_accepted().is_err()); // `age` was never consumed
//! ```

use std::borrow::Cow;
use std::cell::RefCell;

use ahash::AHashSet;
use tracing::{debug, trace};

use crate::diagnostics::{self, NodeSummary, VisitName};
use crate::error::{Error, ErrorKind};
use crate::merge::{MERGE_KEY, resolve_merge_keys};
use crate::node::{Mapping, Node, NodeKind};
use crate::options::Options;

/// What an archive reads fields from.
enum Scope<'a> {
    /// A real node, merge keys already resolved when it is a mapping.
    Node(Cow<'a, Node>),
    /// One `(key, value)` pair standing in for a single-entry mapping.
    Mapish { key: String, value: &'a Node },
}

/// Recursive read/validate state over one scope of a document tree.
pub struct ReadArchive<'a> {
    scope: Scope<'a>,
    /// Prior value of the scope, as a tree, when decoding over defaults.
    defaults: Option<&'a Node>,
    options: Options,
    parent: Option<&'a ReadArchive<'a>>,
    /// Field names looked up so far; only meaningful for a mapping scope.
    visited: RefCell<AHashSet<String>>,
    /// Field being decoded right now; diagnostics only.
    visit: RefCell<Option<VisitName>>,
}

impl<'a> ReadArchive<'a> {
    /// Root archive over `root`. A mapping root has its merge keys resolved here.
    pub fn new(root: &'a Node, options: Options) -> Result<Self, Error> {
        Self::with_defaults(root, None, options)
    }

    /// Root archive over `root` that falls back to `defaults` for absent values.
    pub fn with_defaults(
        root: &'a Node,
        defaults: Option<&'a Node>,
        options: Options,
    ) -> Result<Self, Error> {
        let mut archive = Self::build(Scope::Node(Cow::Borrowed(root)), defaults, options, None);
        if let Node::Map(mapping) = root {
            if mapping.contains_key(MERGE_KEY) {
                let mut owned = mapping.clone();
                let outcome = resolve_merge_keys(&mut owned);
                archive.scope = Scope::Node(Cow::Owned(Node::Map(owned)));
                if let Err(err) = outcome {
                    return Err(archive.report_error(ErrorKind::MergeKeyType, err.note()));
                }
            }
        }
        Ok(archive)
    }

    fn build(
        scope: Scope<'a>,
        defaults: Option<&'a Node>,
        options: Options,
        parent: Option<&'a ReadArchive<'a>>,
    ) -> Self {
        Self {
            scope,
            defaults,
            options,
            parent,
            visited: RefCell::new(AHashSet::new()),
            visit: RefCell::new(None),
        }
    }

    /// Nested archive over a node obtained from [`ReadArchive::get_field`].
    pub fn child(&'a self, node: Cow<'a, Node>, defaults: Option<&'a Node>) -> ReadArchive<'a> {
        Self::build(Scope::Node(node), defaults, self.options, Some(self))
    }

    /// Nested archive that presents `value` as the only entry `key` of a mapping.
    pub fn mapish(&'a self, key: impl Into<String>, value: &'a Node) -> ReadArchive<'a> {
        let scope = Scope::Mapish { key: key.into(), value };
        Self::build(scope, None, self.options, Some(self))
    }

    pub fn options(&self) -> Options {
        self.options
    }

    pub fn is_mapish(&self) -> bool {
        matches!(self.scope, Scope::Mapish { .. })
    }

    /// The scope node, `None` for a map-ish archive.
    pub fn node(&self) -> Option<&Node> {
        match &self.scope {
            Scope::Node(node) => Some(node),
            Scope::Mapish { .. } => None,
        }
    }

    pub(crate) fn mapping(&self) -> Option<&Mapping> {
        self.node().and_then(Node::as_mapping)
    }

    pub(crate) fn defaults(&self) -> Option<&'a Node> {
        self.defaults
    }

    /// Prior value of field `name`, when decoding over defaults.
    pub(crate) fn default_for(&self, name: &str) -> Option<&'a Node> {
        match self.scope {
            Scope::Node(_) => self.defaults.and_then(|d| d.get(name)),
            Scope::Mapish { .. } => None,
        }
    }

    /// True for a map-ish scope, or for a real scope that is not null.
    pub fn has_root(&self) -> bool {
        match &self.scope {
            Scope::Mapish { .. } => true,
            Scope::Node(node) => !node.is_null(),
        }
    }

    /// Probe for `name` without any checks or bookkeeping.
    pub fn maybe_get_field(&self, name: &str) -> Option<&Node> {
        match &self.scope {
            Scope::Mapish { key, value } => (key == name).then_some(*value),
            Scope::Node(node) => node.get(name),
        }
    }

    /// Fetch `name`, requiring it to be a node of kind `expected`.
    ///
    /// An absent key is an error unless `allow_cpp_with_no_yaml` is set, in which case
    /// `Ok(None)` tells the caller to leave the field alone. Returned mappings have their
    /// merge keys resolved. The name is recorded as consumed.
    pub fn get_field(&self, name: &str, expected: NodeKind) -> Result<Option<Cow<'_, Node>>, Error> {
        let Some(found) = self.maybe_get_field(name) else {
            if !self.options.allow_cpp_with_no_yaml {
                return Err(self.report_error(ErrorKind::MissingEntry, "is missing"));
            }
            debug!(field = name, "field absent from document; keeping its default");
            return Ok(None);
        };
        let actual = found.kind();
        if actual != expected {
            return Err(self.report_error(
                ErrorKind::TypeMismatch,
                &format!("has non-{expected} ({actual})"),
            ));
        }
        let result = match found {
            Node::Map(mapping) if mapping.contains_key(MERGE_KEY) => {
                let mut owned = mapping.clone();
                resolve_merge_keys(&mut owned)
                    .map_err(|err| self.report_error(ErrorKind::MergeKeyType, err.note()))?;
                debug!(field = name, "resolved merge keys");
                Cow::Owned(Node::Map(owned))
            }
            _ => Cow::Borrowed(found),
        };
        if let Scope::Node(_) = self.scope {
            self.visited.borrow_mut().insert(name.to_owned());
        }
        Ok(Some(result))
    }

    /// Fail when the scope mapping holds keys that no field consumed.
    ///
    /// Every unrecognized key is named, in sorted order. Calling this on a map-ish archive
    /// or on a non-mapping scope is a driver bug and reported as
    /// [`ErrorKind::InvariantViolation`].
    pub fn check_all_accepted(&self) -> Result<(), Error> {
        let Some(mapping) = self.mapping() else {
            return Err(self.report_error(
                ErrorKind::InvariantViolation,
                "cannot check accepted keys outside a mapping scope for",
            ));
        };
        if self.options.allow_yaml_with_no_cpp {
            return Ok(());
        }
        let unrecognized: Vec<&str> = {
            let visited = self.visited.borrow();
            let mut keys: Vec<&str> =
                mapping.keys().filter(|k| !visited.contains(*k)).collect();
            keys.sort_unstable();
            keys
        };
        match unrecognized.as_slice() {
            [] => Ok(()),
            [key] => Err(self.report_error(
                ErrorKind::UnrecognizedKey,
                &format!("key {key} did not match any visited value"),
            )),
            keys => Err(self.report_error(
                ErrorKind::UnrecognizedKey,
                &format!("keys {{{}}} did not match any visited value", keys.join(", ")),
            )),
        }
    }

    /// Mark `name` (of native type `type_tag`) as the field being decoded.
    pub fn begin_visit(&self, type_tag: &'static str, name: &str) {
        trace!(type_tag, field = name, "visit");
        *self.visit.borrow_mut() = Some(VisitName {
            type_tag,
            name: name.to_owned(),
        });
    }

    pub fn end_visit(&self) {
        *self.visit.borrow_mut() = None;
    }

    /// Build the error for `note`, with this archive's scope, the field being visited and
    /// the whole chain of enclosing archives.
    pub fn report_error(&self, kind: ErrorKind, note: &str) -> Error {
        let msg = diagnostics::render(self, note);
        debug!(?kind, "{msg}");
        Error::archive(kind, msg)
    }

    pub(crate) fn summary(&self) -> NodeSummary<'_> {
        match &self.scope {
            Scope::Node(node) => NodeSummary::Node(node),
            Scope::Mapish { key, .. } => NodeSummary::Mapish(key),
        }
    }

    pub(crate) fn current_visit(&self) -> Option<VisitName> {
        self.visit.borrow().clone()
    }

    pub(crate) fn parent(&self) -> Option<&ReadArchive<'a>> {
        self.parent
    }
}
