//! YAML merge keys (`<<`).
//!
//! A mapping that contains `<<` borrows the entries of the referenced mapping(s) without
//! overriding anything it spells out itself:
//!
//! ```yaml
//! base: &base { name: default, age: 5 }
//! person:
//!   <<: *base
//!   name: bob        # explicit key wins over the merged one
//! ```
//!
//! Resolution is shallow. Mappings reachable through merged entries keep their own `<<`
//! until they are used as a scope themselves.

use std::fmt;

use tracing::debug;

use crate::node::{Mapping, Node};

/// The reserved merge key.
pub const MERGE_KEY: &str = "<<";

/// Shape of a `<<` value that cannot be merged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MergeKeyError {
    Scalar,
    Null,
    SequenceOfNonMapping,
}

impl MergeKeyError {
    /// Diagnostic note, completed by the archive with the node summary and field path.
    pub fn note(self) -> &'static str {
        match self {
            MergeKeyError::Scalar => "has invalid merge key type (Scalar) within",
            MergeKeyError::Null => "has invalid merge key type (Null) within",
            MergeKeyError::SequenceOfNonMapping => {
                "has invalid merge key type (Sequence-of-non-Mapping) within"
            }
        }
    }
}

impl fmt::Display for MergeKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.note())
    }
}

impl std::error::Error for MergeKeyError {}

/// Expand the merge key of `mapping` in place.
///
/// A no-op when `<<` is absent. Otherwise the key is removed and the entries of its
/// value are copied over, skipping keys the mapping already has. For a sequence of
/// mappings, elements are applied in order, so an earlier element wins over a later one.
pub fn resolve_merge_keys(mapping: &mut Mapping) -> Result<(), MergeKeyError> {
    let Some(merged) = mapping.remove(MERGE_KEY) else {
        return Ok(());
    };
    match merged {
        Node::Map(source) => {
            let added = copy_absent(source, mapping);
            debug!(added, "merged mapping into host");
            Ok(())
        }
        Node::Sequence(items) => {
            // Every element must be a mapping; check before touching the host.
            if items.iter().any(|item| !matches!(item, Node::Map(_))) {
                return Err(MergeKeyError::SequenceOfNonMapping);
            }
            let count = items.len();
            let mut added = 0;
            for item in items {
                if let Node::Map(source) = item {
                    added += copy_absent(source, mapping);
                }
            }
            debug!(added, sources = count, "merged sequence of mappings into host");
            Ok(())
        }
        Node::Scalar(_) => Err(MergeKeyError::Scalar),
        Node::Null => Err(MergeKeyError::Null),
    }
}

fn copy_absent(source: Mapping, destination: &mut Mapping) -> usize {
    let mut added = 0;
    for (key, value) in source {
        if destination.insert_if_absent(&key, value) {
            added += 1;
        }
    }
    added
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(text: &str) -> Node {
        Node::from(text)
    }

    fn map<const N: usize>(entries: [(&str, Node); N]) -> Mapping {
        entries.into_iter().collect()
    }

    #[test]
    fn no_merge_key_is_identity() {
        let mut m = map([("b", s("1")), ("a", s("2"))]);
        let before = m.clone();
        resolve_merge_keys(&mut m).unwrap();
        assert_eq!(m, before);
        assert_eq!(m.keys().collect::<Vec<_>>(), ["b", "a"]);
    }

    #[test]
    fn explicit_keys_win_over_merged_mapping() {
        let mut m = map([
            ("a", s("1")),
            (MERGE_KEY, Node::Map(map([("a", s("2")), ("b", s("2"))]))),
        ]);
        resolve_merge_keys(&mut m).unwrap();
        assert_eq!(m, map([("a", s("1")), ("b", s("2"))]));
    }

    #[test]
    fn earlier_sequence_elements_win() {
        let mut m = map([
            ("a", s("1")),
            (
                MERGE_KEY,
                Node::Sequence(vec![
                    Node::Map(map([("b", s("2")), ("c", s("2"))])),
                    Node::Map(map([("b", s("3")), ("d", s("3"))])),
                ]),
            ),
        ]);
        resolve_merge_keys(&mut m).unwrap();
        assert_eq!(
            m,
            map([("a", s("1")), ("b", s("2")), ("c", s("2")), ("d", s("3"))])
        );
    }

    #[test]
    fn invalid_merge_values_are_rejected() {
        let mut scalar = map([(MERGE_KEY, s("x"))]);
        assert_eq!(resolve_merge_keys(&mut scalar), Err(MergeKeyError::Scalar));

        let mut null = map([(MERGE_KEY, Node::Null)]);
        assert_eq!(resolve_merge_keys(&mut null), Err(MergeKeyError::Null));

        let mut seq = map([(MERGE_KEY, Node::Sequence(vec![s("1"), s("2")]))]);
        assert_eq!(
            resolve_merge_keys(&mut seq),
            Err(MergeKeyError::SequenceOfNonMapping)
        );
    }

    #[test]
    fn resolution_is_shallow() {
        let nested = map([(MERGE_KEY, Node::Map(map([("deep", s("1"))])))]);
        let mut m = map([(MERGE_KEY, Node::Map(map([("inner", Node::Map(nested.clone()))])))]);
        resolve_merge_keys(&mut m).unwrap();
        assert_eq!(m.get("inner"), Some(&Node::Map(nested)));
    }
}
