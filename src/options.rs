use std::fmt;

use serde::{Deserialize, Serialize};

/// Strictness policy of a read archive.
///
/// Supplied once to the root archive and inherited unchanged by every nested archive.
/// The default is fully strict: every document key must be consumed by some field and
/// every field must be present in the document.
///
/// ```rust
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Config {
///     name: String,
///     #[serde(default)]
///     retries: u32,
/// }
///
/// let options = saphyr_archive::options! {
///     allow_cpp_with_no_yaml: true,
///     allow_yaml_with_no_cpp: true,
/// };
/// let cfg: Config = saphyr_archive::from_str_with_options("name: x\nextra: 1\n", options).unwrap();
/// assert_eq!(cfg.name, "x");
/// assert_eq!(cfg.retries, 0);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Options {
    /// Document keys that no field consumes are accepted silently.
    pub allow_yaml_with_no_cpp: bool,
    /// Fields without a document key are left at their default value instead of failing.
    /// The default comes from the defaults overlay or from serde (`#[serde(default)]`,
    /// `Option`). A field with neither is still reported as a missing entry.
    pub allow_cpp_with_no_yaml: bool,
    /// When decoding an associative container over a default value, entries of the
    /// default that the document does not mention are kept instead of being dropped.
    pub retain_map_defaults: bool,
}

impl fmt::Display for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{.allow_yaml_with_no_cpp = {}, .allow_cpp_with_no_yaml = {}, .retain_map_defaults = {}}}",
            self.allow_yaml_with_no_cpp, self.allow_cpp_with_no_yaml, self.retain_map_defaults
        )
    }
}

/// Duplicate key handling policy for mappings, applied while loading the document.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DuplicateKeyPolicy {
    /// Error out on encountering a duplicate key.
    Error,
    /// First key wins: later duplicate pairs are dropped.
    FirstWins,
    /// Last key wins: a later duplicate replaces the value but keeps the first position.
    LastWins,
}

/// Limits applied to alias expansion to harden against alias bombs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasLimits {
    /// Maximum number of times a single anchor may be expanded via alias.
    /// Use `usize::MAX` for "unlimited".
    pub max_alias_expansions_per_anchor: usize,
    /// Maximum number of alias expansions across the whole stream.
    pub max_total_alias_expansions: usize,
}

impl Default for AliasLimits {
    fn default() -> Self {
        Self {
            max_alias_expansions_per_anchor: usize::MAX,
            max_total_alias_expansions: 50_000,
        }
    }
}

/// Loader configuration: how YAML text becomes a [`crate::Node`] tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadOptions {
    /// Policy for duplicate keys.
    pub duplicate_keys: DuplicateKeyPolicy,
    /// Limits for alias expansion.
    pub alias_limits: AliasLimits,
    /// Maximum structural nesting depth (sequences + mappings).
    pub max_depth: usize,
    /// Maximum number of nodes per document, counting every copy made by alias expansion.
    pub max_nodes: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            duplicate_keys: DuplicateKeyPolicy::LastWins,
            alias_limits: AliasLimits::default(),
            max_depth: 2_000,
            max_nodes: 1_000_000,
        }
    }
}
