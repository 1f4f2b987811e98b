//! Field-by-field YAML decoding for Serde types.
//!
//! A document is loaded into a [`Node`] tree and then decoded through a [`ReadArchive`],
//! which looks up each field a type declares, resolves `<<` merge keys, enforces the
//! strictness [`Options`] and renders failures with the full path from the failing value
//! up to the document root.
//!
//! ```rust
//! use serde::Deserialize;
//!
//! #[derive(Debug, Deserialize, PartialEq)]
//! struct Person {
//!     name: String,
//!     age: u32,
//! }
//!
//! let yaml = "name: bob\n<<: { name: default, age: 5 }\n";
//! let person: Person = saphyr_archive::from_str(yaml).unwrap();
//! assert_eq!(person, Person { name: "bob".into(), age: 5 });
//!
//! let err = saphyr_archive::from_str::<Person>("name: bob\n").unwrap_err();
//! assert_eq!(
//!     err.to_string(),
//!     "YAML node of type Mapping (with size 1 and keys {name}) is missing entry for u32 age."
//! );
//! ```

pub use archive::ReadArchive;
pub use de::{
    from_multiple, from_multiple_with_options, from_node, from_node_with_defaults,
    from_node_with_options, from_slice, from_slice_with_options, from_str, from_str_with_defaults,
    from_str_with_options,
};
pub use error::{Error, ErrorKind, Location};
pub use loader::{load_all, load_all_with_options, load_slice, load_str, load_str_with_options};
pub use merge::{MERGE_KEY, MergeKeyError, resolve_merge_keys};
pub use node::{Mapping, Node, NodeKind};
pub use options::{AliasLimits, DuplicateKeyPolicy, LoadOptions, Options};

pub mod archive;
mod de;
mod defaults;
mod diagnostics;
pub mod error;
mod loader;
#[macro_use]
mod macros;
pub mod merge;
pub mod node;
pub mod options;
mod parse_scalars;
mod tags;
