//! Serde driver for [`ReadArchive`].
//!
//! Serde's derived `Deserialize` implementations play the role of the field reflection:
//! a struct hands over its field names, and every field asks for the node shape it can
//! accept through the `deserialize_*` hint it uses.
//!
//! Supported:
//! - Structs: fields are looked up by name in declaration order; leftover document keys
//!   are rejected unless [`Options::allow_yaml_with_no_cpp`] is set.
//! - Maps with string or scalar-parsed keys, optionally retaining entries of a default.
//! - Sequences and tuples; each element is decoded under the synthetic name `[index]`.
//! - Scalars: bool (YAML 1.1 forms), integers (with `0x`/`0o`/`0b`), floats (incl.
//!   `.nan` / `.inf`), char, strings.
//! - `Option<T>`: an absent key or a null node is `None`.
//! - Externally-tagged enums: `Variant` or `{ Variant: value }`.
//! - Self-describing targets (`deserialize_any`), with scalar types inferred from text.
//!
//! [`Node`] keeps no scalar style, so inference cannot tell `'42'` from `42`: a quoted
//! scalar decoded into a self-describing target comes out as a number or bool when its
//! text parses as one. Typed targets (`String` fields) are unaffected.

use std::borrow::Cow;
use std::iter::Enumerate;
use std::slice;

use serde::de::value::StrDeserializer;
use serde::de::{self, DeserializeOwned, DeserializeSeed, Visitor};
use serde::{Serialize, forward_to_deserialize_any};
use tracing::debug;

use crate::archive::ReadArchive;
use crate::defaults::to_node;
use crate::error::{Error, ErrorKind};
use crate::loader::{load_all, load_slice, load_str};
use crate::node::{Node, NodeKind};
use crate::options::Options;
use crate::parse_scalars::{
    Inferred, infer, parse_int_signed, parse_int_unsigned, parse_yaml11_bool, parse_yaml12_f32,
    parse_yaml12_f64,
};

/// Where the node of a field comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Source {
    /// The document scope of the owning archive.
    Document,
    /// The prior value; the document does not mention the field.
    Defaults,
}

#[derive(Clone, Copy)]
enum Target<'c> {
    /// The owner's own scope node (document root).
    Scope,
    /// One named field of the owner's scope.
    Field {
        name: &'c str,
        source: Source,
        defaults: Option<&'c Node>,
    },
}

/// Deserializes one value: either the scope of `owner` or one of its fields.
#[derive(Clone, Copy)]
struct ValueDeserializer<'c> {
    owner: &'c ReadArchive<'c>,
    target: Target<'c>,
}

impl<'c> ValueDeserializer<'c> {
    fn root(owner: &'c ReadArchive<'c>) -> Self {
        Self { owner, target: Target::Scope }
    }

    fn field(
        owner: &'c ReadArchive<'c>,
        name: &'c str,
        source: Source,
        defaults: Option<&'c Node>,
    ) -> Self {
        Self { owner, target: Target::Field { name, source, defaults } }
    }

    /// The node this deserializer would read, without checks or bookkeeping.
    fn peek(&self) -> Option<&'c Node> {
        match self.target {
            Target::Scope => self.owner.node(),
            Target::Field { name, source: Source::Document, .. } => self.owner.maybe_get_field(name),
            Target::Field { source: Source::Defaults, defaults, .. } => defaults,
        }
    }

    /// Obtain the node, requiring kind `expected`. For a field this also marks it as the
    /// one being visited, so every error raised until [`Self::finish`] names it.
    fn fetch(&self, type_tag: &'static str, expected: NodeKind) -> Result<Cow<'c, Node>, Error> {
        match self.target {
            Target::Scope => {
                let node = self.owner.node().ok_or_else(|| {
                    self.owner.report_error(ErrorKind::InvariantViolation, "has no scope node for")
                })?;
                check_kind(self.owner, node, expected)?;
                Ok(Cow::Borrowed(node))
            }
            Target::Field { name, source: Source::Document, .. } => {
                self.owner.begin_visit(type_tag, name);
                self.owner
                    .get_field(name, expected)?
                    .ok_or_else(|| self.owner.report_error(ErrorKind::MissingEntry, "is missing"))
            }
            Target::Field { name, source: Source::Defaults, defaults } => {
                self.owner.begin_visit(type_tag, name);
                let node = defaults
                    .ok_or_else(|| self.owner.report_error(ErrorKind::MissingEntry, "is missing"))?;
                check_kind(self.owner, node, expected)?;
                Ok(Cow::Borrowed(node))
            }
        }
    }

    /// Fetch a scalar and convert its text.
    fn convert<T>(
        &self,
        type_tag: &'static str,
        parse: impl FnOnce(&str) -> Result<T, String>,
    ) -> Result<T, Error> {
        let node = self.fetch(type_tag, NodeKind::Scalar)?;
        let text = node.as_scalar().unwrap_or_default();
        parse(text).map_err(|reason| {
            self.owner
                .report_error(ErrorKind::InvalidScalar, &format!("has invalid Scalar ({reason})"))
        })
    }

    /// Run `f` with the archive that reads this value's mapping: a new child for a field,
    /// the owner itself for the root.
    fn with_mapping<R>(
        &self,
        type_tag: &'static str,
        keep_defaults: bool,
        f: impl FnOnce(&ReadArchive<'_>) -> Result<R, Error>,
    ) -> Result<R, Error> {
        match self.target {
            Target::Scope => {
                self.fetch(type_tag, NodeKind::Mapping)?;
                f(self.owner)
            }
            Target::Field { source, defaults, .. } => {
                let node = self.fetch(type_tag, NodeKind::Mapping)?;
                let defaults = match source {
                    Source::Document if keep_defaults => defaults,
                    _ => None,
                };
                let child = self.owner.child(node, defaults);
                f(&child)
            }
        }
    }

    /// End the visit and attach the archive path to failures raised by serde visitors.
    fn finish<R>(&self, result: Result<R, Error>) -> Result<R, Error> {
        let result = result.map_err(|err| match err {
            Error::Message { msg, .. } => self
                .owner
                .report_error(ErrorKind::Custom, &format!("has unaccepted value ({msg})")),
            other => other,
        });
        if let Target::Field { .. } = self.target {
            self.owner.end_visit();
        }
        result
    }

    fn sequence<'de, V: Visitor<'de>>(
        self,
        type_tag: &'static str,
        visitor: V,
    ) -> Result<V::Value, Error> {
        let result = self.fetch(type_tag, NodeKind::Sequence).and_then(|node| {
            let items = node.as_sequence().unwrap_or_default();
            let mut access = SeqItems { owner: self.owner, items: items.iter().enumerate() };
            let value = visitor.visit_seq(&mut access)?;
            let remaining = access.items.len();
            if remaining > 0 {
                return Err(de::Error::invalid_length(items.len(), &"fewer elements"));
            }
            Ok(value)
        });
        self.finish(result)
    }
}

fn check_kind(owner: &ReadArchive<'_>, node: &Node, expected: NodeKind) -> Result<(), Error> {
    let actual = node.kind();
    if actual != expected {
        return Err(owner.report_error(
            ErrorKind::TypeMismatch,
            &format!("has non-{expected} ({actual})"),
        ));
    }
    Ok(())
}

macro_rules! deserialize_signed {
    ($method:ident, $visit:ident, $ty:ty) => {
        fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
            let tag = stringify!($ty);
            let result = self
                .convert(tag, |t| parse_int_signed::<$ty>(t, tag))
                .and_then(|v| visitor.$visit(v));
            self.finish(result)
        }
    };
}

macro_rules! deserialize_unsigned {
    ($method:ident, $visit:ident, $ty:ty) => {
        fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
            let tag = stringify!($ty);
            let result = self
                .convert(tag, |t| parse_int_unsigned::<$ty>(t, tag))
                .and_then(|v| visitor.$visit(v));
            self.finish(result)
        }
    };
}

impl<'de, 'c> de::Deserializer<'de> for ValueDeserializer<'c> {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        match self.peek().map(Node::kind) {
            Some(NodeKind::Sequence) => self.sequence("sequence", visitor),
            Some(NodeKind::Mapping) => self.deserialize_map(visitor),
            Some(NodeKind::Scalar) => {
                let result = self.fetch("any", NodeKind::Scalar).and_then(|node| {
                    match infer(node.as_scalar().unwrap_or_default()) {
                        Inferred::Bool(v) => visitor.visit_bool(v),
                        Inferred::Int(v) => visitor.visit_i64(v),
                        Inferred::UInt(v) => visitor.visit_u64(v),
                        Inferred::Float(v) => visitor.visit_f64(v),
                        Inferred::Str(v) => visitor.visit_str(v),
                    }
                });
                self.finish(result)
            }
            // absent keys fail here with the usual missing-entry diagnostic
            Some(NodeKind::Null) | None => {
                let result = self.fetch("any", NodeKind::Null).and_then(|_| visitor.visit_unit());
                self.finish(result)
            }
        }
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        let result = self.convert("bool", parse_yaml11_bool).and_then(|v| visitor.visit_bool(v));
        self.finish(result)
    }

    deserialize_signed!(deserialize_i8, visit_i8, i8);
    deserialize_signed!(deserialize_i16, visit_i16, i16);
    deserialize_signed!(deserialize_i32, visit_i32, i32);
    deserialize_signed!(deserialize_i64, visit_i64, i64);
    deserialize_signed!(deserialize_i128, visit_i128, i128);
    deserialize_unsigned!(deserialize_u8, visit_u8, u8);
    deserialize_unsigned!(deserialize_u16, visit_u16, u16);
    deserialize_unsigned!(deserialize_u32, visit_u32, u32);
    deserialize_unsigned!(deserialize_u64, visit_u64, u64);
    deserialize_unsigned!(deserialize_u128, visit_u128, u128);

    fn deserialize_f32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        let result = self.convert("f32", parse_yaml12_f32).and_then(|v| visitor.visit_f32(v));
        self.finish(result)
    }

    fn deserialize_f64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        let result = self.convert("f64", parse_yaml12_f64).and_then(|v| visitor.visit_f64(v));
        self.finish(result)
    }

    fn deserialize_char<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        let result = self
            .convert("char", |t| {
                let mut chars = t.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(c),
                    _ => Err(format!("expected a single character, found `{t}`")),
                }
            })
            .and_then(|c| visitor.visit_char(c));
        self.finish(result)
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        let result = self
            .fetch("str", NodeKind::Scalar)
            .and_then(|node| visitor.visit_str(node.as_scalar().unwrap_or_default()));
        self.finish(result)
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        let result = self
            .fetch("String", NodeKind::Scalar)
            .and_then(|node| visitor.visit_str(node.as_scalar().unwrap_or_default()));
        self.finish(result)
    }

    fn deserialize_bytes<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        let result = self
            .fetch("bytes", NodeKind::Scalar)
            .and_then(|node| visitor.visit_bytes(node.as_scalar().unwrap_or_default().as_bytes()));
        self.finish(result)
    }

    fn deserialize_byte_buf<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        self.deserialize_bytes(visitor)
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        match self.peek() {
            None => visitor.visit_none(),
            Some(Node::Null) => {
                // consume the key so it does not count as unrecognized
                let result = self.fetch("Option", NodeKind::Null).and_then(|_| visitor.visit_none());
                self.finish(result)
            }
            Some(_) => visitor.visit_some(self),
        }
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        let result = self.fetch("()", NodeKind::Null).and_then(|_| visitor.visit_unit());
        self.finish(result)
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Error> {
        let result = self.fetch(name, NodeKind::Null).and_then(|_| visitor.visit_unit());
        self.finish(result)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Error> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        self.sequence("sequence", visitor)
    }

    fn deserialize_tuple<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value, Error> {
        self.sequence("tuple", visitor)
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, Error> {
        self.sequence(name, visitor)
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        let retain = self.owner.options().retain_map_defaults;
        let result = self.with_mapping("map", retain, |archive| {
            let mut access = MapEntries::new(archive, retain);
            visitor.visit_map(&mut access)
        });
        self.finish(result)
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Error> {
        let result = self.with_mapping(name, true, |archive| {
            let mut access =
                StructFields { archive, fields: fields.iter(), current: None, skipped: Vec::new() };
            let value = visitor
                .visit_map(&mut access)
                .map_err(|err| missing_skipped_field(archive, &access.skipped, err))?;
            archive.check_all_accepted()?;
            Ok(value)
        });
        self.finish(result)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Error> {
        let result = match self.peek().map(Node::kind) {
            Some(NodeKind::Mapping) => self.fetch(name, NodeKind::Mapping).and_then(|node| {
                let mapping = node.as_mapping().filter(|m| m.len() == 1);
                let Some((variant, value)) = mapping.and_then(|m| m.iter().next()) else {
                    let size = node.as_mapping().map_or(0, |m| m.len());
                    return Err(self.owner.report_error(
                        ErrorKind::TypeMismatch,
                        &format!("has non-single-entry Mapping (size {size})"),
                    ));
                };
                let child = self.owner.mapish(variant, value);
                visitor.visit_enum(VariantEntry { archive: &child, enum_name: name, variant })
            }),
            _ => self.fetch(name, NodeKind::Scalar).and_then(|node| {
                let variant = node.as_scalar().unwrap_or_default();
                visitor.visit_enum(StrDeserializer::<Error>::new(variant))
            }),
        };
        self.finish(result)
    }

    fn deserialize_identifier<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        self.deserialize_str(visitor)
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        let result = match self.peek() {
            Some(node) => self.fetch("ignored", node.kind()).and_then(|_| visitor.visit_unit()),
            None => visitor.visit_unit(),
        };
        self.finish(result)
    }
}

/// Walks the declared fields of a struct, in declaration order.
struct StructFields<'x> {
    archive: &'x ReadArchive<'x>,
    fields: slice::Iter<'static, &'static str>,
    current: Option<(&'static str, Source)>,
    /// Absent fields left to serde, with no defaults overlay behind them.
    skipped: Vec<&'static str>,
}

/// A lenient struct leaves absent fields to serde. When one of them has no serde default
/// either, report it as a missing entry of the struct's mapping.
fn missing_skipped_field(archive: &ReadArchive<'_>, skipped: &[&'static str], err: Error) -> Error {
    let Error::Message { msg, .. } = &err else {
        return err;
    };
    let Some(field) = skipped.iter().find(|f| *msg == format!("missing field `{f}`")) else {
        return err;
    };
    archive.begin_visit("field", field);
    let err = archive.report_error(ErrorKind::MissingEntry, "is missing");
    archive.end_visit();
    err
}

impl<'de, 'x> de::MapAccess<'de> for StructFields<'x> {
    type Error = Error;

    fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>, Error> {
        for &field in self.fields.by_ref() {
            let in_document = self.archive.maybe_get_field(field).is_some();
            let source = if in_document || !self.archive.options().allow_cpp_with_no_yaml {
                // a strict archive reports absent fields once their type is known
                Source::Document
            } else if self.archive.default_for(field).is_some() {
                Source::Defaults
            } else {
                debug!(field, "field absent from document; left to its serde default");
                self.skipped.push(field);
                continue;
            };
            self.current = Some((field, source));
            return seed.deserialize(KeyDeserializer(field)).map(Some);
        }
        Ok(None)
    }

    fn next_value_seed<T: DeserializeSeed<'de>>(&mut self, seed: T) -> Result<T::Value, Error> {
        let Some((field, source)) = self.current.take() else {
            return Err(self.archive.report_error(
                ErrorKind::InvariantViolation,
                "had a value requested before its key for",
            ));
        };
        let defaults = self.archive.default_for(field);
        seed.deserialize(ValueDeserializer::field(self.archive, field, source, defaults))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.fields.len())
    }
}

/// Walks the entries of an associative container.
struct MapEntries<'x> {
    archive: &'x ReadArchive<'x>,
    entries: std::vec::IntoIter<(&'x str, Source)>,
    retain: bool,
    current: Option<(&'x str, Source)>,
}

impl<'x> MapEntries<'x> {
    fn new(archive: &'x ReadArchive<'x>, retain: bool) -> Self {
        let mut entries: Vec<(&'x str, Source)> = Vec::new();
        if retain {
            if let Some(defaults) = archive.defaults().and_then(Node::as_mapping) {
                entries.extend(
                    defaults
                        .keys()
                        .filter(|k| archive.maybe_get_field(k).is_none())
                        .map(|k| (k, Source::Defaults)),
                );
            }
        }
        if let Some(mapping) = archive.mapping() {
            entries.extend(mapping.keys().map(|k| (k, Source::Document)));
        }
        Self { archive, entries: entries.into_iter(), retain, current: None }
    }
}

impl<'de, 'x> de::MapAccess<'de> for MapEntries<'x> {
    type Error = Error;

    fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>, Error> {
        let Some((key, source)) = self.entries.next() else {
            return Ok(None);
        };
        self.current = Some((key, source));
        seed.deserialize(KeyDeserializer(key)).map(Some)
    }

    fn next_value_seed<T: DeserializeSeed<'de>>(&mut self, seed: T) -> Result<T::Value, Error> {
        let Some((key, source)) = self.current.take() else {
            return Err(self.archive.report_error(
                ErrorKind::InvariantViolation,
                "had a value requested before its key for",
            ));
        };
        let defaults = if self.retain { self.archive.default_for(key) } else { None };
        seed.deserialize(ValueDeserializer::field(self.archive, key, source, defaults))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.entries.len())
    }
}

/// Sequence elements, each decoded through a map-ish archive keyed `[index]`.
struct SeqItems<'x> {
    owner: &'x ReadArchive<'x>,
    items: Enumerate<slice::Iter<'x, Node>>,
}

impl<'de, 'x> de::SeqAccess<'de> for SeqItems<'x> {
    type Error = Error;

    fn next_element_seed<T: DeserializeSeed<'de>>(&mut self, seed: T) -> Result<Option<T::Value>, Error> {
        let Some((index, item)) = self.items.next() else {
            return Ok(None);
        };
        let key = format!("[{index}]");
        let child = self.owner.mapish(key.as_str(), item);
        seed.deserialize(ValueDeserializer::field(&child, &key, Source::Document, None))
            .map(Some)
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.items.len())
    }
}

/// `{ Variant: value }`, with the value decoded through a map-ish archive keyed by the
/// variant name.
struct VariantEntry<'x> {
    archive: &'x ReadArchive<'x>,
    enum_name: &'static str,
    variant: &'x str,
}

impl<'x> VariantEntry<'x> {
    fn content(&self) -> ValueDeserializer<'x> {
        ValueDeserializer::field(self.archive, self.variant, Source::Document, None)
    }
}

impl<'de, 'x> de::EnumAccess<'de> for VariantEntry<'x> {
    type Error = Error;
    type Variant = Self;

    fn variant_seed<S: DeserializeSeed<'de>>(self, seed: S) -> Result<(S::Value, Self), Error> {
        let value = seed.deserialize(KeyDeserializer(self.variant))?;
        Ok((value, self))
    }
}

impl<'de, 'x> de::VariantAccess<'de> for VariantEntry<'x> {
    type Error = Error;

    fn unit_variant(self) -> Result<(), Error> {
        <() as de::Deserialize>::deserialize(self.content())
    }

    fn newtype_variant_seed<T: DeserializeSeed<'de>>(self, seed: T) -> Result<T::Value, Error> {
        seed.deserialize(self.content())
    }

    fn tuple_variant<V: Visitor<'de>>(self, len: usize, visitor: V) -> Result<V::Value, Error> {
        de::Deserializer::deserialize_tuple(self.content(), len, visitor)
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Error> {
        de::Deserializer::deserialize_struct(self.content(), self.enum_name, fields, visitor)
    }
}

/// Map keys, struct field names and variant names. Keys are text; typed keys parse it.
struct KeyDeserializer<'k>(&'k str);

macro_rules! key_int {
    ($method:ident, $visit:ident, $ty:ty, $parse:ident) => {
        fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
            visitor.$visit($parse::<$ty>(self.0, stringify!($ty)).map_err(Error::msg)?)
        }
    };
}

impl<'de, 'k> de::Deserializer<'de> for KeyDeserializer<'k> {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        visitor.visit_str(self.0)
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        visitor.visit_bool(parse_yaml11_bool(self.0).map_err(Error::msg)?)
    }

    key_int!(deserialize_i8, visit_i8, i8, parse_int_signed);
    key_int!(deserialize_i16, visit_i16, i16, parse_int_signed);
    key_int!(deserialize_i32, visit_i32, i32, parse_int_signed);
    key_int!(deserialize_i64, visit_i64, i64, parse_int_signed);
    key_int!(deserialize_i128, visit_i128, i128, parse_int_signed);
    key_int!(deserialize_u8, visit_u8, u8, parse_int_unsigned);
    key_int!(deserialize_u16, visit_u16, u16, parse_int_unsigned);
    key_int!(deserialize_u32, visit_u32, u32, parse_int_unsigned);
    key_int!(deserialize_u64, visit_u64, u64, parse_int_unsigned);
    key_int!(deserialize_u128, visit_u128, u128, parse_int_unsigned);

    fn deserialize_f32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        visitor.visit_f32(parse_yaml12_f32(self.0).map_err(Error::msg)?)
    }

    fn deserialize_f64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        visitor.visit_f64(parse_yaml12_f64(self.0).map_err(Error::msg)?)
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Error> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Error> {
        visitor.visit_enum(StrDeserializer::<Error>::new(self.0))
    }

    forward_to_deserialize_any! {
        char str string bytes byte_buf unit unit_struct seq tuple
        tuple_struct map struct identifier ignored_any
    }
}

/// Decode `T` from a document tree with default (strict) [`Options`].
///
/// ```rust
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Person {
///     name: String,
///     age: u32,
/// }
///
/// let node = saphyr_archive::load_str("name: bob\n<<: { name: default, age: 5 }\n").unwrap();
/// let p: Person = saphyr_archive::from_node(&node).unwrap();
/// assert_eq!((p.name.as_str(), p.age), ("bob", 5));
/// ```
pub fn from_node<T: DeserializeOwned>(node: &Node) -> Result<T, Error> {
    from_node_with_options(node, Options::default())
}

pub fn from_node_with_options<T: DeserializeOwned>(node: &Node, options: Options) -> Result<T, Error> {
    debug!(%options, "decoding document tree");
    let archive = ReadArchive::new(node, options)?;
    T::deserialize(ValueDeserializer::root(&archive))
}

/// Decode `T` from `node`, starting from `defaults` as the prior value.
///
/// With [`Options::allow_cpp_with_no_yaml`], fields the document leaves out keep the value
/// they have in `defaults`. With [`Options::retain_map_defaults`], map entries of
/// `defaults` that the document does not mention are kept.
pub fn from_node_with_defaults<T>(node: &Node, defaults: &T, options: Options) -> Result<T, Error>
where
    T: Serialize + DeserializeOwned,
{
    let prior = to_node(defaults)?;
    debug!(%options, "decoding document tree over defaults");
    let archive = ReadArchive::with_defaults(node, Some(&prior), options)?;
    T::deserialize(ValueDeserializer::root(&archive))
}

/// Deserialize a single YAML document with strict [`Options`].
///
/// ```rust
/// use serde::Deserialize;
///
/// #[derive(Debug, Deserialize, PartialEq)]
/// struct Config {
///     name: String,
///     enabled: bool,
///     retries: i32,
/// }
///
/// let yaml = r#"
/// name: My Application
/// enabled: true
/// retries: 5
/// "#;
///
/// let cfg: Config = saphyr_archive::from_str(yaml).unwrap();
/// assert!(cfg.enabled);
/// ```
pub fn from_str<T: DeserializeOwned>(input: &str) -> Result<T, Error> {
    from_str_with_options(input, Options::default())
}

pub fn from_str_with_options<T: DeserializeOwned>(input: &str, options: Options) -> Result<T, Error> {
    let node = load_str(input)?;
    from_node_with_options(&node, options)
}

pub fn from_slice<T: DeserializeOwned>(input: &[u8]) -> Result<T, Error> {
    from_slice_with_options(input, Options::default())
}

pub fn from_slice_with_options<T: DeserializeOwned>(input: &[u8], options: Options) -> Result<T, Error> {
    let node = load_slice(input)?;
    from_node_with_options(&node, options)
}

/// Deserialize a single YAML document over `defaults`; see [`from_node_with_defaults`].
///
/// ```rust
/// use std::collections::BTreeMap;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Deserialize, Serialize)]
/// struct Config {
///     name: String,
///     limits: BTreeMap<String, u32>,
/// }
///
/// let defaults = Config {
///     name: "default".into(),
///     limits: BTreeMap::from([("cpu".to_string(), 1)]),
/// };
/// let options = saphyr_archive::options! {
///     allow_cpp_with_no_yaml: true,
///     retain_map_defaults: true,
/// };
/// let cfg = saphyr_archive::from_str_with_defaults("limits: { mem: 2 }\n", &defaults, options).unwrap();
/// assert_eq!(cfg.name, "default");
/// assert_eq!(cfg.limits.len(), 2);
/// ```
pub fn from_str_with_defaults<T>(input: &str, defaults: &T, options: Options) -> Result<T, Error>
where
    T: Serialize + DeserializeOwned,
{
    let node = load_str(input)?;
    from_node_with_defaults(&node, defaults, options)
}

/// Deserialize every document of a YAML stream into a vector of `T`.
///
/// ```rust
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Config {
///     name: String,
/// }
///
/// let cfgs: Vec<Config> = saphyr_archive::from_multiple("name: a\n---\nname: b\n").unwrap();
/// assert_eq!(cfgs[1].name, "b");
/// ```
pub fn from_multiple<T: DeserializeOwned>(input: &str) -> Result<Vec<T>, Error> {
    from_multiple_with_options(input, Options::default())
}

pub fn from_multiple_with_options<T: DeserializeOwned>(
    input: &str,
    options: Options,
) -> Result<Vec<T>, Error> {
    load_all(input)?
        .iter()
        .map(|node| from_node_with_options(node, options))
        .collect()
}
