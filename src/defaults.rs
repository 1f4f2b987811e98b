//! Conversion of a native value into a [`Node`] tree.
//!
//! Decoding over defaults needs the prior value in the same shape as a document: the
//! archive looks up absent fields by name in it. Scalars are rendered as the text the
//! decoder parses back, so a default survives a round trip through the same `Deserialize`.

use serde::Serialize;
use serde::ser::{
    self, Error as _, SerializeMap, SerializeSeq, SerializeStruct, SerializeStructVariant,
    SerializeTuple, SerializeTupleStruct, SerializeTupleVariant,
};

use crate::error::Error;
use crate::node::{Mapping, Node};

type Result<T> = std::result::Result<T, Error>;

/// Render `value` as a document tree.
pub(crate) fn to_node<T: Serialize + ?Sized>(value: &T) -> Result<Node> {
    value.serialize(NodeSerializer)
}

fn float_text(v: f64) -> String {
    if v.is_nan() {
        ".nan".to_owned()
    } else if v == f64::INFINITY {
        ".inf".to_owned()
    } else if v == f64::NEG_INFINITY {
        "-.inf".to_owned()
    } else {
        v.to_string()
    }
}

/// `{ variant: value }`
fn variant_node(variant: &'static str, value: Node) -> Node {
    let mut mapping = Mapping::with_capacity(1);
    mapping.insert(variant, value);
    Node::Map(mapping)
}

struct NodeSerializer;

impl ser::Serializer for NodeSerializer {
    type Ok = Node;
    type Error = Error;

    type SerializeSeq = SeqBuilder;
    type SerializeTuple = SeqBuilder;
    type SerializeTupleStruct = SeqBuilder;
    type SerializeTupleVariant = VariantBuilder<SeqBuilder>;
    type SerializeMap = MapBuilder;
    type SerializeStruct = MapBuilder;
    type SerializeStructVariant = VariantBuilder<MapBuilder>;

    fn serialize_bool(self, v: bool) -> Result<Node> {
        Ok(Node::Scalar(v.to_string()))
    }

    fn serialize_i8(self, v: i8) -> Result<Node> {
        self.serialize_i64(v as i64)
    }

    fn serialize_i16(self, v: i16) -> Result<Node> {
        self.serialize_i64(v as i64)
    }

    fn serialize_i32(self, v: i32) -> Result<Node> {
        self.serialize_i64(v as i64)
    }

    fn serialize_i64(self, v: i64) -> Result<Node> {
        Ok(Node::Scalar(v.to_string()))
    }

    fn serialize_i128(self, v: i128) -> Result<Node> {
        Ok(Node::Scalar(v.to_string()))
    }

    fn serialize_u8(self, v: u8) -> Result<Node> {
        self.serialize_u64(v as u64)
    }

    fn serialize_u16(self, v: u16) -> Result<Node> {
        self.serialize_u64(v as u64)
    }

    fn serialize_u32(self, v: u32) -> Result<Node> {
        self.serialize_u64(v as u64)
    }

    fn serialize_u64(self, v: u64) -> Result<Node> {
        Ok(Node::Scalar(v.to_string()))
    }

    fn serialize_u128(self, v: u128) -> Result<Node> {
        Ok(Node::Scalar(v.to_string()))
    }

    fn serialize_f32(self, v: f32) -> Result<Node> {
        self.serialize_f64(v as f64)
    }

    fn serialize_f64(self, v: f64) -> Result<Node> {
        Ok(Node::Scalar(float_text(v)))
    }

    fn serialize_char(self, v: char) -> Result<Node> {
        Ok(Node::Scalar(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Node> {
        Ok(Node::Scalar(v.to_owned()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Node> {
        let text = std::str::from_utf8(v)
            .map_err(|_| Error::custom("byte defaults must be valid UTF-8"))?;
        Ok(Node::Scalar(text.to_owned()))
    }

    fn serialize_none(self) -> Result<Node> {
        Ok(Node::Null)
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<Node> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Node> {
        Ok(Node::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Node> {
        Ok(Node::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Node> {
        Ok(Node::Scalar(variant.to_owned()))
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Node> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Node> {
        Ok(variant_node(variant, value.serialize(self)?))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SeqBuilder> {
        Ok(SeqBuilder(Vec::with_capacity(len.unwrap_or(0))))
    }

    fn serialize_tuple(self, len: usize) -> Result<SeqBuilder> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SeqBuilder> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<VariantBuilder<SeqBuilder>> {
        Ok(VariantBuilder { variant, inner: SeqBuilder(Vec::with_capacity(len)) })
    }

    fn serialize_map(self, len: Option<usize>) -> Result<MapBuilder> {
        Ok(MapBuilder { mapping: Mapping::with_capacity(len.unwrap_or(0)), key: None })
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<MapBuilder> {
        self.serialize_map(Some(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<VariantBuilder<MapBuilder>> {
        Ok(VariantBuilder { variant, inner: self.serialize_map(Some(len))? })
    }
}

struct SeqBuilder(Vec<Node>);

impl SerializeSeq for SeqBuilder {
    type Ok = Node;
    type Error = Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.0.push(to_node(value)?);
        Ok(())
    }

    fn end(self) -> Result<Node> {
        Ok(Node::Sequence(self.0))
    }
}

impl SerializeTuple for SeqBuilder {
    type Ok = Node;
    type Error = Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Node> {
        SerializeSeq::end(self)
    }
}

impl SerializeTupleStruct for SeqBuilder {
    type Ok = Node;
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Node> {
        SerializeSeq::end(self)
    }
}

struct MapBuilder {
    mapping: Mapping,
    key: Option<String>,
}

impl SerializeMap for MapBuilder {
    type Ok = Node;
    type Error = Error;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<()> {
        match to_node(key)? {
            Node::Scalar(text) => {
                self.key = Some(text);
                Ok(())
            }
            other => Err(Error::custom(format!(
                "map keys of defaults must be scalars, found {}",
                other.kind()
            ))),
        }
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        let key = self
            .key
            .take()
            .ok_or_else(|| Error::custom("map value serialized before its key"))?;
        self.mapping.insert(key, to_node(value)?);
        Ok(())
    }

    fn end(self) -> Result<Node> {
        Ok(Node::Map(self.mapping))
    }
}

impl SerializeStruct for MapBuilder {
    type Ok = Node;
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, key: &'static str, value: &T) -> Result<()> {
        self.mapping.insert(key, to_node(value)?);
        Ok(())
    }

    fn end(self) -> Result<Node> {
        SerializeMap::end(self)
    }
}

/// Content of a tuple or struct variant, wrapped as `{ variant: content }` on `end`.
struct VariantBuilder<B> {
    variant: &'static str,
    inner: B,
}

impl SerializeTupleVariant for VariantBuilder<SeqBuilder> {
    type Ok = Node;
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        SerializeSeq::serialize_element(&mut self.inner, value)
    }

    fn end(self) -> Result<Node> {
        Ok(variant_node(self.variant, SerializeSeq::end(self.inner)?))
    }
}

impl SerializeStructVariant for VariantBuilder<MapBuilder> {
    type Ok = Node;
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, key: &'static str, value: &T) -> Result<()> {
        SerializeStruct::serialize_field(&mut self.inner, key, value)
    }

    fn end(self) -> Result<Node> {
        Ok(variant_node(self.variant, SerializeMap::end(self.inner)?))
    }
}
