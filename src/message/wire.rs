//! Flattening a payload into the message map.
//!
//! The payload's fields are written straight after the envelope and `kind`
//! entries. Only payloads made of named fields can be decoded again, so
//! anything else is refused while encoding, as is a field that would shadow
//! a key the envelope already wrote.

use serde::ser::{Error as _, Impossible, Serialize, SerializeMap, SerializeStruct, Serializer};
use serde_json::Value;

use super::{APPLICATION, HOSTNAME, KIND, LEVEL, MICROTIME};

/// Keys written by the envelope ahead of any payload field.
pub const RESERVED_KEYS: [&str; 5] = [HOSTNAME, MICROTIME, APPLICATION, LEVEL, KIND];

/// Serialiser adapter that emits a payload's fields into an open map.
pub(super) struct PayloadFields<'a, M> {
    map: &'a mut M,
    kind: &'static str,
}

impl<'a, M: SerializeMap> PayloadFields<'a, M> {
    pub(super) fn new(map: &'a mut M, kind: &'static str) -> Self {
        Self { map, kind }
    }

    fn check_key(&self, key: &str) -> Result<(), M::Error> {
        if RESERVED_KEYS.contains(&key) {
            return Err(M::Error::custom(format!(
                "{} payload field `{key}` collides with an envelope key",
                self.kind
            )));
        }
        Ok(())
    }

    fn not_fields(&self, found: &str) -> M::Error {
        M::Error::custom(format!(
            "{} payload must serialise as named fields, not {found}",
            self.kind
        ))
    }
}

macro_rules! reject_scalars {
    ($($method:ident($ty:ty) => $what:literal;)*) => {
        $(
            fn $method(self, _: $ty) -> Result<(), Self::Error> {
                Err(self.not_fields($what))
            }
        )*
    };
}

impl<'a, M: SerializeMap> Serializer for PayloadFields<'a, M> {
    type Ok = ();
    type Error = M::Error;
    type SerializeSeq = Impossible<(), M::Error>;
    type SerializeTuple = Impossible<(), M::Error>;
    type SerializeTupleStruct = Impossible<(), M::Error>;
    type SerializeTupleVariant = Impossible<(), M::Error>;
    type SerializeMap = PayloadMap<'a, M>;
    type SerializeStruct = Self;
    type SerializeStructVariant = Impossible<(), M::Error>;

    reject_scalars! {
        serialize_bool(bool) => "a boolean";
        serialize_i8(i8) => "an integer";
        serialize_i16(i16) => "an integer";
        serialize_i32(i32) => "an integer";
        serialize_i64(i64) => "an integer";
        serialize_u8(u8) => "an integer";
        serialize_u16(u16) => "an integer";
        serialize_u32(u32) => "an integer";
        serialize_u64(u64) => "an integer";
        serialize_f32(f32) => "a float";
        serialize_f64(f64) => "a float";
        serialize_char(char) => "a character";
        serialize_str(&str) => "a string";
        serialize_bytes(&[u8]) => "bytes";
    }

    fn serialize_none(self) -> Result<(), Self::Error> {
        Err(self.not_fields("an option"))
    }

    fn serialize_some<T: ?Sized + Serialize>(self, _: &T) -> Result<(), Self::Error> {
        Err(self.not_fields("an option"))
    }

    fn serialize_unit(self) -> Result<(), Self::Error> {
        Err(self.not_fields("a unit"))
    }

    fn serialize_unit_struct(self, _: &'static str) -> Result<(), Self::Error> {
        Err(self.not_fields("a unit struct"))
    }

    fn serialize_unit_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
    ) -> Result<(), Self::Error> {
        Err(self.not_fields("an enum"))
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _: &'static str,
        value: &T,
    ) -> Result<(), Self::Error> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: &T,
    ) -> Result<(), Self::Error> {
        Err(self.not_fields("an enum"))
    }

    fn serialize_seq(self, _: Option<usize>) -> Result<Self::SerializeSeq, Self::Error> {
        Err(self.not_fields("a sequence"))
    }

    fn serialize_tuple(self, _: usize) -> Result<Self::SerializeTuple, Self::Error> {
        Err(self.not_fields("a tuple"))
    }

    fn serialize_tuple_struct(
        self,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeTupleStruct, Self::Error> {
        Err(self.not_fields("a tuple struct"))
    }

    fn serialize_tuple_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeTupleVariant, Self::Error> {
        Err(self.not_fields("an enum"))
    }

    fn serialize_map(self, _: Option<usize>) -> Result<Self::SerializeMap, Self::Error> {
        Ok(PayloadMap { fields: self })
    }

    fn serialize_struct(
        self,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeStruct, Self::Error> {
        Ok(self)
    }

    fn serialize_struct_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeStructVariant, Self::Error> {
        Err(self.not_fields("an enum"))
    }
}

impl<M: SerializeMap> SerializeStruct for PayloadFields<'_, M> {
    type Ok = ();
    type Error = M::Error;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), Self::Error> {
        self.check_key(key)?;
        self.map.serialize_entry(key, value)
    }

    fn end(self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Map-shaped payloads, such as structs with a flattened field.
pub(super) struct PayloadMap<'a, M> {
    fields: PayloadFields<'a, M>,
}

impl<M: SerializeMap> SerializeMap for PayloadMap<'_, M> {
    type Ok = ();
    type Error = M::Error;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<(), Self::Error> {
        match serde_json::to_value(key) {
            Ok(Value::String(name)) => self.fields.check_key(&name)?,
            _ => return Err(self.fields.not_fields("a map with non-string keys")),
        }
        self.fields.map.serialize_key(key)
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Self::Error> {
        self.fields.map.serialize_value(value)
    }

    fn end(self) -> Result<(), Self::Error> {
        Ok(())
    }
}
