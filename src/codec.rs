//! Pluggable serialisation for messages.
//!
//! A [`Codec`] turns any serialisable value into bytes and back. Factories,
//! sinks, sources and decoders are generic over the codec and never inspect
//! the bytes themselves, so swapping [`JsonCodec`] for [`MsgPackCodec`]
//! changes nothing else in the pipeline.

use rmp_serde::Serializer;
use serde::{Serialize, de::DeserializeOwned};

use crate::error::CodecError;

/// Serialiser/deserialiser pair used by the pipeline.
pub trait Codec: Send + Sync {
    /// Short name used in diagnostics and benchmarks.
    fn name(&self) -> &'static str;

    /// Append the encoded form of `value` to `buf`.
    fn encode_into<T>(&self, value: &T, buf: &mut Vec<u8>) -> Result<(), CodecError>
    where
        T: Serialize + ?Sized;

    /// Decode `bytes` into `T`.
    fn decode<T>(&self, bytes: &[u8]) -> Result<T, CodecError>
    where
        T: DeserializeOwned;

    /// Encode `value` into a fresh buffer.
    fn encode<T>(&self, value: &T) -> Result<Vec<u8>, CodecError>
    where
        T: Serialize + ?Sized,
    {
        let mut buf = Vec::with_capacity(128);
        self.encode_into(value, &mut buf)?;
        Ok(buf)
    }
}

/// Human-inspectable JSON. The default codec.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn name(&self) -> &'static str {
        "json"
    }

    fn encode_into<T>(&self, value: &T, buf: &mut Vec<u8>) -> Result<(), CodecError>
    where
        T: Serialize + ?Sized,
    {
        serde_json::to_writer(buf, value).map_err(|err| CodecError::Encode(err.to_string()))
    }

    fn decode<T>(&self, bytes: &[u8]) -> Result<T, CodecError>
    where
        T: DeserializeOwned,
    {
        serde_json::from_slice(bytes).map_err(|err| CodecError::Decode(err.to_string()))
    }
}

/// Compact MessagePack maps keyed by field name.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MsgPackCodec;

impl Codec for MsgPackCodec {
    fn name(&self) -> &'static str {
        "msgpack"
    }

    fn encode_into<T>(&self, value: &T, buf: &mut Vec<u8>) -> Result<(), CodecError>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(&mut Serializer::new(buf).with_struct_map())?;
        Ok(())
    }

    fn decode<T>(&self, bytes: &[u8]) -> Result<T, CodecError>
    where
        T: DeserializeOwned,
    {
        Ok(rmp_serde::from_slice(bytes)?)
    }
}
