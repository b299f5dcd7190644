//! Error types shared across the message pipeline.
//!
//! Each stage of the pipeline reports failures through its own enum so
//! callers can match on exactly the conditions that stage can produce.
//! Nothing in this crate logs an error it returns; the only condition that
//! is absorbed internally is a transport reporting that it would block,
//! which never reaches these types.

use std::io;

use thiserror::Error;

/// Why a field mapping does not fit a message schema.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// A required field is absent.
    #[error("missing field `{field}`")]
    Missing { field: String },
    /// A field is present but holds the wrong type of value.
    #[error("field `{field}` must be {expected}")]
    WrongType {
        field: String,
        expected: &'static str,
    },
    /// A field is not part of the schema.
    #[error("unexpected field `{field}`")]
    Unexpected { field: String },
    /// The `kind` discriminator names a different message type.
    #[error("kind `{found}` does not match `{expected}`")]
    KindMismatch {
        expected: &'static str,
        found: String,
    },
    /// The payload schema rejected the mapping.
    #[error("{0}")]
    Invalid(String),
}

impl FieldError {
    pub(crate) fn missing(field: &str) -> Self {
        Self::Missing {
            field: field.to_owned(),
        }
    }

    pub(crate) fn wrong_type(field: &str, expected: &'static str) -> Self {
        Self::WrongType {
            field: field.to_owned(),
            expected,
        }
    }

    pub(crate) fn unexpected(field: &str) -> Self {
        Self::Unexpected {
            field: field.to_owned(),
        }
    }
}

/// A factory could not build a message from the supplied fields.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("cannot construct {kind} message: {source}")]
pub struct ConstructionError {
    /// Kind of message the caller asked for.
    pub kind: &'static str,
    /// The offending field.
    #[source]
    pub source: FieldError,
}

/// Failure inside a codec.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The value could not be serialised.
    #[error("encode failed: {0}")]
    Encode(String),
    /// The bytes could not be deserialised.
    #[error("decode failed: {0}")]
    Decode(String),
}

impl From<rmp_serde::encode::Error> for CodecError {
    fn from(err: rmp_serde::encode::Error) -> Self {
        Self::Encode(err.to_string())
    }
}

impl From<rmp_serde::decode::Error> for CodecError {
    fn from(err: rmp_serde::decode::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Bytes could not be turned back into a typed message.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The codec rejected the bytes.
    #[error(transparent)]
    Codec(#[from] CodecError),
    /// No constructor is registered for the message kind.
    #[error("unknown message kind `{0}`")]
    UnknownKind(String),
    /// The decoded mapping does not match the registered schema.
    #[error("field mismatch for {kind} message: {source}")]
    FieldMismatch {
        kind: String,
        #[source]
        source: FieldError,
    },
}

/// Failure while building, encoding, or delivering a message from a
/// sink-attached factory.
#[derive(Debug, Error)]
pub enum EmitError {
    /// The message could not be built.
    #[error(transparent)]
    Construction(#[from] ConstructionError),
    /// The message could not be encoded.
    #[error(transparent)]
    Codec(#[from] CodecError),
    /// The sink's stream or socket failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Failure while pulling a message from a source and decoding it.
#[derive(Debug, Error)]
pub enum ConsumeError {
    /// The underlying transport or reader failed.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// The received bytes did not decode.
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Errors that may occur while building a factory.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    /// Invalid user supplied configuration.
    #[error("invalid factory configuration: {0}")]
    InvalidConfig(String),
}
