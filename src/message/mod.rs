//! Message representation for the outlog pipeline.
//!
//! Every message carries the same [`Envelope`] (hostname, timestamp,
//! application and level) plus a kind-specific [`Payload`]. The payload type
//! determines the `kind` discriminator written on the wire, which the
//! [`Decoder`](crate::decoder::Decoder) uses to pick the constructor when the
//! bytes come back.
//!
//! On the wire a message is a single flat mapping:
//!
//! ```text
//! {hostname, microtime, application, level, kind, <payload fields...>}
//! ```
//!
//! [`AnyMessage`] is the object-safe view used where the concrete payload is
//! not known statically: postprocessing transforms and decoded messages.

use std::{any::Any, fmt};

use delegate::delegate;
use serde::{Serialize, Serializer, de::DeserializeOwned, ser::SerializeMap};
use serde_json::{Map, Value};

use crate::error::{CodecError, FieldError};

mod wire;

use wire::PayloadFields;
pub use wire::RESERVED_KEYS;

/// Codec-neutral mapping of field names to decoded values.
pub type FieldMap = Map<String, Value>;

/// Wire key of the hostname envelope field.
pub const HOSTNAME: &str = "hostname";
/// Wire key of the timestamp envelope field.
pub const MICROTIME: &str = "microtime";
/// Wire key of the application envelope field.
pub const APPLICATION: &str = "application";
/// Wire key of the level envelope field.
pub const LEVEL: &str = "level";
/// Wire key of the kind discriminator.
pub const KIND: &str = "kind";

/// Fields present on every message.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Envelope {
    hostname: String,
    microtime: i64,
    application: String,
    level: String,
}

impl Envelope {
    /// Build an envelope from its parts.
    pub fn new(
        hostname: impl Into<String>,
        microtime: i64,
        application: impl Into<String>,
        level: impl Into<String>,
    ) -> Self {
        Self {
            hostname: hostname.into(),
            microtime,
            application: application.into(),
            level: level.into(),
        }
    }

    /// Host that produced the message.
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Creation time in microseconds since the UNIX epoch.
    pub fn microtime(&self) -> i64 {
        self.microtime
    }

    /// Application that produced the message.
    pub fn application(&self) -> &str {
        &self.application
    }

    /// Severity label. The pipeline treats it as opaque.
    pub fn level(&self) -> &str {
        &self.level
    }

    pub fn set_hostname(&mut self, hostname: impl Into<String>) {
        self.hostname = hostname.into();
    }

    pub fn set_microtime(&mut self, microtime: i64) {
        self.microtime = microtime;
    }

    pub fn set_application(&mut self, application: impl Into<String>) {
        self.application = application.into();
    }

    pub fn set_level(&mut self, level: impl Into<String>) {
        self.level = level.into();
    }

    /// Remove the envelope fields from `fields`, leaving only the payload.
    fn take_from(fields: &mut FieldMap) -> Result<Self, FieldError> {
        Ok(Self {
            hostname: take_string(fields, HOSTNAME)?,
            microtime: take_integer(fields, MICROTIME)?,
            application: take_string(fields, APPLICATION)?,
            level: take_string(fields, LEVEL)?,
        })
    }
}

fn take_string(fields: &mut FieldMap, field: &str) -> Result<String, FieldError> {
    match fields.remove(field) {
        Some(Value::String(value)) => Ok(value),
        Some(_) => Err(FieldError::wrong_type(field, "a string")),
        None => Err(FieldError::missing(field)),
    }
}

fn take_integer(fields: &mut FieldMap, field: &str) -> Result<i64, FieldError> {
    match fields.remove(field) {
        Some(Value::Number(number)) => number
            .as_i64()
            .ok_or_else(|| FieldError::wrong_type(field, "an integer")),
        Some(_) => Err(FieldError::wrong_type(field, "an integer")),
        None => Err(FieldError::missing(field)),
    }
}

/// Read the `kind` discriminator without consuming it.
pub(crate) fn peek_kind(fields: &FieldMap) -> Result<&str, FieldError> {
    match fields.get(KIND) {
        Some(Value::String(kind)) => Ok(kind),
        Some(_) => Err(FieldError::wrong_type(KIND, "a string")),
        None => Err(FieldError::missing(KIND)),
    }
}

/// Kind-specific part of a message.
///
/// Implementors are plain structs with named fields. Annotate them with
/// `#[serde(deny_unknown_fields)]`; fields the schema does not know are
/// rejected during decoding either way, but the attribute gives better
/// error messages.
///
/// Encoding fails when the payload does not serialise as named fields (a
/// unit struct, tuple or scalar) or when a field name is one of
/// [`RESERVED_KEYS`]. Such messages could never be decoded again.
pub trait Payload:
    Serialize + DeserializeOwned + Clone + fmt::Debug + PartialEq + Send + Sync + 'static
{
    /// Discriminator written to the `kind` field.
    const KIND: &'static str;

    /// Build the payload from the fields left after the envelope is removed.
    fn from_fields(fields: FieldMap) -> Result<Self, FieldError> {
        let supplied: Vec<String> = fields.keys().cloned().collect();
        let payload: Self =
            serde_json::from_value(Value::Object(fields)).map_err(schema_error)?;
        if !supplied.is_empty() {
            let known = match serde_json::to_value(&payload) {
                Ok(Value::Object(known)) => known,
                _ => FieldMap::new(),
            };
            if let Some(extra) = supplied.iter().find(|key| !known.contains_key(*key)) {
                return Err(FieldError::unexpected(extra));
            }
        }
        Ok(payload)
    }
}

/// Translate a serde schema error into a [`FieldError`].
fn schema_error(err: serde_json::Error) -> FieldError {
    let text = err.to_string();
    let quoted = |prefix: &str| {
        text.strip_prefix(prefix)
            .and_then(|rest| rest.split('`').next())
            .map(str::to_owned)
    };
    if let Some(field) = quoted("missing field `") {
        FieldError::Missing { field }
    } else if let Some(field) = quoted("unknown field `") {
        FieldError::Unexpected { field }
    } else {
        FieldError::Invalid(text)
    }
}

/// A complete message: envelope plus payload of kind `P::KIND`.
#[derive(Clone, Debug, PartialEq)]
pub struct Message<P> {
    envelope: Envelope,
    payload: P,
}

impl<P: Payload> Message<P> {
    /// Assemble a message from its envelope and payload.
    pub fn new(envelope: Envelope, payload: P) -> Self {
        Self { envelope, payload }
    }

    /// Rebuild a message from a decoded field mapping.
    ///
    /// The mapping must contain every envelope field, a `kind` equal to
    /// `P::KIND`, and exactly the fields `P` accepts.
    pub fn from_fields(mut fields: FieldMap) -> Result<Self, FieldError> {
        let kind = peek_kind(&fields)?;
        if kind != P::KIND {
            return Err(FieldError::KindMismatch {
                expected: P::KIND,
                found: kind.to_owned(),
            });
        }
        fields.remove(KIND);
        let envelope = Envelope::take_from(&mut fields)?;
        let payload = P::from_fields(fields)?;
        Ok(Self { envelope, payload })
    }

    /// Discriminator of this message type.
    pub fn kind(&self) -> &'static str {
        P::KIND
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    pub fn envelope_mut(&mut self) -> &mut Envelope {
        &mut self.envelope
    }

    pub fn payload(&self) -> &P {
        &self.payload
    }

    pub fn payload_mut(&mut self) -> &mut P {
        &mut self.payload
    }

    /// Split the message into envelope and payload.
    pub fn into_parts(self) -> (Envelope, P) {
        (self.envelope, self.payload)
    }

    delegate! {
        to self.envelope {
            pub fn hostname(&self) -> &str;
            pub fn microtime(&self) -> i64;
            pub fn application(&self) -> &str;
            pub fn level(&self) -> &str;
        }
    }
}

impl<P: Payload> Serialize for Message<P> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry(HOSTNAME, &self.envelope.hostname)?;
        map.serialize_entry(MICROTIME, &self.envelope.microtime)?;
        map.serialize_entry(APPLICATION, &self.envelope.application)?;
        map.serialize_entry(LEVEL, &self.envelope.level)?;
        map.serialize_entry(KIND, P::KIND)?;
        self.payload.serialize(PayloadFields::new(&mut map, P::KIND))?;
        map.end()
    }
}

impl<P: Payload> fmt::Display for Message<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}.{} {} {}",
            self.envelope.microtime,
            self.envelope.application,
            self.envelope.hostname,
            P::KIND,
            self.envelope.level
        )
    }
}

/// Object-safe view of a message whose payload type is erased.
pub trait AnyMessage: fmt::Debug + fmt::Display + Send + Sync + 'static {
    /// Discriminator of the concrete message type.
    fn kind(&self) -> &'static str;
    fn envelope(&self) -> &Envelope;
    fn envelope_mut(&mut self) -> &mut Envelope;
    /// Render the message as the flat field mapping used on the wire.
    fn to_fields(&self) -> Result<FieldMap, CodecError>;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<P: Payload> AnyMessage for Message<P> {
    fn kind(&self) -> &'static str {
        P::KIND
    }

    fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    fn envelope_mut(&mut self) -> &mut Envelope {
        &mut self.envelope
    }

    fn to_fields(&self) -> Result<FieldMap, CodecError> {
        match serde_json::to_value(self) {
            Ok(Value::Object(fields)) => Ok(fields),
            Ok(other) => Err(CodecError::Encode(format!(
                "message serialised to a non-map value: {other}"
            ))),
            Err(err) => Err(CodecError::Encode(err.to_string())),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

impl dyn AnyMessage {
    /// Borrow the message as `Message<P>` if that is its concrete type.
    pub fn downcast_ref<P: Payload>(&self) -> Option<&Message<P>> {
        self.as_any().downcast_ref()
    }

    /// Mutably borrow the message as `Message<P>` if that is its concrete type.
    pub fn downcast_mut<P: Payload>(&mut self) -> Option<&mut Message<P>> {
        self.as_any_mut().downcast_mut()
    }

    /// Take the message as `Message<P>`, or `None` when the kind differs.
    pub fn downcast<P: Payload>(self: Box<Self>) -> Option<Message<P>> {
        self.into_any().downcast::<Message<P>>().ok().map(|message| *message)
    }

    /// Return `true` when the concrete type is `Message<P>`.
    pub fn is<P: Payload>(&self) -> bool {
        self.as_any().is::<Message<P>>()
    }
}
