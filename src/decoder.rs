//! Turning encoded bytes back into typed messages.
//!
//! The [`Decoder`] deserialises bytes with its codec into a [`FieldMap`],
//! reads the `kind` discriminator, and hands the mapping to the constructor
//! registered for that kind in its [`KindRegistry`]. Each decoder owns its
//! registry; nothing is shared between instances.

use std::{collections::HashMap, fmt, io::BufRead};

use crate::{
    codec::Codec,
    error::{ConsumeError, DecodeError, FieldError},
    message::{AnyMessage, FieldMap, Message, Payload, peek_kind},
};

/// Placeholder kind reported when a mapping carries no usable `kind`.
pub const UNKNOWN_KIND: &str = "<unknown>";

/// Builds a typed message from a decoded field mapping.
pub type Constructor =
    Box<dyn Fn(FieldMap) -> Result<Box<dyn AnyMessage>, FieldError> + Send + Sync>;

/// Constructor for `Message<P>`, suitable for [`KindRegistry::register`].
pub fn construct<P: Payload>(fields: FieldMap) -> Result<Box<dyn AnyMessage>, FieldError> {
    Ok(Box::new(Message::<P>::from_fields(fields)?))
}

/// Mapping from kind name to message constructor.
#[derive(Default)]
pub struct KindRegistry {
    constructors: HashMap<String, Constructor>,
}

impl KindRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `constructor` for messages whose `kind` is `kind`.
    ///
    /// Registering a kind again replaces the previous constructor.
    pub fn register<F>(&mut self, kind: impl Into<String>, constructor: F)
    where
        F: Fn(FieldMap) -> Result<Box<dyn AnyMessage>, FieldError> + Send + Sync + 'static,
    {
        self.constructors.insert(kind.into(), Box::new(constructor));
    }

    /// Register `Message<P>` under `P::KIND`.
    pub fn register_kind<P: Payload>(&mut self) {
        self.register(P::KIND, construct::<P>);
    }

    pub fn is_registered(&self, kind: &str) -> bool {
        self.constructors.contains_key(kind)
    }

    /// Registered kind names, in no particular order.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }

    /// Dispatch `fields` to the constructor registered for its kind.
    pub fn construct(&self, fields: FieldMap) -> Result<Box<dyn AnyMessage>, DecodeError> {
        let (kind, constructor) = match peek_kind(&fields) {
            Ok(kind) => self
                .constructors
                .get_key_value(kind)
                .ok_or_else(|| DecodeError::UnknownKind(kind.to_owned()))?,
            Err(source) => {
                return Err(DecodeError::FieldMismatch {
                    kind: UNKNOWN_KIND.to_owned(),
                    source,
                });
            }
        };
        constructor(fields).map_err(|source| DecodeError::FieldMismatch {
            kind: kind.clone(),
            source,
        })
    }
}

impl fmt::Debug for KindRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<_> = self.kinds().collect();
        kinds.sort_unstable();
        f.debug_struct("KindRegistry").field("kinds", &kinds).finish()
    }
}

/// Decodes bytes produced by a factory using the same codec.
#[derive(Debug)]
pub struct Decoder<C> {
    codec: C,
    registry: KindRegistry,
}

impl<C: Codec> Decoder<C> {
    /// Create a decoder with an empty registry.
    pub fn new(codec: C) -> Self {
        Self::with_registry(codec, KindRegistry::new())
    }

    pub fn with_registry(codec: C, registry: KindRegistry) -> Self {
        Self { codec, registry }
    }

    /// Register `Message<P>` and return the decoder.
    pub fn with_kind<P: Payload>(mut self) -> Self {
        self.registry.register_kind::<P>();
        self
    }

    /// Register `constructor` for `kind`. See [`KindRegistry::register`].
    pub fn register<F>(&mut self, kind: impl Into<String>, constructor: F)
    where
        F: Fn(FieldMap) -> Result<Box<dyn AnyMessage>, FieldError> + Send + Sync + 'static,
    {
        self.registry.register(kind, constructor);
    }

    /// Register `Message<P>` under `P::KIND`.
    pub fn register_kind<P: Payload>(&mut self) {
        self.registry.register_kind::<P>();
    }

    pub fn is_registered(&self, kind: &str) -> bool {
        self.registry.is_registered(kind)
    }

    pub fn registry(&self) -> &KindRegistry {
        &self.registry
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Decode one encoded message.
    pub fn decode(&self, bytes: &[u8]) -> Result<Box<dyn AnyMessage>, DecodeError> {
        let fields: FieldMap = self.codec.decode(bytes)?;
        self.registry.construct(fields)
    }

    /// Decode one encoded message that is expected to be a `Message<P>`.
    ///
    /// The kind is still dispatched through the registry, so `P` must be
    /// registered.
    pub fn decode_as<P: Payload>(&self, bytes: &[u8]) -> Result<Message<P>, DecodeError> {
        let message = self.decode(bytes)?;
        let found = message.kind();
        message
            .downcast::<P>()
            .ok_or_else(|| DecodeError::FieldMismatch {
                kind: found.to_owned(),
                source: FieldError::KindMismatch {
                    expected: P::KIND,
                    found: found.to_owned(),
                },
            })
    }

    /// Build a message from a mapping that is already deserialised.
    pub fn decode_fields(&self, fields: FieldMap) -> Result<Box<dyn AnyMessage>, DecodeError> {
        self.registry.construct(fields)
    }

    /// Decode newline-delimited messages from `reader`, skipping blank lines.
    ///
    /// Only meaningful for codecs whose output never contains a raw newline,
    /// such as [`JsonCodec`](crate::codec::JsonCodec). MessagePack frames may
    /// contain `0x0a` and cannot be read back from a
    /// [`FileSink`](crate::sink::FileSink) this way.
    pub fn decode_lines<R: BufRead>(
        &self,
        reader: R,
    ) -> impl Iterator<Item = Result<Box<dyn AnyMessage>, ConsumeError>> {
        reader.split(b'\n').filter_map(move |line| match line {
            Ok(line) if line.is_empty() => None,
            Ok(line) => Some(self.decode(&line).map_err(ConsumeError::from)),
            Err(err) => Some(Err(ConsumeError::from(err))),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use rstest::{fixture, rstest};
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    use super::*;
    use crate::{
        codec::{JsonCodec, MsgPackCodec},
        kinds::{Heartbeat, LogEvent},
        message::Envelope,
    };

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct Login {
        user: String,
        attempts: u32,
    }

    impl Payload for Login {
        const KIND: &'static str = "Login";
    }

    #[fixture]
    fn heartbeat() -> Message<Heartbeat> {
        Message::new(Envelope::new("host", 1000, "svc", "DEBUG"), Heartbeat::default())
    }

    #[rstest]
    fn empty_registry_rejects_everything(heartbeat: Message<Heartbeat>) {
        let bytes = JsonCodec.encode(&heartbeat).expect("encode");
        let decoder = Decoder::new(JsonCodec);
        let err = decoder.decode(&bytes).expect_err("unregistered");
        assert!(matches!(err, DecodeError::UnknownKind(kind) if kind == "Heartbeat"));
    }

    #[rstest]
    fn unknown_kind_leaves_registry_intact(heartbeat: Message<Heartbeat>) {
        let bytes = JsonCodec.encode(&heartbeat).expect("encode");
        let mut decoder = Decoder::new(JsonCodec).with_kind::<LogEvent>();
        assert!(decoder.decode(&bytes).is_err());
        assert!(decoder.is_registered("LogEvent"));

        decoder.register_kind::<Heartbeat>();
        let decoded = decoder.decode_as::<Heartbeat>(&bytes).expect("decode");
        assert_eq!(decoded, heartbeat);
    }

    #[rstest]
    fn custom_constructor_is_used() {
        let mut decoder = Decoder::new(JsonCodec);
        decoder.register("Login", construct::<Login>);
        let message = Message::new(
            Envelope::new("h", 5, "auth", "INFO"),
            Login {
                user: "ada".into(),
                attempts: 3,
            },
        );
        let bytes = JsonCodec.encode(&message).expect("encode");
        let decoded = decoder.decode(&bytes).expect("decode");
        assert_eq!(decoded.downcast_ref::<Login>(), Some(&message));
    }

    #[rstest]
    fn missing_kind_is_a_field_mismatch() {
        let decoder = Decoder::new(JsonCodec).with_kind::<Heartbeat>();
        let bytes = br#"{"hostname":"h","microtime":1,"application":"a","level":"INFO"}"#;
        let err = decoder.decode(bytes).expect_err("no kind");
        assert!(matches!(
            err,
            DecodeError::FieldMismatch { ref kind, source: FieldError::Missing { ref field } }
                if kind == UNKNOWN_KIND && field == "kind"
        ));
    }

    #[rstest]
    fn extra_field_is_a_field_mismatch() {
        let decoder = Decoder::new(JsonCodec).with_kind::<Heartbeat>();
        let bytes = br#"{"hostname":"h","microtime":1,"application":"a","level":"INFO","kind":"Heartbeat","x":1}"#;
        let err = decoder.decode(bytes).expect_err("extra field");
        assert!(matches!(
            err,
            DecodeError::FieldMismatch { ref kind, source: FieldError::Unexpected { ref field } }
                if kind == "Heartbeat" && field == "x"
        ));
    }

    #[rstest]
    fn constructor_under_foreign_name_is_rejected(heartbeat: Message<Heartbeat>) {
        let mut decoder = Decoder::new(JsonCodec);
        decoder.register("Heartbeat", construct::<LogEvent>);
        let bytes = JsonCodec.encode(&heartbeat).expect("encode");
        let err = decoder.decode(&bytes).expect_err("kind mismatch");
        assert!(matches!(
            err,
            DecodeError::FieldMismatch {
                source: FieldError::KindMismatch { .. },
                ..
            }
        ));
    }

    #[rstest]
    fn decode_as_reports_other_kind(heartbeat: Message<Heartbeat>) {
        let decoder = Decoder::new(MsgPackCodec)
            .with_kind::<Heartbeat>()
            .with_kind::<LogEvent>();
        let bytes = MsgPackCodec.encode(&heartbeat).expect("encode");
        let err = decoder.decode_as::<LogEvent>(&bytes).expect_err("wrong type");
        assert!(matches!(err, DecodeError::FieldMismatch { ref kind, .. } if kind == "Heartbeat"));
    }

    #[rstest]
    fn malformed_bytes_are_codec_errors() {
        let decoder = Decoder::new(JsonCodec).with_kind::<Heartbeat>();
        assert!(matches!(
            decoder.decode(b"{not json"),
            Err(DecodeError::Codec(_))
        ));
    }

    #[rstest]
    fn decode_fields_skips_the_codec() {
        let decoder = Decoder::new(JsonCodec).with_kind::<LogEvent>();
        let fields = match json!({
            "hostname": "h",
            "microtime": 7,
            "application": "a",
            "level": "WARN",
            "kind": "LogEvent",
            "message": "m",
        }) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        };
        let decoded = decoder.decode_fields(fields).expect("decode");
        let event = decoded.downcast_ref::<LogEvent>().expect("log event");
        assert_eq!(event.payload().message, "m");
        assert_eq!(event.microtime(), 7);
    }

    #[rstest]
    fn decode_lines_reads_each_record(heartbeat: Message<Heartbeat>) {
        let line = JsonCodec.encode(&heartbeat).expect("encode");
        let mut text = Vec::new();
        text.extend_from_slice(&line);
        text.extend_from_slice(b"\n\n");
        text.extend_from_slice(&line);
        text.push(b'\n');

        let decoder = Decoder::new(JsonCodec).with_kind::<Heartbeat>();
        let decoded: Vec<_> = decoder
            .decode_lines(Cursor::new(text))
            .collect::<Result<_, _>>()
            .expect("all lines decode");
        assert_eq!(decoded.len(), 2);
        assert!(decoded.iter().all(|m| m.downcast_ref::<Heartbeat>() == Some(&heartbeat)));
    }

    #[rstest]
    fn registry_debug_lists_kinds() {
        let mut registry = KindRegistry::new();
        registry.register_kind::<LogEvent>();
        registry.register_kind::<Heartbeat>();
        assert_eq!(
            format!("{registry:?}"),
            "KindRegistry { kinds: [\"Heartbeat\", \"LogEvent\"] }"
        );
    }
}
