//! Message factories.
//!
//! [`MessageFactory`] stamps every message with the same hostname and
//! application, a timestamp from its clock, and the caller's level, then runs
//! its postprocessing chain. [`SinkFactory`] adds a codec and a sink: each
//! message it builds is encoded and delivered exactly once before being
//! handed back to the caller.
//!
//! Factories are single-writer: the sink-attached variant takes `&mut self`
//! and callers sharing one across threads must wrap it in a lock.

mod builder;


use std::fmt;

use delegate::delegate;

use crate::{
    clock::{Clock, system_clock},
    codec::Codec,
    config::DEFAULT_SCRATCH_CAPACITY,
    error::{ConstructionError, EmitError},
    message::{Envelope, FieldMap, Message, Payload},
    sink::{Delivery, FileSink, Sink, SocketSink},
    transform::{Transform, TransformChain},
};

pub use builder::FactoryBuilder;

/// Builds messages in memory.
pub struct MessageFactory {
    hostname: String,
    application: String,
    clock: Clock,
    transforms: TransformChain,
}

impl MessageFactory {
    /// Create a factory using the system clock and no transforms.
    pub fn new(hostname: impl Into<String>, application: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            application: application.into(),
            clock: system_clock(),
            transforms: TransformChain::new(),
        }
    }

    /// Start a validated builder.
    pub fn builder(
        hostname: impl Into<String>,
        application: impl Into<String>,
    ) -> FactoryBuilder {
        FactoryBuilder::new(hostname, application)
    }

    /// Replace the clock used to stamp `microtime`.
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> i64 + Send + Sync + 'static,
    {
        self.clock = Box::new(clock);
        self
    }

    /// Append a postprocessing transform.
    pub fn with_transform<T>(mut self, transform: T) -> Self
    where
        T: Transform + 'static,
    {
        self.transforms.push(transform);
        self
    }

    /// Append a postprocessing transform in place.
    pub fn add_transform<T>(&mut self, transform: T)
    where
        T: Transform + 'static,
    {
        self.transforms.push(transform);
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn application(&self) -> &str {
        &self.application
    }

    /// Envelope for a message created now at `level`.
    pub fn envelope(&self, level: &str) -> Envelope {
        Envelope::new(
            self.hostname.as_str(),
            (self.clock)(),
            self.application.as_str(),
            level,
        )
    }

    /// Build a message of kind `P::KIND` and run the postprocessing chain.
    pub fn msg<P: Payload>(&self, level: &str, payload: P) -> Message<P> {
        let mut message = Message::new(self.envelope(level), payload);
        self.transforms.apply(&mut message);
        message
    }

    /// Build a message whose payload comes from a field mapping.
    ///
    /// Fails when a field `P` requires is missing or mistyped, or when the
    /// mapping contains a field `P` does not know.
    pub fn msg_from_fields<P: Payload>(
        &self,
        level: &str,
        fields: FieldMap,
    ) -> Result<Message<P>, ConstructionError> {
        let payload = P::from_fields(fields).map_err(|source| ConstructionError {
            kind: P::KIND,
            source,
        })?;
        Ok(self.msg(level, payload))
    }
}

impl fmt::Debug for MessageFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageFactory")
            .field("hostname", &self.hostname)
            .field("application", &self.application)
            .field("transforms", &self.transforms)
            .finish_non_exhaustive()
    }
}

/// Factory that encodes every message and hands it to a sink.
pub struct SinkFactory<C, S> {
    factory: MessageFactory,
    codec: C,
    sink: S,
    scratch: Vec<u8>,
}

/// Factory writing newline-delimited messages to a stream.
pub type FileMessageFactory<C, W> = SinkFactory<C, FileSink<W>>;
/// Factory sending messages over a non-blocking transport.
pub type SocketMessageFactory<C, T> = SinkFactory<C, SocketSink<T>>;

impl<C: Codec, S: Sink> SinkFactory<C, S> {
    pub fn new(factory: MessageFactory, codec: C, sink: S) -> Self {
        Self::with_scratch_capacity(factory, codec, sink, DEFAULT_SCRATCH_CAPACITY)
    }

    pub(crate) fn with_scratch_capacity(
        factory: MessageFactory,
        codec: C,
        sink: S,
        capacity: usize,
    ) -> Self {
        Self {
            factory,
            codec,
            sink,
            scratch: Vec::with_capacity(capacity),
        }
    }

    /// Build, postprocess, encode and deliver a message.
    ///
    /// The message is returned whether the sink sent or dropped it. Encoding
    /// and I/O failures are returned instead.
    pub fn msg<P: Payload>(&mut self, level: &str, payload: P) -> Result<Message<P>, EmitError> {
        let message = self.factory.msg(level, payload);
        self.emit(&message)?;
        Ok(message)
    }

    /// Like [`msg`](Self::msg), with the payload taken from a field mapping.
    pub fn msg_from_fields<P: Payload>(
        &mut self,
        level: &str,
        fields: FieldMap,
    ) -> Result<Message<P>, EmitError> {
        let message = self.factory.msg_from_fields(level, fields)?;
        self.emit(&message)?;
        Ok(message)
    }

    /// Encode `message` and deliver it to the sink.
    pub fn emit<P: Payload>(&mut self, message: &Message<P>) -> Result<Delivery, EmitError> {
        self.scratch.clear();
        self.codec.encode_into(message, &mut self.scratch)?;
        Ok(self.sink.deliver(&self.scratch)?)
    }

    /// Deliver a message that is already encoded with this factory's codec.
    pub fn emit_encoded(&mut self, frame: &[u8]) -> Result<Delivery, EmitError> {
        Ok(self.sink.deliver(frame)?)
    }

    delegate! {
        to self.factory {
            pub fn hostname(&self) -> &str;
            pub fn application(&self) -> &str;
        }
    }

    /// Append a postprocessing transform.
    pub fn add_transform<T>(&mut self, transform: T)
    where
        T: Transform + 'static,
    {
        self.factory.add_transform(transform);
    }

    pub fn factory(&self) -> &MessageFactory {
        &self.factory
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Give the sink back to the caller.
    pub fn into_sink(self) -> S {
        self.sink
    }
}

impl<C: fmt::Debug, S: fmt::Debug> fmt::Debug for SinkFactory<C, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SinkFactory")
            .field("factory", &self.factory)
            .field("codec", &self.codec)
            .field("sink", &self.sink)
            .finish_non_exhaustive()
    }
}
