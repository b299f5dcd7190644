//! Structured log-message pipeline.
//!
//! A [`MessageFactory`] builds typed messages stamped with hostname,
//! application, timestamp and level. A [`SinkFactory`] additionally encodes
//! each message with a [`Codec`] and delivers it to a [`Sink`]: a
//! newline-delimited stream ([`FileSink`]) or a non-blocking transport
//! ([`SocketSink`]). On the other side a [`SocketSource`] pulls encoded
//! messages without blocking and a [`Decoder`] turns them back into typed
//! messages by looking up their `kind` in its registry.
//!
//! ```
//! use outlog::{Decoder, FileSink, Heartbeat, JsonCodec, MessageFactory};
//!
//! let mut factory = MessageFactory::builder("host", "svc")
//!     .with_clock(|| 1000)
//!     .build_with_sink(JsonCodec, FileSink::new(Vec::new()))
//!     .expect("valid configuration");
//! let sent = factory.msg("DEBUG", Heartbeat::default()).expect("write");
//!
//! let written = factory.into_sink().into_inner();
//! let decoder = Decoder::new(JsonCodec).with_kind::<Heartbeat>();
//! let line = written.strip_suffix(b"\n").expect("delimited");
//! let received = decoder.decode_as::<Heartbeat>(line).expect("decode");
//! assert_eq!(received, sent);
//! ```

pub mod clock;
pub mod codec;
pub mod config;
pub mod consumer;
pub mod decoder;
pub mod error;
pub mod factory;
pub mod kinds;
pub mod message;
pub mod rate_limiter;
pub mod sink;
pub mod source;
pub mod transform;
pub mod transport;

pub use clock::{Clock, fixed_clock, system_clock};
pub use codec::{Codec, JsonCodec, MsgPackCodec};
pub use config::SocketSinkConfig;
pub use consumer::MessageConsumer;
pub use decoder::{Decoder, KindRegistry, construct};
pub use error::{
    BuildError, CodecError, ConstructionError, ConsumeError, DecodeError, EmitError, FieldError,
};
pub use factory::{
    FactoryBuilder, FileMessageFactory, MessageFactory, SinkFactory, SocketMessageFactory,
};
pub use kinds::{Heartbeat, LogEvent};
pub use message::{AnyMessage, Envelope, FieldMap, Message, Payload};
pub use sink::{Delivery, FileSink, Sink, SocketSink};
pub use source::SocketSource;
pub use transform::{Transform, TransformChain};
#[cfg(unix)]
pub use transport::UnixDatagramTransport;
pub use transport::{FrameReceiver, FrameSender, UdpTransport, queue};
