//! Socket source and decoder combined.

use delegate::delegate;

use crate::{
    codec::Codec,
    decoder::Decoder,
    error::ConsumeError,
    message::{AnyMessage, Payload},
    source::SocketSource,
    transport::FrameReceiver,
};

/// Receives encoded messages from a transport and decodes them.
#[derive(Debug)]
pub struct MessageConsumer<C, T> {
    source: SocketSource<T>,
    decoder: Decoder<C>,
}

impl<C: Codec, T: FrameReceiver> MessageConsumer<C, T> {
    pub fn new(transport: T, decoder: Decoder<C>) -> Self {
        Self {
            source: SocketSource::new(transport),
            decoder,
        }
    }

    /// Receive and decode the next message, or `None` when nothing is waiting.
    pub fn consume(&mut self) -> Result<Option<Box<dyn AnyMessage>>, ConsumeError> {
        match self.source.receive()? {
            Some(frame) => Ok(Some(self.decoder.decode(&frame)?)),
            None => Ok(None),
        }
    }

    /// Register `Message<P>` with the decoder.
    pub fn register_kind<P: Payload>(&mut self) {
        self.decoder.register_kind::<P>();
    }

    delegate! {
        to self.decoder {
            pub fn is_registered(&self, kind: &str) -> bool;
        }
    }

    pub fn decoder(&self) -> &Decoder<C> {
        &self.decoder
    }

    pub fn decoder_mut(&mut self) -> &mut Decoder<C> {
        &mut self.decoder
    }

    pub fn source_mut(&mut self) -> &mut SocketSource<T> {
        &mut self.source
    }

    pub fn into_parts(self) -> (SocketSource<T>, Decoder<C>) {
        (self.source, self.decoder)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::{
        codec::JsonCodec,
        error::DecodeError,
        kinds::{Heartbeat, LogEvent},
        message::{Envelope, Message},
        transport::queue,
    };

    #[rstest]
    fn consumes_until_empty() {
        let (tx, rx) = queue(4);
        let message = Message::new(Envelope::new("h", 1, "a", "INFO"), LogEvent::new("m"));
        tx.send(JsonCodec.encode(&message).expect("encode"))
            .expect("send");

        let mut consumer =
            MessageConsumer::new(rx, Decoder::new(JsonCodec).with_kind::<LogEvent>());
        let decoded = consumer.consume().expect("consume").expect("one message");
        assert_eq!(decoded.downcast_ref::<LogEvent>(), Some(&message));
        assert!(consumer.consume().expect("consume").is_none());
    }

    #[rstest]
    fn unregistered_kind_surfaces_as_decode_error() {
        let (tx, rx) = queue(1);
        let message = Message::new(Envelope::new("h", 1, "a", "INFO"), Heartbeat::default());
        tx.send(JsonCodec.encode(&message).expect("encode"))
            .expect("send");

        let mut consumer = MessageConsumer::new(rx, Decoder::new(JsonCodec));
        assert!(!consumer.is_registered("Heartbeat"));
        let err = consumer.consume().expect_err("unknown kind");
        assert!(matches!(
            err,
            ConsumeError::Decode(DecodeError::UnknownKind(_))
        ));
        consumer.register_kind::<Heartbeat>();
        assert!(consumer.is_registered("Heartbeat"));
    }
}
