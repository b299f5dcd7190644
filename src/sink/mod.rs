//! Destinations for encoded messages.
//!
//! A [`Sink`] receives one encoded message per call. [`FileSink`] appends it
//! to a caller-owned stream with a newline delimiter; [`SocketSink`] hands it
//! to a non-blocking transport and drops it when the transport is saturated.

use std::io;

mod file;
mod socket;

pub use file::FileSink;
pub use socket::SocketSink;

/// What became of a message handed to a sink.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delivery {
    /// The message was written or handed to the transport.
    Sent,
    /// The transport was saturated and the message was discarded.
    Dropped,
}

/// Destination accepting encoded messages.
pub trait Sink {
    /// Deliver one encoded message.
    ///
    /// Genuine I/O failures are returned unchanged and never retried.
    fn deliver(&mut self, frame: &[u8]) -> io::Result<Delivery>;
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn deliver(&mut self, frame: &[u8]) -> io::Result<Delivery> {
        (**self).deliver(frame)
    }
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn deliver(&mut self, frame: &[u8]) -> io::Result<Delivery> {
        (**self).deliver(frame)
    }
}
