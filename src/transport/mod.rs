//! Non-blocking message transports.
//!
//! Sinks and sources talk to the network through two small traits. Each call
//! moves exactly one whole message and returns immediately; a transport that
//! cannot accept or produce a message right now reports
//! [`io::ErrorKind::WouldBlock`]. Anything else is a genuine transport
//! failure.
//!
//! Three transports ship with the crate, all preserving message boundaries:
//! [`UdpTransport`], [`UnixDatagramTransport`] (Unix only) and an in-process
//! bounded [`queue`] built on `crossbeam-channel`.

use std::io;

mod queue;
mod udp;
#[cfg(test)]
pub(crate) mod test_support;
#[cfg(unix)]
mod unix;

pub use queue::queue;
pub use udp::UdpTransport;
#[cfg(unix)]
pub use unix::UnixDatagramTransport;

/// Sending half of a message transport.
pub trait FrameSender {
    /// Hand one message to the transport without blocking.
    ///
    /// Returns `WouldBlock` when the transport's send buffer is full.
    fn send_nonblocking(&mut self, frame: &[u8]) -> io::Result<()>;
}

/// Receiving half of a message transport.
pub trait FrameReceiver {
    /// Take one message from the transport without blocking.
    ///
    /// Returns `WouldBlock` when nothing is queued.
    fn recv_nonblocking(&mut self) -> io::Result<Vec<u8>>;
}

impl<T: FrameSender + ?Sized> FrameSender for &mut T {
    fn send_nonblocking(&mut self, frame: &[u8]) -> io::Result<()> {
        (**self).send_nonblocking(frame)
    }
}

impl<T: FrameSender + ?Sized> FrameSender for Box<T> {
    fn send_nonblocking(&mut self, frame: &[u8]) -> io::Result<()> {
        (**self).send_nonblocking(frame)
    }
}

impl<T: FrameReceiver + ?Sized> FrameReceiver for &mut T {
    fn recv_nonblocking(&mut self) -> io::Result<Vec<u8>> {
        (**self).recv_nonblocking()
    }
}

impl<T: FrameReceiver + ?Sized> FrameReceiver for Box<T> {
    fn recv_nonblocking(&mut self) -> io::Result<Vec<u8>> {
        (**self).recv_nonblocking()
    }
}

/// Fail when a datagram socket accepted fewer bytes than the whole frame.
fn ensure_whole_datagram(sent: usize, frame: &[u8]) -> io::Result<()> {
    if sent == frame.len() {
        Ok(())
    } else {
        Err(io::Error::new(
            io::ErrorKind::WriteZero,
            format!("datagram truncated: sent {sent} of {} bytes", frame.len()),
        ))
    }
}
