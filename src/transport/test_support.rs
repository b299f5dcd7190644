//! Transport doubles shared by unit tests.

use std::io;

use super::{FrameSender, ensure_whole_datagram};

/// Sender that fails every send with the given error kind.
pub(crate) struct Refusing(pub(crate) io::ErrorKind);

impl Refusing {
    /// A transport whose send buffer is permanently full.
    pub(crate) fn saturated() -> Self {
        Self(io::ErrorKind::WouldBlock)
    }
}

impl FrameSender for Refusing {
    fn send_nonblocking(&mut self, _frame: &[u8]) -> io::Result<()> {
        Err(self.0.into())
    }
}

/// Datagram sender whose socket accepts at most `limit` bytes per send.
pub(crate) struct Truncating {
    pub(crate) limit: usize,
}

impl FrameSender for Truncating {
    fn send_nonblocking(&mut self, frame: &[u8]) -> io::Result<()> {
        ensure_whole_datagram(frame.len().min(self.limit), frame)
    }
}
