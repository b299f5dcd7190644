//! In-process bounded message queue.

use std::io;

use crossbeam_channel::{Receiver, Sender, TryRecvError, TrySendError, bounded};

use super::{FrameReceiver, FrameSender};

/// Create a bounded queue holding at most `capacity` messages.
///
/// A full queue makes the sender report `WouldBlock`; an empty one makes the
/// receiver report `WouldBlock`. With `capacity == 0` every send that does
/// not meet a waiting receiver is refused.
pub fn queue(capacity: usize) -> (Sender<Vec<u8>>, Receiver<Vec<u8>>) {
    bounded(capacity)
}

impl FrameSender for Sender<Vec<u8>> {
    fn send_nonblocking(&mut self, frame: &[u8]) -> io::Result<()> {
        match self.try_send(frame.to_vec()) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(io::ErrorKind::WouldBlock.into()),
            Err(TrySendError::Disconnected(_)) => Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "message queue receiver disconnected",
            )),
        }
    }
}

impl FrameReceiver for Receiver<Vec<u8>> {
    fn recv_nonblocking(&mut self) -> io::Result<Vec<u8>> {
        match self.try_recv() {
            Ok(frame) => Ok(frame),
            Err(TryRecvError::Empty) => Err(io::ErrorKind::WouldBlock.into()),
            Err(TryRecvError::Disconnected) => Err(io::Error::new(
                io::ErrorKind::ConnectionAborted,
                "message queue sender disconnected",
            )),
        }
    }
}
