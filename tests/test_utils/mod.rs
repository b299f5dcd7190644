//! Helpers shared by the integration tests.

#![allow(dead_code)]

pub mod shared_buffer;

use std::{
    io,
    time::{Duration, Instant},
};

use outlog::{FrameSender, SocketSource, transport::FrameReceiver};

pub use shared_buffer::SharedBuf;

/// Poll `source` until a message arrives or `timeout` elapses.
pub fn receive_within<T: FrameReceiver>(
    source: &mut SocketSource<T>,
    timeout: Duration,
) -> Option<Vec<u8>> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(frame) = source.receive().expect("receive") {
            return Some(frame);
        }
        if Instant::now() >= deadline {
            return None;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
}

/// Transport that accepts the first `room` messages and then reports that
/// it would block.
pub struct LimitedSender {
    pub room: usize,
    pub accepted: Vec<Vec<u8>>,
}

impl LimitedSender {
    pub fn new(room: usize) -> Self {
        Self {
            room,
            accepted: Vec::new(),
        }
    }
}

impl FrameSender for LimitedSender {
    fn send_nonblocking(&mut self, frame: &[u8]) -> io::Result<()> {
        if self.accepted.len() >= self.room {
            return Err(io::ErrorKind::WouldBlock.into());
        }
        self.accepted.push(frame.to_vec());
        Ok(())
    }
}
