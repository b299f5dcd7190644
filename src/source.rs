//! Non-blocking origin of encoded messages.

use std::{io, iter};

use crate::transport::FrameReceiver;

/// Pulls encoded messages from a transport without ever blocking.
#[derive(Debug)]
pub struct SocketSource<T> {
    transport: T,
}

impl<T: FrameReceiver> SocketSource<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Take the next queued message, or `None` when nothing is waiting.
    ///
    /// Only genuine transport failures are returned as errors.
    pub fn receive(&mut self) -> io::Result<Option<Vec<u8>>> {
        match self.transport.recv_nonblocking() {
            Ok(frame) => Ok(Some(frame)),
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Iterate over the messages queued right now, stopping when the
    /// transport runs dry or fails.
    pub fn drain(&mut self) -> impl Iterator<Item = io::Result<Vec<u8>>> {
        let mut failed = false;
        iter::from_fn(move || {
            if failed {
                return None;
            }
            let next = self.receive().transpose();
            failed = matches!(next, Some(Err(_)));
            next
        })
    }

    pub fn get_ref(&self) -> &T {
        &self.transport
    }

    pub fn get_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_inner(self) -> T {
        self.transport
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use rstest::rstest;

    use super::*;
    use crate::transport::queue;

    struct Broken;

    impl FrameReceiver for Broken {
        fn recv_nonblocking(&mut self) -> io::Result<Vec<u8>> {
            Err(io::ErrorKind::ConnectionReset.into())
        }
    }

    #[rstest]
    fn empty_source_returns_none_promptly() {
        let (_tx, rx) = queue(1);
        let mut source = SocketSource::new(rx);
        let started = Instant::now();
        for _ in 0..1000 {
            assert!(source.receive().expect("no error").is_none());
        }
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[rstest]
    fn queued_frames_come_out_in_order() {
        let (tx, rx) = queue(4);
        tx.send(b"a".to_vec()).expect("send");
        tx.send(b"b".to_vec()).expect("send");
        let mut source = SocketSource::new(rx);
        let frames: Vec<_> = source.drain().collect::<io::Result<_>>().expect("drain");
        assert_eq!(frames, vec![b"a".to_vec(), b"b".to_vec()]);
        assert!(source.receive().expect("no error").is_none());
    }

    #[rstest]
    fn transport_errors_propagate() {
        let mut source = SocketSource::new(Broken);
        let err = source.receive().expect_err("reset");
        assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
        assert_eq!(source.drain().count(), 1);
    }
}
