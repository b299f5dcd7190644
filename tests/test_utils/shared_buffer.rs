//! Shared buffer used to observe what a file sink wrote.

use std::{
    io::{self, Write},
    sync::{Arc, Mutex},
};

/// Thread-safe wrapper around a byte buffer.
///
/// The inner `Arc<Mutex<Vec<u8>>>` is kept private so tests can't
/// accidentally bypass the `Write` implementation or mutate the buffer
/// without locking.
#[derive(Clone, Default)]
pub struct SharedBuf {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuf {
    /// Return a snapshot of the buffer contents.
    pub fn contents(&self) -> Vec<u8> {
        self.buffer
            .lock()
            .expect("SharedBuf mutex poisoned")
            .clone()
    }

    /// Return the buffer contents split into newline-terminated records.
    pub fn lines(&self) -> Vec<Vec<u8>> {
        let contents = self.contents();
        contents
            .split_inclusive(|b| *b == b'\n')
            .map(|line| line.strip_suffix(b"\n").expect("unterminated line").to_vec())
            .collect()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer
            .lock()
            .expect("SharedBuf mutex poisoned")
            .write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.buffer
            .lock()
            .expect("SharedBuf mutex poisoned")
            .flush()
    }
}
