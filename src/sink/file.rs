//! Newline-delimited stream sink.

use std::io::{self, Write};

use super::{Delivery, Sink};

/// Appends each message followed by `\n` to a writable stream.
///
/// The stream belongs to the caller: the sink never flushes, closes or
/// reopens it. Wrap files in a `BufWriter` for throughput and flush it when
/// done.
///
/// Frames are not escaped. Pair this sink with a codec whose output never
/// contains `\n`, such as [`JsonCodec`](crate::codec::JsonCodec): a
/// [`MsgPackCodec`](crate::codec::MsgPackCodec) frame may hold the delimiter
/// byte, and [`Decoder::decode_lines`](crate::decoder::Decoder::decode_lines)
/// would then split it.
#[derive(Debug)]
pub struct FileSink<W> {
    writer: W,
}

impl<W: Write> FileSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Write `frame` and its delimiter.
    pub fn write(&mut self, frame: &[u8]) -> io::Result<()> {
        self.writer.write_all(frame)?;
        self.writer.write_all(b"\n")
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Give the stream back to the caller.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Sink for FileSink<W> {
    fn deliver(&mut self, frame: &[u8]) -> io::Result<Delivery> {
        self.write(frame)?;
        Ok(Delivery::Sent)
    }
}
