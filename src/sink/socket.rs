//! Best-effort socket sink.

use std::io;

use crate::{
    config::SocketSinkConfig,
    rate_limiter::{RateLimiter, TimeProvider, system_time_provider},
    transport::FrameSender,
};

use super::{Delivery, Sink};

/// Sends each message over a non-blocking transport.
///
/// When the transport reports that it would block, the message is dropped:
/// it is not queued and not retried. Drops are always counted; with
/// [`SocketSinkConfig::drop_warnings`] enabled they are also reported
/// through a rate-limited `log::warn!`. Every other transport error is
/// returned to the caller.
#[derive(Debug)]
pub struct SocketSink<T> {
    transport: T,
    dropped: u64,
    warnings: Option<RateLimiter>,
}

impl<T: FrameSender> SocketSink<T> {
    /// Wrap `transport` with the default configuration.
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, SocketSinkConfig::default())
    }

    pub fn with_config(transport: T, config: SocketSinkConfig) -> Self {
        Self::with_time_provider(transport, config, Box::new(system_time_provider))
    }

    /// Construct with an explicit time source for the drop warnings.
    pub fn with_time_provider(
        transport: T,
        config: SocketSinkConfig,
        time_provider: TimeProvider,
    ) -> Self {
        let warnings = config.drop_warnings.then(|| {
            RateLimiter::new(&config.name, config.warn_interval_secs, time_provider)
        });
        Self {
            transport,
            dropped: 0,
            warnings,
        }
    }

    /// Attempt a single non-blocking send of `frame`.
    pub fn send(&mut self, frame: &[u8]) -> io::Result<Delivery> {
        match self.transport.send_nonblocking(frame) {
            Ok(()) => Ok(Delivery::Sent),
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => {
                self.dropped += 1;
                if let Some(warnings) = &self.warnings {
                    warnings.record_dropped();
                }
                Ok(Delivery::Dropped)
            }
            Err(err) => Err(err),
        }
    }

    /// Messages dropped because the transport was saturated.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn get_ref(&self) -> &T {
        &self.transport
    }

    pub fn get_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Give the transport back, first reporting drops not yet warned about.
    pub fn into_inner(self) -> T {
        if let Some(warnings) = &self.warnings {
            warnings.report_dropped();
        }
        self.transport
    }
}

impl<T: FrameSender> Sink for SocketSink<T> {
    fn deliver(&mut self, frame: &[u8]) -> io::Result<Delivery> {
        self.send(frame)
    }
}
