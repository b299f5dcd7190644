//! Defaults and tunables for factories, sinks and transports.
//!
//! Nothing here is read from files or the environment; callers override the
//! defaults through builders and `with_*` methods.

/// Initial capacity of a factory's reusable encode buffer.
pub const DEFAULT_SCRATCH_CAPACITY: usize = 256;
/// Largest datagram a transport will receive (maximum UDP payload over IPv4).
pub const DEFAULT_MAX_DATAGRAM_SIZE: usize = 65_507;
/// Minimum number of seconds between dropped-message warnings.
pub const DEFAULT_WARN_INTERVAL_SECS: u64 = 5;
/// Name used in warnings emitted by a socket sink.
pub const DEFAULT_SOCKET_SINK_NAME: &str = "SocketSink";

/// Settings for a [`SocketSink`](crate::sink::SocketSink).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SocketSinkConfig {
    /// Name reported in dropped-message warnings.
    pub name: String,
    /// Minimum number of seconds between dropped-message warnings.
    pub warn_interval_secs: u64,
    /// Emit rate-limited `log::warn!` reports of dropped messages.
    ///
    /// Off by default: the drop count is always available through
    /// [`SocketSink::dropped`](crate::sink::SocketSink::dropped), and a sink
    /// that also carries the application's `log` output must not log into
    /// itself.
    pub drop_warnings: bool,
}

impl Default for SocketSinkConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_SOCKET_SINK_NAME.to_owned(),
            warn_interval_secs: DEFAULT_WARN_INTERVAL_SECS,
            drop_warnings: false,
        }
    }
}

impl SocketSinkConfig {
    /// Override the name used in warnings.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Override the warning interval.
    pub fn with_warn_interval_secs(mut self, secs: u64) -> Self {
        self.warn_interval_secs = secs;
        self
    }

    /// Turn dropped-message warnings on or off.
    pub fn with_drop_warnings(mut self, enabled: bool) -> Self {
        self.drop_warnings = enabled;
        self
    }
}
