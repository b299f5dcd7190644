//! Message kinds shipped with the crate.

use serde::{Deserialize, Serialize};

use crate::message::Payload;

/// Liveness ping. Carries nothing beyond the envelope.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Heartbeat {}

impl Payload for Heartbeat {
    const KIND: &'static str = "Heartbeat";
}

/// Free-form log line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogEvent {
    pub message: String,
}

impl LogEvent {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Payload for LogEvent {
    const KIND: &'static str = "LogEvent";
}
