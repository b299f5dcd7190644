//! Validated construction of factories.

use crate::{
    clock::{Clock, system_clock},
    codec::Codec,
    config::DEFAULT_SCRATCH_CAPACITY,
    error::BuildError,
    sink::Sink,
    transform::{Transform, TransformChain},
};

use super::{MessageFactory, SinkFactory};

/// Builder for [`MessageFactory`] and [`SinkFactory`].
///
/// Every builder starts with its own empty transform chain and the system
/// clock.
pub struct FactoryBuilder {
    hostname: String,
    application: String,
    clock: Option<Clock>,
    transforms: TransformChain,
    scratch_capacity: usize,
}

impl FactoryBuilder {
    pub fn new(hostname: impl Into<String>, application: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            application: application.into(),
            clock: None,
            transforms: TransformChain::new(),
            scratch_capacity: DEFAULT_SCRATCH_CAPACITY,
        }
    }

    /// Use `clock` to stamp `microtime`.
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> i64 + Send + Sync + 'static,
    {
        self.clock = Some(Box::new(clock));
        self
    }

    /// Append a postprocessing transform. Transforms run in the order added.
    pub fn with_transform<T>(mut self, transform: T) -> Self
    where
        T: Transform + 'static,
    {
        self.transforms.push(transform);
        self
    }

    /// Initial size of the encode buffer of a sink-attached factory.
    pub fn with_scratch_capacity(mut self, capacity: usize) -> Self {
        self.scratch_capacity = capacity;
        self
    }

    fn validate(&self) -> Result<(), BuildError> {
        if self.hostname.trim().is_empty() {
            return Err(BuildError::InvalidConfig(
                "hostname must not be empty".into(),
            ));
        }
        if self.application.trim().is_empty() {
            return Err(BuildError::InvalidConfig(
                "application must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Build an in-memory factory.
    pub fn build(self) -> Result<MessageFactory, BuildError> {
        self.validate()?;
        Ok(MessageFactory {
            hostname: self.hostname,
            application: self.application,
            clock: self.clock.unwrap_or_else(system_clock),
            transforms: self.transforms,
        })
    }

    /// Build a factory that encodes with `codec` and delivers to `sink`.
    pub fn build_with_sink<C, S>(self, codec: C, sink: S) -> Result<SinkFactory<C, S>, BuildError>
    where
        C: Codec,
        S: Sink,
    {
        let capacity = self.scratch_capacity;
        let factory = self.build()?;
        Ok(SinkFactory::with_scratch_capacity(
            factory, codec, sink, capacity,
        ))
    }
}
