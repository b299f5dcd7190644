//! Postprocessing applied to messages after construction.
//!
//! Transforms see every message a factory builds, after the envelope and
//! payload are assembled and before the message is encoded. They run in
//! registration order and each one finishes before the next starts.

use std::fmt;

use crate::message::AnyMessage;

/// Step in a factory's postprocessing chain.
///
/// Closures of the form `Fn(&mut dyn AnyMessage)` implement this trait.
/// Use [`downcast_mut`](crate::message::AnyMessage) on the argument to
/// reach kind-specific payload fields.
pub trait Transform: Send + Sync {
    /// Inspect or rewrite `message` in place.
    fn apply(&self, message: &mut dyn AnyMessage);
}

impl<F> Transform for F
where
    F: Fn(&mut dyn AnyMessage) + Send + Sync,
{
    fn apply(&self, message: &mut dyn AnyMessage) {
        self(message)
    }
}

/// Ordered list of transforms owned by one factory.
#[derive(Default)]
pub struct TransformChain {
    steps: Vec<Box<dyn Transform>>,
}

impl TransformChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `transform` to the end of the chain.
    pub fn push<T>(&mut self, transform: T)
    where
        T: Transform + 'static,
    {
        self.steps.push(Box::new(transform));
    }

    /// Run every transform over `message`, first registered first.
    pub fn apply(&self, message: &mut dyn AnyMessage) {
        for step in &self.steps {
            step.apply(message);
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl fmt::Debug for TransformChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransformChain({} steps)", self.steps.len())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::{
        kinds::LogEvent,
        message::{Envelope, Message},
    };

    fn append(marker: &'static str) -> impl Fn(&mut dyn AnyMessage) + Send + Sync {
        move |message: &mut dyn AnyMessage| {
            if let Some(event) = message.downcast_mut::<LogEvent>() {
                event.payload_mut().message.push_str(marker);
            }
        }
    }

    #[rstest]
    fn runs_in_registration_order() {
        let mut chain = TransformChain::new();
        chain.push(append("A"));
        chain.push(append("B"));
        let mut message = Message::new(Envelope::new("h", 0, "a", "INFO"), LogEvent::new(""));
        chain.apply(&mut message);
        assert_eq!(message.payload().message, "AB");
    }

    #[rstest]
    fn empty_chain_leaves_message_alone() {
        let chain = TransformChain::new();
        assert!(chain.is_empty());
        let mut message = Message::new(Envelope::new("h", 0, "a", "INFO"), LogEvent::new("x"));
        let before = message.clone();
        chain.apply(&mut message);
        assert_eq!(message, before);
    }
}
