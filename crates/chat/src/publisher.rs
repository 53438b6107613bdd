//! Outbound publish capability.

use std::sync::Arc;

use crate::error::ChatResult;
use crate::message::ChatMessage;

/// Something that can deliver a message to every subscriber of a destination.
///
/// Errors are surfaced to the caller untouched; producers built on this trait
/// never retry.
#[cfg_attr(test, mockall::automock)]
pub trait Publisher: Send + Sync {
    fn publish(&self, destination: &str, message: ChatMessage) -> ChatResult<()>;
}

impl<P: Publisher + ?Sized> Publisher for Arc<P> {
    fn publish(&self, destination: &str, message: ChatMessage) -> ChatResult<()> {
        (**self).publish(destination, message)
    }
}
