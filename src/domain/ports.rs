use super::channel::{Channel, Envelope};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Sends loans onto a channel.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, envelope: Envelope) -> Result<()>;
}

/// A stream of loans delivered from one or more channels.
///
/// `recv` yields `None` once the stream has ended and every pending message
/// has been delivered.
#[async_trait]
pub trait Subscription: Send {
    async fn recv(&mut self) -> Result<Option<Envelope>>;
}

/// Hands out subscriptions to named channels.
#[async_trait]
pub trait MessageBus: Publisher {
    async fn subscribe(&self, channels: &[Channel]) -> Result<SubscriptionBox>;
}

pub type PublisherRef = Arc<dyn Publisher>;
pub type SubscriptionBox = Box<dyn Subscription>;
