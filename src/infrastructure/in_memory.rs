use crate::config::BrokerConfig;
use crate::domain::channel::{Channel, Envelope};
use crate::domain::ports::{MessageBus, Publisher, Subscription, SubscriptionBox};
use crate::error::{LoanError, Result};
use async_trait::async_trait;
use std::collections::HashSet;
use tokio::sync::{RwLock, mpsc};
use tracing::debug;

struct Route {
    channels: HashSet<Channel>,
    sender: mpsc::Sender<Envelope>,
}

/// An in-process message broker.
///
/// Every subscription owns a bounded queue; publishing copies the envelope into
/// the queue of each subscription listening on its channel and waits for room
/// when a queue is full. Share it behind an `Arc` to hand the same broker to
/// several services.
pub struct InMemoryBroker {
    routes: RwLock<Vec<Route>>,
    queue_capacity: usize,
}

impl InMemoryBroker {
    pub fn new(config: BrokerConfig) -> Self {
        Self {
            routes: RwLock::new(Vec::new()),
            queue_capacity: config.queue_capacity,
        }
    }

    /// Detaches `channel` from every subscription.
    ///
    /// A subscription left without channels ends once its queue is drained.
    pub async fn close(&self, channel: Channel) {
        let mut routes = self.routes.write().await;
        for route in routes.iter_mut() {
            route.channels.remove(&channel);
        }
        routes.retain(|route| !route.channels.is_empty());
        debug!("Closed channel {}", channel);
    }
}

impl Default for InMemoryBroker {
    fn default() -> Self {
        Self::new(BrokerConfig::default())
    }
}

#[async_trait]
impl Publisher for InMemoryBroker {
    async fn publish(&self, envelope: Envelope) -> Result<()> {
        // Collect senders first so a full queue never blocks `close` or `subscribe`
        let targets: Vec<mpsc::Sender<Envelope>> = {
            let routes = self.routes.read().await;
            routes
                .iter()
                .filter(|route| route.channels.contains(&envelope.channel))
                .map(|route| route.sender.clone())
                .collect()
        };

        if targets.is_empty() {
            debug!(
                "No subscribers on {}, dropping {}",
                envelope.channel,
                envelope.loan.id()
            );
            return Ok(());
        }

        let channel = envelope.channel;
        for sender in targets {
            sender
                .send(envelope.clone())
                .await
                .map_err(|_| LoanError::ChannelClosed(channel))?;
        }
        Ok(())
    }
}

#[async_trait]
impl MessageBus for InMemoryBroker {
    async fn subscribe(&self, channels: &[Channel]) -> Result<SubscriptionBox> {
        if channels.is_empty() {
            return Err(LoanError::Config(
                "a subscription needs at least one channel".into(),
            ));
        }
        let (sender, receiver) = mpsc::channel(self.queue_capacity);
        self.routes.write().await.push(Route {
            channels: channels.iter().copied().collect(),
            sender,
        });
        Ok(Box::new(InMemorySubscription { receiver }))
    }
}

pub struct InMemorySubscription {
    receiver: mpsc::Receiver<Envelope>,
}

#[async_trait]
impl Subscription for InMemorySubscription {
    async fn recv(&mut self) -> Result<Option<Envelope>> {
        Ok(self.receiver.recv().await)
    }
}
