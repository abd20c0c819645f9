use crate::config::GeneratorConfig;
use crate::domain::channel::{Channel, Envelope};
use crate::domain::loan::Loan;
use crate::domain::ports::PublisherRef;
use crate::error::{LoanError, Result};
use rand::Rng;
use rand::seq::SliceRandom;
use std::future::Future;
use std::io;
use tokio::time::{self, MissedTickBehavior};
use tracing::{error, info, warn};
use uuid::Builder;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorReport {
    pub ticks: u64,
    pub published: u64,
    pub failed: u64,
}

/// Produces random `PENDING` loans on the `applications` channel.
///
/// All randomness (borrower, amount and identifier) is drawn from the injected
/// `rng`, so a seeded generator is fully reproducible.
pub struct LoanGenerator<R> {
    config: GeneratorConfig,
    rng: R,
    publisher: PublisherRef,
}

impl<R: Rng + Send> LoanGenerator<R> {
    pub fn new(config: GeneratorConfig, rng: R, publisher: PublisherRef) -> Self {
        Self {
            config,
            rng,
            publisher,
        }
    }

    /// Builds the next loan without publishing it.
    pub fn next_loan(&mut self) -> Result<Loan> {
        let name = self
            .config
            .names
            .choose(&mut self.rng)
            .ok_or_else(|| LoanError::Config("no names to choose from".into()))?
            .clone();
        let amount = *self
            .config
            .amounts
            .choose(&mut self.rng)
            .ok_or_else(|| LoanError::Config("no amounts to choose from".into()))?;

        let mut bytes = [0u8; 16];
        self.rng.fill(&mut bytes);
        let id = Builder::from_random_bytes(bytes).into_uuid();

        Loan::new(id.to_string(), name, amount)
    }

    /// Creates one loan and publishes it.
    pub async fn tick(&mut self) -> Result<Loan> {
        let loan = self.next_loan()?;
        info!("Created: {}", loan);
        self.publisher
            .publish(Envelope::new(Channel::Applications, loan.clone()))
            .await?;
        Ok(loan)
    }

    /// Ticks every configured period until `ticks` have fired (if given) or
    /// `shutdown` resolves.
    ///
    /// A failed tick is logged and does not stop the loop, unless the publisher
    /// reports a broken pipe: nobody is reading any more, so the loop ends.
    pub async fn run<F>(&mut self, ticks: Option<u64>, shutdown: F) -> GeneratorReport
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut interval = time::interval(self.config.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut report = GeneratorReport::default();
        while ticks.is_none_or(|limit| report.ticks < limit) {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Shutdown requested, stopping generator");
                    break;
                }
                _ = interval.tick() => {}
            }

            report.ticks += 1;
            match self.tick().await {
                Ok(_) => report.published += 1,
                Err(LoanError::Io(e)) if e.kind() == io::ErrorKind::BrokenPipe => {
                    warn!("Output closed, stopping generator: {}", e);
                    report.failed += 1;
                    break;
                }
                Err(e) => {
                    error!("Failed to publish loan: {}", e);
                    report.failed += 1;
                }
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::loan::LoanStatus;
    use crate::domain::ports::{MessageBus, Publisher};
    use crate::infrastructure::in_memory::InMemoryBroker;
    use async_trait::async_trait;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::Duration;

    fn config() -> GeneratorConfig {
        GeneratorConfig::new(
            vec!["Kim".into(), "Angela".into()],
            vec![500, 50_000],
            Duration::from_millis(1),
        )
        .unwrap()
    }

    /// Fails every other publish.
    struct FlakyPublisher {
        calls: AtomicU64,
    }

    #[async_trait]
    impl Publisher for FlakyPublisher {
        async fn publish(&self, envelope: Envelope) -> Result<()> {
            if self.calls.fetch_add(1, Ordering::SeqCst) % 2 == 0 {
                Err(LoanError::ChannelClosed(envelope.channel))
            } else {
                Ok(())
            }
        }
    }

    /// Publishes once, then behaves like a pipe whose reader has gone away.
    struct ClosingPublisher {
        calls: AtomicU64,
    }

    #[async_trait]
    impl Publisher for ClosingPublisher {
        async fn publish(&self, _envelope: Envelope) -> Result<()> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(())
            } else {
                Err(io::Error::from(io::ErrorKind::BrokenPipe).into())
            }
        }
    }

    #[test]
    fn test_generated_loans_are_pending_and_from_config() {
        let broker = Arc::new(InMemoryBroker::default());
        let mut generator = LoanGenerator::new(config(), StdRng::seed_from_u64(1), broker);

        for _ in 0..50 {
            let loan = generator.next_loan().unwrap();
            assert_eq!(loan.status(), LoanStatus::Pending);
            assert!(["Kim", "Angela"].contains(&loan.name()));
            assert!([500, 50_000].contains(&loan.amount().value()));
        }
    }

    #[test]
    fn test_seeded_generators_are_reproducible() {
        let broker = Arc::new(InMemoryBroker::default());
        let mut a = LoanGenerator::new(config(), StdRng::seed_from_u64(7), broker.clone());
        let mut b = LoanGenerator::new(config(), StdRng::seed_from_u64(7), broker);

        for _ in 0..10 {
            assert_eq!(a.next_loan().unwrap(), b.next_loan().unwrap());
        }
    }

    #[test]
    fn test_ids_are_unique_v4_uuids() {
        let broker = Arc::new(InMemoryBroker::default());
        let mut generator = LoanGenerator::new(config(), StdRng::seed_from_u64(3), broker);

        let mut seen = std::collections::HashSet::new();
        for _ in 0..100 {
            let loan = generator.next_loan().unwrap();
            let id = uuid::Uuid::parse_str(loan.id()).unwrap();
            assert_eq!(id.get_version_num(), 4);
            assert!(seen.insert(loan.id().to_string()));
        }
    }

    #[tokio::test]
    async fn test_run_publishes_on_applications() {
        let broker = Arc::new(InMemoryBroker::default());
        let mut applications = broker.subscribe(&[Channel::Applications]).await.unwrap();
        let mut generator =
            LoanGenerator::new(config(), StdRng::seed_from_u64(11), broker.clone());

        let report = generator.run(Some(3), std::future::pending()).await;
        assert_eq!(
            report,
            GeneratorReport {
                ticks: 3,
                published: 3,
                failed: 0
            }
        );

        broker.close(Channel::Applications).await;
        let mut received = 0;
        while let Some(envelope) = applications.recv().await.unwrap() {
            assert_eq!(envelope.channel, Channel::Applications);
            assert_eq!(envelope.loan.status(), LoanStatus::Pending);
            received += 1;
        }
        assert_eq!(received, 3);
    }

    #[tokio::test]
    async fn test_failed_publish_only_affects_its_tick() {
        let publisher = Arc::new(FlakyPublisher {
            calls: AtomicU64::new(0),
        });
        let mut generator = LoanGenerator::new(config(), StdRng::seed_from_u64(5), publisher);

        let report = generator.run(Some(4), std::future::pending()).await;
        assert_eq!(report.ticks, 4);
        assert_eq!(report.published, 2);
        assert_eq!(report.failed, 2);
    }

    #[tokio::test]
    async fn test_broken_pipe_stops_the_loop() {
        let publisher = Arc::new(ClosingPublisher {
            calls: AtomicU64::new(0),
        });
        let mut generator = LoanGenerator::new(config(), StdRng::seed_from_u64(5), publisher);

        let report = generator.run(None, std::future::pending()).await;
        assert_eq!(
            report,
            GeneratorReport {
                ticks: 2,
                published: 1,
                failed: 1
            }
        );
    }

    #[tokio::test]
    async fn test_shutdown_stops_the_loop() {
        let broker = Arc::new(InMemoryBroker::default());
        let mut generator = LoanGenerator::new(config(), StdRng::seed_from_u64(5), broker);

        let report = generator.run(None, async {}).await;
        assert_eq!(report.ticks, 0);
    }
}
