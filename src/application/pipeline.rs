use super::checker::{CheckerReport, LoanChecker};
use super::generator::{GeneratorReport, LoanGenerator};
use super::sink::{LoanSink, SinkReport};
use crate::config::{BrokerConfig, CheckerConfig, GeneratorConfig, SinkConfig};
use crate::domain::channel::Channel;
use crate::domain::loan::Loan;
use crate::domain::ports::MessageBus;
use crate::error::Result;
use crate::infrastructure::in_memory::InMemoryBroker;
use rand::Rng;
use std::future::Future;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub generator: GeneratorConfig,
    pub checker: CheckerConfig,
    pub sink: SinkConfig,
    pub broker: BrokerConfig,
}

#[derive(Debug)]
pub struct PipelineReport {
    pub generator: GeneratorReport,
    pub checker: CheckerReport,
    pub sink: SinkReport,
    /// Most recent loans seen by the sink, oldest first.
    pub history: Vec<Loan>,
}

/// Runs generator, checker and sink in one process over an `InMemoryBroker`.
///
/// Stops generating after `ticks` (if given) or when `shutdown` resolves, then
/// drains the checker and the sink before returning.
pub async fn run_pipeline<R, F>(
    config: PipelineConfig,
    rng: R,
    ticks: Option<u64>,
    shutdown: F,
) -> Result<PipelineReport>
where
    R: Rng + Send,
    F: Future<Output = ()>,
{
    let broker = Arc::new(InMemoryBroker::new(config.broker));

    // Subscribe before anything is published so no message is dropped
    let mut applications = broker.subscribe(&[Channel::Applications]).await?;
    let mut decisions = broker
        .subscribe(&[Channel::Approved, Channel::Declined])
        .await?;

    let checker = LoanChecker::new(config.checker, broker.clone());
    let checker_task = tokio::spawn(async move { checker.run(applications.as_mut()).await });

    let mut sink = LoanSink::new(config.sink);
    let sink_task = tokio::spawn(async move {
        let report = sink.run(decisions.as_mut()).await;
        (sink, report)
    });

    let mut generator = LoanGenerator::new(config.generator, rng, broker.clone());
    let generator_report = generator.run(ticks, shutdown).await;
    info!(
        "Generator stopped after {} ticks ({} published, {} failed)",
        generator_report.ticks, generator_report.published, generator_report.failed
    );

    broker.close(Channel::Applications).await;
    let checker_report = checker_task.await??;

    broker.close(Channel::Approved).await;
    broker.close(Channel::Declined).await;
    let (sink, sink_report) = sink_task.await?;
    let sink_report = sink_report?;

    Ok(PipelineReport {
        generator: generator_report,
        checker: checker_report,
        sink: sink_report,
        history: sink.history().iter().cloned().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::loan::LoanStatus;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::time::Duration;

    #[tokio::test]
    async fn test_every_generated_loan_reaches_the_sink() {
        let config = PipelineConfig {
            generator: GeneratorConfig {
                period: Duration::from_millis(1),
                ..GeneratorConfig::default()
            },
            ..PipelineConfig::default()
        };

        let report = run_pipeline(
            config,
            StdRng::seed_from_u64(42),
            Some(20),
            std::future::pending(),
        )
        .await
        .unwrap();

        assert_eq!(report.generator.published, 20);
        assert_eq!(report.checker.approved + report.checker.declined, 20);
        assert_eq!(report.sink.received, 20);
        assert_eq!(report.sink.approved, report.checker.approved);
        assert_eq!(report.sink.declined, report.checker.declined);

        for loan in &report.history {
            let expected = if loan.amount().value() > 10_000 {
                LoanStatus::Declined
            } else {
                LoanStatus::Approved
            };
            assert_eq!(loan.status(), expected);
        }
    }

    #[tokio::test]
    async fn test_history_is_bounded() {
        let config = PipelineConfig {
            generator: GeneratorConfig {
                period: Duration::from_millis(1),
                ..GeneratorConfig::default()
            },
            sink: SinkConfig {
                history_capacity: 5,
            },
            ..PipelineConfig::default()
        };

        let report = run_pipeline(
            config,
            StdRng::seed_from_u64(1),
            Some(12),
            std::future::pending(),
        )
        .await
        .unwrap();
        assert_eq!(report.sink.received, 12);
        assert_eq!(report.history.len(), 5);
    }
}
