use crate::config::CheckerConfig;
use crate::domain::channel::Envelope;
use crate::domain::decision::Decision;
use crate::domain::loan::{Loan, LoanStatus};
use crate::domain::ports::{PublisherRef, Subscription};
use crate::error::Result;
use tracing::{error, info, warn};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CheckerReport {
    pub approved: u64,
    pub declined: u64,
    pub failed: u64,
}

/// Routes loan applications to the `approved` or `declined` channel.
pub struct LoanChecker {
    config: CheckerConfig,
    publisher: PublisherRef,
}

impl LoanChecker {
    pub fn new(config: CheckerConfig, publisher: PublisherRef) -> Self {
        Self { config, publisher }
    }

    pub fn threshold(&self) -> u64 {
        self.config.threshold
    }

    /// Decides on `loan` and publishes it on the matching channel.
    pub async fn check(&self, mut loan: Loan) -> Result<Decision> {
        info!("{}", loan);
        if loan.status() != LoanStatus::Pending {
            warn!("Loan {} arrived already {}", loan.id(), loan.status());
        }

        let decision = Decision::for_amount(loan.amount(), self.config.threshold);
        loan.apply(decision);
        info!("{}", loan);

        self.publisher
            .publish(Envelope::new(decision.channel(), loan))
            .await?;
        Ok(decision)
    }

    /// Checks every loan delivered by `applications` until it ends.
    ///
    /// A loan that cannot be published is logged and counted; the checker moves
    /// on to the next one. Errors from the subscription itself are returned.
    pub async fn run(&self, applications: &mut dyn Subscription) -> Result<CheckerReport> {
        let mut report = CheckerReport::default();
        while let Some(envelope) = applications.recv().await? {
            let id = envelope.loan.id().to_string();
            match self.check(envelope.loan).await {
                Ok(Decision::Approved) => report.approved += 1,
                Ok(Decision::Declined) => report.declined += 1,
                Err(e) => {
                    error!("Failed to route loan {}: {}", id, e);
                    report.failed += 1;
                }
            }
        }
        info!(
            "Checker finished: {} approved, {} declined, {} failed",
            report.approved, report.declined, report.failed
        );
        Ok(report)
    }
}
