use crate::config::SinkConfig;
use crate::domain::channel::{Channel, Envelope};
use crate::domain::loan::{Loan, LoanStatus};
use crate::domain::ports::Subscription;
use crate::error::Result;
use crate::infrastructure::history::BoundedHistory;
use tracing::{info, warn};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SinkReport {
    pub received: u64,
    pub approved: u64,
    pub declined: u64,
}

/// Terminal consumer of decided loans. Logs each one and keeps a bounded
/// history of the most recent.
pub struct LoanSink {
    history: BoundedHistory<Loan>,
    report: SinkReport,
}

impl LoanSink {
    pub fn new(config: SinkConfig) -> Self {
        Self {
            history: BoundedHistory::new(config.history_capacity),
            report: SinkReport::default(),
        }
    }

    pub fn receive(&mut self, envelope: Envelope) {
        let Envelope { channel, loan } = envelope;
        info!("Received on {}: {}", channel, loan);

        let expected = match channel {
            Channel::Approved => Some(LoanStatus::Approved),
            Channel::Declined => Some(LoanStatus::Declined),
            Channel::Applications => None,
        };
        if expected != Some(loan.status()) {
            warn!(
                "Loan {} arrived on {} with status {}",
                loan.id(),
                channel,
                loan.status()
            );
        }

        self.report.received += 1;
        match loan.status() {
            LoanStatus::Approved => self.report.approved += 1,
            LoanStatus::Declined => self.report.declined += 1,
            LoanStatus::Pending | LoanStatus::Rejected => {}
        }
        self.history.push(loan);
    }

    /// Drains `decisions` until it ends.
    pub async fn run(&mut self, decisions: &mut dyn Subscription) -> Result<SinkReport> {
        while let Some(envelope) = decisions.recv().await? {
            self.receive(envelope);
        }
        info!(
            "Sink received {} loans: {} approved, {} declined",
            self.report.received, self.report.approved, self.report.declined
        );
        Ok(self.report)
    }

    pub fn history(&self) -> &BoundedHistory<Loan> {
        &self.history
    }

    pub fn report(&self) -> SinkReport {
        self.report
    }
}
