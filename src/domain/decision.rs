use super::channel::Channel;
use super::loan::{Amount, LoanStatus};

/// The outcome of checking a loan against the approval threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approved,
    Declined,
}

impl Decision {
    /// Amounts strictly above `threshold` are declined; everything else is approved.
    pub fn for_amount(amount: Amount, threshold: u64) -> Self {
        if amount.value() > threshold {
            Decision::Declined
        } else {
            Decision::Approved
        }
    }

    pub fn status(self) -> LoanStatus {
        match self {
            Decision::Approved => LoanStatus::Approved,
            Decision::Declined => LoanStatus::Declined,
        }
    }

    /// The channel a loan carrying this decision is published on.
    pub fn channel(self) -> Channel {
        match self {
            Decision::Approved => Channel::Approved,
            Decision::Declined => Channel::Declined,
        }
    }
}
