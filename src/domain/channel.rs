use super::loan::Loan;
use crate::error::LoanError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The logical message streams connecting the three services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// Generator output, checker input.
    Applications,
    Approved,
    Declined,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Applications => "applications",
            Channel::Approved => "approved",
            Channel::Declined => "declined",
        }
    }
}

impl FromStr for Channel {
    type Err = LoanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "applications" => Ok(Channel::Applications),
            "approved" => Ok(Channel::Approved),
            "declined" => Ok(Channel::Declined),
            other => Err(LoanError::InvalidChannel(other.to_string())),
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A loan addressed to a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub channel: Channel,
    pub loan: Loan,
}

impl Envelope {
    pub fn new(channel: Channel, loan: Loan) -> Self {
        Self { channel, loan }
    }
}
