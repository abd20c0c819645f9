use super::decision::Decision;
use crate::error::{LoanError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Represents a positive monetary amount requested by a borrower.
///
/// Zero is rejected both at construction and when decoding a message, so a
/// `Loan` can never carry a non-positive amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct Amount(u64);

impl Amount {
    pub fn new(value: u64) -> Result<Self> {
        if value > 0 {
            Ok(Self(value))
        } else {
            Err(LoanError::InvalidAmount)
        }
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl TryFrom<u64> for Amount {
    type Error = LoanError;

    fn try_from(value: u64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Amount> for u64 {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The valid states of a loan.
///
/// `Rejected` is accepted as a value but no component ever produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LoanStatus {
    Pending,
    Approved,
    Declined,
    Rejected,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Pending => "PENDING",
            LoanStatus::Approved => "APPROVED",
            LoanStatus::Declined => "DECLINED",
            LoanStatus::Rejected => "REJECTED",
        }
    }
}

impl FromStr for LoanStatus {
    type Err = LoanError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "PENDING" => Ok(LoanStatus::Pending),
            "APPROVED" => Ok(LoanStatus::Approved),
            "DECLINED" => Ok(LoanStatus::Declined),
            "REJECTED" => Ok(LoanStatus::Rejected),
            other => Err(LoanError::InvalidStatus(other.to_string())),
        }
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A loan application flowing from the generator through the checker to the sink.
///
/// Identity, borrower and amount are fixed at creation; only the status can
/// change, and only to one of the `LoanStatus` values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    id: String,
    name: String,
    amount: Amount,
    status: LoanStatus,
}

impl Loan {
    /// Creates a new `PENDING` loan.
    pub fn new(id: impl Into<String>, name: impl Into<String>, amount: u64) -> Result<Self> {
        Ok(Self {
            id: id.into(),
            name: name.into(),
            amount: Amount::new(amount)?,
            status: LoanStatus::Pending,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn status(&self) -> LoanStatus {
        self.status
    }

    /// Sets the status from its textual form.
    ///
    /// Anything outside the four known values is rejected and the current
    /// status is left untouched.
    pub fn set_status(&mut self, status: &str) -> Result<()> {
        self.status = status.parse()?;
        Ok(())
    }

    /// Records the checker's decision on this loan.
    pub fn apply(&mut self, decision: Decision) {
        self.status = decision.status();
    }
}

impl fmt::Display for Loan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} for ${} for {}",
            self.status, self.id, self.amount, self.name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_loan_is_pending() {
        let loan = Loan::new("abc", "Kim", 1000).unwrap();
        assert_eq!(loan.id(), "abc");
        assert_eq!(loan.name(), "Kim");
        assert_eq!(loan.amount().value(), 1000);
        assert_eq!(loan.status(), LoanStatus::Pending);
    }

    #[test]
    fn test_amount_validation() {
        assert!(Amount::new(1).is_ok());
        assert!(matches!(Amount::new(0), Err(LoanError::InvalidAmount)));
        assert!(matches!(
            Loan::new("abc", "Kim", 0),
            Err(LoanError::InvalidAmount)
        ));
    }

    #[test]
    fn test_set_status_accepts_known_values() {
        let mut loan = Loan::new("abc", "Kim", 1000).unwrap();
        for (text, status) in [
            ("APPROVED", LoanStatus::Approved),
            ("DECLINED", LoanStatus::Declined),
            ("REJECTED", LoanStatus::Rejected),
            ("PENDING", LoanStatus::Pending),
        ] {
            loan.set_status(text).unwrap();
            assert_eq!(loan.status(), status);
        }
    }

    #[test]
    fn test_set_status_rejects_unknown_value() {
        let mut loan = Loan::new("abc", "Kim", 1000).unwrap();
        loan.set_status("APPROVED").unwrap();

        let result = loan.set_status("MAYBE");
        assert!(matches!(result, Err(LoanError::InvalidStatus(ref s)) if s == "MAYBE"));
        assert_eq!(loan.status(), LoanStatus::Approved);

        // Matching is exact, lower-case names are not accepted
        assert!(loan.set_status("approved").is_err());
        assert_eq!(loan.status(), LoanStatus::Approved);
    }

    #[test]
    fn test_serialized_shape() {
        let loan = Loan::new("abc", "Kim", 1000).unwrap();
        let json = serde_json::to_value(&loan).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": "abc", "name": "Kim", "amount": 1000, "status": "PENDING"})
        );
    }

    #[test]
    fn test_deserialization_validates_fields() {
        let bad_status = r#"{"id":"abc","name":"Kim","amount":1000,"status":"LOST"}"#;
        assert!(serde_json::from_str::<Loan>(bad_status).is_err());

        let zero_amount = r#"{"id":"abc","name":"Kim","amount":0,"status":"PENDING"}"#;
        assert!(serde_json::from_str::<Loan>(zero_amount).is_err());

        let rejected = r#"{"id":"abc","name":"Kim","amount":5,"status":"REJECTED"}"#;
        let loan: Loan = serde_json::from_str(rejected).unwrap();
        assert_eq!(loan.status(), LoanStatus::Rejected);
    }

    #[test]
    fn test_display() {
        let loan = Loan::new("abc", "Kim", 1000).unwrap();
        assert_eq!(loan.to_string(), "PENDING abc for $1000 for Kim");
    }
}
