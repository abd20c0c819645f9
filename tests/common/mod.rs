use loanflow::domain::channel::{Channel, Envelope};
use loanflow::domain::loan::Loan;

/// One wire line for a loan on `channel`, without the trailing newline.
pub fn line(channel: Channel, id: &str, name: &str, amount: u64, status: &str) -> String {
    let mut loan = Loan::new(id, name, amount).unwrap();
    loan.set_status(status).unwrap();
    serde_json::to_string(&Envelope::new(channel, loan)).unwrap()
}

pub fn application(id: &str, name: &str, amount: u64) -> String {
    line(Channel::Applications, id, name, amount, "PENDING")
}
