//! Domain types shared by every service: the loan record, the routing
//! decision, channel addressing and the messaging ports.

pub mod channel;
pub mod decision;
pub mod loan;
pub mod ports;
