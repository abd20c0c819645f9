//! Concrete adapters behind the domain ports.

pub mod history;
pub mod in_memory;
