//! Application layer containing the three services and the in-process pipeline
//! that wires them together.
//!
//! Each service receives its channel handles explicitly through its constructor
//! or `run` arguments, so any `Publisher`/`Subscription` implementation can be
//! plugged in: the in-memory broker, the JSON-lines stdio transport, or a test
//! double.

pub mod checker;
pub mod generator;
pub mod pipeline;
pub mod sink;
