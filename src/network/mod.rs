//! Network module.
//!
//! Contains the Gateway (TCP listener) and the per-connection Session task.

mod gateway;
mod session;

pub use gateway::Gateway;
pub use session::{Session, SessionSettings};
