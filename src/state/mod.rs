//! State management module.
//!
//! Contains the participant registry and the handle type it is keyed by.

mod handle;
mod registry;

pub use handle::{Handle, HandleGenerator};
pub use registry::{Outbox, Participant, Registry};
