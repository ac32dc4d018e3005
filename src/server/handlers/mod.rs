//! Chat server event handlers.
//!
//! Each submodule handles a category of [`ServerEvent`](super::ServerEvent)
//! processed by [`ChatServer`](super::ChatServer).

use super::*;

pub mod broadcast;
pub mod depart;
pub mod join;
pub mod message;
pub mod query;
