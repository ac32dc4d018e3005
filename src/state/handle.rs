//! Participant handles and their generator.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Opaque identity of one connected session.
///
/// Handles are the registry key: equality, hashing and removal go through
/// the handle, never the nickname. Cloning is a refcount bump.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(Arc<str>);

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Handle {
    fn from(s: &str) -> Self {
        Self(Arc::from(s))
    }
}

impl From<String> for Handle {
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

/// Generates unique session handles.
///
/// Format: prefix + 6 chars base36. Example: "CAAAAAC"
pub struct HandleGenerator {
    prefix: String,
    counter: AtomicU64,
}

impl HandleGenerator {
    /// Create a new generator; every handle starts with `prefix`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(0),
        }
    }

    /// Generate the next unique handle.
    pub fn next(&self) -> Handle {
        let serial = self.counter.fetch_add(1, Ordering::Relaxed);
        let mut handle = String::with_capacity(self.prefix.len() + SERIAL_WIDTH);
        handle.push_str(&self.prefix);
        handle.extend(serial_digits(serial));
        Handle::from(handle)
    }
}

/// Width of the serial part of a handle.
const SERIAL_WIDTH: usize = 6;

/// Digits of `serial` in base 36, most significant first, `A` standing for zero.
/// Serials beyond `36^6` wrap.
fn serial_digits(serial: u64) -> impl Iterator<Item = char> {
    const ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    (0..SERIAL_WIDTH as u32).rev().map(move |place| {
        let digit = (serial / 36u64.pow(place)) % 36;
        ALPHABET[digit as usize] as char
    })
}
