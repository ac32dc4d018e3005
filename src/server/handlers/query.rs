//! LIST handling.

use super::ChatServer;

impl ChatServer {
    /// Connected nicknames in join order. Pure query.
    pub(crate) fn handle_list(&self) -> Vec<String> {
        self.registry.list()
    }
}
