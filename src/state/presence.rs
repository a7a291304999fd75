use crate::error::{ChatError, ChatResult};
use crate::types::*;
use std::collections::HashMap;

/// Who is online: connection ID to display name.
///
/// Display names need not be unique; two connections may share one.
#[derive(Debug, Default)]
pub struct PresenceTable {
    users: HashMap<ConnectionId, String>,
}

impl PresenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sanitize `raw_name` and register it for `connection_id`, replacing any
    /// name the connection already had.
    pub fn join(&mut self, connection_id: &str, raw_name: &str) -> ChatResult<String> {
        let name = sanitize(raw_name, MAX_USERNAME_CHARS);
        if name.is_empty() {
            return Err(ChatError::EmptyUsername);
        }

        self.users.insert(connection_id.to_string(), name.clone());
        Ok(name)
    }

    /// Remove the connection, returning its name if it had joined
    pub fn leave(&mut self, connection_id: &str) -> Option<String> {
        self.users.remove(connection_id)
    }

    pub fn lookup(&self, connection_id: &str) -> Option<String> {
        self.users.get(connection_id).cloned()
    }

    /// All display names currently online, in no particular order
    pub fn list_all(&self) -> Vec<String> {
        self.users.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
