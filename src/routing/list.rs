use std::fmt;

use super::RoutingProtocol;

/// Priority given to the single routing entry.
pub const LIST_PRIORITY: i16 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub protocol: RoutingProtocol,
    pub priority: i16,
}

/// Prioritized list of routing protocols attached to a node's stack.
/// Higher priority is consulted first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListRouting {
    entries: Vec<ListEntry>,
}

impl ListRouting {
    pub fn add(&mut self, protocol: RoutingProtocol, priority: i16) {
        let at = self
            .entries
            .iter()
            .position(|e| e.priority < priority)
            .unwrap_or(self.entries.len());
        self.entries.insert(at, ListEntry { protocol, priority });
    }

    pub fn entries(&self) -> &[ListEntry] {
        &self.entries
    }

    /// Entry with the highest priority.
    pub fn active(&self) -> Option<&ListEntry> {
        self.entries.first()
    }
}

impl fmt::Display for ListRouting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}@{}", e.protocol, e.priority)?;
        }
        Ok(())
    }
}
