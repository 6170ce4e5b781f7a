// ============================================================================
// Groupcast Core - Group Entity
// File: crates/groupcast-core/src/domain/group.rs
// Description: Selectable messaging destination
// ============================================================================

use serde::{Deserialize, Serialize};

/// Internal row identifier, used for local matching and as the delete key.
pub type GroupKey = i64;

/// Identifier of the destination in the external messaging system.
pub type ExternalGroupId = i64;

/// Group entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupKey,
    pub group_id: ExternalGroupId,
    pub name: String,
    pub selected: bool,
}

impl Group {
    pub fn new(id: GroupKey, group_id: ExternalGroupId, name: impl Into<String>) -> Self {
        Self {
            id,
            group_id,
            name: name.into(),
            selected: false,
        }
    }

    pub fn with_selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    /// Case-insensitive substring match on the name. Blank queries match everything.
    pub fn matches(&self, query: &str) -> bool {
        if query.trim().is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&query.to_lowercase())
    }
}
