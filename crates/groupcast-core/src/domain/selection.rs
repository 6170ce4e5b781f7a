// ============================================================================
// Groupcast Core - Selection State
// File: crates/groupcast-core/src/domain/selection.rs
// Description: Working list, search filter and selection aggregates
// ============================================================================
//! Pure selection state.
//!
//! Every mutation leaves the state consistent on return:
//! - `select_all` is true iff the working list is non-empty and every group is selected.
//! - The visible list is derived from the working list and the search text on demand, so it
//!   can never drift from it.
//! - Each group carries a write revision. Any local change to a group's flag bumps it, which
//!   lets the selection service tell whether a queued remote write is still the latest one.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::group::{ExternalGroupId, Group, GroupKey};

#[derive(Debug, Clone)]
pub struct SelectionState {
    groups: Vec<Group>,
    search_text: String,
    select_all: bool,
    edit_mode: bool,
    loading: bool,
    revisions: HashMap<GroupKey, u64>,
    next_revision: u64,
}

/// Read-only view handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionSnapshot {
    pub groups: Vec<Group>,
    pub visible: Vec<Group>,
    pub search_text: String,
    pub select_all: bool,
    pub edit_mode: bool,
    pub loading: bool,
    pub selected_count: usize,
}

/// Result of removing groups after a confirmed deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Removal {
    pub removed: usize,
    pub remaining: usize,
}

impl Default for SelectionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionState {
    pub fn new() -> Self {
        Self {
            groups: Vec::new(),
            search_text: String::new(),
            select_all: false,
            edit_mode: false,
            loading: true,
            revisions: HashMap::new(),
            next_revision: 0,
        }
    }

    /// Replace the working list with a fresh fetch. Duplicate ids keep their first
    /// occurrence; the number of dropped rows is returned.
    pub fn replace_groups(&mut self, groups: Vec<Group>) -> usize {
        let total = groups.len();
        let mut seen = HashSet::with_capacity(total);
        self.groups = groups.into_iter().filter(|g| seen.insert(g.id)).collect();
        self.revisions.clear();
        self.loading = false;
        self.recompute_select_all();
        total - self.groups.len()
    }

    /// Resolve the loading state without touching the list.
    pub fn finish_loading(&mut self) {
        self.loading = false;
    }

    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.search_text = text.into();
    }

    /// Set one group's flag. Returns the new write revision, or `None` for an unknown id.
    pub fn set_selected(&mut self, id: GroupKey, selected: bool) -> Option<u64> {
        let group = self.groups.iter_mut().find(|g| g.id == id)?;
        group.selected = selected;
        let revision = self.bump_revision(id);
        self.recompute_select_all();
        Some(revision)
    }

    /// Flip the select-all aggregate and apply it to every group. Returns the value applied.
    pub fn toggle_all(&mut self) -> bool {
        let value = !self.select_all;
        self.assign_all(value);
        value
    }

    /// Clear every selection flag.
    pub fn clear_all(&mut self) {
        self.assign_all(false);
    }

    pub fn set_edit_mode(&mut self, edit_mode: bool) {
        self.edit_mode = edit_mode;
    }

    /// Drop every group whose id is in `ids` in a single step.
    pub fn remove(&mut self, ids: &[GroupKey]) -> Removal {
        let doomed: HashSet<GroupKey> = ids.iter().copied().collect();
        let before = self.groups.len();
        self.groups.retain(|g| !doomed.contains(&g.id));
        self.revisions.retain(|id, _| !doomed.contains(id));
        self.recompute_select_all();
        Removal {
            removed: before - self.groups.len(),
            remaining: self.groups.len(),
        }
    }

    pub fn revision(&self, id: GroupKey) -> Option<u64> {
        self.revisions.get(&id).copied()
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn visible(&self) -> impl Iterator<Item = &Group> + '_ {
        self.groups.iter().filter(|g| g.matches(&self.search_text))
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn select_all(&self) -> bool {
        self.select_all
    }

    pub fn edit_mode(&self) -> bool {
        self.edit_mode
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn contains(&self, id: GroupKey) -> bool {
        self.groups.iter().any(|g| g.id == id)
    }

    pub fn selected_count(&self) -> usize {
        self.groups.iter().filter(|g| g.selected).count()
    }

    /// Internal ids of the selected groups, in list order.
    pub fn selected_ids(&self) -> Vec<GroupKey> {
        self.groups
            .iter()
            .filter(|g| g.selected)
            .map(|g| g.id)
            .collect()
    }

    /// External ids of the selected groups, in list order.
    pub fn selected_group_ids(&self) -> Vec<ExternalGroupId> {
        self.groups
            .iter()
            .filter(|g| g.selected)
            .map(|g| g.group_id)
            .collect()
    }

    pub fn snapshot(&self) -> SelectionSnapshot {
        SelectionSnapshot {
            groups: self.groups.clone(),
            visible: self.visible().cloned().collect(),
            search_text: self.search_text.clone(),
            select_all: self.select_all,
            edit_mode: self.edit_mode,
            loading: self.loading,
            selected_count: self.selected_count(),
        }
    }

    fn assign_all(&mut self, value: bool) {
        let ids: Vec<GroupKey> = self.groups.iter().map(|g| g.id).collect();
        for group in &mut self.groups {
            group.selected = value;
        }
        for id in ids {
            self.bump_revision(id);
        }
        self.recompute_select_all();
    }

    fn bump_revision(&mut self, id: GroupKey) -> u64 {
        self.next_revision += 1;
        self.revisions.insert(id, self.next_revision);
        self.next_revision
    }

    fn recompute_select_all(&mut self) {
        self.select_all = !self.groups.is_empty() && self.groups.iter().all(|g| g.selected);
    }
}
