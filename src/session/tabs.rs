//! Tab/session management.
//!
//! The [`TabManager`] owns every tab and the active-tab pointer. It is the
//! only place tabs are mutated; everything else reads them through shared
//! references.

use std::fmt;
use std::time::Duration;

use tracing::debug;

use crate::result::{next_sort, sort_rows, QueryResult, SortConfig};

/// Name given to freshly created tabs.
pub const DEFAULT_TAB_NAME: &str = "New Query";

/// Narrowest width a result column can be resized to.
pub const MIN_COLUMN_WIDTH: u16 = 4;

/// Widest width a result column can be resized to.
pub const MAX_COLUMN_WIDTH: u16 = 80;

/// Identifier of a tab. Allocated monotonically and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TabId(u64);

impl TabId {
    /// Returns the inner u64 value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One query-editing session.
#[derive(Debug, Clone)]
pub struct Tab {
    pub id: TabId,
    pub name: String,
    /// Query text.
    pub content: String,
    pub query_result: Option<QueryResult>,
    pub execution_time: Option<Duration>,
    /// Active sort of `query_result`; cleared whenever the result is replaced.
    pub sort: Option<SortConfig>,
    /// Widths the user set per column; `None` means auto-sized.
    pub column_widths: Vec<Option<u16>>,
}

impl Tab {
    fn new(id: TabId) -> Self {
        Self {
            id,
            name: DEFAULT_TAB_NAME.to_string(),
            content: String::new(),
            query_result: None,
            execution_time: None,
            sort: None,
            column_widths: Vec::new(),
        }
    }

    /// User-set width of a column, if any.
    pub fn column_width(&self, column_index: usize) -> Option<u16> {
        self.column_widths.get(column_index).copied().flatten()
    }
}

/// Owns the tab collection and the active pointer.
///
/// Invariant: when the collection is non-empty, `active` is either `None`
/// (only before the first tab exists) or the id of a member.
#[derive(Debug, Default)]
pub struct TabManager {
    tabs: Vec<Tab>,
    active: Option<TabId>,
    next_id: u64,
}

impl TabManager {
    /// Creates an empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new tab, appends it and makes it active.
    pub fn add_tab(&mut self) -> TabId {
        self.next_id += 1;
        let id = TabId(self.next_id);
        self.tabs.push(Tab::new(id));
        self.active = Some(id);
        debug!(%id, "Added tab");
        id
    }

    /// Removes a tab. Unknown ids are ignored.
    ///
    /// If the removed tab was active, the first remaining tab becomes active.
    pub fn remove_tab(&mut self, id: TabId) {
        let Some(pos) = self.position(id) else {
            return;
        };
        self.tabs.remove(pos);
        if self.active == Some(id) {
            self.active = self.tabs.first().map(|t| t.id);
        }
        debug!(%id, active = ?self.active, "Removed tab");
    }

    /// Renames a tab. Unknown ids are ignored.
    pub fn rename_tab(&mut self, id: TabId, name: impl Into<String>) {
        if let Some(tab) = self.get_mut(id) {
            tab.name = name.into();
        }
    }

    /// Replaces a tab's query text. Unknown ids are ignored.
    pub fn update_content(&mut self, id: TabId, text: impl Into<String>) {
        if let Some(tab) = self.get_mut(id) {
            tab.content = text.into();
        }
    }

    /// Switches the active pointer. Callers pass ids from the current set.
    pub fn set_active(&mut self, id: TabId) {
        self.active = Some(id);
    }

    /// Stores a new result on a tab, resetting its sort and column widths.
    pub fn set_result(&mut self, id: TabId, result: QueryResult, elapsed: Duration) {
        if let Some(tab) = self.get_mut(id) {
            tab.query_result = Some(result);
            tab.execution_time = Some(elapsed);
            tab.sort = None;
            tab.column_widths.clear();
        }
    }

    /// Sorts the active tab's result by a column, toggling direction.
    ///
    /// Returns the new sort, or `None` when there is nothing to sort.
    pub fn sort_active(&mut self, column_index: usize) -> Option<SortConfig> {
        let id = self.active?;
        let tab = self.get_mut(id)?;
        let result = tab.query_result.as_mut()?;
        if column_index >= result.columns.len() {
            return None;
        }

        let config = next_sort(tab.sort, column_index);
        sort_rows(&mut result.rows, config.column_index, config.direction);
        tab.sort = Some(config);
        debug!(%id, column = column_index, direction = ?config.direction, "Sorted result");
        Some(config)
    }

    /// Sets a column's width on a tab, clamped to the allowed range.
    pub fn set_column_width(&mut self, id: TabId, column_index: usize, width: u16) {
        if let Some(tab) = self.get_mut(id) {
            if tab.column_widths.len() <= column_index {
                tab.column_widths.resize(column_index + 1, None);
            }
            tab.column_widths[column_index] = Some(width.clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH));
        }
    }

    /// Makes the tab after the active one active, wrapping around.
    pub fn next_tab(&mut self) {
        self.step(1);
    }

    /// Makes the tab before the active one active, wrapping around.
    pub fn previous_tab(&mut self) {
        self.step(self.tabs.len().saturating_sub(1));
    }

    fn step(&mut self, offset: usize) {
        if self.tabs.is_empty() {
            return;
        }
        let current = self.active.and_then(|id| self.position(id)).unwrap_or(0);
        let next = (current + offset) % self.tabs.len();
        self.active = Some(self.tabs[next].id);
    }

    /// All tabs in display order.
    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn get(&self, id: TabId) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.id == id)
    }

    fn get_mut(&mut self, id: TabId) -> Option<&mut Tab> {
        self.tabs.iter_mut().find(|t| t.id == id)
    }

    /// Index of a tab in display order.
    pub fn position(&self, id: TabId) -> Option<usize> {
        self.tabs.iter().position(|t| t.id == id)
    }

    pub fn active_id(&self) -> Option<TabId> {
        self.active
    }

    pub fn active(&self) -> Option<&Tab> {
        self.active.and_then(|id| self.get(id))
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }
}
