//! Derived column views.
//!
//! # Responsibility
//! - Filter, sort and group tasks into per-status columns.
//! - Render creation timestamps for display.
//! - Reorder a rendered column locally.
//!
//! # Invariants
//! - Views are recomputed from the collection; building one never mutates it.
//! - Sorting is stable: equal `created_at` keeps collection order.
//! - Reordering a view never touches the collection or the remote store.

use crate::model::task::{SortMode, Task, TaskStatus};
use chrono::{DateTime, FixedOffset, Utc};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Day/month/year, 12-hour clock with lowercase meridiem.
const DISPLAY_FORMAT: &str = "%-d/%-m/%Y, %-I:%M:%S %P";

/// One rendered card: the stored record plus its display timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnEntry {
    pub task: Task,
    /// `created_at` in the board's display offset. Presentation only.
    pub created_display: String,
}

/// Ordered cards of one status column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnView {
    pub status: TaskStatus,
    pub entries: Vec<ColumnEntry>,
}

/// Reorder indices that do not address a card in the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexOutOfRange {
    pub index: usize,
    pub len: usize,
}

impl Display for IndexOutOfRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "index {} out of range for column of {}", self.index, self.len)
    }
}

impl Error for IndexOutOfRange {}

impl ColumnView {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Task ids in render order.
    pub fn ids(&self) -> Vec<&str> {
        self.entries
            .iter()
            .map(|entry| entry.task.id.as_str())
            .collect()
    }

    /// Moves the card at `source` so it lands at `target`.
    ///
    /// Cards between the two positions shift by one. Equal indices are a
    /// no-op; out-of-range indices leave the view unchanged.
    pub fn reorder(&mut self, source: usize, target: usize) -> Result<(), IndexOutOfRange> {
        let len = self.entries.len();
        for index in [source, target] {
            if index >= len {
                return Err(IndexOutOfRange { index, len });
            }
        }
        if source == target {
            return Ok(());
        }
        let entry = self.entries.remove(source);
        self.entries.insert(target, entry);
        Ok(())
    }
}

/// True when `title` contains `term`, ignoring case.
pub fn title_matches(title: &str, term: &str) -> bool {
    term.is_empty() || title.to_lowercase().contains(&term.to_lowercase())
}

/// Builds one column from `tasks`.
///
/// Keeps tasks with `status` whose title contains `search_term`
/// (case-insensitive), then orders them by `created_at` per `sort`.
pub fn column_view(
    tasks: &[Task],
    status: TaskStatus,
    search_term: &str,
    sort: SortMode,
    display_offset: FixedOffset,
) -> ColumnView {
    let mut matching: Vec<&Task> = tasks
        .iter()
        .filter(|task| task.status == status && title_matches(&task.title, search_term))
        .collect();

    match sort {
        SortMode::Recent => matching.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortMode::Oldest => matching.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
    }

    let entries = matching
        .into_iter()
        .map(|task| ColumnEntry {
            created_display: format_created_at(task.created_at, display_offset),
            task: task.clone(),
        })
        .collect();

    ColumnView { status, entries }
}

/// Renders `instant` in `offset`, e.g. `19/10/2026, 2:30:00 pm`.
pub fn format_created_at(instant: DateTime<Utc>, offset: FixedOffset) -> String {
    instant
        .with_timezone(&offset)
        .format(DISPLAY_FORMAT)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::{format_created_at, title_matches};
    use crate::config::default_display_offset;
    use chrono::{FixedOffset, TimeZone, Utc};

    #[test]
    fn timestamps_render_in_display_offset() {
        let instant = Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 5).unwrap();
        assert_eq!(
            format_created_at(instant, default_display_offset()),
            "19/10/2026, 2:30:05 pm"
        );

        let utc = FixedOffset::east_opt(0).unwrap();
        assert_eq!(format_created_at(instant, utc), "19/10/2026, 9:00:05 am");
    }

    #[test]
    fn display_offset_can_cross_midnight() {
        let instant = Utc.with_ymd_and_hms(2026, 1, 4, 20, 15, 0).unwrap();
        assert_eq!(
            format_created_at(instant, default_display_offset()),
            "5/1/2026, 1:45:00 am"
        );
    }

    #[test]
    fn title_match_ignores_case() {
        assert!(title_matches("Write Release Notes", "release"));
        assert!(title_matches("anything", ""));
        assert!(!title_matches("Write Release Notes", "deploy"));
    }
}
