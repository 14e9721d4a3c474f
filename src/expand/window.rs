use crate::model::{RecurringItem, Schedule};
use chrono::NaiveDate;

/// Fenêtre effective `[start, end]` d'un élément récurrent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Window {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Window {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Résout `[startOn ?? termStart, endOn ?? (until ?? termEnd)]`.
/// `None` si l'une des deux bornes est irrésoluble.
pub(super) fn effective_window(schedule: &Schedule, item: &RecurringItem) -> Option<Window> {
    let start = item.start_on.or(schedule.term_start)?;
    let end = item
        .end_on
        .or_else(|| item.recurrence.until())
        .or(schedule.term_end)?;
    Some(Window { start, end })
}
