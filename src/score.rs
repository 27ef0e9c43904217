//! Score engine — derives the displayed health score from checklist state.
//!
//! Pure functions, no I/O, no hidden state. The displayed score is always
//! recomputed from scratch: the base score plus even completion credit for
//! every checked suggestion and task. Toggling an item off therefore
//! restores the exact score from before it was toggled on.
//!
//! Rounding is half-away-from-zero (`f64::round`), which matches the usual
//! "math" rounding for the positive values in play here.

use crate::models::HealthDocument;

/// Recompute the display score for a document.
///
/// Credit is apportioned evenly: with `base` points already earned and
/// `100 - base` available, each of the `total` checklist items is worth
/// `(100 - base) / total` points (real-valued, no early truncation).
///
/// A document with an absent or out-of-range base score cannot be safely
/// recomputed; the current display score is returned unchanged.
pub fn recalculate(doc: &HealthDocument) -> u8 {
    let base = match doc.base_score {
        Some(b) if b <= 100 => b,
        _ => return doc.display_score,
    };

    let completed = completed_items(doc);
    let total = total_items(doc);
    if total == 0 {
        return base;
    }

    let points_available = f64::from(100 - u16::from(base));
    let points_per_item = points_available / total as f64;
    let raw = f64::from(base) + completed as f64 * points_per_item;

    (raw.round() as u8).min(100)
}

/// Count of completed suggestions and tasks across the whole document.
pub fn completed_items(doc: &HealthDocument) -> usize {
    let suggestions = doc.suggestions.iter().filter(|s| s.completed).count();
    let tasks = doc
        .daily_plan
        .iter()
        .flat_map(|d| &d.tasks)
        .filter(|t| t.completed)
        .count();
    suggestions + tasks
}

/// Total count of suggestions and tasks across the whole document.
pub fn total_items(doc: &HealthDocument) -> usize {
    doc.suggestions.len() + doc.daily_plan.iter().map(|d| d.tasks.len()).sum::<usize>()
}
