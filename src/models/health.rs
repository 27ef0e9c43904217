//! Core health data model — one document per user.
//!
//! The document is a single JSON blob in the store: a base score assigned
//! at analysis time, a derived display score, and the completable checklist
//! (general suggestions plus the 14-day plan) the score is computed from.

use serde::{Deserialize, Serialize};

/// A single actionable suggestion on the general checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub text: String,
    pub completed: bool,
}

/// One task inside a day of the action plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanTask {
    pub text: String,
    pub completed: bool,
}

/// One day of the 14-day action plan.
///
/// `day` is unique within a plan. Storage order is not guaranteed sorted;
/// callers that render the plan should use [`HealthDocument::plan_sorted`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayPlan {
    pub day: u8,
    pub title: String,
    pub tasks: Vec<PlanTask>,
}

impl DayPlan {
    /// Fraction of this day's tasks that are completed, in [0, 1].
    pub fn progress(&self) -> f32 {
        if self.tasks.is_empty() {
            return 0.0;
        }
        let done = self.tasks.iter().filter(|t| t.completed).count();
        done as f32 / self.tasks.len() as f32
    }
}

/// The single persisted health document for a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthDocument {
    /// Analyzer-assigned score at creation, in [0, 100]. Immutable for the
    /// lifetime of the document. `None` only when deserializing a legacy
    /// row that predates the field — the score engine then preserves the
    /// last displayed score instead of recomputing.
    #[serde(default)]
    pub base_score: Option<u8>,
    /// Derived score shown to the user, in [0, 100]. Recomputed on every
    /// checklist mutation and persisted so reloads skip the recompute.
    pub display_score: u8,
    pub suggestions: Vec<Suggestion>,
    pub daily_plan: Vec<DayPlan>,
}

impl HealthDocument {
    /// Build a fresh document from an analyzer result: base and display
    /// score both set to the analyzer's score, all completion flags false.
    pub fn new(score: u8, suggestions: Vec<Suggestion>, daily_plan: Vec<DayPlan>) -> Self {
        let mut doc = Self {
            base_score: Some(score),
            display_score: score,
            suggestions,
            daily_plan,
        };
        for s in &mut doc.suggestions {
            s.completed = false;
        }
        for day in &mut doc.daily_plan {
            for t in &mut day.tasks {
                t.completed = false;
            }
        }
        doc
    }

    /// The plan in display order (ascending day number).
    pub fn plan_sorted(&self) -> Vec<DayPlan> {
        let mut plan = self.daily_plan.clone();
        plan.sort_by_key(|d| d.day);
        plan
    }
}
