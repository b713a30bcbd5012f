//! Story sequence models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::highlight::HighlightCandidate;

/// Ordered highlights admitted into the final story.
///
/// Presentation order equals candidate order, not score order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StorySequence {
    /// Admitted segments in presentation order
    pub segments: Vec<HighlightCandidate>,
    /// Sum of effective segment durations (seconds)
    pub total_duration: f64,
    /// Budget the sequence was composed against (seconds)
    pub budget: f64,
}

impl StorySequence {
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// True when the only segment was admitted despite exceeding the budget.
    pub fn exceeds_budget(&self) -> bool {
        self.total_duration > self.budget
    }

    pub fn iter(&self) -> impl Iterator<Item = &HighlightCandidate> {
        self.segments.iter()
    }
}
