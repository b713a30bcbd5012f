//! Story composition under a duration budget.
//!
//! Greedy prefix selection: candidates are admitted in the order given until
//! the next one would overflow the budget, then composition stops. Later
//! short candidates are never pulled in past a long one.

use hilite_models::{HighlightCandidate, StorySequence};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Configuration for story composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoryConfig {
    /// Total duration budget (seconds).
    pub max_total_seconds: f64,
    /// Durations shorter than this are counted as this long.
    pub min_segment_seconds: f64,
}

impl Default for StoryConfig {
    fn default() -> Self {
        Self {
            max_total_seconds: 45.0,
            min_segment_seconds: 0.3,
        }
    }
}

impl StoryConfig {
    /// Builder-style setter for the budget.
    pub fn with_budget(mut self, seconds: f64) -> Self {
        self.max_total_seconds = seconds;
        self
    }
}

/// Compose an ordered story from `candidates`.
///
/// The result is never empty when `candidates` is non-empty: if even the
/// first candidate exceeds the budget it is returned alone.
pub fn compose_story(candidates: &[HighlightCandidate], config: &StoryConfig) -> StorySequence {
    let budget = config.max_total_seconds;
    let mut segments = Vec::new();
    let mut total = 0.0;

    for (i, candidate) in candidates.iter().enumerate() {
        let duration = candidate.effective_duration(config.min_segment_seconds);
        if total + duration > budget {
            debug!(
                index = i,
                running = total,
                duration,
                budget,
                "Budget reached, stopping composition"
            );
            break;
        }
        segments.push(*candidate);
        total += duration;
    }

    if segments.is_empty() {
        if let Some(first) = candidates.first() {
            debug!(
                duration = first.duration(),
                budget,
                "First candidate exceeds budget, keeping it alone"
            );
            segments.push(*first);
            total = first.effective_duration(config.min_segment_seconds);
        }
    }

    info!(
        candidates = candidates.len(),
        segments = segments.len(),
        total_seconds = format!("{:.2}", total),
        "Composed story sequence"
    );

    StorySequence {
        segments,
        total_duration: total,
        budget,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hilite_models::Mood;

    fn h(start: f64, end: f64) -> HighlightCandidate {
        HighlightCandidate::new(start, end, 0.5, Mood::Energetic).unwrap()
    }

    fn spans(story: &StorySequence) -> Vec<(f64, f64)> {
        story.iter().map(|s| (s.start, s.end)).collect()
    }

    #[test]
    fn test_stops_at_budget_boundary() {
        // 10 fits; 10 + 40 = 50 > 45 stops before the second element.
        let candidates = [h(0.0, 10.0), h(10.0, 50.0), h(50.0, 60.0)];
        let story = compose_story(&candidates, &StoryConfig::default());
        assert_eq!(spans(&story), vec![(0.0, 10.0)]);
        assert_eq!(story.total_duration, 10.0);
    }

    #[test]
    fn test_prefix_not_subset() {
        // The third candidate would fit on its own but comes after the stop.
        let candidates = [h(0.0, 20.0), h(20.0, 60.0), h(60.0, 65.0)];
        let story = compose_story(&candidates, &StoryConfig::default());
        assert_eq!(spans(&story), vec![(0.0, 20.0)]);
    }

    #[test]
    fn test_exact_fit_is_admitted() {
        let candidates = [h(0.0, 15.0), h(15.0, 45.0)];
        let story = compose_story(&candidates, &StoryConfig::default());
        assert_eq!(story.len(), 2);
        assert_eq!(story.total_duration, 45.0);
        assert!(!story.exceeds_budget());
    }

    #[test]
    fn test_never_empty_for_oversized_first() {
        let candidates = [h(0.0, 100.0)];
        let story = compose_story(&candidates, &StoryConfig::default().with_budget(10.0));
        assert_eq!(spans(&story), vec![(0.0, 100.0)]);
        assert!(story.exceeds_budget());

        let candidates = [h(0.0, 100.0), h(100.0, 101.0)];
        let story = compose_story(&candidates, &StoryConfig::default().with_budget(10.0));
        assert_eq!(spans(&story), vec![(0.0, 100.0)]);
    }

    #[test]
    fn test_empty_input() {
        let story = compose_story(&[], &StoryConfig::default());
        assert!(story.is_empty());
        assert_eq!(story.total_duration, 0.0);
    }

    #[test]
    fn test_short_segments_count_minimum() {
        let candidates = [h(0.0, 0.1), h(1.0, 1.1), h(2.0, 2.1)];
        let story = compose_story(&candidates, &StoryConfig::default().with_budget(0.7));
        assert_eq!(story.len(), 2);
        assert!((story.total_duration - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_order_preserved() {
        let mut low = h(30.0, 35.0);
        low.score = 0.1;
        let mut high = h(0.0, 5.0);
        high.score = 0.9;
        let story = compose_story(&[low, high], &StoryConfig::default());
        assert_eq!(spans(&story), vec![(30.0, 35.0), (0.0, 5.0)]);
    }
}
