//! Relevance score to distance conversion.
//!
//! Keyword hits are reported as distances so they line up with visual
//! similarity searchers, where lower means closer.

/// Distance assigned to hits whose score cannot be inverted.
pub const MAX_DISTANCE: f32 = f32::MAX;

/// Inverts a relevance score. Zero, negative and non-finite scores map to
/// [`MAX_DISTANCE`] so the result is always finite and non-negative.
pub fn score_to_distance(score: f32) -> f32 {
    if !score.is_finite() || score <= 0.0 {
        return MAX_DISTANCE;
    }
    let d = 1.0 / score;
    if d.is_finite() { d } else { MAX_DISTANCE }
}
