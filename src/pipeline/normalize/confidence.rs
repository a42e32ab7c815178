use crate::pipeline::extraction::types::Entity;

/// Confidence per top-level entity. A missing score counts as 0.0, which
/// the aggregate then drops.
pub fn entity_confidences(entities: &[Entity]) -> Vec<f32> {
    entities.iter().map(|e| e.confidence.unwrap_or(0.0)).collect()
}

/// Unweighted mean of the strictly positive scores.
/// `None` when no score is positive.
pub fn aggregate_confidence(scores: &[f32]) -> Option<f32> {
    let positive: Vec<f32> = scores.iter().copied().filter(|c| *c > 0.0).collect();
    if positive.is_empty() {
        return None;
    }
    Some(positive.iter().sum::<f32>() / positive.len() as f32)
}
