use chrono::{DateTime, Utc};
use serde::Serialize;
use stackbot_evaluator::placement_evaluator::WeightVector;
use stackbot_training::{annealing::AnnealingParams, objective::ObjectiveParams};

/// Result of a `train` run, printed as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct TrainedModel {
    pub trained_at: DateTime<Utc>,
    pub best_score: f32,
    pub weights: WeightVector,
    pub iterations: usize,
    pub annealing: AnnealingParams,
    pub objective: ObjectiveParams,
}
