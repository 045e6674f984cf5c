use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Exported summary of the best individual at the end of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BestModel {
    pub objective: String,
    pub finished_at: DateTime<Utc>,
    pub trials: usize,
    pub fitness: f64,
    pub fitness_samples: usize,
    pub mutation_rate: f64,
    pub genome: Vec<f64>,
}
