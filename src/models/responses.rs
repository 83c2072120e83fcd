use serde::{Deserialize, Serialize};

use crate::core::{Better, Method, ScoreBreakdown, ScorerKind, SearchOutcome};

/// One matched couple
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchPair {
    pub woman: String,
    pub man: String,
}

/// Response for the solve endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveResponse {
    pub run_id: String,
    pub method: Method,
    pub scorer: ScorerKind,
    pub better: Better,
    pub matches: Vec<MatchPair>,
    pub score: f64,
    pub best_trial: Option<usize>,
    pub trials_attempted: usize,
    pub trials_discarded: usize,
    pub seed: Option<u64>,
    #[serde(default)]
    pub cached: bool,
    pub breakdown: ScoreBreakdown,
}

impl From<SearchOutcome> for SolveResponse {
    fn from(outcome: SearchOutcome) -> Self {
        let matches = outcome
            .matching
            .pairs()
            .map(|(woman, man)| MatchPair {
                woman: woman.to_string(),
                man: man.to_string(),
            })
            .collect();

        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            method: outcome.method,
            scorer: outcome.scorer,
            better: outcome.better,
            matches,
            score: outcome.score.value,
            best_trial: outcome.best_trial,
            trials_attempted: outcome.trials_attempted,
            trials_discarded: outcome.trials_discarded,
            seed: outcome.seed,
            cached: false,
            breakdown: outcome.score,
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
