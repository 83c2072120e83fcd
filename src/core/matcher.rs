use crate::core::hungarian;
use crate::core::search::{Method, SearchConfig, SearchOutcome, TrialSearch};
use crate::error::MatchResult;
use crate::models::Problem;

/// Main matching orchestrator - dispatches a problem to the configured method
///
/// # Methods
/// 1. `smp`: randomized completion, blacklist filtering, deferred acceptance and scoring,
///    repeated over independent trials, keeping the best-scoring matching
/// 2. `hungarian`: one maximum-satisfaction assignment over the stated lists
#[derive(Debug, Clone)]
pub struct Matcher {
    defaults: SearchConfig,
}

impl Matcher {
    pub fn new(defaults: SearchConfig) -> Self {
        Self { defaults }
    }

    pub fn with_default_config() -> Self {
        Self {
            defaults: SearchConfig::default(),
        }
    }

    /// Settings applied when a request leaves an option out
    pub fn defaults(&self) -> &SearchConfig {
        &self.defaults
    }

    /// Solve with the default configuration
    pub fn solve_default(&self, problem: &Problem) -> MatchResult<SearchOutcome> {
        self.solve(problem, &self.defaults)
    }

    /// Find the best matching for `problem` under `config`
    ///
    /// # Returns
    /// The selected matching, its score breakdown and the run's trial accounting
    pub fn solve(&self, problem: &Problem, config: &SearchConfig) -> MatchResult<SearchOutcome> {
        config.validate()?;

        tracing::debug!(
            "Solving {}x{} problem with {} ({} blacklisted pairs)",
            problem.size(),
            problem.size(),
            config.method,
            problem.blacklist().len()
        );

        match config.method {
            Method::Smp => TrialSearch::new(config.clone())?.run(problem),
            Method::Hungarian => hungarian::solve(problem, config),
        }
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_config()
    }
}
