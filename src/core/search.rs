use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

use crate::core::completion::complete_side;
use crate::core::engine::MatchingEngine;
use crate::core::scoring::{Better, ScoreBreakdown, Scorer, ScorerKind, Warper};
use crate::error::{InputError, MatchError, MatchResult};
use crate::models::{Matching, Problem, Side};

/// Default hard ceiling on trials per run
pub const DEFAULT_MAX_TRIALS: usize = 100_000;

/// How a matching is produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// Randomized completion + deferred acceptance, best of n trials
    #[default]
    Smp,
    /// Maximum-satisfaction assignment over the stated lists
    Hungarian,
}

impl Method {
    pub fn name(self) -> &'static str {
        match self {
            Method::Smp => "smp",
            Method::Hungarian => "hungarian",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Method {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "smp" => Ok(Method::Smp),
            "hungarian" => Ok(Method::Hungarian),
            other => Err(InputError::UnknownMethod(other.to_string())),
        }
    }
}

/// Everything that parameterizes one run
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    pub method: Method,
    pub scorer: ScorerKind,
    pub warper: Warper,
    /// Share of the women's side in composite scores, in [0, 1]
    pub weight: f64,
    pub boost: f64,
    pub trials: usize,
    pub max_trials: usize,
    /// Fixed seed for a reproducible run; drawn from OS entropy when absent
    pub seed: Option<u64>,
    /// Spread trials over the rayon pool. Results are identical either way.
    pub parallel: bool,
    pub proposing_side: Side,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            method: Method::Smp,
            scorer: ScorerKind::RealMatchCount,
            warper: Warper::Identity,
            weight: 0.5,
            boost: 0.0,
            trials: 1000,
            max_trials: DEFAULT_MAX_TRIALS,
            seed: None,
            parallel: false,
            proposing_side: Side::Women,
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<(), InputError> {
        if !(0.0..=1.0).contains(&self.weight) {
            return Err(InputError::WeightOutOfRange(self.weight));
        }
        if !self.boost.is_finite() || self.boost < 0.0 {
            return Err(InputError::InvalidBoost(self.boost));
        }
        if self.trials == 0 || self.trials > self.max_trials {
            return Err(InputError::InvalidTrialCount {
                requested: self.trials,
                max: self.max_trials,
            });
        }
        Ok(())
    }

    pub fn scorer(&self) -> Scorer {
        Scorer::new(self.scorer, self.warper, self.weight, self.boost)
    }
}

/// The independent random stream for one trial of a seeded run.
///
/// Every trial reads its own ChaCha stream of the same key, so trial `i` draws the same
/// completions whatever `n` is and whichever thread runs it.
pub fn trial_rng(seed: u64, trial: usize) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(trial as u64);
    rng
}

/// One trial's matching and how it scored
#[derive(Debug, Clone)]
pub struct TrialResult {
    pub trial: usize,
    pub matching: Matching,
    pub score: ScoreBreakdown,
}

/// The selected matching plus what it took to find it
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub method: Method,
    pub scorer: ScorerKind,
    pub better: Better,
    pub matching: Matching,
    pub score: ScoreBreakdown,
    /// Index of the winning trial; `None` for deterministic methods
    pub best_trial: Option<usize>,
    pub trials_attempted: usize,
    pub trials_discarded: usize,
    /// Seed that reproduces this run
    pub seed: Option<u64>,
}

/// Best result so far plus the number of infeasible trials skipped
#[derive(Debug, Default)]
struct Tally {
    best: Option<TrialResult>,
    discarded: usize,
}

impl Tally {
    fn absorb(mut self, result: MatchResult<TrialResult>, better: Better) -> MatchResult<Self> {
        match result {
            Ok(trial) => {
                self.best = Some(match self.best.take() {
                    Some(incumbent) => pick(incumbent, trial, better),
                    None => trial,
                });
            }
            Err(MatchError::Infeasible { person }) => {
                debug!("Discarding infeasible trial: {} has no partner left", person);
                self.discarded += 1;
            }
            Err(e) => return Err(e),
        }
        Ok(self)
    }

    fn merge(self, other: Tally, better: Better) -> Tally {
        let best = match (self.best, other.best) {
            (Some(a), Some(b)) => Some(pick(a, b, better)),
            (a, b) => a.or(b),
        };
        Tally {
            best,
            discarded: self.discarded + other.discarded,
        }
    }
}

/// The better of two results; equal scores keep the earlier trial
fn pick(a: TrialResult, b: TrialResult, better: Better) -> TrialResult {
    match better.compare(a.score.value, b.score.value) {
        Ordering::Greater => a,
        Ordering::Less => b,
        Ordering::Equal if a.trial <= b.trial => a,
        Ordering::Equal => b,
    }
}

/// Best-of-n search over independently completed preference lists
#[derive(Debug, Clone)]
pub struct TrialSearch {
    config: SearchConfig,
    scorer: Scorer,
    engine: MatchingEngine,
}

impl TrialSearch {
    pub fn new(config: SearchConfig) -> Result<Self, InputError> {
        config.validate()?;
        Ok(Self {
            scorer: config.scorer(),
            engine: MatchingEngine::new(config.proposing_side),
            config,
        })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Complete, filter, match and score once with trial `trial`'s random stream
    pub fn run_trial(&self, problem: &Problem, seed: u64, trial: usize) -> MatchResult<TrialResult> {
        let mut rng = trial_rng(seed, trial);

        let women = complete_side(problem.women(), problem.ids(Side::Men), &mut rng)?;
        let men = complete_side(problem.men(), problem.ids(Side::Women), &mut rng)?;

        let women_lists = problem.blacklist().filter(women.lists)?;
        let men_lists = problem.blacklist().filter(men.lists)?;

        let matching = self.engine.run(&women_lists, &men_lists)?;
        let score = self.scorer.score(
            &matching,
            problem.women(),
            problem.men(),
            &women.records,
            &men.records,
        );

        Ok(TrialResult {
            trial,
            matching,
            score,
        })
    }

    /// The run's trials in index order, produced on demand
    pub fn trials<'a>(
        &'a self,
        problem: &'a Problem,
        seed: u64,
    ) -> impl Iterator<Item = MatchResult<TrialResult>> + 'a {
        (0..self.config.trials).map(move |trial| self.run_trial(problem, seed, trial))
    }

    /// Run every trial and keep the best-scoring feasible one.
    ///
    /// Infeasible trials count toward `trials` and are skipped; if all of them are
    /// infeasible the run fails with [`MatchError::NoFeasibleMatching`].
    pub fn run(&self, problem: &Problem) -> MatchResult<SearchOutcome> {
        let seed = self.config.seed.unwrap_or_else(|| rand::rng().random());
        let n = self.config.trials;
        let better = self.scorer.better();

        let span = tracing::info_span!(
            "trial_search",
            trials = n,
            scorer = %self.config.scorer,
            warper = %self.config.warper,
            seed
        );
        let _guard = span.enter();

        let tally = if self.config.parallel {
            (0..n)
                .into_par_iter()
                .map(|trial| self.run_trial(problem, seed, trial))
                .try_fold(Tally::default, |tally, result| tally.absorb(result, better))
                .try_reduce(Tally::default, |a, b| Ok(a.merge(b, better)))?
        } else {
            self.trials(problem, seed)
                .try_fold(Tally::default(), |tally, result| tally.absorb(result, better))?
        };

        let Some(best) = tally.best else {
            return Err(MatchError::NoFeasibleMatching { attempted: n });
        };

        info!(
            "Best of {} trials: trial {} scored {:.4} ({} discarded as infeasible)",
            n, best.trial, best.score.value, tally.discarded
        );

        Ok(SearchOutcome {
            method: Method::Smp,
            scorer: self.config.scorer,
            better,
            matching: best.matching,
            score: best.score,
            best_trial: Some(best.trial),
            trials_attempted: n,
            trials_discarded: tally.discarded,
            seed: Some(seed),
        })
    }
}
