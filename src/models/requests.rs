use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::{Blacklist, SearchConfig};
use crate::error::InputError;
use crate::models::domain::{Preferences, Problem};

/// Per-request overrides of the configured search defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SolveOptions {
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub scorer: Option<String>,
    #[serde(default)]
    pub warper: Option<String>,
    #[validate(range(min = 0.0, max = 1.0))]
    #[serde(default)]
    pub weight: Option<f64>,
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub boost: Option<f64>,
    #[validate(range(min = 1))]
    #[serde(default, alias = "n")]
    pub trials: Option<usize>,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub proposing_side: Option<String>,
}

impl SolveOptions {
    /// Lay these options over `defaults`, parsing the strategy names
    pub fn apply(&self, defaults: &SearchConfig) -> Result<SearchConfig, InputError> {
        let mut config = defaults.clone();

        if let Some(method) = &self.method {
            config.method = method.parse()?;
        }
        if let Some(scorer) = &self.scorer {
            config.scorer = scorer.parse()?;
        }
        if let Some(warper) = &self.warper {
            config.warper = warper.parse()?;
        }
        if let Some(side) = &self.proposing_side {
            config.proposing_side = side.parse()?;
        }
        if let Some(weight) = self.weight {
            config.weight = weight;
        }
        if let Some(boost) = self.boost {
            config.boost = boost;
        }
        if let Some(trials) = self.trials {
            config.trials = trials;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Request to solve a matching problem given as JSON preference maps
///
/// ```json
/// {
///   "women": { "A": ["X", "Y"], "B": [] },
///   "men":   { "X": ["B"], "Y": [] },
///   "blacklist": [["A", "X"]],
///   "scorer": "real-match-count",
///   "trials": 500,
///   "seed": 42
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SolveRequest {
    #[validate(length(min = 1))]
    pub women: Preferences,
    #[validate(length(min = 1))]
    pub men: Preferences,
    #[serde(default)]
    pub blacklist: Vec<(String, String)>,
    #[serde(flatten)]
    #[validate(nested)]
    pub options: SolveOptions,
}

impl SolveRequest {
    pub fn into_problem(self) -> Result<(Problem, SolveOptions), InputError> {
        let blacklist = Blacklist::from_pairs(self.blacklist);
        let problem = Problem::new(self.women, self.men, blacklist)?;
        Ok((problem, self.options))
    }
}

/// Request to solve a problem given in the `name:c1,c2,...` line format
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TextSolveRequest {
    #[validate(length(min = 1))]
    pub women_prefs: String,
    #[validate(length(min = 1))]
    pub men_prefs: String,
    /// One `woman,man` pair per line
    #[serde(default)]
    pub blacklist: String,
    #[serde(flatten)]
    #[validate(nested)]
    pub options: SolveOptions,
}
