// Core algorithm exports
pub mod blacklist;
pub mod completion;
pub mod engine;
pub mod hungarian;
pub mod matcher;
pub mod scoring;
pub mod search;

pub use blacklist::Blacklist;
pub use completion::{complete, complete_side, CompletedSide};
pub use engine::{blocking_pairs, is_stable, MatchingEngine};
pub use matcher::Matcher;
pub use scoring::{Better, PersonScore, ScoreBreakdown, Scorer, ScorerKind, SideScore, Warper};
pub use search::{trial_rng, Method, SearchConfig, SearchOutcome, TrialResult, TrialSearch};
