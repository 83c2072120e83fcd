//! Lume SMP - stable matching over partial preference lists
//!
//! Incomplete preference lists are completed at random, blacklisted pairs are removed and
//! deferred acceptance produces a stable matching. Many independent trials are scored and
//! the best matching is kept, so the result favours people's stated preferences while staying
//! reproducible from a single seed.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{Blacklist, Matcher, MatchingEngine, ScorerKind, SearchConfig, SearchOutcome, Warper};
pub use crate::error::{InputError, MatchError, MatchResult};
pub use crate::models::{Matching, Preferences, Problem, Side, SolveRequest, SolveResponse};
