use thiserror::Error;

/// Malformed preferences, blacklist or configuration.
///
/// Always fatal for the whole run and detected before the first trial starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("{person} lists {candidate} more than once")]
    DuplicateEntry { person: String, candidate: String },

    #[error("{person} lists unknown candidate {candidate}")]
    UnknownCandidate { person: String, candidate: String },

    #[error("number of women ({women}) != number of men ({men})")]
    UnequalSides { women: usize, men: usize },

    #[error("at least one person is required on each side")]
    EmptySide,

    #[error("{0} people per side exceeds the configured limit of {1}")]
    TooManyPeople(usize, usize),

    #[error("{0} appears on both sides")]
    AmbiguousPerson(String),

    #[error("unknown scorer '{0}' (expected one of: egalitarian-sum, egalitarian-max, real-match-count, weighted-composite, one-zero, frac)")]
    UnknownScorer(String),

    #[error("unknown warper '{0}' (expected one of: identity, logarithmic, exponential)")]
    UnknownWarper(String),

    #[error("unknown method '{0}' (expected one of: smp, hungarian)")]
    UnknownMethod(String),

    #[error("unknown side '{0}' (expected one of: women, men)")]
    UnknownSide(String),

    #[error("weight {0} is outside [0, 1]")]
    WeightOutOfRange(f64),

    #[error("boost {0} must be a finite, non-negative number")]
    InvalidBoost(f64),

    #[error("trial count must be between 1 and {max}, got {requested}")]
    InvalidTrialCount { requested: usize, max: usize },

    #[error("blacklist names {0}, who is not a known woman or man")]
    BlacklistUnknownPerson(String),

    #[error("blacklist pair ({0}, {1}) must name one woman and one man")]
    BlacklistSameSide(String, String),

    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },
}

/// Errors surfaced by the matching core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchError {
    #[error("invalid input: {0}")]
    Input(#[from] InputError),

    /// A single trial could not produce a full matching. Never escapes the trial search.
    #[error("{person} exhausted every acceptable partner")]
    Infeasible { person: String },

    #[error("no feasible matching in {attempted} trials; remove entries from the blacklist and try again")]
    NoFeasibleMatching { attempted: usize },
}

pub type MatchResult<T> = Result<T, MatchError>;
