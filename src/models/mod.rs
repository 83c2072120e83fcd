// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    records_for, CompletionRecord, CompletionRecords, Matching, PreferenceList, Preferences,
    Problem, Side,
};
pub use requests::{SolveOptions, SolveRequest, TextSolveRequest};
pub use responses::{ErrorResponse, HealthResponse, MatchPair, SolveResponse};
