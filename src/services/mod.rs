// Service exports
pub mod cache;
pub mod prefs_file;

pub use cache::{CacheError, CacheKey, CacheStats, ResultCache};
pub use prefs_file::{parse_blacklist, parse_preferences, read_blacklist, read_preferences};
