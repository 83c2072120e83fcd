use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeSet;

use crate::error::InputError;
use crate::models::{CompletionRecord, CompletionRecords, PreferenceList, Preferences};

/// Every list of one side, completed, plus where each one's stated part ends
#[derive(Debug, Clone, Default)]
pub struct CompletedSide {
    pub lists: Preferences,
    pub records: CompletionRecords,
}

/// Complete one partial list into a total order over `universe`.
///
/// The stated entries keep their order; everyone else in `universe` is appended in a
/// uniformly random order drawn from `rng`. The returned record's split is the length of
/// the stated part.
pub fn complete<R: Rng + ?Sized>(
    person: &str,
    partial: &[String],
    universe: &BTreeSet<String>,
    rng: &mut R,
) -> Result<(PreferenceList, CompletionRecord), InputError> {
    let mut stated = BTreeSet::new();
    for candidate in partial {
        if !universe.contains(candidate) {
            return Err(InputError::UnknownCandidate {
                person: person.to_string(),
                candidate: candidate.clone(),
            });
        }
        if !stated.insert(candidate.as_str()) {
            return Err(InputError::DuplicateEntry {
                person: person.to_string(),
                candidate: candidate.clone(),
            });
        }
    }

    // Universe iteration order is sorted, so the shuffle input is reproducible
    let mut remainder: Vec<String> = universe
        .iter()
        .filter(|candidate| !stated.contains(candidate.as_str()))
        .cloned()
        .collect();
    remainder.shuffle(rng);

    let mut completed = Vec::with_capacity(universe.len());
    completed.extend_from_slice(partial);
    completed.extend(remainder);

    Ok((completed, CompletionRecord { split: partial.len() }))
}

/// Complete every list on one side independently, in person order.
pub fn complete_side<R: Rng + ?Sized>(
    prefs: &Preferences,
    universe: &BTreeSet<String>,
    rng: &mut R,
) -> Result<CompletedSide, InputError> {
    let mut side = CompletedSide::default();
    for (person, partial) in prefs {
        let (list, record) = complete(person, partial, universe, rng)?;
        side.lists.insert(person.clone(), list);
        side.records.insert(person.clone(), record);
    }
    Ok(side)
}
