use std::collections::{BTreeMap, BTreeSet};

use crate::error::{MatchError, MatchResult};
use crate::models::Preferences;

/// Pairs of people who must never be matched with each other.
///
/// Pairs are unordered: `(woman, man)` and `(man, woman)` forbid the same match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blacklist {
    pairs: BTreeSet<(String, String)>,
    forbidden: BTreeMap<String, BTreeSet<String>>,
}

impl Blacklist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, A, B>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (A, B)>,
        A: Into<String>,
        B: Into<String>,
    {
        let mut blacklist = Self::new();
        for (a, b) in pairs {
            blacklist.insert(a, b);
        }
        blacklist
    }

    pub fn insert(&mut self, a: impl Into<String>, b: impl Into<String>) {
        let (a, b) = (a.into(), b.into());
        self.forbidden.entry(a.clone()).or_default().insert(b.clone());
        self.forbidden.entry(b.clone()).or_default().insert(a.clone());
        self.pairs.insert((a, b));
    }

    /// Whether `a` and `b` may not be matched, in either order
    #[inline]
    pub fn forbids(&self, a: &str, b: &str) -> bool {
        self.forbidden
            .get(a)
            .is_some_and(|partners| partners.contains(b))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(a, b)| (a.as_str(), b.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Strip every forbidden partner from every list, keeping the remaining order.
    ///
    /// Fails with [`MatchError::Infeasible`] naming the first person left with nobody to rank.
    pub fn filter(&self, mut lists: Preferences) -> MatchResult<Preferences> {
        if self.is_empty() {
            return Ok(lists);
        }

        for (person, list) in lists.iter_mut() {
            let Some(forbidden) = self.forbidden.get(person) else {
                continue;
            };
            list.retain(|candidate| !forbidden.contains(candidate));
            if list.is_empty() {
                tracing::debug!("Blacklist leaves {} with no acceptable partner", person);
                return Err(MatchError::Infeasible {
                    person: person.clone(),
                });
            }
        }

        Ok(lists)
    }
}
