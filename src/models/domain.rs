use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use crate::core::blacklist::Blacklist;
use crate::error::InputError;

/// One person's ranked choices, best first
pub type PreferenceList = Vec<String>;

/// Preference lists keyed by person. Ordered so every pass over it is reproducible.
pub type Preferences = BTreeMap<String, PreferenceList>;

/// Which of the two groups a person belongs to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    #[default]
    Women,
    Men,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Women => Side::Men,
            Side::Men => Side::Women,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Side::Women => "women",
            Side::Men => "men",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Side {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "women" | "woman" | "w" => Ok(Side::Women),
            "men" | "man" | "m" => Ok(Side::Men),
            other => Err(InputError::UnknownSide(other.to_string())),
        }
    }
}

/// Where a person's stated choices end and the randomly appended ones begin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub split: usize,
}

impl CompletionRecord {
    /// Whether position `index` (0-based) of the completed list was stated by the person
    #[inline]
    pub fn is_real(&self, index: usize) -> bool {
        index < self.split
    }
}

pub type CompletionRecords = BTreeMap<String, CompletionRecord>;

/// Records for lists that were never completed: everything in them is real.
pub fn records_for(prefs: &Preferences) -> CompletionRecords {
    prefs
        .iter()
        .map(|(person, list)| (person.clone(), CompletionRecord { split: list.len() }))
        .collect()
}

/// A bijection between the women and the men
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Matching {
    women_to_men: BTreeMap<String, String>,
    men_to_women: BTreeMap<String, String>,
}

impl Matching {
    pub fn from_pairs<I, W, M>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (W, M)>,
        W: Into<String>,
        M: Into<String>,
    {
        let mut matching = Matching::default();
        for (woman, man) in pairs {
            let (woman, man) = (woman.into(), man.into());
            matching.men_to_women.insert(man.clone(), woman.clone());
            matching.women_to_men.insert(woman, man);
        }
        matching
    }

    pub fn partner_of_woman(&self, woman: &str) -> Option<&str> {
        self.women_to_men.get(woman).map(String::as_str)
    }

    pub fn partner_of_man(&self, man: &str) -> Option<&str> {
        self.men_to_women.get(man).map(String::as_str)
    }

    pub fn partner(&self, side: Side, person: &str) -> Option<&str> {
        match side {
            Side::Women => self.partner_of_woman(person),
            Side::Men => self.partner_of_man(person),
        }
    }

    pub fn contains_pair(&self, woman: &str, man: &str) -> bool {
        self.partner_of_woman(woman) == Some(man)
    }

    /// (woman, man) pairs ordered by woman
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.women_to_men
            .iter()
            .map(|(w, m)| (w.as_str(), m.as_str()))
    }

    pub fn women_to_men(&self) -> &BTreeMap<String, String> {
        &self.women_to_men
    }

    pub fn men_to_women(&self) -> &BTreeMap<String, String> {
        &self.men_to_women
    }

    pub fn len(&self) -> usize {
        self.women_to_men.len()
    }

    pub fn is_empty(&self) -> bool {
        self.women_to_men.is_empty()
    }

    /// Every woman and every man appears exactly once
    pub fn is_bijection(&self, women: &BTreeSet<String>, men: &BTreeSet<String>) -> bool {
        self.women_to_men.len() == self.men_to_women.len()
            && self.women_to_men.keys().eq(women.iter())
            && self.men_to_women.keys().eq(men.iter())
    }
}

/// A validated matching instance: both sides' partial lists plus the blacklist
#[derive(Debug, Clone)]
pub struct Problem {
    women: Preferences,
    men: Preferences,
    women_ids: BTreeSet<String>,
    men_ids: BTreeSet<String>,
    blacklist: Blacklist,
}

impl Problem {
    /// Validate the inputs: equal non-empty sides, disjoint names, no duplicate or unknown
    /// entries in any list, and a blacklist that only names known people.
    pub fn new(women: Preferences, men: Preferences, blacklist: Blacklist) -> Result<Self, InputError> {
        if women.is_empty() || men.is_empty() {
            return Err(InputError::EmptySide);
        }
        if women.len() != men.len() {
            return Err(InputError::UnequalSides {
                women: women.len(),
                men: men.len(),
            });
        }

        let women_ids: BTreeSet<String> = women.keys().cloned().collect();
        let men_ids: BTreeSet<String> = men.keys().cloned().collect();

        if let Some(both) = women_ids.intersection(&men_ids).next() {
            return Err(InputError::AmbiguousPerson(both.clone()));
        }

        validate_lists(&women, &men_ids)?;
        validate_lists(&men, &women_ids)?;

        for (a, b) in blacklist.iter() {
            for person in [a, b] {
                if !women_ids.contains(person) && !men_ids.contains(person) {
                    return Err(InputError::BlacklistUnknownPerson(person.to_string()));
                }
            }
            if women_ids.contains(a) == women_ids.contains(b) {
                return Err(InputError::BlacklistSameSide(a.to_string(), b.to_string()));
            }
        }

        Ok(Self {
            women,
            men,
            women_ids,
            men_ids,
            blacklist,
        })
    }

    pub fn size(&self) -> usize {
        self.women.len()
    }

    pub fn prefs(&self, side: Side) -> &Preferences {
        match side {
            Side::Women => &self.women,
            Side::Men => &self.men,
        }
    }

    pub fn women(&self) -> &Preferences {
        &self.women
    }

    pub fn men(&self) -> &Preferences {
        &self.men
    }

    /// The names on one side
    pub fn ids(&self, side: Side) -> &BTreeSet<String> {
        match side {
            Side::Women => &self.women_ids,
            Side::Men => &self.men_ids,
        }
    }

    pub fn blacklist(&self) -> &Blacklist {
        &self.blacklist
    }

    /// Whether every stated list already ranks the whole opposite side
    pub fn is_complete(&self) -> bool {
        let n = self.size();
        self.women.values().chain(self.men.values()).all(|l| l.len() == n)
    }
}

fn validate_lists(prefs: &Preferences, universe: &BTreeSet<String>) -> Result<(), InputError> {
    for (person, list) in prefs {
        let mut seen = BTreeSet::new();
        for candidate in list {
            if !universe.contains(candidate) {
                return Err(InputError::UnknownCandidate {
                    person: person.clone(),
                    candidate: candidate.clone(),
                });
            }
            if !seen.insert(candidate.as_str()) {
                return Err(InputError::DuplicateEntry {
                    person: person.clone(),
                    candidate: candidate.clone(),
                });
            }
        }
    }
    Ok(())
}
