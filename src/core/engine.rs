use std::collections::{HashMap, VecDeque};

use crate::error::{InputError, MatchError, MatchResult};
use crate::models::{Matching, Preferences, Side};

/// Deferred-acceptance matching over two sides' filtered, completed lists.
///
/// The proposing side gets its optimal stable matching. Proposers start in name order and
/// rejected proposers queue at the back, so a run is a pure function of its input lists.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchingEngine {
    proposing_side: Side,
}

impl MatchingEngine {
    pub fn new(proposing_side: Side) -> Self {
        Self { proposing_side }
    }

    pub fn proposing_side(&self) -> Side {
        self.proposing_side
    }

    /// Match `women` with `men`.
    ///
    /// Returns [`MatchError::Infeasible`] if a proposer runs out of people to propose to,
    /// which only happens when blacklist filtering removed every partner still available.
    pub fn run(&self, women: &Preferences, men: &Preferences) -> MatchResult<Matching> {
        if women.len() != men.len() {
            return Err(InputError::UnequalSides {
                women: women.len(),
                men: men.len(),
            }
            .into());
        }

        let matching = match self.proposing_side {
            Side::Women => Matching::from_pairs(deferred_acceptance(women, men)?),
            Side::Men => Matching::from_pairs(
                deferred_acceptance(men, women)?
                    .into_iter()
                    .map(|(man, woman)| (woman, man)),
            ),
        };

        Ok(matching)
    }
}

/// Run the proposal rounds and return (proposer, acceptor) pairs
fn deferred_acceptance<'a>(
    proposers: &'a Preferences,
    acceptors: &'a Preferences,
) -> MatchResult<Vec<(&'a str, &'a str)>> {
    let proposer_ids: Vec<&str> = proposers.keys().map(String::as_str).collect();
    let acceptor_ids: Vec<&str> = acceptors.keys().map(String::as_str).collect();

    let proposer_index: HashMap<&str, usize> =
        proposer_ids.iter().enumerate().map(|(i, p)| (*p, i)).collect();
    let acceptor_index: HashMap<&str, usize> =
        acceptor_ids.iter().enumerate().map(|(i, a)| (*a, i)).collect();

    let lists: Vec<Vec<usize>> = proposers
        .values()
        .map(|list| {
            list.iter()
                .filter_map(|candidate| acceptor_index.get(candidate.as_str()).copied())
                .collect()
        })
        .collect();

    // ranks[a][p]: where acceptor a puts proposer p; None means unacceptable
    let ranks: Vec<Vec<Option<usize>>> = acceptors
        .values()
        .map(|list| {
            let mut rank = vec![None; proposer_ids.len()];
            for (position, candidate) in list.iter().enumerate() {
                if let Some(&p) = proposer_index.get(candidate.as_str()) {
                    rank[p] = Some(position);
                }
            }
            rank
        })
        .collect();

    let mut next = vec![0usize; proposer_ids.len()];
    let mut held: Vec<Option<usize>> = vec![None; acceptor_ids.len()];
    let mut free: VecDeque<usize> = (0..proposer_ids.len()).collect();

    while let Some(p) = free.pop_front() {
        let Some(&a) = lists[p].get(next[p]) else {
            return Err(MatchError::Infeasible {
                person: proposer_ids[p].to_string(),
            });
        };
        next[p] += 1;

        let Some(rank_p) = ranks[a][p] else {
            free.push_back(p);
            continue;
        };

        match held[a] {
            None => held[a] = Some(p),
            Some(q) => {
                let keeps_current = ranks[a][q].is_some_and(|rank_q| rank_q < rank_p);
                if keeps_current {
                    free.push_back(p);
                } else {
                    held[a] = Some(p);
                    free.push_back(q);
                }
            }
        }
    }

    Ok(held
        .iter()
        .enumerate()
        .filter_map(|(a, p)| p.map(|p| (proposer_ids[p], acceptor_ids[a])))
        .collect())
}

/// Position of `candidate` in `list`, if ranked at all
#[inline]
fn position(list: &[String], candidate: &str) -> Option<usize> {
    list.iter().position(|c| c == candidate)
}

/// Whether `person` ranks `candidate` strictly above their current partner.
/// An unranked candidate is never preferred; an unranked partner is beaten by anyone ranked.
fn prefers(list: &[String], candidate: &str, partner: Option<&str>) -> bool {
    match (position(list, candidate), partner.and_then(|p| position(list, p))) {
        (None, _) => false,
        (Some(_), None) => true,
        (Some(c), Some(p)) => c < p,
    }
}

/// Every (woman, man) pair not matched together where both would rather have each other
pub fn blocking_pairs(
    matching: &Matching,
    women: &Preferences,
    men: &Preferences,
) -> Vec<(String, String)> {
    let mut blocking = Vec::new();

    for (woman, list) in women {
        let current = matching.partner_of_woman(woman);
        for man in list {
            if current == Some(man.as_str()) {
                continue;
            }
            if !prefers(list, man, current) {
                continue;
            }
            let Some(his_list) = men.get(man) else {
                continue;
            };
            if prefers(his_list, woman, matching.partner_of_man(man)) {
                blocking.push((woman.clone(), man.clone()));
            }
        }
    }

    blocking
}

/// No blocking pair exists under the given lists
pub fn is_stable(matching: &Matching, women: &Preferences, men: &Preferences) -> bool {
    blocking_pairs(matching, women, men).is_empty()
}
