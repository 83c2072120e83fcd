use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::InputError;
use crate::models::{CompletionRecords, Matching, Preferences, Side};

/// Which way a scorer's values improve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Better {
    Lower,
    Higher,
}

impl Better {
    /// `Ordering::Greater` when `a` is the better score
    pub fn compare(self, a: f64, b: f64) -> Ordering {
        match self {
            Better::Higher => a.total_cmp(&b),
            Better::Lower => b.total_cmp(&a),
        }
    }

    pub fn is_improvement(self, candidate: f64, incumbent: f64) -> bool {
        self.compare(candidate, incumbent) == Ordering::Greater
    }
}

/// Monotonic transform applied to 1-based rank positions before aggregation.
///
/// Every warper maps rank 1 to 1.0 and the "hallucinated" rank `size + 1` to `size + 1`,
/// so scores stay on the same scale whichever warper is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Warper {
    #[default]
    Identity,
    /// Concave: separates near-top ranks, flattens the tail
    Logarithmic,
    /// Convex: near-top ranks cost little, tail ranks cost steeply more
    Exponential,
}

impl Warper {
    pub const ALL: [Warper; 3] = [Warper::Identity, Warper::Logarithmic, Warper::Exponential];

    pub fn name(self) -> &'static str {
        match self {
            Warper::Identity => "identity",
            Warper::Logarithmic => "logarithmic",
            Warper::Exponential => "exponential",
        }
    }

    /// Warp `rank` (1-based) for a side of `size` people
    pub fn warp(self, rank: usize, size: usize) -> f64 {
        let size = size.max(1) as f64;
        // Position along the ranking, 0.0 for the top choice and 1.0 past the end
        let x = (rank.max(1) - 1) as f64 / size;
        let curve = match self {
            Warper::Identity => return rank.max(1) as f64,
            Warper::Logarithmic => (1.0 + x).ln() / std::f64::consts::LN_2,
            Warper::Exponential => (x.exp() - 1.0) / (std::f64::consts::E - 1.0),
        };
        1.0 + size * curve
    }

    /// Warp a base score in [0, 1]; 0 and 1 are fixed points
    pub fn warp_unit(self, x: f64) -> f64 {
        match self {
            Warper::Identity => x,
            Warper::Logarithmic => (1.0 + x).ln() / std::f64::consts::LN_2,
            Warper::Exponential => (x.exp() - 1.0) / (std::f64::consts::E - 1.0),
        }
    }
}

impl fmt::Display for Warper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Warper {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "identity" => Ok(Warper::Identity),
            "logarithmic" | "log" => Ok(Warper::Logarithmic),
            "exponential" | "exp" => Ok(Warper::Exponential),
            other => Err(InputError::UnknownWarper(other.to_string())),
        }
    }
}

/// The named scoring strategies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScorerKind {
    /// Sum of everyone's warped partner rank
    EgalitarianSum,
    /// Worst warped partner rank over everyone
    EgalitarianMax,
    /// Number of people matched within their stated list
    #[default]
    RealMatchCount,
    /// `weight * women's mean satisfaction + (1 - weight) * men's mean satisfaction`
    WeightedComposite,
    /// 1 for a stated partner, 0 otherwise; sides blended by weight, divided by size
    OneZero,
    /// `(len - i) / len` for the stated partner at 0-based position `i` of a stated list of
    /// `len`, 0 otherwise; sides blended by weight, divided by size
    Frac,
}

impl ScorerKind {
    pub const ALL: [ScorerKind; 6] = [
        ScorerKind::EgalitarianSum,
        ScorerKind::EgalitarianMax,
        ScorerKind::RealMatchCount,
        ScorerKind::WeightedComposite,
        ScorerKind::OneZero,
        ScorerKind::Frac,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ScorerKind::EgalitarianSum => "egalitarian-sum",
            ScorerKind::EgalitarianMax => "egalitarian-max",
            ScorerKind::RealMatchCount => "real-match-count",
            ScorerKind::WeightedComposite => "weighted-composite",
            ScorerKind::OneZero => "one-zero",
            ScorerKind::Frac => "frac",
        }
    }

    pub fn better(self) -> Better {
        match self {
            ScorerKind::EgalitarianSum | ScorerKind::EgalitarianMax => Better::Lower,
            ScorerKind::RealMatchCount
            | ScorerKind::WeightedComposite
            | ScorerKind::OneZero
            | ScorerKind::Frac => Better::Higher,
        }
    }
}

impl fmt::Display for ScorerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScorerKind {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        match normalized.as_str() {
            "egalitarian-sum" | "egalitarian" => Ok(ScorerKind::EgalitarianSum),
            "egalitarian-max" | "worst-case" => Ok(ScorerKind::EgalitarianMax),
            "real-match-count" => Ok(ScorerKind::RealMatchCount),
            "weighted-composite" => Ok(ScorerKind::WeightedComposite),
            "one-zero" => Ok(ScorerKind::OneZero),
            "frac" => Ok(ScorerKind::Frac),
            _ => Err(InputError::UnknownScorer(s.trim().to_string())),
        }
    }
}

/// How one person fared in a matching
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonScore {
    pub person: String,
    pub partner: String,
    /// 1-based rank of the partner in the stated list; `None` if hallucinated
    pub rank: Option<usize>,
    pub warped_rank: f64,
    /// 1.0 for the top stated choice falling to 0.0 for a hallucinated partner, plus boost
    pub satisfaction: f64,
}

impl PersonScore {
    pub fn is_real(&self) -> bool {
        self.rank.is_some()
    }
}

/// One side's individual scores and their aggregate under the active scorer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SideScore {
    pub aggregate: f64,
    pub real_matches: usize,
    pub people: Vec<PersonScore>,
}

/// A matching's overall score with the per-side detail behind it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub value: f64,
    pub women: SideScore,
    pub men: SideScore,
}

/// A fully configured scoring strategy. Pure: same inputs, same score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scorer {
    kind: ScorerKind,
    warper: Warper,
    weight: f64,
    boost: f64,
}

impl Scorer {
    pub fn new(kind: ScorerKind, warper: Warper, weight: f64, boost: f64) -> Self {
        Self {
            kind,
            warper,
            weight,
            boost,
        }
    }

    pub fn kind(&self) -> ScorerKind {
        self.kind
    }

    pub fn better(&self) -> Better {
        self.kind.better()
    }

    /// Score `matching` against the stated lists.
    ///
    /// `records` bounds the stated part of each list; a partner found beyond it (or not at
    /// all) is hallucinated and ranked one past the end of the opposite side.
    pub fn score(
        &self,
        matching: &Matching,
        women: &Preferences,
        men: &Preferences,
        women_records: &CompletionRecords,
        men_records: &CompletionRecords,
    ) -> ScoreBreakdown {
        let women_side = self.score_side(Side::Women, matching, women, women_records, men.len());
        let men_side = self.score_side(Side::Men, matching, men, men_records, women.len());

        let value = match self.kind {
            ScorerKind::EgalitarianSum | ScorerKind::RealMatchCount => {
                women_side.aggregate + men_side.aggregate
            }
            ScorerKind::EgalitarianMax => women_side.aggregate.max(men_side.aggregate),
            ScorerKind::WeightedComposite => {
                self.weight * women_side.aggregate + (1.0 - self.weight) * men_side.aggregate
            }
            ScorerKind::OneZero | ScorerKind::Frac => {
                let blended =
                    self.weight * women_side.aggregate + (1.0 - self.weight) * men_side.aggregate;
                blended / women.len().max(1) as f64
            }
        };

        ScoreBreakdown {
            value,
            women: women_side,
            men: men_side,
        }
    }

    /// Score one person matched to `partner`, with `size` people on the other side
    pub fn score_person(
        &self,
        person: &str,
        partner: &str,
        stated: &[String],
        split: usize,
        size: usize,
    ) -> PersonScore {
        let rank = stated
            .iter()
            .take(split)
            .position(|c| c == partner)
            .map(|i| i + 1);
        let warped_rank = self.warper.warp(rank.unwrap_or(size + 1), size);

        let satisfaction = match (rank, self.kind) {
            (None, _) => 0.0,
            (Some(_), ScorerKind::OneZero) => self.warper.warp_unit(1.0) + self.boost,
            (Some(r), ScorerKind::Frac) => {
                let len = split.max(1) as f64;
                let base = self.warper.warp_unit((len - (r - 1) as f64) / len);
                if base > 0.0 {
                    base + self.boost
                } else {
                    0.0
                }
            }
            // warp(1) == 1 and warp(size + 1) == size + 1, so this spans (0, 1]
            (Some(_), _) => (size as f64 + 1.0 - warped_rank) / size.max(1) as f64 + self.boost,
        };

        PersonScore {
            person: person.to_string(),
            partner: partner.to_string(),
            rank,
            warped_rank,
            satisfaction,
        }
    }

    fn score_side(
        &self,
        side: Side,
        matching: &Matching,
        prefs: &Preferences,
        records: &CompletionRecords,
        opposite_size: usize,
    ) -> SideScore {
        let people: Vec<PersonScore> = prefs
            .iter()
            .filter_map(|(person, stated)| {
                let partner = matching.partner(side, person)?;
                let split = records.get(person).map_or(stated.len(), |r| r.split);
                Some(self.score_person(person, partner, stated, split, opposite_size))
            })
            .collect();

        let real_matches = people.iter().filter(|p| p.is_real()).count();
        let aggregate = match self.kind {
            ScorerKind::EgalitarianSum => people.iter().map(|p| p.warped_rank).sum(),
            ScorerKind::EgalitarianMax => people.iter().map(|p| p.warped_rank).fold(0.0, f64::max),
            ScorerKind::RealMatchCount => real_matches as f64,
            ScorerKind::OneZero | ScorerKind::Frac => people.iter().map(|p| p.satisfaction).sum(),
            ScorerKind::WeightedComposite => {
                if people.is_empty() {
                    0.0
                } else {
                    people.iter().map(|p| p.satisfaction).sum::<f64>() / people.len() as f64
                }
            }
        };

        SideScore {
            aggregate,
            real_matches,
            people,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::records_for;

    fn prefs(entries: &[(&str, &[&str])]) -> Preferences {
        entries
            .iter()
            .map(|(p, l)| (p.to_string(), l.iter().map(|s| s.to_string()).collect()))
            .collect()
    }

    fn score(kind: ScorerKind, warper: Warper, weight: f64, matching: &Matching) -> ScoreBreakdown {
        let women = prefs(&[("A", &["X", "Y"]), ("B", &["X"]), ("C", &[])]);
        let men = prefs(&[("X", &["B"]), ("Y", &["A", "C", "B"]), ("Z", &[])]);
        Scorer::new(kind, warper, weight, 0.0).score(
            matching,
            &women,
            &men,
            &records_for(&women),
            &records_for(&men),
        )
    }

    fn matching() -> Matching {
        // A gets her 2nd choice, B her 1st, C is hallucinated; X and Y get their 1st, Z is hallucinated
        Matching::from_pairs([("A", "Y"), ("B", "X"), ("C", "Z")])
    }

    #[test]
    fn test_warpers_share_endpoints_and_are_monotonic() {
        for warper in Warper::ALL {
            assert!((warper.warp(1, 5) - 1.0).abs() < 1e-9, "{warper} at top");
            assert!((warper.warp(6, 5) - 6.0).abs() < 1e-9, "{warper} past end");
            for rank in 1..6 {
                assert!(warper.warp(rank + 1, 5) > warper.warp(rank, 5), "{warper} at {rank}");
            }
        }
        assert!(Warper::Logarithmic.warp(2, 5) > Warper::Identity.warp(2, 5));
        assert!(Warper::Exponential.warp(2, 5) < Warper::Identity.warp(2, 5));
    }

    #[test]
    fn test_real_match_count() {
        let breakdown = score(ScorerKind::RealMatchCount, Warper::Identity, 0.5, &matching());
        assert_eq!(breakdown.women.real_matches, 2);
        assert_eq!(breakdown.men.real_matches, 2);
        assert_eq!(breakdown.value, 4.0);
    }

    #[test]
    fn test_egalitarian_sum_and_max() {
        let sum = score(ScorerKind::EgalitarianSum, Warper::Identity, 0.5, &matching());
        // women: 2 + 1 + 4 (hallucinated), men: 1 + 1 + 4
        assert_eq!(sum.women.aggregate, 7.0);
        assert_eq!(sum.men.aggregate, 6.0);
        assert_eq!(sum.value, 13.0);

        let max = score(ScorerKind::EgalitarianMax, Warper::Identity, 0.5, &matching());
        assert_eq!(max.value, 4.0);
    }

    #[test]
    fn test_weighted_composite_blends_sides() {
        let women_only = score(ScorerKind::WeightedComposite, Warper::Identity, 1.0, &matching());
        // satisfaction (size + 1 - rank) / size: A 2/3, B 1, C 0
        let expected_women = (2.0 / 3.0 + 1.0 + 0.0) / 3.0;
        assert!((women_only.value - expected_women).abs() < 1e-9);

        let men_only = score(ScorerKind::WeightedComposite, Warper::Identity, 0.0, &matching());
        assert!((men_only.value - men_only.men.aggregate).abs() < 1e-9);
    }

    #[test]
    fn test_boost_only_rewards_real_matches() {
        let women = prefs(&[("A", &["X"]), ("B", &[])]);
        let scorer = Scorer::new(ScorerKind::WeightedComposite, Warper::Identity, 1.0, 1.0);

        let real = scorer.score_person("A", "X", &women["A"], 1, 2);
        let hallucinated = scorer.score_person("B", "Y", &women["B"], 0, 2);
        assert_eq!(real.satisfaction, 2.0);
        assert_eq!(hallucinated.satisfaction, 0.0);
    }

    #[test]
    fn test_split_bounds_real_portion() {
        let stated = vec!["X".to_string(), "Y".to_string()];
        let scorer = Scorer::new(ScorerKind::RealMatchCount, Warper::Identity, 0.5, 0.0);
        assert_eq!(scorer.score_person("A", "Y", &stated, 2, 3).rank, Some(2));
        assert_eq!(scorer.score_person("A", "Y", &stated, 1, 3).rank, None);
    }

    #[test]
    fn test_direction_per_scorer() {
        assert_eq!(ScorerKind::EgalitarianSum.better(), Better::Lower);
        assert_eq!(ScorerKind::EgalitarianMax.better(), Better::Lower);
        assert_eq!(ScorerKind::RealMatchCount.better(), Better::Higher);
        assert!(Better::Lower.is_improvement(3.0, 4.0));
        assert!(!Better::Lower.is_improvement(4.0, 4.0));
        assert!(Better::Higher.is_improvement(5.0, 4.0));
    }

    #[test]
    fn test_one_zero_blends_sides_by_weight() {
        // women: A and B matched within their lists, C not; men: X and Y, not Z
        let women_only = score(ScorerKind::OneZero, Warper::Identity, 1.0, &matching());
        assert!((women_only.value - 2.0 / 3.0).abs() < 1e-9);

        // A and Y each get a stated partner, everyone else does not
        let lopsided = Matching::from_pairs([("A", "X"), ("B", "Z"), ("C", "Y")]);
        let women_weighted = score(ScorerKind::OneZero, Warper::Identity, 1.0, &lopsided);
        let men_weighted = score(ScorerKind::OneZero, Warper::Identity, 0.0, &lopsided);
        assert_eq!(women_weighted.women.aggregate, 1.0);
        assert_eq!(men_weighted.men.aggregate, 1.0);
        assert!((women_weighted.value - 1.0 / 3.0).abs() < 1e-9);
        assert!((men_weighted.value - 1.0 / 3.0).abs() < 1e-9);

        let all_men = Matching::from_pairs([("A", "Z"), ("B", "Y"), ("C", "X")]);
        let w = score(ScorerKind::OneZero, Warper::Identity, 1.0, &all_men);
        let m = score(ScorerKind::OneZero, Warper::Identity, 0.0, &all_men);
        assert_eq!(w.value, 0.0);
        assert!((m.value - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_frac_normalises_by_stated_length() {
        let stated = vec!["X".to_string(), "Y".to_string()];
        let scorer = Scorer::new(ScorerKind::Frac, Warper::Identity, 0.5, 0.0);

        // Second of two stated choices: (2 - 1) / 2, whatever the side size
        assert_eq!(scorer.score_person("A", "Y", &stated, 2, 10).satisfaction, 0.5);
        assert_eq!(scorer.score_person("A", "X", &stated, 2, 10).satisfaction, 1.0);
        assert_eq!(scorer.score_person("A", "Z", &stated, 2, 10).satisfaction, 0.0);

        let boosted = Scorer::new(ScorerKind::Frac, Warper::Exponential, 0.5, 1.0);
        assert!((boosted.score_person("A", "X", &stated, 2, 10).satisfaction - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_names_round_trip() {
        for kind in ScorerKind::ALL {
            assert_eq!(kind.name().parse::<ScorerKind>().unwrap(), kind);
        }
        for warper in Warper::ALL {
            assert_eq!(warper.name().parse::<Warper>().unwrap(), warper);
        }
        assert_eq!("one_zero".parse::<ScorerKind>().unwrap(), ScorerKind::OneZero);
        assert!("fairest".parse::<ScorerKind>().is_err());
        assert!("cubic".parse::<Warper>().is_err());
    }
}
