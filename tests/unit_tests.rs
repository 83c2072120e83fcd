// Unit tests for Lume SMP

use lume_smp::core::{
    blocking_pairs, complete, complete_side, is_stable, trial_rng, Better, Blacklist,
    MatchingEngine, Scorer, ScorerKind, Warper,
};
use lume_smp::error::{InputError, MatchError};
use lume_smp::models::{records_for, Matching, Preferences, Side};
use lume_smp::services::{parse_blacklist, parse_preferences};
use std::collections::BTreeSet;

fn prefs(entries: &[(&str, &[&str])]) -> Preferences {
    entries
        .iter()
        .map(|(p, l)| (p.to_string(), l.iter().map(|s| s.to_string()).collect()))
        .collect()
}

fn names(list: &[&str]) -> BTreeSet<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_completion_keeps_stated_prefix() {
    let universe = names(&["X", "Y", "Z", "W"]);
    let partial = vec!["Z".to_string(), "X".to_string()];
    let mut rng = trial_rng(7, 0);

    let (list, record) = complete("A", &partial, &universe, &mut rng).unwrap();

    assert_eq!(&list[..2], &partial[..]);
    assert_eq!(list.len(), 4);
    assert_eq!(list.iter().cloned().collect::<BTreeSet<_>>(), universe);
    assert_eq!(record.split, 2);
    assert!(record.is_real(1));
    assert!(!record.is_real(2));
}

#[test]
fn test_completion_of_full_list_is_unchanged() {
    let universe = names(&["X", "Y"]);
    let partial = vec!["Y".to_string(), "X".to_string()];
    let mut rng = trial_rng(1, 3);

    let (list, record) = complete("A", &partial, &universe, &mut rng).unwrap();
    assert_eq!(list, partial);
    assert_eq!(record.split, 2);
}

#[test]
fn test_completion_rejects_duplicates_and_strangers() {
    let universe = names(&["X", "Y"]);
    let mut rng = trial_rng(1, 0);

    let dup = vec!["X".to_string(), "X".to_string()];
    assert!(matches!(
        complete("A", &dup, &universe, &mut rng),
        Err(InputError::DuplicateEntry { .. })
    ));

    let stranger = vec!["Q".to_string()];
    assert!(matches!(
        complete("A", &stranger, &universe, &mut rng),
        Err(InputError::UnknownCandidate { .. })
    ));
}

#[test]
fn test_same_stream_same_completion() {
    let women = prefs(&[("A", &[]), ("B", &["Y"]), ("C", &[])]);
    let men = names(&["X", "Y", "Z"]);

    let first = complete_side(&women, &men, &mut trial_rng(42, 5)).unwrap();
    let second = complete_side(&women, &men, &mut trial_rng(42, 5)).unwrap();

    assert_eq!(first.lists, second.lists);
    assert_eq!(first.records, second.records);
    assert_eq!(first.lists["B"][0], "Y");
}

#[test]
fn test_blacklist_is_symmetric() {
    let blacklist = Blacklist::from_pairs([("A", "X")]);
    assert!(blacklist.forbids("A", "X"));
    assert!(blacklist.forbids("X", "A"));
    assert!(!blacklist.forbids("A", "Y"));
    assert_eq!(blacklist.len(), 1);
}

#[test]
fn test_blacklist_filter_removes_both_directions() {
    let blacklist = Blacklist::from_pairs([("A", "X")]);

    let women = blacklist.filter(prefs(&[("A", &["X", "Y"]), ("B", &["X", "Y"])])).unwrap();
    assert_eq!(women["A"], vec!["Y"]);
    assert_eq!(women["B"], vec!["X", "Y"]);

    let men = blacklist.filter(prefs(&[("X", &["A", "B"]), ("Y", &["A", "B"])])).unwrap();
    assert_eq!(men["X"], vec!["B"]);
    assert_eq!(men["Y"], vec!["A", "B"]);
}

#[test]
fn test_blacklist_filter_emptying_a_list_is_infeasible() {
    let blacklist = Blacklist::from_pairs([("A", "X")]);
    let result = blacklist.filter(prefs(&[("A", &["X"])]));
    assert_eq!(
        result.unwrap_err(),
        MatchError::Infeasible {
            person: "A".to_string()
        }
    );
}

#[test]
fn test_engine_women_and_men_optimal() {
    let women = prefs(&[("A", &["X", "Y"]), ("B", &["Y", "X"])]);
    let men = prefs(&[("X", &["B", "A"]), ("Y", &["A", "B"])]);

    let women_optimal = MatchingEngine::new(Side::Women).run(&women, &men).unwrap();
    assert!(women_optimal.contains_pair("A", "X"));
    assert!(women_optimal.contains_pair("B", "Y"));
    assert!(is_stable(&women_optimal, &women, &men));

    let men_optimal = MatchingEngine::new(Side::Men).run(&women, &men).unwrap();
    assert!(men_optimal.contains_pair("B", "X"));
    assert!(men_optimal.contains_pair("A", "Y"));
    assert!(is_stable(&men_optimal, &women, &men));
}

#[test]
fn test_engine_reports_exhausted_proposer() {
    // A and B both accept only X
    let women = prefs(&[("A", &["X"]), ("B", &["X"])]);
    let men = prefs(&[("X", &["A", "B"]), ("Y", &["A", "B"])]);

    let err = MatchingEngine::default().run(&women, &men).unwrap_err();
    assert_eq!(
        err,
        MatchError::Infeasible {
            person: "B".to_string()
        }
    );
}

#[test]
fn test_blocking_pair_detection() {
    let women = prefs(&[("A", &["X", "Y"]), ("B", &["X", "Y"])]);
    let men = prefs(&[("X", &["A", "B"]), ("Y", &["A", "B"])]);

    // A and X prefer each other to their partners
    let unstable = Matching::from_pairs([("A", "Y"), ("B", "X")]);
    assert_eq!(
        blocking_pairs(&unstable, &women, &men),
        vec![("A".to_string(), "X".to_string())]
    );

    let stable = Matching::from_pairs([("A", "X"), ("B", "Y")]);
    assert!(is_stable(&stable, &women, &men));
}

#[test]
fn test_warpers_fix_the_endpoints() {
    for warper in Warper::ALL {
        for size in [1usize, 3, 10] {
            assert!((warper.warp(1, size) - 1.0).abs() < 1e-9, "{} at rank 1", warper);
            assert!(
                (warper.warp(size + 1, size) - (size + 1) as f64).abs() < 1e-9,
                "{} at rank {}",
                warper,
                size + 1
            );
        }
    }
    assert_eq!(Warper::Identity.warp(3, 5), 3.0);
}

#[test]
fn test_scorer_directions() {
    assert_eq!(ScorerKind::EgalitarianSum.better(), Better::Lower);
    assert_eq!(ScorerKind::EgalitarianMax.better(), Better::Lower);
    assert_eq!(ScorerKind::RealMatchCount.better(), Better::Higher);
    assert_eq!(ScorerKind::WeightedComposite.better(), Better::Higher);

    assert!(Better::Lower.is_improvement(2.0, 3.0));
    assert!(Better::Higher.is_improvement(3.0, 2.0));
    assert!(!Better::Higher.is_improvement(2.0, 2.0));
}

#[test]
fn test_all_first_choices_score_perfectly() {
    let women = prefs(&[("A", &["X"]), ("B", &["Y"])]);
    let men = prefs(&[("X", &["A"]), ("Y", &["B"])]);
    let matching = Matching::from_pairs([("A", "X"), ("B", "Y")]);
    let (wr, mr) = (records_for(&women), records_for(&men));

    let count = Scorer::new(ScorerKind::RealMatchCount, Warper::Identity, 0.5, 0.0)
        .score(&matching, &women, &men, &wr, &mr);
    assert_eq!(count.value, 4.0);
    assert_eq!(count.women.real_matches, 2);

    let sum = Scorer::new(ScorerKind::EgalitarianSum, Warper::Identity, 0.5, 0.0)
        .score(&matching, &women, &men, &wr, &mr);
    assert_eq!(sum.value, 4.0);

    let composite = Scorer::new(ScorerKind::WeightedComposite, Warper::Identity, 0.5, 0.0)
        .score(&matching, &women, &men, &wr, &mr);
    assert!((composite.value - 1.0).abs() < 1e-9);
}

#[test]
fn test_hallucinated_partner_ranks_past_the_end() {
    let women = prefs(&[("A", &["Y"]), ("B", &[])]);
    let men = prefs(&[("X", &[]), ("Y", &[])]);
    let matching = Matching::from_pairs([("A", "X"), ("B", "Y")]);

    let breakdown = Scorer::new(ScorerKind::EgalitarianMax, Warper::Identity, 0.5, 0.0).score(
        &matching,
        &women,
        &men,
        &records_for(&women),
        &records_for(&men),
    );

    // Nobody is matched to a stated choice, so everyone sits at rank 3
    assert_eq!(breakdown.value, 3.0);
    assert_eq!(breakdown.women.real_matches, 0);
    assert!(breakdown.women.people.iter().all(|p| p.rank.is_none()));
}

#[test]
fn test_parse_text_format() {
    let women = parse_preferences("A: X, Y\nB:\n").unwrap();
    assert_eq!(women["A"], vec!["X", "Y"]);
    assert!(women["B"].is_empty());

    let blacklist = parse_blacklist("A,X\n").unwrap();
    assert!(blacklist.forbids("X", "A"));

    assert!(matches!(
        parse_preferences("no colon here"),
        Err(InputError::Parse { line: 1, .. })
    ));
}

#[test]
fn test_strategy_names_parse() {
    assert_eq!("egalitarian-sum".parse::<ScorerKind>().unwrap(), ScorerKind::EgalitarianSum);
    assert_eq!("log".parse::<Warper>().unwrap(), Warper::Logarithmic);
    assert_eq!("men".parse::<Side>().unwrap(), Side::Men);
    assert_eq!(
        "bogus".parse::<ScorerKind>().unwrap_err(),
        InputError::UnknownScorer("bogus".to_string())
    );
}
