//! Assignment-based matching: maximize total satisfaction instead of searching for a
//! stable matching. Deterministic, so it runs once instead of over many trials.

use tracing::info;

use crate::core::scoring::Scorer;
use crate::core::search::{Method, SearchConfig, SearchOutcome};
use crate::error::{MatchError, MatchResult};
use crate::models::{records_for, Matching, Problem};

/// Minimum-cost perfect assignment of rows to columns (Kuhn-Munkres with potentials, O(n³)).
///
/// `cost` must be square. Returns the column assigned to each row.
pub fn min_cost_assignment(cost: &[Vec<f64>]) -> Vec<usize> {
    let n = cost.len();
    // 1-based throughout; row/column 0 is the virtual start of each augmenting path
    let mut u = vec![0.0; n + 1];
    let mut v = vec![0.0; n + 1];
    let mut owner = vec![0usize; n + 1];
    let mut way = vec![0usize; n + 1];

    for row in 1..=n {
        owner[0] = row;
        let mut j0 = 0;
        let mut minv = vec![f64::INFINITY; n + 1];
        let mut used = vec![false; n + 1];

        loop {
            used[j0] = true;
            let i0 = owner[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0;

            for j in 1..=n {
                if used[j] {
                    continue;
                }
                let reduced = cost[i0 - 1][j - 1] - u[i0] - v[j];
                if reduced < minv[j] {
                    minv[j] = reduced;
                    way[j] = j0;
                }
                if minv[j] < delta {
                    delta = minv[j];
                    j1 = j;
                }
            }

            for j in 0..=n {
                if used[j] {
                    u[owner[j]] += delta;
                    v[j] -= delta;
                } else {
                    minv[j] -= delta;
                }
            }

            j0 = j1;
            if owner[j0] == 0 {
                break;
            }
        }

        // Flip the augmenting path
        loop {
            let j1 = way[j0];
            owner[j0] = owner[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut assignment = vec![0; n];
    for j in 1..=n {
        if owner[j] != 0 {
            assignment[owner[j] - 1] = j - 1;
        }
    }
    assignment
}

/// Pairwise satisfaction: `weight * s_woman + (1 - weight) * s_man`
pub fn satisfaction_matrix(problem: &Problem, scorer: &Scorer, weight: f64) -> Vec<Vec<f64>> {
    let n = problem.size();
    let women = problem.women();
    let men = problem.men();

    women
        .iter()
        .map(|(woman, her_list)| {
            men.iter()
                .map(|(man, his_list)| {
                    let s_w = scorer
                        .score_person(woman, man, her_list, her_list.len(), n)
                        .satisfaction;
                    let s_m = scorer
                        .score_person(man, woman, his_list, his_list.len(), n)
                        .satisfaction;
                    weight * s_w + (1.0 - weight) * s_m
                })
                .collect()
        })
        .collect()
}

/// Solve `problem` as a maximum-satisfaction assignment that avoids blacklisted pairs
pub fn solve(problem: &Problem, config: &SearchConfig) -> MatchResult<SearchOutcome> {
    config.validate()?;
    let scorer = config.scorer();
    let satisfaction = satisfaction_matrix(problem, &scorer, config.weight);

    let women: Vec<&String> = problem.women().keys().collect();
    let men: Vec<&String> = problem.men().keys().collect();

    let ceiling = satisfaction
        .iter()
        .flatten()
        .copied()
        .fold(0.0, f64::max);
    // Allowed cells cost at most `ceiling`, so one forbidden cell outweighs any
    // assignment built from allowed cells alone. Any assignment using one is rejected below.
    let forbidden = (problem.size() as f64 + 1.0) * (ceiling + 1.0);

    let cost: Vec<Vec<f64>> = satisfaction
        .iter()
        .enumerate()
        .map(|(i, row)| {
            row.iter()
                .enumerate()
                .map(|(j, s)| {
                    if problem.blacklist().forbids(women[i], men[j]) {
                        forbidden
                    } else {
                        ceiling - s
                    }
                })
                .collect()
        })
        .collect();

    let assignment = min_cost_assignment(&cost);

    if assignment
        .iter()
        .enumerate()
        .any(|(i, &j)| problem.blacklist().forbids(women[i], men[j]))
    {
        return Err(MatchError::NoFeasibleMatching { attempted: 1 });
    }

    let matching = Matching::from_pairs(
        assignment
            .iter()
            .enumerate()
            .map(|(i, &j)| (women[i].as_str(), men[j].as_str())),
    );
    let score = scorer.score(
        &matching,
        problem.women(),
        problem.men(),
        &records_for(problem.women()),
        &records_for(problem.men()),
    );

    info!(
        "Hungarian assignment over {} pairs scored {:.4} under {}",
        matching.len(),
        score.value,
        config.scorer
    );

    Ok(SearchOutcome {
        method: Method::Hungarian,
        scorer: config.scorer,
        better: scorer.better(),
        matching,
        score,
        best_trial: None,
        trials_attempted: 1,
        trials_discarded: 0,
        seed: None,
    })
}
