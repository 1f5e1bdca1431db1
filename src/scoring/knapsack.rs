// Ideal-pick optimizer.
//
// Finds the subset of at most `max_teams` teams whose total price stays
// within `max_price` while maximizing total points. This is a 0/1 knapsack
// with an extra cardinality dimension, solved exactly by dynamic
// programming in O(N * K * B) time; an enumeration over all subsets would
// be exponential and is used only as a cross-check oracle in the tests.

use serde::Serialize;

use crate::tournament::team::Team;

/// The points-maximizing feasible selection for a tournament.
#[derive(Debug, Clone, Serialize)]
pub struct IdealPick {
    pub teams: Vec<Team>,
    pub points: u32,
}

impl IdealPick {
    /// The zero-team baseline, used whenever no feasible non-empty
    /// selection exists or the tournament is still open.
    pub fn empty() -> Self {
        IdealPick {
            teams: Vec::new(),
            points: 0,
        }
    }
}

/// Compute the ideal pick for a team catalog under a cardinality bound
/// (`max_teams`) and a budget bound (`max_price`).
///
/// The DP table is indexed by (teams used, budget spent) in whole currency
/// units. Teams are consumed in slice order; both inner loops run
/// descending so each team is used at most once. Alongside each cell's best
/// point total the achieving index list is tracked, so the winning subset
/// falls out without a separate backtracking pass. A cell is only replaced
/// on a strictly greater score, which makes the result deterministic for a
/// fixed input ordering.
pub fn calculate_ideal_pick(teams: &[Team], max_teams: u32, max_price: u32) -> IdealPick {
    let k_max = max_teams as usize;
    let b_max = max_price as usize;

    // dp[k][j]: best points using at most k teams and total price <= j.
    let mut dp = vec![vec![0u32; b_max + 1]; k_max + 1];
    let mut selections: Vec<Vec<Vec<usize>>> = vec![vec![Vec::new(); b_max + 1]; k_max + 1];

    for (i, team) in teams.iter().enumerate() {
        let price = team.price as usize;
        for k in (1..=k_max).rev() {
            for j in (price..=b_max).rev() {
                let candidate = dp[k - 1][j - price] + team.points;
                if candidate > dp[k][j] {
                    dp[k][j] = candidate;
                    let mut path = selections[k - 1][j - price].clone();
                    path.push(i);
                    selections[k][j] = path;
                }
            }
        }
    }

    let mut best_points = 0u32;
    let mut best_indexes: &[usize] = &[];
    for k in 1..=k_max {
        for j in 0..=b_max {
            if dp[k][j] > best_points {
                best_points = dp[k][j];
                best_indexes = &selections[k][j];
            }
        }
    }

    IdealPick {
        teams: best_indexes.iter().map(|&i| teams[i].clone()).collect(),
        points: best_points,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---- Test helpers ----

    fn build_team(id: i64, price: u32, points: u32) -> Team {
        Team {
            id,
            name: format!("Team {id}"),
            price,
            points,
        }
    }

    fn catalog(entries: &[(u32, u32)]) -> Vec<Team> {
        entries
            .iter()
            .enumerate()
            .map(|(i, &(price, points))| build_team(i as i64 + 1, price, points))
            .collect()
    }

    /// The 23-team regression catalog from a real tournament.
    fn full_catalog() -> Vec<Team> {
        catalog(&[
            (10, 10),
            (10, 15),
            (20, 18),
            (20, 22),
            (20, 32),
            (25, 32),
            (25, 32),
            (35, 32),
            (35, 35),
            (35, 43),
            (40, 32),
            (40, 43),
            (40, 43),
            (45, 43),
            (45, 44),
            (45, 45),
            (50, 34),
            (50, 52),
            (50, 62),
            (55, 50),
            (55, 53),
            (60, 60),
            (60, 61),
        ])
    }

    /// Exhaustive subset enumeration. Exponential, only usable on small
    /// catalogs; serves as an optimality oracle for the DP.
    fn brute_force_points(teams: &[Team], max_teams: u32, max_price: u32) -> u32 {
        assert!(teams.len() <= 20, "oracle is exponential");
        let mut best = 0u32;
        for mask in 0u32..(1u32 << teams.len()) {
            let mut count = 0u32;
            let mut cost = 0u32;
            let mut points = 0u32;
            for (i, team) in teams.iter().enumerate() {
                if mask & (1 << i) != 0 {
                    count += 1;
                    cost += team.price;
                    points += team.points;
                }
            }
            if count <= max_teams && cost <= max_price && points > best {
                best = points;
            }
        }
        best
    }

    // ---- Regression fixtures ----

    #[test]
    fn ideal_pick_for_a_minimal_list() {
        let teams = catalog(&[(10, 10), (20, 20), (30, 30), (40, 40)]);

        assert_eq!(calculate_ideal_pick(&teams, 4, 100).points, 100);
        assert_eq!(calculate_ideal_pick(&teams, 3, 100).points, 90);
    }

    #[test]
    fn ideal_pick_for_a_full_list() {
        let teams = full_catalog();

        assert_eq!(calculate_ideal_pick(&teams, 4, 150).points, 182);
        assert_eq!(calculate_ideal_pick(&teams, 4, 180).points, 207);
        assert_eq!(calculate_ideal_pick(&teams, 4, 200).points, 219);
        assert_eq!(calculate_ideal_pick(&teams, 5, 180).points, 221);
        assert_eq!(calculate_ideal_pick(&teams, 5, 200).points, 234);
        assert_eq!(calculate_ideal_pick(&teams, 5, 220).points, 251);
    }

    // ---- Edge cases ----

    #[test]
    fn zero_max_teams_yields_empty_pick() {
        let teams = catalog(&[(10, 10), (20, 20)]);
        let pick = calculate_ideal_pick(&teams, 0, 100);
        assert!(pick.teams.is_empty());
        assert_eq!(pick.points, 0);
    }

    #[test]
    fn zero_budget_yields_empty_pick() {
        let teams = catalog(&[(10, 10), (20, 20)]);
        let pick = calculate_ideal_pick(&teams, 3, 0);
        assert!(pick.teams.is_empty());
        assert_eq!(pick.points, 0);
    }

    #[test]
    fn empty_catalog_yields_empty_pick() {
        let pick = calculate_ideal_pick(&[], 3, 100);
        assert!(pick.teams.is_empty());
        assert_eq!(pick.points, 0);
    }

    #[test]
    fn team_priced_above_budget_is_never_selected() {
        let teams = catalog(&[(10, 10), (200, 999)]);
        let pick = calculate_ideal_pick(&teams, 2, 100);
        assert_eq!(pick.points, 10);
        assert_eq!(pick.teams.len(), 1);
        assert_eq!(pick.teams[0].id, 1);
    }

    #[test]
    fn zero_price_team_is_always_affordable() {
        let teams = catalog(&[(0, 7), (100, 50)]);
        let pick = calculate_ideal_pick(&teams, 2, 100);
        assert_eq!(pick.points, 57);
        assert_eq!(pick.teams.len(), 2);
    }

    #[test]
    fn infeasible_catalog_yields_empty_pick() {
        // Every team costs more than the budget.
        let teams = catalog(&[(50, 10), (60, 20)]);
        let pick = calculate_ideal_pick(&teams, 2, 40);
        assert!(pick.teams.is_empty());
        assert_eq!(pick.points, 0);
    }

    // ---- Invariants ----

    #[test]
    fn selection_respects_both_bounds() {
        let teams = full_catalog();
        for (max_teams, max_price) in [(1, 60), (2, 75), (3, 100), (4, 150), (5, 220), (8, 300)] {
            let pick = calculate_ideal_pick(&teams, max_teams, max_price);
            assert!(
                pick.teams.len() <= max_teams as usize,
                "pick of {} teams violates cardinality bound {}",
                pick.teams.len(),
                max_teams
            );
            let cost: u32 = pick.teams.iter().map(|t| t.price).sum();
            assert!(
                cost <= max_price,
                "pick costing {} violates budget bound {}",
                cost,
                max_price
            );
            let points: u32 = pick.teams.iter().map(|t| t.points).sum();
            assert_eq!(
                points, pick.points,
                "reported points must equal the sum over selected teams"
            );
        }
    }

    #[test]
    fn matches_brute_force_on_small_catalogs() {
        let small = catalog(&[
            (10, 15),
            (20, 18),
            (20, 32),
            (25, 32),
            (35, 43),
            (40, 32),
            (45, 44),
            (50, 62),
            (55, 50),
            (60, 61),
        ]);
        for max_teams in 0..=5 {
            for max_price in [0, 10, 35, 60, 90, 120, 160, 250] {
                let dp = calculate_ideal_pick(&small, max_teams, max_price).points;
                let oracle = brute_force_points(&small, max_teams, max_price);
                assert_eq!(
                    dp, oracle,
                    "DP disagrees with enumeration at K={max_teams}, B={max_price}"
                );
            }
        }
    }

    #[test]
    fn widening_either_bound_never_loses_points() {
        let teams = full_catalog();
        for max_teams in 1..=6u32 {
            for max_price in (20..=240).step_by(20) {
                let base = calculate_ideal_pick(&teams, max_teams, max_price).points;
                let more_teams = calculate_ideal_pick(&teams, max_teams + 1, max_price).points;
                let more_budget = calculate_ideal_pick(&teams, max_teams, max_price + 20).points;
                assert!(
                    more_teams >= base,
                    "raising K from {max_teams} dropped points {base} -> {more_teams}"
                );
                assert!(
                    more_budget >= base,
                    "raising B from {max_price} dropped points {base} -> {more_budget}"
                );
            }
        }
    }

    #[test]
    fn repeated_runs_are_identical() {
        let teams = full_catalog();
        let first = calculate_ideal_pick(&teams, 5, 220);
        let second = calculate_ideal_pick(&teams, 5, 220);
        assert_eq!(first.points, second.points);
        let first_ids: Vec<i64> = first.teams.iter().map(|t| t.id).collect();
        let second_ids: Vec<i64> = second.teams.iter().map(|t| t.id).collect();
        assert_eq!(first_ids, second_ids);
    }

    #[test]
    fn selected_teams_keep_catalog_order() {
        // Selection indexes are appended in iteration order, so the returned
        // teams appear in the same order as the input slice.
        let teams = catalog(&[(10, 10), (20, 20), (30, 30), (40, 40)]);
        let pick = calculate_ideal_pick(&teams, 4, 100);
        let ids: Vec<i64> = pick.teams.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }
}
