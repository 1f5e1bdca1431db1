// Ranking engine: per-player totals and competition ("1224") ranks.

use std::collections::HashMap;

use serde::Serialize;

use crate::scoring::ScoringError;
use crate::tournament::pick::PickSnapshot;
use crate::tournament::team::{self, Team};

/// One row of a tournament leaderboard. Derived on every read, never
/// persisted.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerResult {
    pub user_id: i64,
    pub username: String,
    /// The player's teams, enriched with current price/points and ordered
    /// for display.
    pub teams: Vec<Team>,
    pub points: u32,
    pub rank: usize,
}

/// Resolve a list of team ids against the catalog and order the result for
/// display. A stored id that no longer exists in the catalog is a fatal
/// data-integrity error; teams are never silently dropped from scoring.
pub fn resolve_teams(
    team_ids: &[i64],
    teams_by_id: &HashMap<i64, Team>,
) -> Result<Vec<Team>, ScoringError> {
    let mut teams = team_ids
        .iter()
        .map(|id| {
            teams_by_id
                .get(id)
                .cloned()
                .ok_or(ScoringError::UnknownTeam(*id))
        })
        .collect::<Result<Vec<_>, _>>()?;
    team::sort_for_display(&mut teams);
    Ok(teams)
}

/// Score and rank a set of pick snapshots against the team catalog.
///
/// Players are sorted descending by total points (the sort is stable, so
/// equal totals keep their input order) and assigned competition ranks:
/// tied totals share a rank, and the next distinct total's rank is its
/// 1-based position in the sorted order. Totals [90,90,80,70,70,70]
/// produce ranks [1,1,3,4,4,4].
pub fn rank_results(
    picks: &[PickSnapshot],
    teams_by_id: &HashMap<i64, Team>,
) -> Result<Vec<PlayerResult>, ScoringError> {
    let mut results = Vec::with_capacity(picks.len());
    for pick in picks {
        let teams = resolve_teams(&pick.team_ids, teams_by_id)?;
        let points = teams.iter().map(|t| t.points).sum();
        results.push(PlayerResult {
            user_id: pick.user_id,
            username: pick.username.clone(),
            teams,
            points,
            rank: 0,
        });
    }

    results.sort_by(|a, b| b.points.cmp(&a.points));

    let mut rank = 0;
    let mut prev_points = None;
    for (index, result) in results.iter_mut().enumerate() {
        if prev_points != Some(result.points) {
            rank = index + 1;
        }
        prev_points = Some(result.points);
        result.rank = rank;
    }

    Ok(results)
}
