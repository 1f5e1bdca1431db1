// Tournament service layer: glues the storage handle to the scoring
// engines and exposes the operations the surrounding application calls.

use std::collections::HashMap;

use thiserror::Error;

use crate::db::Database;
use crate::scoring::knapsack::{calculate_ideal_pick, IdealPick};
use crate::scoring::metrics::{self, TeamResult, TeamStats, TournamentMetrics};
use crate::scoring::popularity::{self, TeamPopularity};
use crate::scoring::ranking::{self, PlayerResult};
use crate::scoring::ScoringError;
use crate::tournament::pick::{self, SelectionError};
use crate::tournament::team::Team;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("no tournament with id {0}")]
    TournamentNotFound(i64),

    #[error("tournament is closed for new picks")]
    TournamentClosed,

    #[error(transparent)]
    InvalidSelection(#[from] SelectionError),

    #[error("a newer version of this pick is already stored")]
    StaleVersion,

    #[error(transparent)]
    Scoring(#[from] ScoringError),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Build an id-keyed map of a tournament's team catalog.
fn fetch_teams_as_map(db: &Database, tournament_id: i64) -> Result<HashMap<i64, Team>, ServiceError> {
    let teams = db.fetch_teams(tournament_id)?;
    Ok(teams.into_iter().map(|t| (t.id, t)).collect())
}

// ---------------------------------------------------------------------------
// Picks
// ---------------------------------------------------------------------------

/// Store a player's selection, enforcing the tournament's bounds at write
/// time. Rejected once the deadline has passed, when the selection exceeds
/// the cardinality or budget bound, or when a newer version is already
/// stored (optimistic concurrency).
pub fn save_picks(
    db: &Database,
    user_id: i64,
    tournament_id: i64,
    team_ids: &[i64],
    version: i64,
) -> Result<(), ServiceError> {
    let tournament = db
        .fetch_tournament(tournament_id)?
        .ok_or(ServiceError::TournamentNotFound(tournament_id))?;

    if tournament.is_closed() {
        return Err(ServiceError::TournamentClosed);
    }

    let catalog = db.fetch_teams(tournament_id)?;
    pick::validate_selection(team_ids, &tournament, &catalog)?;

    if !db.save_pick(user_id, tournament_id, team_ids, version)? {
        return Err(ServiceError::StaleVersion);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Ideal pick
// ---------------------------------------------------------------------------

/// Recompute and cache the ideal pick for a tournament.
///
/// A missing or still-open tournament is a no-op: an open tournament has no
/// meaningful ideal since its scores are unknown. Otherwise the optimizer
/// runs over the catalog in id order and the single cache row is replaced.
/// Deterministic and idempotent for an unchanged catalog, so concurrent
/// recomputations converge on the same stored row.
pub fn update_ideal_pick(db: &Database, tournament_id: i64) -> Result<(), ServiceError> {
    let Some(tournament) = db.fetch_tournament(tournament_id)? else {
        return Ok(());
    };
    if !tournament.is_closed() {
        return Ok(());
    }

    let teams = db.fetch_teams(tournament_id)?;
    let ideal = calculate_ideal_pick(&teams, tournament.max_teams, tournament.max_price);
    let team_ids: Vec<i64> = ideal.teams.iter().map(|t| t.id).collect();
    db.save_ideal_pick(tournament_id, &team_ids, ideal.points)?;

    tracing::info!(
        tournament_id,
        points = ideal.points,
        teams = team_ids.len(),
        "ideal pick cached"
    );
    Ok(())
}

/// Read the cached ideal pick for a tournament.
///
/// Returns the empty pick when the tournament is missing, still open, or
/// not yet computed. The cached selection is frozen, but the teams shown
/// alongside it are resolved against the current catalog, so edited team
/// data is reflected while the selection itself stays fixed. A cached id
/// that no longer resolves is a data-integrity error.
pub fn fetch_ideal_pick(db: &Database, tournament_id: i64) -> Result<IdealPick, ServiceError> {
    let Some(tournament) = db.fetch_tournament(tournament_id)? else {
        return Ok(IdealPick::empty());
    };
    if !tournament.is_closed() {
        return Ok(IdealPick::empty());
    }

    let Some((team_ids, points)) = db.load_ideal_pick(tournament_id)? else {
        return Ok(IdealPick::empty());
    };

    let teams_map = fetch_teams_as_map(db, tournament_id)?;
    let teams = ranking::resolve_teams(&team_ids, &teams_map)?;
    Ok(IdealPick { teams, points })
}

// ---------------------------------------------------------------------------
// Results, popularity, stats
// ---------------------------------------------------------------------------

/// Compute the ranked leaderboard for a tournament from the stored picks
/// and the current team catalog.
pub fn fetch_tournament_results(
    db: &Database,
    tournament_id: i64,
) -> Result<Vec<PlayerResult>, ServiceError> {
    let picks = db.load_picks(tournament_id)?;
    let teams_map = fetch_teams_as_map(db, tournament_id)?;
    Ok(ranking::rank_results(&picks, &teams_map)?)
}

/// Per-team pick frequencies plus the number of users with a non-empty
/// pick.
pub fn fetch_popular_teams(
    db: &Database,
    tournament_id: i64,
) -> Result<(Vec<TeamPopularity>, usize), ServiceError> {
    let picks = db.load_picks(tournament_id)?;
    let teams = db.fetch_teams(tournament_id)?;

    let selections: Vec<Vec<i64>> = picks.into_iter().map(|p| p.team_ids).collect();
    let users_with_pick_count = selections.len();
    let teams_by_popularity = popularity::popularity(&selections, &teams);
    Ok((teams_by_popularity, users_with_pick_count))
}

/// Per-team price/points deltas for a tournament.
pub fn fetch_team_stats(db: &Database, tournament_id: i64) -> Result<Vec<TeamStats>, ServiceError> {
    let teams = db.fetch_teams(tournament_id)?;
    Ok(metrics::team_stats(&teams))
}

/// Tournament-wide prediction-quality metrics.
pub fn fetch_tournament_metrics(
    db: &Database,
    tournament_id: i64,
) -> Result<TournamentMetrics, ServiceError> {
    let teams = db.fetch_teams(tournament_id)?;

    let results: Vec<TeamResult> = teams
        .iter()
        .map(|team| TeamResult {
            team_id: team.id,
            predicted: team.price,
            actual: team.points,
        })
        .collect();
    let max_points = teams.iter().map(|t| t.points).max().unwrap_or(0);

    Ok(metrics::tournament_metrics(&results, max_points))
}
