// Player pick snapshots and write-time selection validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::team::Team;
use super::Tournament;

/// A player's stored selection for one tournament, read as a snapshot.
///
/// The cardinality and budget bounds are enforced when the pick is written
/// (`validate_selection`), not when it is read back: if tournament bounds
/// are edited after submission, stored picks may exceed the new bounds and
/// are still scored as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickSnapshot {
    pub user_id: i64,
    pub username: String,
    pub team_ids: Vec<i64>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("pick has {got} teams, tournament allows at most {max}")]
    TooManyTeams { got: usize, max: u32 },

    #[error("pick costs {cost}, tournament budget is {max}")]
    OverBudget { cost: u32, max: u32 },
}

/// Validate a proposed selection against the tournament's bounds.
///
/// The cost is summed over catalog teams the selection actually references;
/// ids absent from the catalog contribute nothing here and are caught later,
/// at scoring time, as a data-integrity error.
pub fn validate_selection(
    team_ids: &[i64],
    tournament: &Tournament,
    catalog: &[Team],
) -> Result<(), SelectionError> {
    if team_ids.len() > tournament.max_teams as usize {
        return Err(SelectionError::TooManyTeams {
            got: team_ids.len(),
            max: tournament.max_teams,
        });
    }

    let cost: u32 = catalog
        .iter()
        .filter(|team| team_ids.contains(&team.id))
        .map(|team| team.price)
        .sum();

    if cost > tournament.max_price {
        return Err(SelectionError::OverBudget {
            cost,
            max: tournament.max_price,
        });
    }

    Ok(())
}
