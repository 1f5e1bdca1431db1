// Popularity aggregator: how often each team appears across player picks.

use serde::Serialize;

use crate::scoring::round1;
use crate::tournament::team::Team;

/// Pick frequency for one catalog team.
#[derive(Debug, Clone, Serialize)]
pub struct TeamPopularity {
    pub team: Team,
    /// Number of players whose pick contains this team.
    pub count: usize,
    /// `count` as a share of all players with a non-empty pick, in percent,
    /// rounded to one decimal.
    pub percentage: f64,
}

/// Aggregate pick frequencies over the team catalog.
///
/// Empty selections represent "no pick made" rather than a deliberate
/// zero-team strategy, so they are excluded from the denominator. With no
/// non-empty picks at all, every percentage is 0. Output is ordered by
/// count descending; the sort is stable, so ties keep catalog order.
pub fn popularity(picks: &[Vec<i64>], teams: &[Team]) -> Vec<TeamPopularity> {
    let counted: Vec<&Vec<i64>> = picks.iter().filter(|ids| !ids.is_empty()).collect();
    let total = counted.len();

    let mut rows: Vec<TeamPopularity> = teams
        .iter()
        .map(|team| {
            let count = counted.iter().filter(|ids| ids.contains(&team.id)).count();
            let percentage = if total == 0 {
                0.0
            } else {
                round1(count as f64 / total as f64 * 100.0)
            };
            TeamPopularity {
                team: team.clone(),
                count,
                percentage,
            }
        })
        .collect();

    rows.sort_by(|a, b| b.count.cmp(&a.count));
    rows
}
