// Team catalog entry.

use serde::{Deserialize, Serialize};

/// A team that players can include in their picks.
///
/// `price` is fixed when the team is created or imported. `points` starts at
/// 0 and is overwritten by each result-ingestion cycle once the tournament
/// has finished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: i64,
    pub name: String,
    pub price: u32,
    pub points: u32,
}

/// Sort teams for display within a single pick: points descending, ties
/// broken by price descending. Presentation order only; never affects
/// scoring or ranking.
pub fn sort_for_display(teams: &mut [Team]) {
    teams.sort_by(|a, b| (b.points, b.price).cmp(&(a.points, a.price)));
}
