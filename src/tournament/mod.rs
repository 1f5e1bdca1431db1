// Tournament domain types: the tournament itself, its team catalog, and
// player pick snapshots.

pub mod pick;
pub mod team;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A pick'em tournament: a team catalog with a per-player selection limit
/// (`max_teams`), a budget cap (`max_price`), and a deadline after which
/// selections lock and scoring becomes meaningful.
///
/// Invariant (enforced at creation): `max_teams >= 1` and `max_price >= 1`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tournament {
    pub id: i64,
    /// URL-friendly unique identifier (e.g. "pl-2024").
    pub slug: String,
    pub title: String,
    /// Maximum number of teams a single pick may contain.
    pub max_teams: u32,
    /// Maximum total price a single pick may spend.
    pub max_price: u32,
    /// Instant after which picks lock and results may be ingested.
    pub deadline: DateTime<Utc>,
}

impl Tournament {
    /// Whether the tournament has passed its deadline. Picks are rejected
    /// and the ideal pick becomes computable once this returns true.
    pub fn is_closed(&self) -> bool {
        Utc::now() >= self.deadline
    }
}
