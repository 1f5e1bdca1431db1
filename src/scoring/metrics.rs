// Tournament analytics: per-team price-vs-performance deviation and
// tournament-wide prediction quality.
//
// A team's price doubles as the organizer's performance prediction, so the
// spread between price and scored points measures how well the pricing
// tracked reality. The bias term separates a systematic misjudgment of the
// whole field (every team over- or under-priced) from per-team error.

use serde::Serialize;

use crate::scoring::round1;
use crate::tournament::team::Team;

/// Price-vs-performance line for one team.
#[derive(Debug, Clone, Serialize)]
pub struct TeamStats {
    pub id: i64,
    pub name: String,
    pub price: u32,
    pub points: u32,
    /// `points - price`; positive when the team outperformed its price.
    pub difference: i64,
}

/// Tournament-wide prediction quality.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TournamentMetrics {
    /// 0-100 score for how closely prices tracked points after bias
    /// correction. 100 means perfect, 0 means off by at least the
    /// reasonable-error ceiling on average.
    pub accuracy: f64,
    /// Mean of (actual - predicted). Positive means outcomes beat the
    /// prices, i.e. the field was easier than priced.
    pub difficulty_bias: f64,
}

/// Predicted (price) vs. actual (points) figures for one team.
#[derive(Debug, Clone, Copy)]
pub struct TeamResult {
    pub team_id: i64,
    pub predicted: u32,
    pub actual: u32,
}

/// Fraction of the tournament's top score treated as a "reasonable" mean
/// error; at this error level accuracy bottoms out at 0.
const REASONABLE_ERROR_FRACTION: f64 = 0.15;

/// Per-team price/points deltas, ordered by points descending with name
/// ascending as the tie-break.
pub fn team_stats(teams: &[Team]) -> Vec<TeamStats> {
    let mut stats: Vec<TeamStats> = teams
        .iter()
        .map(|team| TeamStats {
            id: team.id,
            name: team.name.clone(),
            price: team.price,
            points: team.points,
            difference: team.points as i64 - team.price as i64,
        })
        .collect();
    stats.sort_by(|a, b| b.points.cmp(&a.points).then_with(|| a.name.cmp(&b.name)));
    stats
}

/// Compute the tournament-wide bias and accuracy figures.
///
/// 1. `difficulty_bias` = mean(actual - predicted).
/// 2. MAE = mean of |actual - predicted - difficulty_bias|.
/// 3. Accuracy = 100 * (1 - MAE / (max_points * 0.15)), floored at 0.
///
/// An empty team set or a zero error ceiling (nothing scored yet) is a
/// degenerate input, reported as zeroed metrics rather than an error.
pub fn tournament_metrics(results: &[TeamResult], max_points: u32) -> TournamentMetrics {
    if results.is_empty() {
        return TournamentMetrics {
            accuracy: 0.0,
            difficulty_bias: 0.0,
        };
    }

    let n = results.len() as f64;
    let difficulty_bias = results
        .iter()
        .map(|r| r.actual as f64 - r.predicted as f64)
        .sum::<f64>()
        / n;

    let mae = results
        .iter()
        .map(|r| (r.actual as f64 - r.predicted as f64 - difficulty_bias).abs())
        .sum::<f64>()
        / n;

    let ceiling = max_points as f64 * REASONABLE_ERROR_FRACTION;
    let accuracy = if ceiling > 0.0 {
        (100.0 * (1.0 - mae / ceiling)).max(0.0)
    } else {
        0.0
    };

    TournamentMetrics {
        accuracy: round1(accuracy),
        difficulty_bias: round1(difficulty_bias),
    }
}
