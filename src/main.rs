// Pick'em rescoring entry point.
//
// Startup sequence:
// 1. Initialize tracing
// 2. Load config
// 3. Open database
// 4. For every closed tournament: refresh the ideal-pick cache and log a
//    leaderboard summary

use anyhow::Context;
use tracing::info;

use pickem::config;
use pickem::db;
use pickem::service;

fn main() -> anyhow::Result<()> {
    init_tracing()?;
    info!("Pick'em rescoring starting up");

    let config = config::load_config().context("failed to load configuration")?;
    info!("Config loaded: database={}", config.db_path);

    let db = db::Database::open(&config.db_path).context("failed to open database")?;

    let tournaments = db.fetch_tournaments().context("failed to list tournaments")?;
    info!("Found {} tournament(s)", tournaments.len());

    for tournament in &tournaments {
        if !tournament.is_closed() {
            info!(
                "Skipping '{}' ({}): still open until {}",
                tournament.title, tournament.slug, tournament.deadline
            );
            continue;
        }

        service::update_ideal_pick(&db, tournament.id)
            .with_context(|| format!("failed to update ideal pick for '{}'", tournament.slug))?;

        let ideal = service::fetch_ideal_pick(&db, tournament.id)
            .with_context(|| format!("failed to read ideal pick for '{}'", tournament.slug))?;
        let results = service::fetch_tournament_results(&db, tournament.id)
            .with_context(|| format!("failed to rank results for '{}'", tournament.slug))?;

        info!(
            "'{}': ideal pick scores {} points; {} ranked player(s)",
            tournament.title,
            ideal.points,
            results.len()
        );
        for result in &results {
            info!(
                "  #{} {} - {} points ({} teams)",
                result.rank,
                result.username,
                result.points,
                result.teams.len()
            );
        }
    }

    info!("Rescoring finished");
    Ok(())
}

/// Initialize tracing with an env-filter (RUST_LOG) driven fmt subscriber.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pickem=info")),
        )
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
