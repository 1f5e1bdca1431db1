// SQLite persistence layer for tournaments, teams, picks, and the
// ideal-pick cache.

use std::sync::{Mutex, MutexGuard};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::tournament::pick::PickSnapshot;
use crate::tournament::team::Team;
use crate::tournament::Tournament;

/// SQLite-backed persistence for tournaments, team catalogs, users, player
/// picks, and cached ideal picks.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a SQLite database at `path` and ensure all tables
    /// exist. Pass `":memory:"` for an ephemeral in-memory database (useful
    /// for tests).
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;
             PRAGMA foreign_keys = ON;",
        )
        .context("failed to set database pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS tournaments (
                id        INTEGER PRIMARY KEY AUTOINCREMENT,
                slug      TEXT NOT NULL UNIQUE,
                title     TEXT NOT NULL,
                max_teams INTEGER NOT NULL,
                max_price INTEGER NOT NULL,
                deadline  TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS teams (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                tournament_id INTEGER NOT NULL REFERENCES tournaments(id),
                name          TEXT NOT NULL,
                price         INTEGER NOT NULL,
                points        INTEGER NOT NULL DEFAULT 0,
                UNIQUE(tournament_id, name)
            );

            CREATE TABLE IF NOT EXISTS users (
                id   INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE
            );

            CREATE TABLE IF NOT EXISTS picks (
                user_id       INTEGER NOT NULL REFERENCES users(id),
                tournament_id INTEGER NOT NULL REFERENCES tournaments(id),
                team_ids      TEXT NOT NULL,
                version       INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (user_id, tournament_id)
            );

            CREATE TABLE IF NOT EXISTS ideal_picks (
                tournament_id INTEGER PRIMARY KEY REFERENCES tournaments(id),
                team_ids      TEXT NOT NULL,
                points        INTEGER NOT NULL
            );
            ",
        )
        .context("failed to create database schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the database connection.
    ///
    /// Panics if the mutex is poisoned (another thread panicked while
    /// holding the lock). This should never happen in normal operation.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database mutex poisoned")
    }

    // ------------------------------------------------------------------
    // Tournaments
    // ------------------------------------------------------------------

    /// Create a tournament and return its row id. The cardinality and
    /// budget bounds must both be at least 1.
    pub fn create_tournament(
        &self,
        slug: &str,
        title: &str,
        max_teams: u32,
        max_price: u32,
        deadline: DateTime<Utc>,
    ) -> Result<i64> {
        if max_teams == 0 {
            bail!("max_teams must be at least 1");
        }
        if max_price == 0 {
            bail!("max_price must be at least 1");
        }

        let conn = self.conn();
        let id: i64 = conn
            .query_row(
                "INSERT INTO tournaments (slug, title, max_teams, max_price, deadline)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 RETURNING id",
                params![slug, title, max_teams, max_price, deadline.to_rfc3339()],
                |row| row.get(0),
            )
            .context("failed to create tournament")?;
        Ok(id)
    }

    /// Fetch a tournament by id. Returns `None` if no such row exists.
    pub fn fetch_tournament(&self, tournament_id: i64) -> Result<Option<Tournament>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, slug, title, max_teams, max_price, deadline
             FROM tournaments WHERE id = ?1",
            params![tournament_id],
            Self::tournament_from_row,
        )
        .optional()
        .context("failed to fetch tournament")
    }

    /// Fetch a tournament by its URL slug. Returns `None` if no such row
    /// exists.
    pub fn fetch_tournament_by_slug(&self, slug: &str) -> Result<Option<Tournament>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, slug, title, max_teams, max_price, deadline
             FROM tournaments WHERE slug = ?1",
            params![slug],
            Self::tournament_from_row,
        )
        .optional()
        .context("failed to fetch tournament by slug")
    }

    /// Load all tournaments, ordered by id.
    pub fn fetch_tournaments(&self) -> Result<Vec<Tournament>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT id, slug, title, max_teams, max_price, deadline
                 FROM tournaments ORDER BY id",
            )
            .context("failed to prepare tournament query")?;

        let tournaments = stmt
            .query_map([], Self::tournament_from_row)
            .context("failed to query tournaments")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map tournament rows")?;
        Ok(tournaments)
    }

    fn tournament_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Tournament> {
        let deadline_text: String = row.get(5)?;
        let deadline = DateTime::parse_from_rfc3339(&deadline_text)
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    5,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?
            .with_timezone(&Utc);
        Ok(Tournament {
            id: row.get(0)?,
            slug: row.get(1)?,
            title: row.get(2)?,
            max_teams: row.get(3)?,
            max_price: row.get(4)?,
            deadline,
        })
    }

    // ------------------------------------------------------------------
    // Teams
    // ------------------------------------------------------------------

    /// Add a team to a tournament's catalog and return its row id. Points
    /// start at 0 until results are ingested.
    pub fn add_team(&self, tournament_id: i64, name: &str, price: u32) -> Result<i64> {
        let conn = self.conn();
        let id: i64 = conn
            .query_row(
                "INSERT INTO teams (tournament_id, name, price) VALUES (?1, ?2, ?3)
                 RETURNING id",
                params![tournament_id, name, price],
                |row| row.get(0),
            )
            .context("failed to add team")?;
        Ok(id)
    }

    /// Load a tournament's team catalog in id order. The fixed ordering
    /// keeps the ideal-pick computation reproducible across invocations.
    pub fn fetch_teams(&self, tournament_id: i64) -> Result<Vec<Team>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT id, name, price, points FROM teams
                 WHERE tournament_id = ?1 ORDER BY id",
            )
            .context("failed to prepare team query")?;

        let teams = stmt
            .query_map(params![tournament_id], |row| {
                Ok(Team {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    price: row.get(2)?,
                    points: row.get(3)?,
                })
            })
            .context("failed to query teams")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map team rows")?;
        Ok(teams)
    }

    /// Overwrite team points from a result-ingestion cycle in a single
    /// transaction. Each entry is (team_id, points). Re-ingestion simply
    /// overwrites the previous points.
    pub fn ingest_results(&self, results: &[(i64, u32)]) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction().context("failed to begin transaction")?;
        for &(team_id, points) in results {
            let updated = tx
                .execute(
                    "UPDATE teams SET points = ?1 WHERE id = ?2",
                    params![points, team_id],
                )
                .context("failed to update team points")?;
            if updated == 0 {
                bail!("cannot ingest results for non-existent team {team_id}");
            }
        }
        tx.commit().context("failed to commit result ingestion")?;
        Ok(())
    }

    /// Delete a team from the catalog. Stored picks referencing it are left
    /// in place; scoring them afterwards fails with a data-integrity error.
    pub fn remove_team(&self, team_id: i64) -> Result<()> {
        let conn = self.conn();
        conn.execute("DELETE FROM teams WHERE id = ?1", params![team_id])
            .context("failed to remove team")?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    /// Insert a user or return the existing row for the same name, in a
    /// single atomic statement.
    pub fn upsert_user(&self, name: &str) -> Result<i64> {
        let conn = self.conn();
        let id: i64 = conn
            .query_row(
                "INSERT INTO users (name) VALUES (?1)
                 ON CONFLICT(name) DO UPDATE SET name = excluded.name
                 RETURNING id",
                params![name],
                |row| row.get(0),
            )
            .context("failed to upsert user")?;
        Ok(id)
    }

    // ------------------------------------------------------------------
    // Picks
    // ------------------------------------------------------------------

    /// Store a player's selection for a tournament. The team-id list is
    /// serialized as a JSON array. An existing pick is only overwritten
    /// when `version` is strictly greater than the stored one; returns
    /// whether the write happened.
    pub fn save_pick(
        &self,
        user_id: i64,
        tournament_id: i64,
        team_ids: &[i64],
        version: i64,
    ) -> Result<bool> {
        let conn = self.conn();
        let team_ids_json =
            serde_json::to_string(team_ids).context("failed to serialize team ids")?;
        let changed = conn
            .execute(
                "INSERT INTO picks (user_id, tournament_id, team_ids, version)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(user_id, tournament_id) DO UPDATE SET
                    team_ids = excluded.team_ids,
                    version  = excluded.version
                 WHERE excluded.version > picks.version",
                params![user_id, tournament_id, team_ids_json, version],
            )
            .context("failed to save pick")?;
        Ok(changed > 0)
    }

    /// Load all non-empty picks for a tournament joined with usernames,
    /// ordered by user id. Empty selections represent "no pick made" and
    /// never reach the scoring engines.
    pub fn load_picks(&self, tournament_id: i64) -> Result<Vec<PickSnapshot>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT p.user_id, u.name, p.team_ids
                 FROM picks p JOIN users u ON u.id = p.user_id
                 WHERE p.tournament_id = ?1 AND p.team_ids != '[]'
                 ORDER BY p.user_id",
            )
            .context("failed to prepare pick query")?;

        let rows = stmt
            .query_map(params![tournament_id], |row| {
                let user_id: i64 = row.get(0)?;
                let username: String = row.get(1)?;
                let team_ids_json: String = row.get(2)?;
                Ok((user_id, username, team_ids_json))
            })
            .context("failed to query picks")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map pick rows")?;

        rows.into_iter()
            .map(|(user_id, username, team_ids_json)| {
                let team_ids: Vec<i64> = serde_json::from_str(&team_ids_json)
                    .context("failed to deserialize pick team ids")?;
                Ok(PickSnapshot {
                    user_id,
                    username,
                    team_ids,
                })
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // Ideal-pick cache
    // ------------------------------------------------------------------

    /// Store the computed ideal pick for a tournament. Uses INSERT OR
    /// REPLACE, so there is exactly one cache row per tournament and
    /// concurrent recomputations converge on the last writer.
    pub fn save_ideal_pick(&self, tournament_id: i64, team_ids: &[i64], points: u32) -> Result<()> {
        let conn = self.conn();
        let team_ids_json =
            serde_json::to_string(team_ids).context("failed to serialize ideal pick team ids")?;
        conn.execute(
            "INSERT OR REPLACE INTO ideal_picks (tournament_id, team_ids, points)
             VALUES (?1, ?2, ?3)",
            params![tournament_id, team_ids_json, points],
        )
        .context("failed to save ideal pick")?;
        Ok(())
    }

    /// Load the cached ideal pick for a tournament, as (team ids, points).
    /// Returns `None` if it has not been computed yet.
    pub fn load_ideal_pick(&self, tournament_id: i64) -> Result<Option<(Vec<i64>, u32)>> {
        let conn = self.conn();
        let row: Option<(String, u32)> = conn
            .query_row(
                "SELECT team_ids, points FROM ideal_picks WHERE tournament_id = ?1",
                params![tournament_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .context("failed to load ideal pick")?;

        match row {
            Some((team_ids_json, points)) => {
                let team_ids: Vec<i64> = serde_json::from_str(&team_ids_json)
                    .context("failed to deserialize ideal pick team ids")?;
                Ok(Some((team_ids, points)))
            }
            None => Ok(None),
        }
    }
}
