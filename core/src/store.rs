//! SQLite persistence for cross section splines.
//!
//! RULE: Only store.rs talks to the database.
//! The cache and the driver call store methods and never execute SQL.

use crate::{
    error::{EvgError, EvgResult},
    generator::AlgId,
    spline::Spline,
    spline_cache::{SplineCache, SplineKey},
};
use rusqlite::{params, Connection};

pub struct SplineStore {
    conn: Connection,
}

impl SplineStore {
    /// Open (or create) the spline database at `path`.
    pub fn open(path: &str) -> EvgResult<Self> {
        let conn = Connection::open(path)?;
        // WAL mode only matters for real files.
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> EvgResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> EvgResult<()> {
        self.conn.execute_batch(include_str!("../../migrations/001_splines.sql"))?;
        Ok(())
    }

    // ── Save ───────────────────────────────────────────────────

    /// Write every spline in `cache` under `build_id`. Existing rows with
    /// the same key are replaced. Returns the number of rows written.
    pub fn save_cache(&self, cache: &SplineCache, build_id: &str) -> EvgResult<usize> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT OR IGNORE INTO spline_build (build_id, created_at) VALUES (?1, ?2)",
            params![build_id, chrono::Utc::now().to_rfc3339()],
        )?;

        let entries = cache.snapshot();
        for (key, spline) in &entries {
            let knots: Vec<(f64, f64)> = spline.knots().collect();
            tx.execute(
                "INSERT OR REPLACE INTO xsec_spline
                 (alg_name, alg_config, interaction_key, build_id, log_e, n_knots, knots_json)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    key.alg.name,
                    key.alg.config,
                    key.interaction,
                    build_id,
                    spline.is_log_e(),
                    spline.n_knots() as i64,
                    serde_json::to_string(&knots)?,
                ],
            )?;
        }
        tx.commit()?;
        log::info!("Saved {} splines (build {build_id})", entries.len());
        Ok(entries.len())
    }

    // ── Load ───────────────────────────────────────────────────

    /// Pre-populate `cache` from the database. Keys already in the cache
    /// are left alone. Returns how many splines were added.
    pub fn load_into(&self, cache: &SplineCache) -> EvgResult<usize> {
        let mut stmt = self.conn.prepare(
            "SELECT alg_name, alg_config, interaction_key, log_e, knots_json
             FROM xsec_spline ORDER BY alg_name, alg_config, interaction_key",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, bool>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut added = 0;
        for (alg_name, alg_config, interaction, log_e, knots_json) in rows {
            let knots: Vec<(f64, f64)> = serde_json::from_str(&knots_json)?;
            let (x, y): (Vec<f64>, Vec<f64>) = knots.into_iter().unzip();
            let spline = Spline::from_knots(x, y, log_e).map_err(|e| {
                EvgError::Other(anyhow::anyhow!(
                    "corrupt spline row {alg_name}/{alg_config} @ {interaction}: {e}"
                ))
            })?;
            let key = SplineKey {
                alg: AlgId::new(alg_name, alg_config),
                interaction,
            };
            if cache.insert(key, spline) {
                added += 1;
            }
        }
        log::info!("Loaded {added} splines into the cache");
        Ok(added)
    }

    pub fn spline_count(&self) -> EvgResult<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM xsec_spline",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
