use chrono::Utc;
use rusqlite::Connection;
use tracing::info;

use crate::error::AppResult;

const USER_VERSION: i32 = 2;

pub fn run(conn: &Connection) -> AppResult<()> {
    // Ensure migration history table exists
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS migration_history (
            version INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            applied_at TEXT NOT NULL
        );
        "#,
    )?;

    let mut current_version: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

    if current_version < 1 {
        info!(target: "app::db", version = current_version, "running migration v1");
        migrate_to_v1(conn)?;
        current_version = 1;
        conn.execute(&format!("PRAGMA user_version = {}", current_version), [])?;
        record_migration(conn, 1, "Add productivity baselines and engine settings")?;
    }

    if current_version < 2 {
        info!(target: "app::db", version = current_version, "running migration v2");
        migrate_to_v2(conn)?;
        current_version = 2;
        conn.execute(&format!("PRAGMA user_version = {}", current_version), [])?;
        record_migration(conn, 2, "Add derived productivity entries and analytics")?;
    }

    if current_version != USER_VERSION {
        conn.execute(&format!("PRAGMA user_version = {}", USER_VERSION), [])?;
    }

    Ok(())
}

fn record_migration(conn: &Connection, version: i32, description: &str) -> AppResult<()> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT OR REPLACE INTO migration_history (version, description, applied_at) VALUES (?, ?, ?)",
        (version, description, now),
    )?;
    Ok(())
}

fn migrate_to_v1(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS productivity_baselines (
            cost_code_id TEXT PRIMARY KEY,
            baseline_unit_rate REAL NOT NULL,
            set_at TEXT NOT NULL,
            FOREIGN KEY (cost_code_id) REFERENCES cost_codes(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS engine_settings (
            id TEXT PRIMARY KEY,
            average_labor_rate REAL NOT NULL,
            crew_hours_per_day REAL NOT NULL,
            at_risk_index_threshold REAL NOT NULL,
            complete_pct_threshold REAL NOT NULL,
            trend_window INTEGER NOT NULL,
            trend_stable_band_pct REAL NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )?;

    Ok(())
}

fn migrate_to_v2(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS productivity_entries (
            id TEXT PRIMARY KEY,
            project_id TEXT NOT NULL,
            cost_code_id TEXT NOT NULL,
            entry_date TEXT NOT NULL,
            quantity REAL NOT NULL,
            labor_hours REAL NOT NULL,
            unit_rate REAL NOT NULL,
            source TEXT NOT NULL,
            source_log_id TEXT,
            created_at TEXT NOT NULL,
            FOREIGN KEY (cost_code_id) REFERENCES cost_codes(id) ON DELETE CASCADE
        );
        CREATE INDEX IF NOT EXISTS idx_productivity_entries_project
            ON productivity_entries(project_id, cost_code_id, entry_date);
        CREATE INDEX IF NOT EXISTS idx_productivity_entries_source_log
            ON productivity_entries(source_log_id);

        CREATE TABLE IF NOT EXISTS productivity_analytics (
            cost_code_id TEXT NOT NULL,
            period_type TEXT NOT NULL,
            project_id TEXT NOT NULL,
            period_end TEXT NOT NULL,
            peak_unit_rate REAL NOT NULL,
            average_unit_rate REAL NOT NULL,
            low_unit_rate REAL NOT NULL,
            standard_deviation REAL NOT NULL,
            total_labor_hours REAL NOT NULL,
            total_quantity REAL NOT NULL,
            cost_variance REAL,
            schedule_variance_days REAL,
            planned_vs_actual_variance REAL,
            PRIMARY KEY (cost_code_id, period_type),
            FOREIGN KEY (cost_code_id) REFERENCES cost_codes(id) ON DELETE CASCADE
        );
        CREATE INDEX IF NOT EXISTS idx_productivity_analytics_project
            ON productivity_analytics(project_id, period_type);
        "#,
    )?;

    Ok(())
}
