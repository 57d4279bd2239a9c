use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::info;

pub struct Migration {
    pub version: i32,
    pub name: &'static str,
    pub sql: &'static str,
}

pub const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "attendance_tables",
    sql: include_str!("../../migrations/001_initial.sql"),
}];

pub fn get_schema_version(connection: &Connection) -> Result<i32> {
    connection
        .execute(
            "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER PRIMARY KEY, applied_at TEXT NOT NULL)",
            [],
        )
        .context("Failed to create schema_version table")?;

    let version = connection
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get::<_, i32>(0),
        )
        .context("Failed to read schema version")?;

    Ok(version)
}

pub fn apply_migrations(connection: &Connection) -> Result<()> {
    let current_version = get_schema_version(connection)?;

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(version = migration.version, name = migration.name, "applying migration");

            connection
                .execute_batch(migration.sql)
                .with_context(|| format!("Failed to apply migration {}", migration.version))?;

            connection
                .execute(
                    "INSERT OR REPLACE INTO schema_version (version, applied_at) VALUES (?1, ?2)",
                    rusqlite::params![migration.version, chrono::Utc::now().to_rfc3339()],
                )
                .with_context(|| {
                    format!("Failed to update schema version to {}", migration.version)
                })?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_test_connection() -> Connection {
        Connection::open_in_memory().unwrap()
    }

    fn attendance_table_count(conn: &Connection) -> i32 {
        conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN ('students', 'attendance', 'alerts')",
            [],
            |row| row.get(0),
        )
        .unwrap()
    }

    #[test]
    fn test_initial_schema_version() {
        let conn = setup_test_connection();
        assert_eq!(get_schema_version(&conn).unwrap(), 0);
    }

    #[test]
    fn test_migration_application() {
        let conn = setup_test_connection();
        apply_migrations(&conn).unwrap();

        assert_eq!(get_schema_version(&conn).unwrap(), 1);
        assert_eq!(attendance_table_count(&conn), 3);
    }

    #[test]
    fn test_idempotent_migrations() {
        let conn = setup_test_connection();
        apply_migrations(&conn).unwrap();
        apply_migrations(&conn).unwrap();

        assert_eq!(get_schema_version(&conn).unwrap(), 1);
        assert_eq!(attendance_table_count(&conn), 3);
    }

    #[test]
    fn test_migration_order() {
        for i in 1..MIGRATIONS.len() {
            assert!(MIGRATIONS[i].version > MIGRATIONS[i - 1].version);
        }
    }
}
