use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, params_from_iter};
use tracing::debug;

use crate::error::StoreError;
use crate::storage::migrations::apply_migrations;
use crate::storage::{RecordStore, Row, Table};

/// SQLite-backed record store. Every field is stored as TEXT in schema order.
pub struct SqliteStore {
    connection: Connection,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("connection", &"<SQLite Connection>")
            .finish()
    }
}

impl SqliteStore {
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create database directory: {}", parent.display())
            })?;
        }

        let connection = Connection::open(path)
            .with_context(|| format!("Failed to open database at: {}", path.display()))?;

        connection
            .execute_batch(
                "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = memory;
        ",
            )
            .context("Failed to configure SQLite pragmas")?;

        Self::from_connection(connection)
    }

    pub fn in_memory() -> Result<Self> {
        let connection =
            Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::from_connection(connection)
    }

    fn from_connection(connection: Connection) -> Result<Self> {
        apply_migrations(&connection).context("Failed to apply database migrations")?;
        Ok(Self { connection })
    }
}

fn column_list(table: Table) -> String {
    table
        .schema()
        .iter()
        .map(|field| format!("\"{field}\""))
        .collect::<Vec<_>>()
        .join(", ")
}

fn insert_sql(table: Table) -> String {
    let placeholders = (1..=table.schema().len())
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table.name(),
        column_list(table),
        placeholders
    )
}

impl RecordStore for SqliteStore {
    fn load_all(&self, table: Table) -> Result<Vec<Row>, StoreError> {
        let width = table.schema().len();
        let sql = format!(
            "SELECT {} FROM {} ORDER BY seq",
            column_list(table),
            table.name()
        );
        let mut stmt = self.connection.prepare(&sql)?;

        let rows = stmt.query_map([], |row| {
            (0..width)
                .map(|i| row.get::<_, String>(i))
                .collect::<rusqlite::Result<Row>>()
        })?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    fn append_one(&mut self, table: Table, row: Row) -> Result<(), StoreError> {
        table.check_width(&row)?;
        self.connection
            .execute(&insert_sql(table), params_from_iter(row.iter()))?;
        debug!(table = table.name(), "appended row");
        Ok(())
    }

    fn replace_all(
        &mut self,
        table: Table,
        rows: Vec<Row>,
        schema: &[&str],
    ) -> Result<(), StoreError> {
        table.check_schema(schema)?;
        for row in &rows {
            table.check_width(row)?;
        }

        let tx = self.connection.transaction()?;
        tx.execute(&format!("DELETE FROM {}", table.name()), [])?;
        {
            let mut stmt = tx.prepare(&insert_sql(table))?;
            for row in &rows {
                stmt.execute(params_from_iter(row.iter()))?;
            }
        }
        tx.commit()?;

        debug!(table = table.name(), rows = rows.len(), "replaced table");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{ALERT_FIELDS, to_row};
    use tempfile::TempDir;

    fn alert_row(student_id: &str) -> Row {
        to_row(&[student_id, "Tariro", "CS201", "A", "7.5", "1", "yes", "", ""])
    }

    #[test]
    fn test_database_persists_across_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("nested").join("aamas.db");

        let mut store = SqliteStore::new(&db_path).unwrap();
        assert!(db_path.exists());
        store
            .append_one(Table::AlertState, alert_row("S1"))
            .unwrap();

        drop(store);
        let reopened = SqliteStore::new(&db_path).unwrap();
        let rows = reopened.load_all(Table::AlertState).unwrap();
        assert_eq!(rows, vec![alert_row("S1")]);
    }

    #[test]
    fn test_replace_all_swaps_contents_in_order() {
        let mut store = SqliteStore::in_memory().unwrap();
        store
            .append_one(Table::AlertState, alert_row("OLD"))
            .unwrap();

        store
            .replace_all(
                Table::AlertState,
                vec![alert_row("S2"), alert_row("S1")],
                &ALERT_FIELDS,
            )
            .unwrap();

        let ids: Vec<String> = store
            .load_all(Table::AlertState)
            .unwrap()
            .into_iter()
            .map(|row| row[0].clone())
            .collect();
        assert_eq!(ids, vec!["S2", "S1"]);
    }

    #[test]
    fn test_replace_all_rejects_bad_row_without_writing() {
        let mut store = SqliteStore::in_memory().unwrap();
        store
            .append_one(Table::AlertState, alert_row("KEEP"))
            .unwrap();

        let result = store.replace_all(
            Table::AlertState,
            vec![alert_row("S1"), to_row(&["S2"])],
            &ALERT_FIELDS,
        );
        assert!(matches!(result, Err(StoreError::RowWidth { .. })));

        let rows = store.load_all(Table::AlertState).unwrap();
        assert_eq!(rows, vec![alert_row("KEEP")]);
    }

    #[test]
    fn test_group_column_is_quoted() {
        let mut store = SqliteStore::in_memory().unwrap();
        let row = to_row(&["S1", "Tariro", "CS201", "B", "3", "Lecture", "2", "2026-03-02"]);
        store.append_one(Table::AttendanceEvents, row.clone()).unwrap();
        assert_eq!(store.load_all(Table::AttendanceEvents).unwrap(), vec![row]);
    }
}
