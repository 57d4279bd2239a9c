use std::collections::HashMap;

use crate::error::StoreError;
use crate::storage::{RecordStore, Row, Table};

/// Process-local store used by tests and dry runs.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    tables: HashMap<Table, Vec<Row>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row_count(&self, table: Table) -> usize {
        self.tables.get(&table).map_or(0, Vec::len)
    }
}

impl RecordStore for MemoryStore {
    fn load_all(&self, table: Table) -> Result<Vec<Row>, StoreError> {
        Ok(self.tables.get(&table).cloned().unwrap_or_default())
    }

    fn append_one(&mut self, table: Table, row: Row) -> Result<(), StoreError> {
        table.check_width(&row)?;
        self.tables.entry(table).or_default().push(row);
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
        self.tables.insert(table, rows);
        Ok(())
    }
}
