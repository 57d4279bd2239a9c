use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::StoreError;
use crate::storage::{RecordStore, Row, Table};

/// Flat-file store: one CSV file with a header row per table.
#[derive(Debug, Clone)]
pub struct CsvStore {
    dir: PathBuf,
}

impl CsvStore {
    /// Open a store rooted at `dir`, creating the directory and any missing
    /// table files with their header rows.
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;
        let store = Self {
            dir: dir.to_path_buf(),
        };

        for table in Table::ALL {
            let path = store.path_for(table);
            if !path.exists() {
                store.write_table(table, &[])?;
            }
        }

        Ok(store)
    }

    pub fn path_for(&self, table: Table) -> PathBuf {
        self.dir.join(format!("{}.csv", table.name()))
    }

    fn write_table(&self, table: Table, rows: &[Row]) -> Result<(), StoreError> {
        let path = self.path_for(table);
        let tmp_path = path.with_extension("csv.tmp");

        {
            let mut writer = csv::Writer::from_path(&tmp_path)?;
            writer.write_record(table.schema())?;
            for row in rows {
                writer.write_record(row)?;
            }
            writer.flush().map_err(|e| StoreError::io(&tmp_path, e))?;
        }

        fs::rename(&tmp_path, &path).map_err(|e| StoreError::io(&path, e))?;
        Ok(())
    }
}

impl RecordStore for CsvStore {
    fn load_all(&self, table: Table) -> Result<Vec<Row>, StoreError> {
        let path = self.path_for(table);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(&path)?;
        let headers = reader.headers()?.clone();
        let found: Vec<&str> = headers.iter().collect();
        table.check_schema(&found)?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }
        Ok(rows)
    }

    fn append_one(&mut self, table: Table, row: Row) -> Result<(), StoreError> {
        table.check_width(&row)?;
        let path = self.path_for(table);
        let needs_header = fs::metadata(&path).map(|m| m.len() == 0).unwrap_or(true);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| StoreError::io(&path, e))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if needs_header {
            writer.write_record(table.schema())?;
        }
        writer.write_record(&row)?;
        writer.flush().map_err(|e| StoreError::io(&path, e))?;

        debug!(table = table.name(), path = %path.display(), "appended row");
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
        self.write_table(table, &rows)?;
        debug!(table = table.name(), rows = rows.len(), "replaced table");
        Ok(())
    }
}
