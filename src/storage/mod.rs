// Record store abstraction and its backends
pub mod csv_store;
pub mod memory;
pub mod migrations;
pub mod sqlite;

use crate::error::{AttendanceError, StoreError};

pub use csv_store::CsvStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

pub const STUDENT_FIELDS: [&str; 8] = [
    "student_id",
    "name",
    "programme",
    "part",
    "course_code",
    "group",
    "phone",
    "email",
];

pub const ATTENDANCE_FIELDS: [&str; 8] = [
    "student_id",
    "name",
    "course_code",
    "group",
    "week",
    "class_label",
    "hours",
    "date",
];

pub const ALERT_FIELDS: [&str; 9] = [
    "student_id",
    "name",
    "course_code",
    "group",
    "percent",
    "count",
    "sent7",
    "sent10",
    "sent15",
];

/// A record as stored: one string per schema field, in schema order.
pub type Row = Vec<String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Students,
    AttendanceEvents,
    AlertState,
}

impl Table {
    pub const ALL: [Table; 3] = [Table::Students, Table::AttendanceEvents, Table::AlertState];

    pub fn name(self) -> &'static str {
        match self {
            Table::Students => "students",
            Table::AttendanceEvents => "attendance",
            Table::AlertState => "alerts",
        }
    }

    /// Field order is fixed for serialization compatibility.
    pub fn schema(self) -> &'static [&'static str] {
        match self {
            Table::Students => &STUDENT_FIELDS,
            Table::AttendanceEvents => &ATTENDANCE_FIELDS,
            Table::AlertState => &ALERT_FIELDS,
        }
    }

    pub fn check_schema(self, schema: &[&str]) -> Result<(), StoreError> {
        if schema != self.schema() {
            return Err(StoreError::schema_mismatch(self.name(), self.schema(), schema));
        }
        Ok(())
    }

    pub fn check_width(self, row: &[String]) -> Result<(), StoreError> {
        let expected = self.schema().len();
        if row.len() != expected {
            return Err(StoreError::RowWidth {
                table: self.name(),
                expected,
                found: row.len(),
            });
        }
        Ok(())
    }
}

/// Durable tabular storage for the three attendance tables.
///
/// Implementations keep insertion order and never interpret field values;
/// parsing happens in [`TableRecord::from_row`]. There is no locking: callers
/// serialize writers.
pub trait RecordStore {
    fn load_all(&self, table: Table) -> Result<Vec<Row>, StoreError>;

    fn append_one(&mut self, table: Table, row: Row) -> Result<(), StoreError>;

    /// Replace the entire table. `schema` must equal the table's schema.
    fn replace_all(&mut self, table: Table, rows: Vec<Row>, schema: &[&str])
    -> Result<(), StoreError>;
}

impl<S: RecordStore + ?Sized> RecordStore for Box<S> {
    fn load_all(&self, table: Table) -> Result<Vec<Row>, StoreError> {
        (**self).load_all(table)
    }

    fn append_one(&mut self, table: Table, row: Row) -> Result<(), StoreError> {
        (**self).append_one(table, row)
    }

    fn replace_all(
        &mut self,
        table: Table,
        rows: Vec<Row>,
        schema: &[&str],
    ) -> Result<(), StoreError> {
        (**self).replace_all(table, rows, schema)
    }
}

/// Conversion between a domain record and its stored row.
pub trait TableRecord: Sized {
    const TABLE: Table;

    fn from_row(row: &[String]) -> Result<Self, AttendanceError>;

    fn to_row(&self) -> Row;
}

/// Typed access on top of any [`RecordStore`].
pub trait RecordStoreExt: RecordStore {
    fn load_records<T: TableRecord>(&self) -> Result<Vec<T>, AttendanceError> {
        self.load_all(T::TABLE)?
            .iter()
            .map(|row| T::from_row(row))
            .collect()
    }

    fn append_record<T: TableRecord>(&mut self, record: &T) -> Result<(), AttendanceError> {
        self.append_one(T::TABLE, record.to_row())?;
        Ok(())
    }

    fn replace_records<T: TableRecord>(&mut self, records: &[T]) -> Result<(), AttendanceError> {
        let rows = records.iter().map(TableRecord::to_row).collect();
        self.replace_all(T::TABLE, rows, T::TABLE.schema())?;
        Ok(())
    }
}

impl<S: RecordStore + ?Sized> RecordStoreExt for S {}

#[cfg(test)]
pub(crate) fn to_row(fields: &[&str]) -> Row {
    fields.iter().map(|field| field.to_string()).collect()
}
