use crate::{SqlWriter, Value};

/// SQLite dialect: positional `?` placeholders, native `ON CONFLICT`,
/// `RETURNING` (3.35+).
pub struct SqliteSqlWriter;

impl SqliteSqlWriter {
    pub const fn new() -> Self {
        Self {}
    }
}

impl Default for SqliteSqlWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlWriter for SqliteSqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }

    fn dialect(&self) -> &'static str {
        "sqlite"
    }

    fn supports_conflict_clause(&self) -> bool {
        true
    }

    fn returns_inserted_id(&self) -> bool {
        true
    }

    fn write_column_type(&self, out: &mut String, value: &Value) {
        match value {
            Value::Boolean(..)
            | Value::Int16(..)
            | Value::Int32(..)
            | Value::Int64(..) => out.push_str("INTEGER"),
            Value::Float64(..) | Value::Decimal(..) => out.push_str("REAL"),
            Value::Varchar(..)
            | Value::Date(..)
            | Value::Timestamp(..)
            | Value::Uuid(..) => out.push_str("TEXT"),
            Value::Blob(..) => out.push_str("BLOB"),
            Value::Null => panic!("cannot derive a column type from Value::Null"),
        }
    }
}
