use crate::{SqlWriter, Value};
use std::fmt::Write;

/// PostgreSQL dialect: `$n` placeholders, native `ON CONFLICT`, `RETURNING`.
pub struct PostgresSqlWriter;

impl PostgresSqlWriter {
    pub const fn new() -> Self {
        Self {}
    }
}

impl Default for PostgresSqlWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlWriter for PostgresSqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }

    fn dialect(&self) -> &'static str {
        "postgres"
    }

    fn supports_conflict_clause(&self) -> bool {
        true
    }

    fn returns_inserted_id(&self) -> bool {
        true
    }

    fn write_placeholder(&self, out: &mut String, index: usize) {
        out.push('$');
        let mut buffer = itoa::Buffer::new();
        out.push_str(buffer.format(index));
    }

    fn write_column_type(&self, out: &mut String, value: &Value) {
        match value {
            Value::Boolean(..) => out.push_str("BOOLEAN"),
            Value::Int16(..) => out.push_str("SMALLINT"),
            Value::Int32(..) => out.push_str("INTEGER"),
            Value::Int64(..) => out.push_str("BIGINT"),
            Value::Float64(..) => out.push_str("DOUBLE PRECISION"),
            Value::Decimal(.., precision, scale) => {
                out.push_str("NUMERIC");
                if (precision, scale) != (&0, &0) {
                    let _ = write!(out, "({},{})", precision, scale);
                }
            }
            Value::Varchar(..) => out.push_str("TEXT"),
            Value::Blob(..) => out.push_str("BYTEA"),
            Value::Date(..) => out.push_str("DATE"),
            Value::Timestamp(..) => out.push_str("TIMESTAMP"),
            Value::Uuid(..) => out.push_str("UUID"),
            Value::Null => panic!("cannot derive a column type from Value::Null"),
        }
    }
}
