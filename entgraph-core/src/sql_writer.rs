use crate::{ColumnDef, DefaultValue, JoinTableDef, TableDef, Value, util::separated_by};
use std::fmt::Write;
use time::{Date, Time};

macro_rules! write_integer {
    ($out:ident, $value:expr) => {{
        let mut buffer = itoa::Buffer::new();
        $out.push_str(buffer.format($value));
    }};
}

/// Dialect capability descriptor and rendering strategy.
///
/// One implementation per dialect family; the statement builder drives the
/// trait and never branches on the dialect itself. Capability flags report
/// what the dialect can do, the `write_*` methods say how it spells it.
pub trait SqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter;

    /// Dialect name used in diagnostics.
    fn dialect(&self) -> &'static str;

    /// Whether the dialect has a native conflict clause (`ON CONFLICT ...`).
    fn supports_conflict_clause(&self) -> bool {
        false
    }

    /// Whether an insert can return the written identifier inline
    /// (`RETURNING`). When false, callers read the identifier back with a
    /// follow-up lookup keyed by the conflict-target columns.
    fn returns_inserted_id(&self) -> bool {
        false
    }

    fn write_identifier(&self, out: &mut String, value: &str) {
        out.push('"');
        let mut position = 0;
        for (i, c) in value.char_indices() {
            if c == '"' {
                out.push_str(&value[position..i]);
                out.push_str(r#""""#);
                position = i + 1;
            }
        }
        out.push_str(&value[position..]);
        out.push('"');
    }

    /// Bind-parameter placeholder; `index` is 1-based.
    fn write_placeholder(&self, out: &mut String, index: usize) {
        let _ = index;
        out.push('?');
    }

    /// Literal rendering, used for DDL defaults.
    fn write_value(&self, out: &mut String, value: &Value) {
        match value {
            Value::Null
            | Value::Boolean(None)
            | Value::Int16(None)
            | Value::Int32(None)
            | Value::Int64(None)
            | Value::Float64(None)
            | Value::Decimal(None, ..)
            | Value::Varchar(None)
            | Value::Blob(None)
            | Value::Date(None)
            | Value::Timestamp(None)
            | Value::Uuid(None) => self.write_value_none(out),
            Value::Boolean(Some(v)) => self.write_value_bool(out, *v),
            Value::Int16(Some(v)) => write_integer!(out, *v),
            Value::Int32(Some(v)) => write_integer!(out, *v),
            Value::Int64(Some(v)) => write_integer!(out, *v),
            Value::Float64(Some(v)) => {
                let mut buffer = ryu::Buffer::new();
                out.push_str(buffer.format(*v));
            }
            Value::Decimal(Some(v), ..) => {
                let _ = write!(out, "{}", v);
            }
            Value::Varchar(Some(v)) => self.write_value_string(out, v),
            Value::Blob(Some(v)) => self.write_value_blob(out, v),
            Value::Date(Some(v)) => {
                out.push('\'');
                self.write_value_date(out, v);
                out.push('\'');
            }
            Value::Timestamp(Some(v)) => {
                out.push('\'');
                self.write_value_date(out, &v.date());
                out.push('T');
                self.write_value_time(out, &v.time());
                out.push('\'');
            }
            Value::Uuid(Some(v)) => {
                let _ = write!(out, "'{}'", v);
            }
        }
    }

    fn write_value_none(&self, out: &mut String) {
        out.push_str("NULL");
    }

    fn write_value_bool(&self, out: &mut String, value: bool) {
        out.push_str(["false", "true"][value as usize]);
    }

    fn write_value_string(&self, out: &mut String, value: &str) {
        out.push('\'');
        let mut position = 0;
        for (i, c) in value.char_indices() {
            if c == '\'' {
                out.push_str(&value[position..i]);
                out.push_str("''");
                position = i + 1;
            }
        }
        out.push_str(&value[position..]);
        out.push('\'');
    }

    fn write_value_blob(&self, out: &mut String, value: &[u8]) {
        out.push_str("X'");
        for b in value {
            let _ = write!(out, "{:02X}", b);
        }
        out.push('\'');
    }

    fn write_value_date(&self, out: &mut String, value: &Date) {
        let _ = write!(
            out,
            "{:04}-{:02}-{:02}",
            value.year(),
            value.month() as u8,
            value.day()
        );
    }

    fn write_value_time(&self, out: &mut String, value: &Time) {
        let _ = write!(
            out,
            "{:02}:{:02}:{:02}",
            value.hour(),
            value.minute(),
            value.second()
        );
        let nanos = value.nanosecond();
        if nanos != 0 {
            let mut subsecond = nanos;
            let mut width = 9;
            while width > 1 && subsecond % 10 == 0 {
                subsecond /= 10;
                width -= 1;
            }
            let _ = write!(out, ".{:0width$}", subsecond);
        }
    }

    fn write_default(&self, out: &mut String, default: &DefaultValue) {
        match default {
            DefaultValue::Value(value) => self.write_value(out, value),
            DefaultValue::Expr(expr) => out.push_str(expr),
        }
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
            Value::Varchar(..) => out.push_str("VARCHAR"),
            Value::Blob(..) => out.push_str("BLOB"),
            Value::Date(..) => out.push_str("DATE"),
            Value::Timestamp(..) => out.push_str("TIMESTAMP"),
            Value::Uuid(..) => out.push_str("UUID"),
            Value::Null => panic!("cannot derive a column type from Value::Null"),
        }
    }

    fn write_create_table(&self, out: &mut String, table: &TableDef) {
        out.push_str("CREATE TABLE ");
        self.write_identifier(out, &table.name);
        out.push_str(" (\n");
        separated_by(
            out,
            &table.columns,
            |out, column| self.write_create_table_column_fragment(out, column),
            ",\n",
        );
        out.push_str("\n)");
        out.push(';');
    }

    fn write_create_table_column_fragment(&self, out: &mut String, column: &ColumnDef) {
        self.write_identifier(out, &column.name);
        out.push(' ');
        self.write_column_type(out, &column.value);
        if column.primary_key {
            out.push_str(" PRIMARY KEY");
        } else {
            if !column.nullable {
                out.push_str(" NOT NULL");
            }
            if column.unique {
                out.push_str(" UNIQUE");
            }
        }
        if let Some(default) = &column.default {
            out.push_str(" DEFAULT ");
            self.write_default(out, default);
        }
        if let Some(references) = &column.references {
            out.push_str(" REFERENCES ");
            self.write_identifier(out, &references.table);
            out.push('(');
            self.write_identifier(out, &references.column);
            out.push(')');
        }
    }

    fn write_create_join_table(&self, out: &mut String, join: &JoinTableDef) {
        out.push_str("CREATE TABLE ");
        self.write_identifier(out, &join.name);
        out.push_str(" (\n");
        separated_by(
            out,
            [&join.source, &join.target],
            |out, key| {
                self.write_identifier(out, &key.column);
                out.push(' ');
                self.write_column_type(out, &key.value);
                out.push_str(" NOT NULL REFERENCES ");
                self.write_identifier(out, &key.references.table);
                out.push('(');
                self.write_identifier(out, &key.references.column);
                out.push(')');
            },
            ",\n",
        );
        out.push_str(",\nPRIMARY KEY (");
        self.write_identifier(out, &join.source.column);
        out.push_str(", ");
        self.write_identifier(out, &join.target.column);
        out.push_str(")\n)");
        out.push(';');
    }
}

/// Baseline ANSI-flavored writer: positional `?` placeholders, no native
/// conflict clause, no inline identifier return.
pub struct GenericSqlWriter;

impl GenericSqlWriter {
    pub const fn new() -> Self {
        Self {}
    }
}

impl Default for GenericSqlWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlWriter for GenericSqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }
    fn dialect(&self) -> &'static str {
        "generic"
    }
}
