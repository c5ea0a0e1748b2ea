use entgraph::{
    Error, Executor, LabeledRow, RelationalGraph, Result, RowsAffected, Statement, Value,
};
use std::collections::HashMap;
use std::future::{Future, ready};

/// In-memory table store that interprets the statements produced by the
/// builders: inserts with an optional conflict clause and single-row
/// identifier lookups. Enforces single-column uniqueness the way a database
/// would, so conflict-policy behavior can be asserted end to end.
pub struct MemoryExecutor {
    tables: HashMap<String, TableState>,
}

struct TableState {
    primary_key: String,
    unique: Vec<String>,
    rows: Vec<LabeledRow>,
    next_id: i64,
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

fn identifier_list(value: &str) -> Vec<String> {
    value
        .split(", ")
        .map(|part| unquote(part).to_owned())
        .collect()
}

/// Splits `"a" = rhs, "b" = rhs` on the separators between assignments,
/// leaving any ` + ` arithmetic inside a right-hand side intact.
fn assignment_list(value: &str) -> Vec<String> {
    value
        .split(", \"")
        .enumerate()
        .map(|(i, part)| {
            if i == 0 {
                part.to_owned()
            } else {
                format!("\"{part}")
            }
        })
        .collect()
}

impl MemoryExecutor {
    pub fn new(graph: &RelationalGraph) -> Self {
        let tables = graph
            .tables()
            .iter()
            .map(|table| {
                (
                    table.name.clone(),
                    TableState {
                        primary_key: table.primary_key.clone(),
                        unique: table.unique_columns().map(|c| c.name.clone()).collect(),
                        rows: Vec::new(),
                        next_id: 1,
                    },
                )
            })
            .collect();
        Self { tables }
    }

    pub fn rows(&self, table: &str) -> &[LabeledRow] {
        &self.tables[table].rows
    }

    pub fn row_by<'a>(
        &'a self,
        table: &str,
        column: &str,
        value: &Value,
    ) -> Option<&'a LabeledRow> {
        self.tables[table]
            .rows
            .iter()
            .find(|row| row.get(column) == Some(value))
    }

    fn eval_term(table: &str, term: &str, incoming: &LabeledRow, existing: &LabeledRow) -> Value {
        if let Some(column) = term.strip_prefix("excluded.") {
            return incoming[unquote(column)].clone();
        }
        let qualified = format!("\"{table}\".");
        if let Some(column) = term.strip_prefix(&qualified) {
            return existing[unquote(column)].clone();
        }
        Value::from(term.parse::<i64>().expect("unsupported expression term"))
    }

    fn eval(table: &str, rhs: &str, incoming: &LabeledRow, existing: &LabeledRow) -> Value {
        let mut terms = rhs.split(" + ");
        let first = Self::eval_term(table, terms.next().unwrap(), incoming, existing);
        terms.fold(first, |acc, term| {
            let (Value::Int64(Some(acc)), Value::Int64(Some(term))) =
                (acc, Self::eval_term(table, term, incoming, existing))
            else {
                panic!("arithmetic is only interpreted over BIGINT columns");
            };
            Value::from(acc + term)
        })
    }

    fn run_insert(&mut self, statement: &Statement) -> Result<RowsAffected> {
        let sql = statement.sql.as_str();
        let returning = sql.contains(" RETURNING ");
        let sql = sql.split(" RETURNING ").next().unwrap();
        let body = sql
            .strip_prefix("INSERT INTO ")
            .expect("only INSERT statements are interpreted");
        let (table_name, rest) = body.split_once(" (").unwrap();
        let table_name = unquote(table_name).to_owned();
        let (column_list, rest) = rest.split_once(") VALUES (").unwrap();
        let columns = identifier_list(column_list);
        let (_, clause) = rest.split_once(')').unwrap();
        let conflict = clause.strip_prefix(" ON CONFLICT (").map(|clause| {
            let (target, action) = clause.split_once(')').unwrap();
            (identifier_list(target), action.to_owned())
        });

        assert_eq!(columns.len(), statement.params.len());
        let mut row: LabeledRow = columns
            .into_iter()
            .zip(statement.params.iter().cloned())
            .collect();

        let state = self.tables.get_mut(&table_name).unwrap();
        let mut keys = vec![state.primary_key.clone()];
        keys.extend(state.unique.iter().cloned());
        let mut hit = None;
        for key in &keys {
            if let Some(value) = row.get(key) {
                if value.is_null() {
                    continue;
                }
                if let Some(i) = state.rows.iter().position(|r| r.get(key) == Some(value)) {
                    hit = Some((i, key.clone()));
                    break;
                }
            }
        }

        let Some((index, key)) = hit else {
            let pk = state.primary_key.clone();
            if row.get(&pk).is_none_or(Value::is_null) {
                row.insert(pk.clone(), Value::from(state.next_id));
            }
            state.next_id += 1;
            let id = row[&pk].clone();
            state.rows.push(row);
            return Ok(RowsAffected {
                rows_affected: 1,
                last_inserted_id: returning.then_some(id),
            });
        };

        let violation = || Error::ConstraintViolation {
            constraint: format!("{table_name}_{key}_key"),
        };
        let Some((target, action)) = conflict else {
            return Err(violation());
        };
        if !target.contains(&key) {
            return Err(violation());
        }
        if action == " DO NOTHING" {
            return Ok(RowsAffected {
                rows_affected: 0,
                last_inserted_id: None,
            });
        }
        let assignments = action
            .strip_prefix(" DO UPDATE SET ")
            .expect("unexpected conflict action");
        let existing = state.rows[index].clone();
        for assignment in assignment_list(assignments) {
            let (column, rhs) = assignment.split_once(" = ").unwrap();
            let value = Self::eval(&table_name, rhs, &row, &existing);
            state.rows[index].insert(unquote(column).to_owned(), value);
        }
        let id = state.rows[index][&state.primary_key].clone();
        Ok(RowsAffected {
            rows_affected: 1,
            last_inserted_id: returning.then_some(id),
        })
    }

    fn run_select(&self, statement: &Statement) -> Result<Option<Vec<Value>>> {
        let body = statement
            .sql
            .strip_prefix("SELECT ")
            .expect("only single-row SELECT statements are interpreted");
        let (select_column, rest) = body.split_once(" FROM ").unwrap();
        let select_column = unquote(select_column).to_owned();
        let (table_name, where_clause) = rest.split_once(" WHERE ").unwrap();
        let state = &self.tables[unquote(table_name)];
        let columns: Vec<String> = where_clause
            .split(" AND ")
            .map(|condition| unquote(condition.split_once(" = ").unwrap().0).to_owned())
            .collect();
        assert_eq!(columns.len(), statement.params.len());
        let found = state.rows.iter().find(|row| {
            columns
                .iter()
                .zip(&statement.params)
                .all(|(column, value)| row.get(column) == Some(value))
        });
        Ok(found.map(|row| vec![row[&select_column].clone()]))
    }
}

impl Executor for MemoryExecutor {
    fn execute(&mut self, statement: &Statement) -> impl Future<Output = Result<RowsAffected>> + Send {
        ready(self.run_insert(statement))
    }

    fn fetch_one(
        &mut self,
        statement: &Statement,
    ) -> impl Future<Output = Result<Option<Vec<Value>>>> + Send {
        ready(self.run_select(statement))
    }
}
