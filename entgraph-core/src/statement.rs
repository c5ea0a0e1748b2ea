use crate::{
    ConflictAction, ConflictMode, Error, OnConflict, RelationalGraph, Result, SqlWriter, TableDef,
    Value, util::separated_by,
};

/// How the caller obtains the written row's identifier.
#[derive(Debug, Clone, PartialEq)]
pub enum IdReadback {
    /// The identifier arrives with the execution result (`RETURNING`).
    Inline,
    /// The dialect cannot return it inline; the caller must follow up with a
    /// lookup keyed by these columns (see [`Insert::id_lookup`]).
    ByColumns(Vec<String>),
}

/// A built statement: dialect-specific SQL, ordered bind parameters and the
/// identifier read-back contract.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
    pub readback: IdReadback,
}

/// One proposed row mutation against the relational graph.
///
/// Stateless per call: `build` reads the graph and the policy, emits SQL and
/// returns; execution belongs to the injected [`Executor`](crate::Executor).
pub struct Insert<'a> {
    graph: &'a RelationalGraph,
    entity: String,
    assignments: Vec<(String, Value)>,
    policy: Option<OnConflict>,
}

impl<'a> Insert<'a> {
    pub fn new(graph: &'a RelationalGraph, entity: &str) -> Self {
        Self {
            graph,
            entity: entity.to_owned(),
            assignments: Vec::new(),
            policy: None,
        }
    }

    pub fn value(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.assignments.push((column.to_owned(), value.into()));
        self
    }

    /// Opts in to conflict resolution. Without a policy a uniqueness
    /// violation surfaces as [`Error::ConstraintViolation`].
    pub fn on_conflict(mut self, policy: OnConflict) -> Self {
        self.policy = Some(policy);
        self
    }

    fn table(&self) -> Result<&'a TableDef> {
        self.graph
            .table(&self.entity)
            .ok_or_else(|| Error::UnknownEntity(self.entity.clone()))
    }

    fn check_assignments(&self, table: &TableDef) -> Result<()> {
        for (i, (name, value)) in self.assignments.iter().enumerate() {
            let rejected = |reason: String| Error::Validation {
                entity: self.entity.clone(),
                field: name.clone(),
                reason,
            };
            if self.assignments[..i].iter().any(|(n, _)| n == name) {
                return Err(rejected("column is assigned twice".to_owned()));
            }
            let column = table.column(name).ok_or_else(|| Error::UnknownColumn {
                entity: self.entity.clone(),
                column: name.clone(),
            })?;
            if value.is_null() {
                if !column.nullable {
                    return Err(rejected("NULL for a non-nullable column".to_owned()));
                }
            } else if !value.same_type(&column.value) {
                return Err(rejected(format!(
                    "value type does not match the column type {:?}",
                    column.value
                )));
            }
            if let Some(validator) = &column.validator {
                validator.check(value).map_err(|reason| rejected(reason))?;
            }
        }
        Ok(())
    }

    /// Read-back columns when no policy names a conflict target: the single
    /// unique column when there is exactly one, the primary key when there
    /// is none. Several unique columns make the follow-up lookup ambiguous,
    /// so the caller must pick one via a policy target.
    fn default_readback(&self, table: &TableDef) -> Result<Vec<String>> {
        let unique: Vec<_> = table.unique_columns().collect();
        match unique.len() {
            0 => Ok(vec![table.primary_key.clone()]),
            1 => Ok(vec![unique[0].name.clone()]),
            _ => Err(Error::InvalidConflictTarget {
                entity: self.entity.clone(),
                reason: "entity declares several unique columns; the identifier read-back needs an explicit conflict target"
                    .to_owned(),
            }),
        }
    }

    /// Builds the dialect-specific statement. The policy's conflict target is
    /// validated and the dialect's capabilities are checked before any SQL is
    /// assembled.
    pub fn build(&self, writer: &dyn SqlWriter) -> Result<Statement> {
        let table = self.table()?;
        self.check_assignments(table)?;
        let target = match &self.policy {
            Some(policy) => {
                // DEFAULT VALUES takes no conflict clause in SQLite, and a
                // policy over zero assigned columns resolves nothing anyway.
                if self.assignments.is_empty() {
                    return Err(Error::InvalidConflictTarget {
                        entity: self.entity.clone(),
                        reason: "conflict resolution requires at least one assigned column"
                            .to_owned(),
                    });
                }
                let target = policy.resolve_target(&self.entity, table)?;
                if !writer.supports_conflict_clause() {
                    return Err(Error::UnsupportedDialect {
                        dialect: writer.dialect(),
                        feature: "a native conflict clause",
                    });
                }
                Some(target)
            }
            None => None,
        };

        let mut sql = String::with_capacity(256);
        sql.push_str("INSERT INTO ");
        writer.write_identifier(&mut sql, &table.name);
        if self.assignments.is_empty() {
            // An empty column list is invalid SQL; the standard spelling for
            // a row of nothing but defaults is DEFAULT VALUES.
            sql.push_str(" DEFAULT VALUES");
        } else {
            sql.push_str(" (");
            separated_by(
                &mut sql,
                &self.assignments,
                |out, (name, _)| writer.write_identifier(out, name),
                ", ",
            );
            sql.push_str(") VALUES (");
            let mut index = 0;
            separated_by(
                &mut sql,
                &self.assignments,
                |out, _| {
                    index += 1;
                    writer.write_placeholder(out, index);
                },
                ", ",
            );
            sql.push(')');
        }

        if let (Some(policy), Some(target)) = (&self.policy, &target) {
            self.write_conflict_clause(writer, &mut sql, table, policy, target)?;
        }
        if writer.returns_inserted_id() {
            sql.push_str(" RETURNING ");
            writer.write_identifier(&mut sql, &table.primary_key);
        }

        log::trace!("built insert for `{}`: {}", self.entity, sql);
        let params = self.assignments.iter().map(|(_, v)| v.clone()).collect();
        let readback = if writer.returns_inserted_id() {
            IdReadback::Inline
        } else {
            IdReadback::ByColumns(match target {
                Some(target) => target,
                None => self.default_readback(table)?,
            })
        };
        Ok(Statement {
            sql,
            params,
            readback,
        })
    }

    fn write_conflict_clause(
        &self,
        writer: &dyn SqlWriter,
        out: &mut String,
        table: &TableDef,
        policy: &OnConflict,
        target: &[String],
    ) -> Result<()> {
        out.push_str(" ON CONFLICT (");
        separated_by(
            out,
            target,
            |out, column| writer.write_identifier(out, column),
            ", ",
        );
        out.push(')');

        // Inserted columns open to resolution: neither key nor target.
        let updatable: Vec<&str> = self
            .assignments
            .iter()
            .map(|(name, _)| name.as_str())
            .filter(|name| *name != table.primary_key && !target.iter().any(|t| t.as_str() == *name))
            .collect();

        if let ConflictMode::Resolve(actions) = &policy.mode {
            for (name, _) in actions {
                if !updatable.contains(&name.as_str()) {
                    return Err(Error::UnknownColumn {
                        entity: self.entity.clone(),
                        column: name.clone(),
                    });
                }
            }
        }

        match &policy.mode {
            ConflictMode::Nothing => out.push_str(" DO NOTHING"),
            ConflictMode::UpdateAll | ConflictMode::Resolve(..) if updatable.is_empty() => {
                out.push_str(" DO NOTHING");
            }
            ConflictMode::UpdateAll => {
                out.push_str(" DO UPDATE SET ");
                separated_by(
                    out,
                    updatable.iter().copied(),
                    |out, name| {
                        writer.write_identifier(out, name);
                        out.push_str(" = excluded.");
                        writer.write_identifier(out, name);
                    },
                    ", ",
                );
            }
            ConflictMode::Resolve(actions) => {
                out.push_str(" DO UPDATE SET ");
                separated_by(
                    out,
                    updatable.iter().copied(),
                    |out, name| {
                        writer.write_identifier(out, name);
                        out.push_str(" = ");
                        let action = actions
                            .iter()
                            .find(|(n, _)| n.as_str() == name)
                            .map_or(&ConflictAction::Incoming, |(_, a)| a);
                        match action {
                            ConflictAction::Incoming => {
                                out.push_str("excluded.");
                                writer.write_identifier(out, name);
                            }
                            ConflictAction::Existing => {
                                writer.write_identifier(out, &table.name);
                                out.push('.');
                                writer.write_identifier(out, name);
                            }
                            ConflictAction::Expr(expr) => out.push_str(expr),
                        }
                    },
                    ", ",
                );
            }
        }
        Ok(())
    }

    /// The documented follow-up lookup for dialects that cannot return the
    /// identifier inline: selects the primary key by the conflict-target
    /// columns of this request, bound to the same values.
    pub fn id_lookup(&self, writer: &dyn SqlWriter) -> Result<Statement> {
        let table = self.table()?;
        let columns = match &self.policy {
            Some(policy) => policy.resolve_target(&self.entity, table)?,
            None => self.default_readback(table)?,
        };
        let mut params = Vec::with_capacity(columns.len());
        for name in &columns {
            let value = self
                .assignments
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.clone())
                .ok_or_else(|| Error::Validation {
                    entity: self.entity.clone(),
                    field: name.clone(),
                    reason: "identifier lookup requires a value for every conflict-target column"
                        .to_owned(),
                })?;
            params.push(value);
        }

        let mut sql = String::with_capacity(128);
        sql.push_str("SELECT ");
        writer.write_identifier(&mut sql, &table.primary_key);
        sql.push_str(" FROM ");
        writer.write_identifier(&mut sql, &table.name);
        sql.push_str(" WHERE ");
        let mut index = 0;
        separated_by(
            &mut sql,
            &columns,
            |out, name| {
                index += 1;
                writer.write_identifier(out, name);
                out.push_str(" = ");
                writer.write_placeholder(out, index);
            },
            " AND ",
        );
        Ok(Statement {
            sql,
            params,
            readback: IdReadback::Inline,
        })
    }
}
