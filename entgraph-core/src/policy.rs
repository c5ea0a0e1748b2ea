use crate::{Error, Result, TableDef};

/// How one non-key column is resolved when the conflict target matches.
#[derive(Debug, Clone, PartialEq)]
pub enum ConflictAction {
    /// Overwrite with the incoming value.
    Incoming,
    /// Keep the stored value.
    Existing,
    /// Raw SQL combining incoming (`excluded."col"`) and stored
    /// (`"table"."col"`) values, emitted verbatim.
    Expr(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConflictMode {
    /// Overwrite every non-key inserted column with the incoming value.
    UpdateAll,
    /// No-op on conflict; the affected count reports zero changed rows.
    Nothing,
    /// Per-column actions; unmentioned columns default to `Incoming`.
    Resolve(Vec<(String, ConflictAction)>),
}

/// Conflict-resolution policy scoped to one pending write.
///
/// A plain value object: it is validated against the relational graph when
/// the statement is built, before any SQL is assembled, and dropped after
/// the statement executes.
#[derive(Debug, Clone, PartialEq)]
pub struct OnConflict {
    /// Explicit conflict-target columns; empty means "derive from the
    /// entity's unique columns".
    pub target: Vec<String>,
    pub mode: ConflictMode,
}

impl OnConflict {
    pub fn update_all() -> Self {
        Self {
            target: Vec::new(),
            mode: ConflictMode::UpdateAll,
        }
    }
    pub fn nothing() -> Self {
        Self {
            target: Vec::new(),
            mode: ConflictMode::Nothing,
        }
    }
    pub fn resolve() -> Self {
        Self {
            target: Vec::new(),
            mode: ConflictMode::Resolve(Vec::new()),
        }
    }
    /// Adds a per-column action, switching the mode to fine-grained.
    pub fn action(mut self, column: &str, action: ConflictAction) -> Self {
        match &mut self.mode {
            ConflictMode::Resolve(actions) => actions.push((column.to_owned(), action)),
            _ => self.mode = ConflictMode::Resolve(vec![(column.to_owned(), action)]),
        }
        self
    }
    pub fn target<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.target = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Conflict-target columns for this request.
    ///
    /// Explicit columns must be covered by a uniqueness constraint (or be
    /// the primary key). The default target is the entity's single unique
    /// column; with several unique columns the caller must choose, and with
    /// none the primary key is used.
    pub(crate) fn resolve_target(&self, entity: &str, table: &TableDef) -> Result<Vec<String>> {
        if !self.target.is_empty() {
            for name in &self.target {
                let column = table.column(name).ok_or_else(|| Error::UnknownColumn {
                    entity: entity.to_owned(),
                    column: name.clone(),
                })?;
                if !column.unique && !column.primary_key {
                    return Err(Error::InvalidConflictTarget {
                        entity: entity.to_owned(),
                        reason: format!(
                            "column `{name}` is not covered by a uniqueness constraint"
                        ),
                    });
                }
            }
            return Ok(self.target.clone());
        }
        let unique: Vec<_> = table.unique_columns().collect();
        match unique.len() {
            0 => Ok(vec![table.primary_key.clone()]),
            1 => Ok(vec![unique[0].name.clone()]),
            _ => Err(Error::InvalidConflictTarget {
                entity: entity.to_owned(),
                reason: "entity declares several unique columns; specify the conflict target explicitly"
                    .to_owned(),
            }),
        }
    }
}
