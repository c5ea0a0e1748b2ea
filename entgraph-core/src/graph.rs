use crate::{
    ColumnDef, EdgeLayout, Error, ForeignKeyDef, JoinTableDef, Result, Schema,
    field::compile_field,
    resolver,
    util::snake,
};
use std::collections::HashMap;

/// Physical table compiled from one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct TableDef {
    pub name: String,
    /// Declared field columns first (identifier leading), edge-owned
    /// foreign-key columns appended after them.
    pub columns: Vec<ColumnDef>,
    /// Name of the identifier column.
    pub primary_key: String,
}

impl TableDef {
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }
    pub fn primary_key_def(&self) -> &ColumnDef {
        self.column(&self.primary_key)
            .expect("primary key column is always present")
    }
    /// Single-column unique constraints, identifier excluded.
    pub fn unique_columns(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns.iter().filter(|c| c.unique && !c.primary_key)
    }
}

/// The compiled, immutable relational layout of a schema.
///
/// Safe for unsynchronized concurrent reads; never mutated after
/// construction. Lookups are total for any edge that appeared in the input
/// schema: a `None` there indicates a resolver defect, not a user error.
#[derive(Debug)]
pub struct RelationalGraph {
    tables: Vec<TableDef>,
    join_tables: Vec<JoinTableDef>,
    entity_tables: HashMap<String, usize>,
    edges: HashMap<(String, String), EdgeLayout>,
}

impl RelationalGraph {
    pub fn compile(schema: &Schema) -> Result<Self> {
        let mut entity_tables = HashMap::new();
        let mut tables: Vec<TableDef> = Vec::with_capacity(schema.entities.len());
        // Provenance per (table, column), for collision diagnostics.
        let mut column_origin: HashMap<(String, String), String> = HashMap::new();

        for entity in &schema.entities {
            let mut columns = vec![compile_field(&entity.name, &entity.id, true)?];
            for field in &entity.fields {
                let column = compile_field(&entity.name, field, false)?;
                if columns.iter().any(|c| c.name == column.name) {
                    return Err(Error::InvalidField {
                        entity: entity.name.clone(),
                        field: field.name.clone(),
                        reason: "field is declared twice".to_owned(),
                    });
                }
                columns.push(column);
            }
            let table = TableDef {
                name: entity.table_name(),
                primary_key: snake(&entity.id.name),
                columns,
            };
            if entity_tables.contains_key(&entity.name) {
                return Err(Error::DuplicateEntity(entity.name.clone()));
            }
            if tables.iter().any(|t| t.name == table.name) {
                // Distinct entity names can still collide after pluralization.
                return Err(Error::DuplicateEntity(entity.name.clone()));
            }
            for column in &table.columns {
                column_origin.insert(
                    (table.name.clone(), column.name.clone()),
                    format!("field `{}.{}`", entity.name, column.name),
                );
            }
            entity_tables.insert(entity.name.clone(), tables.len());
            tables.push(table);
        }

        let resolved = resolver::resolve(&schema.entities)?;
        let table_index: HashMap<String, usize> = tables
            .iter()
            .enumerate()
            .map(|(i, t)| (t.name.clone(), i))
            .collect();

        let mut join_tables: Vec<JoinTableDef> = Vec::new();
        let mut join_origin: HashMap<String, String> = HashMap::new();
        let mut edges = HashMap::new();
        for edge in &resolved {
            let label = format!("{}.{}", edge.entity, edge.name);
            match &edge.layout {
                EdgeLayout::ForeignKey(fk) => {
                    let key = (fk.table.clone(), fk.column.clone());
                    if let Some(origin) = column_origin.get(&key) {
                        return Err(Error::AmbiguousEdge {
                            edge: label,
                            other: origin.clone(),
                            reason: format!(
                                "foreign-key column `{}.{}` is already taken",
                                fk.table, fk.column
                            ),
                        });
                    }
                    let index = *table_index
                        .get(&fk.table)
                        .expect("resolver references a compiled table");
                    tables[index].columns.push(ColumnDef {
                        name: fk.column.clone(),
                        value: fk.value.clone(),
                        nullable: true,
                        unique: fk.unique,
                        primary_key: false,
                        default: None,
                        references: Some(fk.references.clone()),
                        validator: None,
                    });
                    column_origin.insert(key, format!("edge `{label}`"));
                }
                EdgeLayout::JoinTable(join) => {
                    if table_index.contains_key(&join.name) {
                        return Err(Error::AmbiguousEdge {
                            edge: label,
                            other: format!("table `{}`", join.name),
                            reason: "join table name collides with an entity table".to_owned(),
                        });
                    }
                    if let Some(origin) = join_origin.get(&join.name) {
                        return Err(Error::AmbiguousEdge {
                            edge: label,
                            other: origin.clone(),
                            reason: format!("join table `{}` is allocated twice", join.name),
                        });
                    }
                    join_origin.insert(join.name.clone(), format!("edge `{label}`"));
                    join_tables.push(join.clone());
                }
                EdgeLayout::Inverse { .. } => {}
            }
            edges.insert((edge.entity.clone(), edge.name.clone()), edge.layout.clone());
        }

        log::debug!(
            "compiled schema: {} tables, {} join tables, {} edges",
            tables.len(),
            join_tables.len(),
            edges.len()
        );
        Ok(Self {
            tables,
            join_tables,
            entity_tables,
            edges,
        })
    }

    pub fn tables(&self) -> &[TableDef] {
        &self.tables
    }

    pub fn join_tables(&self) -> &[JoinTableDef] {
        &self.join_tables
    }

    pub fn table(&self, entity: &str) -> Option<&TableDef> {
        self.entity_tables.get(entity).map(|i| &self.tables[*i])
    }

    pub fn edge(&self, entity: &str, edge: &str) -> Option<&EdgeLayout> {
        self.edges.get(&(entity.to_owned(), edge.to_owned()))
    }

    /// Foreign-key column backing an edge, reachable from either side of a
    /// bidirectional pair.
    pub fn foreign_key(&self, entity: &str, edge: &str) -> Option<&ForeignKeyDef> {
        match self.edge(entity, edge)? {
            EdgeLayout::ForeignKey(fk) => Some(fk),
            EdgeLayout::Inverse { entity, edge } => self.foreign_key(entity, edge),
            EdgeLayout::JoinTable(..) => None,
        }
    }

    /// Join table backing a many-to-many edge, reachable from either side.
    pub fn join_table(&self, entity: &str, edge: &str) -> Option<&JoinTableDef> {
        match self.edge(entity, edge)? {
            EdgeLayout::JoinTable(join) => Some(join),
            EdgeLayout::Inverse { entity, edge } => self.join_table(entity, edge),
            EdgeLayout::ForeignKey(..) => None,
        }
    }

    /// Identifying name reported when a uniqueness constraint is violated.
    pub fn unique_constraint_name(&self, table: &str, column: &str) -> String {
        format!("{table}_{column}_key")
    }
}
