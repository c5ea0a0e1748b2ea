use crate::{
    Cardinality, ColumnRef, EdgeDef, EntityDef, Error, Result, Value,
    util::{pluralize, singularize, snake},
};
use std::collections::{HashMap, HashSet};

/// Foreign-key column owned by an edge.
#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKeyDef {
    /// Table holding the column.
    pub table: String,
    pub column: String,
    /// Type of the referenced identifier.
    pub value: Value,
    pub references: ColumnRef,
    /// One-to-one edges constrain the column to a single referencing row.
    pub unique: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinColumn {
    pub column: String,
    pub value: Value,
    pub references: ColumnRef,
}

/// Join table allocated for a many-to-many edge; its composite primary key
/// is (source column, target column).
#[derive(Debug, Clone, PartialEq)]
pub struct JoinTableDef {
    pub name: String,
    pub source: JoinColumn,
    pub target: JoinColumn,
}

/// Physical layout decided for one declared edge.
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeLayout {
    ForeignKey(ForeignKeyDef),
    JoinTable(JoinTableDef),
    /// Non-owning side of a bidirectional pair: a pure lookup relation whose
    /// storage lives with the named owning edge.
    Inverse { entity: String, edge: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedEdge {
    pub entity: String,
    pub name: String,
    pub target: String,
    pub cardinality: Cardinality,
    pub layout: EdgeLayout,
}

fn id_ref(entity: &EntityDef) -> ColumnRef {
    ColumnRef {
        table: pluralize(&entity.name),
        column: snake(&entity.id.name),
    }
}

fn ambiguous(edge: String, other: String, reason: &str) -> Error {
    Error::AmbiguousEdge {
        edge,
        other,
        reason: reason.to_owned(),
    }
}

/// Physical layout for the storage-owning declaration of an edge.
///
/// Column and join-table names derive from the owning entity and the edge
/// name, never from the target entity alone, so two edges to the same target
/// produce distinct columns even when self-referential.
fn owning_layout(owner: &EntityDef, edge: &EdgeDef, target: &EntityDef) -> Result<EdgeLayout> {
    let column = format!("{}_{}", snake(&owner.name), snake(&edge.name));
    Ok(match edge.cardinality {
        Cardinality::OneToOne => EdgeLayout::ForeignKey(ForeignKeyDef {
            table: pluralize(&owner.name),
            column,
            value: target.id.value.as_type(),
            references: id_ref(target),
            unique: true,
        }),
        // The "one" side declares; the column lands on the many side's table.
        Cardinality::OneToMany => EdgeLayout::ForeignKey(ForeignKeyDef {
            table: pluralize(&target.name),
            column,
            value: owner.id.value.as_type(),
            references: id_ref(owner),
            unique: false,
        }),
        Cardinality::ManyToOne => EdgeLayout::ForeignKey(ForeignKeyDef {
            table: pluralize(&owner.name),
            column,
            value: target.id.value.as_type(),
            references: id_ref(target),
            unique: false,
        }),
        Cardinality::ManyToMany => {
            let source_column = format!("{}_id", snake(&owner.name));
            let target_column = if owner.name == target.name {
                format!("{}_id", singularize(&snake(&edge.name)))
            } else {
                format!("{}_id", snake(&target.name))
            };
            if source_column == target_column {
                let label = format!("{}.{}", owner.name, edge.name);
                return Err(ambiguous(
                    label.clone(),
                    label,
                    "join-table key columns collide; rename the edge",
                ));
            }
            EdgeLayout::JoinTable(JoinTableDef {
                name: format!("{}_{}", snake(&owner.name), snake(&edge.name)),
                source: JoinColumn {
                    column: source_column,
                    value: owner.id.value.as_type(),
                    references: id_ref(owner),
                },
                target: JoinColumn {
                    column: target_column,
                    value: target.id.value.as_type(),
                    references: id_ref(target),
                },
            })
        }
    })
}

/// Pairs bidirectional edges, decides ownership and produces the physical
/// layout for every declared edge. Deterministic: entities and edges are
/// walked in declaration order.
pub(crate) fn resolve(entities: &[EntityDef]) -> Result<Vec<ResolvedEdge>> {
    let entity_index: HashMap<&str, &EntityDef> =
        entities.iter().map(|e| (e.name.as_str(), e)).collect();

    let mut edge_index: HashMap<(&str, &str), &EdgeDef> = HashMap::new();
    for entity in entities {
        for edge in &entity.edges {
            if edge_index
                .insert((entity.name.as_str(), edge.name.as_str()), edge)
                .is_some()
            {
                let label = format!("{}.{}", entity.name, edge.name);
                return Err(ambiguous(
                    label.clone(),
                    label,
                    "edge name is declared twice on the same entity",
                ));
            }
        }
    }

    let mut resolved = Vec::new();
    let mut done: HashSet<(&str, &str)> = HashSet::new();
    for entity in entities {
        for edge in &entity.edges {
            if done.contains(&(entity.name.as_str(), edge.name.as_str())) {
                continue;
            }
            let label = format!("{}.{}", entity.name, edge.name);
            let target = entity_index
                .get(edge.target.as_str())
                .copied()
                .ok_or_else(|| Error::UnknownEntity(edge.target.clone()))?;

            // An edge with no declared inverse always owns its own layout.
            let Some(inverse_name) = &edge.inverse else {
                resolved.push(ResolvedEdge {
                    entity: entity.name.clone(),
                    name: edge.name.clone(),
                    target: target.name.clone(),
                    cardinality: edge.cardinality,
                    layout: owning_layout(entity, edge, target)?,
                });
                done.insert((entity.name.as_str(), edge.name.as_str()));
                continue;
            };

            let other_label = format!("{}.{}", target.name, inverse_name);
            if target.name == entity.name && *inverse_name == edge.name {
                return Err(ambiguous(label, other_label, "an edge cannot be its own inverse"));
            }
            let other = edge_index
                .get(&(target.name.as_str(), inverse_name.as_str()))
                .copied()
                .ok_or_else(|| {
                    ambiguous(
                        label.clone(),
                        other_label.clone(),
                        "the declared inverse edge does not exist",
                    )
                })?;
            if other.target != entity.name || other.inverse.as_deref() != Some(edge.name.as_str()) {
                return Err(ambiguous(label, other_label, "inverse references are not mutual"));
            }

            use Cardinality::*;
            let (assoc, assoc_entity, lookup, lookup_entity) =
                match (edge.cardinality, other.cardinality) {
                    (OneToMany, ManyToOne) => (edge, entity, other, target),
                    (ManyToOne, OneToMany) => (other, target, edge, entity),
                    (OneToOne, OneToOne) | (ManyToMany, ManyToMany) => {
                        match (edge.owner, other.owner) {
                            (true, false) => (edge, entity, other, target),
                            (false, true) => (other, target, edge, entity),
                            _ => {
                                return Err(ambiguous(
                                    label,
                                    other_label,
                                    "exactly one side of the pair must be marked as owner",
                                ));
                            }
                        }
                    }
                    _ => {
                        return Err(ambiguous(
                            label,
                            other_label,
                            "the cardinalities of the two sides do not describe the same relationship",
                        ));
                    }
                };

            let assoc_target = entity_index[assoc.target.as_str()];
            resolved.push(ResolvedEdge {
                entity: assoc_entity.name.clone(),
                name: assoc.name.clone(),
                target: assoc.target.clone(),
                cardinality: assoc.cardinality,
                layout: owning_layout(assoc_entity, assoc, assoc_target)?,
            });
            resolved.push(ResolvedEdge {
                entity: lookup_entity.name.clone(),
                name: lookup.name.clone(),
                target: lookup.target.clone(),
                cardinality: lookup.cardinality,
                layout: EdgeLayout::Inverse {
                    entity: assoc_entity.name.clone(),
                    edge: assoc.name.clone(),
                },
            });
            done.insert((assoc_entity.name.as_str(), assoc.name.as_str()));
            done.insert((lookup_entity.name.as_str(), lookup.name.as_str()));
        }
    }
    Ok(resolved)
}
