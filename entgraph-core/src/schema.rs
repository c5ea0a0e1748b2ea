use crate::{FieldDef, RelationalGraph, Result, Value, util::pluralize};

/// Cardinality of a declared edge, seen from the declaring entity.
///
/// `OneToMany` reads "I have many of the target"; its inverse on the target
/// entity is declared `ManyToOne`. `OneToOne` and `ManyToMany` pairs declare
/// the same value on both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    OneToOne,
    OneToMany,
    ManyToOne,
    ManyToMany,
}

/// A directed relationship declaration.
///
/// Edges reference their target entity by name and their inverse edge by
/// name; pairing happens during compilation, so entity definitions stay
/// plain values with no cross-links.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeDef {
    pub name: String,
    pub target: String,
    pub cardinality: Cardinality,
    /// Name of the paired edge on the target entity, if bidirectional.
    pub inverse: Option<String>,
    /// Storage owner marker; required on exactly one side of a one-to-one or
    /// many-to-many pair.
    pub owner: bool,
}

impl EdgeDef {
    pub fn to(name: &str, target: &str, cardinality: Cardinality) -> Self {
        Self {
            name: name.to_owned(),
            target: target.to_owned(),
            cardinality,
            inverse: None,
            owner: false,
        }
    }
    pub fn inverse(mut self, name: &str) -> Self {
        self.inverse = Some(name.to_owned());
        self
    }
    pub fn owner(mut self) -> Self {
        self.owner = true;
        self
    }
}

/// A named record type: an identifier field, typed fields and declared edges.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityDef {
    pub name: String,
    pub id: FieldDef,
    pub fields: Vec<FieldDef>,
    pub edges: Vec<EdgeDef>,
}

impl EntityDef {
    /// New entity with the default `id` identifier of type `Int64`.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            id: FieldDef::new("id", Value::Int64(None)),
            fields: Vec::new(),
            edges: Vec::new(),
        }
    }
    /// Replaces the default identifier with a custom one.
    pub fn id_field(mut self, field: FieldDef) -> Self {
        self.id = field;
        self
    }
    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }
    pub fn edge(mut self, edge: EdgeDef) -> Self {
        self.edges.push(edge);
        self
    }
    pub fn table_name(&self) -> String {
        pluralize(&self.name)
    }
}

/// The full schema description handed to the compiler.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Schema {
    pub entities: Vec<EntityDef>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn entity(mut self, entity: EntityDef) -> Self {
        self.entities.push(entity);
        self
    }
    /// Compiles the schema into its immutable relational layout.
    pub fn compile(&self) -> Result<RelationalGraph> {
        RelationalGraph::compile(self)
    }
}
