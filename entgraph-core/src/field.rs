use crate::{Error, Result, Value, util::snake};

/// Default applied when an insert omits the column.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    /// A literal, rendered by the dialect writer.
    Value(Value),
    /// A raw SQL expression emitted verbatim (`now()`, `gen_random_uuid()`).
    Expr(String),
}

/// Scalar check run against a proposed value before a statement is built.
#[derive(Debug, Clone, PartialEq)]
pub enum Validator {
    NonEmpty,
    MaxLen(usize),
    Range { min: i64, max: i64 },
}

impl Validator {
    fn applies_to(&self, value: &Value) -> bool {
        match self {
            Validator::NonEmpty | Validator::MaxLen(..) => matches!(value, Value::Varchar(..)),
            Validator::Range { .. } => {
                matches!(value, Value::Int16(..) | Value::Int32(..) | Value::Int64(..))
            }
        }
    }

    pub(crate) fn check(&self, value: &Value) -> std::result::Result<(), String> {
        match (self, value) {
            (Validator::NonEmpty, Value::Varchar(Some(v))) if v.is_empty() => {
                Err("must not be empty".to_owned())
            }
            (Validator::MaxLen(max), Value::Varchar(Some(v))) if v.chars().count() > *max => {
                Err(format!("longer than {max} characters"))
            }
            (Validator::Range { min, max }, v) => {
                let n = match v {
                    Value::Int16(Some(n)) => i64::from(*n),
                    Value::Int32(Some(n)) => i64::from(*n),
                    Value::Int64(Some(n)) => *n,
                    _ => return Ok(()),
                };
                if n < *min || n > *max {
                    Err(format!("{n} is outside [{min}, {max}]"))
                } else {
                    Ok(())
                }
            }
            _ => Ok(()),
        }
    }
}

/// Declarative specification of an entity field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: String,
    /// Type descriptor; the payload of the variant is ignored.
    pub value: Value,
    pub nullable: bool,
    pub unique: bool,
    pub default: Option<DefaultValue>,
    pub validator: Option<Validator>,
}

impl FieldDef {
    pub fn new(name: &str, value: Value) -> Self {
        Self {
            name: name.to_owned(),
            value,
            nullable: false,
            unique: false,
            default: None,
            validator: None,
        }
    }
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(DefaultValue::Value(value.into()));
        self
    }
    pub fn default_expr(mut self, expr: &str) -> Self {
        self.default = Some(DefaultValue::Expr(expr.to_owned()));
        self
    }
    pub fn validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }
}

/// Reference to a column on some table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    pub table: String,
    pub column: String,
}

/// Physical column produced by compiling a field or an owning edge.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    /// Type descriptor with an empty payload.
    pub value: Value,
    pub nullable: bool,
    pub unique: bool,
    pub primary_key: bool,
    pub default: Option<DefaultValue>,
    /// Foreign key target, set only for edge-owned columns.
    pub references: Option<ColumnRef>,
    pub validator: Option<Validator>,
}

/// Turns a field declaration into a column descriptor, rejecting conflicting
/// attribute combinations.
pub(crate) fn compile_field(entity: &str, field: &FieldDef, primary_key: bool) -> Result<ColumnDef> {
    let invalid = |reason: &str| Error::InvalidField {
        entity: entity.to_owned(),
        field: field.name.clone(),
        reason: reason.to_owned(),
    };
    if field.name.is_empty() {
        return Err(invalid("field name is empty"));
    }
    if matches!(field.value, Value::Null) {
        return Err(invalid("field must declare a concrete type"));
    }
    if primary_key && field.nullable {
        return Err(invalid("identifier field cannot be nullable"));
    }
    if let Some(DefaultValue::Value(default)) = &field.default {
        if default.is_null() {
            if !field.nullable {
                return Err(invalid("NULL default on a non-nullable field"));
            }
        } else if !default.same_type(&field.value) {
            return Err(invalid("default value type does not match the field type"));
        }
    }
    if let Some(validator) = &field.validator {
        if !validator.applies_to(&field.value) {
            return Err(invalid("validator does not apply to the field type"));
        }
    }
    Ok(ColumnDef {
        name: snake(&field.name),
        value: field.value.as_type(),
        nullable: field.nullable,
        unique: field.unique && !primary_key,
        primary_key,
        default: field.default.clone(),
        references: None,
        validator: field.validator.clone(),
    })
}
