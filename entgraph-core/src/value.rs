use rust_decimal::Decimal;
use std::collections::BTreeMap;
use time::{Date, PrimitiveDateTime};
use uuid::Uuid;

/// Typed scalar carried by columns and bind parameters.
///
/// Every variant wraps an `Option` so a typed NULL stays distinguishable from
/// an untyped one: `Value::Varchar(None)` is a NULL that still knows it is a
/// string. Variants with a `None` payload double as type descriptors in
/// column definitions.
#[derive(Default, Debug, Clone)]
pub enum Value {
    #[default]
    Null,
    Boolean(Option<bool>),
    Int16(Option<i16>),
    Int32(Option<i32>),
    Int64(Option<i64>),
    Float64(Option<f64>),
    Decimal(Option<Decimal>, /* prec: */ u8, /* scale: */ u8),
    Varchar(Option<String>),
    Blob(Option<Box<[u8]>>),
    Date(Option<Date>),
    Timestamp(Option<PrimitiveDateTime>),
    Uuid(Option<Uuid>),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Boolean(l), Self::Boolean(r)) => l == r,
            (Self::Int16(l), Self::Int16(r)) => l == r,
            (Self::Int32(l), Self::Int32(r)) => l == r,
            (Self::Int64(l), Self::Int64(r)) => l == r,
            (Self::Float64(l), Self::Float64(r)) => l == r,
            (Self::Decimal(l, l_prec, l_scale), Self::Decimal(r, r_prec, r_scale)) => {
                l == r && l_prec == r_prec && l_scale == r_scale
            }
            (Self::Varchar(l), Self::Varchar(r)) => l == r,
            (Self::Blob(l), Self::Blob(r)) => l == r,
            (Self::Date(l), Self::Date(r)) => l == r,
            (Self::Timestamp(l), Self::Timestamp(r)) => l == r,
            (Self::Uuid(l), Self::Uuid(r)) => l == r,
            _ => core::mem::discriminant(self) == core::mem::discriminant(other),
        }
    }
}

impl Value {
    pub fn same_type(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Decimal(.., l_prec, l_scale), Self::Decimal(.., r_prec, r_scale)) => {
                l_prec == r_prec && l_scale == r_scale
            }
            _ => core::mem::discriminant(self) == core::mem::discriminant(other),
        }
    }

    /// True for `Null` and for any typed NULL.
    pub fn is_null(&self) -> bool {
        match self {
            Self::Null
            | Self::Boolean(None)
            | Self::Int16(None)
            | Self::Int32(None)
            | Self::Int64(None)
            | Self::Float64(None)
            | Self::Decimal(None, ..)
            | Self::Varchar(None)
            | Self::Blob(None)
            | Self::Date(None)
            | Self::Timestamp(None)
            | Self::Uuid(None) => true,
            _ => false,
        }
    }

    /// The same variant with its payload cleared, usable as a type descriptor.
    pub fn as_type(&self) -> Value {
        match self {
            Self::Null => Self::Null,
            Self::Boolean(..) => Self::Boolean(None),
            Self::Int16(..) => Self::Int16(None),
            Self::Int32(..) => Self::Int32(None),
            Self::Int64(..) => Self::Int64(None),
            Self::Float64(..) => Self::Float64(None),
            Self::Decimal(.., prec, scale) => Self::Decimal(None, *prec, *scale),
            Self::Varchar(..) => Self::Varchar(None),
            Self::Blob(..) => Self::Blob(None),
            Self::Date(..) => Self::Date(None),
            Self::Timestamp(..) => Self::Timestamp(None),
            Self::Uuid(..) => Self::Uuid(None),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(Some(value))
    }
}
impl From<i16> for Value {
    fn from(value: i16) -> Self {
        Self::Int16(Some(value))
    }
}
impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int32(Some(value))
    }
}
impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int64(Some(value))
    }
}
impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float64(Some(value))
    }
}
impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Varchar(Some(value.to_owned()))
    }
}
impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Varchar(Some(value))
    }
}
impl From<Uuid> for Value {
    fn from(value: Uuid) -> Self {
        Self::Uuid(Some(value))
    }
}
impl From<Decimal> for Value {
    fn from(value: Decimal) -> Self {
        Self::Decimal(Some(value), 0, 0)
    }
}
impl From<Date> for Value {
    fn from(value: Date) -> Self {
        Self::Date(Some(value))
    }
}
impl From<PrimitiveDateTime> for Value {
    fn from(value: PrimitiveDateTime) -> Self {
        Self::Timestamp(Some(value))
    }
}

/// Row shape returned by lookup queries.
pub type Row = Vec<Value>;

/// Map from column name to value, used by tests and executors.
pub type LabeledRow = BTreeMap<String, Value>;
