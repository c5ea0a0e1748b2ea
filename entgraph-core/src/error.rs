use thiserror::Error;

/// Errors surfaced at the crate boundary.
///
/// Schema-compile failures (`InvalidField`, `AmbiguousEdge`, `DuplicateEntity`)
/// abort the whole compilation and never produce a partially-resolved graph.
/// Policy and statement failures abort the one mutation request they belong
/// to. Execution failures are reported verbatim from the executor; the core
/// never retries or downgrades them.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid field `{entity}.{field}`: {reason}")]
    InvalidField {
        entity: String,
        field: String,
        reason: String,
    },

    #[error("ambiguous edge configuration: `{edge}` conflicts with `{other}`: {reason}")]
    AmbiguousEdge {
        edge: String,
        other: String,
        reason: String,
    },

    #[error("entity `{0}` is declared more than once")]
    DuplicateEntity(String),

    #[error("unknown entity `{0}`")]
    UnknownEntity(String),

    #[error("unknown column `{column}` on `{entity}`")]
    UnknownColumn { entity: String, column: String },

    #[error("invalid conflict target on `{entity}`: {reason}")]
    InvalidConflictTarget { entity: String, reason: String },

    #[error("value rejected for `{entity}.{field}`: {reason}")]
    Validation {
        entity: String,
        field: String,
        reason: String,
    },

    #[error("unique constraint `{constraint}` violated")]
    ConstraintViolation { constraint: String },

    #[error("dialect `{dialect}` does not support {feature}")]
    UnsupportedDialect {
        dialect: &'static str,
        feature: &'static str,
    },

    /// Opaque failure reported by the injected executor.
    #[error(transparent)]
    Execution(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
