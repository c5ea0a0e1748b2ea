//! Schema-driven data-access core: entity and edge declarations compile into
//! a relational graph, and dialect-aware statement builders turn proposed
//! writes into SQL with explicit conflict-resolution semantics.

mod error;
mod executor;
mod field;
mod graph;
mod policy;
mod postgres;
mod resolver;
mod schema;
mod sql_writer;
mod sqlite;
mod statement;
mod util;
mod value;

pub use ::anyhow::Context;
pub use error::*;
pub use executor::*;
pub use field::*;
pub use graph::*;
pub use policy::*;
pub use postgres::*;
pub use resolver::*;
pub use schema::*;
pub use sql_writer::*;
pub use sqlite::*;
pub use statement::*;
pub use util::*;
pub use value::*;
