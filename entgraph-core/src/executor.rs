use crate::{Result, Statement, Value};
use std::future::Future;

/// Outcome of executing a write statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowsAffected {
    pub rows_affected: u64,
    /// The written row's identifier, when the statement carries an inline
    /// read-back (`RETURNING`) or the driver reports it natively.
    pub last_inserted_id: Option<Value>,
}

/// Execution seam between built statements and a concrete connection.
///
/// The statement layer is pure; an `Executor` owns the side effects. Drivers
/// implement it over their connection type, tests over an in-memory store.
pub trait Executor: Send {
    /// Runs a write statement, binding `statement.params` in order.
    fn execute(
        &mut self,
        statement: &Statement,
    ) -> impl Future<Output = Result<RowsAffected>> + Send;

    /// Runs a query expected to produce at most one row.
    fn fetch_one(
        &mut self,
        statement: &Statement,
    ) -> impl Future<Output = Result<Option<Vec<Value>>>> + Send;
}
