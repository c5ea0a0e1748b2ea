//! Entry point re-exporting the schema compiler, relational graph, statement
//! builders and dialect writers from `entgraph-core`.

pub use entgraph_core::*;
