//! Query-state engine for iconographic coin search.
//!
//! A user describes coins side by side (descriptors picked from recommendation
//! tables plus free keywords), combines the described coins into a boolean
//! relation such as `(C1 OR C2) AND NOT C3`, and pages through the search
//! results the backend returns for the compiled query.
//!
//! [`QueryEngine`] owns all of that state. It performs no I/O: backend calls are
//! returned as request values and their answers are applied back.

#[macro_use]
mod macros;
mod api;
pub mod backend;
pub mod coin;
pub mod config;
pub mod draft;
pub mod error;
pub mod input;
pub mod query_set;
pub mod relation;
pub mod results;

pub use api::{MAX_INSPECT_COINS, QueryEngine, RelationReport, inspect_relation};
pub use backend::{CompileRequest, SearchType, ServiceRequest, ServiceResponse};
pub use coin::{Category, Coin, CoinDraft, CoinId, CoinSide, Descriptor, Item, Keyword, Side};
pub use config::EngineConfig;
pub use error::{EngineError, Result};
pub use relation::{RelationExpression, Token, VisualToken};
pub use results::{ResultRecord, ResultSet, SortDirection};

/// Byte span into an input string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Start byte index (inclusive).
    pub start: usize,
    /// End byte index (exclusive).
    pub end: usize,
}
