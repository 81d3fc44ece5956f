//! # docquery
//!
//! Compiles backend-independent search expressions into the JSON query DSL of
//! a Lucene-based search engine.
//!
//! ## Features
//!
//! - Immutable expression trees with builder helpers
//! - Merging of redundant equality filters on single-valued fields
//! - Automatic splitting of oversized `terms` queries
//! - Scoring analysis to route non-scoring clauses into filter context
//! - Nested document queries with scoped field mappings
//! - Pluggable backend representations (typed DSL or raw JSON)
//! - Order-preserving encoding of arbitrary-precision decimals

// Core modules
pub mod backend;
pub mod compiler;
pub mod config;
pub mod decimal;
pub mod error;
pub mod expression;
pub mod mapping;

// Re-exports for the public API
pub use backend::{DslSink, JsonSink, Query, QuerySink};
pub use compiler::{CompileContext, CompiledQuery, QueryCompiler, compile};
pub use config::CompilerConfig;
pub use decimal::Decimal;
pub use error::{QueryError, Result};
pub use expression::{BoolExpression, Expression, RangePredicate, Value, ValueSet};
pub use mapping::{DocumentMapping, MappingSchema};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
