//! # toebox-query
//!
//! Natural-language to structured shoe query translation.
//!
//! A free-text request is converted into typed [`ShoeSearchConditions`] by
//! a schema-constrained model call, lowered into SQL predicates and sort
//! directives by [`build_query`], and executed read-only against the Shoe
//! schema by [`SqliteCatalog`]. When translation fails, the pipeline falls
//! back to naive keyword extraction instead of surfacing an error.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`conditions`] | The typed filter/sort request schema |
//! | [`builder`] | Lowering conditions to SQL |
//! | [`catalog`] | The relational read path |
//! | [`translator`] | Model-backed translation and the keyword fallback |

pub mod builder;
pub mod catalog;
pub mod conditions;
pub mod translator;

pub use builder::{build_fallback_query, build_query, ShoeQuery, MAX_RESULTS};
pub use catalog::SqliteCatalog;
pub use conditions::{RangeSpec, Sentinel, ShoeSearchConditions, SortOrder, StringSpec};
pub use translator::ShoeQueryTranslator;
