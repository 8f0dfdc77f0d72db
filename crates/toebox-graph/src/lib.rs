//! # toebox-graph
//!
//! The pipeline orchestrator: a small fixed-topology sequence
//!
//! ```text
//! fetch_shoe_data → generate_query → retrieve → respond
//! ```
//!
//! with two routing decisions erring toward the cheaper path: structured
//! shoe lookup runs only for a user-authored turn the classifier says needs
//! specifications, and document retrieval is skipped when the already
//! fetched shoe data answers the question. Nodes communicate only through
//! [`ConversationState`] slices; `respond` appends exactly one assistant
//! message.

pub mod format;
pub mod graph;
pub mod routing;
pub mod state;

pub use graph::ShoeGraph;
pub use state::{ConversationState, QueryUpdate};
