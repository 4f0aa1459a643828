//! Query-scope resolution and completion parsing for placefinder.
//!
//! A query is classified into a [`Scope`](placefinder_core::Scope), the
//! matching region is built around the user's location, a prompt is sent to a
//! [`CompletionService`](placefinder_providers::CompletionService), and the
//! free-text answer is parsed into [`LocationRecord`]s checked against the
//! region's bounds.

pub mod error;
pub mod parse;
pub mod pipeline;
pub mod prompt;
pub mod types;

pub use error::QueryError;
pub use parse::{ParserOptions, ResponseParser};
pub use pipeline::{QueryPipeline, SearchPlan, SearchSettings};
pub use prompt::PromptBuilder;
pub use types::{AnnotatedRecord, LocationRecord, QueryResult};
