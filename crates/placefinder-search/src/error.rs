use placefinder_core::CatalogError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("no query provided")]
    EmptyQuery,

    /// The pipeline ran but produced zero records. `completion_failed` is set
    /// when the completion call itself errored rather than returning unusable
    /// text.
    #[error("no results found for the query")]
    NoResults { completion_failed: bool },

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
