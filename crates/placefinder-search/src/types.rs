//! Records produced by the response parser and the pipeline.

use placefinder_core::Scope;
use serde::{Deserialize, Serialize};

/// One candidate place extracted from completion text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub name: String,
    /// Free-form category; `"unspecified"` when the block had no `Type:` line.
    #[serde(rename = "type")]
    pub category: String,
    pub latitude: f64,
    pub longitude: f64,
    pub description: Option<String>,
}

pub const UNSPECIFIED_CATEGORY: &str = "unspecified";

/// Output of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    /// Records in the order they appeared in the completion text.
    pub records: Vec<LocationRecord>,
    pub scope: Scope,
    pub region_name: String,
}

/// A record tagged with the scope and region it was searched in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedRecord {
    #[serde(flatten)]
    pub record: LocationRecord,
    pub search_scope: Scope,
    pub search_region: String,
}

impl QueryResult {
    #[must_use]
    pub fn annotated(&self) -> Vec<AnnotatedRecord> {
        self.records
            .iter()
            .map(|record| AnnotatedRecord {
                record: record.clone(),
                search_scope: self.scope,
                search_region: self.region_name.clone(),
            })
            .collect()
    }
}
