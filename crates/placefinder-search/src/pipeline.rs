//! Classify → region → prompt → completion → parse.

use placefinder_core::{AppConfig, GeoPoint, Region, RegionCatalog, Scope, ScopeClassifier, ScopeRadii};
use placefinder_providers::CompletionService;

use crate::error::QueryError;
use crate::parse::{ParserOptions, ResponseParser};
use crate::prompt::PromptBuilder;
use crate::types::QueryResult;

/// Everything the pipeline needs besides the completion backend.
#[derive(Debug, Clone, Default)]
pub struct SearchSettings {
    pub radii: ScopeRadii,
    pub parser: ParserOptions,
    pub classifier: ScopeClassifier,
}

/// The offline half of a search: scope, region, and the prompt that would be
/// sent for them.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPlan {
    pub scope: Scope,
    pub region: Region,
    pub prompt: String,
}

impl SearchSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            radii: config.scope_radii,
            parser: ParserOptions {
                enforce_bounds: config.enforce_bounds,
                coordinate_format: config.coordinate_format,
            },
            classifier: ScopeClassifier::new(&config.city_keywords, &config.region_keywords),
        }
    }

    /// Classifies `query` and builds the prompt for it around `location`.
    ///
    /// A fresh [`RegionCatalog`] is built for every call so nothing is shared
    /// between requests.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::EmptyQuery`] for blank input.
    pub fn plan(&self, query: &str, location: GeoPoint) -> Result<SearchPlan, QueryError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(QueryError::EmptyQuery);
        }

        let scope = self.classifier.classify(query);

        let mut catalog = RegionCatalog::new(self.radii);
        catalog.initialize(location.latitude, location.longitude);
        let region = catalog.lookup(scope)?.clone();

        let prompt = PromptBuilder::new(self.parser.coordinate_format).build(query, scope, &region);

        Ok(SearchPlan {
            scope,
            region,
            prompt,
        })
    }
}

pub struct QueryPipeline<C> {
    completion: C,
    settings: SearchSettings,
}

impl<C: CompletionService> QueryPipeline<C> {
    #[must_use]
    pub fn new(completion: C, settings: SearchSettings) -> Self {
        Self {
            completion,
            settings,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Runs one search for `query` centered on `user_location`.
    ///
    /// A failing completion call is logged and treated as empty output; it is
    /// never retried.
    ///
    /// # Errors
    ///
    /// - [`QueryError::EmptyQuery`] for blank input.
    /// - [`QueryError::NoResults`] when no record survives parsing.
    /// - [`QueryError::Catalog`] if the region lookup fails.
    pub async fn run(&self, query: &str, user_location: GeoPoint) -> Result<QueryResult, QueryError> {
        let plan = self.settings.plan(query, user_location)?;

        tracing::info!(
            scope = %plan.scope,
            region = %plan.region.name,
            radius_km = plan.region.radius_km,
            "searching places"
        );

        let (text, completion_failed) = match self.completion.complete(&plan.prompt).await {
            Ok(text) => (text, false),
            Err(e) => {
                tracing::error!(error = %e, "completion request failed");
                (String::new(), true)
            }
        };

        let records = ResponseParser::new(self.settings.parser).parse(&text, &plan.region);
        if records.is_empty() {
            return Err(QueryError::NoResults { completion_failed });
        }

        tracing::info!(count = records.len(), scope = %plan.scope, "places found");

        Ok(QueryResult {
            records,
            scope: plan.scope,
            region_name: plan.region.name,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use placefinder_providers::ProviderError;

    use super::*;

    const MUMBAI: GeoPoint = GeoPoint::new(19.0549, 72.8258);

    /// Returns a canned reply and remembers the prompts it was given.
    struct StubCompletion {
        reply: Result<String, ()>,
        prompts: Mutex<Vec<String>>,
    }

    impl StubCompletion {
        fn replying(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err(()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    impl CompletionService for StubCompletion {
        async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply
                .clone()
                .map_err(|()| ProviderError::Api("stub failure".to_string()))
        }
    }

    impl CompletionService for &StubCompletion {
        async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
            (**self).complete(prompt).await
        }
    }

    #[test]
    fn plan_rejects_blank_query() {
        let err = SearchSettings::default().plan("   ", MUMBAI).unwrap_err();
        assert!(matches!(err, QueryError::EmptyQuery));
    }

    #[test]
    fn plan_classifies_and_picks_region() {
        let plan = SearchSettings::default()
            .plan("quiet cafe", MUMBAI)
            .expect("plan");
        assert_eq!(plan.scope, Scope::Nearby);
        assert_eq!(plan.region.name, "Nearby Area");
        assert!((plan.region.radius_km - 5.0).abs() < f64::EPSILON);
        assert!(plan.prompt.contains("User query: quiet cafe"));
    }

    #[test]
    fn plan_uses_configured_keywords() {
        let settings = SearchSettings {
            classifier: ScopeClassifier::new(&["pune"], &["konkan"]),
            ..SearchSettings::default()
        };
        assert_eq!(settings.plan("temples in pune", MUMBAI).unwrap().scope, Scope::City);
        assert_eq!(settings.plan("konkan temples", MUMBAI).unwrap().scope, Scope::Region);
        assert_eq!(settings.plan("temples in mumbai", MUMBAI).unwrap().scope, Scope::Local);
    }

    #[tokio::test]
    async fn largest_park_query_uses_region_scope_and_single_result_prompt() {
        let stub = StubCompletion::replying(
            "Name: Sanjay Gandhi National Park\nType: National Park\nCoordinates: 19.2147 72.9106",
        );
        let pipeline = QueryPipeline::new(&stub, SearchSettings::default());

        let result = pipeline
            .run("largest park in mumbai", MUMBAI)
            .await
            .expect("one record");

        assert_eq!(result.scope, Scope::Region);
        assert_eq!(result.region_name, "Mumbai Metropolitan Region");
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].name, "Sanjay Gandhi National Park");

        let prompts = stub.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("exactly 1"));
    }

    #[tokio::test]
    async fn superlative_reply_with_several_blocks_is_still_accepted() {
        let stub = StubCompletion::replying(
            "Name: A\nCoordinates: 19.10 72.83\n\nName: B\nCoordinates: 19.11 72.84",
        );
        let pipeline = QueryPipeline::new(&stub, SearchSettings::default());
        let result = pipeline.run("biggest beach", MUMBAI).await.expect("records");
        assert_eq!(result.records.len(), 2);
    }

    #[tokio::test]
    async fn completion_failure_becomes_no_results() {
        let stub = StubCompletion::failing();
        let pipeline = QueryPipeline::new(&stub, SearchSettings::default());
        let err = pipeline.run("hospital", MUMBAI).await.unwrap_err();
        assert!(matches!(
            err,
            QueryError::NoResults {
                completion_failed: true
            }
        ));
    }

    #[tokio::test]
    async fn unusable_text_becomes_no_results() {
        let stub = StubCompletion::replying("Sorry, I cannot help with that.");
        let pipeline = QueryPipeline::new(&stub, SearchSettings::default());
        let err = pipeline.run("hospital", MUMBAI).await.unwrap_err();
        assert!(matches!(
            err,
            QueryError::NoResults {
                completion_failed: false
            }
        ));
    }

    #[tokio::test]
    async fn blank_query_never_reaches_completion() {
        let stub = StubCompletion::replying("Name: A\nCoordinates: 19.10 72.83");
        let pipeline = QueryPipeline::new(&stub, SearchSettings::default());
        let err = pipeline.run("", MUMBAI).await.unwrap_err();
        assert!(matches!(err, QueryError::EmptyQuery));
        assert!(stub.prompts().is_empty());
    }

    #[tokio::test]
    async fn comma_settings_flow_into_prompt_and_parser() {
        let stub = StubCompletion::replying("Name: Juhu Beach\nCoordinates: 19.10, 72.83");
        let settings = SearchSettings {
            parser: ParserOptions {
                enforce_bounds: true,
                coordinate_format: placefinder_core::CoordinateFormat::Comma,
            },
            ..SearchSettings::default()
        };
        let pipeline = QueryPipeline::new(&stub, settings);
        let result = pipeline.run("beach", MUMBAI).await.expect("records");
        assert_eq!(result.records.len(), 1);
        assert!(stub.prompts()[0].contains("[latitude, longitude]"));
    }
}
