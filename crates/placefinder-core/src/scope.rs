//! Search scope tiers and the keyword classifier that picks one for a query.

use serde::{Deserialize, Serialize};

/// Discrete search-radius tier, ordered by increasing radius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Nearby,
    Local,
    City,
    Metro,
    Region,
}

impl Scope {
    /// Every scope, smallest radius first.
    pub const ALL: [Scope; 5] = [
        Scope::Nearby,
        Scope::Local,
        Scope::City,
        Scope::Metro,
        Scope::Region,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Scope::Nearby => "nearby",
            Scope::Local => "local",
            Scope::City => "city",
            Scope::Metro => "metro",
            Scope::Region => "region",
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

const METRO_KEYWORDS: &[&str] = &["college", "university", "hospital", "mall"];
const OUTDOOR_KEYWORDS: &[&str] = &["park", "beach", "forest", "hill", "mountain", "island"];
const NEARBY_KEYWORDS: &[&str] = &["restaurant", "shop", "cafe", "store", "salon"];

pub const DEFAULT_CITY_KEYWORDS: &[&str] = &["mumbai"];
pub const DEFAULT_REGION_KEYWORDS: &[&str] = &["maharashtra"];

/// One classification rule: any keyword contained in the query selects `scope`.
#[derive(Debug, Clone)]
struct ScopeRule {
    keywords: Vec<String>,
    scope: Scope,
}

impl ScopeRule {
    fn new<S: AsRef<str>>(keywords: &[S], scope: Scope) -> Self {
        Self {
            keywords: keywords
                .iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
            scope,
        }
    }

    fn matches(&self, lowered_query: &str) -> bool {
        self.keywords.iter().any(|k| lowered_query.contains(k.as_str()))
    }
}

/// Maps a free-text query to a [`Scope`].
///
/// Rules are evaluated in a fixed order and the first match wins:
///
/// 1. institutions (college, university, hospital, mall) → [`Scope::Metro`]
/// 2. outdoor places (park, beach, forest, hill, mountain, island) → [`Scope::Region`]
/// 3. small businesses (restaurant, shop, cafe, store, salon) → [`Scope::Nearby`]
/// 4. a city name → [`Scope::City`]
/// 5. a broader region name → [`Scope::Region`]
///
/// Anything else is [`Scope::Local`]. Matching is case-insensitive substring
/// matching, so "parking" counts as "park".
#[derive(Debug, Clone)]
pub struct ScopeClassifier {
    rules: Vec<ScopeRule>,
}

impl Default for ScopeClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_CITY_KEYWORDS, DEFAULT_REGION_KEYWORDS)
    }
}

impl ScopeClassifier {
    /// Builds the rule list with the given city and region names in slots 4 and 5.
    #[must_use]
    pub fn new<S: AsRef<str>>(city_keywords: &[S], region_keywords: &[S]) -> Self {
        Self {
            rules: vec![
                ScopeRule::new(METRO_KEYWORDS, Scope::Metro),
                ScopeRule::new(OUTDOOR_KEYWORDS, Scope::Region),
                ScopeRule::new(NEARBY_KEYWORDS, Scope::Nearby),
                ScopeRule::new(city_keywords, Scope::City),
                ScopeRule::new(region_keywords, Scope::Region),
            ],
        }
    }

    #[must_use]
    pub fn classify(&self, query: &str) -> Scope {
        let lowered = query.to_lowercase();
        let scope = self
            .rules
            .iter()
            .find(|rule| rule.matches(&lowered))
            .map_or(Scope::Local, |rule| rule.scope);

        tracing::debug!(query, scope = %scope, "determined search scope");
        scope
    }
}
