//! Clients for the two upstream services placefinder depends on: a generative
//! text-completion API (Gemini) and an IP-geolocation API (ip-api.com).
//!
//! Both are exposed behind small traits so the search pipeline and the HTTP
//! layer can be exercised against stubs or wiremock servers.

pub mod completion;
pub mod error;
pub mod geolocation;

mod http;

pub use completion::{CompletionService, GeminiClient};
pub use error::ProviderError;
pub use geolocation::{locate_or_default, GeolocationService, IpApiClient};
