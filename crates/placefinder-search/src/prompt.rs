//! Builds the instruction sent to the completion service.

use placefinder_core::{CoordinateFormat, Region, Scope};

/// Maximum number of recommendations requested. Advisory only; the parser
/// does not cap results.
pub const MAX_RECOMMENDATIONS: usize = 25;

/// Query words that ask for a single best match.
const SUPERLATIVES: &[&str] = &["largest", "biggest", "smallest"];

/// True when the query asks for one superlative place ("largest park", ...).
#[must_use]
pub fn is_superlative(query: &str) -> bool {
    let lowered = query.to_lowercase();
    SUPERLATIVES.iter().any(|word| lowered.contains(word))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PromptBuilder {
    coordinate_format: CoordinateFormat,
}

impl PromptBuilder {
    #[must_use]
    pub const fn new(coordinate_format: CoordinateFormat) -> Self {
        Self { coordinate_format }
    }

    #[must_use]
    pub fn build(&self, query: &str, scope: Scope, region: &Region) -> String {
        let bounds = region.bounds();
        let mut prompt = format!(
            "User query: {}\n\
             Search scope: {scope}\n\
             Search region: {} (radius: {} km)\n\
             Center location: latitude {:.4}, longitude {:.4}\n\n",
            query.trim(),
            region.name,
            region.radius_km,
            region.center_lat,
            region.center_lon,
        );

        if is_superlative(query) {
            prompt.push_str(
                "The query asks for a single superlative place. Return exactly 1 \
                 recommendation: the one place that best answers the query.\n",
            );
        } else {
            prompt.push_str(&format!(
                "Provide between 1 and {MAX_RECOMMENDATIONS} relevant location recommendations \
                 within the search region. Include both well-known and lesser-known places \
                 that match the query.\n"
            ));
        }
        prompt.push('\n');

        prompt.push_str(&format!(
            "IMPORTANT: every coordinate must be a plain decimal number inside the search \
             region: latitude between {:.4} and {:.4}, longitude between {:.4} and {:.4}.\n\n",
            bounds.south, bounds.north, bounds.west, bounds.east
        ));

        prompt.push_str(
            "Format each recommendation as its own block, separated from the next by a blank line:\n\n",
        );
        prompt.push_str("Name: [location name]\n");
        prompt.push_str("Type: [specific category]\n");
        prompt.push_str("Description: [brief description including notable features]\n");
        prompt.push_str(&format!(
            "Coordinates: {}\n\nExample coordinates line: Coordinates: {}\n",
            self.coordinate_placeholder(),
            self.coordinate_example(region)
        ));

        prompt
    }

    fn coordinate_placeholder(&self) -> &'static str {
        match self.coordinate_format {
            CoordinateFormat::Space => "[latitude longitude]",
            CoordinateFormat::Comma => "[latitude, longitude]",
        }
    }

    fn coordinate_example(&self, region: &Region) -> String {
        match self.coordinate_format {
            CoordinateFormat::Space => {
                format!("{:.2} {:.2}", region.center_lat, region.center_lon)
            }
            CoordinateFormat::Comma => {
                format!("{:.2}, {:.2}", region.center_lat, region.center_lon)
            }
        }
    }
}
