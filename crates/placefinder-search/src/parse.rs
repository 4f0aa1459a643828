//! Extraction of [`LocationRecord`]s from free-form completion text.
//!
//! The completion is expected to contain one block per place, blocks separated
//! by blank lines, each block made of `Label: value` lines. Models routinely
//! decorate those lines with list markers or markdown bold, so label matching
//! tolerates both.

use std::sync::LazyLock;

use placefinder_core::{CoordinateFormat, GeoPoint, Region};
use regex::Regex;

use crate::types::{LocationRecord, UNSPECIFIED_CATEGORY};

static LABEL_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^[ \t]*(?:[-*+•][ \t]+|\d+[.)][ \t]*)?(?:\*\*|__)?[ \t]*((?:place|location)[ \t]+(?:name|type)|name|location|place|type|category|description|coordinates|coords)[ \t]*(?:\*\*|__)?[ \t]*:[ \t]*(?:\*\*|__)?[ \t]*(.*)$",
    )
    .expect("valid regex")
});

static COMMA_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\[(]?[ \t]*([-+]?(?:\d*\.\d+|\d+))[ \t]*,[ \t]*([-+]?(?:\d*\.\d+|\d+))")
        .expect("valid regex")
});

/// Parser behavior switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserOptions {
    /// Drop records outside the globe or outside the region's bounds.
    pub enforce_bounds: bool,
    pub coordinate_format: CoordinateFormat,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            enforce_bounds: true,
            coordinate_format: CoordinateFormat::Space,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseParser {
    options: ParserOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Name,
    Category,
    Description,
    Coordinates,
}

impl Field {
    fn from_label(label: &str) -> Option<Self> {
        // "Place Name" and "Place Type" are keyed by their last word.
        let label = label.to_ascii_lowercase();
        match label.split_whitespace().last()? {
            "name" | "location" | "place" => Some(Self::Name),
            "type" | "category" => Some(Self::Category),
            "description" => Some(Self::Description),
            "coordinates" | "coords" => Some(Self::Coordinates),
            _ => None,
        }
    }
}

/// Labelled values found in one block. The first occurrence of a label wins.
#[derive(Debug, Default)]
struct RawBlock<'a> {
    name: Option<&'a str>,
    category: Option<&'a str>,
    description: Option<&'a str>,
    coordinates: Option<&'a str>,
}

impl<'a> RawBlock<'a> {
    fn from_lines(lines: &[&'a str]) -> Self {
        let mut block = Self::default();
        for &line in lines {
            let Some(caps) = LABEL_LINE.captures(line) else {
                continue;
            };
            let (Some(label), Some(value)) = (caps.get(1), caps.get(2)) else {
                continue;
            };
            let Some(field) = Field::from_label(label.as_str()) else {
                continue;
            };
            let value = clean_value(value.as_str());
            let slot = match field {
                Field::Name => &mut block.name,
                Field::Category => &mut block.category,
                Field::Description => &mut block.description,
                Field::Coordinates => &mut block.coordinates,
            };
            if slot.is_none() && !value.is_empty() {
                *slot = Some(value);
            }
        }
        block
    }
}

/// Strips surrounding whitespace and any trailing markdown emphasis.
fn clean_value(value: &str) -> &str {
    value
        .trim()
        .trim_end_matches("**")
        .trim_end_matches("__")
        .trim()
}

/// Outcome of reading a coordinates value.
#[derive(Debug, PartialEq)]
enum Coordinates {
    Found(GeoPoint),
    Missing,
    Malformed(String),
}

impl ResponseParser {
    #[must_use]
    pub const fn new(options: ParserOptions) -> Self {
        Self { options }
    }

    #[must_use]
    pub const fn options(&self) -> ParserOptions {
        self.options
    }

    /// Parses `raw` into records, in the order their blocks appear.
    ///
    /// Blocks without a name or a readable coordinate pair are skipped. With
    /// bounds enforcement on, records outside `region` are skipped too. No
    /// deduplication and no result cap is applied.
    #[must_use]
    pub fn parse(&self, raw: &str, region: &Region) -> Vec<LocationRecord> {
        let normalized = raw.replace("\r\n", "\n");
        let records: Vec<LocationRecord> = split_blocks(&normalized)
            .iter()
            .enumerate()
            .filter_map(|(index, lines)| self.parse_block(index, lines, region))
            .collect();

        tracing::debug!(
            records = records.len(),
            region = %region.name,
            enforce_bounds = self.options.enforce_bounds,
            "parsed completion text"
        );
        records
    }

    fn parse_block(&self, index: usize, lines: &[&str], region: &Region) -> Option<LocationRecord> {
        let block = RawBlock::from_lines(lines);

        let Some(name) = block.name else {
            tracing::trace!(block = index, "block has no name; skipping");
            return None;
        };

        let point = match block
            .coordinates
            .map_or(Coordinates::Missing, |value| self.read_coordinates(value))
        {
            Coordinates::Found(point) => point,
            Coordinates::Missing => {
                tracing::debug!(block = index, name, "block has no coordinates; skipping");
                return None;
            }
            Coordinates::Malformed(reason) => {
                tracing::warn!(
                    block = index,
                    name,
                    reason = %reason,
                    "unparseable coordinates; skipping block"
                );
                return None;
            }
        };

        if self.options.enforce_bounds && !region.accepts(point) {
            tracing::debug!(
                block = index,
                name,
                point = %point,
                region = %region.name,
                "coordinates outside region; skipping"
            );
            return None;
        }

        Some(LocationRecord {
            name: name.to_string(),
            category: block.category.unwrap_or(UNSPECIFIED_CATEGORY).to_string(),
            latitude: point.latitude,
            longitude: point.longitude,
            description: block.description.map(str::to_string),
        })
    }

    fn read_coordinates(&self, value: &str) -> Coordinates {
        match self.options.coordinate_format {
            CoordinateFormat::Space => read_space_pair(value),
            CoordinateFormat::Comma => read_comma_pair(value),
        }
    }
}

/// Groups consecutive non-blank lines.
fn split_blocks(text: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

const COORDINATE_BRACKETS: &[char] = &['[', ']', '(', ')'];

/// Reads the first two tokens separated by whitespace and/or commas.
fn read_space_pair(value: &str) -> Coordinates {
    let mut tokens = value
        .split(|c: char| c.is_whitespace() || c == ',')
        .map(|token| token.trim_matches(COORDINATE_BRACKETS))
        .filter(|token| !token.is_empty());

    let (Some(lat), Some(lon)) = (tokens.next(), tokens.next()) else {
        return Coordinates::Missing;
    };
    to_point(lat, lon)
}

fn read_comma_pair(value: &str) -> Coordinates {
    let Some(caps) = COMMA_PAIR.captures(value) else {
        return Coordinates::Missing;
    };
    match (caps.get(1), caps.get(2)) {
        (Some(lat), Some(lon)) => to_point(lat.as_str(), lon.as_str()),
        _ => Coordinates::Missing,
    }
}

fn to_point(lat: &str, lon: &str) -> Coordinates {
    let parse = |token: &str| -> Result<f64, String> {
        let parsed = token
            .parse::<f64>()
            .map_err(|e| format!("\"{token}\": {e}"))?;
        if parsed.is_finite() {
            Ok(parsed)
        } else {
            Err(format!("\"{token}\" is not a finite number"))
        }
    };

    match (parse(lat), parse(lon)) {
        (Ok(latitude), Ok(longitude)) => Coordinates::Found(GeoPoint::new(latitude, longitude)),
        (Err(reason), _) | (_, Err(reason)) => Coordinates::Malformed(reason),
    }
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
