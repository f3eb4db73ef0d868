use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Sentinel substituted when a stored record carries no poster reference.
pub const NO_POSTER: &str = "No poster available";

/// The full set of records for one catalog, keyed by title.
///
/// Titles are case-sensitive and unique within a collection. Iteration
/// order is not guaranteed; callers that need a stable order sort for
/// themselves.
pub type Collection = HashMap<String, Movie>;

/// A single catalog entry.
///
/// The title is not part of the record: it is the key the record is stored
/// under (see [`Collection`]). Ratings are nominally 0.0 to 10.0, but that
/// range is a courtesy of the input layer, not an invariant of the record.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Movie {
    pub year: i32,
    pub rating: f64,
    #[serde(default = "default_poster")]
    pub poster: String,
}

fn default_poster() -> String {
    NO_POSTER.to_string()
}

impl Movie {
    pub fn new(year: i32, rating: f64, poster: impl Into<String>) -> Self {
        Movie {
            year,
            rating,
            poster: poster.into(),
        }
    }
}
