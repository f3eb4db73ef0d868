//! Movie metadata lookup against the OMDb API.
//!
//! Only compiled with the `lookup` feature. The HTTP call lives behind
//! the [`MetadataSource`] trait so the app can be fed a canned source in
//! tests, and response decoding is a pure function over the body text.

use std::error::Error;
use std::fmt;

use serde::Deserialize;

use crate::movie::NO_POSTER;

const OMDB_URL: &str = "https://www.omdbapi.com/";

/// What a lookup provider knows about one movie.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieMetadata {
    pub title: String,
    pub year: i32,
    pub rating: f64,
    pub poster: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// The provider answered but knows no movie under that title.
    NotFound(String),
    /// The request failed before a response could be read.
    Http(String),
    /// The response did not fit the expected shape.
    Decode(String),
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupError::NotFound(reason) => write!(f, "no match: {}", reason),
            LookupError::Http(cause) => write!(f, "request failed: {}", cause),
            LookupError::Decode(cause) => write!(f, "unexpected response: {}", cause),
        }
    }
}

impl Error for LookupError {}

/// Source of movie metadata keyed by title.
pub trait MetadataSource: Send + Sync {
    fn find(&self, title: &str) -> Result<MovieMetadata, LookupError>;
}

/// [`MetadataSource`] backed by the OMDb `t=` title search.
pub struct OmdbClient {
    api_key: String,
    base_url: String,
    client: reqwest::blocking::Client,
}

impl OmdbClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        OmdbClient {
            api_key: api_key.into(),
            base_url: OMDB_URL.to_string(),
            client: reqwest::blocking::Client::new(),
        }
    }

    /// Point the client at another endpoint, e.g. a local stub server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl MetadataSource for OmdbClient {
    fn find(&self, title: &str) -> Result<MovieMetadata, LookupError> {
        let body = self
            .client
            .get(&self.base_url)
            .query(&[("apikey", self.api_key.as_str()), ("t", title)])
            .send()
            .map_err(|e| LookupError::Http(e.to_string()))?
            .text()
            .map_err(|e| LookupError::Http(e.to_string()))?;
        decode(&body)
    }
}

#[derive(Deserialize)]
struct OmdbResponse {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Error")]
    error: Option<String>,
    #[serde(rename = "Title")]
    title: Option<String>,
    #[serde(rename = "Year")]
    year: Option<String>,
    #[serde(rename = "imdbRating")]
    imdb_rating: Option<String>,
    #[serde(rename = "Poster")]
    poster: Option<String>,
}

fn decode(body: &str) -> Result<MovieMetadata, LookupError> {
    let response: OmdbResponse =
        serde_json::from_str(body).map_err(|e| LookupError::Decode(e.to_string()))?;
    if !response.response.eq_ignore_ascii_case("true") {
        let reason = response.error.unwrap_or_else(|| "no result".to_string());
        return Err(LookupError::NotFound(reason));
    }
    let title = response
        .title
        .ok_or_else(|| LookupError::Decode("missing title".to_string()))?;
    // OMDb reports series as "1999-2003"; the first year is the release.
    let year = parse_year(response.year.as_deref().unwrap_or_default())
        .ok_or_else(|| LookupError::Decode(format!("unusable year for '{}'", title)))?;
    let rating = match response.imdb_rating.as_deref() {
        None | Some("N/A") => 0.0,
        Some(raw) => raw
            .parse::<f64>()
            .map_err(|_| LookupError::Decode(format!("unusable rating for '{}'", title)))?,
    };
    let poster = match response.poster {
        Some(poster) if poster != "N/A" && !poster.is_empty() => poster,
        _ => NO_POSTER.to_string(),
    };
    Ok(MovieMetadata {
        title,
        year,
        rating,
        poster,
    })
}

fn parse_year(raw: &str) -> Option<i32> {
    let digits: String = raw.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_reads_a_full_response() {
        let body = r#"{
            "Title": "The Matrix",
            "Year": "1999",
            "imdbRating": "8.7",
            "Poster": "https://example.com/matrix.jpg",
            "Response": "True"
        }"#;

        let found = decode(body).unwrap();
        assert_eq!(found.title, "The Matrix");
        assert_eq!(found.year, 1999);
        assert_eq!(found.rating, 8.7);
        assert_eq!(found.poster, "https://example.com/matrix.jpg");
    }

    #[test]
    fn provider_miss_is_not_found() {
        let body = r#"{"Response": "False", "Error": "Movie not found!"}"#;

        let err = decode(body).unwrap_err();
        assert_eq!(err, LookupError::NotFound("Movie not found!".to_string()));
    }

    #[test]
    fn year_range_takes_the_first_year() {
        assert_eq!(parse_year("1999-2003"), Some(1999));
        assert_eq!(parse_year("1999"), Some(1999));
        assert_eq!(parse_year("N/A"), None);
    }

    #[test]
    fn missing_rating_becomes_zero() {
        let body = r#"{
            "Title": "Obscure",
            "Year": "1967",
            "imdbRating": "N/A",
            "Poster": "N/A",
            "Response": "True"
        }"#;

        let found = decode(body).unwrap();
        assert_eq!(found.rating, 0.0);
        assert_eq!(found.poster, NO_POSTER);
    }

    #[test]
    fn garbage_body_is_a_decode_error() {
        assert!(matches!(
            decode("<html>rate limited</html>"),
            Err(LookupError::Decode(_))
        ));
    }

    // Port 9 on loopback has no listener, so the request fails before a
    // body exists.
    #[test]
    fn find_against_an_unreachable_endpoint_is_an_http_error() {
        let client = OmdbClient::new("key").with_base_url("http://127.0.0.1:9/");
        assert!(matches!(client.find("Matrix"), Err(LookupError::Http(_))));
    }
}
