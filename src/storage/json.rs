//! JSON backend: the whole catalog as one pretty-printed object.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::info;

use super::{DuplicatePolicy, MovieStore, StoreError};
use crate::movie::{Collection, Movie};

/// File-backed store holding the collection as a single JSON object:
/// titles as keys, `{year, rating, poster}` objects as values, written
/// with four-space indentation.
///
/// Every mutation is a full read-modify-write of the file (plain
/// write-then-close, no staging file). Duplicate inserts are rejected
/// unless reconfigured with [`JsonStore::with_duplicate_policy`].
pub struct JsonStore {
    path: PathBuf,
    on_duplicate: DuplicatePolicy,
}

impl JsonStore {
    /// Open a store at `path`, creating the file with an empty mapping
    /// when it does not exist.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if !path.exists() {
            fs::write(&path, "{}").map_err(|e| StoreError::Write(e.to_string()))?;
            info!("created store file {}", path.display());
        }
        Ok(JsonStore {
            path,
            on_duplicate: DuplicatePolicy::Reject,
        })
    }

    /// Replace the duplicate-insert policy (rejecting by default).
    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.on_duplicate = policy;
        self
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self, movies: &Collection) -> Result<(), StoreError> {
        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        movies
            .serialize(&mut ser)
            .map_err(|e| StoreError::Write(e.to_string()))?;
        fs::write(&self.path, buf).map_err(|e| StoreError::Write(e.to_string()))
    }
}

impl MovieStore for JsonStore {
    fn load(&self) -> Result<Collection, StoreError> {
        let contents = fs::read_to_string(&self.path)
            .map_err(|e| StoreError::Corrupt(format!("{}: {}", self.path.display(), e)))?;
        serde_json::from_str(&contents)
            .map_err(|e| StoreError::Corrupt(format!("{}: {}", self.path.display(), e)))
    }

    fn add(&self, title: &str, movie: Movie) -> Result<(), StoreError> {
        let mut movies = self.list();
        if movies.contains_key(title) && self.on_duplicate == DuplicatePolicy::Reject {
            return Err(StoreError::AlreadyExists {
                title: title.to_string(),
            });
        }
        movies.insert(title.to_string(), movie);
        self.save(&movies)
    }

    fn delete(&self, title: &str) -> Result<(), StoreError> {
        let mut movies = self.list();
        if movies.remove(title).is_none() {
            return Err(StoreError::NotFound {
                title: title.to_string(),
            });
        }
        self.save(&movies)
    }

    fn update_rating(&self, title: &str, rating: f64) -> Result<(), StoreError> {
        let mut movies = self.list();
        match movies.get_mut(title) {
            Some(movie) => movie.rating = rating,
            None => {
                return Err(StoreError::NotFound {
                    title: title.to_string(),
                })
            }
        }
        self.save(&movies)
    }
}
