//! In-memory store for tests and ephemeral sessions.

use std::sync::{Arc, RwLock};

use super::{DuplicatePolicy, MovieStore, StoreError};
use crate::movie::{Collection, Movie};

/// Store keeping the collection in a shared map, with no file behind it.
///
/// Cloning shares the underlying storage, so a clone observes writes made
/// through the original. Since entries live in a keyed map,
/// [`DuplicatePolicy::Append`] behaves like `Overwrite` here.
#[derive(Clone)]
pub struct MemoryStore {
    movies: Arc<RwLock<Collection>>,
    on_duplicate: DuplicatePolicy,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore {
            movies: Arc::new(RwLock::new(Collection::new())),
            on_duplicate: DuplicatePolicy::Reject,
        }
    }

    /// Replace the duplicate-insert policy (rejecting by default).
    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.on_duplicate = policy;
        self
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MovieStore for MemoryStore {
    fn load(&self) -> Result<Collection, StoreError> {
        let movies = self
            .movies
            .read()
            .map_err(|_| StoreError::Corrupt("lock poisoned".into()))?;
        Ok(movies.clone())
    }

    fn add(&self, title: &str, movie: Movie) -> Result<(), StoreError> {
        let mut movies = self
            .movies
            .write()
            .map_err(|_| StoreError::Write("lock poisoned".into()))?;
        if movies.contains_key(title) && self.on_duplicate == DuplicatePolicy::Reject {
            return Err(StoreError::AlreadyExists {
                title: title.to_string(),
            });
        }
        movies.insert(title.to_string(), movie);
        Ok(())
    }

    fn delete(&self, title: &str) -> Result<(), StoreError> {
        let mut movies = self
            .movies
            .write()
            .map_err(|_| StoreError::Write("lock poisoned".into()))?;
        if movies.remove(title).is_none() {
            return Err(StoreError::NotFound {
                title: title.to_string(),
            });
        }
        Ok(())
    }

    fn update_rating(&self, title: &str, rating: f64) -> Result<(), StoreError> {
        let mut movies = self
            .movies
            .write()
            .map_err(|_| StoreError::Write("lock poisoned".into()))?;
        match movies.get_mut(title) {
            Some(movie) => {
                movie.rating = rating;
                Ok(())
            }
            None => Err(StoreError::NotFound {
                title: title.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_then_load_returns_the_movie() {
        let store = MemoryStore::new();
        store.add("Matrix", Movie::new(1999, 8.7, "m.jpg")).unwrap();

        let movies = store.load().unwrap();
        assert_eq!(movies["Matrix"], Movie::new(1999, 8.7, "m.jpg"));
    }

    #[test]
    fn duplicate_add_is_rejected_by_default() {
        let store = MemoryStore::new();
        store.add("Matrix", Movie::new(1999, 8.7, "m.jpg")).unwrap();

        let err = store.add("Matrix", Movie::new(2003, 7.2, "r.jpg"));
        assert_eq!(
            err,
            Err(StoreError::AlreadyExists {
                title: "Matrix".to_string()
            })
        );
        assert_eq!(store.load().unwrap()["Matrix"].year, 1999);
    }

    #[test]
    fn overwrite_policy_replaces_the_record() {
        let store = MemoryStore::new().with_duplicate_policy(DuplicatePolicy::Overwrite);
        store.add("Matrix", Movie::new(1999, 8.7, "m.jpg")).unwrap();
        store.add("Matrix", Movie::new(2003, 7.2, "r.jpg")).unwrap();

        let movies = store.load().unwrap();
        assert_eq!(movies.len(), 1);
        assert_eq!(movies["Matrix"].year, 2003);
    }

    #[test]
    fn append_policy_degenerates_to_overwrite() {
        let store = MemoryStore::new().with_duplicate_policy(DuplicatePolicy::Append);
        store.add("Matrix", Movie::new(1999, 8.7, "old.jpg")).unwrap();
        store.add("Matrix", Movie::new(1999, 9.0, "new.jpg")).unwrap();

        let movies = store.load().unwrap();
        assert_eq!(movies.len(), 1);
        assert_eq!(movies["Matrix"], Movie::new(1999, 9.0, "new.jpg"));
    }

    #[test]
    fn delete_missing_title_reports_not_found() {
        let store = MemoryStore::new();
        assert_eq!(
            store.delete("Matrix"),
            Err(StoreError::NotFound {
                title: "Matrix".to_string()
            })
        );
    }

    #[test]
    fn update_rating_keeps_other_fields() {
        let store = MemoryStore::new();
        store.add("Matrix", Movie::new(1999, 8.7, "m.jpg")).unwrap();
        store.update_rating("Matrix", 9.0).unwrap();

        let movies = store.load().unwrap();
        assert_eq!(movies["Matrix"], Movie::new(1999, 9.0, "m.jpg"));
    }

    #[test]
    fn clones_share_storage() {
        let store = MemoryStore::new();
        let other = store.clone();
        other.add("Matrix", Movie::new(1999, 8.7, "m.jpg")).unwrap();

        assert!(store.load().unwrap().contains_key("Matrix"));
    }
}
