//! Storage layer: one contract, interchangeable flat-file backends.
//!
//! [`MovieStore`] declares the catalog operations. Two durable backends
//! implement it, [`JsonStore`] and [`CsvStore`], plus [`MemoryStore`] for
//! tests and embedding. A backend is selected at startup and never mixed
//! with another at runtime.
//!
//! The file backends hold no collection state between calls: every
//! operation re-reads the backing file, applies its change, and writes
//! everything back before returning. The file is the single source of
//! truth. That
//! makes each mutation O(n) in the catalog size, which is the simplest
//! correct strategy for a personal catalog (the CSV insert path is the one
//! exception: it appends a single row).
//!
//! ## Example
//!
//! ```ignore
//! use cinevault::{JsonStore, Movie, MovieStore};
//!
//! let store = JsonStore::new("movies.json")?;
//! store.add("The Matrix", Movie::new(1999, 8.7, "matrix.jpg"))?;
//! store.update_rating("The Matrix", 9.0)?;
//! assert_eq!(store.list()["The Matrix"].rating, 9.0);
//! ```

mod csv;
mod error;
mod json;
mod memory;

use tracing::warn;

use crate::movie::{Collection, Movie};

pub use csv::CsvStore;
pub use error::StoreError;
pub use json::JsonStore;
pub use memory::MemoryStore;

/// What `add` does when the title is already present.
///
/// The two file formats historically disagreed here: the JSON backend
/// rejected duplicate inserts while the CSV backend appended a second row
/// without looking. Rather than bake either behavior into the contract,
/// each backend takes a policy and defaults to its historical one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Refuse the insert and signal [`StoreError::AlreadyExists`].
    Reject,
    /// Replace the stored record.
    Overwrite,
    /// Store the record additionally. Keyed stores cannot hold two records
    /// under one title and treat this as `Overwrite`; the CSV backend
    /// appends a second row, and later rows shadow earlier ones on load.
    Append,
}

/// Storage contract for one movie catalog.
///
/// Implementations are synchronous: every call blocks until its file
/// operation completes, and every file handle is scoped to that one call.
pub trait MovieStore: Send + Sync {
    /// Strict read of the whole collection.
    ///
    /// Fails with [`StoreError::Corrupt`] when the store is missing,
    /// unreadable, unparsable, or the wrong shape.
    fn load(&self) -> Result<Collection, StoreError>;

    /// Fail-soft read: a store that cannot be loaded is reported as a
    /// warning and comes back as an empty collection. Never fails.
    fn list(&self) -> Collection {
        match self.load() {
            Ok(movies) => movies,
            Err(e) => {
                warn!("discarding unreadable store: {}", e);
                Collection::new()
            }
        }
    }

    /// Insert a record under `title`, governed by the backend's
    /// [`DuplicatePolicy`].
    fn add(&self, title: &str, movie: Movie) -> Result<(), StoreError>;

    /// Remove the record for `title`. Signals [`StoreError::NotFound`] and
    /// writes nothing when it is absent.
    fn delete(&self, title: &str) -> Result<(), StoreError>;

    /// Replace the rating of the record for `title`, leaving year and
    /// poster untouched. Signals [`StoreError::NotFound`] and writes
    /// nothing when it is absent.
    fn update_rating(&self, title: &str, rating: f64) -> Result<(), StoreError>;
}
