mod app;
#[cfg(feature = "lookup")]
mod lookup;
mod movie;
mod storage;
pub mod website;

pub use app::MovieApp;
#[cfg(feature = "lookup")]
pub use lookup::{LookupError, MetadataSource, MovieMetadata, OmdbClient};
pub use movie::{Collection, Movie, NO_POSTER};
pub use storage::{
    CsvStore, DuplicatePolicy, JsonStore, MemoryStore, MovieStore, StoreError,
};
