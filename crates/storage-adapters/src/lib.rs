//! Storage adapters: Postgres implementations of the repo ports (feature
//! `db-postgres`) and the local-disk image host (feature `media-local`).

#[cfg(feature = "db-postgres")]
pub mod postgres;

#[cfg(feature = "media-local")]
pub mod media_local;

#[cfg(feature = "media-local")]
pub use media_local::LocalImageStore;
