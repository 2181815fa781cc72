//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Caching lives one level up in
//! [`crate::catalog`].

pub mod subtitle_repo;

pub use subtitle_repo::SubtitleRepo;
