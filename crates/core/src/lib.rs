//! Shared domain types for the foltia broadcast catalog.
//!
//! Everything here is storage-agnostic: coded enumerations and their decode
//! rules, the video format table, schedule time decoding, and the cache
//! capability the database layer is parameterized over.

pub mod broadcast_time;
pub mod cache;
pub mod error;
pub mod recording;
pub mod types;
pub mod video;
