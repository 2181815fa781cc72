//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` row struct matching the database columns
//! - The decoded entity handed to callers
//! - `Deserialize` query and update DTOs

pub mod subtitle;
