// src/repositories/postgres/mod.rs

pub mod appointment;
pub mod coin;
pub mod property;
pub mod rental;
pub mod user;
pub mod wallet;

/// Postgres error code for a violated unique constraint.
pub(crate) const UNIQUE_VIOLATION: &str = "23505";
