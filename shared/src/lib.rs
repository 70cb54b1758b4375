//! Shared models and utilities for the delivery marketplace backend.
//!
//! Entity structs live here so that server code, tests, and any future
//! client crates agree on one wire shape. Database derives are gated behind
//! the `db` feature so lightweight consumers don't pull in sqlx.

pub mod models;
pub mod util;
