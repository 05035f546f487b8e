//! Per-user spending and income categories.
//!
//! Names are unique per owner, ignoring case. A category that still has
//! transactions cannot be deleted.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
