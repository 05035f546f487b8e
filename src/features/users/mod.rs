//! User accounts.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/users/me` | Current user's profile |
//! | PATCH | `/api/users/me` | Update username, email, names or password |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
