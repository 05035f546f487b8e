//! Income and expense records.
//!
//! A transaction has no owner column of its own; it belongs to whoever owns
//! its category.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/transactions` | Filtered, ordered, paginated listing |
//! | POST | `/api/transactions` | Record a transaction |
//! | GET | `/api/transactions/by-category` | Sum and count per category |
//! | GET/PUT/PATCH/DELETE | `/api/transactions/{id}` | Single transaction |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
