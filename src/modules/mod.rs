//! Modules layer - Infrastructure components for external integrations
//!
//! Contains adapters for outbound services such as mail delivery.

pub mod mail;
