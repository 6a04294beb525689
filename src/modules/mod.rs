//! Modules layer - Infrastructure components for external integrations
//!
//! Contains clients and adapters for external services like outbound mail.

pub mod mail;
