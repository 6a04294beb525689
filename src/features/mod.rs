pub mod auth;
pub mod concerns;
