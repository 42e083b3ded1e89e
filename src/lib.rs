pub mod api;
pub mod auth;
pub mod comparison;
pub mod config;
pub mod db;
pub mod engine;
pub mod entities;
pub mod error;
pub mod estimator;
pub mod external;
pub mod server;

#[cfg(test)]
pub(crate) mod testing;
