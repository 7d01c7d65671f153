// Library root: re-exports all modules so integration tests and external
// consumers can access the crate's public API.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod llm;
pub mod models;
pub mod routes;
pub mod services;
