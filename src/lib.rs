pub mod access;
pub mod amount;
pub mod config;
pub mod constants;
pub mod distance;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod readiness;
pub mod server;
pub mod shows;
pub mod state;
pub mod storage;
pub mod summary;

pub mod gateway;
pub mod observability;

// Ports and their adapters
pub mod app;
pub mod infra;
