// Export modules for testing and for the server binary
pub mod api;
pub mod artifacts;
pub mod backend;
pub mod config;
pub mod contracts;
pub mod error;
pub mod gas;
pub mod models;
pub mod price;
pub mod rpc;
pub mod service;
pub mod watcher;
