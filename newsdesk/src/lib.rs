// Library interface for newsdesk modules
// This allows tests and the binary to import modules

pub mod desk;
pub mod error;
pub mod generator;
pub mod models;
pub mod server;
pub mod store;
pub mod ui;
