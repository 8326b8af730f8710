pub mod config;
pub mod database;
pub mod errors;
pub mod inference;
pub mod labels;
pub mod ordering;
pub mod server;
pub mod services;
