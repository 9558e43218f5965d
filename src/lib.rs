pub mod admin;
pub mod config;
pub mod database;
pub mod document;
pub mod errors;
pub mod markup;
pub mod server;
pub mod services;
