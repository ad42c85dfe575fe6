pub mod clients;
pub mod config;
pub mod import;
pub mod logger;
pub mod models;
pub mod save;
pub mod session;
pub mod staging;
pub mod validation;
