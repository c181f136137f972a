pub mod config;
pub mod database;
pub mod errors;
pub mod models;
pub mod render;
pub mod routes;
