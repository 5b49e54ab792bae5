//! VIN lookup service with a local SQLite cache in front of the NHTSA vPIC
//! decoder.

pub mod config;
pub mod database;
pub mod errors;
pub mod models;
pub mod repositories;
pub mod services;
pub mod sources;
pub mod utils;
pub mod web;
