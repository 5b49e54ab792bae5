//! HTTP request handlers organized by domain

pub mod export;
pub mod health;
pub mod lookup;
