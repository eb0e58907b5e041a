//! Command handlers.

pub mod cache;
pub mod common;
pub mod config;
pub mod fetch;
pub mod tiles;
