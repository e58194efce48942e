// src/lib.rs
pub mod aggregator;
pub mod config;
pub mod probe;
pub mod selection;
pub mod server;
pub mod status;
