// src/probe/mod.rs
mod http;
mod server;

pub use http::HttpServer;
pub use server::{ProbeOutcome, Server, ServerCheck};
