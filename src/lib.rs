//! Portico - whitelisted static file server
//!
//! Core library for request parsing, connection handling and file serving.

pub mod config;
pub mod http;
pub mod server;
pub mod site;
