//! rawhttp - Minimal HTTP/1.1 file and echo server
//!
//! Core library for wire parsing, routing and connection handling.

pub mod cli;
pub mod config;
pub mod files;
pub mod http;
pub mod observe;
pub mod router;
pub mod server;
