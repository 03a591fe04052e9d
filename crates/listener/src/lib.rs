//! `pawalert-listener` library crate.
//!
//! Configuration, rendering and the startup location lookup, exposed for
//! integration tests. The binary entrypoint lives in `main.rs`.

pub mod config;
pub mod locate;
pub mod render;
