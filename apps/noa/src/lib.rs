//! # noa
//!
//! Application library for the Nôa Esperanza triage server: the HTTP API and
//! the CLI over the deterministic `noa-core` engine. The binary in
//! `main.rs` is a thin entry point; integration tests drive the same router
//! and commands through this library.

pub mod api;
pub mod cli;
