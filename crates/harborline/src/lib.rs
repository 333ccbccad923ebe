//! Harborline application crate.
//!
//! Wires the pure pipeline pieces from `harborline-core` to concrete
//! infrastructure: TOML configuration, the SQLite-backed vector store,
//! embedding backends, and the HTTP gateway to the language model. The
//! `harborline` binary in `main.rs` is a thin CLI over [`service`] and
//! [`ingest`].

pub mod config;
pub mod db;
pub mod embedder;
pub mod gateway;
pub mod ingest;
pub mod migrate;
pub mod service;
pub mod store_sqlite;
