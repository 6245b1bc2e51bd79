//! TurfHub Kernel Library
//!
//! Venue discovery pipeline, client query binding, and the HTTP surface.
//! The main entry point for running the server is the `turfhub` binary.

pub mod binding;
pub mod config;
pub mod db;
pub mod discovery;
pub mod error;
pub mod metrics;
pub mod routes;
pub mod state;
