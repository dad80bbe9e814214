//! rhttp library crate.
//!
//! The binary sends one HTTP request per invocation and records every
//! request/response pair in a flat directory of JSON files. The history store
//! in [`crate::history`] can be embedded on its own; [`crate::prelude`]
//! re-exports the pieces needed for that.

pub mod prelude;

pub mod args;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod files;
pub mod history;
pub mod http;
pub mod size;
