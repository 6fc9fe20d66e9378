//! Promptvault: a local prompt library.
//!
//! Projects hold folders and prompts, prompts carry a version history and
//! tags. Everything lives in one SQLite file; see [`infra::db::Database`].

pub mod application;
pub mod domain;
pub mod infra;
