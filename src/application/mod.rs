//! Application layer (use-cases, policies).
//!
//! Orchestrates repository calls the way the prompt library's front ends use
//! them, without depending on any particular UI.

pub mod workspace;
