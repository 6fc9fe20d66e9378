//! Domain types for Promptvault.
//! Defines the records stored in the prompt library and the errors its store can raise.

pub mod error;
pub mod folder;
pub mod project;
pub mod prompt;
pub mod tag;

pub use error::*;
pub use folder::*;
pub use project::*;
pub use prompt::*;
pub use tag::*;
