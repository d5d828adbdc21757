//! ELO - VFX pipeline site manager library
//!
//! Re-exports all modules for use by the `elo` binary.

// Domain
pub mod entities;
pub mod error;
pub mod paths;

// Filesystem and scenes
pub mod materialize;
pub mod scan;

// External tools
pub mod program;

// App modules
pub mod api;
pub mod cli;
pub mod config;
pub mod tree;

pub use api::{PartAddr, Scene};
pub use config::SiteConfig;
pub use entities::{Category, Node, NodeKind, Task};
pub use error::{Result, SiteError};
pub use program::{OpenHandle, Program, ProgramAdapter};
pub use tree::Site;
