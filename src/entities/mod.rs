//! Entities module - the value types of the site hierarchy
//!
//! - [`Category`]: asset / shot
//! - [`Perm`], [`DirEntry`]: directory manifests
//! - [`Node`], [`NodeKind`]: site, show, group, unit, part
//! - [`Task`]: scan result grouping versions by task name

pub mod category;
pub mod dir_entry;
pub mod node;
pub mod task;

pub use category::Category;
pub use dir_entry::{DirEntry, Perm};
pub use node::{Node, NodeKind, names};
pub use task::{Task, parse_version, version_tag};
