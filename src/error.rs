//! Site errors
//!
//! Every library operation returns [`Result`]. The binary wraps these in
//! `anyhow` at the edges.

use std::path::PathBuf;

/// Errors raised by site operations
#[derive(Debug)]
pub enum SiteError {
    /// Missing or unreadable site configuration (fatal at startup)
    Config(String),
    /// Entity or directory absent on disk
    NotFound { what: String, path: PathBuf },
    /// Directory creation hit an existing path
    AlreadyExists(PathBuf),
    /// Any other filesystem failure
    Io { path: PathBuf, source: std::io::Error },
    /// Permission string is not 4 octal digits
    InvalidPerm(String),
    /// Category is neither `asset` nor `shot`
    InvalidCategory(String),
    /// Node passed where a different hierarchy level was expected
    WrongLevel { expected: &'static str, found: &'static str },
    /// Entity name breaks the naming grammar
    InvalidName { name: String, reason: &'static str },
    /// Part not configured for the category
    UnknownPart { category: String, part: String },
    /// No adapter configured for (category, part, tool)
    UnknownProgram { category: String, part: String, tool: String },
    /// External tool exited with a non-zero status
    ProcessFailed { program: PathBuf, code: Option<i32>, stderr: String },
    /// External tool could not be started
    Launch { program: PathBuf, source: std::io::Error },
}

impl std::fmt::Display for SiteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SiteError::Config(msg) => write!(f, "Configuration error: {}", msg),
            SiteError::NotFound { what, path } => {
                write!(f, "{} not found: {}", what, path.display())
            }
            SiteError::AlreadyExists(path) => {
                write!(f, "Directory already exists: {}", path.display())
            }
            SiteError::Io { path, source } => write!(f, "I/O error at {}: {}", path.display(), source),
            SiteError::InvalidPerm(perm) => {
                write!(f, "Permission must be a 4-digit octal string, got {:?}", perm)
            }
            SiteError::InvalidCategory(ctg) => write!(f, "Invalid category name: {}", ctg),
            SiteError::WrongLevel { expected, found } => {
                write!(f, "Expected a {} node, got a {} node", expected, found)
            }
            SiteError::InvalidName { name, reason } => {
                write!(f, "Invalid name {:?}: {}", name, reason)
            }
            SiteError::UnknownPart { category, part } => {
                write!(f, "Unknown part for {}: {}", category, part)
            }
            SiteError::UnknownProgram { category, part, tool } => {
                write!(f, "Unknown program {} for {}/{}", tool, category, part)
            }
            SiteError::ProcessFailed { program, code, stderr } => {
                let code = code.map_or_else(|| "signal".to_string(), |c| c.to_string());
                write!(f, "{} exit with error {}: {}", program.display(), code, stderr)
            }
            SiteError::Launch { program, source } => {
                write!(f, "Failed to launch {}: {}", program.display(), source)
            }
        }
    }
}

impl std::error::Error for SiteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SiteError::Io { source, .. } | SiteError::Launch { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl SiteError {
    /// Wrap an I/O error, promoting `AlreadyExists` and `NotFound` kinds
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::AlreadyExists => SiteError::AlreadyExists(path),
            std::io::ErrorKind::NotFound => SiteError::NotFound {
                what: "Directory".to_string(),
                path,
            },
            _ => SiteError::Io { path, source },
        }
    }

    pub fn not_found(what: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        SiteError::NotFound {
            what: what.into(),
            path: path.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, SiteError::NotFound { .. })
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, SiteError::AlreadyExists(_))
    }
}

pub type Result<T> = std::result::Result<T, SiteError>;
