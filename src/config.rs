//! Site configuration
//!
//! Built once at startup and passed to everything that needs it:
//! - site root path
//! - valid parts per category
//! - program table
//!
//! Root priority: CLI `--root` → `SITE_ROOT` env var → error.
//! `<root>/site.json`, when present, overrides the built-in tables.

use indexmap::IndexMap;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::entities::Category;
use crate::error::{Result, SiteError};
use crate::program::registry::default_specs;
use crate::program::{ProgramSpecs, ProgramTable, ScriptRunner};

/// Environment variable holding the site root
pub const ROOT_ENV: &str = "SITE_ROOT";

/// Optional per-site overrides, relative to the root
pub const SITE_FILE: &str = "site.json";

/// Runner scripts directory, relative to the root
pub const RUNNER_DIR: &str = "runner";

pub const DEFAULT_SITE_NAME: &str = "2L";

/// On-disk shape of `site.json`; every field optional
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteFile {
    pub name: Option<String>,
    pub parts: Option<IndexMap<Category, Vec<String>>>,
    pub programs: Option<ProgramSpecs>,
}

impl SiteFile {
    pub fn from_json(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| SiteError::io(path, e))?;
        serde_json::from_str(&text)
            .map_err(|e| SiteError::Config(format!("{}: {}", path.display(), e)))
    }
}

/// Built-in parts per category
pub fn default_parts() -> IndexMap<Category, Vec<String>> {
    let owned = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    let mut parts = IndexMap::new();
    parts.insert(Category::Asset, owned(&["model", "look", "rig"]));
    parts.insert(Category::Shot, owned(&["fx", "lit", "comp"]));
    parts
}

#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub root: PathBuf,
    pub name: String,
    pub parts: IndexMap<Category, Vec<String>>,
    pub programs: ProgramTable,
}

impl SiteConfig {
    /// Resolve the site root from CLI argument or environment
    pub fn root_from_env_and_cli(cli_root: Option<PathBuf>) -> Result<PathBuf> {
        cli_root
            .or_else(|| {
                std::env::var_os(ROOT_ENV)
                    .filter(|s| !s.is_empty())
                    .map(PathBuf::from)
            })
            .ok_or_else(|| {
                SiteError::Config(format!(
                    "set the {} environment variable (or pass --root) before using elo",
                    ROOT_ENV
                ))
            })
    }

    pub fn from_env_and_cli(cli_root: Option<PathBuf>) -> Result<Self> {
        let root = Self::root_from_env_and_cli(cli_root)?;
        Self::load(&root)
    }

    /// Built-in tables for `root`, with `site.json` overrides if present
    pub fn load(root: &Path) -> Result<Self> {
        let site_file = root.join(SITE_FILE);
        let overrides = if site_file.is_file() {
            info!("Loading site overrides from {}", site_file.display());
            SiteFile::from_json(&site_file)?
        } else {
            debug!("No {} at {}, using defaults", SITE_FILE, root.display());
            SiteFile::default()
        };
        Self::with_overrides(root, overrides)
    }

    pub fn with_overrides(root: &Path, overrides: SiteFile) -> Result<Self> {
        let runner = ScriptRunner::new(root.join(RUNNER_DIR));
        let specs = overrides.programs.unwrap_or_else(default_specs);
        Ok(Self {
            root: root.to_path_buf(),
            name: overrides
                .name
                .unwrap_or_else(|| DEFAULT_SITE_NAME.to_string()),
            parts: overrides.parts.unwrap_or_else(default_parts),
            programs: ProgramTable::from_specs(&specs, &runner)?,
        })
    }

    pub fn defaults(root: &Path) -> Result<Self> {
        Self::with_overrides(root, SiteFile::default())
    }

    pub fn runner(&self) -> ScriptRunner {
        ScriptRunner::new(self.root.join(RUNNER_DIR))
    }

    /// Parts allowed under `category`
    pub fn valid_parts(&self, category: Category) -> &[String] {
        self.parts
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn check_part(&self, category: Category, part: &str) -> Result<()> {
        if self.valid_parts(category).iter().any(|p| p == part) {
            Ok(())
        } else {
            Err(SiteError::UnknownPart {
                category: category.to_string(),
                part: part.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_cli_root_wins() {
        let root = SiteConfig::root_from_env_and_cli(Some(PathBuf::from("/custom"))).unwrap();
        assert_eq!(root, PathBuf::from("/custom"));
    }

    /// Restores `SITE_ROOT` when dropped
    struct RootEnvGuard(Option<std::ffi::OsString>);

    impl RootEnvGuard {
        fn set(value: Option<&std::ffi::OsStr>) -> Self {
            let saved = std::env::var_os(ROOT_ENV);
            // SAFETY: only this test touches SITE_ROOT
            unsafe {
                match value {
                    Some(v) => std::env::set_var(ROOT_ENV, v),
                    None => std::env::remove_var(ROOT_ENV),
                }
            }
            Self(saved)
        }
    }

    impl Drop for RootEnvGuard {
        fn drop(&mut self) {
            unsafe {
                match &self.0 {
                    Some(v) => std::env::set_var(ROOT_ENV, v),
                    None => std::env::remove_var(ROOT_ENV),
                }
            }
        }
    }

    // SITE_ROOT is process-wide: all of its cases stay in this one test
    #[test]
    fn test_root_from_env() {
        {
            let _guard = RootEnvGuard::set(None);
            let err = SiteConfig::root_from_env_and_cli(None).unwrap_err();
            assert!(matches!(err, SiteError::Config(ref msg) if msg.contains(ROOT_ENV)));
            assert!(matches!(SiteConfig::from_env_and_cli(None), Err(SiteError::Config(_))));
        }
        {
            let _guard = RootEnvGuard::set(Some(std::ffi::OsStr::new("")));
            let err = SiteConfig::root_from_env_and_cli(None).unwrap_err();
            assert!(matches!(err, SiteError::Config(_)));
        }
        {
            let _guard = RootEnvGuard::set(Some(std::ffi::OsStr::new("/env/site")));
            let root = SiteConfig::root_from_env_and_cli(None).unwrap();
            assert_eq!(root, PathBuf::from("/env/site"));
            let root = SiteConfig::root_from_env_and_cli(Some(PathBuf::from("/cli"))).unwrap();
            assert_eq!(root, PathBuf::from("/cli"));
        }
        #[cfg(unix)]
        {
            use std::ffi::OsStr;
            use std::os::unix::ffi::OsStrExt;
            let raw = OsStr::from_bytes(b"/sites/\xe9t\xe9");
            let _guard = RootEnvGuard::set(Some(raw));
            let root = SiteConfig::root_from_env_and_cli(None).unwrap();
            assert_eq!(root.as_os_str(), raw);
        }
    }

    #[test]
    fn test_defaults() {
        let cfg = SiteConfig::defaults(Path::new("/site")).unwrap();
        assert_eq!(cfg.name, "2L");
        assert_eq!(cfg.valid_parts(Category::Asset), ["model", "look", "rig"]);
        assert_eq!(cfg.valid_parts(Category::Shot), ["fx", "lit", "comp"]);
        assert!(cfg.check_part(Category::Shot, "comp").is_ok());
        assert!(matches!(
            cfg.check_part(Category::Asset, "comp"),
            Err(SiteError::UnknownPart { .. })
        ));
        assert_eq!(cfg.runner().dir(), Path::new("/site/runner"));
    }

    #[test]
    fn test_site_json_overrides() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join(SITE_FILE),
            r#"{
                "name": "studio",
                "parts": { "shot": ["anim"] },
                "programs": { "shot": { "anim": { "maya": {} } } }
            }"#,
        )
        .unwrap();
        let cfg = SiteConfig::load(tmp.path()).unwrap();
        assert_eq!(cfg.name, "studio");
        assert_eq!(cfg.valid_parts(Category::Shot), ["anim"]);
        assert!(cfg.valid_parts(Category::Asset).is_empty());
        assert!(cfg.programs.program(Category::Shot, "anim", "maya").is_ok());
    }

    #[test]
    fn test_bad_site_json() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(SITE_FILE), "{ not json").unwrap();
        assert!(matches!(SiteConfig::load(tmp.path()), Err(SiteError::Config(_))));
    }
}
