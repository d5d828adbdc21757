//! Name-based API over [`Site`].
//!
//! Everything is addressed by plain strings (show, category, group, unit,
//! part, tool, task, version) so the CLI and other front ends never handle
//! nodes directly. Categories are parsed here.

use log::info;
use std::path::PathBuf;

use crate::entities::{Category, DirEntry, Node, Task, names, parse_version};
use crate::error::{Result, SiteError};
use crate::materialize::ensure_dir;
use crate::paths::{self, SceneKey};
use crate::program::{Env, ErrorHandler, OpenHandle, Program, ProgramAdapter};
use crate::tree::Site;

/// Permission of tool subdirectories created on demand
const TOOL_DIR_PERM: &str = "2775";

/// Category names
pub fn categories() -> Vec<&'static str> {
    Category::ALL.iter().map(Category::as_str).collect()
}

/// Fully resolved scene: path, tool and environment overlay
#[derive(Debug, Clone)]
pub struct Scene<'a> {
    /// Directory holding the scene (part dir or tool subdir)
    pub dir: PathBuf,
    pub path: PathBuf,
    pub program: &'a ProgramAdapter,
    pub env: Env,
}

/// Address of a part by names
#[derive(Debug, Clone, Copy)]
pub struct PartAddr<'a> {
    pub show: &'a str,
    pub category: &'a str,
    pub group: &'a str,
    pub unit: &'a str,
    pub part: &'a str,
}

impl Site {
    pub fn show_names(&self) -> Result<Vec<String>> {
        Ok(names(&self.shows()?))
    }

    pub fn show_dir(&self, show: &str) -> Result<PathBuf> {
        Ok(self.show(show)?.dir)
    }

    pub fn group_names(&self, show: &str, ctg: &str) -> Result<Vec<String>> {
        let category: Category = ctg.parse()?;
        Ok(names(&self.groups(&self.show(show)?, category)?))
    }

    pub fn create_group_named(&self, show: &str, ctg: &str, grp: &str) -> Result<PathBuf> {
        let category: Category = ctg.parse()?;
        Ok(self.create_group(&self.show(show)?, category, grp)?.dir)
    }

    fn find_group(&self, show: &str, ctg: &str, grp: &str) -> Result<Node> {
        let category: Category = ctg.parse()?;
        self.group(&self.show(show)?, category, grp)
    }

    pub fn group_dir(&self, show: &str, ctg: &str, grp: &str) -> Result<PathBuf> {
        Ok(self.find_group(show, ctg, grp)?.dir)
    }

    pub fn unit_names(&self, show: &str, ctg: &str, grp: &str) -> Result<Vec<String>> {
        Ok(names(&self.units(&self.find_group(show, ctg, grp)?)?))
    }

    pub fn create_unit_named(&self, show: &str, ctg: &str, grp: &str, unit: &str) -> Result<PathBuf> {
        Ok(self.create_unit(&self.find_group(show, ctg, grp)?, unit)?.dir)
    }

    fn find_unit(&self, show: &str, ctg: &str, grp: &str, unit: &str) -> Result<Node> {
        self.unit(&self.find_group(show, ctg, grp)?, unit)
    }

    pub fn unit_dir(&self, show: &str, ctg: &str, grp: &str, unit: &str) -> Result<PathBuf> {
        Ok(self.find_unit(show, ctg, grp, unit)?.dir)
    }

    /// Parts allowed in a category
    pub fn valid_parts(&self, ctg: &str) -> Result<Vec<String>> {
        let category: Category = ctg.parse()?;
        Ok(self.config().valid_parts(category).to_vec())
    }

    pub fn part_names(&self, show: &str, ctg: &str, grp: &str, unit: &str) -> Result<Vec<String>> {
        Ok(names(&self.parts(&self.find_unit(show, ctg, grp, unit)?)?))
    }

    pub fn create_part_named(&self, show: &str, ctg: &str, grp: &str, unit: &str, part: &str) -> Result<PathBuf> {
        Ok(self.create_part(&self.find_unit(show, ctg, grp, unit)?, part)?.dir)
    }

    fn find_part(&self, show: &str, ctg: &str, grp: &str, unit: &str, part: &str) -> Result<Node> {
        self.part(&self.find_unit(show, ctg, grp, unit)?, part)
    }

    pub fn part_dir(&self, show: &str, ctg: &str, grp: &str, unit: &str, part: &str) -> Result<PathBuf> {
        Ok(self.find_part(show, ctg, grp, unit, part)?.dir)
    }

    /// Tool keys configured for an existing part
    pub fn tool_names(&self, show: &str, ctg: &str, grp: &str, unit: &str, part: &str) -> Result<Vec<String>> {
        let part = self.find_part(show, ctg, grp, unit, part)?;
        Ok(self
            .programs(&part)?
            .into_iter()
            .map(|(k, _)| k.to_string())
            .collect())
    }

    pub fn tasks_of(&self, show: &str, ctg: &str, grp: &str, unit: &str, part: &str) -> Result<Vec<Task>> {
        self.tasks(&self.find_part(show, ctg, grp, unit, part)?)
    }

    /// Resolve the scene file, tool and environment for a task version
    pub fn scene(&self, addr: &PartAddr<'_>, tool: &str, task: &str, version: &str) -> Result<Scene<'_>> {
        paths::validate_name(task)?;
        if parse_version(version).is_none() {
            return Err(SiteError::InvalidName {
                name: version.to_string(),
                reason: "version must be v<N> with N > 0",
            });
        }
        let node = self.find_part(addr.show, addr.category, addr.group, addr.unit, addr.part)?;
        let program = self.program(&node, tool)?;
        let key = SceneKey::from_part(&node)?;
        let dir = paths::scene_dir(&node, program.subdir());
        Ok(Scene {
            path: paths::scene_path(&dir, &key, task, version, program.ext()),
            dir,
            program,
            env: program.scene_env(&key, task),
        })
    }

    /// Create a new scene through the tool's create script (blocking).
    ///
    /// The tool subdirectory is created first when missing.
    pub fn create_task(&self, addr: &PartAddr<'_>, tool: &str, task: &str, version: &str) -> Result<PathBuf> {
        let scene = self.scene(addr, tool, task, version)?;
        if !scene.program.subdir().is_empty() {
            ensure_dir(&scene.dir, &DirEntry::new("", TOOL_DIR_PERM)?)?;
        }
        info!("Creating scene {}", scene.path.display());
        scene.program.create_scene(&scene.path, &scene.env)?;
        Ok(scene.path)
    }

    /// Open a scene detached; `on_error` fires once, only on failure
    pub fn open_task_with(
        &self,
        addr: &PartAddr<'_>,
        tool: &str,
        task: &str,
        version: &str,
        on_error: ErrorHandler,
    ) -> Result<PathBuf> {
        let scene = self.scene(addr, tool, task, version)?;
        scene.program.open_scene(&scene.path, &scene.env, on_error);
        Ok(scene.path)
    }

    /// Open a scene detached and get a handle reporting failure
    pub fn open_task(&self, addr: &PartAddr<'_>, tool: &str, task: &str, version: &str) -> Result<(PathBuf, OpenHandle)> {
        let scene = self.scene(addr, tool, task, version)?;
        let handle = scene.program.open(&scene.path, &scene.env);
        Ok((scene.path, handle))
    }
}
