//! Hierarchy tree: create, look up and list site entities.
//!
//! Every call re-derives nodes through [`crate::paths`] and reads the disk.
//! There is no cache; another process changing the tree is visible on the
//! next call.
//!
//! - `create_*` materializes the node's manifest; nothing is rolled back if
//!   a directory in the middle already exists
//! - `<level>()` verifies the node directory exists, never creates
//! - `<level>s()` lists `child_root` and resolves every subdirectory

use log::{debug, info};
use std::path::Path;

use crate::config::SiteConfig;
use crate::entities::{Category, Node, NodeKind, Task};
use crate::error::{Result, SiteError};
use crate::materialize::{ensure_dir, list_dirs, make_dirs};
use crate::paths::{self, SceneKey};
use crate::program::{Program, ProgramAdapter};
use crate::scan::{merge_tasks, scan_tasks};

pub struct Site {
    config: SiteConfig,
    root: Node,
}

impl Site {
    pub fn new(config: SiteConfig) -> Result<Self> {
        let root = paths::site(&config.root, &config.name)?;
        Ok(Self { config, root })
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Create the site's own directories, skipping those already present
    pub fn bootstrap(&self) -> Result<usize> {
        let mut created = 0;
        for entry in &self.root.subdirs {
            if ensure_dir(&self.root.dir, entry)? {
                created += 1;
            }
        }
        info!("Site {} ready at {} ({} dirs created)", self.root.name, self.root.dir.display(), created);
        Ok(created)
    }

    fn create(&self, node: Node) -> Result<Node> {
        info!("Creating {} {} at {}", node.kind.label(), node.name, node.dir.display());
        make_dirs(&node.dir, &node.subdirs)?;
        Ok(node)
    }

    fn existing(&self, node: Node) -> Result<Node> {
        if !node.dir.is_dir() {
            return Err(SiteError::not_found(
                format!("{} {}", node.kind.label(), node.name),
                &node.dir,
            ));
        }
        Ok(node)
    }

    fn children(&self, dir: &Path, mut get: impl FnMut(&str) -> Result<Node>) -> Result<Vec<Node>> {
        let names = list_dirs(dir)?;
        debug!("{} entries under {}", names.len(), dir.display());
        names.iter().map(|name| get(name)).collect()
    }

    // --- shows ---

    pub fn create_show(&self, name: &str) -> Result<Node> {
        self.create(paths::show(&self.root, name)?)
    }

    pub fn show(&self, name: &str) -> Result<Node> {
        self.existing(paths::show(&self.root, name)?)
    }

    pub fn shows(&self) -> Result<Vec<Node>> {
        self.children(&self.root.child_root, |n| self.show(n))
    }

    // --- groups ---

    pub fn create_group(&self, show: &Node, category: Category, name: &str) -> Result<Node> {
        self.create(paths::group(show, category, name)?)
    }

    pub fn group(&self, show: &Node, category: Category, name: &str) -> Result<Node> {
        self.existing(paths::group(show, category, name)?)
    }

    pub fn groups(&self, show: &Node, category: Category) -> Result<Vec<Node>> {
        self.children(&paths::groups_root(show, category), |n| {
            self.group(show, category, n)
        })
    }

    // --- units ---

    pub fn create_unit(&self, group: &Node, name: &str) -> Result<Node> {
        self.create(paths::unit(group, name)?)
    }

    pub fn unit(&self, group: &Node, name: &str) -> Result<Node> {
        self.existing(paths::unit(group, name)?)
    }

    pub fn units(&self, group: &Node) -> Result<Vec<Node>> {
        self.children(&group.child_root, |n| self.unit(group, n))
    }

    // --- parts ---

    fn part_node(&self, unit: &Node, name: &str) -> Result<Node> {
        let node = paths::part(unit, name)?;
        if let NodeKind::Part(category) = node.kind {
            self.config.check_part(category, name)?;
        }
        Ok(node)
    }

    pub fn create_part(&self, unit: &Node, name: &str) -> Result<Node> {
        self.create(self.part_node(unit, name)?)
    }

    pub fn part(&self, unit: &Node, name: &str) -> Result<Node> {
        self.existing(self.part_node(unit, name)?)
    }

    pub fn parts(&self, unit: &Node) -> Result<Vec<Node>> {
        self.children(&unit.child_root, |n| self.part(unit, n))
    }

    // --- programs & tasks ---

    fn part_category(part: &Node) -> Result<Category> {
        match part.kind {
            NodeKind::Part(category) => Ok(category),
            other => Err(SiteError::WrongLevel {
                expected: "part",
                found: other.type_name(),
            }),
        }
    }

    /// Tools configured for a part as `(tool key, adapter)`
    pub fn programs(&self, part: &Node) -> Result<Vec<(&str, &ProgramAdapter)>> {
        let category = Self::part_category(part)?;
        Ok(self
            .config
            .programs
            .programs(category, &part.name)?
            .iter()
            .map(|(k, v)| (k.as_str(), v))
            .collect())
    }

    pub fn program(&self, part: &Node, tool: &str) -> Result<&ProgramAdapter> {
        let category = Self::part_category(part)?;
        self.config.programs.program(category, &part.name, tool)
    }

    /// Tasks of a part across all of its tools, merged by name.
    ///
    /// A tool subdirectory that doesn't exist yet contributes nothing.
    pub fn tasks(&self, part: &Node) -> Result<Vec<Task>> {
        let key = SceneKey::from_part(part)?;
        let mut batches = Vec::new();
        for (tool, program) in self.programs(part)? {
            let dir = paths::scene_dir(part, program.subdir());
            if !dir.is_dir() {
                if dir == part.dir {
                    return Err(SiteError::not_found(format!("part {}", part.name), dir));
                }
                debug!("{}: no {} yet", tool, dir.display());
                continue;
            }
            batches.push(scan_tasks(&dir, &key, program.ext())?);
        }
        Ok(merge_tasks(batches))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::names;
    use std::fs;
    use tempfile::TempDir;

    fn site() -> (TempDir, Site) {
        let tmp = TempDir::new().unwrap();
        let cfg = SiteConfig::defaults(tmp.path()).unwrap();
        let site = Site::new(cfg).unwrap();
        site.bootstrap().unwrap();
        (tmp, site)
    }

    fn shot_part(site: &Site, part: &str) -> Node {
        let show = site.create_show("demo").unwrap();
        let group = site.create_group(&show, Category::Shot, "sq01").unwrap();
        let unit = site.create_unit(&group, "sh010").unwrap();
        site.create_part(&unit, part).unwrap()
    }

    #[test]
    fn test_bootstrap_idempotent() {
        let (tmp, site) = site();
        assert!(tmp.path().join("runner").is_dir());
        assert!(tmp.path().join("show").is_dir());
        assert_eq!(site.bootstrap().unwrap(), 0);
    }

    #[test]
    fn test_fresh_nodes_have_no_children() {
        let (_tmp, site) = site();
        assert!(site.shows().unwrap().is_empty());

        let show = site.create_show("demo").unwrap();
        assert!(site.groups(&show, Category::Asset).unwrap().is_empty());
        assert!(site.groups(&show, Category::Shot).unwrap().is_empty());

        let group = site.create_group(&show, Category::Asset, "char").unwrap();
        assert!(site.units(&group).unwrap().is_empty());

        let unit = site.create_unit(&group, "hero").unwrap();
        assert!(site.parts(&unit).unwrap().is_empty());

        let part = site.create_part(&unit, "model").unwrap();
        assert!(site.tasks(&part).unwrap().is_empty());
    }

    #[test]
    fn test_create_and_list() {
        let (_tmp, site) = site();
        site.create_show("alpha").unwrap();
        site.create_show("beta").unwrap();
        let mut shows = names(&site.shows().unwrap());
        shows.sort();
        assert_eq!(shows, vec!["alpha", "beta"]);

        let show = site.show("alpha").unwrap();
        site.create_group(&show, Category::Shot, "sq01").unwrap();
        let groups = site.groups(&show, Category::Shot).unwrap();
        assert_eq!(names(&groups), vec!["sq01"]);
        assert_eq!(groups[0].kind, NodeKind::Group(Category::Shot));
        assert!(site.groups(&show, Category::Asset).unwrap().is_empty());
    }

    #[test]
    fn test_show_layout() {
        let (tmp, site) = site();
        let show = site.create_show("demo").unwrap();
        assert_eq!(show.dir, tmp.path().join("show").join("demo"));
        for sub in ["asset/char", "doc/cglist", "vendor/out", "shot", "review"] {
            assert!(show.dir.join(sub).is_dir(), "missing {sub}");
        }
    }

    #[test]
    fn test_shot_unit_layout() {
        let (_tmp, site) = site();
        let show = site.create_show("demo").unwrap();
        let group = site.create_group(&show, Category::Shot, "sq01").unwrap();
        let unit = site.create_unit(&group, "sh010").unwrap();
        for sub in ["scan/base", "pub/cam", "work", "wip"] {
            assert!(unit.dir.join(sub).is_dir(), "missing {sub}");
        }
        let part = site.create_part(&unit, "comp").unwrap();
        assert_eq!(part.dir, unit.dir.join("wip").join("comp"));
        assert!(part.dir.is_dir());
    }

    #[test]
    fn test_create_show_twice() {
        let (_tmp, site) = site();
        let show = site.create_show("demo").unwrap();
        let marker = show.dir.join("doc").join("keep.txt");
        fs::write(&marker, "x").unwrap();

        let err = site.create_show("demo").unwrap_err();
        assert!(err.is_already_exists());
        assert!(marker.is_file());
        assert!(show.dir.join("vendor/out").is_dir());
    }

    #[test]
    fn test_lookup_missing() {
        let (_tmp, site) = site();
        assert!(site.show("ghost").unwrap_err().is_not_found());

        let show = site.create_show("demo").unwrap();
        let err = site.group(&show, Category::Asset, "none").unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("group none"));
    }

    #[test]
    fn test_unknown_part() {
        let (_tmp, site) = site();
        let show = site.create_show("demo").unwrap();
        let group = site.create_group(&show, Category::Asset, "char").unwrap();
        let unit = site.create_unit(&group, "hero").unwrap();
        let err = site.create_part(&unit, "comp").unwrap_err();
        assert!(matches!(err, SiteError::UnknownPart { .. }));
        assert!(!unit.child_root.join("comp").exists());
    }

    #[test]
    fn test_missing_children_root() {
        let (tmp, site) = site();
        fs::remove_dir(tmp.path().join("show")).unwrap();
        assert!(site.shows().unwrap_err().is_not_found());
    }

    #[test]
    fn test_tasks_merge_across_programs() {
        let (_tmp, site) = site();
        let part = shot_part(&site, "fx");
        let precomp = part.dir.join("precomp");
        fs::create_dir(&precomp).unwrap();
        fs::write(part.dir.join("demo_sq01_sh010_fx_smoke_v1.hip"), "").unwrap();
        fs::write(precomp.join("demo_sq01_sh010_fx_smoke_v1.nk"), "").unwrap();
        fs::write(precomp.join("demo_sq01_sh010_fx_dust_v2.nk"), "").unwrap();
        // nuke scenes outside the nuke subdir are not scanned
        fs::write(part.dir.join("demo_sq01_sh010_fx_stray_v1.nk"), "").unwrap();

        let tasks = site.tasks(&part).unwrap();
        let names: Vec<&str> = tasks.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["dust", "smoke"]);
        assert_eq!(tasks[1].versions, vec!["v1", "v1"]);
    }

    #[test]
    fn test_tasks_without_subdir() {
        let (_tmp, site) = site();
        let part = shot_part(&site, "fx");
        fs::write(part.dir.join("demo_sq01_sh010_fx_smoke_v2.hip"), "").unwrap();
        let tasks = site.tasks(&part).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].versions, vec!["v2"]);
    }

    #[test]
    fn test_program_lookup() {
        let (_tmp, site) = site();
        let part = shot_part(&site, "comp");
        assert_eq!(site.program(&part, "nuke").unwrap().ext(), ".nk");
        assert!(matches!(
            site.program(&part, "houdini"),
            Err(SiteError::UnknownProgram { .. })
        ));
        let tools: Vec<&str> = site.programs(&part).unwrap().into_iter().map(|(k, _)| k).collect();
        assert_eq!(tools, vec!["nuke"]);
    }
}
