//! Path builder - pure mapping from hierarchy position to directories.
//!
//! Layout under the site root:
//!
//! ```text
//! <root>/show/<show>/<category>/<group>/<unit>/wip/<part>/[<subdir>/]<scene>
//! ```
//!
//! Nothing here touches the filesystem. Every node, whether about to be
//! created or re-derived for lookup, goes through these functions so that
//! `dir == parent.child_root / name` always holds.

use std::path::{Path, PathBuf};

use crate::entities::dir_entry::manifest;
use crate::entities::{Category, Node, NodeKind};
use crate::error::{Result, SiteError};

/// Delimiter between name fields in scene filenames
pub const DELIM: char = '_';

/// Subdirectory of a unit holding its parts
pub const WIP_DIR: &str = "wip";

const SITE_DIRS: &[(&str, &str)] = &[("", "0755"), ("runner", "0755"), ("show", "0755")];

const SHOW_DIRS: &[(&str, &str)] = &[
    ("", "0755"),
    ("asset", "0755"),
    ("asset/char", "2775"),
    ("asset/env", "2775"),
    ("asset/prop", "2775"),
    ("doc", "0755"),
    ("doc/cglist", "0755"),
    ("doc/credit", "0755"),
    ("doc/droid", "0755"),
    ("data", "0755"),
    ("data/edit", "0755"),
    ("data/onset", "0755"),
    ("data/lut", "0755"),
    ("scan", "0755"),
    ("vendor", "0755"),
    ("vendor/in", "0755"),
    ("vendor/out", "0755"),
    ("review", "2775"),
    ("in", "0755"),
    ("out", "0755"),
    ("shot", "2775"),
];

const GROUP_DIRS: &[(&str, &str)] = &[("", "2775")];

const ASSET_UNIT_DIRS: &[(&str, &str)] = &[("", "2775"), ("wip", "2775")];

const SHOT_UNIT_DIRS: &[(&str, &str)] = &[
    ("", "2775"),
    ("scan", "0755"),
    ("scan/base", "0755"),
    ("scan/source", "0755"),
    ("ref", "0755"),
    ("pub", "0755"),
    ("pub/cam", "2775"),
    ("pub/geo", "2775"),
    ("pub/char", "2775"),
    ("work", "2775"),
    ("wip", "2775"),
];

const PART_DIRS: &[(&str, &str)] = &[("", "2775")];

/// Check an entity or task name against the naming grammar
pub fn validate_name(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        Some("empty")
    } else if name == "." || name == ".." {
        Some("reserved")
    } else if name.contains('/') || name.contains('\\') {
        Some("contains a path separator")
    } else if name.contains(DELIM) {
        Some("contains the '_' delimiter")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(SiteError::InvalidName {
            name: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

fn expect_level(node: &Node, expected: &'static str) -> Result<()> {
    if node.kind.type_name() == expected {
        Ok(())
    } else {
        Err(SiteError::WrongLevel {
            expected,
            found: node.kind.type_name(),
        })
    }
}

fn child(parent: &Node, kind: NodeKind, name: &str, dir: PathBuf, subdirs: &[(&str, &str)]) -> Result<Node> {
    validate_name(name)?;
    let child_root = match kind {
        NodeKind::Unit(_) => dir.join(WIP_DIR),
        _ => dir.clone(),
    };
    Ok(Node {
        kind,
        name: name.to_string(),
        lineage: parent.path_names(),
        dir,
        child_root,
        subdirs: manifest(subdirs)?,
    })
}

/// Site root node; children live in `<root>/show`
pub fn site(root: &Path, name: &str) -> Result<Node> {
    Ok(Node {
        kind: NodeKind::Site,
        name: name.to_string(),
        lineage: Vec::new(),
        dir: root.to_path_buf(),
        child_root: root.join("show"),
        subdirs: manifest(SITE_DIRS)?,
    })
}

pub fn show(site: &Node, name: &str) -> Result<Node> {
    expect_level(site, "site")?;
    let dir = site.child_root.join(name);
    child(site, NodeKind::Show, name, dir, SHOW_DIRS)
}

/// Directory holding all groups of one category in a show
pub fn groups_root(show: &Node, category: Category) -> PathBuf {
    show.child_root.join(category.as_str())
}

pub fn group(show: &Node, category: Category, name: &str) -> Result<Node> {
    expect_level(show, "show")?;
    let dir = groups_root(show, category).join(name);
    child(show, NodeKind::Group(category), name, dir, GROUP_DIRS)
}

pub fn unit(group: &Node, name: &str) -> Result<Node> {
    let NodeKind::Group(category) = group.kind else {
        return Err(SiteError::WrongLevel {
            expected: "group",
            found: group.kind.type_name(),
        });
    };
    let subdirs = match category {
        Category::Asset => ASSET_UNIT_DIRS,
        Category::Shot => SHOT_UNIT_DIRS,
    };
    let dir = group.child_root.join(name);
    child(group, NodeKind::Unit(category), name, dir, subdirs)
}

pub fn part(unit: &Node, name: &str) -> Result<Node> {
    let NodeKind::Unit(category) = unit.kind else {
        return Err(SiteError::WrongLevel {
            expected: "unit",
            found: unit.kind.type_name(),
        });
    };
    let dir = unit.child_root.join(name);
    child(unit, NodeKind::Part(category), name, dir, PART_DIRS)
}

/// Identity fields encoded into every scene filename of a part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneKey {
    pub show: String,
    pub group: String,
    pub unit: String,
    pub part: String,
}

impl SceneKey {
    pub fn new(show: &str, group: &str, unit: &str, part: &str) -> Self {
        Self {
            show: show.to_string(),
            group: group.to_string(),
            unit: unit.to_string(),
            part: part.to_string(),
        }
    }

    pub fn from_part(part: &Node) -> Result<Self> {
        expect_level(part, "part")?;
        match part.lineage.as_slice() {
            [show, group, unit] => Ok(Self::new(show, group, unit, &part.name)),
            _ => Err(SiteError::WrongLevel {
                expected: "part",
                found: part.kind.type_name(),
            }),
        }
    }

    /// `show_group_unit_part_`
    pub fn prefix(&self) -> String {
        format!(
            "{show}{d}{group}{d}{unit}{d}{part}{d}",
            show = self.show,
            group = self.group,
            unit = self.unit,
            part = self.part,
            d = DELIM
        )
    }

    /// `show_group_unit_part_task_version<ext>`
    pub fn scene_file_name(&self, task: &str, version: &str, ext: &str) -> String {
        format!("{}{}{}{}{}", self.prefix(), task, DELIM, version, ext)
    }
}

/// Directory holding a program's scenes for a part
pub fn scene_dir(part: &Node, subdir: &str) -> PathBuf {
    if subdir.is_empty() {
        part.dir.clone()
    } else {
        part.dir.join(subdir)
    }
}

/// Full scene path: `dir/show_group_unit_part_task_version<ext>`
pub fn scene_path(dir: &Path, key: &SceneKey, task: &str, version: &str, ext: &str) -> PathBuf {
    dir.join(key.scene_file_name(task, version, ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_part(category: Category) -> Node {
        let site = site(Path::new("/site"), "2L").unwrap();
        let show = show(&site, "demo").unwrap();
        let group = group(&show, category, "sq01").unwrap();
        let unit = unit(&group, "sh010").unwrap();
        part(&unit, "fx").unwrap()
    }

    #[test]
    fn test_dirs_follow_parent_child_root() {
        let site = site(Path::new("/site"), "2L").unwrap();
        assert_eq!(site.child_root, PathBuf::from("/site/show"));

        let show = show(&site, "demo").unwrap();
        assert_eq!(show.dir, site.child_root.join("demo"));
        assert_eq!(show.child_root, show.dir);

        let group = group(&show, Category::Shot, "sq01").unwrap();
        assert_eq!(group.dir, PathBuf::from("/site/show/demo/shot/sq01"));

        let asset_group = super::group(&show, Category::Asset, "char").unwrap();
        assert_eq!(asset_group.dir, PathBuf::from("/site/show/demo/asset/char"));

        let unit = unit(&group, "sh010").unwrap();
        assert_eq!(unit.dir, group.child_root.join("sh010"));
        assert_eq!(unit.child_root, unit.dir.join("wip"));

        let part = part(&unit, "fx").unwrap();
        assert_eq!(part.dir, PathBuf::from("/site/show/demo/shot/sq01/sh010/wip/fx"));
        assert_eq!(part.kind, NodeKind::Part(Category::Shot));
        assert_eq!(part.lineage, vec!["demo", "sq01", "sh010"]);
    }

    #[test]
    fn test_manifests_by_category() {
        let site = site(Path::new("/site"), "2L").unwrap();
        let show = show(&site, "demo").unwrap();
        assert_eq!(show.subdirs.len(), SHOW_DIRS.len());

        let shot_unit = unit(&group(&show, Category::Shot, "sq").unwrap(), "sh").unwrap();
        let asset_unit = unit(&group(&show, Category::Asset, "char").unwrap(), "hero").unwrap();
        assert!(shot_unit.subdirs.iter().any(|d| d.name == "pub/cam"));
        assert!(!asset_unit.subdirs.iter().any(|d| d.name == "pub/cam"));
        assert!(asset_unit.subdirs.iter().any(|d| d.name == WIP_DIR));
        assert_eq!(shot_unit.subdirs[0].name, "");
        assert_eq!(shot_unit.subdirs[0].perm.to_string(), "2775");
    }

    #[test]
    fn test_wrong_parent_level() {
        let site = site(Path::new("/site"), "2L").unwrap();
        let show = show(&site, "demo").unwrap();
        let err = unit(&show, "sh010").unwrap_err();
        assert!(matches!(err, SiteError::WrongLevel { expected: "group", found: "show" }));
    }

    #[test]
    fn test_invalid_names() {
        let site = site(Path::new("/site"), "2L").unwrap();
        for bad in ["", ".", "..", "a/b", "a_b", "a\\b"] {
            assert!(
                matches!(show(&site, bad), Err(SiteError::InvalidName { .. })),
                "{bad:?} accepted"
            );
        }
    }

    #[test]
    fn test_scene_name() {
        let part = demo_part(Category::Shot);
        let key = SceneKey::from_part(&part).unwrap();
        assert_eq!(key.prefix(), "demo_sq01_sh010_fx_");
        let dir = scene_dir(&part, "precomp");
        let path = scene_path(&dir, &key, "smoke", "v3", ".nk");
        assert_eq!(
            path,
            PathBuf::from("/site/show/demo/shot/sq01/sh010/wip/fx/precomp/demo_sq01_sh010_fx_smoke_v3.nk")
        );
        assert_eq!(scene_dir(&part, ""), part.dir);
    }
}
