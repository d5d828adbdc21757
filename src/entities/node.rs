//! Node - one entity of the site hierarchy.
//!
//! Nodes are plain values: fully determined by (parent, name) and rebuilt on
//! every lookup. The filesystem is the only source of truth, see
//! [`crate::paths`] for how each kind maps to directories.

use serde::Serialize;
use std::path::PathBuf;

use super::category::Category;
use super::dir_entry::DirEntry;

/// Level of a node, tagged with its category below the show level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", content = "category", rename_all = "lowercase")]
pub enum NodeKind {
    Site,
    Show,
    Group(Category),
    Unit(Category),
    Part(Category),
}

impl NodeKind {
    /// Type identifier ("site", "show", "group", "unit", "part")
    pub fn type_name(&self) -> &'static str {
        match self {
            NodeKind::Site => "site",
            NodeKind::Show => "show",
            NodeKind::Group(_) => "group",
            NodeKind::Unit(_) => "unit",
            NodeKind::Part(_) => "part",
        }
    }

    /// Human label, category-specific for groups and units
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Site => "site",
            NodeKind::Show => "show",
            NodeKind::Group(c) => c.group_label(),
            NodeKind::Unit(c) => c.unit_label(),
            NodeKind::Part(_) => "part",
        }
    }

    pub fn category(&self) -> Option<Category> {
        match self {
            NodeKind::Site | NodeKind::Show => None,
            NodeKind::Group(c) | NodeKind::Unit(c) | NodeKind::Part(c) => Some(*c),
        }
    }
}

/// Entity node with its resolved directories and creation manifest
#[derive(Debug, Clone, Serialize)]
pub struct Node {
    pub kind: NodeKind,
    pub name: String,
    /// Names of the ancestors below the site, outermost first
    pub lineage: Vec<String>,
    pub dir: PathBuf,
    /// Where children of this node live
    pub child_root: PathBuf,
    #[serde(skip)]
    pub subdirs: Vec<DirEntry>,
}

impl Node {
    pub fn category(&self) -> Option<Category> {
        self.kind.category()
    }

    /// Lineage including this node's own name (empty for the site)
    pub fn path_names(&self) -> Vec<String> {
        let mut names = self.lineage.clone();
        if self.kind != NodeKind::Site {
            names.push(self.name.clone());
        }
        names
    }
}

/// Names of a list of nodes, order preserved
pub fn names(nodes: &[Node]) -> Vec<String> {
    nodes.iter().map(|n| n.name.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        assert_eq!(NodeKind::Group(Category::Shot).label(), "sequence");
        assert_eq!(NodeKind::Group(Category::Asset).label(), "group");
        assert_eq!(NodeKind::Unit(Category::Asset).label(), "asset");
        assert_eq!(NodeKind::Unit(Category::Shot).type_name(), "unit");
        assert_eq!(NodeKind::Show.category(), None);
        assert_eq!(NodeKind::Part(Category::Shot).category(), Some(Category::Shot));
    }

    #[test]
    fn test_path_names() {
        let node = Node {
            kind: NodeKind::Unit(Category::Shot),
            name: "sh010".into(),
            lineage: vec!["demo".into(), "sq01".into()],
            dir: PathBuf::from("/r/show/demo/shot/sq01/sh010"),
            child_root: PathBuf::from("/r/show/demo/shot/sq01/sh010/wip"),
            subdirs: Vec::new(),
        };
        assert_eq!(node.path_names(), vec!["demo", "sq01", "sh010"]);
    }
}
