//! Program table: (category, part, tool key) -> adapter.
//!
//! Built once from specs (built-in defaults or `site.json`) and read-only
//! afterwards. Declaration order is kept, it is the order tasks are merged
//! and tools are listed in.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::launcher::ScriptRunner;
use super::{Program, ProgramAdapter};
use crate::entities::Category;
use crate::error::{Result, SiteError};

/// One configured tool of a part
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramSpec {
    /// Adapter name; defaults to the tool key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub subdir: String,
}

impl ProgramSpec {
    fn plain() -> Self {
        Self {
            program: None,
            subdir: String::new(),
        }
    }

    fn in_subdir(subdir: &str) -> Self {
        Self {
            program: None,
            subdir: subdir.to_string(),
        }
    }
}

/// category -> part -> tool key -> spec
pub type ProgramSpecs = IndexMap<Category, IndexMap<String, IndexMap<String, ProgramSpec>>>;

/// Site defaults
pub fn default_specs() -> ProgramSpecs {
    let part = |tools: &[(&str, ProgramSpec)]| -> IndexMap<String, ProgramSpec> {
        tools
            .iter()
            .map(|(k, s)| (k.to_string(), s.clone()))
            .collect()
    };

    let mut asset = IndexMap::new();
    asset.insert("model".to_string(), part(&[("maya", ProgramSpec::plain())]));
    asset.insert("look".to_string(), part(&[("maya", ProgramSpec::plain())]));
    asset.insert("rig".to_string(), part(&[("maya", ProgramSpec::plain())]));

    let mut shot = IndexMap::new();
    shot.insert("lit".to_string(), part(&[("maya", ProgramSpec::plain())]));
    shot.insert(
        "fx".to_string(),
        part(&[
            ("houdini", ProgramSpec::plain()),
            ("nuke", ProgramSpec::in_subdir("precomp")),
        ]),
    );
    shot.insert("comp".to_string(), part(&[("nuke", ProgramSpec::plain())]));

    let mut specs = ProgramSpecs::new();
    specs.insert(Category::Asset, asset);
    specs.insert(Category::Shot, shot);
    specs
}

#[derive(Debug, Clone)]
pub struct ProgramTable {
    table: IndexMap<Category, IndexMap<String, IndexMap<String, ProgramAdapter>>>,
}

impl ProgramTable {
    pub fn from_specs(specs: &ProgramSpecs, runner: &ScriptRunner) -> Result<Self> {
        let mut table = IndexMap::new();
        for (category, parts) in specs {
            let mut by_part = IndexMap::new();
            for (part, tools) in parts {
                let mut by_tool = IndexMap::new();
                for (tool, spec) in tools {
                    let name = spec.program.as_deref().unwrap_or(tool.as_str());
                    let adapter = ProgramAdapter::from_name(name, &spec.subdir, runner.clone())
                        .ok_or_else(|| {
                            SiteError::Config(format!(
                                "{}/{}/{}: unknown program {:?} (expected one of {:?})",
                                category,
                                part,
                                tool,
                                name,
                                ProgramAdapter::NAMES
                            ))
                        })?;
                    by_tool.insert(tool.clone(), adapter);
                }
                by_part.insert(part.clone(), by_tool);
            }
            table.insert(*category, by_part);
        }
        Ok(Self { table })
    }

    /// Tools configured for a part, in declaration order
    pub fn programs(&self, category: Category, part: &str) -> Result<&IndexMap<String, ProgramAdapter>> {
        self.table
            .get(&category)
            .and_then(|parts| parts.get(part))
            .ok_or_else(|| SiteError::UnknownPart {
                category: category.to_string(),
                part: part.to_string(),
            })
    }

    pub fn program(&self, category: Category, part: &str, tool: &str) -> Result<&ProgramAdapter> {
        self.programs(category, part)?
            .get(tool)
            .ok_or_else(|| SiteError::UnknownProgram {
                category: category.to_string(),
                part: part.to_string(),
                tool: tool.to_string(),
            })
    }

    /// Distinct scene extensions used by a part's tools
    pub fn extensions(&self, category: Category, part: &str) -> Result<Vec<&'static str>> {
        let mut exts: Vec<&'static str> = Vec::new();
        for adapter in self.programs(category, part)?.values() {
            if !exts.contains(&adapter.ext()) {
                exts.push(adapter.ext());
            }
        }
        Ok(exts)
    }
}
