//! Task/version scanner
//!
//! Rebuilds the task list of a part from scene filenames:
//!
//! ```text
//! <show>_<group>_<unit>_<part>_<task>_v<N><ext>
//! ```
//!
//! Files that don't match are not scene files of this part and are skipped
//! without error.

use indexmap::IndexMap;
use log::trace;
use std::path::Path;

use crate::entities::{Task, parse_version};
use crate::error::Result;
use crate::materialize::list_files;
use crate::paths::{DELIM, SceneKey};

/// Split a scene filename into `(task, version)` if it belongs to `key`
pub fn parse_scene_name<'a>(file: &'a str, key: &SceneKey, ext: &str) -> Option<(&'a str, &'a str)> {
    let stem = file.strip_suffix(ext)?;
    let rest = stem.strip_prefix(key.prefix().as_str())?;
    let mut fields = rest.split(DELIM);
    let (task, version) = match (fields.next(), fields.next(), fields.next()) {
        (Some(task), Some(version), None) => (task, version),
        _ => return None,
    };
    parse_version(version)?;
    Some((task, version))
}

/// Scan `dir` (non-recursive) for scenes of `key` with extension `ext`.
///
/// Versions keep file-enumeration order. Tasks come back sorted by name.
pub fn scan_tasks(dir: &Path, key: &SceneKey, ext: &str) -> Result<Vec<Task>> {
    let mut by_name: IndexMap<String, Task> = IndexMap::new();
    for file in list_files(dir)? {
        let Some((task, version)) = parse_scene_name(&file, key, ext) else {
            trace!("Not a scene of {}: {}", key.prefix(), file);
            continue;
        };
        by_name
            .entry(task.to_string())
            .or_insert_with(|| Task::new(task))
            .versions
            .push(version.to_string());
    }
    let mut tasks: Vec<Task> = by_name.into_values().collect();
    tasks.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(tasks)
}

/// Merge scan results of several programs by task name.
///
/// Versions are concatenated in batch order. The result is sorted by name.
pub fn merge_tasks(batches: impl IntoIterator<Item = Vec<Task>>) -> Vec<Task> {
    let mut merged: IndexMap<String, Task> = IndexMap::new();
    for task in batches.into_iter().flatten() {
        match merged.get_mut(&task.name) {
            Some(existing) => existing.versions.extend(task.versions),
            None => {
                merged.insert(task.name.clone(), task);
            }
        }
    }
    let mut tasks: Vec<Task> = merged.into_values().collect();
    tasks.sort_by(|a, b| a.name.cmp(&b.name));
    tasks
}
