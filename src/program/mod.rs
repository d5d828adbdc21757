//! Program dispatch - external authoring tools that create and open scenes.
//!
//! A [`Program`] knows its scene extension, an optional subdirectory inside
//! the part, the environment it wants per scene, and how to create or open a
//! scene through its runner scripts. [`ProgramAdapter`] is the closed set of
//! tools, dispatched statically via `enum_dispatch`.

pub mod adapters;
pub mod launcher;
pub mod registry;

use enum_dispatch::enum_dispatch;
use std::path::Path;

use crate::error::Result;
use crate::paths::SceneKey;

pub use adapters::{Houdini, Maya, Nuke};
pub use launcher::{Action, Env, ErrorHandler, OpenHandle, ProcessEnv, ScriptRunner};
pub use registry::{ProgramSpec, ProgramSpecs, ProgramTable};

#[enum_dispatch]
pub trait Program {
    /// Tool name, also the runner script prefix
    fn name(&self) -> &'static str;

    /// Scene file extension with leading dot
    fn ext(&self) -> &'static str;

    /// Subdirectory inside the part, empty for the part itself
    fn subdir(&self) -> &str;

    fn runner(&self) -> &ScriptRunner;

    /// Variables added on top of the process environment for a scene
    fn scene_env(&self, key: &SceneKey, task: &str) -> Env {
        let mut env = Env::new();
        env.insert("SHOW".to_string(), key.show.clone());
        env.insert("GROUP".to_string(), key.group.clone());
        env.insert("UNIT".to_string(), key.unit.clone());
        env.insert("PART".to_string(), key.part.clone());
        env.insert("TASK".to_string(), task.to_string());
        env.insert("PROGRAM".to_string(), self.name().to_string());
        env
    }

    /// Create a new scene, blocking until the runner exits
    fn create_scene(&self, scene: &Path, overlay: &Env) -> Result<()> {
        let script = self.runner().script(self.name(), Action::Create);
        launcher::run_blocking(&script, scene, &launcher::merged_env(overlay))
    }

    /// Open a scene in a detached process; `on_error` fires only on failure
    fn open_scene(&self, scene: &Path, overlay: &Env, on_error: ErrorHandler) {
        let script = self.runner().script(self.name(), Action::Open);
        launcher::spawn_detached(script, scene, &launcher::merged_env(overlay), on_error);
    }
}

/// All supported tools
#[enum_dispatch(Program)]
#[derive(Debug, Clone)]
pub enum ProgramAdapter {
    Maya,
    Houdini,
    Nuke,
}

impl ProgramAdapter {
    /// Tool names accepted by [`ProgramAdapter::from_name`]
    pub const NAMES: [&'static str; 3] = ["maya", "houdini", "nuke"];

    pub fn from_name(name: &str, subdir: &str, runner: ScriptRunner) -> Option<Self> {
        match name {
            "maya" => Some(Maya::new(subdir, runner).into()),
            "houdini" => Some(Houdini::new(subdir, runner).into()),
            "nuke" => Some(Nuke::new(subdir, runner).into()),
            _ => None,
        }
    }

    /// Open a scene and get a handle reporting failure
    pub fn open(&self, scene: &Path, overlay: &Env) -> OpenHandle {
        let (handle, on_error) = OpenHandle::channel();
        self.open_scene(scene, overlay, on_error);
        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        let runner = ScriptRunner::new("/site/runner");
        let nuke = ProgramAdapter::from_name("nuke", "precomp", runner.clone()).unwrap();
        assert_eq!(nuke.name(), "nuke");
        assert_eq!(nuke.ext(), ".nk");
        assert_eq!(nuke.subdir(), "precomp");

        let hou = ProgramAdapter::from_name("houdini", "", runner.clone()).unwrap();
        assert_eq!(hou.ext(), ".hip");
        assert!(ProgramAdapter::from_name("blender", "", runner).is_none());
    }

    #[test]
    fn test_scene_env() {
        let maya = ProgramAdapter::from_name("maya", "", ScriptRunner::new("/r")).unwrap();
        let env = maya.scene_env(&SceneKey::new("demo", "char", "hero", "model"), "sculpt");
        assert_eq!(env["SHOW"], "demo");
        assert_eq!(env["GROUP"], "char");
        assert_eq!(env["UNIT"], "hero");
        assert_eq!(env["PART"], "model");
        assert_eq!(env["TASK"], "sculpt");
        assert_eq!(env["PROGRAM"], "maya");
    }

    #[cfg(unix)]
    #[test]
    fn test_open_handle_reports_exit_code() {
        use tempfile::TempDir;
        let tmp = TempDir::new().unwrap();
        launcher::tests::write_script(
            &tmp.path().join("houdini_open.sh"),
            "echo \"bad $TASK\" >&2\nexit 3",
        );
        let hou = ProgramAdapter::from_name("houdini", "", ScriptRunner::new(tmp.path())).unwrap();
        let mut overlay = Env::new();
        overlay.insert("TASK".into(), "sim".into());

        let err = hou.open(Path::new("x.hip"), &overlay).wait().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("error 3"), "{msg}");
        assert!(msg.contains("bad sim"), "{msg}");
    }
}
