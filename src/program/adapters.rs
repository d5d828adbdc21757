//! Concrete authoring tools.

use super::launcher::ScriptRunner;
use super::Program;

/// Autodesk Maya, binary scenes
#[derive(Debug, Clone)]
pub struct Maya {
    subdir: String,
    runner: ScriptRunner,
}

impl Maya {
    pub fn new(subdir: &str, runner: ScriptRunner) -> Self {
        Self {
            subdir: subdir.to_string(),
            runner,
        }
    }
}

impl Program for Maya {
    fn name(&self) -> &'static str {
        "maya"
    }

    fn ext(&self) -> &'static str {
        ".mb"
    }

    fn subdir(&self) -> &str {
        &self.subdir
    }

    fn runner(&self) -> &ScriptRunner {
        &self.runner
    }
}

/// SideFX Houdini
#[derive(Debug, Clone)]
pub struct Houdini {
    subdir: String,
    runner: ScriptRunner,
}

impl Houdini {
    pub fn new(subdir: &str, runner: ScriptRunner) -> Self {
        Self {
            subdir: subdir.to_string(),
            runner,
        }
    }
}

impl Program for Houdini {
    fn name(&self) -> &'static str {
        "houdini"
    }

    fn ext(&self) -> &'static str {
        ".hip"
    }

    fn subdir(&self) -> &str {
        &self.subdir
    }

    fn runner(&self) -> &ScriptRunner {
        &self.runner
    }
}

/// Foundry Nuke
#[derive(Debug, Clone)]
pub struct Nuke {
    subdir: String,
    runner: ScriptRunner,
}

impl Nuke {
    pub fn new(subdir: &str, runner: ScriptRunner) -> Self {
        Self {
            subdir: subdir.to_string(),
            runner,
        }
    }
}

impl Program for Nuke {
    fn name(&self) -> &'static str {
        "nuke"
    }

    fn ext(&self) -> &'static str {
        ".nk"
    }

    fn subdir(&self) -> &str {
        &self.subdir
    }

    fn runner(&self) -> &ScriptRunner {
        &self.runner
    }
}
