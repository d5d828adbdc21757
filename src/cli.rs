use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

use crate::api::PartAddr;
use crate::config::ROOT_ENV;

// Build version with platform info
const VERSION_INFO: &str = const_format::concatcp!(
    env!("CARGO_PKG_VERSION"), "\n",
    "Root:   $", ROOT_ENV, "\n",
    "Target: ", std::env::consts::ARCH, "-", std::env::consts::OS
);

/// VFX site manager: shows, groups, units, parts and their scenes
#[derive(Parser, Debug)]
#[command(name = "elo", author, version = VERSION_INFO, about, long_about = None)]
pub struct Args {
    /// Site root (overrides the SITE_ROOT environment variable)
    #[arg(short = 'r', long = "root", value_name = "DIR", global = true)]
    pub root: Option<PathBuf>,

    /// Enable logging to file (default: elo.log), e.g. --log=site.log
    #[arg(short = 'l', long = "log", value_name = "LOG_FILE", global = true, require_equals = true)]
    pub log_file: Option<Option<PathBuf>>,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbosity: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Names locating one part
#[derive(ClapArgs, Debug, Clone)]
pub struct PartArgs {
    pub show: String,
    /// asset | shot
    pub category: String,
    pub group: String,
    pub unit: String,
    pub part: String,
}

impl PartArgs {
    pub fn addr(&self) -> PartAddr<'_> {
        PartAddr {
            show: &self.show,
            category: &self.category,
            group: &self.group,
            unit: &self.unit,
            part: &self.part,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the site root directories (runner/, show/) if missing
    Init,

    /// List shows
    Shows,

    /// Create a show with its standard layout
    CreateShow { show: String },

    /// List groups of a category
    Groups { show: String, category: String },

    /// Create a group (asset group or shot sequence)
    CreateGroup { show: String, category: String, group: String },

    /// List units of a group
    Units { show: String, category: String, group: String },

    /// Create a unit (asset or shot)
    CreateUnit {
        show: String,
        category: String,
        group: String,
        unit: String,
    },

    /// List parts of a unit
    Parts {
        show: String,
        category: String,
        group: String,
        unit: String,
    },

    /// Create a part
    CreatePart(PartArgs),

    /// List parts allowed in a category
    ValidParts { category: String },

    /// List categories
    Categories,

    /// Print the directory of an entity
    Dir {
        show: String,
        category: Option<String>,
        group: Option<String>,
        unit: Option<String>,
        part: Option<String>,
    },

    /// List tools configured for a part
    Tools(PartArgs),

    /// List tasks and versions of a part
    Tasks {
        #[command(flatten)]
        part: PartArgs,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Create a new scene version (blocks until the tool's create script exits)
    Create {
        #[command(flatten)]
        part: PartArgs,
        tool: String,
        task: String,
        /// Version tag like v3 (default: next free version of the task)
        version: Option<String>,
    },

    /// Open a scene version in its tool
    Open {
        #[command(flatten)]
        part: PartArgs,
        tool: String,
        task: String,
        version: String,

        /// Return after a short check for launch failures instead of
        /// waiting for the tool to exit
        #[arg(short = 'd', long)]
        detach: bool,
    },
}
