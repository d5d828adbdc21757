use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::time::Duration;

use elo::cli::{Args, Command};
use elo::{Site, SiteConfig, Task, api};

/// How long `open --detach` watches for an early launch failure
const DETACH_GRACE: Duration = Duration::from_secs(2);

fn main() {
    let args = Args::parse();
    init_logger(&args);

    if let Err(e) = run(args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logger(args: &Args) {
    // 0 (default) = warn, 1 (-v) = info, 2 (-vv) = debug, 3+ (-vvv) = trace
    let log_level = match args.verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    if let Some(log_path_opt) = &args.log_file {
        let log_path = log_path_opt
            .clone()
            .unwrap_or_else(|| "elo.log".into());

        match std::fs::File::create(&log_path) {
            Ok(file) => {
                env_logger::Builder::new()
                    .filter_level(log_level)
                    .format_timestamp_millis()
                    .target(env_logger::Target::Pipe(Box::new(file)))
                    .init();
                info!("Logging to file: {} (level: {:?})", log_path.display(), log_level);
                return;
            }
            Err(e) => eprintln!("Cannot create log file {}: {}", log_path.display(), e),
        }
    }

    // Console logging (respects RUST_LOG if set)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level.as_str()))
        .format_timestamp_millis()
        .init();
}

fn print_lines<S: AsRef<str>>(lines: &[S]) {
    for line in lines {
        println!("{}", line.as_ref());
    }
}

fn run(args: Args) -> Result<()> {
    let config = SiteConfig::from_env_and_cli(args.root).context("Failed to load site configuration")?;
    let site = Site::new(config)?;

    match args.command {
        Command::Init => {
            let created = site.bootstrap()?;
            println!("{} ({} directories created)", site.root().dir.display(), created);
        }
        Command::Shows => print_lines(&site.show_names()?),
        Command::CreateShow { show } => {
            println!("{}", site.create_show(&show)?.dir.display());
        }
        Command::Groups { show, category } => print_lines(&site.group_names(&show, &category)?),
        Command::CreateGroup { show, category, group } => {
            println!("{}", site.create_group_named(&show, &category, &group)?.display());
        }
        Command::Units { show, category, group } => {
            print_lines(&site.unit_names(&show, &category, &group)?)
        }
        Command::CreateUnit { show, category, group, unit } => {
            println!("{}", site.create_unit_named(&show, &category, &group, &unit)?.display());
        }
        Command::Parts { show, category, group, unit } => {
            print_lines(&site.part_names(&show, &category, &group, &unit)?)
        }
        Command::CreatePart(p) => {
            let dir = site.create_part_named(&p.show, &p.category, &p.group, &p.unit, &p.part)?;
            println!("{}", dir.display());
        }
        Command::ValidParts { category } => print_lines(&site.valid_parts(&category)?),
        Command::Categories => print_lines(&api::categories()),
        Command::Dir { show, category, group, unit, part } => {
            let dir = match (category, group, unit, part) {
                (None, None, None, None) => site.show_dir(&show)?,
                (Some(c), Some(g), None, None) => site.group_dir(&show, &c, &g)?,
                (Some(c), Some(g), Some(u), None) => site.unit_dir(&show, &c, &g, &u)?,
                (Some(c), Some(g), Some(u), Some(p)) => site.part_dir(&show, &c, &g, &u, &p)?,
                _ => anyhow::bail!("dir takes SHOW [CATEGORY GROUP [UNIT [PART]]]"),
            };
            println!("{}", dir.display());
        }
        Command::Tools(p) => {
            print_lines(&site.tool_names(&p.show, &p.category, &p.group, &p.unit, &p.part)?)
        }
        Command::Tasks { part: p, json } => {
            let tasks = site.tasks_of(&p.show, &p.category, &p.group, &p.unit, &p.part)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&tasks)?);
            } else {
                for task in &tasks {
                    println!("{}: {}", task.name, task.versions.join(" "));
                }
            }
        }
        Command::Create { part: p, tool, task, version } => {
            let version = match version {
                Some(v) => v,
                None => {
                    let tasks = site.tasks_of(&p.show, &p.category, &p.group, &p.unit, &p.part)?;
                    tasks
                        .iter()
                        .find(|t| t.name == task)
                        .map(Task::next_version)
                        .unwrap_or_else(|| Task::new(&task).next_version())
                }
            };
            let path = site
                .create_task(&p.addr(), &tool, &task, &version)
                .with_context(|| format!("Failed to create {} {} with {}", task, version, tool))?;
            println!("{}", path.display());
        }
        Command::Open { part: p, tool, task, version, detach } => {
            let (path, handle) = site.open_task(&p.addr(), &tool, &task, &version)?;
            println!("{}", path.display());
            if detach {
                if let Some(e) = handle.wait_timeout(DETACH_GRACE) {
                    return Err(e).with_context(|| format!("Failed to open {}", path.display()));
                }
            } else {
                handle
                    .wait()
                    .with_context(|| format!("Failed to open {}", path.display()))?;
            }
        }
    }
    Ok(())
}
