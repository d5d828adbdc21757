//! External tool launching.
//!
//! Each tool is driven through a pair of runner scripts living in
//! `<root>/runner`: `<tool>_create.sh` and `<tool>_open.sh` (`.bat` on
//! Windows). Scripts receive the scene path as their only argument and a
//! full environment: the current process environment overlaid with the
//! scene variables.
//!
//! - create: blocks until the script exits, non-zero exit is an error
//! - open: detached process, the error handler fires at most once and
//!   only on failure

use crossbeam_channel::{Receiver, SendError, Sender, TryRecvError};
use indexmap::IndexMap;
use log::{debug, info, trace, warn};
use std::ffi::OsString;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStderr, Command, Stdio};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::error::{Result, SiteError};

/// Scene variables layered over the process environment
pub type Env = IndexMap<String, String>;

/// Full environment handed to external tools, taken as-is from the OS
pub type ProcessEnv = IndexMap<OsString, OsString>;

/// Callback receiving the failure of a detached open
pub type ErrorHandler = Box<dyn FnOnce(SiteError) + Send + 'static>;

#[cfg(windows)]
const SCRIPT_EXT: &str = "bat";
#[cfg(not(windows))]
const SCRIPT_EXT: &str = "sh";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Open,
}

impl Action {
    fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Open => "open",
        }
    }
}

/// Resolves runner scripts under a directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptRunner {
    dir: PathBuf,
}

impl ScriptRunner {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `<dir>/<program>_<action>.<sh|bat>`
    pub fn script(&self, program: &str, action: Action) -> PathBuf {
        self.dir
            .join(format!("{}_{}.{}", program, action.as_str(), SCRIPT_EXT))
    }
}

/// Clone the process environment and overlay `overlay` on top.
///
/// Inherited variables are kept byte for byte, UTF-8 or not.
pub fn merged_env(overlay: &Env) -> ProcessEnv {
    let mut env: ProcessEnv = std::env::vars_os().collect();
    for (k, v) in overlay {
        env.insert(k.into(), v.into());
    }
    env
}

fn command(program: &Path, scene: &Path, env: &ProcessEnv) -> Command {
    let mut cmd = Command::new(program);
    cmd.arg(scene).env_clear().envs(env);
    cmd
}

/// Run `program scene` to completion.
pub fn run_blocking(program: &Path, scene: &Path, env: &ProcessEnv) -> Result<()> {
    info!("Running {} {}", program.display(), scene.display());
    let output = command(program, scene, env)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| SiteError::Launch {
            program: program.to_path_buf(),
            source: e,
        })?;

    if !output.status.success() {
        return Err(SiteError::ProcessFailed {
            program: program.to_path_buf(),
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
        });
    }
    trace!("{} finished", program.display());
    Ok(())
}

#[cfg(unix)]
fn detach(cmd: &mut Command) {
    use std::os::unix::process::CommandExt;
    cmd.process_group(0);
}

#[cfg(windows)]
fn detach(cmd: &mut Command) {
    use std::os::windows::process::CommandExt;
    const DETACHED_PROCESS: u32 = 0x0000_0008;
    cmd.creation_flags(DETACHED_PROCESS);
}

#[cfg(not(any(unix, windows)))]
fn detach(_cmd: &mut Command) {}

/// How long to keep collecting stderr after the process exits. A tool
/// backgrounded by the runner script may hold the pipe open much longer.
const STDERR_GRACE: Duration = Duration::from_millis(250);

/// A started process handed to its watcher thread
type Watched = (Child, ErrorHandler);

/// Launch `program scene` detached and watch it from a background thread.
///
/// `on_error` is called exactly once if the launch fails or the process
/// exits non-zero, and never on a clean exit.
pub fn spawn_detached(program: PathBuf, scene: &Path, env: &ProcessEnv, on_error: ErrorHandler) {
    info!("Opening {} {}", program.display(), scene.display());
    let mut cmd = command(&program, scene, env);
    cmd.stdin(Stdio::null()).stdout(Stdio::null()).stderr(Stdio::piped());
    detach(&mut cmd);

    // Watcher first: if it can't start, nothing is launched
    let (tx, rx) = crossbeam_channel::bounded::<Watched>(1);
    let name = program
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let watched = program.clone();
    let started = thread::Builder::new()
        .name(format!("elo-watch-{}", name))
        .spawn(move || {
            if let Ok((child, on_error)) = rx.recv() {
                watch(child, watched, on_error);
            }
        });
    if let Err(e) = started {
        warn!("Could not start watcher thread for {}: {}", program.display(), e);
        on_error(SiteError::Io { path: program, source: e });
        return;
    }

    match cmd.spawn() {
        Ok(child) => hand_off(&tx, child, on_error, &program),
        Err(e) => {
            warn!("Failed to launch {}: {}", program.display(), e);
            on_error(SiteError::Launch { program, source: e });
        }
    }
}

/// Pass a started process to its watcher. If the watcher is gone the process
/// is killed and reaped here and the handler gets the failure.
fn hand_off(tx: &Sender<Watched>, child: Child, on_error: ErrorHandler, program: &Path) {
    if let Err(SendError((mut child, on_error))) = tx.send((child, on_error)) {
        warn!("Watcher for {} is gone, stopping pid {}", program.display(), child.id());
        let _ = child.kill();
        let _ = child.wait();
        on_error(SiteError::Io {
            path: program.to_path_buf(),
            source: std::io::Error::other("process watcher exited before the process started"),
        });
    }
}

/// Read stderr until EOF into `sink`. `_done` disconnects when reading stops.
fn drain(mut pipe: ChildStderr, sink: Arc<Mutex<Vec<u8>>>, _done: Sender<()>) {
    let mut buf = [0u8; 4096];
    loop {
        match pipe.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => {
                if let Ok(mut out) = sink.lock() {
                    out.extend_from_slice(&buf[..n]);
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!("Lost stderr: {}", e);
                break;
            }
        }
    }
}

fn watch(mut child: Child, program: PathBuf, on_error: ErrorHandler) {
    let pid = child.id();
    trace!("Watching pid {} ({})", pid, program.display());

    let stderr = Arc::new(Mutex::new(Vec::new()));
    let (done_tx, done_rx) = crossbeam_channel::bounded::<()>(0);
    match child.stderr.take() {
        Some(pipe) => {
            let sink = Arc::clone(&stderr);
            let spawned = thread::Builder::new()
                .name(format!("elo-stderr-{}", pid))
                .spawn(move || drain(pipe, sink, done_tx));
            if let Err(e) = spawned {
                warn!("Not collecting stderr of pid {}: {}", pid, e);
            }
        }
        None => drop(done_tx),
    }

    match child.wait() {
        Ok(status) if status.success() => debug!("pid {} exited cleanly", pid),
        Ok(status) => {
            let _ = done_rx.recv_timeout(STDERR_GRACE);
            let stderr = stderr
                .lock()
                .map(|out| String::from_utf8_lossy(&out[..]).trim_end().to_string())
                .unwrap_or_default();
            let err = SiteError::ProcessFailed {
                program,
                code: status.code(),
                stderr,
            };
            warn!("{}", err);
            on_error(err);
        }
        Err(e) => on_error(SiteError::Io {
            path: program,
            source: e,
        }),
    }
}

/// Failure notification for a detached open.
///
/// Nothing is ever sent on success: the channel just disconnects when the
/// process exits cleanly.
#[derive(Debug)]
pub struct OpenHandle {
    rx: Receiver<SiteError>,
}

impl OpenHandle {
    /// Create a handle and the error handler feeding it
    pub fn channel() -> (Self, ErrorHandler) {
        let (tx, rx) = crossbeam_channel::bounded(1);
        let handler: ErrorHandler = Box::new(move |err| {
            let _ = tx.send(err);
        });
        (Self { rx }, handler)
    }

    /// Block until the process is gone. `Ok` means a clean exit.
    pub fn wait(self) -> Result<()> {
        match self.rx.recv() {
            Ok(err) => Err(err),
            Err(_) => Ok(()),
        }
    }

    /// Wait up to `timeout` for an early failure.
    ///
    /// `None` when nothing failed within the window (the process may still
    /// be running).
    pub fn wait_timeout(&self, timeout: Duration) -> Option<SiteError> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// Non-blocking poll for a failure
    pub fn try_error(&self) -> Option<SiteError> {
        match self.rx.try_recv() {
            Ok(err) => Some(err),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }
}
