//! Simulate and real effect backends.
//!
//! A runner picks one backend at construction. Everything that differs
//! between a simulation and a real run lives behind [`Backend`]; the runner
//! itself never branches on the mode.

use std::io;
use std::path::{Path, PathBuf};

use stencil_vfs::File;
use tracing::{debug, info};

use crate::command::{Command, CommandOutput, ProcessLauncher, SystemLauncher};
use crate::config::Mode;
use crate::error::{Error, Result};

/// Side effects a run can have on the world outside the overlay disk.
pub trait Backend: Send + Sync {
    fn mode(&self) -> Mode;

    /// Persist `file` under `root`.
    fn write_file(&self, root: &Path, file: &File) -> Result<()>;

    /// Remove `name` under `root`. A missing file is not an error.
    fn remove_file(&self, root: &Path, name: &str) -> Result<()>;

    /// Make sure `dir` exists, creating parents as needed.
    fn create_dir(&self, dir: &Path) -> Result<()>;

    /// Execute `command`.
    ///
    /// Returns `None` when the command was not executed. `Err` means the
    /// process could not be started; a non-zero exit is reported through
    /// the returned output.
    fn run_command(&self, root: &Path, command: &Command) -> Result<Option<CommandOutput>>;
}

/// The backend for `mode`. Only the real backend ever uses `launcher`.
pub fn for_mode(mode: Mode, launcher: impl ProcessLauncher + 'static) -> Box<dyn Backend> {
    match mode {
        Mode::Simulate => Box::new(SimulatedBackend),
        Mode::Real => Box::new(RealBackend::with_launcher(launcher)),
    }
}

/// Resolve a file or directory name against the run root.
pub(crate) fn resolve(root: &Path, name: impl AsRef<Path>) -> PathBuf {
    root.join(name)
}

/// Touches nothing. File and command effects exist only in the runner's
/// disk and logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedBackend;

impl Backend for SimulatedBackend {
    fn mode(&self) -> Mode {
        Mode::Simulate
    }

    fn write_file(&self, _root: &Path, file: &File) -> Result<()> {
        debug!(name = file.name(), "simulated write");
        Ok(())
    }

    fn remove_file(&self, _root: &Path, name: &str) -> Result<()> {
        debug!(name, "simulated remove");
        Ok(())
    }

    fn create_dir(&self, dir: &Path) -> Result<()> {
        debug!(dir = %dir.display(), "simulated mkdir");
        Ok(())
    }

    fn run_command(&self, _root: &Path, command: &Command) -> Result<Option<CommandOutput>> {
        debug!(command = %command, "simulated command");
        Ok(None)
    }
}

/// Applies effects to the real filesystem and process table.
pub struct RealBackend {
    launcher: Box<dyn ProcessLauncher>,
}

impl RealBackend {
    pub fn new() -> Self {
        Self::with_launcher(SystemLauncher)
    }

    pub fn with_launcher(launcher: impl ProcessLauncher + 'static) -> Self {
        Self {
            launcher: Box::new(launcher),
        }
    }
}

impl Default for RealBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for RealBackend {
    fn mode(&self) -> Mode {
        Mode::Real
    }

    fn write_file(&self, root: &Path, file: &File) -> Result<()> {
        let path = resolve(root, file.name());
        let write = || -> io::Result<()> {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, file.content())
        };
        write().map_err(|source| Error::Write {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), len = file.len(), "wrote file");
        Ok(())
    }

    fn remove_file(&self, root: &Path, name: &str) -> Result<()> {
        let path = resolve(root, name);
        match std::fs::remove_file(&path) {
            Ok(()) => {
                info!(path = %path.display(), "removed file");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(Error::Write { path, source }),
        }
    }

    fn create_dir(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir).map_err(|source| Error::Write {
            path: dir.to_path_buf(),
            source,
        })
    }

    fn run_command(&self, root: &Path, command: &Command) -> Result<Option<CommandOutput>> {
        let cwd = match &command.cwd {
            Some(dir) => resolve(root, dir),
            None => root.to_path_buf(),
        };
        info!(command = %command, cwd = %cwd.display(), "running command");
        let output = self
            .launcher
            .launch(command, &cwd)
            .map_err(|e| Error::Command {
                command: command.line(),
                message: format!("spawn failed: {}", e),
            })?;
        debug!(code = ?output.code, "command finished");
        Ok(Some(output))
    }
}
