//! The runner: drives generators and mediates every file, command and
//! request they ask for.
//!
//! # Lifecycle
//!
//! ```text
//! Idle -> RunningSteps -> TearingDown -> Done
//! ```
//!
//! `TearingDown` is never skipped. The first failing run-step stops the whole
//! run-step phase (across all remaining generators), after which every
//! generator's teardown is attempted regardless of how the others fared.
//! When both phases fail, the run-step error is the one returned.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use stencil_http::{HttpExecutor, HttpRequest, HttpResponse, ReqwestExecutor};
use stencil_vfs::{Disk, File};
use tracing::{debug, info, warn};

use crate::backend::{for_mode, resolve, Backend};
use crate::cancel::CancelToken;
use crate::command::{Command, CommandOutput, CommandRecord, ProcessLauncher, SystemLauncher};
use crate::config::{Mode, RunnerConfig};
use crate::error::{Error, Result};
use crate::generator::Generator;
use crate::results::{RequestRecord, Results};

/// Where a runner is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunState {
    Idle,
    RunningSteps,
    TearingDown,
    Done,
}

pub struct Runner {
    config: RunnerConfig,
    root: PathBuf,
    disk: Disk,
    backend: Box<dyn Backend>,
    http: Arc<dyn HttpExecutor>,
    generators: Vec<Arc<Generator>>,
    current: Option<Arc<Generator>>,
    commands: Vec<CommandRecord>,
    requests: Vec<RequestRecord>,
    cancel: Option<CancelToken>,
    state: RunState,
}

impl Runner {
    /// Build a runner whose backend matches `config.mode`, with a reqwest
    /// executor for network requests.
    pub fn new(config: RunnerConfig) -> Result<Self> {
        let http = ReqwestExecutor::new(config.http_timeout).map_err(|e| Error::Config {
            message: format!("failed to build HTTP client: {}", e),
        })?;
        Ok(Self::with_launcher(config, SystemLauncher, Arc::new(http)))
    }

    /// Build a runner for `config.mode` that spawns processes through
    /// `launcher` when running for real.
    pub fn with_launcher(
        config: RunnerConfig,
        launcher: impl ProcessLauncher + 'static,
        http: Arc<dyn HttpExecutor>,
    ) -> Self {
        let backend = for_mode(config.mode, launcher);
        Self::with_boxed_parts(config, backend, http)
    }

    /// A runner that records file writes and commands without applying them.
    pub fn simulated() -> Result<Self> {
        Self::new(RunnerConfig::simulate())
    }

    /// A runner that applies everything to the real environment.
    pub fn real() -> Result<Self> {
        Self::new(RunnerConfig::real())
    }

    /// Build a runner from explicit collaborators.
    ///
    /// The backend decides the mode; `config.mode` is overwritten to match.
    pub fn from_parts(
        config: RunnerConfig,
        backend: impl Backend + 'static,
        http: Arc<dyn HttpExecutor>,
    ) -> Self {
        Self::with_boxed_parts(config, Box::new(backend), http)
    }

    fn with_boxed_parts(
        mut config: RunnerConfig,
        backend: Box<dyn Backend>,
        http: Arc<dyn HttpExecutor>,
    ) -> Self {
        config.mode = backend.mode();
        Self {
            root: config.root.clone(),
            config,
            disk: Disk::new(),
            backend,
            http,
            generators: Vec::new(),
            current: None,
            commands: Vec::new(),
            requests: Vec::new(),
            cancel: None,
            state: RunState::Idle,
        }
    }

    /// Attach a generator. Generators run in attachment order.
    pub fn with(&mut self, generator: Generator) -> &mut Self {
        debug!(generator = generator.id(), steps = generator.step_count(), "attach");
        self.generators.push(Arc::new(generator));
        self
    }

    /// Install a cancellation token checked by the command and request
    /// primitives.
    pub fn with_cancel(&mut self, token: CancelToken) -> &mut Self {
        self.cancel = Some(token);
        self
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    pub fn mode(&self) -> Mode {
        self.backend.mode()
    }

    /// Directory that file names currently resolve against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn disk(&self) -> &Disk {
        &self.disk
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Identifier of the generator whose step or teardown is executing.
    pub fn current_generator(&self) -> Option<&str> {
        self.current.as_deref().map(Generator::id)
    }

    /// Execute every attached generator.
    pub fn run(&mut self) -> Result<()> {
        if self.state != RunState::Idle {
            return Err(Error::AlreadyRan);
        }

        let generators = self.generators.clone();
        info!(generators = generators.len(), mode = ?self.mode(), "run started");

        self.state = RunState::RunningSteps;
        let run_error = self.run_steps(&generators);
        if run_error.is_some() && self.config.rollback_on_error {
            warn!("run steps failed, rolling back disk");
            self.disk.rollback();
        }

        self.state = RunState::TearingDown;
        let teardown_error = self.run_teardowns(&generators);
        if teardown_error.is_some() && self.config.rollback_on_error {
            warn!("teardown failed, rolling back disk");
            self.disk.rollback();
        }

        self.state = RunState::Done;
        match run_error.or(teardown_error) {
            Some(err) => {
                warn!(error = %err, "run failed");
                Err(err)
            }
            None => {
                info!(files = self.disk.len(), "run finished");
                Ok(())
            }
        }
    }

    fn run_steps(&mut self, generators: &[Arc<Generator>]) -> Option<Error> {
        let mut failure = None;
        'generators: for generator in generators {
            self.current = Some(Arc::clone(generator));
            for (index, step) in generator.steps().iter().enumerate() {
                if let Err(err) = step(self) {
                    warn!(generator = generator.id(), step = index, error = %err, "run step failed");
                    failure = Some(err);
                    break 'generators;
                }
            }
        }
        self.current = None;
        failure
    }

    fn run_teardowns(&mut self, generators: &[Arc<Generator>]) -> Option<Error> {
        let mut failure = None;
        for generator in generators {
            let Some(teardown) = generator.teardown() else {
                continue;
            };
            self.current = Some(Arc::clone(generator));
            if let Err(err) = teardown(self) {
                warn!(generator = generator.id(), error = %err, "teardown failed");
                if failure.is_none() {
                    failure = Some(Error::Teardown {
                        generator: generator.id().to_string(),
                        source: Box::new(err),
                    });
                }
            }
        }
        self.current = None;
        failure
    }

    /// Write a file.
    ///
    /// The current generator's transformers run first. In real mode the file
    /// is then written under the root; it only joins the disk once that
    /// write succeeded.
    pub fn file(&self, file: File) -> Result<()> {
        let file = match &self.current {
            Some(generator) => generator.transform(file)?,
            None => file,
        };
        self.backend.write_file(&self.root, &file)?;
        self.disk.add(file);
        Ok(())
    }

    /// Remove a file from the disk and, in real mode, from the root.
    pub fn delete(&self, name: &str) -> Result<()> {
        self.backend.remove_file(&self.root, name)?;
        self.disk.delete(name);
        Ok(())
    }

    /// Look `name` up in the disk, falling back to the real filesystem.
    ///
    /// A file found on the real filesystem is captured into the disk, both as
    /// the first-observed snapshot and in the current view. A name that was
    /// captured once and has since left the current view counts as deleted;
    /// the real filesystem is not consulted again. Directories are not files.
    pub fn find_file(&self, name: &str) -> Result<File> {
        if let Some(file) = self.disk.find(name) {
            return Ok(file);
        }
        let not_found = || Error::NotFound {
            name: name.to_string(),
        };
        if self.disk.original(name).is_some() {
            debug!(name, "deleted during run");
            return Err(not_found());
        }

        let path = resolve(&self.root, name);
        if path.is_dir() {
            return Err(not_found());
        }
        match File::read_from_disk(name, &path) {
            Ok(file) => {
                debug!(name, path = %path.display(), "captured file from disk");
                self.disk.capture(file.clone());
                Ok(file)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(not_found()),
            Err(source) => Err(Error::Read { path, source }),
        }
    }

    /// Run a command.
    ///
    /// Every attempt is logged, including ones that fail to spawn. Returns
    /// the captured output in real mode and `None` in simulate mode. A
    /// non-zero exit is an error.
    pub fn exec(&mut self, command: Command) -> Result<Option<CommandOutput>> {
        self.check_cancelled(|| format!("command `{}`", command))?;

        let outcome = self.backend.run_command(&self.root, &command);
        let output = match &outcome {
            Ok(output) => output.clone(),
            Err(_) => None,
        };
        self.commands.push(CommandRecord {
            command: command.clone(),
            output,
        });

        let output = outcome?;
        if let Some(out) = &output {
            if !out.success() {
                let message = match out.code {
                    Some(code) => format!("exit code {}: {}", code, out.stderr_lossy().trim()),
                    None => "terminated by signal".to_string(),
                };
                return Err(Error::Command {
                    command: command.line(),
                    message,
                });
            }
        }
        Ok(output)
    }

    /// Issue an HTTP request. Requests are performed in every mode.
    ///
    /// Every attempt is logged, with its response when the exchange
    /// completed. Status 400 and above is an error; anything lower is not.
    pub fn request(&mut self, request: HttpRequest) -> Result<HttpResponse> {
        self.check_cancelled(|| format!("request {}", request))?;

        info!(request = %request, "issuing request");
        let outcome = self.http.execute(&request);
        self.requests.push(RequestRecord {
            request: request.clone(),
            response: outcome.as_ref().ok().cloned(),
        });

        match outcome {
            Ok(response) if response.is_error() => {
                warn!(request = %request, status = response.status, "request answered with error status");
                Err(Error::Request {
                    request: request.to_string(),
                    status: Some(response.status),
                    message: response.status_text,
                })
            }
            Ok(response) => Ok(response),
            Err(e) => {
                warn!(request = %request, error = %e, "request did not complete");
                Err(Error::Request {
                    request: request.to_string(),
                    status: None,
                    message: e.to_string(),
                })
            }
        }
    }

    /// Run `f` with the root re-pointed at `root/dir`.
    ///
    /// In real mode the directory is created first. The previous root is
    /// restored whether or not `f` succeeds.
    pub fn chdir<T, F>(&mut self, dir: impl AsRef<Path>, f: F) -> Result<T>
    where
        F: FnOnce(&mut Runner) -> Result<T>,
    {
        let target = resolve(&self.root, dir);
        self.backend.create_dir(&target)?;

        debug!(dir = %target.display(), "chdir");
        let previous = std::mem::replace(&mut self.root, target);
        let result = f(self);
        self.root = previous;
        result
    }

    /// Snapshot of the disk and both logs as they are right now.
    pub fn results(&self) -> Results {
        Results {
            files: self.disk.files(),
            commands: self.commands.clone(),
            requests: self.requests.clone(),
        }
    }

    fn check_cancelled(&self, operation: impl FnOnce() -> String) -> Result<()> {
        match &self.cancel {
            Some(token) if token.is_cancelled() => {
                let operation = operation();
                warn!(operation = %operation, "cancelled");
                Err(Error::Cancelled { operation })
            }
            _ => Ok(()),
        }
    }
}

impl std::fmt::Debug for Runner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner")
            .field("mode", &self.mode())
            .field("root", &self.root)
            .field("state", &self.state)
            .field("generators", &self.generators.len())
            .field("files", &self.disk.len())
            .field("commands", &self.commands.len())
            .field("requests", &self.requests.len())
            .finish()
    }
}
