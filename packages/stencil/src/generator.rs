//! Generators: named bundles of run-steps, a teardown, and transformers.
//!
//! A generator is only built up here. Nothing runs until it is attached to a
//! [`Runner`] and [`Runner::run`] is called, at which point the runner treats
//! it as read-only.

use std::fmt;
use std::sync::Arc;

use stencil_http::HttpRequest;
use stencil_vfs::File;
use tracing::debug;
use uuid::Uuid;

use crate::asset::AssetSource;
use crate::command::Command;
use crate::error::{Error, Result};
use crate::runner::Runner;
use crate::transformer::Transformer;

/// A run-step or teardown step.
pub type StepFn = Arc<dyn Fn(&mut Runner) -> Result<()> + Send + Sync>;

/// Decides whether a generator should be attached to a runner at all.
pub type Predicate = Arc<dyn Fn(&Runner) -> bool + Send + Sync>;

#[derive(Clone)]
pub struct Generator {
    id: String,
    steps: Vec<StepFn>,
    teardown: Option<StepFn>,
    transformers: Vec<Arc<dyn Transformer>>,
    should: Option<Predicate>,
}

impl Generator {
    /// A generator with a freshly generated identifier.
    pub fn new() -> Self {
        Self::named(Uuid::new_v4().to_string())
    }

    pub fn named(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            steps: Vec::new(),
            teardown: None,
            transformers: Vec::new(),
            should: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Register a run-step.
    pub fn run_fn<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&mut Runner) -> Result<()> + Send + Sync + 'static,
    {
        self.steps.push(Arc::new(f));
        self
    }

    /// Register a run-step that writes `file`.
    pub fn file(&mut self, file: File) -> &mut Self {
        debug!(generator = %self.id, name = file.name(), "file step");
        self.run_fn(move |runner| runner.file(file.clone()))
    }

    /// Register a run-step that executes `command`.
    pub fn command(&mut self, command: Command) -> &mut Self {
        debug!(generator = %self.id, command = %command, "command step");
        self.run_fn(move |runner| runner.exec(command.clone()).map(|_| ()))
    }

    /// Register a run-step that issues `request`.
    pub fn request(&mut self, request: HttpRequest) -> &mut Self {
        debug!(generator = %self.id, request = %request, "request step");
        self.run_fn(move |runner| runner.request(request.clone()).map(|_| ()))
    }

    /// Register one file step per asset in `source`, in the order the
    /// source enumerates them.
    pub fn assets(&mut self, source: &dyn AssetSource) -> Result<&mut Self> {
        for (path, content) in source.entries()? {
            self.file(File::new(path, content));
        }
        Ok(self)
    }

    /// Set the teardown step, replacing any previous one.
    pub fn teardown_fn<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&mut Runner) -> Result<()> + Send + Sync + 'static,
    {
        self.teardown = Some(Arc::new(f));
        self
    }

    /// Append a transformer. It applies to every file this generator writes
    /// during the run, including files registered before it.
    pub fn transformer(&mut self, transformer: impl Transformer + 'static) -> &mut Self {
        self.transformers.push(Arc::new(transformer));
        self
    }

    pub fn should<F>(&mut self, predicate: F) -> &mut Self
    where
        F: Fn(&Runner) -> bool + Send + Sync + 'static,
    {
        self.should = Some(Arc::new(predicate));
        self
    }

    /// Evaluate the predicate. Generators without one always run.
    pub fn should_run(&self, runner: &Runner) -> bool {
        self.should.as_ref().map_or(true, |p| p(runner))
    }

    /// Append `other`'s run-steps and transformers to this generator.
    ///
    /// When both generators have a teardown, the result runs this
    /// generator's teardown and then `other`'s. Both are always attempted;
    /// the first failure is the one reported.
    pub fn merge(&mut self, other: Generator) -> &mut Self {
        debug!(generator = %self.id, merged = %other.id, "merging generators");
        self.steps.extend(other.steps);
        self.transformers.extend(other.transformers);
        self.teardown = match (self.teardown.take(), other.teardown) {
            (Some(first), Some(second)) => {
                let sequence: StepFn = Arc::new(move |runner: &mut Runner| {
                    let first_result = first(runner);
                    let second_result = second(runner);
                    first_result.and(second_result)
                });
                Some(sequence)
            }
            (first, second) => first.or(second),
        };
        self
    }

    /// Run `file` through every transformer in registration order.
    pub fn transform(&self, file: File) -> Result<File> {
        let mut file = file;
        for transformer in &self.transformers {
            let name = file.name().to_string();
            file = transformer.transform(file).map_err(|e| match e {
                Error::Transform { .. } => e,
                other => Error::transform(name, other.to_string()),
            })?;
        }
        Ok(file)
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn has_teardown(&self) -> bool {
        self.teardown.is_some()
    }

    pub(crate) fn steps(&self) -> &[StepFn] {
        &self.steps
    }

    pub(crate) fn teardown(&self) -> Option<&StepFn> {
        self.teardown.as_ref()
    }
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generator")
            .field("id", &self.id)
            .field("steps", &self.steps.len())
            .field("teardown", &self.teardown.is_some())
            .field("transformers", &self.transformers.len())
            .field("should", &self.should.is_some())
            .finish()
    }
}
