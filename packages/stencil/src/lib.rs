//! # stencil
//!
//! Compose code generators and run them either as a simulation or for real.
//!
//! A [`Generator`] is a bundle of run-steps (file writes, commands, HTTP
//! requests, or arbitrary closures), an optional teardown, and a list of
//! file [transformers](Transformer). A [`Runner`] executes attached
//! generators in order and mediates every effect they ask for:
//!
//! - files always land in the runner's overlay [`Disk`]; in real mode they
//!   are also written under the runner root,
//! - commands are logged; in real mode they are also executed,
//! - HTTP requests are performed in both modes.
//!
//! Teardowns run after the run-step phase no matter how it ended. Afterwards
//! [`Runner::results`] reports the files, commands and requests the run
//! observed.
//!
//! ```rust,no_run
//! use stencil::{Command, File, Generator, Runner};
//!
//! # fn main() -> stencil::Result<()> {
//! let mut generator = Generator::named("hello");
//! generator
//!     .file(File::new("hello.txt", "Hello mark"))
//!     .command(Command::new("git").arg("init"));
//!
//! let mut runner = Runner::simulated()?;
//! runner.with(generator);
//! runner.run()?;
//!
//! let results = runner.results();
//! assert_eq!(results.files.len(), 1);
//! assert_eq!(results.command_lines(), vec!["git init"]);
//! # Ok(())
//! # }
//! ```

pub mod asset;
pub mod backend;
pub mod cancel;
pub mod command;
pub mod config;
pub mod error;
pub mod generator;
pub mod group;
pub mod results;
pub mod runner;
pub mod transformer;

pub use asset::{AssetSource, DirAssets, MemoryAssets};
pub use backend::{for_mode, Backend, RealBackend, SimulatedBackend};
pub use cancel::CancelToken;
pub use command::{Command, CommandOutput, CommandRecord, ProcessLauncher, SystemLauncher};
pub use config::{Mode, RunnerConfig};
pub use error::{Error, Result};
pub use generator::{Generator, Predicate, StepFn};
pub use group::Group;
pub use results::{RequestRecord, Results};
pub use runner::{RunState, Runner};
pub use transformer::{dot, strip_extension, ForExtension, Replace, Transformer};

// Re-export the collaborating crates' main types
pub use stencil_http::{HttpExecutor, HttpRequest, HttpResponse, Method};
pub use stencil_vfs::{Disk, File, Origin};
