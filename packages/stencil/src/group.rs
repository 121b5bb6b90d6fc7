//! Ordered collections of generators.

use tracing::debug;

use crate::generator::Generator;
use crate::runner::Runner;

/// An ordered list of generators, attached to a runner together.
///
/// The group is where generator predicates are evaluated; a runner attaches
/// whatever it is given.
#[derive(Debug, Clone, Default)]
pub struct Group {
    generators: Vec<Generator>,
}

impl Group {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, generator: Generator) -> &mut Self {
        self.generators.push(generator);
        self
    }

    /// Append every generator of `other`, keeping their order.
    pub fn merge(&mut self, other: Group) -> &mut Self {
        self.generators.extend(other.generators);
        self
    }

    pub fn len(&self) -> usize {
        self.generators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }

    /// Attach every generator whose predicate passes against `runner`.
    ///
    /// Returns how many were attached.
    pub fn attach(self, runner: &mut Runner) -> usize {
        let mut attached = 0;
        for generator in self.generators {
            if generator.should_run(runner) {
                runner.with(generator);
                attached += 1;
            } else {
                debug!(generator = generator.id(), "skipped by predicate");
            }
        }
        attached
    }

    /// Collapse the group into one generator named `id`.
    pub fn into_generator(self, id: impl Into<String>) -> Generator {
        let mut merged = Generator::named(id);
        for generator in self.generators {
            merged.merge(generator);
        }
        merged
    }
}
