//! Read-only projection of what a run observed.

use serde::{Deserialize, Serialize};
use stencil_http::{HttpRequest, HttpResponse};
use stencil_vfs::File;

use crate::command::CommandRecord;

/// One attempted HTTP request.
///
/// `response` is `None` when the exchange did not complete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestRecord {
    pub request: HttpRequest,
    pub response: Option<HttpResponse>,
}

/// Files, commands and requests as of the moment
/// [`Runner::results`](crate::Runner::results) was called.
///
/// Every collection is an independent copy; changing it does not affect the
/// runner, and later runner activity does not show up here.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Results {
    /// Files in the disk's current view, in listing order.
    pub files: Vec<File>,
    /// Commands in the order they were attempted.
    pub commands: Vec<CommandRecord>,
    /// Requests in the order they were attempted.
    pub requests: Vec<RequestRecord>,
}

impl Results {
    pub fn find_file(&self, name: &str) -> Option<&File> {
        self.files.iter().find(|f| f.name() == name)
    }

    pub fn file_names(&self) -> Vec<&str> {
        self.files.iter().map(File::name).collect()
    }

    pub fn command_lines(&self) -> Vec<String> {
        self.commands.iter().map(|r| r.command.line()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;

    #[test]
    fn lookups() {
        let results = Results {
            files: vec![File::new("a.txt", "a"), File::new("b.txt", "b")],
            commands: vec![CommandRecord {
                command: Command::new("cargo").arg("fmt"),
                output: None,
            }],
            requests: Vec::new(),
        };

        assert_eq!(results.file_names(), vec!["a.txt", "b.txt"]);
        assert_eq!(results.find_file("b.txt").unwrap().to_string(), "b");
        assert!(results.find_file("c.txt").is_none());
        assert_eq!(results.command_lines(), vec!["cargo fmt"]);
    }
}
