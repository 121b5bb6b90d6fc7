//! # stencil-vfs
//!
//! The virtual filesystem layer of stencil.
//!
//! - [`File`]: an immutable named byte buffer. It either came from real
//!   storage or was synthesized by a generator.
//! - [`Disk`]: the overlay store. `current` is the live view of a run,
//!   `original` holds the first-observed content of every path that was read
//!   through from the real filesystem.
//!
//! # Example
//!
//! ```rust
//! use stencil_vfs::{Disk, File};
//!
//! let disk = Disk::new();
//! disk.add(File::new("foo.txt", "Hello mark"));
//! disk.add(File::new("foo.txt", "Hello world"));
//!
//! let files = disk.files();
//! assert_eq!(files.len(), 1);
//! assert_eq!(files[0].to_string(), "Hello world");
//! ```

pub use bytes::Bytes;

mod disk;
mod file;

pub use disk::Disk;
pub use file::{File, Origin};
