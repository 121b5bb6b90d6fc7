//! Immutable in-memory files.

use std::fmt;
use std::io::{self, Cursor, Read};
use std::path::Path;

use bytes::Bytes;

/// Where the content of a [`File`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Origin {
    /// Synthesized in memory, never read from storage.
    #[default]
    Virtual,
    /// Read from the real filesystem.
    Disk,
}

/// A named byte buffer.
///
/// Files never change after construction. Producing a different name or
/// content yields a new `File`; the overlay disk replaces map entries rather
/// than editing bytes in place. Cloning is cheap because content is shared.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct File {
    name: String,
    content: Bytes,
    origin: Origin,
}

impl File {
    /// Create a virtual file from anything convertible into bytes.
    pub fn new(name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            origin: Origin::Virtual,
        }
    }

    /// Create a virtual file by draining a reader.
    pub fn from_reader<R: Read>(name: impl Into<String>, mut reader: R) -> io::Result<Self> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        Ok(Self::new(name, buf))
    }

    /// Read `path` from the real filesystem and name the result `name`.
    ///
    /// The name is kept separate from the path so that a file read from
    /// `<root>/a/b.txt` can live in the disk as `a/b.txt`.
    pub fn read_from_disk(name: impl Into<String>, path: impl AsRef<Path>) -> io::Result<Self> {
        let content = std::fs::read(path.as_ref())?;
        Ok(Self {
            name: name.into(),
            content: Bytes::from(content),
            origin: Origin::Disk,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &Bytes {
        &self.content
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// True when the content was never read from real storage.
    pub fn is_virtual(&self) -> bool {
        self.origin == Origin::Virtual
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// The content as UTF-8, if it is valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.content).ok()
    }

    /// A fresh `Read + Seek` cursor positioned at the start of the content.
    ///
    /// Every call returns an independent cursor.
    pub fn reader(&self) -> Cursor<Bytes> {
        Cursor::new(self.content.clone())
    }

    /// Same content and origin under a different name.
    pub fn with_name(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: self.content.clone(),
            origin: self.origin,
        }
    }

    /// Same name under new content. The result is virtual: its bytes no
    /// longer match anything on storage.
    pub fn with_content(&self, content: impl Into<Bytes>) -> Self {
        Self {
            name: self.name.clone(),
            content: content.into(),
            origin: Origin::Virtual,
        }
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.content))
    }
}

impl fmt::Debug for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("File")
            .field("name", &self.name)
            .field("len", &self.content.len())
            .field("origin", &self.origin)
            .finish()
    }
}
