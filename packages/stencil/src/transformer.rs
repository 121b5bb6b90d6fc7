//! File transformers.
//!
//! A transformer sees every file a generator writes, before the file reaches
//! the disk. It can rename the file, rewrite its content, or reject it.
//! Rendering templates is left to callers: wrap the renderer in a closure.

use std::fmt;

use stencil_vfs::File;

use crate::error::Result;

pub trait Transformer: Send + Sync {
    fn transform(&self, file: File) -> Result<File>;
}

impl<F> Transformer for F
where
    F: Fn(File) -> Result<File> + Send + Sync,
{
    fn transform(&self, file: File) -> Result<File> {
        self(file)
    }
}

/// Replace every occurrence of `from` with `to` in file names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replace {
    from: String,
    to: String,
}

impl Replace {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

impl Transformer for Replace {
    fn transform(&self, file: File) -> Result<File> {
        if self.from.is_empty() || !file.name().contains(&self.from) {
            return Ok(file);
        }
        let name = file.name().replace(&self.from, &self.to);
        Ok(file.with_name(name))
    }
}

/// Turn `-dot-` in file names into `.`.
///
/// Bundles use `-dot-gitignore` style names to carry dotfiles that packaging
/// tools would otherwise skip.
pub fn dot() -> Replace {
    Replace::new("-dot-", ".")
}

/// Apply `inner` only to files whose name ends in `.{extension}`.
pub struct ForExtension<T> {
    suffix: String,
    inner: T,
}

impl<T: Transformer> ForExtension<T> {
    pub fn new(extension: &str, inner: T) -> Self {
        Self {
            suffix: format!(".{}", extension.trim_start_matches('.')),
            inner,
        }
    }
}

impl<T: Transformer> Transformer for ForExtension<T> {
    fn transform(&self, file: File) -> Result<File> {
        if file.name().ends_with(&self.suffix) {
            self.inner.transform(file)
        } else {
            Ok(file)
        }
    }
}

impl<T> fmt::Debug for ForExtension<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForExtension")
            .field("suffix", &self.suffix)
            .finish_non_exhaustive()
    }
}

/// Strip `.{extension}` from the end of matching file names.
pub fn strip_extension(extension: &str) -> impl Transformer {
    let suffix = format!(".{}", extension.trim_start_matches('.'));
    move |file: File| -> Result<File> {
        match file.name().strip_suffix(suffix.as_str()) {
            Some(stem) if !stem.is_empty() => Ok(file.with_name(stem.to_string())),
            _ => Ok(file),
        }
    }
}
