use std::io::ErrorKind;
use std::os::unix::fs::FileTypeExt;
use std::path::{Path, PathBuf};

use fifoglue_frame::SEPARATOR;
use fifoglue_transport::{create_fifo, is_fifo, remove_fifo, TransportError};
use tracing::debug;

use crate::error::{EndpointError, Result};

/// The set of registered endpoints, as FIFO entries in one directory.
///
/// There is no in-memory bookkeeping: an entry's presence is what makes a
/// name taken, for every process on the machine. Exclusive FIFO creation is
/// the ownership lock.
#[derive(Debug, Clone)]
pub struct Namespace {
    dir: PathBuf,
    fifo_mode: u32,
}

impl Namespace {
    pub fn new(dir: impl AsRef<Path>, fifo_mode: u32) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            fifo_mode,
        }
    }

    /// The namespace directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the FIFO backing `name`.
    pub fn path_for(&self, name: &str) -> Result<PathBuf> {
        validate_name(name)?;
        Ok(self.dir.join(name))
    }

    /// Create the namespace directory if it does not exist yet.
    pub fn ensure_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.dir).map_err(|source| EndpointError::Namespace {
            path: self.dir.clone(),
            source,
        })
    }

    /// Claim `name` by creating its FIFO.
    pub fn create(&self, name: &str) -> Result<PathBuf> {
        let path = self.path_for(name)?;
        self.ensure_dir()?;
        match create_fifo(&path, self.fifo_mode) {
            Ok(()) => Ok(path),
            Err(TransportError::AlreadyExists { .. }) => {
                Err(EndpointError::AlreadyRegistered(name.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Returns true if a FIFO for `name` exists.
    pub fn exists(&self, name: &str) -> Result<bool> {
        Ok(is_fifo(self.path_for(name)?))
    }

    /// Release `name` by removing its FIFO.
    pub fn remove(&self, name: &str) -> Result<()> {
        let path = self.path_for(name)?;
        match remove_fifo(&path) {
            Ok(()) => Ok(()),
            Err(TransportError::NotFound { .. }) => {
                Err(EndpointError::NoSuchEndpoint(name.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Names of all registered endpoints, sorted.
    ///
    /// A namespace directory that does not exist yet has no endpoints.
    /// Entries that are not FIFOs or whose names are not UTF-8 are skipped.
    pub fn list(&self) -> Result<Vec<String>> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(EndpointError::Namespace {
                    path: self.dir.clone(),
                    source,
                })
            }
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| EndpointError::Namespace {
                path: self.dir.clone(),
                source,
            })?;
            let is_fifo = entry
                .file_type()
                .map(|file_type| file_type.is_fifo())
                .unwrap_or(false);
            if !is_fifo {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => debug!(?raw, "skipping non-UTF-8 namespace entry"),
            }
        }
        names.sort();
        Ok(names)
    }
}

/// Check that `name` can be used as an endpoint name.
///
/// Names become single path components inside the namespace directory, and
/// must not contain the frame separator.
pub fn validate_name(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        "name is empty"
    } else if name.contains(SEPARATOR) {
        "name contains the separator"
    } else if name.contains('/') {
        "name contains a path separator"
    } else if name.contains('\0') {
        "name contains a NUL byte"
    } else if name == "." || name == ".." {
        "name is a relative path component"
    } else {
        return Ok(());
    };

    Err(EndpointError::InvalidName {
        name: name.to_string(),
        reason,
    })
}
