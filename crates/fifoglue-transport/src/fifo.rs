use std::ffi::CString;
use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::{FileTypeExt, OpenOptionsExt, PermissionsExt};
use std::path::Path;

use tracing::debug;

use crate::error::{Result, TransportError};
use crate::handle::{FifoReader, FifoWriter};

/// Default permission mode for created FIFOs.
///
/// World-writable so that any local process can deliver to an endpoint.
pub const DEFAULT_FIFO_MODE: u32 = 0o666;

/// Create a FIFO object at `path`.
///
/// Creation is exclusive: if anything already exists at `path` this fails
/// with [`TransportError::AlreadyExists`]. The mode is applied explicitly
/// after creation so the process umask does not narrow it.
pub fn create_fifo(path: impl AsRef<Path>, mode: u32) -> Result<()> {
    let path = path.as_ref();
    let c_path = CString::new(path.as_os_str().as_bytes()).map_err(|_| TransportError::Create {
        path: path.to_path_buf(),
        source: std::io::Error::new(ErrorKind::InvalidInput, "path contains a NUL byte"),
    })?;

    // SAFETY: `c_path` is a valid NUL-terminated string that outlives the call.
    let rc = unsafe { libc::mkfifo(c_path.as_ptr(), mode as libc::mode_t) };
    if rc != 0 {
        let err = std::io::Error::last_os_error();
        if err.kind() == ErrorKind::AlreadyExists {
            return Err(TransportError::AlreadyExists {
                path: path.to_path_buf(),
            });
        }
        return Err(TransportError::Create {
            path: path.to_path_buf(),
            source: err,
        });
    }

    if let Err(err) = std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)) {
        let _ = std::fs::remove_file(path);
        return Err(TransportError::Create {
            path: path.to_path_buf(),
            source: err,
        });
    }

    debug!(?path, mode = format_args!("{mode:o}"), "created fifo");
    Ok(())
}

/// Open a FIFO for reading.
///
/// Blocks until at least one writer has the FIFO open.
pub fn open_read(path: impl AsRef<Path>) -> Result<FifoReader> {
    let path = path.as_ref();
    let file = open_fifo(path, OpenOptions::new().read(true))?;
    debug!(?path, "opened fifo for reading");
    Ok(FifoReader::new(file, path.to_path_buf()))
}

/// Open a FIFO for writing.
///
/// Blocks until a reader has the FIFO open.
pub fn open_write(path: impl AsRef<Path>) -> Result<FifoWriter> {
    let path = path.as_ref();
    let file = open_fifo(path, OpenOptions::new().write(true))?;
    debug!(?path, "opened fifo for writing");
    Ok(FifoWriter::new(file, path.to_path_buf()))
}

/// Open a FIFO for writing without waiting for a reader.
///
/// Fails with [`TransportError::NoReader`] when nobody has the FIFO open for
/// reading. The returned handle stays non-blocking: a write of at most
/// `PIPE_BUF` bytes either lands whole or fails with
/// [`ErrorKind::WouldBlock`] when the pipe has no room for it.
pub fn try_open_write(path: impl AsRef<Path>) -> Result<FifoWriter> {
    let path = path.as_ref();
    let file = open_fifo(
        path,
        OpenOptions::new().write(true).custom_flags(libc::O_NONBLOCK),
    )?;
    debug!(?path, "opened fifo for writing (non-blocking)");
    Ok(FifoWriter::new(file, path.to_path_buf()))
}

/// Remove the FIFO object at `path`.
///
/// Refuses to remove anything that is not a FIFO.
pub fn remove_fifo(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let metadata = match std::fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(TransportError::NotFound {
                path: path.to_path_buf(),
            })
        }
        Err(err) => {
            return Err(TransportError::Remove {
                path: path.to_path_buf(),
                source: err,
            })
        }
    };
    if !metadata.file_type().is_fifo() {
        return Err(TransportError::NotAFifo {
            path: path.to_path_buf(),
        });
    }

    match std::fs::remove_file(path) {
        Ok(()) => {
            debug!(?path, "removed fifo");
            Ok(())
        }
        Err(err) if err.kind() == ErrorKind::NotFound => Err(TransportError::NotFound {
            path: path.to_path_buf(),
        }),
        Err(err) => Err(TransportError::Remove {
            path: path.to_path_buf(),
            source: err,
        }),
    }
}

/// Returns true if `path` names a FIFO (symlinks are not followed).
pub fn is_fifo(path: impl AsRef<Path>) -> bool {
    std::fs::symlink_metadata(path)
        .map(|metadata| metadata.file_type().is_fifo())
        .unwrap_or(false)
}

fn open_fifo(path: &Path, options: &OpenOptions) -> Result<File> {
    let file = loop {
        match options.open(path) {
            Ok(file) => break file,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(TransportError::NotFound {
                    path: path.to_path_buf(),
                })
            }
            Err(err) if err.raw_os_error() == Some(libc::ENXIO) => {
                return Err(TransportError::NoReader {
                    path: path.to_path_buf(),
                })
            }
            Err(err) => {
                return Err(TransportError::Open {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    };

    // Checked on the open handle rather than the path to avoid racing a swap.
    let metadata = file.metadata().map_err(|err| TransportError::Open {
        path: path.to_path_buf(),
        source: err,
    })?;
    if !metadata.file_type().is_fifo() {
        return Err(TransportError::NotAFifo {
            path: path.to_path_buf(),
        });
    }

    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::path::PathBuf;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "fifoglue-transport-{tag}-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("time should be after epoch")
                .as_nanos()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_create_is_exclusive() {
        let dir = temp_dir("exclusive");
        let path = dir.join("ep");

        create_fifo(&path, DEFAULT_FIFO_MODE).unwrap();
        assert!(is_fifo(&path));

        let result = create_fifo(&path, DEFAULT_FIFO_MODE);
        assert!(matches!(result, Err(TransportError::AlreadyExists { .. })));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_create_applies_mode_despite_umask() {
        let dir = temp_dir("mode");
        let path = dir.join("ep");

        create_fifo(&path, 0o666).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o666);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_write_then_read_across_threads() {
        let dir = temp_dir("rw");
        let path = dir.join("ep");
        create_fifo(&path, DEFAULT_FIFO_MODE).unwrap();

        let path_clone = path.clone();
        let writer = std::thread::spawn(move || {
            let mut fifo = open_write(&path_clone).unwrap();
            fifo.write_all(b"hello").unwrap();
        });

        let mut reader = open_read(&path).unwrap();
        let mut buf = [0u8; 5];
        reader.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"hello");
        writer.join().unwrap();

        // Writer dropped: the next read reports zero bytes.
        assert_eq!(reader.read(&mut buf).unwrap(), 0);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_try_open_write_without_reader() {
        let dir = temp_dir("noreader");
        let path = dir.join("ep");
        create_fifo(&path, DEFAULT_FIFO_MODE).unwrap();

        let result = try_open_write(&path);
        assert!(matches!(result, Err(TransportError::NoReader { .. })));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_try_open_write_fails_fast_on_full_pipe() {
        let dir = temp_dir("full");
        let path = dir.join("ep");
        create_fifo(&path, DEFAULT_FIFO_MODE).unwrap();

        let path_clone = path.clone();
        let reader = std::thread::spawn(move || open_read(&path_clone).unwrap());
        let _blocking = open_write(&path).unwrap();
        let _reader = reader.join().unwrap();

        let mut writer = try_open_write(&path).unwrap();
        let chunk = [0u8; 512];
        let mut written = 0usize;
        let err = loop {
            match writer.write(&chunk) {
                Ok(n) => {
                    assert_eq!(n, chunk.len(), "small writes are all-or-nothing");
                    written += n;
                }
                Err(err) => break err,
            }
        };
        assert_eq!(err.kind(), ErrorKind::WouldBlock);
        assert!(written > 0);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_open_missing_fifo() {
        let dir = temp_dir("missing");
        let path = dir.join("nobody");

        assert!(matches!(
            open_write(&path),
            Err(TransportError::NotFound { .. })
        ));
        assert!(matches!(
            open_read(&path),
            Err(TransportError::NotFound { .. })
        ));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_open_rejects_regular_file() {
        let dir = temp_dir("regular");
        let path = dir.join("plain");
        std::fs::write(&path, b"regular-file").unwrap();

        assert!(matches!(
            open_read(&path),
            Err(TransportError::NotAFifo { .. })
        ));
        assert!(matches!(
            open_write(&path),
            Err(TransportError::NotAFifo { .. })
        ));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_remove_fifo() {
        let dir = temp_dir("remove");
        let path = dir.join("ep");
        create_fifo(&path, DEFAULT_FIFO_MODE).unwrap();

        remove_fifo(&path).unwrap();
        assert!(!path.exists());
        assert!(matches!(
            remove_fifo(&path),
            Err(TransportError::NotFound { .. })
        ));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_remove_refuses_non_fifo() {
        let dir = temp_dir("remove-file");
        let path = dir.join("plain");
        std::fs::write(&path, b"keep me").unwrap();

        assert!(matches!(
            remove_fifo(&path),
            Err(TransportError::NotAFifo { .. })
        ));
        assert!(path.exists(), "regular files must never be removed");

        let _ = std::fs::remove_dir_all(&dir);
    }
}
