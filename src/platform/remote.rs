// LogScraper - platform/remote.rs
//
// Remote transport seam and the local-copy cache for remote log files.
//
// Reading a log over a remote session line by line is slow, so remote files
// are copied into a temp directory first and scraped locally. The transport
// itself (SSH/SFTP or anything else) is supplied by the embedding program
// through `RemoteTransport`; two implementations ship here:
//   - `UnsupportedTransport`: the default, every connect fails.
//   - `LocalTransport`: serves the local filesystem, for single-host setups
//     where a level maps to this box but copies are still wanted.
//
// Every failure is a `RemoteError` and is non-fatal to a scrape: the caller
// logs it and drops the affected host or file.

use crate::platform::fs;
use crate::util::constants;
use crate::util::error::RemoteError;
use directories::ProjectDirs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

// =============================================================================
// Transport traits
// =============================================================================

/// Establishes sessions with remote hosts.
pub trait RemoteTransport: Send + Sync {
    /// Open a session with `host`, giving up after `timeout`.
    fn connect(&self, host: &str, timeout: Duration)
        -> Result<Box<dyn RemoteSession>, RemoteError>;
}

/// An open session with one host.
pub trait RemoteSession {
    /// Names of the entries in `dir` (names only, not paths).
    fn list_dir(&mut self, dir: &Path) -> Result<Vec<String>, RemoteError>;

    /// Copy `remote` to the local path `local`.
    fn copy_file(&mut self, remote: &Path, local: &Path) -> Result<(), RemoteError>;
}

/// Transport used when none is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedTransport;

impl RemoteTransport for UnsupportedTransport {
    fn connect(
        &self,
        host: &str,
        _timeout: Duration,
    ) -> Result<Box<dyn RemoteSession>, RemoteError> {
        Err(RemoteError::Unsupported {
            host: host.to_string(),
        })
    }
}

/// Transport backed by the local filesystem.
///
/// Every host name is accepted and resolves to this machine.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalTransport;

impl RemoteTransport for LocalTransport {
    fn connect(
        &self,
        host: &str,
        _timeout: Duration,
    ) -> Result<Box<dyn RemoteSession>, RemoteError> {
        tracing::debug!(host, "Opening local session");
        Ok(Box::new(LocalSession {
            host: host.to_string(),
        }))
    }
}

struct LocalSession {
    host: String,
}

impl RemoteSession for LocalSession {
    fn list_dir(&mut self, dir: &Path) -> Result<Vec<String>, RemoteError> {
        let entries = std::fs::read_dir(dir).map_err(|e| RemoteError::Session {
            host: self.host.clone(),
            reason: format!("cannot list '{}': {e}", dir.display()),
        })?;

        let mut names = Vec::new();
        for entry in entries {
            match entry {
                Ok(entry) => names.push(entry.file_name().to_string_lossy().into_owned()),
                Err(e) => {
                    tracing::debug!(dir = %dir.display(), error = %e, "Unreadable directory entry");
                }
            }
        }
        Ok(names)
    }

    fn copy_file(&mut self, remote: &Path, local: &Path) -> Result<(), RemoteError> {
        std::fs::copy(remote, local)
            .map(|_| ())
            .map_err(|e| RemoteError::Session {
                host: self.host.clone(),
                reason: format!("cannot copy '{}': {e}", remote.display()),
            })
    }
}

// =============================================================================
// Local copy cache
// =============================================================================

/// Local copies of remote files, refreshed once older than `lifetime`.
#[derive(Debug, Clone)]
pub struct LocalCopyCache {
    dir: PathBuf,
    lifetime: Duration,
}

impl LocalCopyCache {
    pub fn new(dir: PathBuf, lifetime_hours: u64) -> Self {
        Self {
            dir,
            lifetime: Duration::from_secs(lifetime_hours.saturating_mul(60 * 60)),
        }
    }

    /// Where the copy of `remote` fetched for `level` is stored:
    /// `<dir>/<level>_<remote file name>`.
    pub fn local_path(&self, level: &str, remote: &Path) -> Option<PathBuf> {
        let name = remote.file_name()?.to_string_lossy();
        Some(self.dir.join(format!(
            "{level}{}{name}",
            constants::LOCAL_COPY_SEPARATOR
        )))
    }

    /// Return a fresh local copy of `remote`, fetching it from `host` when
    /// no copy exists or the existing one is stale.
    pub fn fetch(
        &self,
        transport: &dyn RemoteTransport,
        host: &str,
        level: &str,
        remote: &Path,
    ) -> Result<PathBuf, RemoteError> {
        let local = self.local_path(level, remote).ok_or_else(|| RemoteError::Io {
            path: remote.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "remote path has no file name"),
        })?;

        if fs::is_fresh(&local, self.lifetime, SystemTime::now()) {
            tracing::debug!(local = %local.display(), "Reusing fresh local copy");
            return Ok(local);
        }

        std::fs::create_dir_all(&self.dir).map_err(|e| RemoteError::Io {
            path: self.dir.clone(),
            source: e,
        })?;
        remove_if_exists(&local)?;

        // Transfers land in a sibling file and are renamed into place only
        // once complete, so an interrupted copy never looks fresh.
        let mut partial = local.clone().into_os_string();
        partial.push(constants::PARTIAL_COPY_SUFFIX);
        let partial = PathBuf::from(partial);
        remove_if_exists(&partial)?;

        tracing::debug!(
            host,
            remote = %remote.display(),
            local = %local.display(),
            "Copying file temporarily"
        );
        let copied = transport
            .connect(
                host,
                Duration::from_secs(constants::REMOTE_CONNECT_TIMEOUT_SECS),
            )
            .and_then(|mut session| session.copy_file(remote, &partial));
        if let Err(e) = copied {
            if let Err(cleanup) = remove_if_exists(&partial) {
                tracing::debug!(error = %cleanup, "Could not remove partial copy");
            }
            return Err(e);
        }

        std::fs::rename(&partial, &local).map_err(|e| RemoteError::Io {
            path: local.clone(),
            source: e,
        })?;
        tracing::debug!(local = %local.display(), "Done copying file");

        Ok(local)
    }
}

fn remove_if_exists(path: &Path) -> Result<(), RemoteError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(RemoteError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Directory for remote copies when `tmp_path` is not configured: the
/// platform cache directory, or the system temp directory as a fallback.
pub fn default_copy_dir() -> PathBuf {
    if let Some(dirs) = ProjectDirs::from("", "", constants::APP_ID) {
        return dirs.cache_dir().join(constants::REMOTE_CACHE_DIR_NAME);
    }
    tracing::warn!("Could not determine platform cache directory, using system temp dir");
    std::env::temp_dir()
        .join(constants::APP_ID)
        .join(constants::REMOTE_CACHE_DIR_NAME)
}
