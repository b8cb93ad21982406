use std::{
  io,
  path::PathBuf,
};

use crate::time::BrokenDownTime;

#[cfg(any(target_os = "linux", target_os = "macos", target_os = "freebsd"))]
use crate::unix::UNIX_SYSTEM;
#[cfg(windows)]
use crate::windows::WINDOWS_SYSTEM;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SysError {
  Unsupported,
  InvalidArgument,
  Io(io::ErrorKind),
  Os(i32),
}

impl SysError {
  pub fn last_os_error() -> Self {
    io::Error::last_os_error().into()
  }
}

impl From<io::Error> for SysError {
  fn from(err: io::Error) -> Self {
    match err.raw_os_error() {
      Some(code) => Self::Os(code),
      None => Self::Io(err.kind()),
    }
  }
}

pub type SysResult<T> = Result<T, SysError>;

/// Collapses a query result into the value callers get when the OS cannot
/// answer.
pub trait SysResultExt<T> {
  fn or_sentinel(self, query: &'static str, sentinel: T) -> T;
}

impl<T> SysResultExt<T> for SysResult<T> {
  fn or_sentinel(self, query: &'static str, sentinel: T) -> T {
    self.unwrap_or_else(|err| {
      tracing::trace!(query, ?err, "query unavailable, using sentinel");
      sentinel
    })
  }
}

/// Which footprint `memory_used` reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MemoryKind {
  /// Physical memory currently backing the process.
  #[default]
  Resident,
  /// Reserved address space, backed or not.
  Virtual,
}

#[cfg(unix)]
pub type RawStream = std::os::fd::RawFd;

#[cfg(windows)]
pub type RawStream = std::os::windows::io::RawHandle;

#[cfg(not(any(unix, windows)))]
pub type RawStream = i32;

/// Operating-system queries behind the facade. Every method defaults to
/// `Unsupported` so a backend only implements what its platform offers.
pub trait System
where
  Self: Send + Sync,
{
  fn memory_used(&self, kind: MemoryKind) -> SysResult<usize> {
    _ = kind;
    Err(SysError::Unsupported)
  }

  /// Installed RAM, independent of process or cgroup limits.
  fn physical_memory(&self) -> SysResult<usize> {
    Err(SysError::Unsupported)
  }

  /// Soft limit on simultaneously open file handles.
  fn max_open_files(&self) -> SysResult<usize> {
    Err(SysError::Unsupported)
  }

  /// Logical processors, SMT siblings included.
  fn hardware_concurrency(&self) -> SysResult<usize> {
    Err(SysError::Unsupported)
  }

  fn program_path(&self) -> SysResult<PathBuf> {
    Err(SysError::Unsupported)
  }

  /// Local-timezone decomposition of `secs` since the epoch. Must not touch
  /// process-global broken-down-time buffers.
  fn local_time(&self, secs: i64) -> SysResult<BrokenDownTime> {
    _ = secs;
    Err(SysError::Unsupported)
  }

  /// Detaches from the controlling terminal. Only the detached process
  /// returns; the original one exits.
  fn put_in_background(&self) -> SysResult<()> {
    Err(SysError::Unsupported)
  }

  /// Whether `stream` is a live console that understands ANSI escapes.
  fn is_console(&self, stream: RawStream) -> SysResult<bool> {
    _ = stream;
    Err(SysError::Unsupported)
  }

  /// `(columns, rows)` of the terminal attached to standard output.
  fn terminal_size(&self) -> SysResult<(u16, u16)> {
    Err(SysError::Unsupported)
  }

  /// Routes fatal signals or unhandled faults to the crash sink.
  fn install_crash_handler(&self) -> SysResult<()> {
    Err(SysError::Unsupported)
  }

  /// Restores whatever fault handling was in place before
  /// `install_crash_handler`.
  fn uninstall_crash_handler(&self) -> SysResult<()> {
    Err(SysError::Unsupported)
  }
}

pub struct UnsupportedSystem {}
impl System for UnsupportedSystem {}

#[cfg(any(target_os = "linux", target_os = "macos", target_os = "freebsd"))]
pub static GLOBAL_SYSTEM: &dyn System = &UNIX_SYSTEM;

#[cfg(windows)]
pub static GLOBAL_SYSTEM: &dyn System = &WINDOWS_SYSTEM;

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "freebsd", windows)))]
pub static GLOBAL_SYSTEM: &dyn System = &UnsupportedSystem {};
