use std::{
  convert::Infallible,
  fmt,
  path::PathBuf,
  str::FromStr,
};

#[cfg(unix)]
use std::{
  ffi::CString,
  os::unix::ffi::OsStrExt,
};

#[cfg(feature = "stacktrace")]
use sysutil_sync::Next;
use sysutil_sync::Published;

#[cfg(feature = "stacktrace")]
use crate::system::GLOBAL_SYSTEM;
use crate::system::{
  SysError,
  SysResult,
};

/// Where a stack trace goes when the process dies from a fatal signal or an
/// unhandled fault.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CrashSink {
  #[default]
  Disabled,
  Stdout,
  Stderr,
  /// Appended to at crash time, created if missing.
  File(PathBuf),
}

impl From<&str> for CrashSink {
  fn from(name: &str) -> Self {
    match name {
      "" => Self::Disabled,
      "stdout" => Self::Stdout,
      "stderr" => Self::Stderr,
      path => Self::File(PathBuf::from(path)),
    }
  }
}

impl FromStr for CrashSink {
  type Err = Infallible;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Ok(Self::from(s))
  }
}

impl fmt::Display for CrashSink {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Disabled => Ok(()),
      Self::Stdout => f.write_str("stdout"),
      Self::Stderr => f.write_str("stderr"),
      Self::File(path) => write!(f, "{}", path.display()),
    }
  }
}

/// The snapshot a crash handler reads. Everything it needs is encoded ahead
/// of time so the handler never allocates.
pub(crate) struct Armed {
  pub(crate) sink: CrashSink,
  #[cfg(unix)]
  pub(crate) c_path: Option<CString>,
}

#[cfg_attr(not(feature = "stacktrace"), allow(dead_code))]
impl Armed {
  fn new(sink: CrashSink) -> SysResult<Self> {
    #[cfg(unix)]
    let c_path = match &sink {
      CrashSink::File(path) => {
        Some(CString::new(path.as_os_str().as_bytes()).map_err(|_| SysError::InvalidArgument)?)
      }
      _ => None,
    };

    Ok(Self {
      sink,
      #[cfg(unix)]
      c_path,
    })
  }
}

pub(crate) static ARMED: Published<Armed> = Published::empty();

/// Makes `sink` the process-wide crash destination. `Disabled` removes the
/// handler; anything else installs it on first use and retargets it
/// afterwards. Registering the sink already in effect changes nothing. On
/// failure the previous registration stays in effect.
///
/// Every change of sink retires the previous snapshot, which stays allocated
/// until exit.
#[cfg(feature = "stacktrace")]
pub fn register(sink: CrashSink) -> SysResult<()> {
  ARMED.update(|current| match (&sink, current) {
    (CrashSink::Disabled, None) => Ok(Next::Keep),
    (_, Some(current)) if current.sink == sink => Ok(Next::Keep),
    (CrashSink::Disabled, Some(previous)) => {
      GLOBAL_SYSTEM.uninstall_crash_handler()?;
      tracing::debug!(previous = %previous.sink, "crash stack trace disabled");
      Ok(Next::Clear)
    }
    (_, current) => {
      let armed = Armed::new(sink.clone())?;
      if current.is_none() {
        GLOBAL_SYSTEM.install_crash_handler()?;
      }
      tracing::debug!(sink = %armed.sink, "crash stack trace enabled");
      Ok(Next::Replace(armed))
    }
  })
}

#[cfg(not(feature = "stacktrace"))]
pub fn register(sink: CrashSink) -> SysResult<()> {
  _ = sink;
  Err(SysError::Unsupported)
}

/// The registration currently in effect.
pub fn active() -> CrashSink {
  ARMED
    .load()
    .map_or(CrashSink::Disabled, |armed| armed.sink.clone())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_stream_aliases() {
    assert_eq!(CrashSink::from(""), CrashSink::Disabled);
    assert_eq!(CrashSink::from("stdout"), CrashSink::Stdout);
    assert_eq!(CrashSink::from("stderr"), CrashSink::Stderr);
  }

  #[test]
  fn aliases_are_case_sensitive() {
    assert_eq!(CrashSink::from("STDOUT"), CrashSink::File(PathBuf::from("STDOUT")));
    assert_eq!(CrashSink::from("Stderr"), CrashSink::File(PathBuf::from("Stderr")));
  }

  #[test]
  fn display_matches_registration_string() {
    for name in ["", "stdout", "stderr", "/tmp/crash.log"] {
      let sink: CrashSink = name.parse().unwrap();
      assert_eq!(sink.to_string(), name);
    }
  }

  #[cfg(unix)]
  #[test]
  fn armed_rejects_interior_nul() {
    let sink = CrashSink::File(PathBuf::from("bad\0path"));
    assert!(matches!(Armed::new(sink), Err(SysError::InvalidArgument)));
  }
}
