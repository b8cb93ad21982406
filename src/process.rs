use std::{
  borrow::Cow,
  ffi::OsStr,
  path::PathBuf,
};

use sysutil_sys::prelude::*;

/// Absolute path of the running executable, or an empty path when the
/// platform cannot tell. Symlinks are resolved only where the OS resolves
/// them (Linux `/proc/self/exe`).
pub fn this_program_path() -> PathBuf {
  GLOBAL_SYSTEM
    .program_path()
    .or_sentinel("program_path", PathBuf::new())
}

/// Value of the environment variable `name`, or `default` when it is not
/// set.
///
/// A set variable comes back as `Cow::Owned`, a snapshot of the environment
/// at the time of the call (non-UTF-8 bytes are replaced). An unset one comes
/// back as `Cow::Borrowed(default)`, the caller's own string. A set but empty
/// variable yields `""`, not `default`. Names that cannot exist (empty, or
/// containing `=` or NUL) are treated as unset.
pub fn getenv<'a>(name: &str, default: &'a str) -> Cow<'a, str> {
  if name.is_empty() || name.contains(['=', '\0']) {
    return Cow::Borrowed(default);
  }

  match std::env::var_os(name) {
    Some(value) => Cow::Owned(
      value
        .into_string()
        .unwrap_or_else(|raw| raw.to_string_lossy().into_owned()),
    ),
    None => Cow::Borrowed(default),
  }
}

/// Moves the process into the background so the launching shell gets its
/// prompt back: the original process exits and a detached child, in a new
/// session with stdin on `/dev/null`, returns `true`. Returns `false` where
/// backgrounding does not apply (Windows) or fails.
pub fn put_in_background() -> bool {
  match GLOBAL_SYSTEM.put_in_background() {
    Ok(()) => true,
    Err(err) => {
      tracing::debug!(?err, "could not put process in background");
      false
    }
  }
}

#[deprecated(note = "arguments are ignored, use put_in_background()")]
pub fn put_in_background_with_args<S: AsRef<OsStr>>(args: &[S]) -> bool {
  _ = args;
  put_in_background()
}
