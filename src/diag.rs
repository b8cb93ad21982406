use sysutil_sys::{
  crash::{
    self,
    CrashSink,
  },
  trace,
};

/// The calling thread's stack, innermost frame first, one frame per line
/// with source locations where debug info allows. Empty when built without
/// the `stacktrace` feature.
pub fn stacktrace() -> String {
  trace::capture_after(&["sysutil::diag::"])
}

/// Dumps a stack trace when the process dies from a fatal signal
/// (SIGSEGV, SIGBUS, SIGILL, SIGFPE, SIGABRT) or, on Windows, an unhandled
/// exception.
///
/// `filename` is `"stdout"` or `"stderr"` for those streams, any other
/// non-empty string for a file that is appended to (and created) at crash
/// time, or `""` to turn the dump off. The latest successful call wins.
/// Returns `false` if the handler cannot be installed here, leaving the
/// previous registration in effect.
///
/// Repeating the current registration is free. Each call that changes the
/// destination keeps a small record of the old one alive until exit.
pub fn setup_crash_stacktrace(filename: &str) -> bool {
  match crash::register(CrashSink::from(filename)) {
    Ok(()) => true,
    Err(err) => {
      tracing::debug!(filename, ?err, "crash stack trace setup failed");
      false
    }
  }
}

/// The crash destination currently registered.
pub fn crash_stacktrace_sink() -> CrashSink {
  crash::active()
}
