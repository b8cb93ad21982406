//! Portable accessors for operating-system and terminal facts that would
//! otherwise need per-OS code at every call site.
//!
//! Every accessor answers: when the OS cannot, it returns a documented
//! sentinel (`0`, an empty string, `false`, or an 80x24 terminal) instead of
//! an error.

pub mod diag;
pub mod process;
pub mod resource;
pub mod time;

pub use diag::{
  crash_stacktrace_sink,
  setup_crash_stacktrace,
  stacktrace,
};
#[allow(deprecated)]
pub use process::put_in_background_with_args;
pub use process::{
  getenv,
  put_in_background,
  this_program_path,
};
#[allow(deprecated)]
pub use resource::physical_concurrency;
pub use resource::{
  hardware_concurrency,
  max_open_files,
  memory_used,
  physical_memory,
};
pub use sysutil_sys::{
  crash::CrashSink,
  system::MemoryKind,
  time::BrokenDownTime,
};
pub use sysutil_term::{
  Color,
  Style,
  Term,
  terminal_columns,
  terminal_rows,
  terminal_size,
};
pub use time::{
  get_local_time,
  local_time,
  usleep,
};

pub mod prelude {
  pub use super::{
    BrokenDownTime,
    CrashSink,
    MemoryKind,
    Term,
    getenv,
    hardware_concurrency,
    memory_used,
    setup_crash_stacktrace,
    stacktrace,
    terminal_columns,
    terminal_rows,
  };
}
