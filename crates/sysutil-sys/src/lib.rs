pub mod crash;
pub mod prim;
pub mod system;
pub mod time;
pub mod trace;
#[cfg(any(target_os = "linux", target_os = "macos", target_os = "freebsd"))]
pub mod unix;
#[cfg(windows)]
pub mod windows;

pub use system::GLOBAL_SYSTEM;

pub mod prelude {
  pub use super::{
    GLOBAL_SYSTEM,
    crash::CrashSink,
    prim::page_size,
    system::{
      MemoryKind,
      RawStream,
      SysError,
      SysResult,
      SysResultExt,
      System,
    },
    time::BrokenDownTime,
  };
}
