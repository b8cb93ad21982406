use std::{
  io::{
    self,
    Write,
  },
  mem,
  path::PathBuf,
  ptr,
};

use libc::c_int;
use spin::Mutex;

use crate::{
  crash::{
    ARMED,
    Armed,
    CrashSink,
  },
  system::{
    MemoryKind,
    RawStream,
    SysError,
    SysResult,
    System,
  },
  time::BrokenDownTime,
};

#[cfg(not(target_os = "macos"))]
use crate::prim::pages_to_bytes;

pub struct UnixSystem {}

pub static UNIX_SYSTEM: UnixSystem = UnixSystem {};

const FATAL_SIGNALS: [(c_int, &[u8]); 5] = [
  (libc::SIGSEGV, b"SIGSEGV"),
  (libc::SIGBUS, b"SIGBUS"),
  (libc::SIGILL, b"SIGILL"),
  (libc::SIGFPE, b"SIGFPE"),
  (libc::SIGABRT, b"SIGABRT"),
];

/// Dispositions replaced by `install_crash_handler`, restored on uninstall.
static PREVIOUS_ACTIONS: Mutex<Option<[libc::sigaction; FATAL_SIGNALS.len()]>> = Mutex::new(None);

#[cfg(any(all(target_os = "linux", target_env = "gnu"), target_os = "macos"))]
unsafe extern "C" {
  fn backtrace(buffer: *mut *mut libc::c_void, size: c_int) -> c_int;
  fn backtrace_symbols_fd(buffer: *const *mut libc::c_void, size: c_int, fd: c_int);
}

impl UnixSystem {
  fn check(ret: c_int) -> SysResult<()> {
    if ret == 0 {
      return Ok(());
    }

    Err(SysError::last_os_error())
  }

  fn sysconf(name: c_int) -> SysResult<usize> {
    match unsafe { libc::sysconf(name) } {
      n if n > 0 => Ok(n as usize),
      0 => Err(SysError::Unsupported),
      _ => Err(SysError::last_os_error()),
    }
  }

  fn detach_child() -> SysResult<()> {
    if unsafe { libc::setsid() } < 0 {
      return Err(SysError::last_os_error());
    }

    let null = unsafe { libc::open(c"/dev/null".as_ptr(), libc::O_RDONLY) };
    if null < 0 {
      return Err(SysError::last_os_error());
    }

    let dup = unsafe { libc::dup2(null, libc::STDIN_FILENO) };
    let err = (dup < 0).then(SysError::last_os_error);
    if null != libc::STDIN_FILENO {
      unsafe { libc::close(null) };
    }

    err.map_or(Ok(()), Err)
  }
}

impl System for UnixSystem {
  #[cfg(target_os = "linux")]
  fn memory_used(&self, kind: MemoryKind) -> SysResult<usize> {
    // statm: size resident shared text lib data dt, all in pages
    let statm = std::fs::read_to_string("/proc/self/statm")?;
    let mut fields = statm.split_ascii_whitespace();
    let field = match kind {
      MemoryKind::Virtual => fields.next(),
      MemoryKind::Resident => fields.nth(1),
    };

    let pages = field
      .ok_or(SysError::Unsupported)?
      .parse::<usize>()
      .map_err(|_| SysError::InvalidArgument)?;
    Ok(pages_to_bytes(pages))
  }

  #[cfg(target_os = "macos")]
  #[allow(deprecated)]
  fn memory_used(&self, kind: MemoryKind) -> SysResult<usize> {
    let mut info: libc::mach_task_basic_info = unsafe { mem::zeroed() };
    let mut count = libc::MACH_TASK_BASIC_INFO_COUNT;
    let ret = unsafe {
      libc::task_info(
        libc::mach_task_self(),
        libc::MACH_TASK_BASIC_INFO,
        (&mut info as *mut libc::mach_task_basic_info).cast(),
        &mut count,
      )
    };
    if ret != libc::KERN_SUCCESS {
      return Err(SysError::Os(ret));
    }

    let bytes = match kind {
      MemoryKind::Resident => info.resident_size,
      MemoryKind::Virtual => info.virtual_size,
    };
    Ok(usize::try_from(bytes).unwrap_or(usize::MAX))
  }

  #[cfg(target_os = "macos")]
  fn physical_memory(&self) -> SysResult<usize> {
    let mut bytes: u64 = 0;
    let mut len = mem::size_of::<u64>();
    let ret = unsafe {
      libc::sysctlbyname(
        c"hw.memsize".as_ptr(),
        (&mut bytes as *mut u64).cast(),
        &mut len,
        ptr::null_mut(),
        0,
      )
    };
    Self::check(ret)?;
    Ok(usize::try_from(bytes).unwrap_or(usize::MAX))
  }

  #[cfg(not(target_os = "macos"))]
  fn physical_memory(&self) -> SysResult<usize> {
    Self::sysconf(libc::_SC_PHYS_PAGES).map(pages_to_bytes)
  }

  fn max_open_files(&self) -> SysResult<usize> {
    let mut limit: libc::rlimit = unsafe { mem::zeroed() };
    Self::check(unsafe { libc::getrlimit(libc::RLIMIT_NOFILE, &mut limit) })?;
    if limit.rlim_cur == libc::RLIM_INFINITY {
      return Ok(usize::MAX);
    }

    Ok(usize::try_from(limit.rlim_cur).unwrap_or(usize::MAX))
  }

  fn hardware_concurrency(&self) -> SysResult<usize> {
    Self::sysconf(libc::_SC_NPROCESSORS_ONLN)
  }

  #[cfg(target_os = "linux")]
  fn program_path(&self) -> SysResult<PathBuf> {
    Ok(std::fs::read_link("/proc/self/exe")?)
  }

  #[cfg(not(target_os = "linux"))]
  fn program_path(&self) -> SysResult<PathBuf> {
    Ok(std::env::current_exe()?)
  }

  fn local_time(&self, secs: i64) -> SysResult<BrokenDownTime> {
    let time = libc::time_t::try_from(secs).map_err(|_| SysError::InvalidArgument)?;
    let mut tm: libc::tm = unsafe { mem::zeroed() };
    if unsafe { libc::localtime_r(&time, &mut tm) }.is_null() {
      return Err(SysError::last_os_error());
    }

    Ok(BrokenDownTime::from(&tm))
  }

  fn put_in_background(&self) -> SysResult<()> {
    let _ = io::stdout().flush();
    let _ = io::stderr().flush();

    match unsafe { libc::fork() } {
      -1 => Err(SysError::last_os_error()),
      0 => Self::detach_child(),
      _ => unsafe { libc::_exit(0) },
    }
  }

  fn is_console(&self, stream: RawStream) -> SysResult<bool> {
    Ok(unsafe { libc::isatty(stream) } == 1)
  }

  fn terminal_size(&self) -> SysResult<(u16, u16)> {
    let mut size: libc::winsize = unsafe { mem::zeroed() };
    Self::check(unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut size) })?;
    if size.ws_col == 0 || size.ws_row == 0 {
      return Err(SysError::Unsupported);
    }

    Ok((size.ws_col, size.ws_row))
  }

  fn install_crash_handler(&self) -> SysResult<()> {
    let mut previous = PREVIOUS_ACTIONS.lock();
    if previous.is_some() {
      return Ok(());
    }

    prime_frames();

    let mut action: libc::sigaction = unsafe { mem::zeroed() };
    action.sa_sigaction = on_fatal_signal as extern "C" fn(c_int) as libc::sighandler_t;
    action.sa_flags = libc::SA_ONSTACK;
    unsafe { libc::sigemptyset(&mut action.sa_mask) };

    let mut saved: [libc::sigaction; FATAL_SIGNALS.len()] = unsafe { mem::zeroed() };
    for (index, (signal, _)) in FATAL_SIGNALS.iter().enumerate() {
      let ret = unsafe { libc::sigaction(*signal, &action, &mut saved[index]) };
      if let Err(err) = Self::check(ret) {
        for ((signal, _), old) in FATAL_SIGNALS.iter().zip(&saved).take(index) {
          unsafe { libc::sigaction(*signal, old, ptr::null_mut()) };
        }
        return Err(err);
      }
    }

    *previous = Some(saved);
    Ok(())
  }

  fn uninstall_crash_handler(&self) -> SysResult<()> {
    let Some(saved) = PREVIOUS_ACTIONS.lock().take() else {
      return Ok(());
    };

    let mut result = Ok(());
    for ((signal, _), old) in FATAL_SIGNALS.iter().zip(&saved) {
      let ret = Self::check(unsafe { libc::sigaction(*signal, old, ptr::null_mut()) });
      result = result.and(ret);
    }
    result
  }
}

// Runs in signal context: no locks, no allocation, raw fds only.
extern "C" fn on_fatal_signal(signal: c_int) {
  if let Some(armed) = ARMED.load() {
    emit_trace(armed, signal);
  }

  unsafe {
    libc::signal(signal, libc::SIG_DFL);
    libc::raise(signal);
  }
}

fn emit_trace(armed: &Armed, signal: c_int) {
  let (fd, owned) = match (&armed.sink, &armed.c_path) {
    (CrashSink::Stdout, _) => (libc::STDOUT_FILENO, false),
    (CrashSink::Stderr, _) => (libc::STDERR_FILENO, false),
    (CrashSink::File(_), Some(path)) => {
      let flags = libc::O_WRONLY | libc::O_CREAT | libc::O_APPEND | libc::O_CLOEXEC;
      (unsafe { libc::open(path.as_ptr(), flags, 0o644 as libc::c_uint) }, true)
    }
    _ => return,
  };
  if fd < 0 {
    return;
  }

  let name = FATAL_SIGNALS
    .iter()
    .find(|(s, _)| *s == signal)
    .map_or(&b"signal"[..], |(_, name)| *name);

  let header = write_all(fd, b"*** caught fatal ")
    && write_all(fd, name)
    && write_all(fd, b", stack trace follows:\n");
  if header {
    write_frames(fd);
  }

  if owned {
    unsafe { libc::close(fd) };
  }
}

fn write_all(fd: c_int, mut bytes: &[u8]) -> bool {
  while !bytes.is_empty() {
    let n = unsafe { libc::write(fd, bytes.as_ptr().cast(), bytes.len()) };
    match n {
      n if n > 0 => bytes = &bytes[n as usize..],
      n if n < 0 && io::Error::last_os_error().raw_os_error() == Some(libc::EINTR) => {}
      _ => return false,
    }
  }
  true
}

#[cfg(any(all(target_os = "linux", target_env = "gnu"), target_os = "macos"))]
fn write_frames(fd: c_int) {
  const MAX_FRAMES: usize = 128;

  let mut frames = [ptr::null_mut(); MAX_FRAMES];
  let depth = unsafe { backtrace(frames.as_mut_ptr(), MAX_FRAMES as c_int) };
  if depth > 0 {
    unsafe { backtrace_symbols_fd(frames.as_ptr(), depth, fd) };
  }
}

#[cfg(not(any(all(target_os = "linux", target_env = "gnu"), target_os = "macos")))]
fn write_frames(fd: c_int) {
  let _ = write_all(fd, b"(frame walking unavailable on this platform)\n");
}

// The first backtrace() call may load the unwinder, which allocates.
#[cfg(any(all(target_os = "linux", target_env = "gnu"), target_os = "macos"))]
fn prime_frames() {
  let mut frames = [ptr::null_mut(); 1];
  unsafe { backtrace(frames.as_mut_ptr(), 1) };
}

#[cfg(not(any(all(target_os = "linux", target_env = "gnu"), target_os = "macos")))]
fn prime_frames() {}
