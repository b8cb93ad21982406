use std::{
  ffi::OsString,
  fs::OpenOptions,
  io::{
    self,
    Write,
  },
  mem,
  os::windows::ffi::OsStringExt,
  path::PathBuf,
  ptr,
};

use spin::Mutex;
use windows_sys::Win32::{
  Foundation::{
    HANDLE,
    INVALID_HANDLE_VALUE,
  },
  System::{
    Console::{
      CONSOLE_SCREEN_BUFFER_INFO,
      ENABLE_VIRTUAL_TERMINAL_PROCESSING,
      GetConsoleMode,
      GetConsoleScreenBufferInfo,
      GetStdHandle,
      STD_OUTPUT_HANDLE,
      SetConsoleMode,
    },
    Diagnostics::Debug::{
      EXCEPTION_POINTERS,
      LPTOP_LEVEL_EXCEPTION_FILTER,
      SetUnhandledExceptionFilter,
    },
    LibraryLoader::GetModuleFileNameW,
    ProcessStatus::{
      K32GetProcessMemoryInfo,
      PROCESS_MEMORY_COUNTERS,
    },
    SystemInformation::{
      GetSystemInfo,
      GlobalMemoryStatusEx,
      MEMORYSTATUSEX,
      SYSTEM_INFO,
    },
    Threading::GetCurrentProcess,
  },
};

use crate::{
  crash::{
    ARMED,
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

pub struct WindowsSystem {}

pub static WINDOWS_SYSTEM: WindowsSystem = WindowsSystem {};

const EXCEPTION_CONTINUE_SEARCH: i32 = 0;

/// Filter replaced by `install_crash_handler`, restored on uninstall.
static PREVIOUS_FILTER: Mutex<Option<LPTOP_LEVEL_EXCEPTION_FILTER>> = Mutex::new(None);

#[repr(C)]
#[derive(Default)]
struct CrtTm {
  tm_sec: i32,
  tm_min: i32,
  tm_hour: i32,
  tm_mday: i32,
  tm_mon: i32,
  tm_year: i32,
  tm_wday: i32,
  tm_yday: i32,
  tm_isdst: i32,
}

unsafe extern "C" {
  fn _getmaxstdio() -> i32;
  fn _localtime64_s(tm: *mut CrtTm, time: *const i64) -> i32;
}

impl WindowsSystem {
  fn check(ret: i32) -> SysResult<()> {
    if ret != 0 {
      return Ok(());
    }

    Err(SysError::last_os_error())
  }

  fn valid(handle: HANDLE) -> SysResult<HANDLE> {
    if handle.is_null() || handle == INVALID_HANDLE_VALUE {
      return Err(SysError::Unsupported);
    }

    Ok(handle)
  }
}

impl System for WindowsSystem {
  fn memory_used(&self, kind: MemoryKind) -> SysResult<usize> {
    let mut counters: PROCESS_MEMORY_COUNTERS = unsafe { mem::zeroed() };
    let size = mem::size_of::<PROCESS_MEMORY_COUNTERS>() as u32;
    counters.cb = size;
    Self::check(unsafe { K32GetProcessMemoryInfo(GetCurrentProcess(), &mut counters, size) })?;

    Ok(match kind {
      MemoryKind::Resident => counters.WorkingSetSize,
      MemoryKind::Virtual => counters.PagefileUsage,
    })
  }

  fn physical_memory(&self) -> SysResult<usize> {
    let mut status: MEMORYSTATUSEX = unsafe { mem::zeroed() };
    status.dwLength = mem::size_of::<MEMORYSTATUSEX>() as u32;
    Self::check(unsafe { GlobalMemoryStatusEx(&mut status) })?;
    Ok(usize::try_from(status.ullTotalPhys).unwrap_or(usize::MAX))
  }

  fn max_open_files(&self) -> SysResult<usize> {
    match unsafe { _getmaxstdio() } {
      n if n > 0 => Ok(n as usize),
      _ => Err(SysError::Unsupported),
    }
  }

  fn hardware_concurrency(&self) -> SysResult<usize> {
    let mut info: SYSTEM_INFO = unsafe { mem::zeroed() };
    unsafe { GetSystemInfo(&mut info) };
    match info.dwNumberOfProcessors {
      0 => Err(SysError::Unsupported),
      n => Ok(n as usize),
    }
  }

  fn program_path(&self) -> SysResult<PathBuf> {
    let mut buf = vec![0u16; 260];
    loop {
      let len = unsafe { GetModuleFileNameW(ptr::null_mut(), buf.as_mut_ptr(), buf.len() as u32) };
      match len as usize {
        0 => return Err(SysError::last_os_error()),
        n if n < buf.len() => return Ok(PathBuf::from(OsString::from_wide(&buf[..n]))),
        n if n >= 1 << 15 => return Err(SysError::InvalidArgument),
        n => buf.resize(n * 2, 0),
      }
    }
  }

  fn local_time(&self, secs: i64) -> SysResult<BrokenDownTime> {
    let mut tm = CrtTm::default();
    match unsafe { _localtime64_s(&mut tm, &secs) } {
      0 => Ok(BrokenDownTime {
        sec: tm.tm_sec,
        min: tm.tm_min,
        hour: tm.tm_hour,
        mday: tm.tm_mday,
        mon: tm.tm_mon,
        year: tm.tm_year,
        wday: tm.tm_wday,
        yday: tm.tm_yday,
        isdst: tm.tm_isdst,
      }),
      errno => Err(SysError::Os(errno)),
    }
  }

  fn is_console(&self, stream: RawStream) -> SysResult<bool> {
    let handle = Self::valid(stream as HANDLE)?;
    let mut mode = 0;
    if unsafe { GetConsoleMode(handle, &mut mode) } == 0 {
      return Ok(false);
    }
    if mode & ENABLE_VIRTUAL_TERMINAL_PROCESSING != 0 {
      return Ok(true);
    }

    Ok(unsafe { SetConsoleMode(handle, mode | ENABLE_VIRTUAL_TERMINAL_PROCESSING) } != 0)
  }

  fn terminal_size(&self) -> SysResult<(u16, u16)> {
    let handle = Self::valid(unsafe { GetStdHandle(STD_OUTPUT_HANDLE) })?;
    let mut info: CONSOLE_SCREEN_BUFFER_INFO = unsafe { mem::zeroed() };
    Self::check(unsafe { GetConsoleScreenBufferInfo(handle, &mut info) })?;

    let window = info.srWindow;
    let columns = u16::try_from(window.Right - window.Left + 1).map_err(|_| SysError::Unsupported)?;
    let rows = u16::try_from(window.Bottom - window.Top + 1).map_err(|_| SysError::Unsupported)?;
    if columns == 0 || rows == 0 {
      return Err(SysError::Unsupported);
    }

    Ok((columns, rows))
  }

  fn install_crash_handler(&self) -> SysResult<()> {
    let mut previous = PREVIOUS_FILTER.lock();
    if previous.is_none() {
      *previous = Some(unsafe { SetUnhandledExceptionFilter(Some(on_unhandled_exception)) });
    }
    Ok(())
  }

  fn uninstall_crash_handler(&self) -> SysResult<()> {
    if let Some(filter) = PREVIOUS_FILTER.lock().take() {
      unsafe { SetUnhandledExceptionFilter(filter) };
    }
    Ok(())
  }
}

// Runs on the faulting thread once no frame handled the exception; unlike a
// POSIX signal handler it may allocate.
unsafe extern "system" fn on_unhandled_exception(info: *const EXCEPTION_POINTERS) -> i32 {
  let Some(armed) = ARMED.load() else {
    return EXCEPTION_CONTINUE_SEARCH;
  };

  let code = unsafe { info.as_ref().and_then(|pointers| pointers.ExceptionRecord.as_ref()) }
    .map_or(0, |record| record.ExceptionCode as u32);
  let report = format!(
    "*** caught unhandled exception 0x{code:08x}, stack trace follows:\n{}",
    crate::trace::capture()
  );

  let _ = match &armed.sink {
    CrashSink::Stdout => io::stdout().write_all(report.as_bytes()),
    CrashSink::Stderr => io::stderr().write_all(report.as_bytes()),
    CrashSink::File(path) => OpenOptions::new()
      .create(true)
      .append(true)
      .open(path)
      .and_then(|mut file| file.write_all(report.as_bytes())),
    CrashSink::Disabled => Ok(()),
  };

  EXCEPTION_CONTINUE_SEARCH
}
