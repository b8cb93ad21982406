use core::sync::atomic::{
  AtomicUsize,
  Ordering,
};

const COMMON_PAGE_SIZE: usize = 4096;

#[cfg(unix)]
fn page_size_helper() -> usize {
  match unsafe { libc::sysconf(libc::_SC_PAGESIZE) } {
    n if n > 0 => n as usize,
    _ => COMMON_PAGE_SIZE,
  }
}

#[cfg(windows)]
fn page_size_helper() -> usize {
  use windows_sys::Win32::System::SystemInformation::{
    GetSystemInfo,
    SYSTEM_INFO,
  };

  let mut info: SYSTEM_INFO = unsafe { core::mem::zeroed() };
  unsafe { GetSystemInfo(&mut info) };
  match info.dwPageSize {
    0 => COMMON_PAGE_SIZE,
    n => n as usize,
  }
}

#[cfg(not(any(unix, windows)))]
fn page_size_helper() -> usize {
  COMMON_PAGE_SIZE
}

/// Size of a virtual memory page, queried once.
pub fn page_size() -> usize {
  static PAGE_SIZE: AtomicUsize = AtomicUsize::new(0);

  match PAGE_SIZE.load(Ordering::Acquire) {
    0 => {
      let size = page_size_helper();
      PAGE_SIZE.store(size, Ordering::Release);
      size
    }
    size => size,
  }
}

/// Multiplies a page count by the page size, saturating instead of wrapping.
pub fn pages_to_bytes(pages: usize) -> usize {
  pages.saturating_mul(page_size())
}
