use sysutil_sys::prelude::*;

/// Bytes of memory this process is using: the resident set by default, or
/// the whole virtual arena, which counts reserved but untouched pages such
/// as per-thread malloc arenas. `0` if unknown.
pub fn memory_used(kind: MemoryKind) -> usize {
  GLOBAL_SYSTEM.memory_used(kind).or_sentinel("memory_used", 0)
}

/// Installed physical RAM in bytes, regardless of process or container
/// limits. `0` if unknown.
pub fn physical_memory() -> usize {
  GLOBAL_SYSTEM
    .physical_memory()
    .or_sentinel("physical_memory", 0)
}

/// Soft limit on open file handles, `usize::MAX` if unlimited, `0` if
/// unknown.
pub fn max_open_files() -> usize {
  GLOBAL_SYSTEM.max_open_files().or_sentinel("max_open_files", 0)
}

/// Logical cores, hyperthreads included. Always at least 1.
pub fn hardware_concurrency() -> usize {
  GLOBAL_SYSTEM
    .hardware_concurrency()
    .or_else(|_| std::thread::available_parallelism().map(usize::from))
    .map_or(1, |n| n.max(1))
}

#[deprecated(note = "unreliable, use hardware_concurrency()")]
pub fn physical_concurrency() -> usize {
  hardware_concurrency()
}
