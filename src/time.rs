use std::{
  thread,
  time::Duration,
};

use sysutil_sys::prelude::*;

/// Local-timezone decomposition of `secs` since the epoch. Thread-safe;
/// returns a zeroed record if the instant cannot be converted.
pub fn local_time(secs: i64) -> BrokenDownTime {
  GLOBAL_SYSTEM
    .local_time(secs)
    .or_sentinel("local_time", BrokenDownTime::default())
}

/// Caller-owned form of [`local_time`]: fills `converted`, zeroing it on
/// failure.
pub fn get_local_time(time: &i64, converted: &mut BrokenDownTime) {
  *converted = local_time(*time);
}

/// Blocks for at least `useconds` microseconds, resuming after signal
/// interruptions. Zero only yields to the scheduler.
pub fn usleep(useconds: u64) {
  if useconds == 0 {
    thread::yield_now();
    return;
  }

  thread::sleep(Duration::from_micros(useconds));
}
