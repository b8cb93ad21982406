/// Broken-down calendar time, field for field the C `struct tm`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BrokenDownTime {
  /// Seconds after the minute, 0-60 (60 for a leap second).
  pub sec: i32,
  pub min: i32,
  pub hour: i32,
  /// Day of the month, 1-31.
  pub mday: i32,
  /// Months since January, 0-11.
  pub mon: i32,
  /// Years since 1900.
  pub year: i32,
  /// Days since Sunday, 0-6.
  pub wday: i32,
  /// Days since January 1, 0-365.
  pub yday: i32,
  /// Positive when daylight saving time is in effect, zero when not,
  /// negative when unknown.
  pub isdst: i32,
}

impl BrokenDownTime {
  pub fn full_year(&self) -> i32 {
    self.year + 1900
  }

  /// Month of the year, 1-12.
  pub fn month(&self) -> i32 {
    self.mon + 1
  }
}

#[cfg(unix)]
impl From<&libc::tm> for BrokenDownTime {
  fn from(tm: &libc::tm) -> Self {
    Self {
      sec: tm.tm_sec,
      min: tm.tm_min,
      hour: tm.tm_hour,
      mday: tm.tm_mday,
      mon: tm.tm_mon,
      year: tm.tm_year,
      wday: tm.tm_wday,
      yday: tm.tm_yday,
      isdst: tm.tm_isdst,
    }
  }
}
