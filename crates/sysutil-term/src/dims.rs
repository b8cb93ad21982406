use sysutil_sys::prelude::*;

pub const DEFAULT_COLUMNS: u16 = 80;
pub const DEFAULT_ROWS: u16 = 24;

/// `(columns, rows)` of the terminal on standard output, or
/// `(DEFAULT_COLUMNS, DEFAULT_ROWS)` when there is none. Never cached, so a
/// resize shows up on the next call.
pub fn terminal_size() -> (u16, u16) {
  GLOBAL_SYSTEM
    .terminal_size()
    .or_sentinel("terminal_size", (DEFAULT_COLUMNS, DEFAULT_ROWS))
}

pub fn terminal_columns() -> u16 {
  terminal_size().0
}

pub fn terminal_rows() -> u16 {
  terminal_size().1
}
