use std::{
  any::Any,
  fmt::Write as _,
  io::Write,
};

#[cfg(unix)]
use std::os::fd::{
  AsFd,
  AsRawFd,
};
#[cfg(windows)]
use std::os::windows::io::{
  AsHandle,
  AsRawHandle,
};

use getset::CopyGetters;
use sysutil_sys::prelude::*;

use crate::style::Style;

const CSI: &str = "\x1b[";

/// Decides whether ANSI escapes should reach an output and assembles them.
///
/// A `Term` is fixed at construction: a console stays a console even if the
/// underlying handle is later redirected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, CopyGetters)]
pub struct Term {
  /// True when escapes are emitted.
  #[getset(get_copy = "pub")]
  is_console: bool,
}

impl Default for Term {
  /// Assumes a live ANSI console.
  fn default() -> Self {
    Self { is_console: true }
  }
}

macro_rules! recover_handle {
  ($any:expr, $classify:path, $($ty:ty),+ $(,)?) => {
    $(
      if let Some(stream) = $any.downcast_ref::<$ty>() {
        return Some($classify(stream));
      }
    )+
  };
}

impl Term {
  pub const fn forced(is_console: bool) -> Self {
    Self { is_console }
  }

  /// Classifies `fd`; a handle the OS cannot classify is not a console.
  #[cfg(unix)]
  pub fn from_fd(fd: impl AsFd) -> Self {
    Self::classify(fd.as_fd().as_raw_fd())
  }

  /// Classifies `handle`, enabling virtual-terminal processing on consoles that
  /// support it.
  #[cfg(windows)]
  pub fn from_handle(handle: impl AsHandle) -> Self {
    Self::classify(handle.as_handle().as_raw_handle())
  }

  /// Classifies the OS handle behind `stream` when it can be recovered: the
  /// standard streams, their locks, and files. Any other writer is assumed
  /// to be a console.
  pub fn for_stream<W: Write + Any>(stream: &W) -> Self {
    Self::recover(stream).unwrap_or_default()
  }

  pub fn stdout() -> Self {
    Self::for_stream(&std::io::stdout())
  }

  pub fn stderr() -> Self {
    Self::for_stream(&std::io::stderr())
  }

  fn classify(stream: RawStream) -> Self {
    Self {
      is_console: GLOBAL_SYSTEM
        .is_console(stream)
        .or_sentinel("is_console", false),
    }
  }

  #[cfg(unix)]
  fn recover(any: &dyn Any) -> Option<Self> {
    use std::{
      fs::File,
      io::{
        Stderr,
        StderrLock,
        Stdout,
        StdoutLock,
      },
    };

    recover_handle!(any, Self::from_fd, Stdout, Stderr, StdoutLock<'static>, StderrLock<'static>, File);
    None
  }

  #[cfg(windows)]
  fn recover(any: &dyn Any) -> Option<Self> {
    use std::{
      fs::File,
      io::{
        Stderr,
        StderrLock,
        Stdout,
        StdoutLock,
      },
    };

    recover_handle!(any, Self::from_handle, Stdout, Stderr, StdoutLock<'static>, StderrLock<'static>, File);
    None
  }

  #[cfg(not(any(unix, windows)))]
  fn recover(any: &dyn Any) -> Option<Self> {
    _ = any;
    None
  }

  /// The escape sequence for a comma-separated style command such as
  /// `"bold,green,white_bg"`. Unknown tokens are skipped; a command with no
  /// known token yields no sequence. Empty unless this is a console.
  pub fn ansi(&self, command: &str) -> String {
    if !self.is_console {
      return String::new();
    }

    let mut out = String::new();
    for (index, style) in Style::parse_command(command).enumerate() {
      out.push_str(if index == 0 { CSI } else { ";" });
      let _ = write!(out, "{}", style.sgr());
    }
    if !out.is_empty() {
      out.push('m');
    }
    out
  }

  /// `text` wrapped in the `command` styling and a trailing reset. On a
  /// non-console this is exactly `text`.
  pub fn ansi_text(&self, command: &str, text: &str) -> String {
    let mut out = self.ansi(command);
    out.push_str(text);
    out.push_str(&self.ansi("default"));
    out
  }

  /// 24-bit foreground color; channels are clamped to 0-255.
  pub fn ansi_fgcolor(&self, r: i32, g: i32, b: i32) -> String {
    self.truecolor(38, r, g, b)
  }

  /// 24-bit background color; channels are clamped to 0-255.
  pub fn ansi_bgcolor(&self, r: i32, g: i32, b: i32) -> String {
    self.truecolor(48, r, g, b)
  }

  fn truecolor(&self, selector: u8, r: i32, g: i32, b: i32) -> String {
    if !self.is_console {
      return String::new();
    }

    let [r, g, b] = [r, g, b].map(|channel| channel.clamp(0, 255));
    format!("{CSI}{selector};2;{r};{g};{b}m")
  }
}
