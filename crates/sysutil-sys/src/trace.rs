use std::fmt::Write;

/// Symbols belonging to the capture machinery itself, dropped from the top
/// of every trace.
const MACHINERY: &[&str] = &[
  "std::backtrace::",
  "std::backtrace_rs::",
  "backtrace::",
  "sysutil_sys::trace::capture",
];

#[derive(Debug, PartialEq, Eq)]
struct Frame<'a> {
  symbol: &'a str,
  location: Option<&'a str>,
}

/// A readable trace of the calling thread, innermost frame first, one frame
/// per line. Empty when capture is unsupported.
pub fn capture() -> String {
  capture_after(&[])
}

/// Like [`capture`], also dropping leading frames whose symbol starts with
/// one of `callers`, so wrappers can hide themselves.
#[cfg(feature = "stacktrace")]
pub fn capture_after(callers: &[&str]) -> String {
  use std::backtrace::{
    Backtrace,
    BacktraceStatus,
  };

  let trace = Backtrace::force_capture();
  if trace.status() != BacktraceStatus::Captured {
    return String::new();
  }
  render(&trace.to_string(), callers)
}

#[cfg(not(feature = "stacktrace"))]
pub fn capture_after(callers: &[&str]) -> String {
  _ = callers;
  String::new()
}

fn parse(raw: &str) -> Vec<Frame<'_>> {
  let mut frames: Vec<Frame<'_>> = Vec::new();
  for line in raw.lines().map(str::trim).filter(|line| !line.is_empty()) {
    if let Some(location) = line.strip_prefix("at ") {
      if let Some(last) = frames.last_mut() {
        last.location = Some(location);
      }
      continue;
    }
    if line.starts_with("note:") {
      continue;
    }

    // "12: symbol" opens a frame; a bare symbol is an inlined frame.
    let symbol = match line.split_once(": ") {
      Some((index, symbol)) if index.bytes().all(|b| b.is_ascii_digit()) => symbol,
      _ => line,
    };
    frames.push(Frame {
      symbol,
      location: None,
    });
  }
  frames
}

fn render(raw: &str, callers: &[&str]) -> String {
  let hidden = |frame: &Frame<'_>| {
    MACHINERY
      .iter()
      .chain(callers)
      .any(|prefix| frame.symbol.starts_with(prefix))
  };

  let mut out = String::new();
  let frames = parse(raw);
  for (index, frame) in frames.iter().skip_while(|f| hidden(f)).enumerate() {
    let _ = match frame.location {
      Some(location) => writeln!(out, "{index:>4}: {} at {location}", frame.symbol),
      None => writeln!(out, "{index:>4}: {}", frame.symbol),
    };
  }
  out
}
