use rand::Rng;

use crate::{
  DEFAULT_COLUMNS,
  DEFAULT_ROWS,
  Term,
  terminal_columns,
  terminal_rows,
  terminal_size,
};

const RESET: &str = "\x1b[0m";

const TOKENS: [&str; 22] = [
  "default", "bold", "underscore", "blink", "reverse", "concealed", "black", "red", "green",
  "yellow", "blue", "magenta", "cyan", "white", "black_bg", "red_bg", "green_bg", "yellow_bg",
  "blue_bg", "magenta_bg", "cyan_bg", "white_bg",
];

#[test]
fn default_assumes_console() {
  assert!(Term::default().is_console());
}

#[test]
fn composes_multiple_styles() {
  let term = Term::forced(true);
  assert_eq!(term.ansi("bold,red"), "\x1b[1;31m");
  assert_eq!(term.ansi_text("bold,red", "hi"), "\x1b[1;31mhi\x1b[0m");
  assert_eq!(term.ansi("bold,green,white_bg"), "\x1b[1;32;47m");
}

#[test]
fn tolerates_whitespace_and_unknown_tokens() {
  let term = Term::forced(true);
  assert_eq!(term.ansi(" bold , sparkly, red "), "\x1b[1;31m");
  assert_eq!(term.ansi("sparkly"), "");
  assert_eq!(term.ansi(""), "");
}

#[test]
fn every_token_wraps_with_reset() {
  let term = Term::forced(true);
  for token in TOKENS {
    let styled = term.ansi_text(token, "text");
    assert!(styled.ends_with(RESET), "{token}");
    assert!(styled.starts_with("\x1b["), "{token}");
  }
}

#[test]
fn non_console_suppresses_everything() {
  let term = Term::forced(false);
  for token in TOKENS {
    assert_eq!(term.ansi(token), "");
    assert_eq!(term.ansi_text(token, "text"), "text");
  }
  assert_eq!(term.ansi_fgcolor(1, 2, 3), "");
  assert_eq!(term.ansi_bgcolor(1, 2, 3), "");
}

#[test]
fn truecolor_matches_sgr_layout() {
  let term = Term::forced(true);
  let mut rng = rand::rng();
  for _ in 0..256 {
    let (r, g, b) = (
      rng.random_range(0..=255),
      rng.random_range(0..=255),
      rng.random_range(0..=255),
    );
    assert_eq!(term.ansi_fgcolor(r, g, b), format!("\x1b[38;2;{r};{g};{b}m"));
    assert_eq!(term.ansi_bgcolor(r, g, b), format!("\x1b[48;2;{r};{g};{b}m"));
  }
}

#[test]
fn truecolor_clamps_channels() {
  let term = Term::forced(true);
  assert_eq!(term.ansi_fgcolor(-5, 300, 128), "\x1b[38;2;0;255;128m");
  assert_eq!(term.ansi_bgcolor(256, -1, 0), "\x1b[48;2;255;0;0m");
}

#[test]
fn regular_file_is_not_console() {
  let file = tempfile::tempfile().unwrap();
  let term = Term::for_stream(&file);
  assert!(!term.is_console());
  assert_eq!(term.ansi_text("bold,red", "hi"), "hi");
  assert_eq!(Term::for_stream(&file), term, "Probing is repeatable");
}

#[cfg(unix)]
#[test]
fn from_fd_matches_for_stream() {
  let file = tempfile::tempfile().unwrap();
  assert_eq!(Term::from_fd(&file), Term::for_stream(&file));
}

#[test]
fn unrecoverable_stream_assumes_console() {
  let buffer: Vec<u8> = Vec::new();
  assert!(Term::for_stream(&buffer).is_console());
}

#[test]
fn standard_stream_terms_are_stable() {
  assert_eq!(Term::stdout(), Term::stdout());
  assert_eq!(Term::stderr(), Term::stderr());
}

#[test]
fn terminal_dimensions_agree() {
  let (columns, rows) = terminal_size();
  assert!(columns > 0 && rows > 0);
  assert_eq!(terminal_columns(), columns);
  assert_eq!(terminal_rows(), rows);
}

const CHILD_ENV: &str = "SYSUTIL_TERM_REPORT_SIZE";

// Runs only when re-executed by `redirected_stdout_uses_defaults`.
#[test]
fn report_terminal_size() {
  if std::env::var_os(CHILD_ENV).is_none() {
    return;
  }
  eprintln!("size={}x{}", terminal_columns(), terminal_rows());
}

#[cfg(any(unix, windows))]
#[test]
fn redirected_stdout_uses_defaults() {
  use std::process::{
    Command,
    Stdio,
  };

  let output = Command::new(std::env::current_exe().unwrap())
    .args(["--exact", "tests::report_terminal_size", "--nocapture", "--test-threads=1"])
    .env(CHILD_ENV, "1")
    .stdin(Stdio::null())
    .stdout(Stdio::null())
    .stderr(Stdio::piped())
    .output()
    .unwrap();

  assert!(output.status.success());
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(
    stderr.contains(&format!("size={DEFAULT_COLUMNS}x{DEFAULT_ROWS}")),
    "{stderr}"
  );
}
