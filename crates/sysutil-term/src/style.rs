/// The eight base terminal colors, in SGR order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
  Black,
  Red,
  Green,
  Yellow,
  Blue,
  Magenta,
  Cyan,
  White,
}

impl Color {
  pub const ALL: [Color; 8] = [
    Color::Black,
    Color::Red,
    Color::Green,
    Color::Yellow,
    Color::Blue,
    Color::Magenta,
    Color::Cyan,
    Color::White,
  ];

  pub const fn name(self) -> &'static str {
    match self {
      Color::Black => "black",
      Color::Red => "red",
      Color::Green => "green",
      Color::Yellow => "yellow",
      Color::Blue => "blue",
      Color::Magenta => "magenta",
      Color::Cyan => "cyan",
      Color::White => "white",
    }
  }

  pub fn from_name(name: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|color| color.name() == name)
  }

  const fn offset(self) -> u8 {
    self as u8
  }
}

/// One token of the `ansi()` command vocabulary. The set is closed: tokens
/// outside it have no `Style`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Style {
  /// Resets every attribute.
  Default,
  Bold,
  Underscore,
  Blink,
  Reverse,
  Concealed,
  Foreground(Color),
  Background(Color),
}

impl Style {
  /// Parses a single token such as `bold`, `red`, or `red_bg`. Matching is
  /// case-sensitive.
  pub fn from_token(token: &str) -> Option<Self> {
    let style = match token {
      "default" => Style::Default,
      "bold" => Style::Bold,
      "underscore" => Style::Underscore,
      "blink" => Style::Blink,
      "reverse" => Style::Reverse,
      "concealed" => Style::Concealed,
      _ => match token.strip_suffix("_bg") {
        Some(name) => Style::Background(Color::from_name(name)?),
        None => Style::Foreground(Color::from_name(token)?),
      },
    };
    Some(style)
  }

  /// The SGR parameter selecting this style.
  pub const fn sgr(self) -> u8 {
    match self {
      Style::Default => 0,
      Style::Bold => 1,
      Style::Underscore => 4,
      Style::Blink => 5,
      Style::Reverse => 7,
      Style::Concealed => 8,
      Style::Foreground(color) => 30 + color.offset(),
      Style::Background(color) => 40 + color.offset(),
    }
  }

  /// Styles named by a comma-separated command, skipping unknown tokens and
  /// whitespace around the commas.
  pub fn parse_command(command: &str) -> impl Iterator<Item = Style> + '_ {
    command
      .split(',')
      .map(str::trim)
      .filter_map(Style::from_token)
  }
}
