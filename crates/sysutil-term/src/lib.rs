pub mod dims;
pub mod style;
pub mod term;

pub use dims::{
  DEFAULT_COLUMNS,
  DEFAULT_ROWS,
  terminal_columns,
  terminal_rows,
  terminal_size,
};
pub use style::{
  Color,
  Style,
};
pub use term::Term;

pub mod prelude {
  pub use super::{
    Color,
    Style,
    Term,
    terminal_columns,
    terminal_rows,
    terminal_size,
  };
}

#[cfg(test)]
mod tests;
