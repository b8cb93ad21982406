pub mod published;

pub use published::{
  Next,
  Published,
};
