use thiserror::Error;

/// Errors raised while reading a Newick string
#[derive(Debug, Error, PartialEq)]
pub enum NewickError {
    #[error("empty newick string")]
    Empty,
    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEnd { expected: &'static str },
    #[error("invalid number \"{value}\" at position {pos}")]
    InvalidNumber { value: String, pos: usize },
}
