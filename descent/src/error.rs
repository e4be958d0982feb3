use std::error;
use std::fmt::{self, Display};

pub type Result<T> = std::result::Result<T, Error>;

/// Errors signalling a broken grammar rather than input that doesn't match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A named reference to a rule that was never registered.
    UnknownRule(String),
    /// Parsing was attempted without a root rule or a definition to build one.
    MissingRoot,
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::UnknownRule(ref name) => write!(f, "no rule named '{}'", name),
            Error::MissingRoot => write!(f, "no root rule defined"),
        }
    }
}

impl error::Error for Error {}
