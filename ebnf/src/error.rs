use std::error;
use std::fmt::{self, Display};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    ParseError(String),
    /// A grammar with no productions has no start rule.
    EmptyGrammar,
    Install(descent::Error),
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::ParseError(ref s) => write!(f, "failed to parse: {}", s),
            Error::EmptyGrammar => write!(f, "grammar has no productions"),
            Error::Install(ref err) => write!(f, "failed to install grammar: {}", err),
        }
    }
}

impl error::Error for Error {}

impl From<nom::Err<nom::error::Error<&str>>> for Error {
    fn from(err: nom::Err<nom::error::Error<&str>>) -> Error {
        match err {
            nom::Err::Error(e) | nom::Err::Failure(e) => {
                let near: String = e.input.chars().take(20).collect();
                Error::ParseError(format!("{:?} near {:?}", e.code, near))
            }
            nom::Err::Incomplete(_) => Error::ParseError("unexpected end of input".to_owned()),
        }
    }
}

impl From<descent::Error> for Error {
    fn from(err: descent::Error) -> Error {
        Error::Install(err)
    }
}
