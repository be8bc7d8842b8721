//
// Errors
//
use std::io;
use std::result;
use std::error;
use std::num;
use std::fmt;
use std::path::PathBuf;

/// Type alias for corpus statistics errors
pub type Result<X> = result::Result<X, Error>;

/// Wrapper for many kinds of errors occuring while reading the corpus
#[derive(Debug)]
pub enum Error {
    IOError(io::Error),
    ParseIntError(num::ParseIntError),
    /// A document's text or markup file could not be opened
    MissingFile(&'static str, PathBuf, io::Error),
    /// Signal.xml is not well formed at the given byte offset
    MalformedMarkup { path: PathBuf, offset: usize, info: String },
    /// A segment element lacks one of start, end or features
    MissingAttribute { path: PathBuf, attribute: &'static str },
    /// Two segments share a span but cover different text.
    ///
    /// This is a data integrity failure in the corpus, not something to recover from.
    InconsistentRelation { document: String, start: i64, end: i64, relations: Vec<String> },
    Other(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::IOError(ref err) => write!(f, "IO error: {}", err),
            Error::ParseIntError(ref err) => write!(f, "Error parsing segment offset: {}", err),
            Error::MissingFile(info, ref path, ref err) => {
                write!(f,
                    "The {} must exist at {} but there was a problem opening it. \
                    Wrong root folder? The OS error was: {}",
                    info, path.display(), err)
            },
            Error::MalformedMarkup { ref path, offset, ref info } => {
                write!(f, "Malformed markup in {} at byte {}: {}", path.display(), offset, info)
            },
            Error::MissingAttribute { ref path, attribute } => {
                write!(f, "A segment in {} has no '{}' attribute", path.display(), attribute)
            },
            Error::InconsistentRelation { ref document, start, end, ref relations } => {
                write!(f,
                    "Span {}..{} of {} is annotated with different relations: {:?}",
                    start, end, document, relations)
            },
            Error::Other(ref info) => write!(f, "{}", info),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::IOError(ref err) => Some(err),
            Error::ParseIntError(ref err) => Some(err),
            Error::MissingFile(_, _, ref err) => Some(err),
            Error::MalformedMarkup { .. } => None,
            Error::MissingAttribute { .. } => None,
            Error::InconsistentRelation { .. } => None,
            Error::Other(_) => None,
        }
    }
}
//
// Convert everything else into Error
//
impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::IOError(err)
    }
}
impl From<num::ParseIntError> for Error {
    fn from(err: num::ParseIntError) -> Self {
        Error::ParseIntError(err)
    }
}

//
// Convert Error into a general io Error
//
impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        io::Error::new(io::ErrorKind::Other, err)
    }
}
