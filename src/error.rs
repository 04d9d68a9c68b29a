use thiserror::Error;


/// The reason a template source is ill-formed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,

    #[error("unexpected end of section {0}")]
    UnexpectedEndOfSection(String),

    #[error("missing delimiter")]
    MissingDelimiter,

    #[error("missing tag")]
    MissingTag,

    #[error("invalid delimiters section {0}")]
    InvalidDelimiters(String),
}

/// Error raised when compiling an ill-formed template.
///
/// `offset` is the byte position in the source where the problem was found.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("ill-formed template at offset {offset}: {kind}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub offset: usize,
}

impl ParseError {
    pub(crate) fn new(kind: ParseErrorKind, offset: usize) -> Self {
        ParseError { kind, offset }
    }
}
