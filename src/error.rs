use std::fmt;

/// Byte range in the input that a parse diagnostic points at.
///
/// Offsets are 0-indexed and half-open, matching string slicing; rendering
/// is 1-indexed for humans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// First byte of the offending slice
    pub start: usize,
    /// One past its last byte
    pub end: usize,
}

impl Span {
    /// Span covering `start..end`.
    pub fn new(start: usize, end: usize) -> Span {
        Span { start, end }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.end > self.start + 1 {
            write!(f, "bytes {}-{}", self.start + 1, self.end)
        } else {
            write!(f, "byte {}", self.start + 1)
        }
    }
}

/// Errors surfaced by parsing and by a bounded search.
///
/// Parse errors are fatal to the call that hit them. Numeric anomalies never
/// appear here; the search absorbs them as infinite fitness.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    EmptyExpression,
    /// A numeric literal the lexer matched but could not convert
    InvalidNumber {
        value: String,
        span: Option<Span>,
    },
    /// A character outside the grammar
    InvalidToken {
        token: String,
        span: Option<Span>,
    },
    UnexpectedToken {
        expected: String,
        got: String,
        span: Option<Span>,
    },
    UnexpectedEndOfInput,
    /// A bounded search ran out of seeds before an exact match appeared
    SeedLimitReached {
        seeds: u64,
    },
}

impl Error {
    /// A number literal that failed conversion, located at `span`
    pub fn invalid_number_at(value: impl Into<String>, span: Span) -> Self {
        Error::InvalidNumber {
            value: value.into(),
            span: Some(span),
        }
    }

    /// A character the grammar has no use for, located at `span`
    pub fn invalid_token_at(token: impl Into<String>, span: Span) -> Self {
        Error::InvalidToken {
            token: token.into(),
            span: Some(span),
        }
    }

    /// The parser wanted one thing and saw another
    pub fn unexpected_token(expected: impl Into<String>, got: impl Into<String>) -> Self {
        Error::UnexpectedToken {
            expected: expected.into(),
            got: got.into(),
            span: None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::EmptyExpression => write!(f, "empty expression"),
            Error::InvalidNumber { value, span } => {
                write!(f, "malformed number '{}'", value)?;
                write_span(f, span)
            }
            Error::InvalidToken { token, span } => {
                write!(f, "unrecognized token '{}'", token)?;
                write_span(f, span)
            }
            Error::UnexpectedToken {
                expected,
                got,
                span,
            } => {
                write!(f, "expected {} but found '{}'", expected, got)?;
                write_span(f, span)
            }
            Error::UnexpectedEndOfInput => {
                write!(f, "input ended before the expression was complete")
            }
            Error::SeedLimitReached { seeds } => {
                write!(f, "no antiderivative found within {} search seeds", seeds)
            }
        }
    }
}

fn write_span(f: &mut fmt::Formatter<'_>, span: &Option<Span>) -> fmt::Result {
    match span {
        Some(span) => write!(f, " at {}", span),
        None => Ok(()),
    }
}

impl std::error::Error for Error {}
