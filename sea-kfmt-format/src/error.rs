use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
/// Errors that may happen when compiling a format string. None of them are recoverable:
/// a template either compiles entirely or not at all.
pub enum CompileErr {
    #[error("Unterminated escape: the format ends with a lone `\\`")]
    UnterminatedEscape,
    #[error("Unknown escape sequence `\\{0}`")]
    UnknownEscape(char),
    #[error("Malformed escape `\\x{0}`: expected two hex digits")]
    MalformedEscape(String),
    #[error("Incomplete percent escape: the format ends with a lone `%`")]
    IncompleteDirective,
    #[error("Unknown percent escape sequence `%{0}`")]
    UnknownDirective(char),
    #[error("Unknown time qualifier `{0}`")]
    UnknownTimeQualifier(String),
    #[error("Missing closing brace after `%T{{strftime...`")]
    MissingClosingBrace,
    #[error("Unmatched delimiter: expected `{0}`")]
    UnmatchedDelimiter(String),
    #[error("Empty delimited text")]
    EmptyDelimited,
    #[error("Invalid strftime pattern `{0}`")]
    InvalidTimeFormat(String),
    #[error("Directive `%{0}` is not supported for input")]
    UnsupportedInputDirective(char),
    #[error("Ambiguous adjacent fields: `%{0}` must be followed by a separating literal")]
    AmbiguousFields(char),
}

#[derive(Error, Debug)]
/// Errors that may happen when rendering a record.
pub enum RenderErr {
    #[error("IoError: {0}")]
    Io(#[from] std::io::Error),
    #[error("Timestamp out of range: {0}ms")]
    TimestampOutOfRange(i64),
    #[error("Failed to format timestamp with `{0}`")]
    TimeFormat(String),
}

#[derive(Error, Debug)]
/// Errors that may happen when emitting a rendered record to the sink.
pub enum EmitErr {
    #[error("RenderErr: {0}")]
    Render(#[from] RenderErr),
    #[error("IoError: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
/// Errors that may happen when driving a record stream.
pub enum DriveErr<E: std::error::Error> {
    #[error("EmitErr: {0}")]
    Emit(#[from] EmitErr),
    #[error("Source error: {0}")]
    Source(E),
}

#[derive(Error, Debug)]
/// Errors that may happen when reading records with an input format.
pub enum ReadErr {
    #[error("IoError: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unexpected end of input in the middle of a record")]
    UnexpectedEof,
    #[error("Expected literal `{}`, found `{}`", .expected.escape_ascii(), .found.escape_ascii())]
    LiteralMismatch { expected: Vec<u8>, found: Vec<u8> },
    #[error("Invalid number `{0}`")]
    InvalidNumber(String),
    #[error("Topic is not valid UTF-8: `{0}`")]
    InvalidTopic(String),
}
