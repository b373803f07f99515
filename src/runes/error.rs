use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    EmptyInput,
    EmptyName,
    EmptyPoints,
    EmptyPoint { index: usize },
    MissingCoordinate { index: usize, coord: usize },
    ExtraCoordinate { index: usize },
    InvalidNumber { index: usize, coord: usize, value: String },
    InvalidStrokeId { index: usize, value: String },
    DecreasingStrokeId { index: usize },
    UnsupportedSchema { version: u32 },
    Json(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind) -> Self {
        Self { kind }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            ParseErrorKind::UnsupportedSchema { version } => {
                write!(f, "unsupported template schema version {version}")
            }
            ParseErrorKind::Json(msg) => write!(f, "malformed template: {msg}"),
            kind => write!(f, "{kind:?}"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Errors raised by capture, template storage and classification.
#[derive(Debug)]
pub enum RuneError {
    /// Empty candidate, empty template set or an otherwise unusable argument.
    InvalidArgument(String),
    Parse {
        path: Option<PathBuf>,
        error: ParseError,
    },
    NotFound {
        path: PathBuf,
    },
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Stroke API misuse or a second recognition while one is pending.
    InvalidState(String),
}

impl RuneError {
    pub fn parse_at(path: impl Into<PathBuf>, kind: ParseErrorKind) -> Self {
        RuneError::Parse {
            path: Some(path.into()),
            error: ParseError::new(kind),
        }
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, RuneError::InvalidArgument(_))
    }

    pub fn is_invalid_state(&self) -> bool {
        matches!(self, RuneError::InvalidState(_))
    }
}

impl std::fmt::Display for RuneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuneError::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            RuneError::Parse {
                path: Some(path),
                error,
            } => write!(f, "{}: {error}", path.display()),
            RuneError::Parse { path: None, error } => write!(f, "{error}"),
            RuneError::NotFound { path } => write!(f, "{} not found", path.display()),
            RuneError::Io { path, source } => write!(f, "{}: {source}", path.display()),
            RuneError::InvalidState(msg) => write!(f, "invalid state: {msg}"),
        }
    }
}

impl std::error::Error for RuneError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RuneError::Parse { error, .. } => Some(error),
            RuneError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ParseError> for RuneError {
    fn from(error: ParseError) -> Self {
        RuneError::Parse { path: None, error }
    }
}

pub type RuneResult<T> = Result<T, RuneError>;
