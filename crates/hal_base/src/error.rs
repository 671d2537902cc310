use std::error::Error as StdError;
use std::fmt;
use std::path::PathBuf;

use tracing_error::{SpanTrace, SpanTraceStatus};

/* 📖 # Why a custom error type and not anyhow/thiserror?

- Callers can match on ErrorKind to tell an encoding failure from a bad URL
- Context and causes render as a tree in Debug output, which keeps CLI errors readable
- The span trace records which document operation was running when the error happened
 */

/// Error variants that can occur while building or rendering HAL documents.
#[derive(Debug)]
pub enum ErrorKind {
    /// File system operation failed
    FileError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A value could not be represented as JSON
    Encoding { source: serde_json::Error },

    /// A base URL or href could not be parsed or joined
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },

    /// Catch-all for other errors with a message
    Message { message: String },
}

/// Error wrapping an [`ErrorKind`] with context, an optional cause and the
/// span trace active at creation time.
pub struct HalError {
    kind: ErrorKind,
    context: Vec<String>,
    cause: Option<Box<HalError>>,
    span_trace: SpanTrace,
}

impl HalError {
    /// Creates a new error from an ErrorKind, capturing the current span trace.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: vec![],
            cause: None,
            span_trace: SpanTrace::capture(),
        }
    }

    /// Shorthand for an [`ErrorKind::Message`] error.
    pub fn message(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Message {
            message: message.into(),
        })
    }

    /// Attaches context to an error.
    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Attaches context using lazy evaluation.
    pub fn with_context<F>(mut self, f: F) -> Self
    where
        F: FnOnce() -> String,
    {
        self.context.push(f());
        self
    }

    /// Records the error that led to this one.
    pub fn caused_by(mut self, cause: impl Into<Box<HalError>>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    /// Returns a reference to the underlying ErrorKind.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Returns the attached context, outermost last.
    pub fn get_context(&self) -> &[String] {
        &self.context
    }

    /// Returns the cause recorded with [`HalError::caused_by`], if any.
    pub fn cause(&self) -> Option<&HalError> {
        self.cause.as_deref()
    }

    /// Returns the span trace captured when the error was created.
    pub fn span_trace(&self) -> &SpanTrace {
        &self.span_trace
    }

    /// Returns the innermost error in the chain.
    pub fn root_cause(&self) -> &(dyn StdError + 'static) {
        let mut current: &(dyn StdError + 'static) = self;
        while let Some(next) = current.source() {
            current = next;
        }
        current
    }

    fn kind_message(&self) -> String {
        match &self.kind {
            ErrorKind::FileError { path, source } => {
                format!("File error at {}: {}", path.display(), source)
            }
            ErrorKind::Encoding { source } => format!("JSON encoding failed: {}", source),
            ErrorKind::InvalidUrl { url, source } => format!("Invalid URL '{}': {}", url, source),
            ErrorKind::Message { message } => message.clone(),
        }
    }

    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>, indent: &str) -> fmt::Result {
        writeln!(f, "{}", self.kind_message())?;
        let item_count = self.context.len() + usize::from(self.cause.is_some());
        for (i, ctx) in self.context.iter().enumerate() {
            let branch = if i + 1 == item_count { "└─" } else { "├─" };
            writeln!(f, "{}{} {}", indent, branch, ctx)?;
        }
        if let Some(cause) = &self.cause {
            write!(f, "{}└─ cause: ", indent)?;
            cause.fmt_tree(f, &format!("{}   ", indent))?;
        }
        Ok(())
    }
}

impl From<ErrorKind> for HalError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl From<ErrorKind> for Box<HalError> {
    fn from(kind: ErrorKind) -> Self {
        Box::new(HalError::new(kind))
    }
}

impl From<serde_json::Error> for Box<HalError> {
    fn from(source: serde_json::Error) -> Self {
        ErrorKind::Encoding { source }.into()
    }
}

impl StdError for HalError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match &self.kind {
            ErrorKind::FileError { source, .. } => Some(source),
            ErrorKind::Encoding { source } => Some(source),
            ErrorKind::InvalidUrl { source, .. } => Some(source),
            ErrorKind::Message { .. } => self
                .cause
                .as_deref()
                .map(|cause| cause as &(dyn StdError + 'static)),
        }
    }
}

impl fmt::Display for HalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ctx in &self.context {
            write!(f, "{}: ", ctx)?;
        }
        write!(f, "{}", self.kind_message())?;
        if let Some(cause) = &self.cause {
            write!(f, " (caused by: {})", cause)?;
        }
        Ok(())
    }
}

/* 📖 # Why a hand-written Debug impl?
`fn main() -> Result<..>` and `unwrap()` print errors with Debug. The derived
output would dump the raw struct; the tree below shows message, context, causes
and the span trace in the order a reader needs them.
*/

impl fmt::Debug for HalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_tree(f, "")?;
        if self.span_trace.status() == SpanTraceStatus::CAPTURED {
            writeln!(f, "Trace: {}", self.span_trace)?;
        }
        Ok(())
    }
}

/// Standard result type for HAL operations.
pub type HalResult<T> = std::result::Result<T, Box<HalError>>;

/// Extension trait for attaching context to Results.
pub trait ResultExt<T> {
    /// Attaches context to an error, consuming and re-wrapping it.
    fn context(self, context: impl Into<String>) -> HalResult<T>;

    /// Attaches context using lazy evaluation.
    fn with_context<F>(self, f: F) -> HalResult<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for HalResult<T> {
    fn context(self, context: impl Into<String>) -> HalResult<T> {
        self.map_err(|err| Box::new(err.context(context)))
    }

    fn with_context<F>(self, f: F) -> HalResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|err| Box::new(err.with_context(f)))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, serde_json::Error> {
    fn context(self, context: impl Into<String>) -> HalResult<T> {
        self.map_err(Box::<HalError>::from).context(context)
    }

    fn with_context<F>(self, f: F) -> HalResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(Box::<HalError>::from).with_context(f)
    }
}

/// Build a boxed [`HalError`] from a format string.
#[macro_export]
macro_rules! err {
    ($($arg:tt)*) => {
        Box::new($crate::HalError::message(format!($($arg)*)))
    };
}

/// Return early with a boxed [`HalError`] built from a format string.
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::err!($($arg)*))
    };
}
