//! Error types for statement construction, formatting and mapping.
//!
//! Every error here is unrecoverable at the point of detection: none of them
//! describes a transient condition, so nothing in the core retries.

use std::fmt;

/// The primary error type for all relmap operations.
#[derive(Debug)]
pub enum Error {
    /// No converter is registered for a property's value type
    UnmappedType(UnmappedTypeError),
    /// The formatter met a construct it cannot render
    Format(FormatError),
    /// Mapping tree construction or row conversion failed
    Mapping(MappingError),
    /// Statement AST misuse (alias rename on INSERT, predicate arity, ...)
    Statement(StatementError),
    /// A query expected to yield at most one row yielded more
    NonUniqueResult {
        /// Number of rows actually returned
        count: usize,
    },
    /// Dialect lookup by id or connection URL failed
    Dialect(DialectError),
    /// Value conversion errors
    Type(TypeError),
    /// Configuration errors
    Config(ConfigError),
}

/// No converter found for a type in the active dialect.
#[derive(Debug, Clone)]
pub struct UnmappedTypeError {
    /// Name of the offending type
    pub type_name: String,
    /// Property / selection context, e.g. `City.geo_location.latitude`
    pub context: String,
    /// Dialect whose mapping table was consulted
    pub dialect: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FormatError {
    pub kind: FormatErrorKind,
    /// Name of the construct that could not be rendered
    pub construct: String,
    /// Dialect id of the formatter
    pub dialect: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatErrorKind {
    /// An expression node whose kind the dialect does not recognize
    UnknownExpression,
    /// A known construct the dialect cannot express
    Unsupported,
}

#[derive(Debug, Clone)]
pub struct MappingError {
    pub kind: MappingErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingErrorKind {
    /// Segment with both or neither of {column, child}
    MalformedSegment,
    /// Row column name does not match the segment's column
    ColumnMismatch,
    /// Row ran out of columns during reverse conversion
    MissingColumn,
    /// A multi-column builder was finished before all contributions arrived
    IncompleteBuilder,
    /// A converter rejected its input
    Conversion,
}

#[derive(Debug, Clone)]
pub struct StatementError {
    pub kind: StatementErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementErrorKind {
    /// The statement target cannot carry an alias
    NotAliasable,
    /// Operator applied to the wrong number of operands
    Arity,
    /// A mandatory clause is missing
    Incomplete,
    /// A property path names no property of the referenced entity
    UnknownProperty,
}

#[derive(Debug, Clone)]
pub struct DialectError {
    pub kind: DialectErrorKind,
    /// The id or URL that was looked up
    pub key: String,
    /// Dialect ids that matched (for ambiguous lookups)
    pub candidates: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialectErrorKind {
    NotFound,
    Ambiguous,
}

#[derive(Debug, Clone)]
pub struct TypeError {
    pub expected: &'static str,
    pub actual: String,
    pub column: Option<String>,
}

#[derive(Debug)]
pub struct ConfigError {
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Build an unmapped-type error.
    pub fn unmapped(type_name: impl Into<String>, context: impl Into<String>) -> Self {
        Error::UnmappedType(UnmappedTypeError {
            type_name: type_name.into(),
            context: context.into(),
            dialect: None,
        })
    }

    /// Build a mapping error of the given kind.
    pub fn mapping(kind: MappingErrorKind, message: impl Into<String>) -> Self {
        Error::Mapping(MappingError {
            kind,
            message: message.into(),
        })
    }

    /// Build a formatting error raised by dialect `dialect`.
    pub fn format(
        kind: FormatErrorKind,
        construct: impl Into<String>,
        dialect: impl Into<String>,
    ) -> Self {
        Error::Format(FormatError {
            kind,
            construct: construct.into(),
            dialect: dialect.into(),
        })
    }

    /// Build a statement error of the given kind.
    pub fn statement(kind: StatementErrorKind, message: impl Into<String>) -> Self {
        Error::Statement(StatementError {
            kind,
            message: message.into(),
        })
    }

    /// Build a type conversion error.
    pub fn type_mismatch(expected: &'static str, actual: impl Into<String>) -> Self {
        Error::Type(TypeError {
            expected,
            actual: actual.into(),
            column: None,
        })
    }

    /// Is this an error caused by incorrect use of the library rather than by data?
    pub fn is_usage_error(&self) -> bool {
        match self {
            Error::Format(_) | Error::Statement(_) | Error::UnmappedType(_) => true,
            Error::Mapping(m) => m.kind == MappingErrorKind::MalformedSegment,
            _ => false,
        }
    }

    /// The column involved in this error, if known.
    pub fn column(&self) -> Option<&str> {
        match self {
            Error::Type(t) => t.column.as_deref(),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnmappedType(e) => write!(f, "Unmapped type: {}", e),
            Error::Format(e) => write!(f, "Format error: {}", e),
            Error::Mapping(e) => write!(f, "Mapping error: {}", e),
            Error::Statement(e) => write!(f, "Statement error: {}", e.message),
            Error::NonUniqueResult { count } => {
                write!(f, "Expected at most one row, found {}", count)
            }
            Error::Dialect(e) => write!(f, "Dialect error: {}", e),
            Error::Type(e) => write!(f, "Type error: {}", e),
            Error::Config(e) => write!(f, "Configuration error: {}", e.message),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Config(e) => e
                .source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            _ => None,
        }
    }
}

impl fmt::Display for UnmappedTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "no converter registered for type '{}' (selection: {})",
            self.type_name, self.context
        )?;
        if let Some(dialect) = &self.dialect {
            write!(f, " in dialect '{}'", dialect)?;
        }
        Ok(())
    }
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            FormatErrorKind::UnknownExpression => write!(
                f,
                "unknown expression '{}' for dialect '{}'",
                self.construct, self.dialect
            ),
            FormatErrorKind::Unsupported => write!(
                f,
                "'{}' is not supported by dialect '{}'",
                self.construct, self.dialect
            ),
        }
    }
}

impl fmt::Display for MappingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Display for DialectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            DialectErrorKind::NotFound => write!(f, "no dialect matches '{}'", self.key),
            DialectErrorKind::Ambiguous => write!(
                f,
                "'{}' matches several dialects: {}",
                self.key,
                self.candidates.join(", ")
            ),
        }
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(col) = &self.column {
            write!(
                f,
                "expected {} for column '{}', found {}",
                self.expected, col, self.actual
            )
        } else {
            write!(f, "expected {}, found {}", self.expected, self.actual)
        }
    }
}

impl From<UnmappedTypeError> for Error {
    fn from(err: UnmappedTypeError) -> Self {
        Error::UnmappedType(err)
    }
}

impl From<FormatError> for Error {
    fn from(err: FormatError) -> Self {
        Error::Format(err)
    }
}

impl From<MappingError> for Error {
    fn from(err: MappingError) -> Self {
        Error::Mapping(err)
    }
}

impl From<StatementError> for Error {
    fn from(err: StatementError) -> Self {
        Error::Statement(err)
    }
}

impl From<DialectError> for Error {
    fn from(err: DialectError) -> Self {
        Error::Dialect(err)
    }
}

impl From<TypeError> for Error {
    fn from(err: TypeError) -> Self {
        Error::Type(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Config(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(ConfigError {
            message: err.to_string(),
            source: Some(Box::new(err)),
        })
    }
}

/// Result type alias for relmap operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmapped_type_names_type_and_context() {
        let err = Error::unmapped("std::time::Instant", "Person.created");
        let msg = err.to_string();
        assert!(msg.contains("std::time::Instant"), "{msg}");
        assert!(msg.contains("Person.created"), "{msg}");
        assert!(err.is_usage_error());
    }

    #[test]
    fn dialect_errors_carry_the_lookup_key() {
        let err = Error::Dialect(DialectError {
            kind: DialectErrorKind::Ambiguous,
            key: "db://x".to_string(),
            candidates: vec!["a".to_string(), "b".to_string()],
        });
        assert_eq!(err.to_string(), "Dialect error: 'db://x' matches several dialects: a, b");

        let err = Error::Dialect(DialectError {
            kind: DialectErrorKind::NotFound,
            key: "oracle".to_string(),
            candidates: Vec::new(),
        });
        assert!(err.to_string().contains("oracle"));
    }

    #[test]
    fn non_unique_result_is_a_data_error() {
        let err = Error::NonUniqueResult { count: 2 };
        assert!(!err.is_usage_error());
        assert_eq!(err.to_string(), "Expected at most one row, found 2");
    }

    #[test]
    fn malformed_segment_is_a_usage_error() {
        let err = Error::mapping(MappingErrorKind::MalformedSegment, "both column and child");
        assert!(err.is_usage_error());
        let err = Error::mapping(MappingErrorKind::ColumnMismatch, "NAME vs CITY");
        assert!(!err.is_usage_error());
    }

    #[test]
    fn config_error_exposes_source() {
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = Error::from(parse);
        assert!(std::error::Error::source(&err).is_some());
    }
}
