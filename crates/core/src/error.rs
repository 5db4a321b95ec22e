use thiserror::Error as ThisError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database does not exist (database={}): {source}", .database.as_deref().unwrap_or("none"))]
    NoDatabase {
        database: Option<String>,
        #[source]
        source: ClientError,
    },
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error(transparent)]
    Execute(#[from] ExecutionError),
    #[error("adapter is not connected")]
    NotConnected,
    #[error("no adapter registered under `{name}`")]
    UnknownAdapter { name: String },
}

impl Error {
    /// Server error code carried by the underlying client failure, if any.
    pub fn error_number(&self) -> Option<u16> {
        match self {
            Self::NoDatabase { source, .. } | Self::Client(source) => source.code,
            Self::Execute(
                ExecutionError::StatementFailed { source, .. }
                | ExecutionError::QueryFailed { source, .. },
            ) => source.code,
            Self::Config(_) | Self::NotConnected | Self::UnknownAdapter { .. } => None,
        }
    }
}

/// Failure reported by the underlying wire client, passed through unmodified.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
#[error("{message}")]
pub struct ClientError {
    pub code: Option<u16>,
    pub message: String,
}

impl ClientError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: u16, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            message: message.into(),
        }
    }
}

#[derive(Debug, ThisError)]
pub enum ExecutionError {
    #[error(
        "statement[{statement_index}] failed after {executed_statements} executed statements: `{sql}`: {source}"
    )]
    StatementFailed {
        statement_index: usize,
        sql: String,
        executed_statements: usize,
        #[source]
        source: ClientError,
    },
    #[error("query failed: `{sql}`: {source}")]
    QueryFailed {
        sql: String,
        #[source]
        source: ClientError,
    },
}

impl ExecutionError {
    pub fn query_failed(sql: impl Into<String>, source: ClientError) -> Self {
        Self::QueryFailed {
            sql: sql.into(),
            source,
        }
    }

    pub fn statement_failed(
        statement_index: usize,
        sql: impl Into<String>,
        executed_statements: usize,
        source: ClientError,
    ) -> Self {
        Self::StatementFailed {
            statement_index,
            sql: sql.into(),
            executed_statements,
            source,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum ConfigError {
    #[error("invalid value for `{key}`: expected {expected}")]
    InvalidValue { key: String, expected: &'static str },
    #[error("invalid session variable name `{name}`")]
    InvalidVariableName { name: String },
    #[error("unknown client flag `{name}`")]
    UnknownFlag { name: String },
    #[error("client flag `{name}` is not supported")]
    UnsupportedFlag { name: String },
}

impl ConfigError {
    pub(crate) fn invalid_value(key: impl Into<String>, expected: &'static str) -> Self {
        Self::InvalidValue {
            key: key.into(),
            expected,
        }
    }
}
