//! Error types for gormgen.

use thiserror::Error;

/// The main error type for gormgen operations.
#[derive(Debug, Error)]
pub enum GenError {
    /// The DDL text could not be parsed.
    #[error("Syntax error at line {line}, column {column} (offset {position}): {message}")]
    Syntax {
        position: usize,
        line: usize,
        column: usize,
        message: String,
    },

    /// A table declaration is structurally invalid.
    #[error("Schema error in table `{table}`: {message}")]
    Schema { table: String, message: String },

    /// A column type has no Go mapping.
    #[error("Unsupported type `{sql_type}` for column `{table}`.`{column}`")]
    UnsupportedType {
        table: String,
        column: String,
        sql_type: String,
    },

    /// Two source identifiers normalize to the same Go identifier.
    #[error("Naming collision in {scope}: `{first}` and `{second}` both map to `{name}`")]
    NamingCollision {
        scope: String,
        first: String,
        second: String,
        name: String,
    },

    /// Invalid option value.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Schema introspection failed.
    #[error("Database error: {0}")]
    Database(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GenError {
    /// Create a schema error for the given table.
    pub fn schema(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Schema {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Stable machine-readable code, used by the HTTP API.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Syntax { .. } => "SYNTAX_ERROR",
            Self::Schema { .. } => "SCHEMA_ERROR",
            Self::UnsupportedType { .. } => "UNSUPPORTED_TYPE",
            Self::NamingCollision { .. } => "NAMING_COLLISION",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Io(_) => "IO_ERROR",
        }
    }
}

/// Result type alias for gormgen operations.
pub type GenResult<T> = Result<T, GenError>;
