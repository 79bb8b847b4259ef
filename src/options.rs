//! Generation options.
//!
//! A single [`Options`] value is built once per invocation (by the CLI, the
//! HTTP handler, or a library caller) and passed by shared reference to every
//! pipeline stage.
//!
//! ```
//! use gormgen::options::{NullStyle, Options};
//!
//! let opts = Options {
//!     table_prefix: vec!["t_".to_string()],
//!     null_style: NullStyle::Pointer,
//!     json_tag: true,
//!     ..Options::default()
//! };
//! assert_eq!(opts.package_name(), "model");
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GenError;

/// Package name used when none is configured.
pub const DEFAULT_PACKAGE: &str = "model";

/// Charset applied when neither the options nor the DDL name one.
pub const DEFAULT_CHARSET: &str = "utf8mb4";

/// Collation applied when neither the options nor the DDL name one.
pub const DEFAULT_COLLATION: &str = "utf8mb4_general_ci";

/// Go keywords, which cannot name a package.
const GO_KEYWORDS: &[&str] = &[
    "break", "case", "chan", "const", "continue", "default", "defer", "else", "fallthrough",
    "for", "func", "go", "goto", "if", "import", "interface", "map", "package", "range",
    "return", "select", "struct", "switch", "type", "var",
];

/// How a nullable column is represented in Go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NullStyle {
    /// Built-in per-type default.
    #[default]
    None,
    /// `database/sql` wrappers such as `sql.NullString`.
    Wrapped,
    /// Pointer to the base type, e.g. `*string`.
    Pointer,
}

impl FromStr for NullStyle {
    type Err = GenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(Self::None),
            "sql" | "wrapped" => Ok(Self::Wrapped),
            "ptr" | "pointer" => Ok(Self::Pointer),
            other => Err(GenError::Config(format!(
                "invalid null style '{}'. Expected: sql or ptr",
                other
            ))),
        }
    }
}

impl fmt::Display for NullStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Wrapped => write!(f, "sql"),
            Self::Pointer => write!(f, "ptr"),
        }
    }
}

/// Naming used for the value of `json:"..."` tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonTagStyle {
    /// Lower snake case of the column name (`userName` -> `user_name`).
    #[default]
    Snake,
    /// The column name as written in the DDL.
    Declared,
}

impl FromStr for JsonTagStyle {
    type Err = GenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "snake" => Ok(Self::Snake),
            "declared" | "raw" => Ok(Self::Declared),
            other => Err(GenError::Config(format!(
                "invalid json style '{}'. Expected: snake or declared",
                other
            ))),
        }
    }
}

/// Options controlling schema resolution and code emission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    /// Charset override for every table.
    pub charset: Option<String>,
    /// Collation override for every table.
    pub collation: Option<String>,
    /// Emit `json:"..."` tags.
    pub json_tag: bool,
    pub json_style: JsonTagStyle,
    /// Candidate table prefixes; the longest match is stripped.
    pub table_prefix: Vec<String>,
    /// Candidate column prefixes; the longest match is stripped.
    pub column_prefix: Vec<String>,
    /// Always use the plain base type, even for nullable columns.
    pub no_null_type: bool,
    pub null_style: NullStyle,
    /// Go package name; [`DEFAULT_PACKAGE`] when unset.
    pub package: Option<String>,
    /// Write the SQL column type into the gorm tag.
    pub gorm_type: bool,
    /// Always emit a `TableName()` method.
    pub force_table_name: bool,
}

impl Options {
    /// The package name to emit.
    pub fn package_name(&self) -> &str {
        match self.package.as_deref() {
            Some(p) if !p.trim().is_empty() => p.trim(),
            _ => DEFAULT_PACKAGE,
        }
    }

    /// Check option values that cannot be enforced by the type system.
    pub fn validate(&self) -> Result<(), GenError> {
        let pkg = self.package_name();
        let valid = pkg
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && pkg.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid {
            return Err(GenError::Config(format!(
                "invalid package name '{}'",
                pkg
            )));
        }
        if GO_KEYWORDS.contains(&pkg) {
            return Err(GenError::Config(format!(
                "package name '{}' is a Go keyword",
                pkg
            )));
        }
        if self
            .table_prefix
            .iter()
            .chain(&self.column_prefix)
            .any(|p| p.is_empty())
        {
            return Err(GenError::Config("empty prefix".to_string()));
        }
        Ok(())
    }
}

/// Split a comma separated prefix list, dropping blanks.
pub fn split_prefixes(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_style_from_str() {
        assert_eq!("sql".parse::<NullStyle>().unwrap(), NullStyle::Wrapped);
        assert_eq!("ptr".parse::<NullStyle>().unwrap(), NullStyle::Pointer);
        assert_eq!("".parse::<NullStyle>().unwrap(), NullStyle::None);
        let err = "nullable".parse::<NullStyle>().unwrap_err();
        assert!(matches!(err, GenError::Config(_)));
        assert!(err.to_string().contains("nullable"));
    }

    #[test]
    fn test_default_package() {
        let opts = Options::default();
        assert_eq!(opts.package_name(), "model");

        let opts = Options {
            package: Some("entity".to_string()),
            ..Options::default()
        };
        assert_eq!(opts.package_name(), "entity");
    }

    #[test]
    fn test_validate_rejects_bad_package() {
        let opts = Options {
            package: Some("my-models".to_string()),
            ..Options::default()
        };
        assert!(matches!(opts.validate(), Err(GenError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_keyword_package() {
        for keyword in ["type", "func", "package"] {
            let opts = Options {
                package: Some(keyword.to_string()),
                ..Options::default()
            };
            let err = opts.validate().unwrap_err();
            assert!(err.to_string().contains("Go keyword"), "{keyword}: {err}");
        }
        let opts = Options {
            package: Some("types".to_string()),
            ..Options::default()
        };
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn test_split_prefixes() {
        assert_eq!(split_prefixes("t_, tbl_,,"), vec!["t_", "tbl_"]);
        assert!(split_prefixes("").is_empty());
    }
}
