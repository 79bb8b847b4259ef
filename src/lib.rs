//! # gormgen: MySQL DDL to GORM models
//!
//! gormgen turns `CREATE TABLE` statements into Go structs with `gorm` (and
//! optionally `json`) tags, with nullability-aware field types.
//!
//! ## Quick Example
//!
//! ```
//! use gormgen::prelude::*;
//!
//! let sql = "CREATE TABLE t_order (
//!     id BIGINT NOT NULL AUTO_INCREMENT,
//!     remark VARCHAR(255),
//!     PRIMARY KEY (id)
//! )";
//! let opts = Options {
//!     table_prefix: vec!["t_".to_string()],
//!     ..Options::default()
//! };
//! let code = gormgen::translate(sql, &opts).unwrap();
//! assert!(code.contains("type Order struct {"));
//! assert!(code.contains("Remark sql.NullString"));
//! ```
//!
//! ## Stages
//!
//! | Module       | Input               | Output              |
//! |--------------|---------------------|---------------------|
//! | [`parser`]   | DDL text            | `CreateTable`s      |
//! | [`schema`]   | `CreateTable`       | `TableSchema`       |
//! | [`types`]    | `ColumnSchema`      | Go field type       |
//! | [`naming`]   | SQL identifiers     | Go identifiers      |
//! | [`emit`]     | `StructDescriptor`  | Go source           |
//! | [`pipeline`] | DDL text            | Go source           |

pub mod config;
pub mod emit;
pub mod engine;
pub mod error;
pub mod naming;
pub mod options;
pub mod parser;
pub mod pipeline;
pub mod schema;
pub mod server;
pub mod types;

pub mod prelude {
    pub use crate::emit::{ModelCode, ToGo};
    pub use crate::error::*;
    pub use crate::options::{JsonTagStyle, NullStyle, Options};
    pub use crate::parser::parse;
    pub use crate::pipeline::{generate, translate, translate_to_writer};
    pub use crate::schema::{TableSchema, build_table};
}

pub use pipeline::{generate, translate, translate_to_writer};
