//! SQL type catalogue and the Go type mapping.
//!
//! Every [`SqlType`] has a static [`TypeMapping`]; the null representation of
//! a column is then chosen from the mapping, the column's nullability and the
//! [`Options`].

use std::fmt;

use crate::error::{GenError, GenResult};
use crate::options::{NullStyle, Options};
use crate::schema::ColumnSchema;

/// Import path of the `sql.NullXxx` wrappers.
pub const IMPORT_SQL: &str = "database/sql";
/// Import path of `time.Time`.
pub const IMPORT_TIME: &str = "time";

/// MySQL column types understood by the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SqlType {
    TinyInt,
    SmallInt,
    MediumInt,
    Int,
    BigInt,
    Bit,
    Bool,
    Float,
    Double,
    Decimal,
    Char,
    VarChar,
    TinyText,
    Text,
    MediumText,
    LongText,
    Binary,
    VarBinary,
    TinyBlob,
    Blob,
    MediumBlob,
    LongBlob,
    Date,
    DateTime,
    Timestamp,
    Time,
    Year,
    Json,
    Enum,
    Set,
}

impl SqlType {
    pub const ALL: [SqlType; 30] = [
        Self::TinyInt,
        Self::SmallInt,
        Self::MediumInt,
        Self::Int,
        Self::BigInt,
        Self::Bit,
        Self::Bool,
        Self::Float,
        Self::Double,
        Self::Decimal,
        Self::Char,
        Self::VarChar,
        Self::TinyText,
        Self::Text,
        Self::MediumText,
        Self::LongText,
        Self::Binary,
        Self::VarBinary,
        Self::TinyBlob,
        Self::Blob,
        Self::MediumBlob,
        Self::LongBlob,
        Self::Date,
        Self::DateTime,
        Self::Timestamp,
        Self::Time,
        Self::Year,
        Self::Json,
        Self::Enum,
        Self::Set,
    ];

    /// Look up a lower- or upper-case type name, aliases included.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        let t = match name.as_str() {
            "tinyint" | "int1" => Self::TinyInt,
            "smallint" | "int2" => Self::SmallInt,
            "mediumint" | "int3" | "middleint" => Self::MediumInt,
            "int" | "integer" | "int4" => Self::Int,
            "bigint" | "int8" => Self::BigInt,
            "bit" => Self::Bit,
            "bool" | "boolean" => Self::Bool,
            "float" | "float4" => Self::Float,
            "double" | "double precision" | "real" | "float8" => Self::Double,
            "decimal" | "numeric" | "dec" | "fixed" => Self::Decimal,
            "char" | "character" | "nchar" => Self::Char,
            "varchar" | "nvarchar" => Self::VarChar,
            "tinytext" => Self::TinyText,
            "text" => Self::Text,
            "mediumtext" => Self::MediumText,
            "longtext" => Self::LongText,
            "binary" => Self::Binary,
            "varbinary" => Self::VarBinary,
            "tinyblob" => Self::TinyBlob,
            "blob" => Self::Blob,
            "mediumblob" => Self::MediumBlob,
            "longblob" => Self::LongBlob,
            "date" => Self::Date,
            "datetime" => Self::DateTime,
            "timestamp" => Self::Timestamp,
            "time" => Self::Time,
            "year" => Self::Year,
            "json" => Self::Json,
            "enum" => Self::Enum,
            "set" => Self::Set,
            _ => return None,
        };
        Some(t)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TinyInt => "tinyint",
            Self::SmallInt => "smallint",
            Self::MediumInt => "mediumint",
            Self::Int => "int",
            Self::BigInt => "bigint",
            Self::Bit => "bit",
            Self::Bool => "bool",
            Self::Float => "float",
            Self::Double => "double",
            Self::Decimal => "decimal",
            Self::Char => "char",
            Self::VarChar => "varchar",
            Self::TinyText => "tinytext",
            Self::Text => "text",
            Self::MediumText => "mediumtext",
            Self::LongText => "longtext",
            Self::Binary => "binary",
            Self::VarBinary => "varbinary",
            Self::TinyBlob => "tinyblob",
            Self::Blob => "blob",
            Self::MediumBlob => "mediumblob",
            Self::LongBlob => "longblob",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Timestamp => "timestamp",
            Self::Time => "time",
            Self::Year => "year",
            Self::Json => "json",
            Self::Enum => "enum",
            Self::Set => "set",
        }
    }

    /// Character types, the ones that carry a charset and collation.
    pub fn is_textual(&self) -> bool {
        matches!(
            self,
            Self::Char
                | Self::VarChar
                | Self::TinyText
                | Self::Text
                | Self::MediumText
                | Self::LongText
                | Self::Enum
                | Self::Set
        )
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A Go type name and the package it needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoType {
    pub name: &'static str,
    pub import: Option<&'static str>,
}

impl GoType {
    const fn plain(name: &'static str) -> Self {
        Self { name, import: None }
    }

    const fn wrapper(name: &'static str) -> Self {
        Self {
            name,
            import: Some(IMPORT_SQL),
        }
    }
}

const NULL_INT16: GoType = GoType::wrapper("sql.NullInt16");
const NULL_INT32: GoType = GoType::wrapper("sql.NullInt32");
const NULL_INT64: GoType = GoType::wrapper("sql.NullInt64");
const NULL_BOOL: GoType = GoType::wrapper("sql.NullBool");
const NULL_FLOAT64: GoType = GoType::wrapper("sql.NullFloat64");
const NULL_STRING: GoType = GoType::wrapper("sql.NullString");
const NULL_TIME: GoType = GoType::wrapper("sql.NullTime");
const TIME: GoType = GoType {
    name: "time.Time",
    import: Some(IMPORT_TIME),
};

/// Go representations of one SQL type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeMapping {
    /// Type used for non-null columns.
    pub base: GoType,
    /// `database/sql` wrapper for nullable columns, when one exists.
    pub wrapped: Option<GoType>,
    /// The base type already has a nil value (`[]byte`).
    pub nil_capable: bool,
}

impl TypeMapping {
    const fn new(base: GoType, wrapped: Option<GoType>) -> Self {
        Self {
            base,
            wrapped,
            nil_capable: false,
        }
    }

    const fn bytes() -> Self {
        Self {
            base: GoType::plain("[]byte"),
            wrapped: None,
            nil_capable: true,
        }
    }
}

/// The static mapping table.
pub fn mapping(sql_type: SqlType, unsigned: bool) -> TypeMapping {
    use SqlType::*;

    let int = |signed: &'static str, unsigned_name: &'static str, wrapped: Option<GoType>| {
        let base = if unsigned { unsigned_name } else { signed };
        TypeMapping::new(GoType::plain(base), wrapped)
    };

    match sql_type {
        TinyInt => int("int8", "uint8", Some(NULL_INT16)),
        SmallInt => int(
            "int16",
            "uint16",
            Some(if unsigned { NULL_INT32 } else { NULL_INT16 }),
        ),
        MediumInt => int("int32", "uint32", Some(NULL_INT32)),
        Int => int(
            "int32",
            "uint32",
            Some(if unsigned { NULL_INT64 } else { NULL_INT32 }),
        ),
        BigInt => int("int64", "uint64", (!unsigned).then_some(NULL_INT64)),
        Bool => TypeMapping::new(GoType::plain("bool"), Some(NULL_BOOL)),
        Float => TypeMapping::new(GoType::plain("float32"), Some(NULL_FLOAT64)),
        Double => TypeMapping::new(GoType::plain("float64"), Some(NULL_FLOAT64)),
        Decimal | Time | Json | Char | VarChar | TinyText | Text | MediumText | LongText
        | Enum | Set => TypeMapping::new(GoType::plain("string"), Some(NULL_STRING)),
        Year => TypeMapping::new(GoType::plain("int16"), Some(NULL_INT16)),
        Date | DateTime | Timestamp => TypeMapping::new(TIME, Some(NULL_TIME)),
        Bit | Binary | VarBinary | TinyBlob | Blob | MediumBlob | LongBlob => {
            TypeMapping::bytes()
        }
    }
}

/// The Go type chosen for one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldType {
    pub name: String,
    pub import: Option<&'static str>,
}

impl From<GoType> for FieldType {
    fn from(t: GoType) -> Self {
        Self {
            name: t.name.to_string(),
            import: t.import,
        }
    }
}

fn pointer(t: GoType) -> FieldType {
    FieldType {
        name: format!("*{}", t.name),
        import: t.import,
    }
}

/// Pick the Go type for a column.
pub fn field_type(table: &str, column: &ColumnSchema, opts: &Options) -> GenResult<FieldType> {
    let sql_type = SqlType::from_name(&column.data_type.name).ok_or_else(|| {
        GenError::UnsupportedType {
            table: table.to_string(),
            column: column.name.clone(),
            sql_type: column.data_type.to_sql(),
        }
    })?;
    let m = mapping(sql_type, column.data_type.unsigned);

    if opts.no_null_type || !column.nullable {
        return Ok(m.base.into());
    }

    let chosen = match opts.null_style {
        NullStyle::Wrapped => m.wrapped.map(FieldType::from).unwrap_or_else(|| pointer(m.base)),
        NullStyle::Pointer => pointer(m.base),
        NullStyle::None if m.nil_capable => m.base.into(),
        NullStyle::None => m.wrapped.map(FieldType::from).unwrap_or_else(|| pointer(m.base)),
    };
    Ok(chosen)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::DataType;

    fn column(type_name: &str, unsigned: bool, nullable: bool) -> ColumnSchema {
        ColumnSchema {
            name: "c".to_string(),
            data_type: DataType {
                name: type_name.to_string(),
                unsigned,
                ..DataType::default()
            },
            nullable,
            ..ColumnSchema::default()
        }
    }

    fn go(type_name: &str, unsigned: bool, nullable: bool, opts: &Options) -> String {
        field_type("t", &column(type_name, unsigned, nullable), opts)
            .unwrap()
            .name
    }

    #[test]
    fn test_every_type_maps() {
        for t in SqlType::ALL {
            assert_eq!(SqlType::from_name(t.as_str()), Some(t));
            for unsigned in [false, true] {
                for nullable in [false, true] {
                    let ft = field_type("t", &column(t.as_str(), unsigned, nullable), &Options::default());
                    assert!(ft.is_ok(), "{t} failed");
                }
            }
        }
    }

    #[test]
    fn test_aliases() {
        assert_eq!(SqlType::from_name("INTEGER"), Some(SqlType::Int));
        assert_eq!(SqlType::from_name("double precision"), Some(SqlType::Double));
        assert_eq!(SqlType::from_name("Numeric"), Some(SqlType::Decimal));
        assert_eq!(SqlType::from_name("middleint"), Some(SqlType::MediumInt));
        assert_eq!(SqlType::from_name("geometry"), None);
    }

    #[test]
    fn test_unknown_type_is_error() {
        let err = field_type("t", &column("frobnicator", false, false), &Options::default())
            .unwrap_err();
        match err {
            GenError::UnsupportedType { table, column, sql_type } => {
                assert_eq!(table, "t");
                assert_eq!(column, "c");
                assert_eq!(sql_type, "frobnicator");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_base_types() {
        let o = Options::default();
        assert_eq!(go("tinyint", false, false, &o), "int8");
        assert_eq!(go("tinyint", true, false, &o), "uint8");
        assert_eq!(go("int", true, false, &o), "uint32");
        assert_eq!(go("bigint", false, false, &o), "int64");
        assert_eq!(go("decimal", false, false, &o), "string");
        assert_eq!(go("datetime", false, false, &o), "time.Time");
        assert_eq!(go("year", false, false, &o), "int16");
        assert_eq!(go("blob", false, false, &o), "[]byte");
    }

    #[test]
    fn test_default_null_style() {
        let o = Options::default();
        assert_eq!(go("varchar", false, true, &o), "sql.NullString");
        assert_eq!(go("int", false, true, &o), "sql.NullInt32");
        assert_eq!(go("int", true, true, &o), "sql.NullInt64");
        assert_eq!(go("bigint", true, true, &o), "*uint64");
        assert_eq!(go("timestamp", false, true, &o), "sql.NullTime");
        assert_eq!(go("varbinary", false, true, &o), "[]byte");
    }

    #[test]
    fn test_pointer_and_wrapped_styles() {
        let ptr = Options {
            null_style: NullStyle::Pointer,
            ..Options::default()
        };
        assert_eq!(go("varchar", false, true, &ptr), "*string");
        assert_eq!(go("blob", false, true, &ptr), "*[]byte");
        assert_eq!(go("varchar", false, false, &ptr), "string");

        let wrapped = Options {
            null_style: NullStyle::Wrapped,
            ..Options::default()
        };
        assert_eq!(go("float", false, true, &wrapped), "sql.NullFloat64");
        assert_eq!(go("bigint", true, true, &wrapped), "*uint64");
        assert_eq!(go("blob", false, true, &wrapped), "*[]byte");
    }

    #[test]
    fn test_no_null_type_wins() {
        let o = Options {
            no_null_type: true,
            null_style: NullStyle::Pointer,
            ..Options::default()
        };
        assert_eq!(go("varchar", false, true, &o), "string");
    }

    #[test]
    fn test_imports() {
        let o = Options::default();
        let t = field_type("t", &column("date", false, false), &o).unwrap();
        assert_eq!(t.import, Some(IMPORT_TIME));
        let t = field_type("t", &column("date", false, true), &o).unwrap();
        assert_eq!(t.import, Some(IMPORT_SQL));
        let t = field_type("t", &column("text", false, false), &o).unwrap();
        assert_eq!(t.import, None);
    }
}
