//! Raw `CREATE TABLE` declarations as written in the DDL.
//!
//! Nothing here is resolved: attributes are kept in source order and the
//! schema builder decides what they mean.

/// One `CREATE TABLE` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTable {
    /// Database qualifier of `db.table`, if any.
    pub database: Option<String>,
    pub name: String,
    pub temporary: bool,
    pub if_not_exists: bool,
    pub columns: Vec<ColumnDef>,
    pub constraints: Vec<TableConstraint>,
    pub options: TableOptions,
    /// Byte offset of the statement in the original input.
    pub offset: usize,
}

/// A column definition inside the table body.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: DataType,
    pub attributes: Vec<ColumnAttribute>,
}

/// A column data type, e.g. `varchar(255)` or `int(10) unsigned`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataType {
    /// Lower-cased type name; multi-word names are joined by one space.
    pub name: String,
    /// Parenthesised arguments: lengths, precision/scale, or enum members.
    pub params: Vec<TypeParam>,
    pub unsigned: bool,
    pub zerofill: bool,
    pub charset: Option<String>,
    pub collation: Option<String>,
}

/// One argument of a data type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeParam {
    Number(u32),
    Text(String),
}

impl std::fmt::Display for TypeParam {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
        }
    }
}

impl DataType {
    /// Render the type the way `information_schema` prints it,
    /// e.g. `bigint(20) unsigned` or `enum('a','b')`.
    pub fn to_sql(&self) -> String {
        let mut out = self.name.clone();
        if !self.params.is_empty() {
            let params: Vec<String> = self.params.iter().map(|p| p.to_string()).collect();
            out.push('(');
            out.push_str(&params.join(","));
            out.push(')');
        }
        if self.unsigned {
            out.push_str(" unsigned");
        }
        if self.zerofill {
            out.push_str(" zerofill");
        }
        out
    }

    fn number(&self, index: usize) -> Option<u32> {
        match self.params.get(index) {
            Some(TypeParam::Number(n)) => Some(*n),
            _ => None,
        }
    }

    /// Display width or length, e.g. `255` in `varchar(255)`.
    pub fn length(&self) -> Option<u32> {
        self.number(0)
    }

    /// `(precision, scale)` of `decimal(p, s)`; scale defaults to 0.
    pub fn precision_scale(&self) -> Option<(u32, u32)> {
        self.number(0).map(|p| (p, self.number(1).unwrap_or(0)))
    }

    /// Member list of `enum(...)` / `set(...)`.
    pub fn values(&self) -> Vec<&str> {
        self.params
            .iter()
            .filter_map(|p| match p {
                TypeParam::Text(s) => Some(s.as_str()),
                TypeParam::Number(_) => None,
            })
            .collect()
    }
}

/// A column attribute, in the order it was written.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnAttribute {
    NotNull,
    Null,
    Default(DefaultValue),
    AutoIncrement,
    PrimaryKey,
    Unique,
    Comment(String),
    OnUpdate(String),
    Charset(String),
    Collate(String),
    Generated { expr: String, stored: bool },
    References { table: String, columns: Vec<String> },
    Check(String),
    /// Accepted but meaningless for code generation (`VISIBLE`, `STORAGE DISK`, ...).
    Other(String),
}

/// A `DEFAULT` clause value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultValue {
    Null,
    /// Quoted string, unescaped.
    Text(String),
    /// Numeric literal as written, sign included.
    Number(String),
    /// Bare keyword or function call, e.g. `CURRENT_TIMESTAMP` or `uuid()`.
    Function(String),
    /// Parenthesised expression, without the outer parentheses.
    Expression(String),
}

/// A table-level key or constraint.
#[derive(Debug, Clone, PartialEq)]
pub enum TableConstraint {
    PrimaryKey {
        name: Option<String>,
        columns: Vec<KeyPart>,
    },
    Unique {
        name: Option<String>,
        columns: Vec<KeyPart>,
    },
    Index {
        kind: IndexKind,
        name: Option<String>,
        columns: Vec<KeyPart>,
    },
    ForeignKey {
        name: Option<String>,
        columns: Vec<KeyPart>,
        ref_table: String,
        ref_columns: Vec<String>,
    },
    Check {
        name: Option<String>,
        expr: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    Plain,
    Fulltext,
    Spatial,
}

/// One member of a key: a column (optionally with a prefix length) or an
/// expression for functional indexes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyPart {
    Column { name: String, length: Option<u32> },
    Expression(String),
}

impl KeyPart {
    pub fn column(&self) -> Option<&str> {
        match self {
            Self::Column { name, .. } => Some(name),
            Self::Expression(_) => None,
        }
    }
}

/// Table options after the closing parenthesis.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableOptions {
    pub engine: Option<String>,
    pub charset: Option<String>,
    pub collation: Option<String>,
    pub comment: Option<String>,
    /// Every other `name = value` option, in order.
    pub others: Vec<(String, String)>,
}
