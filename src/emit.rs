//! Go code emitter.
//!
//! Renders [`StructDescriptor`]s as gofmt-formatted Go source. Emission is
//! purely textual: every name and type has been decided before it gets here.

use std::collections::BTreeSet;
use std::fmt;

use crate::options::Options;
use crate::schema::{ColumnSchema, IndexKind, TableSchema};

/// Trait for converting descriptors to Go source.
pub trait ToGo {
    /// Convert this node to Go source text.
    fn to_go(&self) -> String;
}

/// One struct field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub go_type: String,
    /// Full struct tag without the surrounding backticks.
    pub tag: String,
    /// Source column name.
    pub column: String,
    pub comment: Option<String>,
}

/// One struct, generated from one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructDescriptor {
    pub name: String,
    pub fields: Vec<FieldDescriptor>,
    /// Raw table name, returned by the `TableName()` accessor.
    pub table: String,
    pub table_name_method: bool,
    pub comment: Option<String>,
    pub imports: BTreeSet<&'static str>,
}

/// A generated Go file: package clause, imports and struct blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCode {
    pub package: String,
    pub imports: BTreeSet<String>,
    /// Rendered struct blocks, in table order.
    pub structs: Vec<String>,
}

impl ModelCode {
    pub fn new(package: impl Into<String>, structs: &[StructDescriptor]) -> Self {
        Self {
            package: package.into(),
            imports: structs
                .iter()
                .flat_map(|s| s.imports.iter().map(|i| i.to_string()))
                .collect(),
            structs: structs.iter().map(ToGo::to_go).collect(),
        }
    }
}

impl fmt::Display for ModelCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "package {}", self.package)?;
        match self.imports.len() {
            0 => {}
            1 => {
                let only = self.imports.iter().next().map(String::as_str).unwrap_or_default();
                write!(f, "\nimport \"{}\"\n", only)?;
            }
            _ => {
                write!(f, "\nimport (\n")?;
                for import in &self.imports {
                    writeln!(f, "\t\"{}\"", import)?;
                }
                writeln!(f, ")")?;
            }
        }
        for block in &self.structs {
            write!(f, "\n{}", block)?;
        }
        Ok(())
    }
}

impl ToGo for StructDescriptor {
    fn to_go(&self) -> String {
        let mut out = String::new();
        if let Some(comment) = &self.comment {
            out.push_str(&format!("// {}\n", one_line(comment)));
        }
        out.push_str(&format!("type {} struct {{\n", self.name));

        let width = |s: &str| s.chars().count();
        let name_w = self.fields.iter().map(|f| width(&f.name)).max().unwrap_or(0);
        let type_w = self.fields.iter().map(|f| width(&f.go_type)).max().unwrap_or(0);
        let tag_w = comment_runs(&self.fields);

        for (field, tag_pad) in self.fields.iter().zip(tag_w) {
            let tag = format!("`{}`", field.tag);
            out.push('\t');
            out.push_str(&pad(&field.name, name_w));
            out.push(' ');
            out.push_str(&pad(&field.go_type, type_w));
            out.push(' ');
            match &field.comment {
                Some(comment) => {
                    out.push_str(&pad(&tag, tag_pad));
                    out.push_str(" // ");
                    out.push_str(&one_line(comment));
                }
                None => out.push_str(&tag),
            }
            out.push('\n');
        }
        out.push_str("}\n");

        if self.table_name_method {
            out.push_str(&format!(
                "\nfunc (m *{}) TableName() string {{\n\treturn {}\n}}\n",
                self.name,
                go_string(&self.table)
            ));
        }
        out
    }
}

/// Tag column width per field. gofmt aligns trailing comments across each
/// run of consecutive commented lines only.
fn comment_runs(fields: &[FieldDescriptor]) -> Vec<usize> {
    let mut widths = vec![0; fields.len()];
    let mut i = 0;
    while i < fields.len() {
        if fields[i].comment.is_none() {
            i += 1;
            continue;
        }
        let start = i;
        while i < fields.len() && fields[i].comment.is_some() {
            i += 1;
        }
        let w = fields[start..i]
            .iter()
            .map(|f| f.tag.chars().count() + 2)
            .max()
            .unwrap_or(0);
        widths[start..i].iter_mut().for_each(|x| *x = w);
    }
    widths
}

fn pad(s: &str, width: usize) -> String {
    format!("{:<width$}", s, width = width)
}

fn one_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Go interpreted string literal.
fn go_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Value inside a `key:"value"` struct tag, quoted the way
/// `reflect.StructTag` unquotes it. Backticks cannot appear in a Go raw
/// string, so they become single quotes.
fn tag_value(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '`' => out.push('\''),
            _ => out.push(c),
        }
    }
    out
}

/// A single gorm setting value. gorm splits settings on `;` unless it is
/// preceded by a backslash.
fn setting(s: &str) -> String {
    s.replace(';', "\\;")
}

/// Render the full struct tag of a column: the `gorm` key and, when
/// `json_name` is given, the `json` key.
pub fn field_tag(
    column: &ColumnSchema,
    table: &TableSchema,
    json_name: Option<&str>,
    opts: &Options,
) -> String {
    let mut parts = vec![format!("column:{}", setting(&column.name))];
    if opts.gorm_type {
        parts.push(format!("type:{}", setting(&column.data_type.to_sql())));
    }
    if column.primary_key {
        parts.push("primary_key".to_string());
    }
    if column.auto_increment {
        parts.push("AUTO_INCREMENT".to_string());
    }
    if let Some(default) = &column.default {
        if default.is_empty() {
            parts.push("default:''".to_string());
        } else {
            parts.push(format!("default:{}", setting(default)));
        }
    }
    if column.unique {
        parts.push("unique".to_string());
    }
    for index in table
        .indexes
        .iter()
        .filter(|i| i.columns.iter().any(|c| c.eq_ignore_ascii_case(&column.name)))
    {
        let name = || setting(index.name.as_deref().unwrap_or(&index.columns[0]));
        match index.kind {
            IndexKind::Primary => {}
            IndexKind::Unique if index.columns.len() > 1 => {
                parts.push(format!("unique_index:{}", name()))
            }
            IndexKind::Unique => {}
            IndexKind::Plain | IndexKind::Fulltext | IndexKind::Spatial => {
                parts.push(format!("index:{}", name()))
            }
        }
    }
    if !column.nullable && !column.primary_key {
        parts.push("NOT NULL".to_string());
    }

    let mut tag = format!("gorm:\"{}\"", tag_value(&parts.join(";")));
    if let Some(json) = json_name {
        tag.push_str(&format!(" json:\"{}\"", tag_value(json)));
    }
    tag
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::DataType;
    use crate::schema::IndexSchema;
    use pretty_assertions::assert_eq;

    fn field(name: &str, go_type: &str, tag: &str, comment: Option<&str>) -> FieldDescriptor {
        FieldDescriptor {
            name: name.to_string(),
            go_type: go_type.to_string(),
            tag: tag.to_string(),
            column: name.to_lowercase(),
            comment: comment.map(String::from),
        }
    }

    #[test]
    fn test_struct_alignment() {
        let s = StructDescriptor {
            name: "User".to_string(),
            fields: vec![
                field("ID", "int64", r#"gorm:"column:id;primary_key""#, None),
                field("Name", "sql.NullString", r#"gorm:"column:name""#, Some("login")),
                field("Age", "int8", r#"gorm:"column:age;NOT NULL""#, Some("years")),
            ],
            table: "t_user".to_string(),
            table_name_method: true,
            comment: Some("users\nof the site".to_string()),
            imports: BTreeSet::from(["database/sql"]),
        };
        let expected = concat!(
            "// users of the site\n",
            "type User struct {\n",
            "\tID   int64          `gorm:\"column:id;primary_key\"`\n",
            "\tName sql.NullString `gorm:\"column:name\"`         // login\n",
            "\tAge  int8           `gorm:\"column:age;NOT NULL\"` // years\n",
            "}\n",
            "\n",
            "func (m *User) TableName() string {\n",
            "\treturn \"t_user\"\n",
            "}\n",
        );
        assert_eq!(s.to_go(), expected);
    }

    #[test]
    fn test_model_code_imports() {
        let one = ModelCode {
            package: "model".to_string(),
            imports: BTreeSet::from(["time".to_string()]),
            structs: vec!["type A struct {\n}\n".to_string()],
        };
        assert_eq!(
            one.to_string(),
            "package model\n\nimport \"time\"\n\ntype A struct {\n}\n"
        );

        let many = ModelCode {
            package: "db".to_string(),
            imports: BTreeSet::from(["time".to_string(), "database/sql".to_string()]),
            structs: vec![],
        };
        assert_eq!(
            many.to_string(),
            "package db\n\nimport (\n\t\"database/sql\"\n\t\"time\"\n)\n"
        );

        let none = ModelCode {
            package: "model".to_string(),
            imports: BTreeSet::new(),
            structs: vec![],
        };
        assert_eq!(none.to_string(), "package model\n");
    }

    fn column(name: &str) -> ColumnSchema {
        ColumnSchema {
            name: name.to_string(),
            data_type: DataType {
                name: "varchar".to_string(),
                params: vec![crate::parser::TypeParam::Number(32)],
                ..DataType::default()
            },
            ..ColumnSchema::default()
        }
    }

    #[test]
    fn test_field_tag() {
        let mut code = column("code");
        code.default = Some("it's".to_string());
        let mut id = column("id");
        id.primary_key = true;
        id.auto_increment = true;
        let table = TableSchema {
            name: "t".to_string(),
            columns: vec![id.clone(), code.clone()],
            indexes: vec![
                IndexSchema {
                    name: Some("uk_code_id".to_string()),
                    kind: IndexKind::Unique,
                    columns: vec!["code".to_string(), "id".to_string()],
                },
                IndexSchema {
                    name: None,
                    kind: IndexKind::Plain,
                    columns: vec!["code".to_string()],
                },
            ],
            ..TableSchema::default()
        };

        let opts = Options {
            gorm_type: true,
            ..Options::default()
        };
        assert_eq!(
            field_tag(&code, &table, Some("code"), &opts),
            r#"gorm:"column:code;type:varchar(32);default:it's;unique_index:uk_code_id;index:code;NOT NULL" json:"code""#
        );
        assert_eq!(
            field_tag(&id, &table, None, &Options::default()),
            r#"gorm:"column:id;primary_key;AUTO_INCREMENT;unique_index:uk_code_id""#
        );

        let mut empty = column("note");
        empty.nullable = true;
        empty.default = Some(String::new());
        assert_eq!(
            field_tag(&empty, &table, None, &Options::default()),
            r#"gorm:"column:note;default:''""#
        );
    }

    #[test]
    fn test_field_tag_escapes_default() {
        let table = TableSchema::default();

        let mut semi = column("x");
        semi.default = Some("a;b".to_string());
        assert_eq!(
            field_tag(&semi, &table, None, &Options::default()),
            r#"gorm:"column:x;default:a\\;b;NOT NULL""#
        );

        let mut multi = column("x");
        multi.nullable = true;
        multi.default = Some("a\nb\tc".to_string());
        let tag = field_tag(&multi, &table, None, &Options::default());
        assert_eq!(tag, r#"gorm:"column:x;default:a\nb\tc""#);
        assert!(!tag.contains('\n'));
    }

    #[test]
    fn test_go_string_escapes() {
        assert_eq!(go_string(r#"a"b\c"#), r#""a\"b\\c""#);
    }
}
