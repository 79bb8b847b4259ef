//! Schema builder: resolves a raw [`CreateTable`] into a [`TableSchema`].
//!
//! This is where the DDL is given meaning. Nullability, charset and
//! collation are resolved, key membership is attached to columns, and
//! structural mistakes (unknown key columns, duplicate columns, two primary
//! keys) are rejected.

use std::collections::HashSet;

use crate::error::{GenError, GenResult};
use crate::options::{DEFAULT_CHARSET, DEFAULT_COLLATION, Options};
use crate::parser::{
    ColumnAttribute, ColumnDef, CreateTable, DataType, DefaultValue, IndexKind as RawIndexKind,
    KeyPart, TableConstraint,
};
use crate::types::SqlType;

/// A resolved table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableSchema {
    /// Table name as declared, without database qualifier.
    pub name: String,
    pub columns: Vec<ColumnSchema>,
    pub comment: Option<String>,
    pub engine: Option<String>,
    pub charset: String,
    pub collation: String,
    pub indexes: Vec<IndexSchema>,
    pub foreign_keys: Vec<ForeignKeySchema>,
}

/// A resolved column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColumnSchema {
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
    /// Default value as untyped text; `None` for no default and `DEFAULT NULL`.
    pub default: Option<String>,
    pub auto_increment: bool,
    pub comment: Option<String>,
    pub primary_key: bool,
    pub unique: bool,
    /// Only set for character columns.
    pub charset: Option<String>,
    pub collation: Option<String>,
    pub on_update: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    Primary,
    Unique,
    Plain,
    Fulltext,
    Spatial,
}

/// A key over one or more columns. Functional key parts are not listed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSchema {
    pub name: Option<String>,
    pub kind: IndexKind,
    pub columns: Vec<String>,
}

/// Foreign key metadata; never validated against the referenced table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeySchema {
    pub name: Option<String>,
    pub columns: Vec<String>,
    pub ref_table: String,
    pub ref_columns: Vec<String>,
}

impl TableSchema {
    /// Find a column by name, case-insensitively as MySQL does.
    pub fn column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }
}

/// Build every table of a parsed batch.
pub fn build(decls: &[CreateTable], opts: &Options) -> GenResult<Vec<TableSchema>> {
    decls.iter().map(|d| build_table(d, opts)).collect()
}

/// Resolve one table declaration.
pub fn build_table(decl: &CreateTable, opts: &Options) -> GenResult<TableSchema> {
    let table = decl.name.as_str();
    if decl.columns.is_empty() {
        return Err(GenError::schema(table, "table has no columns"));
    }

    let charset = opts
        .charset
        .clone()
        .or_else(|| decl.options.charset.clone())
        .unwrap_or_else(|| DEFAULT_CHARSET.to_string());
    let collation = opts
        .collation
        .clone()
        .or_else(|| decl.options.collation.clone())
        .unwrap_or_else(|| DEFAULT_COLLATION.to_string());

    let mut schema = TableSchema {
        name: decl.name.clone(),
        columns: Vec::with_capacity(decl.columns.len()),
        comment: decl.options.comment.clone().filter(|c| !c.is_empty()),
        engine: decl.options.engine.clone(),
        charset,
        collation,
        indexes: Vec::new(),
        foreign_keys: Vec::new(),
    };

    let mut seen = HashSet::new();
    // Explicit NULL per column, checked once primary keys are known.
    let mut explicit_null = Vec::with_capacity(decl.columns.len());
    let mut column_pk: Option<String> = None;

    for def in &decl.columns {
        if !seen.insert(def.name.to_ascii_lowercase()) {
            return Err(GenError::schema(
                table,
                format!("duplicate column `{}`", def.name),
            ));
        }
        let resolved = resolve_column(table, def, &schema, opts)?;
        explicit_null.push(resolved.explicit_null);

        if resolved.column.primary_key {
            if let Some(first) = &column_pk {
                return Err(GenError::schema(
                    table,
                    format!(
                        "multiple primary keys defined (`{}` and `{}`)",
                        first, def.name
                    ),
                ));
            }
            column_pk = Some(def.name.clone());
            schema.indexes.push(IndexSchema {
                name: None,
                kind: IndexKind::Primary,
                columns: vec![def.name.clone()],
            });
        }
        if resolved.column.unique {
            schema.indexes.push(IndexSchema {
                name: None,
                kind: IndexKind::Unique,
                columns: vec![def.name.clone()],
            });
        }
        if let Some(fk) = resolved.foreign_key {
            schema.foreign_keys.push(fk);
        }
        schema.columns.push(resolved.column);
    }

    let mut has_pk = column_pk.is_some();
    for constraint in &decl.constraints {
        match constraint {
            TableConstraint::PrimaryKey { name, columns } => {
                if has_pk {
                    return Err(GenError::schema(table, "multiple primary keys defined"));
                }
                has_pk = true;
                let members = key_columns(&schema, columns, name.as_deref())?;
                for &i in &members {
                    schema.columns[i].primary_key = true;
                }
                push_index(&mut schema, name, IndexKind::Primary, &members);
            }
            TableConstraint::Unique { name, columns } => {
                let members = key_columns(&schema, columns, name.as_deref())?;
                if members.len() == 1 && columns.len() == 1 {
                    schema.columns[members[0]].unique = true;
                }
                push_index(&mut schema, name, IndexKind::Unique, &members);
            }
            TableConstraint::Index {
                kind,
                name,
                columns,
            } => {
                let members = key_columns(&schema, columns, name.as_deref())?;
                let kind = match kind {
                    RawIndexKind::Plain => IndexKind::Plain,
                    RawIndexKind::Fulltext => IndexKind::Fulltext,
                    RawIndexKind::Spatial => IndexKind::Spatial,
                };
                push_index(&mut schema, name, kind, &members);
            }
            TableConstraint::ForeignKey {
                name,
                columns,
                ref_table,
                ref_columns,
            } => {
                let members = key_columns(&schema, columns, name.as_deref())?;
                schema.foreign_keys.push(ForeignKeySchema {
                    name: name.clone(),
                    columns: members
                        .iter()
                        .map(|&i| schema.columns[i].name.clone())
                        .collect(),
                    ref_table: ref_table.clone(),
                    ref_columns: ref_columns.clone(),
                });
            }
            TableConstraint::Check { .. } => {}
        }
    }

    for (column, explicit) in schema.columns.iter_mut().zip(explicit_null) {
        if column.primary_key {
            if explicit {
                return Err(GenError::schema(
                    table,
                    format!(
                        "primary key column `{}` is declared NULL",
                        column.name
                    ),
                ));
            }
            column.nullable = false;
        }
    }

    Ok(schema)
}

struct ResolvedColumn {
    column: ColumnSchema,
    /// The last of `NULL` / `NOT NULL` was an explicit `NULL`.
    explicit_null: bool,
    foreign_key: Option<ForeignKeySchema>,
}

fn resolve_column(
    table: &str,
    def: &ColumnDef,
    schema: &TableSchema,
    opts: &Options,
) -> GenResult<ResolvedColumn> {
    let mut column = ColumnSchema {
        name: def.name.clone(),
        data_type: def.data_type.clone(),
        nullable: true,
        charset: def.data_type.charset.clone(),
        collation: def.data_type.collation.clone(),
        ..ColumnSchema::default()
    };

    // SERIAL is BIGINT UNSIGNED NOT NULL AUTO_INCREMENT UNIQUE.
    let mut null_flag = None;
    if column.data_type.name == "serial" {
        column.data_type = DataType {
            name: "bigint".to_string(),
            unsigned: true,
            ..DataType::default()
        };
        column.auto_increment = true;
        column.unique = true;
        null_flag = Some(false);
    }

    let mut default_null = false;
    let mut foreign_key = None;

    for attr in &def.attributes {
        match attr {
            ColumnAttribute::NotNull => null_flag = Some(false),
            ColumnAttribute::Null => null_flag = Some(true),
            ColumnAttribute::Default(DefaultValue::Null) => {
                default_null = true;
                column.default = None;
            }
            ColumnAttribute::Default(value) => {
                default_null = false;
                column.default = Some(render_default(value));
            }
            ColumnAttribute::AutoIncrement => column.auto_increment = true,
            ColumnAttribute::PrimaryKey => column.primary_key = true,
            ColumnAttribute::Unique => column.unique = true,
            ColumnAttribute::Comment(c) => {
                column.comment = Some(c.clone()).filter(|c| !c.is_empty())
            }
            ColumnAttribute::OnUpdate(expr) => column.on_update = Some(expr.clone()),
            ColumnAttribute::Charset(c) => column.charset = Some(c.clone()),
            ColumnAttribute::Collate(c) => column.collation = Some(c.clone()),
            ColumnAttribute::References { table: ref_table, columns } => {
                foreign_key = Some(ForeignKeySchema {
                    name: None,
                    columns: vec![def.name.clone()],
                    ref_table: ref_table.clone(),
                    ref_columns: columns.clone(),
                });
            }
            ColumnAttribute::Generated { .. }
            | ColumnAttribute::Check(_)
            | ColumnAttribute::Other(_) => {}
        }
    }

    if default_null && null_flag == Some(false) {
        return Err(GenError::schema(
            table,
            format!(
                "column `{}` is NOT NULL but has DEFAULT NULL",
                def.name
            ),
        ));
    }
    column.nullable = null_flag.unwrap_or(true);

    let textual = SqlType::from_name(&column.data_type.name).is_some_and(|t| t.is_textual());
    if textual {
        column.charset = opts
            .charset
            .clone()
            .or(column.charset)
            .or_else(|| Some(schema.charset.clone()));
        column.collation = opts
            .collation
            .clone()
            .or(column.collation)
            .or_else(|| Some(schema.collation.clone()));
    } else {
        column.charset = None;
        column.collation = None;
    }

    Ok(ResolvedColumn {
        column,
        explicit_null: null_flag == Some(true),
        foreign_key,
    })
}

/// Untyped text of a default value: strings unquoted, functions by name.
fn render_default(value: &DefaultValue) -> String {
    match value {
        DefaultValue::Null => String::new(),
        DefaultValue::Text(s)
        | DefaultValue::Number(s)
        | DefaultValue::Function(s)
        | DefaultValue::Expression(s) => s.clone(),
    }
}

/// Indexes of the columns named by a key, in key order.
fn key_columns(
    schema: &TableSchema,
    parts: &[KeyPart],
    key: Option<&str>,
) -> GenResult<Vec<usize>> {
    parts
        .iter()
        .filter_map(KeyPart::column)
        .map(|name| {
            schema.position(name).ok_or_else(|| {
                GenError::schema(
                    &schema.name,
                    match key {
                        Some(k) => format!("key `{}` references unknown column `{}`", k, name),
                        None => format!("key references unknown column `{}`", name),
                    },
                )
            })
        })
        .collect()
}

fn push_index(schema: &mut TableSchema, name: &Option<String>, kind: IndexKind, members: &[usize]) {
    let columns = members
        .iter()
        .map(|&i| schema.columns[i].name.clone())
        .collect();
    schema.indexes.push(IndexSchema {
        name: name.clone(),
        kind,
        columns,
    });
}
