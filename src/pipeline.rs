//! Translation pipeline.
//!
//! ```text
//! DDL ─▶ parse ─▶ build schema ─▶ map types / names ─▶ emit ─▶ Go source
//! ```
//!
//! Every table goes through every stage before anything is rendered, so a
//! failure in the last table still produces no output at all.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;

use crate::emit::{FieldDescriptor, ModelCode, StructDescriptor, field_tag};
use crate::error::{GenError, GenResult};
use crate::naming::{go_identifier, gorm_table_name, strip_prefix, to_snake};
use crate::options::{JsonTagStyle, Options};
use crate::parser;
use crate::schema::{self, TableSchema};
use crate::types::field_type;

/// Name of the generated accessor method.
const TABLE_NAME_METHOD: &str = "TableName";

/// Translate DDL into a complete Go source file.
pub fn translate(sql: &str, opts: &Options) -> GenResult<String> {
    generate(sql, opts).map(|code| code.to_string())
}

/// Translate DDL into its structured result.
pub fn generate(sql: &str, opts: &Options) -> GenResult<ModelCode> {
    opts.validate()?;

    let decls = parser::parse(sql)?;
    tracing::debug!(tables = decls.len(), "parsed DDL");

    let tables = schema::build(&decls, opts)?;
    tracing::debug!("schema resolved");

    let structs = describe_all(&tables, opts)?;
    tracing::debug!(structs = structs.len(), "descriptors built");

    Ok(ModelCode::new(opts.package_name(), &structs))
}

/// Translate and write the result in one go. Nothing is written on error.
pub fn translate_to_writer<W: Write + ?Sized>(
    sql: &str,
    opts: &Options,
    writer: &mut W,
) -> GenResult<()> {
    let code = translate(sql, opts)?;
    writer.write_all(code.as_bytes())?;
    writer.flush()?;
    Ok(())
}

/// Build descriptors for a batch, rejecting duplicate struct names.
pub fn describe_all(tables: &[TableSchema], opts: &Options) -> GenResult<Vec<StructDescriptor>> {
    let mut seen: BTreeMap<String, &str> = BTreeMap::new();
    let mut out = Vec::with_capacity(tables.len());
    for table in tables {
        let descriptor = describe(table, opts)?;
        if let Some(first) = seen.insert(descriptor.name.clone(), &table.name) {
            return Err(GenError::NamingCollision {
                scope: "batch".to_string(),
                first: first.to_string(),
                second: table.name.clone(),
                name: descriptor.name,
            });
        }
        out.push(descriptor);
    }
    Ok(out)
}

/// Build the descriptor of one table.
pub fn describe(table: &TableSchema, opts: &Options) -> GenResult<StructDescriptor> {
    let stripped = strip_prefix(&table.name, &opts.table_prefix);
    let name = go_identifier(
        stripped.unwrap_or(&table.name),
        &table.name,
        &format!("table name `{}`", table.name),
    )?;
    let table_name_method = opts.force_table_name || gorm_table_name(&name) != table.name;
    let scope = format!("table `{}`", table.name);

    let mut imports = BTreeSet::new();
    let mut fields = Vec::with_capacity(table.columns.len());
    let mut seen: BTreeMap<String, &str> = BTreeMap::new();

    for column in &table.columns {
        let base = strip_prefix(&column.name, &opts.column_prefix).unwrap_or(&column.name);
        let field_name = go_identifier(base, &table.name, &format!("column `{}`", column.name))?;

        if let Some(first) = seen.insert(field_name.clone(), &column.name) {
            return Err(GenError::NamingCollision {
                scope,
                first: first.to_string(),
                second: column.name.clone(),
                name: field_name,
            });
        }
        if table_name_method && field_name == TABLE_NAME_METHOD {
            return Err(GenError::NamingCollision {
                scope,
                first: column.name.clone(),
                second: format!("{}()", TABLE_NAME_METHOD),
                name: field_name,
            });
        }

        let go_type = field_type(&table.name, column, opts)?;
        imports.extend(go_type.import);

        let json = opts.json_tag.then(|| match opts.json_style {
            JsonTagStyle::Snake => to_snake(base),
            JsonTagStyle::Declared => base.to_string(),
        });

        fields.push(FieldDescriptor {
            name: field_name,
            go_type: go_type.name,
            tag: field_tag(column, table, json.as_deref(), opts),
            column: column.name.clone(),
            comment: column.comment.clone(),
        });
    }

    tracing::trace!(table = %table.name, name = %name, fields = fields.len(), "described table");

    Ok(StructDescriptor {
        name,
        fields,
        table: table.name.clone(),
        table_name_method,
        comment: table.comment.clone(),
        imports,
    })
}
