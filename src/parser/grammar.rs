//! nom grammar for MySQL `CREATE TABLE` statements.
//!
//! Input is one statement with comments already blanked (see
//! [`super::source`]), so the combinators only deal with whitespace.
//!
//! ```text
//! create_table = CREATE [TEMPORARY] TABLE [IF NOT EXISTS] name
//!                "(" element { "," element } ")" { table_option } [partition]
//! element      = constraint | index | column
//! column       = ident data_type { attribute }
//! data_type    = word [PRECISION] ["(" param { "," param } ")"] { modifier }
//! ```

use nom::{
    branch::alt,
    bytes::complete::{tag_no_case, take_while1},
    character::complete::{char, digit0, digit1, multispace0, multispace1, one_of},
    combinator::{map, map_res, not, opt, peek, recognize, rest, value},
    error::{Error, ErrorKind},
    multi::{many0, separated_list1},
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};

use super::ast::*;

pub(crate) type Res<'a, T> = IResult<&'a str, T>;

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn fail<T>(input: &str, kind: ErrorKind) -> Res<'_, T> {
    Err(nom::Err::Error(Error::new(input, kind)))
}

fn ws(input: &str) -> Res<'_, &str> {
    multispace0(input)
}

fn ws1(input: &str) -> Res<'_, &str> {
    multispace1(input)
}

fn comma(input: &str) -> Res<'_, char> {
    preceded(ws, char(','))(input)
}

/// Case-insensitive keyword that is not followed by an identifier character.
fn kw<'a>(word: &'static str) -> impl FnMut(&'a str) -> Res<'a, &'a str> {
    move |input: &'a str| {
        let (rest, matched) = tag_no_case(word)(input)?;
        if rest.chars().next().is_some_and(is_ident_char) {
            return fail(input, ErrorKind::Tag);
        }
        Ok((rest, matched))
    }
}

/// Two keywords separated by whitespace, e.g. `PRIMARY KEY`.
fn kw2<'a>(first: &'static str, second: &'static str) -> impl FnMut(&'a str) -> Res<'a, &'a str> {
    recognize(tuple((kw(first), ws1, kw(second))))
}

/// Optional `=` between an option name and its value.
fn opt_eq(input: &str) -> Res<'_, ()> {
    value((), tuple((ws, opt(char('=')), ws)))(input)
}

// ---------------------------------------------------------------------------
// Lexical items
// ---------------------------------------------------------------------------

fn bare_ident(input: &str) -> Res<'_, &str> {
    take_while1(is_ident_char)(input)
}

/// Quoted run with doubled-quote escapes, plus backslash escapes for strings.
fn take_quoted(input: &str, quote: char, backslash: bool) -> Res<'_, String> {
    let mut chars = input.char_indices();
    match chars.next() {
        Some((_, c)) if c == quote => {}
        _ => return fail(input, ErrorKind::Char),
    }
    let mut out = String::new();
    while let Some((idx, c)) = chars.next() {
        if c == quote {
            let next = idx + c.len_utf8();
            if input[next..].starts_with(quote) {
                out.push(quote);
                chars.next();
                continue;
            }
            return Ok((&input[next..], out));
        }
        if backslash && c == '\\' {
            if let Some((_, escaped)) = chars.next() {
                out.push(match escaped {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    '0' => '\0',
                    'Z' => '\x1a',
                    other => other,
                });
            }
            continue;
        }
        out.push(c);
    }
    Err(nom::Err::Failure(Error::new(input, ErrorKind::Char)))
}

/// Table, column, index or charset name: bare, backticked or double-quoted.
pub(crate) fn identifier(input: &str) -> Res<'_, String> {
    alt((
        |i| take_quoted(i, '`', false),
        |i| take_quoted(i, '"', false),
        map(bare_ident, String::from),
    ))(input)
}

/// `'text'` or `"text"`, optionally with a charset introducer (`_utf8mb4'x'`).
pub(crate) fn string_literal(input: &str) -> Res<'_, String> {
    preceded(
        opt(pair(char('_'), bare_ident)),
        alt((
            |i| take_quoted(i, '\'', true),
            |i| take_quoted(i, '"', true),
        )),
    )(input)
}

fn number(input: &str) -> Res<'_, &str> {
    recognize(tuple((
        opt(one_of("+-")),
        alt((
            recognize(pair(digit1, opt(pair(char('.'), digit0)))),
            recognize(pair(char('.'), digit1)),
        )),
        opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
    )))(input)
}

/// `b'0101'`, `x'1f'` and `0x1f` literals, kept as written.
fn bit_or_hex(input: &str) -> Res<'_, &str> {
    alt((
        recognize(pair(one_of("bBxX"), |i| take_quoted(i, '\'', false))),
        recognize(pair(tag_no_case("0x"), take_while1(|c: char| c.is_ascii_hexdigit()))),
        recognize(pair(tag_no_case("0b"), take_while1(|c: char| c == '0' || c == '1'))),
    ))(input)
}

fn unsigned_int(input: &str) -> Res<'_, u32> {
    map_res(digit1, str::parse::<u32>)(input)
}

/// Parenthesised text with nesting and quotes; yields the inner text.
fn parens(input: &str) -> Res<'_, &str> {
    if !input.starts_with('(') {
        return fail(input, ErrorKind::Char);
    }
    let bytes = input.as_bytes();
    let mut depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Ok((&input[i + 1..], &input[1..i]));
                }
            }
            q @ (b'\'' | b'"' | b'`') => {
                let (rest, _) = take_quoted(&input[i..], q as char, q != b'`')?;
                i = input.len() - rest.len();
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    fail(input, ErrorKind::Char)
}

/// `name`, `name(args)` or a bare keyword such as `CURRENT_TIMESTAMP`.
fn function_call(input: &str) -> Res<'_, &str> {
    recognize(pair(bare_ident, opt(parens)))(input)
}

fn name_or_string(input: &str) -> Res<'_, String> {
    alt((string_literal, identifier))(input)
}

/// `db.table` or `table`.
fn qualified_name(input: &str) -> Res<'_, (Option<String>, String)> {
    let (input, first) = identifier(input)?;
    let (input, second) = opt(preceded(tuple((ws, char('.'), ws)), identifier))(input)?;
    Ok(match second {
        Some(table) => (input, (Some(first), table)),
        None => (input, (None, first)),
    })
}

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

fn type_param(input: &str) -> Res<'_, TypeParam> {
    delimited(
        ws,
        alt((
            map(unsigned_int, TypeParam::Number),
            map(string_literal, TypeParam::Text),
        )),
        ws,
    )(input)
}

#[derive(Clone)]
enum TypeModifier {
    Unsigned,
    Signed,
    Zerofill,
    Binary,
    Charset(String),
    Collate(String),
}

fn charset_clause(input: &str) -> Res<'_, String> {
    preceded(
        pair(alt((kw2("character", "set"), kw("charset"))), opt_eq),
        name_or_string,
    )(input)
}

fn collate_clause(input: &str) -> Res<'_, String> {
    preceded(pair(kw("collate"), opt_eq), name_or_string)(input)
}

fn type_modifier(input: &str) -> Res<'_, TypeModifier> {
    alt((
        value(TypeModifier::Unsigned, kw("unsigned")),
        value(TypeModifier::Signed, kw("signed")),
        value(TypeModifier::Zerofill, kw("zerofill")),
        value(TypeModifier::Binary, kw("binary")),
        map(charset_clause, TypeModifier::Charset),
        map(collate_clause, TypeModifier::Collate),
    ))(input)
}

pub(crate) fn data_type(input: &str) -> Res<'_, DataType> {
    let (input, word) = bare_ident(input)?;
    let (input, precision) = opt(preceded(ws1, kw("precision")))(input)?;
    let (input, params) = opt(preceded(
        ws,
        delimited(char('('), separated_list1(char(','), type_param), char(')')),
    ))(input)?;
    let (input, modifiers) = many0(preceded(ws1, type_modifier))(input)?;

    let mut name = word.to_ascii_lowercase();
    if precision.is_some() {
        name.push_str(" precision");
    }
    let mut dt = DataType {
        name,
        params: params.unwrap_or_default(),
        ..DataType::default()
    };
    for m in modifiers {
        match m {
            TypeModifier::Unsigned => dt.unsigned = true,
            TypeModifier::Signed => dt.unsigned = false,
            TypeModifier::Zerofill => {
                // ZEROFILL implies UNSIGNED.
                dt.zerofill = true;
                dt.unsigned = true;
            }
            TypeModifier::Binary => {}
            TypeModifier::Charset(c) => dt.charset = Some(c),
            TypeModifier::Collate(c) => dt.collation = Some(c),
        }
    }
    Ok((input, dt))
}

// ---------------------------------------------------------------------------
// Column attributes
// ---------------------------------------------------------------------------

fn default_value(input: &str) -> Res<'_, DefaultValue> {
    alt((
        value(DefaultValue::Null, kw("null")),
        map(string_literal, DefaultValue::Text),
        map(bit_or_hex, |s: &str| DefaultValue::Number(s.to_string())),
        map(number, |s: &str| DefaultValue::Number(s.to_string())),
        map(parens, |s: &str| DefaultValue::Expression(s.trim().to_string())),
        map(function_call, |s: &str| DefaultValue::Function(s.to_string())),
    ))(input)
}

fn reference_action(input: &str) -> Res<'_, &str> {
    alt((
        kw("restrict"),
        kw("cascade"),
        kw2("set", "null"),
        kw2("set", "default"),
        kw2("no", "action"),
    ))(input)
}

fn references(input: &str) -> Res<'_, (String, Vec<String>)> {
    let (input, _) = kw("references")(input)?;
    let (input, (_, table)) = preceded(ws, qualified_name)(input)?;
    let (input, columns) = opt(preceded(ws, key_parts))(input)?;
    let (input, _) = many0(preceded(
        ws1,
        alt((
            recognize(tuple((kw("on"), ws1, alt((kw("delete"), kw("update"))), ws1, reference_action))),
            recognize(tuple((kw("match"), ws1, alt((kw("full"), kw("partial"), kw("simple")))))),
        )),
    ))(input)?;
    let columns = columns
        .unwrap_or_default()
        .iter()
        .filter_map(|p| p.column().map(String::from))
        .collect();
    Ok((input, (table, columns)))
}

fn generated(input: &str) -> Res<'_, ColumnAttribute> {
    let (input, _) = opt(pair(kw2("generated", "always"), ws1))(input)?;
    let (input, _) = kw("as")(input)?;
    let (input, expr) = preceded(ws, parens)(input)?;
    let (input, storage) = opt(preceded(ws1, alt((kw("virtual"), kw("stored")))))(input)?;
    Ok((
        input,
        ColumnAttribute::Generated {
            expr: expr.trim().to_string(),
            stored: storage.is_some_and(|s| s.eq_ignore_ascii_case("stored")),
        },
    ))
}

fn passive_attribute(input: &str) -> Res<'_, ColumnAttribute> {
    map(
        alt((
            kw("visible"),
            kw("invisible"),
            recognize(pair(opt(pair(kw("not"), ws1)), kw("enforced"))),
            recognize(tuple((kw("column_format"), ws1, bare_ident))),
            recognize(tuple((kw("storage"), ws1, bare_ident))),
            recognize(tuple((kw("srid"), ws1, digit1))),
            recognize(tuple((kw("engine_attribute"), opt_eq, string_literal))),
        )),
        |s: &str| ColumnAttribute::Other(s.to_string()),
    )(input)
}

fn column_attribute(input: &str) -> Res<'_, ColumnAttribute> {
    alt((
        value(ColumnAttribute::NotNull, kw2("not", "null")),
        value(ColumnAttribute::Null, kw("null")),
        map(preceded(pair(kw("default"), ws), default_value), ColumnAttribute::Default),
        value(
            ColumnAttribute::AutoIncrement,
            alt((kw("auto_increment"), kw("autoincrement"))),
        ),
        value(ColumnAttribute::PrimaryKey, kw2("primary", "key")),
        value(
            ColumnAttribute::Unique,
            recognize(pair(kw("unique"), opt(pair(ws1, kw("key"))))),
        ),
        value(ColumnAttribute::PrimaryKey, kw("key")),
        map(preceded(pair(kw("comment"), ws), string_literal), ColumnAttribute::Comment),
        map(
            preceded(pair(kw2("on", "update"), ws1), function_call),
            |s: &str| ColumnAttribute::OnUpdate(s.to_string()),
        ),
        map(charset_clause, ColumnAttribute::Charset),
        map(collate_clause, ColumnAttribute::Collate),
        generated,
        map(references, |(table, columns)| ColumnAttribute::References { table, columns }),
        map(
            preceded(pair(kw("check"), ws), parens),
            |s: &str| ColumnAttribute::Check(s.trim().to_string()),
        ),
        passive_attribute,
    ))(input)
}

fn column_def(input: &str) -> Res<'_, ColumnDef> {
    let (input, name) = identifier(input)?;
    let (input, data_type) = preceded(ws, data_type)(input)?;
    let (input, attributes) = many0(preceded(ws, column_attribute))(input)?;
    Ok((
        input,
        ColumnDef {
            name,
            data_type,
            attributes,
        },
    ))
}

// ---------------------------------------------------------------------------
// Keys and constraints
// ---------------------------------------------------------------------------

fn key_part(input: &str) -> Res<'_, KeyPart> {
    let (input, part) = alt((
        map(parens, |s: &str| KeyPart::Expression(s.trim().to_string())),
        map(
            pair(
                identifier,
                opt(preceded(ws, delimited(char('('), delimited(ws, unsigned_int, ws), char(')')))),
            ),
            |(name, length)| KeyPart::Column { name, length },
        ),
    ))(input)?;
    let (input, _) = opt(preceded(ws1, alt((kw("asc"), kw("desc")))))(input)?;
    Ok((input, part))
}

fn key_parts(input: &str) -> Res<'_, Vec<KeyPart>> {
    delimited(
        char('('),
        separated_list1(comma, preceded(ws, key_part)),
        preceded(ws, char(')')),
    )(input)
}

fn index_type(input: &str) -> Res<'_, &str> {
    preceded(pair(kw("using"), ws1), alt((kw("btree"), kw("hash"), kw("rtree"))))(input)
}

fn index_options(input: &str) -> Res<'_, ()> {
    value(
        (),
        many0(preceded(
            ws,
            alt((
                index_type,
                recognize(pair(kw("comment"), preceded(ws, string_literal))),
                recognize(tuple((kw("key_block_size"), opt_eq, digit1))),
                recognize(tuple((kw2("with", "parser"), ws1, bare_ident))),
                recognize(tuple((kw("engine_attribute"), opt_eq, string_literal))),
                kw("visible"),
                kw("invisible"),
            )),
        )),
    )(input)
}

/// Optional index name that is not a keyword introducing the next clause.
fn index_name(input: &str) -> Res<'_, Option<String>> {
    opt(terminated(
        preceded(not(peek(alt((kw("using"), kw("key"), kw("index"))))), identifier),
        ws,
    ))(input)
}

/// Key columns with the optional `USING` before and options after.
fn key_body(input: &str) -> Res<'_, Vec<KeyPart>> {
    let (input, _) = opt(terminated(index_type, ws))(input)?;
    let (input, parts) = key_parts(input)?;
    let (input, _) = index_options(input)?;
    Ok((input, parts))
}

fn primary_key<'a>(input: &'a str, name: &Option<String>) -> Res<'a, TableConstraint> {
    let (input, _) = terminated(kw2("primary", "key"), ws)(input)?;
    let (input, columns) = key_body(input)?;
    Ok((
        input,
        TableConstraint::PrimaryKey {
            name: name.clone(),
            columns,
        },
    ))
}

fn unique_key<'a>(input: &'a str, name: &Option<String>) -> Res<'a, TableConstraint> {
    let (input, _) = kw("unique")(input)?;
    let (input, _) = opt(preceded(ws1, alt((kw("key"), kw("index")))))(input)?;
    let (input, _) = ws(input)?;
    let (input, index) = index_name(input)?;
    let (input, columns) = key_body(input)?;
    Ok((
        input,
        TableConstraint::Unique {
            name: index.or_else(|| name.clone()),
            columns,
        },
    ))
}

fn foreign_key<'a>(input: &'a str, name: &Option<String>) -> Res<'a, TableConstraint> {
    let (input, _) = terminated(kw2("foreign", "key"), ws)(input)?;
    let (input, index) = index_name(input)?;
    let (input, columns) = key_parts(input)?;
    let (input, (ref_table, ref_columns)) = preceded(ws, references)(input)?;
    Ok((
        input,
        TableConstraint::ForeignKey {
            name: index.or_else(|| name.clone()),
            columns,
            ref_table,
            ref_columns,
        },
    ))
}

fn check_constraint<'a>(input: &'a str, name: &Option<String>) -> Res<'a, TableConstraint> {
    let (input, expr) = preceded(pair(kw("check"), ws), parens)(input)?;
    let (input, _) = opt(preceded(
        ws1,
        recognize(pair(opt(pair(kw("not"), ws1)), kw("enforced"))),
    ))(input)?;
    Ok((
        input,
        TableConstraint::Check {
            name: name.clone(),
            expr: expr.trim().to_string(),
        },
    ))
}

fn constraint(input: &str) -> Res<'_, TableConstraint> {
    let (input, name) = opt(preceded(
        pair(kw("constraint"), ws),
        opt(terminated(
            preceded(
                not(peek(alt((kw("primary"), kw("unique"), kw("foreign"), kw("check"))))),
                identifier,
            ),
            ws,
        )),
    ))(input)?;
    let name = name.flatten();
    alt((
        |i| primary_key(i, &name),
        |i| unique_key(i, &name),
        |i| foreign_key(i, &name),
        |i| check_constraint(i, &name),
    ))(input)
}

fn plain_index(input: &str) -> Res<'_, TableConstraint> {
    let (input, kind) = alt((
        value(IndexKind::Fulltext, kw("fulltext")),
        value(IndexKind::Spatial, kw("spatial")),
        value(IndexKind::Plain, alt((kw("key"), kw("index")))),
    ))(input)?;
    let (input, _) = if kind == IndexKind::Plain {
        (input, None)
    } else {
        opt(preceded(ws1, alt((kw("key"), kw("index")))))(input)?
    };
    let (input, _) = ws(input)?;
    let (input, name) = index_name(input)?;
    let (input, columns) = key_body(input)?;
    Ok((input, TableConstraint::Index { kind, name, columns }))
}

enum Element {
    Column(ColumnDef),
    Constraint(TableConstraint),
}

fn element(input: &str) -> Res<'_, Element> {
    alt((
        map(constraint, Element::Constraint),
        map(plain_index, Element::Constraint),
        map(column_def, Element::Column),
    ))(input)
}

// ---------------------------------------------------------------------------
// Table options
// ---------------------------------------------------------------------------

#[derive(Clone)]
enum TableOption {
    Engine(String),
    Charset(String),
    Collate(String),
    Comment(String),
    Other(String, String),
    Partition,
}

fn option_value(input: &str) -> Res<'_, String> {
    alt((
        string_literal,
        map(number, String::from),
        map(parens, |s: &str| format!("({})", s)),
        identifier,
    ))(input)
}

fn table_option(input: &str) -> Res<'_, TableOption> {
    alt((
        map(preceded(pair(kw("engine"), opt_eq), name_or_string), TableOption::Engine),
        map(preceded(opt(pair(kw("default"), ws1)), charset_clause), TableOption::Charset),
        map(preceded(opt(pair(kw("default"), ws1)), collate_clause), TableOption::Collate),
        map(preceded(pair(kw("comment"), opt_eq), string_literal), TableOption::Comment),
        value(TableOption::Partition, tuple((kw2("partition", "by"), rest))),
        map(
            pair(
                alt((
                    map(kw2("data", "directory"), |_| "DATA DIRECTORY".to_string()),
                    map(kw2("index", "directory"), |_| "INDEX DIRECTORY".to_string()),
                    map(bare_ident, |s: &str| s.to_ascii_uppercase()),
                )),
                preceded(alt((value((), tuple((ws, char('='), ws))), value((), ws1))), option_value),
            ),
            |(name, value)| TableOption::Other(name, value),
        ),
    ))(input)
}

fn table_options(input: &str) -> Res<'_, TableOptions> {
    let (input, list) = many0(preceded(ws, terminated(table_option, opt(comma))))(input)?;
    let mut options = TableOptions::default();
    for option in list {
        match option {
            TableOption::Engine(e) => options.engine = Some(e),
            TableOption::Charset(c) => options.charset = Some(c),
            TableOption::Collate(c) => options.collation = Some(c),
            TableOption::Comment(c) => options.comment = Some(c),
            TableOption::Other(k, v) => options.others.push((k, v)),
            TableOption::Partition => {}
        }
    }
    Ok((input, options))
}

// ---------------------------------------------------------------------------
// Statement
// ---------------------------------------------------------------------------

/// `CREATE [TEMPORARY] TABLE`; yields whether the table is temporary.
pub(crate) fn create_table_head(input: &str) -> Res<'_, bool> {
    let (input, _) = terminated(kw("create"), ws1)(input)?;
    let (input, temporary) = opt(terminated(kw("temporary"), ws1))(input)?;
    let (input, _) = kw("table")(input)?;
    Ok((input, temporary.is_some()))
}

/// Parse one full `CREATE TABLE` statement.
pub(crate) fn create_table(input: &str) -> Res<'_, CreateTable> {
    let (input, temporary) = create_table_head(input)?;
    let (input, _) = ws1(input)?;
    let (input, if_not_exists) = opt(terminated(
        tuple((kw("if"), ws1, kw("not"), ws1, kw("exists"))),
        ws1,
    ))(input)?;
    let (input, (database, name)) = qualified_name(input)?;
    let (input, _) = pair(ws, char('('))(input)?;
    let (input, elements) = separated_list1(comma, preceded(ws, element))(input)?;
    let (input, _) = pair(ws, char(')'))(input)?;
    let (input, options) = table_options(input)?;
    let (input, _) = ws(input)?;

    let mut columns = Vec::new();
    let mut constraints = Vec::new();
    for element in elements {
        match element {
            Element::Column(c) => columns.push(c),
            Element::Constraint(c) => constraints.push(c),
        }
    }

    Ok((
        input,
        CreateTable {
            database,
            name,
            temporary,
            if_not_exists: if_not_exists.is_some(),
            columns,
            constraints,
            options,
            offset: 0,
        },
    ))
}
