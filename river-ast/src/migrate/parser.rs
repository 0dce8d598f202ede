//! Parses `.qail` schema text into a [`Schema`].
//!
//! The grammar is whitespace-insensitive; line comments start with `--` or
//! `#`. A schema file is a sequence of statements:
//!
//! ```text
//! table users (
//!   id serial primary_key
//!   email text not_null unique
//!   manager_id int references users(id)
//! )
//!
//! index idx_users_email on users (email) unique
//!
//! rename users.handle -> users.username
//! transform lower(email) -> users.email
//! drop confirm legacy_sessions
//! ```

use super::schema::{
    CheckExpr, Column, Index, MigrationHint, Schema, Table,
};
use super::types::ColumnType;
use crate::error::{QailError, QailResult};
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_while1},
    character::complete::{char, multispace0, multispace1},
    combinator::{map, opt, recognize},
    multi::{many0, separated_list0, separated_list1},
    sequence::delimited,
};

/// Parse a complete `.qail` schema document.
pub fn parse_qail(input: &str) -> QailResult<Schema> {
    let cleaned = strip_comments(input);
    let mut schema = Schema::default();

    for (offset, stmt) in split_statements(&cleaned) {
        let stmt = stmt.trim();
        if stmt.is_empty() {
            continue;
        }
        if let Some(table) = parse_table_stmt(stmt).map_err(|e| parse_error(offset, &e))? {
            schema.add_table(table);
        } else if let Some(index) = parse_index_stmt(stmt).map_err(|e| parse_error(offset, &e))? {
            schema.add_index(index);
        } else if let Some(hint) = parse_hint_stmt(stmt).map_err(|e| parse_error(offset, &e))? {
            schema.add_hint(hint);
        } else {
            return Err(QailError::parse(
                offset,
                format!("unrecognized schema statement: '{}'", first_line(stmt)),
            ));
        }
    }

    Ok(schema)
}

fn parse_error(offset: usize, message: &str) -> QailError {
    QailError::parse(offset, message.to_string())
}

fn first_line(s: &str) -> &str {
    s.lines().next().unwrap_or(s)
}

/// Strip `--` and `#` line comments.
fn strip_comments(input: &str) -> String {
    input
        .lines()
        .map(|line| {
            let cut = line
                .find("--")
                .into_iter()
                .chain(line.find('#'))
                .min();
            match cut {
                Some(i) => &line[..i],
                None => line,
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Split the document into top-level statements: either a `table ... ( ... )`
/// block (brace/paren matched, so embedded commas/newlines don't split it)
/// or a single line.
fn split_statements(input: &str) -> Vec<(usize, String)> {
    let bytes = input.as_bytes();
    let mut stmts = Vec::new();
    let mut i = 0;
    let trimmed_start = |s: &str| s.len() - s.trim_start().len();

    while i < bytes.len() {
        // skip leading whitespace
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= bytes.len() {
            break;
        }
        let start = i;
        let rest = &input[i..];
        let is_table = rest.to_lowercase().starts_with("table");
        if is_table {
            // find opening bracket
            let Some(open_rel) = rest.find(['(', '{']) else {
                // malformed; take the rest of the line as-is so the error surfaces cleanly
                let end = rest.find('\n').map(|n| i + n).unwrap_or(bytes.len());
                stmts.push((start, input[start..end].to_string()));
                i = end;
                continue;
            };
            let open_abs = i + open_rel;
            let open_ch = bytes[open_abs] as char;
            let close_ch = if open_ch == '(' { ')' } else { '}' };
            let mut depth = 0usize;
            let mut j = open_abs;
            let end = loop {
                if j >= bytes.len() {
                    break bytes.len();
                }
                let c = bytes[j] as char;
                if c == open_ch {
                    depth += 1;
                } else if c == close_ch {
                    depth -= 1;
                    if depth == 0 {
                        break j + 1;
                    }
                }
                j += 1;
            };
            stmts.push((start + trimmed_start(&input[start..end]), input[start..end].to_string()));
            i = end;
        } else {
            let end = rest.find('\n').map(|n| i + n).unwrap_or(bytes.len());
            stmts.push((start, input[start..end].to_string()));
            i = end;
        }
    }

    stmts
}

fn parse_identifier(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '_')(input)
}

fn parse_dotted_path(input: &str) -> IResult<&str, &str> {
    recognize((parse_identifier, opt((char('.'), parse_identifier)))).parse(input)
}

fn ws(input: &str) -> IResult<&str, ()> {
    let (input, _) = multispace0(input)?;
    Ok((input, ()))
}

/// `table <ident> ( ... )` or `table <ident> { ... }`.
fn parse_table_stmt(stmt: &str) -> Result<Option<Table>, String> {
    let lower = stmt.to_lowercase();
    if !lower.starts_with("table") {
        return Ok(None);
    }

    let (rest, _) = tag_no_case::<_, _, nom::error::Error<&str>>("table")(stmt)
        .map_err(|e| format!("{:?}", e))?;
    let (rest, _) = multispace1::<_, nom::error::Error<&str>>(rest).map_err(|e| format!("{:?}", e))?;
    let (rest, name) = parse_identifier(rest).map_err(|e| format!("{:?}", e))?;
    let (rest, _) = ws(rest).map_err(|e: nom::Err<nom::error::Error<&str>>| format!("{:?}", e))?;

    let body = rest
        .trim()
        .strip_prefix('(')
        .or_else(|| rest.trim().strip_prefix('{'))
        .ok_or_else(|| format!("table '{}' is missing an opening ( or {{", name))?;
    let body = body
        .strip_suffix(')')
        .or_else(|| body.strip_suffix('}'))
        .unwrap_or(body);

    let mut table = Table::new(name);
    for col_text in split_columns(body) {
        let col_text = col_text.trim();
        if col_text.is_empty() {
            continue;
        }
        let col = parse_column_line(col_text)?;
        table = table.column(col);
    }
    Ok(Some(table))
}

/// Columns may be separated by `,` or newline.
fn split_columns(body: &str) -> Vec<String> {
    body.split(['\n', ','])
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_column_line(input: &str) -> Result<Column, String> {
    let (rest, name) =
        parse_identifier(input).map_err(|e: nom::Err<nom::error::Error<&str>>| format!("{:?}", e))?;
    let (rest, _) =
        multispace1::<_, nom::error::Error<&str>>(rest).map_err(|e| format!("{:?}", e))?;
    let (rest, (base_type, params, is_array)) =
        parse_type_token(rest).map_err(|e: nom::Err<nom::error::Error<&str>>| format!("{:?}", e))?;

    let data_type = build_column_type(base_type, params, is_array)?;
    let mut col = Column::new(name, data_type);

    let mut remaining = rest;
    loop {
        let (r, _) = ws(remaining).map_err(|e: nom::Err<nom::error::Error<&str>>| format!("{:?}", e))?;
        if r.is_empty() {
            break;
        }
        let (r2, applied) = apply_one_constraint(r, &mut col)?;
        if !applied {
            return Err(format!("unrecognized column constraint near '{}'", first_line(r)));
        }
        remaining = r2;
    }

    Ok(col)
}

/// `type`, `type(params)`, `type[]`, `type(params)[]`.
fn parse_type_token(input: &str) -> IResult<&str, (&str, Option<&str>, bool)> {
    let (input, base) = parse_identifier(input)?;
    let (input, params) = opt(delimited(
        char('('),
        recognize(separated_list1((multispace0, char(','), multispace0), take_while1(|c: char| c.is_alphanumeric()))),
        char(')'),
    ))
    .parse(input)?;
    let (input, array) = opt(tag("[]")).parse(input)?;
    Ok((input, (base, params, array.is_some())))
}

fn build_column_type(base: &str, params: Option<&str>, is_array: bool) -> Result<ColumnType, String> {
    use std::str::FromStr;
    let base_ty = match base.to_lowercase().as_str() {
        "varchar" => match params {
            Some(p) => ColumnType::Varchar(Some(
                p.parse::<u16>().map_err(|_| format!("invalid varchar length '{}'", p))?,
            )),
            None => ColumnType::Varchar(None),
        },
        "decimal" | "numeric" => match params {
            Some(p) => {
                let parts: Vec<&str> = p.split(',').map(|s| s.trim()).collect();
                if parts.len() == 2 {
                    let precision = parts[0].parse::<u8>().map_err(|_| "invalid decimal precision".to_string())?;
                    let scale = parts[1].parse::<u8>().map_err(|_| "invalid decimal scale".to_string())?;
                    ColumnType::Decimal(Some((precision, scale)))
                } else {
                    ColumnType::Decimal(None)
                }
            }
            None => ColumnType::Decimal(None),
        },
        other => ColumnType::from_str(other).map_err(|_| format!("unknown column type '{}'", other))?,
    };
    Ok(if is_array { ColumnType::Array(Box::new(base_ty)) } else { base_ty })
}

/// Consume one constraint keyword and apply it to `col`, returning the
/// unconsumed input and whether anything matched.
fn apply_one_constraint<'a>(input: &'a str, col: &mut Column) -> Result<(&'a str, bool), String> {
    let two_word = |a: &'static str, b: &'static str| {
        move |i: &'a str| -> IResult<&'a str, ()> {
            let (i, _) = tag_no_case(a).parse(i)?;
            let (i, _) = multispace1.parse(i)?;
            let (i, _) = tag_no_case(b).parse(i)?;
            Ok((i, ()))
        }
    };

    if let Ok((r, _)) = alt((tag_no_case::<_, _, nom::error::Error<&str>>("primary_key"), |i| two_word("primary", "key")(i).map(|(r, _)| (r, "primary_key")))).parse(input) {
        col.primary_key = true;
        col.nullable = false;
        return Ok((r, true));
    }
    if let Ok((r, _)) = alt((tag_no_case::<_, _, nom::error::Error<&str>>("not_null"), |i| two_word("not", "null")(i).map(|(r, _)| (r, "not_null")))).parse(input) {
        col.nullable = false;
        return Ok((r, true));
    }
    if let Ok((r, _)) = tag_no_case::<_, _, nom::error::Error<&str>>("unique").parse(input) {
        col.unique = true;
        return Ok((r, true));
    }
    if let Ok((r, target)) = map((tag_no_case::<_, _, nom::error::Error<&str>>("references"), multispace1, parse_dotted_path_with_cols), |(_, _, t)| t).parse(input) {
        let (table, column) = target;
        col.foreign_key = Some(super::schema::ForeignKey::new(table, column));
        return Ok((r, true));
    }
    if let Ok((r, expr)) = map(
        (tag_no_case::<_, _, nom::error::Error<&str>>("default"), multispace1, take_while1(|c: char| !c.is_whitespace())),
        |(_, _, e)| e,
    )
    .parse(input)
    {
        col.default = Some(expr.to_string());
        return Ok((r, true));
    }
    if let Ok((r, expr)) = delimited(
        (tag_no_case::<_, _, nom::error::Error<&str>>("check"), multispace0, char('(')),
        take_while1(|c: char| c != ')'),
        char(')'),
    )
    .parse(input)
    {
        col.check = Some(CheckExpr(expr.to_string()));
        return Ok((r, true));
    }

    Ok((input, false))
}

/// `references table(column)` or bare `references table`, defaulting column to `id`.
fn parse_dotted_path_with_cols(input: &str) -> IResult<&str, (String, String)> {
    let (input, table) = parse_identifier(input)?;
    let (input, col) = opt(delimited(char('('), parse_identifier, char(')'))).parse(input)?;
    Ok((input, (table.to_string(), col.unwrap_or("id").to_string())))
}

/// `index <name> on <table> (<cols>) [unique]`.
fn parse_index_stmt(stmt: &str) -> Result<Option<Index>, String> {
    if !stmt.to_lowercase().starts_with("index") {
        return Ok(None);
    }
    let parse = (
        tag_no_case::<_, _, nom::error::Error<&str>>("index"),
        multispace1,
        parse_identifier,
        multispace1,
        tag_no_case("on"),
        multispace1,
        parse_identifier,
        multispace0,
        delimited(
            char('('),
            separated_list1((multispace0, char(','), multispace0), parse_identifier),
            char(')'),
        ),
        multispace0,
        opt(tag_no_case("unique")),
    );
    let (_, (_, _, name, _, _, _, table, _, columns, _, unique)) =
        parse.parse(stmt).map_err(|e| format!("{:?}", e))?;

    Ok(Some(Index {
        name: name.to_string(),
        table: table.to_string(),
        columns: columns.into_iter().map(|s| s.to_string()).collect(),
        unique: unique.is_some(),
        method: None,
    }))
}

/// `rename a.b -> c.d`, `transform <expr> -> target`, `drop [confirm] target`.
fn parse_hint_stmt(stmt: &str) -> Result<Option<MigrationHint>, String> {
    let lower = stmt.to_lowercase();

    if lower.starts_with("rename") {
        let parse = (
            tag_no_case::<_, _, nom::error::Error<&str>>("rename"),
            multispace1,
            parse_dotted_path,
            multispace0,
            tag("->"),
            multispace0,
            parse_dotted_path,
        );
        let (_, (_, _, from, _, _, _, to)) = parse.parse(stmt).map_err(|e| format!("{:?}", e))?;
        return Ok(Some(MigrationHint::Rename {
            from: from.to_string(),
            to: to.to_string(),
        }));
    }

    if lower.starts_with("transform") {
        let Some(arrow) = stmt.find("->") else {
            return Err("transform statement missing '->'".to_string());
        };
        let expression = stmt["transform".len()..arrow].trim().to_string();
        let target = stmt[arrow + 2..].trim().to_string();
        return Ok(Some(MigrationHint::Transform { expression, target }));
    }

    if lower.starts_with("drop") {
        let rest = stmt["drop".len()..].trim();
        let (confirmed, target) = match rest.strip_prefix("confirm") {
            Some(t) => (true, t.trim()),
            None => (false, rest),
        };
        if target.is_empty() {
            return Err("drop statement missing a target".to_string());
        }
        return Ok(Some(MigrationHint::Drop {
            target: target.to_string(),
            confirmed,
        }));
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_table() {
        let schema = parse_qail(
            "table users (\n  id serial primary_key\n  email text not_null unique\n)",
        )
        .unwrap();
        let users = schema.tables.get("users").unwrap();
        assert_eq!(users.columns.len(), 2);
        assert!(users.columns[0].primary_key);
        assert!(users.columns[1].unique);
        assert!(!users.columns[1].nullable);
    }

    #[test]
    fn test_parse_comma_separated_columns() {
        let schema = parse_qail("table t { a int, b text }").unwrap();
        assert_eq!(schema.tables.get("t").unwrap().columns.len(), 2);
    }

    #[test]
    fn test_parse_references_and_default() {
        let schema = parse_qail(
            "table posts (\n  id serial primary_key\n  author_id int references users(id)\n  status text default 'draft'\n)",
        )
        .unwrap();
        let posts = schema.tables.get("posts").unwrap();
        let author = &posts.columns[1];
        assert_eq!(author.foreign_key.as_ref().unwrap().table, "users");
        assert_eq!(posts.columns[2].default.as_deref(), Some("'draft'"));
    }

    #[test]
    fn test_parse_array_and_varchar_params() {
        let schema = parse_qail("table t (\n  tags text[]\n  code varchar(12)\n)").unwrap();
        let t = schema.tables.get("t").unwrap();
        assert!(matches!(t.columns[0].data_type, ColumnType::Array(_)));
        assert_eq!(t.columns[1].data_type, ColumnType::Varchar(Some(12)));
    }

    #[test]
    fn test_parse_index_statement() {
        let schema = parse_qail("table t ( id serial primary_key )\n\nindex idx_t_id on t (id) unique").unwrap();
        assert_eq!(schema.indexes.len(), 1);
        assert!(schema.indexes[0].unique);
    }

    #[test]
    fn test_parse_rename_hint() {
        let schema = parse_qail("rename users.handle -> users.username").unwrap();
        assert!(matches!(
            schema.migrations[0],
            MigrationHint::Rename { .. }
        ));
    }

    #[test]
    fn test_parse_drop_confirm_hint() {
        let schema = parse_qail("drop confirm legacy_sessions").unwrap();
        match &schema.migrations[0] {
            MigrationHint::Drop { target, confirmed } => {
                assert_eq!(target, "legacy_sessions");
                assert!(confirmed);
            }
            other => panic!("expected Drop hint, got {:?}", other),
        }
    }

    #[test]
    fn test_comments_are_stripped() {
        let schema = parse_qail(
            "-- a comment\ntable t (\n  id serial primary_key -- inline\n)\n# trailing comment",
        )
        .unwrap();
        assert_eq!(schema.tables.get("t").unwrap().columns.len(), 1);
    }
}
