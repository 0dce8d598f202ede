//! Schema types: the in-memory representation of a `.qail` schema file.
//!
//! `Schema`/`Table`/`Column` model exactly what the `.qail` grammar can
//! express; `diff::diff_schemas` walks two of these to produce migration
//! commands, and [`to_qail_string`] serializes one back to text.

use super::types::ColumnType;
use std::collections::BTreeMap;
use std::fmt;

/// Foreign-key `ON DELETE`/`ON UPDATE` action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FkAction {
    #[default]
    NoAction,
    Cascade,
    Restrict,
    SetNull,
    SetDefault,
}

impl fmt::Display for FkAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FkAction::NoAction => write!(f, "NO ACTION"),
            FkAction::Cascade => write!(f, "CASCADE"),
            FkAction::Restrict => write!(f, "RESTRICT"),
            FkAction::SetNull => write!(f, "SET NULL"),
            FkAction::SetDefault => write!(f, "SET DEFAULT"),
        }
    }
}

/// Constraint deferrability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Deferrable {
    #[default]
    No,
    InitiallyImmediate,
    InitiallyDeferred,
}

/// A `REFERENCES target(column)` constraint attached to a column.
#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKey {
    pub table: String,
    pub column: String,
    pub on_delete: FkAction,
    pub on_update: FkAction,
    pub deferrable: Deferrable,
}

impl ForeignKey {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            on_delete: FkAction::NoAction,
            on_update: FkAction::NoAction,
            deferrable: Deferrable::No,
        }
    }
}

/// A `check(<expr>)` constraint body, stored verbatim (the differ treats it
/// as opaque text — only its presence/absence and literal text are compared).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckExpr(pub String);

impl fmt::Display for CheckExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A table-level (possibly multi-column) CHECK constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckConstraint {
    pub name: Option<String>,
    pub expr: CheckExpr,
}

/// A generated-column expression (`GENERATED ALWAYS AS (...) STORED`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    pub expr: String,
    pub stored: bool,
}

/// Index method (`USING <method>`), defaults to the B-tree access method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexMethod {
    #[default]
    Btree,
    Hash,
    Gin,
    Gist,
    Brin,
    SpGist,
}

impl fmt::Display for IndexMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexMethod::Btree => write!(f, "btree"),
            IndexMethod::Hash => write!(f, "hash"),
            IndexMethod::Gin => write!(f, "gin"),
            IndexMethod::Gist => write!(f, "gist"),
            IndexMethod::Brin => write!(f, "brin"),
            IndexMethod::SpGist => write!(f, "spgist"),
        }
    }
}

/// One column of a [`Table`].
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data_type: ColumnType,
    pub primary_key: bool,
    pub nullable: bool,
    pub unique: bool,
    pub default: Option<String>,
    pub foreign_key: Option<ForeignKey>,
    pub check: Option<CheckExpr>,
    pub generated: Option<Generated>,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: ColumnType) -> Self {
        let nullable = !data_type.requires_default_when_not_null();
        Self {
            name: name.into(),
            data_type,
            primary_key: false,
            nullable,
            unique: false,
            default: None,
            foreign_key: None,
            check: None,
            generated: None,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn default_value(mut self, expr: impl Into<String>) -> Self {
        self.default = Some(expr.into());
        self
    }

    pub fn references(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.foreign_key = Some(ForeignKey::new(table, column));
        self
    }

    pub fn check(mut self, expr: impl Into<String>) -> Self {
        self.check = Some(CheckExpr(expr.into()));
        self
    }
}

/// A table definition: name, columns, and table-level constraints.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    pub checks: Vec<CheckConstraint>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            checks: Vec::new(),
        }
    }

    pub fn column(mut self, col: Column) -> Self {
        self.columns.push(col);
        self
    }

    pub fn table_check(mut self, check: CheckConstraint) -> Self {
        self.checks.push(check);
        self
    }
}

/// An index definition outside the inline `unique` column constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct Index {
    pub name: String,
    pub table: String,
    pub columns: Vec<String>,
    pub unique: bool,
    pub method: Option<IndexMethod>,
}

/// An intent annotation the author attaches to a schema revision so the
/// differ can distinguish "rename" from "drop + add" and require explicit
/// confirmation before emitting a destructive drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationHint {
    /// `rename <table>.<col> -> <table>.<col>`
    Rename { from: String, to: String },
    /// `transform <expression> -> <table>.<col>`
    Transform { expression: String, target: String },
    /// `drop confirm <table>` or `drop confirm <table>.<col>`
    Drop { target: String, confirmed: bool },
}

/// A full schema snapshot: tables, standalone indexes, and migration hints.
///
/// Tables are kept in a `BTreeMap` (not a hash map) so that iterating the
/// schema — as the differ does — is deterministic across runs.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    pub tables: BTreeMap<String, Table>,
    pub indexes: Vec<Index>,
    pub migrations: Vec<MigrationHint>,
}

impl Schema {
    pub fn add_table(&mut self, table: Table) {
        self.tables.insert(table.name.clone(), table);
    }

    pub fn add_index(&mut self, index: Index) {
        self.indexes.push(index);
    }

    pub fn add_hint(&mut self, hint: MigrationHint) {
        self.migrations.push(hint);
    }
}

/// Render a [`Schema`] back into `.qail` schema text.
///
/// This is the inverse of [`super::parser::parse_qail`] for the subset of
/// the grammar the types here can represent; round-tripping is lossless for
/// anything the parser itself produced.
pub fn to_qail_string(schema: &Schema) -> String {
    let mut out = String::new();

    for table in schema.tables.values() {
        out.push_str(&format!("table {} {{\n", table.name));
        for col in &table.columns {
            out.push_str("  ");
            out.push_str(&col.name);
            out.push(' ');
            out.push_str(&column_type_token(&col.data_type));
            if col.primary_key {
                out.push_str(" primary_key");
            }
            if col.nullable == false && !col.primary_key {
                out.push_str(" not_null");
            }
            if col.unique {
                out.push_str(" unique");
            }
            if let Some(fk) = &col.foreign_key {
                out.push_str(&format!(" references {}({})", fk.table, fk.column));
            }
            if let Some(default) = &col.default {
                out.push_str(&format!(" default {}", default));
            }
            if let Some(check) = &col.check {
                out.push_str(&format!(" check({})", check.0));
            }
            out.push('\n');
        }
        out.push_str("}\n\n");
    }

    for idx in &schema.indexes {
        let unique = if idx.unique { " unique" } else { "" };
        out.push_str(&format!(
            "index {} on {} ({}){}\n",
            idx.name,
            idx.table,
            idx.columns.join(", "),
            unique
        ));
    }
    if !schema.indexes.is_empty() {
        out.push('\n');
    }

    for hint in &schema.migrations {
        match hint {
            MigrationHint::Rename { from, to } => {
                out.push_str(&format!("rename {} -> {}\n", from, to));
            }
            MigrationHint::Transform { expression, target } => {
                out.push_str(&format!("transform {} -> {}\n", expression, target));
            }
            MigrationHint::Drop { target, confirmed } => {
                if *confirmed {
                    out.push_str(&format!("drop confirm {}\n", target));
                } else {
                    out.push_str(&format!("drop {}\n", target));
                }
            }
        }
    }

    out
}

fn column_type_token(ty: &ColumnType) -> String {
    match ty {
        ColumnType::Array(inner) => format!("{}[]", column_type_token(inner)),
        ColumnType::Varchar(Some(len)) => format!("varchar({})", len),
        ColumnType::Decimal(Some((p, s))) => format!("decimal({},{})", p, s),
        other => other.name().to_lowercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_builder_not_null_by_default_for_serial() {
        let col = Column::new("id", ColumnType::Serial);
        assert!(!col.nullable);
    }

    #[test]
    fn test_column_builder_nullable_by_default() {
        let col = Column::new("bio", ColumnType::Text);
        assert!(col.nullable);
    }

    #[test]
    fn test_to_qail_string_round_trips_table_shape() {
        let mut schema = Schema::default();
        schema.add_table(
            Table::new("users")
                .column(Column::new("id", ColumnType::Serial).primary_key())
                .column(Column::new("email", ColumnType::Text).not_null().unique()),
        );
        let text = to_qail_string(&schema);
        assert!(text.contains("table users {"));
        assert!(text.contains("id serial primary_key"));
        assert!(text.contains("email text not_null unique"));
    }
}
