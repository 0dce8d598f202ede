use crate::ast::{
    Action, Cage, Condition, Expr, GroupByMode, IndexDef, Join, LockMode, OverridingKind,
    SampleMethod, SetOp, TableConstraint,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Qail {
    pub action: Action,
    pub table: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_alias: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<Expr>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub joins: Vec<Join>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cages: Vec<Cage>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub distinct: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_def: Option<IndexDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub table_constraints: Vec<TableConstraint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub set_ops: Vec<(SetOp, Box<Qail>)>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub having: Vec<Condition>,
    #[serde(default, skip_serializing_if = "GroupByMode::is_simple")]
    pub group_by_mode: GroupByMode,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ctes: Vec<CTEDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub distinct_on: Vec<Expr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returning: Option<Vec<Expr>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_conflict: Option<OnConflict>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_query: Option<Box<Qail>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub savepoint_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub from_tables: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub using_tables: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_mode: Option<LockMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetch: Option<(u64, bool)>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub default_values: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overriding: Option<OverridingKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample: Option<(SampleMethod, f64, Option<u64>)>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub only_table: bool,
    /// Verbatim SQL text for `Action::Raw` and the fallback facet other
    /// kinds (Explain's target, Truncate's options, …) borrow for rendering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_sql: Option<String>,
}

/// Helper for skip_serializing_if on bool fields
fn is_false(b: &bool) -> bool {
    !*b
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CTEDef {
    pub name: String,
    pub recursive: bool,
    pub columns: Vec<String>,
    pub base_query: Box<Qail>,
    pub recursive_query: Option<Box<Qail>>,
    pub source_table: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnConflict {
    pub columns: Vec<String>,
    pub action: ConflictAction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConflictAction {
    DoNothing,
    DoUpdate {
        assignments: Vec<(String, Expr)>,
    },
}

impl Default for OnConflict {
    fn default() -> Self {
        Self {
            columns: vec![],
            action: ConflictAction::DoNothing,
        }
    }
}

impl Default for Qail {
    fn default() -> Self {
        Self {
            action: Action::Get,
            table: String::new(),
            table_alias: None,
            columns: vec![],
            joins: vec![],
            cages: vec![],
            distinct: false,
            index_def: None,
            table_constraints: vec![],
            set_ops: vec![],
            having: vec![],
            group_by_mode: GroupByMode::Simple,
            ctes: vec![],
            distinct_on: vec![],
            returning: None,
            on_conflict: None,
            source_query: None,
            channel: None,
            payload: None,
            savepoint_name: None,
            from_tables: vec![],
            using_tables: vec![],
            lock_mode: None,
            fetch: None,
            default_values: false,
            overriding: None,
            sample: None,
            only_table: false,
            raw_sql: None,
        }
    }
}

// Submodules with builder methods
mod constructors;
mod cte;
mod query;

impl Qail {
    pub fn alias(mut self, name: impl Into<String>) -> Self {
        self.table_alias = Some(name.into());
        self
    }
}

impl std::fmt::Display for Qail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Use the Formatter from the fmt module for canonical output
        use crate::fmt::Formatter;
        match Formatter::new().format(self) {
            Ok(s) => write!(f, "{}", s),
            Err(_) => write!(f, "{:?}", self), // Fallback to Debug
        }
    }
}
