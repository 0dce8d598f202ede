//! Free-function builders for the fluent query DSL.
//!
//! Every builder here produces a plain AST node (`Expr`, `Condition`, ...);
//! none of them touch SQL text.

mod binary;
mod columns;
mod conditions;
mod ext;
mod json;
mod literals;
mod shortcuts;

pub use binary::{BinaryBuilder, binary};
pub use columns::{col, param, star};
pub use conditions::{
    between, contains, eq, gt, gte, ilike, is_in, is_null, is_not_null, like, lt, lte, ne,
    not_in, not_like, overlaps, regex, regex_i, similar_to,
};
pub use ext::ExprExt;
pub use json::{JsonBuilder, json, json_obj, json_path};
pub use literals::{bind, boolean, float, int, null, text};
pub use shortcuts::{all, and, and3, count_where, count_where_all, in_list, percentage, recent, recent_col};

// conditions.rs exposes `cond` too but it isn't part of the curated prelude surface.
pub use conditions::cond;

use crate::ast::{AggregateFunc, BinaryOp, Condition, Expr, IntervalUnit, Value};

/// Create a `COUNT(col)` aggregate.
pub fn count(column: &str) -> AggregateBuilder {
    AggregateBuilder {
        col: column.to_string(),
        func: AggregateFunc::Count,
        distinct: false,
        filter: None,
    }
}

/// Create a `COUNT(DISTINCT col)` aggregate.
pub fn count_distinct(column: &str) -> AggregateBuilder {
    AggregateBuilder {
        col: column.to_string(),
        func: AggregateFunc::Count,
        distinct: true,
        filter: None,
    }
}

/// `COUNT(*) FILTER (WHERE ...)` built from explicit conditions.
pub fn count_filter(conditions: Vec<Condition>) -> AggregateBuilder {
    AggregateBuilder {
        col: "*".to_string(),
        func: AggregateFunc::Count,
        distinct: false,
        filter: Some(conditions),
    }
}

pub fn sum(column: &str) -> AggregateBuilder {
    AggregateBuilder {
        col: column.to_string(),
        func: AggregateFunc::Sum,
        distinct: false,
        filter: None,
    }
}

pub fn avg(column: &str) -> AggregateBuilder {
    AggregateBuilder {
        col: column.to_string(),
        func: AggregateFunc::Avg,
        distinct: false,
        filter: None,
    }
}

pub fn max(column: &str) -> AggregateBuilder {
    AggregateBuilder {
        col: column.to_string(),
        func: AggregateFunc::Max,
        distinct: false,
        filter: None,
    }
}

pub fn min(column: &str) -> AggregateBuilder {
    AggregateBuilder {
        col: column.to_string(),
        func: AggregateFunc::Min,
        distinct: false,
        filter: None,
    }
}

/// Builder for an `Expr::Aggregate` node.
#[derive(Debug, Clone)]
pub struct AggregateBuilder {
    col: String,
    func: AggregateFunc,
    distinct: bool,
    filter: Option<Vec<Condition>>,
}

impl AggregateBuilder {
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    pub fn alias(self, name: &str) -> Expr {
        Expr::Aggregate {
            col: self.col,
            func: self.func,
            distinct: self.distinct,
            filter: self.filter,
            alias: Some(name.to_string()),
        }
    }

    pub fn build(self) -> Expr {
        Expr::Aggregate {
            col: self.col,
            func: self.func,
            distinct: self.distinct,
            filter: self.filter,
            alias: None,
        }
    }
}

impl From<AggregateBuilder> for Expr {
    fn from(b: AggregateBuilder) -> Self {
        b.build()
    }
}

/// `CAST(expr AS type)`.
pub fn cast(expr: impl Into<Expr>, target_type: &str) -> CastBuilder {
    CastBuilder {
        expr: expr.into(),
        target_type: target_type.to_string(),
        alias: None,
    }
}

#[derive(Debug, Clone)]
pub struct CastBuilder {
    expr: Expr,
    target_type: String,
    alias: Option<String>,
}

impl CastBuilder {
    pub fn alias(mut self, name: &str) -> Expr {
        self.alias = Some(name.to_string());
        self.build()
    }

    pub fn build(self) -> Expr {
        Expr::Cast {
            expr: Box::new(self.expr),
            target_type: self.target_type,
            alias: self.alias,
        }
    }
}

impl From<CastBuilder> for Expr {
    fn from(b: CastBuilder) -> Self {
        b.build()
    }
}

/// `NOW()`.
pub fn now() -> Expr {
    Expr::FunctionCall {
        name: "NOW".to_string(),
        args: vec![],
        alias: None,
    }
}

/// An `INTERVAL 'n unit'` literal.
pub fn interval(amount: i64, unit: IntervalUnit) -> Expr {
    Expr::Literal(Value::Interval { amount, unit })
}

/// Parse loose durations like `"24 hours"` or `"7 days"` into (amount, unit).
/// Falls back to days if the unit is unrecognized.
fn parse_duration(duration: &str) -> (i64, IntervalUnit) {
    let mut parts = duration.split_whitespace();
    let amount = parts.next().and_then(|s| s.parse::<i64>().ok()).unwrap_or(0);
    let unit = match parts.next().map(|s| s.trim_end_matches('s').to_lowercase()) {
        Some(ref u) if u == "second" => IntervalUnit::Second,
        Some(ref u) if u == "minute" => IntervalUnit::Minute,
        Some(ref u) if u == "hour" => IntervalUnit::Hour,
        Some(ref u) if u == "week" => IntervalUnit::Week,
        Some(ref u) if u == "month" => IntervalUnit::Month,
        Some(ref u) if u == "year" => IntervalUnit::Year,
        _ => IntervalUnit::Day,
    };
    (amount, unit)
}

/// `NOW() - INTERVAL 'duration'`, as an AST node (not a raw SQL string).
pub fn now_minus(duration: &str) -> Expr {
    let (amount, unit) = parse_duration(duration);
    Expr::Binary {
        left: Box::new(now()),
        op: BinaryOp::Sub,
        right: Box::new(Expr::Literal(Value::Interval { amount, unit })),
        alias: None,
    }
}

/// `NOW() + INTERVAL 'duration'`.
pub fn now_plus(duration: &str) -> Expr {
    let (amount, unit) = parse_duration(duration);
    Expr::Binary {
        left: Box::new(now()),
        op: BinaryOp::Add,
        right: Box::new(Expr::Literal(Value::Interval { amount, unit })),
        alias: None,
    }
}

/// Start a `CASE WHEN condition THEN then END` builder.
pub fn case_when(condition: Condition, then: Expr) -> CaseBuilder {
    CaseBuilder {
        when_clauses: vec![(condition, Box::new(then))],
        else_value: None,
        alias: None,
    }
}

#[derive(Debug, Clone)]
pub struct CaseBuilder {
    when_clauses: Vec<(Condition, Box<Expr>)>,
    else_value: Option<Box<Expr>>,
    alias: Option<String>,
}

impl CaseBuilder {
    pub fn when(mut self, condition: Condition, then: Expr) -> Self {
        self.when_clauses.push((condition, Box::new(then)));
        self
    }

    pub fn otherwise(mut self, expr: Expr) -> Self {
        self.else_value = Some(Box::new(expr));
        self
    }

    pub fn alias(mut self, name: &str) -> Expr {
        self.alias = Some(name.to_string());
        self.build()
    }

    pub fn build(self) -> Expr {
        Expr::Case {
            when_clauses: self.when_clauses,
            else_value: self.else_value,
            alias: self.alias,
        }
    }
}

impl From<CaseBuilder> for Expr {
    fn from(b: CaseBuilder) -> Self {
        b.build()
    }
}

/// `COALESCE(args...)`.
pub fn coalesce(args: Vec<Expr>) -> Expr {
    Expr::FunctionCall {
        name: "COALESCE".to_string(),
        args,
        alias: None,
    }
}

/// An arbitrary named function call: `func(args...)`.
pub fn func(name: &str, args: Vec<Expr>) -> Expr {
    Expr::FunctionCall {
        name: name.to_string(),
        args,
        alias: None,
    }
}

/// `NULLIF(a, b)`.
pub fn nullif(a: Expr, b: Expr) -> Expr {
    Expr::FunctionCall {
        name: "NULLIF".to_string(),
        args: vec![a, b],
        alias: None,
    }
}

/// `CONCAT(args...)`.
pub fn concat(args: Vec<Expr>) -> Expr {
    Expr::FunctionCall {
        name: "CONCAT".to_string(),
        args,
        alias: None,
    }
}

/// `REPLACE(expr, from, to)`.
pub fn replace(expr: Expr, from: &str, to: &str) -> Expr {
    Expr::FunctionCall {
        name: "REPLACE".to_string(),
        args: vec![
            expr,
            Expr::Literal(Value::String(from.to_string())),
            Expr::Literal(Value::String(to.to_string())),
        ],
        alias: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_alias() {
        let expr = count("id").alias("total");
        assert!(matches!(expr, Expr::Aggregate { alias: Some(a), .. } if a == "total"));
    }

    #[test]
    fn test_now_minus_is_ast_native() {
        let expr = now_minus("24 hours");
        match expr {
            Expr::Binary { op: BinaryOp::Sub, right, .. } => {
                assert!(matches!(*right, Expr::Literal(Value::Interval { amount: 24, unit: IntervalUnit::Hour })));
            }
            other => panic!("expected Binary Sub, got {:?}", other),
        }
    }

    #[test]
    fn test_case_when_otherwise() {
        let expr = case_when(super::eq("status", "active"), int_lit(1)).otherwise(int_lit(0)).build();
        assert!(matches!(expr, Expr::Case { else_value: Some(_), .. }));
    }

    fn int_lit(n: i64) -> Expr {
        Expr::Literal(Value::Int(n))
    }

    #[test]
    fn test_coalesce() {
        let expr = coalesce(vec![col("name"), text("Unknown")]);
        assert!(matches!(expr, Expr::FunctionCall { ref name, .. } if name == "COALESCE"));
    }
}
