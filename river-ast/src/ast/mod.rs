//! Core AST types: typed query commands, expressions, values, and operators.
//!
//! Nothing in this module renders SQL. It is a closed, serializable
//! representation of a query or schema command; `river-pg` owns the wire
//! encoding.

pub mod builders;
mod cages;
mod cmd;
mod conditions;
mod expr;
mod operators;
mod values;

pub use cages::{Cage, CageKind};
pub use cmd::{CTEDef, ConflictAction, OnConflict, Qail};
pub use conditions::Condition;
pub use expr::{
    BinaryOp, ColumnGeneration, Constraint, Expr, FrameBound, IndexDef, TableConstraint,
    WindowFrame,
};
pub use operators::{
    Action, AggregateFunc, GroupByMode, JoinKind, LockMode, LogicalOp, ModKind, Operator,
    OverridingKind, SampleMethod, SetOp, SortOrder,
};
pub use values::{IntervalUnit, Value};

use serde::{Deserialize, Serialize};

/// A JOIN clause attached to a command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Join {
    pub kind: JoinKind,
    pub table: String,
    /// ON conditions; absent for CROSS JOIN.
    pub on: Option<Vec<Condition>>,
    /// JOIN ... ON TRUE, used for correlated LATERAL joins with no predicate.
    pub on_true: bool,
}
