// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structural validation of counterexample traces.
//!
//! Counterexamples for managed-reference programs are rendered from
//! assignment steps, and the renderer only understands a fixed grammar of
//! left- and right-hand side shapes. This module checks every assignment and
//! declaration step of a trace against that grammar after the solver has
//! produced it; a violation means the rendered trace cannot be trusted.

use crate::goto_program::{Expr, ExprValue, SymbolTable};
use crate::simplify::simplify;
use std::fmt;
use thiserror::Error;
use tracing::info;

///////////////////////////////////////////////////////////////////////////////////////////////
/// Datatypes
///////////////////////////////////////////////////////////////////////////////////////////////

/// A counterexample trace: the steps the solver reported.
#[derive(Debug, Default)]
pub struct GotoTrace {
    pub steps: Vec<TraceStep>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Assignment,
    Decl,
    /// Any step that is not an assignment; carries no validated expressions.
    Other,
}

/// One step of a trace. Only assignment and declaration steps carry the full
/// left-hand side and its value.
#[derive(Debug)]
pub struct TraceStep {
    pub kind: StepKind,
    pub full_lhs: Option<Expr>,
    pub full_lhs_value: Option<Expr>,
}

impl TraceStep {
    pub fn assignment(full_lhs: Expr, full_lhs_value: Expr) -> Self {
        TraceStep { kind: StepKind::Assignment, full_lhs: Some(full_lhs), full_lhs_value: Some(full_lhs_value) }
    }

    pub fn decl(full_lhs: Expr, full_lhs_value: Expr) -> Self {
        TraceStep { kind: StepKind::Decl, full_lhs: Some(full_lhs), full_lhs_value: Some(full_lhs_value) }
    }
}

impl GotoTrace {
    pub fn add_step(&mut self, step: TraceStep) {
        self.steps.push(step);
    }
}

/// Which side of the assignment violated the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Lhs,
    Rhs,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Lhs => write!(f, "LHS"),
            Side::Rhs => write!(f, "RHS"),
        }
    }
}

/// The single error a failed validation raises: the offending side, what was
/// expected, and the pretty-printed expression.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("trace validation failed on {side}: {reason}: {expr}")]
pub struct TraceValidationError {
    pub side: Side,
    pub reason: String,
    pub expr: String,
}

fn violation(side: Side, reason: &str, expr: &Expr) -> TraceValidationError {
    TraceValidationError { side, reason: reason.to_string(), expr: expr.to_string() }
}

///////////////////////////////////////////////////////////////////////////////////////////////
/// Grammar predicates
///////////////////////////////////////////////////////////////////////////////////////////////

/// Strip any outer typecasts.
pub fn skip_typecast(e: &Expr) -> &Expr {
    match e.value() {
        ExprValue::Typecast(inner) => skip_typecast(inner),
        _ => e,
    }
}

/// A symbol with a non-empty identifier.
pub fn check_symbol_structure(e: &Expr) -> bool {
    e.symbol_identifier().map_or(false, |identifier| !identifier.is_empty())
}

/// Follow first operands through the lvalue-forming nodes until a symbol is
/// reached; any other intermediate node fails.
pub fn inner_symbol(e: &Expr) -> Option<&Expr> {
    let mut current = e;
    loop {
        match current.value() {
            ExprValue::Symbol { .. } => {
                return if check_symbol_structure(current) { Some(current) } else { None };
            }
            ExprValue::AddressOf(op) | ExprValue::Typecast(op) => current = op,
            ExprValue::Member { lhs, .. } => current = lhs,
            ExprValue::Index { array, .. } => current = array,
            ExprValue::ByteExtract { e, .. } => current = e,
            _ => return None,
        }
    }
}

/// A member access whose first operand nests down to a valid symbol.
pub fn check_member_structure(e: &Expr) -> bool {
    match e.value() {
        ExprValue::Member { .. } => inner_symbol(e).is_some(),
        _ => false,
    }
}

pub fn valid_lhs_expr(lhs: &Expr) -> bool {
    match lhs.value() {
        ExprValue::Member { .. }
        | ExprValue::Symbol { .. }
        | ExprValue::Index { .. }
        | ExprValue::ByteExtract { .. } => true,
        _ => false,
    }
}

pub fn valid_rhs_expr(rhs: &Expr) -> bool {
    match rhs.value() {
        ExprValue::Struct { .. }
        | ExprValue::Array { .. }
        | ExprValue::ArrayList { .. }
        | ExprValue::AddressOf(_)
        | ExprValue::Symbol { .. }
        | ExprValue::ByteExtract { .. } => true,
        _ => rhs.is_constant(),
    }
}

/// An index whose array is a valid symbol and whose index is a constant.
pub fn check_index_structure(e: &Expr) -> bool {
    match e.value() {
        ExprValue::Index { array, index } => {
            check_symbol_structure(array) && index.is_constant()
        }
        _ => false,
    }
}

/// A byte extract over a valid symbol whose simplified offset is a constant.
pub fn check_byte_extract_lhs(e: &Expr, st: &SymbolTable) -> bool {
    match e.value() {
        ExprValue::ByteExtract { e: op, offset } => {
            check_symbol_structure(op) && simplify(offset, st).is_constant()
        }
        _ => false,
    }
}

/// A struct literal whose first operand is a struct or constant and whose
/// remaining operands are constants.
pub fn check_struct_structure(e: &Expr) -> bool {
    let ExprValue::Struct { values } = e.value() else {
        return false;
    };
    let Some(first) = values.first() else {
        return false;
    };
    let first_ok = match first.value() {
        ExprValue::Struct { .. } => true,
        _ => first.is_constant(),
    };
    first_ok && values.iter().skip(1).all(|operand| operand.is_constant())
}

/// An address-of with a nested symbol.
pub fn check_address_structure(e: &Expr) -> bool {
    match e.value() {
        ExprValue::AddressOf(_) => inner_symbol(e).is_some(),
        _ => false,
    }
}

/// A constant that actually holds a value.
pub fn check_constant_structure(e: &Expr) -> bool {
    match e.value() {
        ExprValue::StringConstant { s } => !s.is_empty(),
        _ => e.is_constant(),
    }
}

///////////////////////////////////////////////////////////////////////////////////////////////
/// Validation
///////////////////////////////////////////////////////////////////////////////////////////////

fn check_lhs_assumptions(lhs: &Expr, st: &SymbolTable) -> Result<(), TraceValidationError> {
    if !valid_lhs_expr(lhs) {
        return Err(violation(Side::Lhs, "unsupported expression", lhs));
    }
    match lhs.value() {
        ExprValue::Member { .. } => {
            if !check_member_structure(lhs) {
                return Err(violation(
                    Side::Lhs,
                    "expecting a member with nested symbol operand",
                    lhs,
                ));
            }
        }
        ExprValue::Symbol { .. } => {
            if !check_symbol_structure(lhs) {
                return Err(violation(
                    Side::Lhs,
                    "expecting a symbol with non-empty identifier",
                    lhs,
                ));
            }
        }
        ExprValue::Index { .. } => {
            if !check_index_structure(lhs) {
                return Err(violation(
                    Side::Lhs,
                    "expecting an index expression with a symbol array and constant index",
                    lhs,
                ));
            }
        }
        ExprValue::ByteExtract { .. } => {
            if !check_byte_extract_lhs(lhs, st) {
                return Err(violation(
                    Side::Lhs,
                    "expecting a byte extract with a symbol operand and constant offset",
                    lhs,
                ));
            }
        }
        _ => {
            return Err(violation(Side::Lhs, "expression does not meet any trace assumptions", lhs));
        }
    }
    Ok(())
}

fn check_rhs_assumptions(rhs: &Expr, st: &SymbolTable) -> Result<(), TraceValidationError> {
    if !valid_rhs_expr(rhs) {
        return Err(violation(Side::Rhs, "unsupported expression", rhs));
    }
    match rhs.value() {
        ExprValue::AddressOf(_) => {
            if !check_address_structure(rhs) {
                return Err(violation(Side::Rhs, "expecting an address of with nested symbol", rhs));
            }
        }
        ExprValue::Symbol { .. } => {
            if !check_symbol_structure(rhs) {
                return Err(violation(
                    Side::Rhs,
                    "expecting a symbol with non-empty identifier",
                    rhs,
                ));
            }
        }
        ExprValue::Struct { .. } => {
            if !check_struct_structure(rhs) {
                return Err(violation(
                    Side::Rhs,
                    "expecting all non-base operands to be constants",
                    rhs,
                ));
            }
        }
        ExprValue::Array { .. } | ExprValue::ArrayList { .. } => {
            // no further check is required
        }
        ExprValue::ByteExtract { e, offset } => {
            if !simplify(e, st).is_constant() {
                return Err(violation(Side::Rhs, "expecting a byte extract with constant value", rhs));
            }
            if !simplify(offset, st).is_constant() {
                return Err(violation(Side::Rhs, "expecting a byte extract with constant index", rhs));
            }
        }
        _ if rhs.is_constant() => {
            if !check_constant_structure(rhs) {
                return Err(violation(
                    Side::Rhs,
                    "expecting a constant holding a non-empty value",
                    rhs,
                ));
            }
        }
        _ => {
            return Err(violation(Side::Rhs, "expression does not meet any trace assumptions", rhs));
        }
    }
    Ok(())
}

fn check_step_assumptions(step: &TraceStep, st: &SymbolTable) -> Result<(), TraceValidationError> {
    if step.kind == StepKind::Other {
        return Ok(());
    }
    let (Some(lhs), Some(value)) = (&step.full_lhs, &step.full_lhs_value) else {
        return Ok(());
    };
    check_lhs_assumptions(skip_typecast(lhs), st)?;
    check_rhs_assumptions(skip_typecast(value), st)
}

/// Check every assignment and declaration step of `trace` against the
/// renderer's structural expectations. Returns on the first violation.
pub fn check_trace_assumptions(
    trace: &GotoTrace,
    st: &SymbolTable,
) -> Result<(), TraceValidationError> {
    for step in &trace.steps {
        check_step_assumptions(step, st)?;
    }
    info!("Trace validation successful");
    Ok(())
}
