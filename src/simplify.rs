// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A small, idempotent expression simplifier.
//!
//! This is the simplification service consumed by the assertion emitter and
//! the trace validator. It folds constants bottom-up and nothing more: the
//! goal is to recognise trivially-true obligations, not to normalise
//! programs.

use crate::NumUtils;
use crate::goto_program::{BinaryOperator, Expr, ExprValue, SymbolTable, Type, UnaryOperator};
use num::bigint::BigInt;

/// Simplify `expr` bottom-up. Running the result through `simplify` again is
/// the identity.
pub fn simplify(expr: &Expr, st: &SymbolTable) -> Expr {
    let rebuilt = expr.map_sub_exprs(&mut |sub| simplify(sub, st));
    fold(rebuilt)
}

fn fold(expr: Expr) -> Expr {
    match expr.value() {
        ExprValue::UnOp { op: UnaryOperator::Not, e } => {
            if let ExprValue::BoolConstant(b) = e.value() {
                return Expr::bool_constant(!b);
            }
            if let ExprValue::UnOp { op: UnaryOperator::Not, e: inner } = e.value() {
                return inner.clone();
            }
        }
        ExprValue::UnOp { op: UnaryOperator::UnaryMinus, e } => {
            if let (Some(value), Some(width)) = (e.int_constant_value(), e.typ().width()) {
                let negated = -value.clone();
                if negated.fits_in_bits(width, e.typ().is_signed()) {
                    return Expr::int_constant(negated, expr.typ().clone());
                }
            }
        }
        ExprValue::BinOp { op, lhs, rhs } => {
            if let Some(folded) = fold_binop(*op, lhs, rhs) {
                return folded;
            }
        }
        ExprValue::If { c, t, e } => {
            if c.is_true() {
                return t.clone();
            }
            if c.is_false() {
                return e.clone();
            }
        }
        ExprValue::Typecast(e) => {
            if let (Some(value), Some(width)) = (e.int_constant_value(), expr.typ().width()) {
                if expr.typ().is_bitvector() && value.fits_in_bits(width, expr.typ().is_signed())
                {
                    return Expr::int_constant(value.clone(), expr.typ().clone());
                }
            }
        }
        _ => {}
    }
    expr
}

fn fold_binop(op: BinaryOperator, lhs: &Expr, rhs: &Expr) -> Option<Expr> {
    use BinaryOperator::*;
    match op {
        And => match () {
            _ if lhs.is_true() => Some(rhs.clone()),
            _ if rhs.is_true() => Some(lhs.clone()),
            _ if lhs.is_false() || rhs.is_false() => Some(Expr::bool_false()),
            _ => None,
        },
        Or => match () {
            _ if lhs.is_false() => Some(rhs.clone()),
            _ if rhs.is_false() => Some(lhs.clone()),
            _ if lhs.is_true() || rhs.is_true() => Some(Expr::bool_true()),
            _ => None,
        },
        Implies => match () {
            _ if lhs.is_true() => Some(rhs.clone()),
            _ if lhs.is_false() || rhs.is_true() => Some(Expr::bool_true()),
            _ => None,
        },
        Equal | Notequal | Lt | Le | Gt | Ge => fold_relation(op, lhs, rhs),
        Plus | Minus | Mult => fold_arithmetic(op, lhs, rhs),
        IeeeFloatEqual => fold_float_equal(lhs, rhs),
        _ => None,
    }
}

fn fold_relation(op: BinaryOperator, lhs: &Expr, rhs: &Expr) -> Option<Expr> {
    use BinaryOperator::*;
    if let (Some(a), Some(b)) = (lhs.int_constant_value(), rhs.int_constant_value()) {
        let result = match op {
            Equal => a == b,
            Notequal => a != b,
            Lt => a < b,
            Le => a <= b,
            Gt => a > b,
            Ge => a >= b,
            _ => unreachable!(),
        };
        return Some(Expr::bool_constant(result));
    }
    // an unsigned value is never below zero
    if lhs.typ().is_unsigned() && rhs.int_constant_value() == Some(&BigInt::from(0)) {
        match op {
            Ge => return Some(Expr::bool_true()),
            Lt => return Some(Expr::bool_false()),
            _ => {}
        }
    }
    None
}

fn fold_arithmetic(op: BinaryOperator, lhs: &Expr, rhs: &Expr) -> Option<Expr> {
    use BinaryOperator::*;
    let typ = lhs.typ();
    if !typ.is_bitvector() || typ != rhs.typ() {
        return None;
    }
    let (a, b) = (lhs.int_constant_value()?, rhs.int_constant_value()?);
    let result = match op {
        Plus => a + b,
        Minus => a - b,
        Mult => a * b,
        _ => unreachable!(),
    };
    if result.fits_in_bits(typ.width()?, typ.is_signed()) {
        Some(Expr::int_constant(result, typ.clone()))
    } else {
        None
    }
}

fn fold_float_equal(lhs: &Expr, rhs: &Expr) -> Option<Expr> {
    let as_f64 = |e: &Expr| match e.value() {
        ExprValue::FloatConstant(bits) => Some(f32::from_bits(*bits) as f64),
        ExprValue::DoubleConstant(bits) => Some(f64::from_bits(*bits)),
        _ => None,
    };
    let (a, b) = (as_f64(lhs)?, as_f64(rhs)?);
    if a.is_nan() || b.is_nan() {
        return Some(Expr::bool_false());
    }
    Some(Expr::bool_constant(a == b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int32(i: i64) -> Expr {
        Expr::int_constant(i, Type::signed_int(32))
    }

    #[test]
    fn folds_constant_relations() {
        let st = SymbolTable::new();
        assert!(simplify(&int32(31).lt(int32(32)), &st).is_true());
        assert!(simplify(&int32(3).ge(int32(10)), &st).is_false());
    }

    #[test]
    fn folds_boolean_structure() {
        let st = SymbolTable::new();
        let x = Expr::symbol("x", Type::Bool);
        assert_eq!(simplify(&Expr::bool_true().and(x.clone()), &st), x);
        assert!(simplify(&Expr::bool_false().implies(x.clone()), &st).is_true());
        assert_eq!(simplify(&Expr::bool_false().or(x.clone()), &st), x);
    }

    #[test]
    fn folds_nested_expressions() {
        let st = SymbolTable::new();
        // (1 + 2) < 4 && x  ~~>  x
        let x = Expr::symbol("x", Type::Bool);
        let e = int32(1).plus(int32(2)).lt(int32(4)).and(x.clone());
        assert_eq!(simplify(&e, &st), x);
    }

    #[test]
    fn unsigned_lower_bound_is_trivial() {
        let st = SymbolTable::new();
        let u = Expr::symbol("u", Type::unsigned_int(32));
        let zero = Expr::int_constant(0, Type::unsigned_int(32));
        assert!(simplify(&u.ge(zero), &st).is_true());
    }

    #[test]
    fn idempotent() {
        let st = SymbolTable::new();
        let x = Expr::symbol("x", Type::Bool);
        let e = Expr::bool_true().and(int32(1).lt(int32(2)).and(x));
        let once = simplify(&e, &st);
        let twice = simplify(&once, &st);
        assert_eq!(once, twice);
    }

    #[test]
    fn folds_typecast_of_constant() {
        let st = SymbolTable::new();
        let cast = int32(7).cast_to(Type::signed_int(64));
        let folded = simplify(&cast, &st);
        assert_eq!(folded, Expr::int_constant(7, Type::signed_int(64)));
    }
}
