// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::goto_program::Expr;

/// The path condition under which a sub-expression is evaluated: a
/// conjunction of boolean expressions whose bottom is `true`.
///
/// Guards are passed by value through the expression walker, so each
/// recursive call sees a logical copy and sibling branches never observe
/// each other's assumptions.
#[derive(Debug, Clone, Default)]
pub struct Guard {
    conjuncts: Vec<Expr>,
}

impl Guard {
    /// The trivial guard `true`.
    pub fn new() -> Self {
        Guard::default()
    }

    /// Conjoin one more condition onto the guard.
    pub fn add(&mut self, condition: Expr) {
        assert!(condition.typ().is_bool());
        if condition.is_true() {
            return;
        }
        self.conjuncts.push(condition);
    }

    pub fn is_true(&self) -> bool {
        self.conjuncts.is_empty()
    }

    /// Materialize the guard as a single boolean expression.
    pub fn as_expr(&self) -> Expr {
        Expr::conjunction(self.conjuncts.clone())
    }
}
