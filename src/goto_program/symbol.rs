// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::{Expr, Type};
use crate::InternedString;

/// A symbol table entry: the name, type, source language and storage class of
/// an identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: InternedString,
    pub typ: Type,
    pub mode: Mode,
    pub is_static_lifetime: bool,
}

/// The source language a symbol was compiled from. The instrumentation uses
/// the mode of the function being checked to pick language-specific rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    C,
    Cpp,
    /// Object-reference languages: pointer validity collapses to null checks
    /// and modulus by zero is defined by the runtime.
    ManagedReference,
}

/// Constructors
impl Symbol {
    pub fn variable<T: Into<InternedString>>(name: T, typ: Type, mode: Mode) -> Self {
        Symbol { name: name.into(), typ, mode, is_static_lifetime: false }
    }

    pub fn static_variable<T: Into<InternedString>>(name: T, typ: Type, mode: Mode) -> Self {
        Symbol { name: name.into(), typ, mode, is_static_lifetime: true }
    }

    pub fn function<T: Into<InternedString>>(name: T, typ: Type, mode: Mode) -> Self {
        assert!(typ.is_code());
        Symbol { name: name.into(), typ, mode, is_static_lifetime: true }
    }
}

/// Getters
impl Symbol {
    /// A symbol expression referring to this symbol.
    pub fn to_expr(&self) -> Expr {
        Expr::symbol(self.name, self.typ.clone())
    }
}
