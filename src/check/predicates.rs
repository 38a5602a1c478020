// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer predicates, built from the algebra's pointer primitives and the
//! distinguished instrumentation symbols.

use crate::cprover;
use crate::goto_program::{Expr, Type};

fn void_pointer() -> Type {
    Type::empty().to_pointer()
}

fn sentinel(name: &str) -> Expr {
    Expr::symbol(name, void_pointer())
}

/// `p` is the null pointer.
pub fn null_pointer(p: &Expr) -> Expr {
    p.clone().same_object(Expr::null_pointer(p.typ().clone()))
}

/// `p` refers to a deallocated heap object.
pub fn deallocated(p: &Expr) -> Expr {
    p.clone().same_object(sentinel(cprover::DEALLOCATED))
}

/// `p` refers to a local whose lifetime has ended.
pub fn dead_object(p: &Expr) -> Expr {
    p.clone().same_object(sentinel(cprover::DEAD_OBJECT))
}

/// `p` refers to the most recent heap allocation.
pub fn malloc_object(p: &Expr) -> Expr {
    p.clone().same_object(sentinel(cprover::MALLOC_OBJECT))
}

/// The run-time size of the most recent heap allocation.
pub fn dynamic_size() -> Expr {
    Expr::symbol(cprover::MALLOC_SIZE, Type::size_t())
}

/// `p` was forged from an integer: it sits in the null object but is not
/// null itself.
pub fn integer_address(p: &Expr) -> Expr {
    let null = Expr::null_pointer(p.typ().clone());
    p.clone().same_object(null.clone()).and(p.clone().neq(null))
}

/// The pointer's offset precedes its object.
pub fn object_lower_bound(p: &Expr) -> Expr {
    p.clone().pointer_offset().lt(Expr::int_constant(0, Type::ssize_t()))
}

/// An access of `size` bytes at the pointer's offset runs past its object.
pub fn object_upper_bound(p: &Expr, size: &Expr) -> Expr {
    p.clone()
        .pointer_offset()
        .cast_to(Type::size_t())
        .plus(size.clone().cast_to(Type::size_t()))
        .gt(p.clone().object_size())
}

/// Lower bound for heap objects; offsets are relative to the allocation base
/// either way.
pub fn dynamic_object_lower_bound(p: &Expr) -> Expr {
    object_lower_bound(p)
}

/// An access of `size` bytes runs past the heap object's run-time size.
pub fn dynamic_object_upper_bound(p: &Expr, size: &Expr) -> Expr {
    p.clone()
        .pointer_offset()
        .cast_to(Type::size_t())
        .plus(size.clone().cast_to(Type::size_t()))
        .gt(dynamic_size())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predicates_are_boolean() {
        let p = Expr::symbol("p", Type::signed_int(32).to_pointer());
        let size = Expr::int_constant(4, Type::size_t());
        assert!(null_pointer(&p).typ().is_bool());
        assert!(deallocated(&p).typ().is_bool());
        assert!(dead_object(&p).typ().is_bool());
        assert!(malloc_object(&p).typ().is_bool());
        assert!(integer_address(&p).typ().is_bool());
        assert!(object_lower_bound(&p).typ().is_bool());
        assert!(object_upper_bound(&p, &size).typ().is_bool());
        assert!(dynamic_object_upper_bound(&p, &size).typ().is_bool());
    }

    #[test]
    fn null_test_mentions_the_pointer() {
        let p = Expr::symbol("p", Type::signed_int(32).to_pointer());
        assert!(null_pointer(&p).mentions_symbol("p".into()));
    }
}
