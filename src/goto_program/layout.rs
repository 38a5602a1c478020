// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Byte-level layout of types: sizes, member offsets, and the object
//! descriptor decomposition used by the bounds check.
//!
//! Layout here is packed: structs are laid out component after component
//! with no padding, which is the layout the front-end produces for the
//! programs this pass consumes.

use super::{ArraySize, Expr, Type};
use crate::InternedString;
use num::bigint::BigInt;

/// The size of a type in bytes, when it is known at instrumentation time.
pub fn size_of_type(typ: &Type) -> Option<BigInt> {
    match typ {
        Type::Bool => Some(BigInt::from(1)),
        Type::Signedbv { width } | Type::Unsignedbv { width } => {
            Some(BigInt::from((width + 7) / 8))
        }
        Type::Float => Some(BigInt::from(4)),
        Type::Double => Some(BigInt::from(8)),
        Type::Pointer { .. } => Some(BigInt::from(8)),
        Type::Array { typ, size } => match size {
            ArraySize::Expr(size) => {
                let count = size.int_constant_value()?.clone();
                Some(size_of_type(typ)? * count)
            }
            ArraySize::Unknown | ArraySize::Infinite => None,
        },
        Type::Vector { typ, size } => Some(size_of_type(typ)? * BigInt::from(*size)),
        Type::Struct { components, .. } => {
            let mut total = BigInt::from(0);
            for component in components {
                total += size_of_type(&component.typ)?;
            }
            Some(total)
        }
        Type::Code { .. } | Type::Empty => None,
    }
}

/// The size of a type as a `size_t` expression. This is the size oracle the
/// pointer-validity check consumes.
pub fn size_of_expr(typ: &Type) -> Option<Expr> {
    size_of_type(typ).map(|size| Expr::int_constant(size, Type::size_t()))
}

/// The byte offset of a struct component, when every component before it has
/// a known size.
pub fn member_offset_bytes(typ: &Type, field: InternedString) -> Option<BigInt> {
    let components = typ.components()?;
    let mut offset = BigInt::from(0);
    for component in components {
        if component.name == field {
            return Some(offset);
        }
        offset += size_of_type(&component.typ)?;
    }
    None
}

/// The canonical decomposition of an lvalue expression: the object it lives
/// in and its byte offset within that object.
///
/// The decomposition walks through index and member chains, summing offsets,
/// and stops at anything else; in particular a dereference is itself a root.
/// The offset is `None` when some element size or member offset is unknown,
/// in which case the checks that need it are not emitted.
#[derive(Debug, Clone)]
pub struct ObjectDescriptor {
    pub root_object: Expr,
    pub offset: Option<Expr>,
}

impl ObjectDescriptor {
    pub fn build(expr: &Expr) -> ObjectDescriptor {
        use super::ExprValue;
        match expr.value() {
            ExprValue::Index { array, index } => {
                let inner = ObjectDescriptor::build(array);
                let element_size = array.typ().base_type().and_then(size_of_type);
                let offset = match (inner.offset, element_size) {
                    (Some(offset), Some(element_size)) => Some(
                        offset.plus(
                            index
                                .clone()
                                .cast_to(Type::ssize_t())
                                .mul(Expr::int_constant(element_size, Type::ssize_t())),
                        ),
                    ),
                    _ => None,
                };
                ObjectDescriptor { root_object: inner.root_object, offset }
            }
            ExprValue::Member { lhs, field } => {
                let inner = ObjectDescriptor::build(lhs);
                let member_offset = member_offset_bytes(lhs.typ(), *field);
                let offset = match (inner.offset, member_offset) {
                    (Some(offset), Some(member_offset)) => Some(
                        offset.plus(Expr::int_constant(member_offset, Type::ssize_t())),
                    ),
                    _ => None,
                };
                ObjectDescriptor { root_object: inner.root_object, offset }
            }
            _ => ObjectDescriptor {
                root_object: expr.clone(),
                offset: Some(Expr::int_constant(0, Type::ssize_t())),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goto_program::DatatypeComponent;

    fn pair_struct() -> Type {
        Type::struct_type(
            "pair",
            vec![
                DatatypeComponent { name: "first".into(), typ: Type::signed_int(32) },
                DatatypeComponent { name: "second".into(), typ: Type::signed_int(64) },
            ],
        )
    }

    #[test]
    fn sizes() {
        assert_eq!(size_of_type(&Type::signed_int(32)), Some(BigInt::from(4)));
        assert_eq!(size_of_type(&Type::Bool), Some(BigInt::from(1)));
        assert_eq!(size_of_type(&pair_struct()), Some(BigInt::from(12)));
        let array = Type::signed_int(8).array_of(Expr::int_constant(10, Type::size_t()));
        assert_eq!(size_of_type(&array), Some(BigInt::from(10)));
        assert_eq!(size_of_type(&Type::signed_int(8).array_of_unknown_size()), None);
    }

    #[test]
    fn member_offsets() {
        let s = pair_struct();
        assert_eq!(member_offset_bytes(&s, "first".into()), Some(BigInt::from(0)));
        assert_eq!(member_offset_bytes(&s, "second".into()), Some(BigInt::from(4)));
        assert_eq!(member_offset_bytes(&s, "third".into()), None);
    }

    #[test]
    fn descriptor_stops_at_dereference() {
        let elem = Type::signed_int(32);
        let array = elem.clone().array_of(Expr::int_constant(4, Type::size_t()));
        let p = Expr::symbol("p", array.to_pointer());
        let indexed = p.dereference().index(Expr::symbol("i", Type::signed_int(32)));
        let ode = ObjectDescriptor::build(&indexed);
        assert!(ode.offset.is_some());
        assert!(match ode.root_object.value() {
            crate::goto_program::ExprValue::Dereference(_) => true,
            _ => false,
        });
    }
}
