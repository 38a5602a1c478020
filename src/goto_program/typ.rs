// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::Expr;
use crate::InternedString;
use crate::utils::{max_int, min_int};
use num::bigint::BigInt;

///////////////////////////////////////////////////////////////////////////////////////////////
/// Datatypes
///////////////////////////////////////////////////////////////////////////////////////////////

/// The type of an expression in the goto representation.
///
/// Numeric bounds derive from the tag: bit-vector types know their width,
/// floating-point types are IEEE single or double precision.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    /// A boolean
    Bool,
    /// Two's-complement bit-vector of the given width
    Signedbv { width: u64 },
    /// Unsigned bit-vector of the given width
    Unsignedbv { width: u64 },
    /// IEEE single precision
    Float,
    /// IEEE double precision
    Double,
    /// `typ*`
    Pointer { typ: Box<Type> },
    /// `typ[size]` where the size may be unknown (incomplete linking) or infinite
    Array { typ: Box<Type>, size: ArraySize },
    /// Fixed-width SIMD-style vector
    Vector { typ: Box<Type>, size: u64 },
    /// A struct with named, ordered components
    Struct { tag: InternedString, components: Vec<DatatypeComponent> },
    /// A function type; `has_this` marks receiver methods of managed-reference code
    Code { parameters: Vec<Parameter>, return_type: Box<Type>, has_this: bool },
    /// `void`
    Empty,
}

/// The size of an array type. Unlike vectors, array sizes are expressions and
/// may be absent or infinite.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ArraySize {
    /// Linking did not complete; no size is available.
    Unknown,
    /// The array is conceptually unbounded.
    Infinite,
    /// The usual case: a size expression.
    Expr(Box<Expr>),
}

/// A struct field: name and type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DatatypeComponent {
    pub name: InternedString,
    pub typ: Type,
}

/// A function parameter.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Parameter {
    pub identifier: Option<InternedString>,
    pub typ: Type,
}

///////////////////////////////////////////////////////////////////////////////////////////////
/// Implementations
///////////////////////////////////////////////////////////////////////////////////////////////

/// Constructors
impl Type {
    pub fn bool() -> Self {
        Type::Bool
    }

    pub fn signed_int(width: u64) -> Self {
        assert!(width > 0);
        Type::Signedbv { width }
    }

    pub fn unsigned_int(width: u64) -> Self {
        assert!(width > 0);
        Type::Unsignedbv { width }
    }

    pub fn float() -> Self {
        Type::Float
    }

    pub fn double() -> Self {
        Type::Double
    }

    /// The type used for object sizes.
    pub fn size_t() -> Self {
        Type::unsigned_int(64)
    }

    /// The type used for pointer differences and byte offsets.
    pub fn ssize_t() -> Self {
        Type::signed_int(64)
    }

    pub fn empty() -> Self {
        Type::Empty
    }

    pub fn struct_type(tag: impl Into<InternedString>, components: Vec<DatatypeComponent>) -> Self {
        Type::Struct { tag: tag.into(), components }
    }

    pub fn code(parameters: Vec<Parameter>, return_type: Type) -> Self {
        Type::Code { parameters, return_type: Box::new(return_type), has_this: false }
    }

    pub fn code_with_this(parameters: Vec<Parameter>, return_type: Type) -> Self {
        Type::Code { parameters, return_type: Box::new(return_type), has_this: true }
    }

    /// `self*`
    pub fn to_pointer(self) -> Self {
        Type::Pointer { typ: Box::new(self) }
    }

    /// `self[size]`
    pub fn array_of(self, size: Expr) -> Self {
        Type::Array { typ: Box::new(self), size: ArraySize::Expr(Box::new(size)) }
    }

    pub fn array_of_unknown_size(self) -> Self {
        Type::Array { typ: Box::new(self), size: ArraySize::Unknown }
    }

    pub fn infinite_array_of(self) -> Self {
        Type::Array { typ: Box::new(self), size: ArraySize::Infinite }
    }

    pub fn vector_of(self, size: u64) -> Self {
        Type::Vector { typ: Box::new(self), size }
    }
}

/// Predicates
impl Type {
    pub fn is_bool(&self) -> bool {
        match self {
            Type::Bool => true,
            _ => false,
        }
    }

    pub fn is_signed(&self) -> bool {
        match self {
            Type::Signedbv { .. } => true,
            _ => false,
        }
    }

    pub fn is_unsigned(&self) -> bool {
        match self {
            Type::Unsignedbv { .. } => true,
            _ => false,
        }
    }

    /// Signed or unsigned bit-vector.
    pub fn is_bitvector(&self) -> bool {
        self.is_signed() || self.is_unsigned()
    }

    pub fn is_float(&self) -> bool {
        match self {
            Type::Float | Type::Double => true,
            _ => false,
        }
    }

    pub fn is_pointer(&self) -> bool {
        match self {
            Type::Pointer { .. } => true,
            _ => false,
        }
    }

    pub fn is_array(&self) -> bool {
        match self {
            Type::Array { .. } => true,
            _ => false,
        }
    }

    pub fn is_vector(&self) -> bool {
        match self {
            Type::Vector { .. } => true,
            _ => false,
        }
    }

    pub fn is_struct(&self) -> bool {
        match self {
            Type::Struct { .. } => true,
            _ => false,
        }
    }

    pub fn is_code(&self) -> bool {
        match self {
            Type::Code { .. } => true,
            _ => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Type::Empty => true,
            _ => false,
        }
    }
}

/// Getters
impl Type {
    /// Width in bits for bit-vector and floating-point types.
    pub fn width(&self) -> Option<u64> {
        match self {
            Type::Signedbv { width } | Type::Unsignedbv { width } => Some(*width),
            Type::Float => Some(32),
            Type::Double => Some(64),
            _ => None,
        }
    }

    /// The pointee, element, or component type of an indirection.
    pub fn base_type(&self) -> Option<&Type> {
        match self {
            Type::Pointer { typ } | Type::Array { typ, .. } | Type::Vector { typ, .. } => {
                Some(typ)
            }
            _ => None,
        }
    }

    pub fn array_size(&self) -> Option<&ArraySize> {
        match self {
            Type::Array { size, .. } => Some(size),
            _ => None,
        }
    }

    pub fn components(&self) -> Option<&Vec<DatatypeComponent>> {
        match self {
            Type::Struct { components, .. } => Some(components),
            _ => None,
        }
    }

    pub fn lookup_component(&self, name: InternedString) -> Option<&DatatypeComponent> {
        self.components().and_then(|cs| cs.iter().find(|c| c.name == name))
    }

    pub fn parameters(&self) -> Option<&Vec<Parameter>> {
        match self {
            Type::Code { parameters, .. } => Some(parameters),
            _ => None,
        }
    }

    pub fn return_type(&self) -> Option<&Type> {
        match self {
            Type::Code { return_type, .. } => Some(return_type),
            _ => None,
        }
    }

    /// Whether this is the type of a receiver method.
    pub fn has_this(&self) -> bool {
        match self {
            Type::Code { has_this, .. } => *has_this,
            _ => false,
        }
    }

    /// The largest value representable in this type, if it is a bit-vector.
    pub fn largest(&self) -> Option<BigInt> {
        match self {
            Type::Signedbv { width } => Some(max_int(*width, true)),
            Type::Unsignedbv { width } => Some(max_int(*width, false)),
            _ => None,
        }
    }

    /// The smallest value representable in this type, if it is a bit-vector.
    pub fn smallest(&self) -> Option<BigInt> {
        match self {
            Type::Signedbv { width } => Some(min_int(*width, true)),
            Type::Unsignedbv { width } => Some(min_int(*width, false)),
            _ => None,
        }
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Bool => write!(f, "bool"),
            Type::Signedbv { width } => write!(f, "signedbv[{width}]"),
            Type::Unsignedbv { width } => write!(f, "unsignedbv[{width}]"),
            Type::Float => write!(f, "float"),
            Type::Double => write!(f, "double"),
            Type::Pointer { typ } => write!(f, "{typ}*"),
            Type::Array { typ, size } => match size {
                ArraySize::Unknown => write!(f, "{typ}[]"),
                ArraySize::Infinite => write!(f, "{typ}[\u{221e}]"),
                ArraySize::Expr(e) => write!(f, "{typ}[{e}]"),
            },
            Type::Vector { typ, size } => write!(f, "vector[{size}] of {typ}"),
            Type::Struct { tag, .. } => write!(f, "struct {tag}"),
            Type::Code { .. } => write!(f, "code"),
            Type::Empty => write!(f, "void"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bitvector_bounds() {
        let t = Type::signed_int(32);
        assert_eq!(t.largest(), Some(BigInt::from(i32::MAX)));
        assert_eq!(t.smallest(), Some(BigInt::from(i32::MIN)));
        let u = Type::unsigned_int(16);
        assert_eq!(u.largest(), Some(BigInt::from(u16::MAX)));
        assert_eq!(u.smallest(), Some(BigInt::from(0)));
    }

    #[test]
    fn base_types() {
        let p = Type::signed_int(8).to_pointer();
        assert!(p.is_pointer());
        assert_eq!(p.base_type(), Some(&Type::signed_int(8)));
        assert_eq!(Type::double().width(), Some(64));
    }
}
