// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::{Location, Type};
use crate::InternedString;
use num::bigint::BigInt;
use std::fmt;
use std::hash::{Hash, Hasher};

///////////////////////////////////////////////////////////////////////////////////////////////
/// Datatypes
///////////////////////////////////////////////////////////////////////////////////////////////

/// An `Expr` represents a typed expression tree.
///
/// The fields are kept private; expressions are created using the
/// constructors and the fluent operator helpers, which keep them well formed.
/// Structural equality and hashing deliberately ignore the source location,
/// so that two obligations with the same shape collapse in the assertion
/// cache regardless of where they were emitted.
#[derive(Debug, Clone)]
pub struct Expr {
    value: Box<ExprValue>,
    typ: Type,
    location: Location,
    /// `Some(false)` suppresses bounds checking of an index expression.
    bounds_check: Option<bool>,
}

/// The different kinds of values an expression can have.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExprValue {
    /// `&e`
    AddressOf(Expr),
    /// `{ elem0, elem1, ... }`
    Array {
        elems: Vec<Expr>,
    },
    /// An array built from a function of the index
    ArrayComprehension {
        variable: Expr,
        body: Expr,
    },
    /// A flat list of index/value pairs describing an array
    ArrayList {
        elems: Vec<Expr>,
    },
    BinOp {
        op: BinaryOperator,
        lhs: Expr,
        rhs: Expr,
    },
    BoolConstant(bool),
    /// Reinterpretation of bytes at an offset, little endian
    ByteExtract {
        e: Expr,
        offset: Expr,
    },
    /// `*e`
    Dereference(Expr),
    /// Stored as the IEEE bit pattern so expressions stay `Eq + Hash`
    DoubleConstant(u64),
    Exists {
        variable: Expr,
        body: Expr,
    },
    /// Stored as the IEEE bit pattern so expressions stay `Eq + Hash`
    FloatConstant(u32),
    Forall {
        variable: Expr,
        body: Expr,
    },
    /// `c ? t : e`
    If {
        c: Expr,
        t: Expr,
        e: Expr,
    },
    /// `array[index]`
    Index {
        array: Expr,
        index: Expr,
    },
    IntConstant(BigInt),
    /// `lhs.field`
    Member {
        lhs: Expr,
        field: InternedString,
    },
    /// An unconstrained value of the expression's type
    Nondet,
    /// A pointer with a known numeric value; `0` is the null pointer
    PointerConstant(u64),
    /// `r_ok(ptr, size)`: the region is readable
    ReadOk {
        ptr: Expr,
        size: Expr,
    },
    StringConstant {
        s: InternedString,
    },
    /// `{ field_value0, field_value1, ... }` in component order
    Struct {
        values: Vec<Expr>,
    },
    Symbol {
        identifier: InternedString,
    },
    /// `(typ) self`
    Typecast(Expr),
    UnOp {
        op: UnaryOperator,
        e: Expr,
    },
    /// `w_ok(ptr, size)`: the region is writable
    WriteOk {
        ptr: Expr,
        size: Expr,
    },
}

/// Binary operators. The arithmetic operators are strictly binary; n-ary
/// sums in source programs arrive as left-associated trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    And,
    Ashr,
    Div,
    Equal,
    Ge,
    Gt,
    IeeeFloatEqual,
    Implies,
    Le,
    Lshr,
    Lt,
    Minus,
    Mod,
    Mult,
    Notequal,
    Or,
    OverflowMinus,
    OverflowMult,
    OverflowPlus,
    Plus,
    Shl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    IsDynamicObject,
    IsInfinite,
    IsInvalidPointer,
    IsNan,
    Not,
    ObjectSize,
    PointerObject,
    PointerOffset,
    UnaryMinus,
}

///////////////////////////////////////////////////////////////////////////////////////////////
/// Implementations
///////////////////////////////////////////////////////////////////////////////////////////////

// Location and the annotation are provenance, not shape: equality and
// hashing only look at the value and the type.
impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
            && self.typ == other.typ
            && self.bounds_check == other.bounds_check
    }
}

impl Eq for Expr {}

impl Hash for Expr {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
        self.typ.hash(state);
        self.bounds_check.hash(state);
    }
}

macro_rules! expr {
    ($value:expr, $typ:expr) => {{
        let typ = $typ;
        let value = Box::new($value);
        Expr { value, typ, location: Location::None, bounds_check: None }
    }};
}

/// Getters
impl Expr {
    pub fn value(&self) -> &ExprValue {
        &self.value
    }

    pub fn typ(&self) -> &Type {
        &self.typ
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn bounds_check(&self) -> Option<bool> {
        self.bounds_check
    }
}

/// Fluent builders
impl Expr {
    pub fn with_location(mut self, loc: Location) -> Self {
        self.location = loc;
        self
    }

    pub fn with_bounds_check(mut self, enabled: bool) -> Self {
        self.bounds_check = Some(enabled);
        self
    }
}

/// Constructors
impl Expr {
    pub fn symbol<T: Into<InternedString>>(identifier: T, typ: Type) -> Self {
        expr!(ExprValue::Symbol { identifier: identifier.into() }, typ)
    }

    pub fn int_constant<T: Into<BigInt>>(i: T, typ: Type) -> Self {
        assert!(typ.is_bitvector(), "int_constant expects a bit-vector type, got {typ}");
        expr!(ExprValue::IntConstant(i.into()), typ)
    }

    pub fn bool_constant(c: bool) -> Self {
        expr!(ExprValue::BoolConstant(c), Type::Bool)
    }

    pub fn bool_true() -> Self {
        Expr::bool_constant(true)
    }

    pub fn bool_false() -> Self {
        Expr::bool_constant(false)
    }

    pub fn float_constant(c: f32) -> Self {
        expr!(ExprValue::FloatConstant(c.to_bits()), Type::Float)
    }

    pub fn double_constant(c: f64) -> Self {
        expr!(ExprValue::DoubleConstant(c.to_bits()), Type::Double)
    }

    /// `+∞` of the given floating-point type.
    pub fn plus_infinity(typ: &Type) -> Self {
        match typ {
            Type::Float => Expr::float_constant(f32::INFINITY),
            Type::Double => Expr::double_constant(f64::INFINITY),
            _ => unreachable!("infinity requires a floating-point type, got {typ}"),
        }
    }

    /// `-∞` of the given floating-point type.
    pub fn minus_infinity(typ: &Type) -> Self {
        match typ {
            Type::Float => Expr::float_constant(f32::NEG_INFINITY),
            Type::Double => Expr::double_constant(f64::NEG_INFINITY),
            _ => unreachable!("infinity requires a floating-point type, got {typ}"),
        }
    }

    /// The zero value of a numeric or pointer type.
    pub fn zero(typ: Type) -> Self {
        match &typ {
            Type::Float => Expr::float_constant(0.0),
            Type::Double => Expr::double_constant(0.0),
            Type::Pointer { .. } => Expr::null_pointer(typ),
            _ => Expr::int_constant(0, typ),
        }
    }

    pub fn null_pointer(typ: Type) -> Self {
        assert!(typ.is_pointer(), "null pointer requires a pointer type, got {typ}");
        expr!(ExprValue::PointerConstant(0), typ)
    }

    pub fn nondet(typ: Type) -> Self {
        expr!(ExprValue::Nondet, typ)
    }

    pub fn string_constant<T: Into<InternedString>>(s: T) -> Self {
        expr!(
            ExprValue::StringConstant { s: s.into() },
            Type::unsigned_int(8).array_of_unknown_size()
        )
    }

    pub fn struct_expr(values: Vec<Expr>, typ: Type) -> Self {
        assert!(typ.is_struct(), "struct literal requires a struct type, got {typ}");
        expr!(ExprValue::Struct { values }, typ)
    }

    pub fn array_expr(elems: Vec<Expr>, typ: Type) -> Self {
        assert!(typ.is_array(), "array literal requires an array type, got {typ}");
        expr!(ExprValue::Array { elems }, typ)
    }

    pub fn array_list_expr(elems: Vec<Expr>, typ: Type) -> Self {
        assert!(typ.is_array(), "array list requires an array type, got {typ}");
        expr!(ExprValue::ArrayList { elems }, typ)
    }

    pub fn byte_extract(e: Expr, offset: Expr, typ: Type) -> Self {
        expr!(ExprValue::ByteExtract { e, offset }, typ)
    }

    pub fn forall(variable: Expr, body: Expr) -> Self {
        assert!(body.typ.is_bool());
        expr!(ExprValue::Forall { variable, body }, Type::Bool)
    }

    pub fn exists(variable: Expr, body: Expr) -> Self {
        assert!(body.typ.is_bool());
        expr!(ExprValue::Exists { variable, body }, Type::Bool)
    }

    pub fn array_comprehension(variable: Expr, body: Expr, typ: Type) -> Self {
        assert!(typ.is_array());
        expr!(ExprValue::ArrayComprehension { variable, body }, typ)
    }

    pub fn read_ok(ptr: Expr, size: Expr) -> Self {
        assert!(ptr.typ.is_pointer());
        expr!(ExprValue::ReadOk { ptr, size }, Type::Bool)
    }

    pub fn write_ok(ptr: Expr, size: Expr) -> Self {
        assert!(ptr.typ.is_pointer());
        expr!(ExprValue::WriteOk { ptr, size }, Type::Bool)
    }

    /// `op0 && op1 && ...` with the empty conjunction being `true`.
    pub fn conjunction(ops: Vec<Expr>) -> Expr {
        ops.into_iter().reduce(|a, b| a.and(b)).unwrap_or_else(Expr::bool_true)
    }

    /// `op0 || op1 || ...` with the empty disjunction being `false`.
    pub fn disjunction(ops: Vec<Expr>) -> Expr {
        ops.into_iter().reduce(|a, b| a.or(b)).unwrap_or_else(Expr::bool_false)
    }
}

fn binop(op: BinaryOperator, lhs: Expr, rhs: Expr, typ: Type) -> Expr {
    expr!(ExprValue::BinOp { op, lhs, rhs }, typ)
}

fn unop(op: UnaryOperator, e: Expr, typ: Type) -> Expr {
    expr!(ExprValue::UnOp { op, e }, typ)
}

/// Binary operations
impl Expr {
    fn assert_arithmetic_compatible(&self, rhs: &Expr) {
        assert!(
            (self.typ == rhs.typ && (self.typ.is_bitvector() || self.typ.is_float()))
                || (self.typ.is_pointer() && rhs.typ.is_bitvector()),
            "incompatible arithmetic operands: {} and {}",
            self.typ,
            rhs.typ
        );
    }

    pub fn plus(self, rhs: Expr) -> Expr {
        self.assert_arithmetic_compatible(&rhs);
        let typ = self.typ.clone();
        binop(BinaryOperator::Plus, self, rhs, typ)
    }

    pub fn sub(self, rhs: Expr) -> Expr {
        self.assert_arithmetic_compatible(&rhs);
        let typ = self.typ.clone();
        binop(BinaryOperator::Minus, self, rhs, typ)
    }

    pub fn mul(self, rhs: Expr) -> Expr {
        self.assert_arithmetic_compatible(&rhs);
        let typ = self.typ.clone();
        binop(BinaryOperator::Mult, self, rhs, typ)
    }

    pub fn div(self, rhs: Expr) -> Expr {
        self.assert_arithmetic_compatible(&rhs);
        let typ = self.typ.clone();
        binop(BinaryOperator::Div, self, rhs, typ)
    }

    pub fn rem(self, rhs: Expr) -> Expr {
        assert!(self.typ == rhs.typ && self.typ.is_bitvector());
        let typ = self.typ.clone();
        binop(BinaryOperator::Mod, self, rhs, typ)
    }

    pub fn shl(self, distance: Expr) -> Expr {
        assert!(self.typ.is_bitvector() && distance.typ.is_bitvector());
        let typ = self.typ.clone();
        binop(BinaryOperator::Shl, self, distance, typ)
    }

    pub fn ashr(self, distance: Expr) -> Expr {
        assert!(self.typ.is_bitvector() && distance.typ.is_bitvector());
        let typ = self.typ.clone();
        binop(BinaryOperator::Ashr, self, distance, typ)
    }

    pub fn lshr(self, distance: Expr) -> Expr {
        assert!(self.typ.is_bitvector() && distance.typ.is_bitvector());
        let typ = self.typ.clone();
        binop(BinaryOperator::Lshr, self, distance, typ)
    }

    pub fn and(self, rhs: Expr) -> Expr {
        assert!(self.typ.is_bool() && rhs.typ.is_bool());
        binop(BinaryOperator::And, self, rhs, Type::Bool)
    }

    pub fn or(self, rhs: Expr) -> Expr {
        assert!(self.typ.is_bool() && rhs.typ.is_bool());
        binop(BinaryOperator::Or, self, rhs, Type::Bool)
    }

    pub fn implies(self, rhs: Expr) -> Expr {
        assert!(self.typ.is_bool() && rhs.typ.is_bool());
        binop(BinaryOperator::Implies, self, rhs, Type::Bool)
    }

    pub fn eq(self, rhs: Expr) -> Expr {
        assert_eq!(self.typ, rhs.typ, "equality between different types");
        binop(BinaryOperator::Equal, self, rhs, Type::Bool)
    }

    pub fn neq(self, rhs: Expr) -> Expr {
        assert_eq!(self.typ, rhs.typ, "disequality between different types");
        binop(BinaryOperator::Notequal, self, rhs, Type::Bool)
    }

    /// IEEE equality (distinct from bit equality for NaN and signed zeros).
    pub fn feq(self, rhs: Expr) -> Expr {
        assert!(self.typ == rhs.typ && self.typ.is_float());
        binop(BinaryOperator::IeeeFloatEqual, self, rhs, Type::Bool)
    }

    pub fn lt(self, rhs: Expr) -> Expr {
        assert_eq!(self.typ, rhs.typ);
        binop(BinaryOperator::Lt, self, rhs, Type::Bool)
    }

    pub fn le(self, rhs: Expr) -> Expr {
        assert_eq!(self.typ, rhs.typ);
        binop(BinaryOperator::Le, self, rhs, Type::Bool)
    }

    pub fn gt(self, rhs: Expr) -> Expr {
        assert_eq!(self.typ, rhs.typ);
        binop(BinaryOperator::Gt, self, rhs, Type::Bool)
    }

    pub fn ge(self, rhs: Expr) -> Expr {
        assert_eq!(self.typ, rhs.typ);
        binop(BinaryOperator::Ge, self, rhs, Type::Bool)
    }

    /// `true` iff `self + e` overflows.
    pub fn add_overflow_p(self, rhs: Expr) -> Expr {
        self.assert_arithmetic_compatible(&rhs);
        binop(BinaryOperator::OverflowPlus, self, rhs, Type::Bool)
    }

    /// `true` iff `self - e` overflows.
    pub fn sub_overflow_p(self, rhs: Expr) -> Expr {
        self.assert_arithmetic_compatible(&rhs);
        binop(BinaryOperator::OverflowMinus, self, rhs, Type::Bool)
    }

    /// `true` iff `self * e` overflows.
    pub fn mul_overflow_p(self, rhs: Expr) -> Expr {
        self.assert_arithmetic_compatible(&rhs);
        binop(BinaryOperator::OverflowMult, self, rhs, Type::Bool)
    }

    /// Both pointers refer to the same object.
    pub fn same_object(self, rhs: Expr) -> Expr {
        assert!(self.typ.is_pointer() && rhs.typ.is_pointer());
        self.pointer_object().eq(rhs.pointer_object())
    }
}

/// Unary operations
impl Expr {
    pub fn not(self) -> Expr {
        assert!(self.typ.is_bool());
        unop(UnaryOperator::Not, self, Type::Bool)
    }

    pub fn neg(self) -> Expr {
        assert!(self.typ.is_bitvector() || self.typ.is_float());
        let typ = self.typ.clone();
        unop(UnaryOperator::UnaryMinus, self, typ)
    }

    pub fn is_nan(self) -> Expr {
        assert!(self.typ.is_float());
        unop(UnaryOperator::IsNan, self, Type::Bool)
    }

    pub fn is_infinite(self) -> Expr {
        assert!(self.typ.is_float());
        unop(UnaryOperator::IsInfinite, self, Type::Bool)
    }

    pub fn is_invalid_pointer(self) -> Expr {
        assert!(self.typ.is_pointer());
        unop(UnaryOperator::IsInvalidPointer, self, Type::Bool)
    }

    pub fn is_dynamic_object(self) -> Expr {
        assert!(self.typ.is_pointer());
        unop(UnaryOperator::IsDynamicObject, self, Type::Bool)
    }

    /// The numeric identity of the object this pointer refers to.
    pub fn pointer_object(self) -> Expr {
        assert!(self.typ.is_pointer());
        unop(UnaryOperator::PointerObject, self, Type::size_t())
    }

    /// The byte offset of this pointer within its object.
    pub fn pointer_offset(self) -> Expr {
        assert!(self.typ.is_pointer());
        unop(UnaryOperator::PointerOffset, self, Type::ssize_t())
    }

    /// The size in bytes of the object this pointer refers to.
    pub fn object_size(self) -> Expr {
        assert!(self.typ.is_pointer());
        unop(UnaryOperator::ObjectSize, self, Type::size_t())
    }
}

/// Compound expressions
impl Expr {
    /// `self[index]`
    pub fn index(self, index: Expr) -> Expr {
        let typ = self.typ.base_type().cloned().unwrap_or_else(|| self.typ.clone());
        expr!(ExprValue::Index { array: self, index }, typ)
    }

    /// `self.field` with the given result type.
    pub fn member<T: Into<InternedString>>(self, field: T, typ: Type) -> Expr {
        expr!(ExprValue::Member { lhs: self, field: field.into() }, typ)
    }

    /// `*self`
    pub fn dereference(self) -> Expr {
        assert!(self.typ.is_pointer(), "dereference of non-pointer type {}", self.typ);
        let typ = self.typ.base_type().unwrap().clone();
        expr!(ExprValue::Dereference(self), typ)
    }

    /// `&self`
    pub fn address_of(self) -> Expr {
        let typ = self.typ.clone().to_pointer();
        expr!(ExprValue::AddressOf(self), typ)
    }

    /// `(typ) self`, a no-op when the type already matches.
    pub fn cast_to(self, typ: Type) -> Expr {
        if self.typ == typ { self } else { expr!(ExprValue::Typecast(self), typ) }
    }

    /// `c ? t : e`
    pub fn if_then_else(c: Expr, t: Expr, e: Expr) -> Expr {
        assert!(c.typ.is_bool());
        assert_eq!(t.typ, e.typ);
        let typ = t.typ.clone();
        expr!(ExprValue::If { c, t, e }, typ)
    }
}

/// Predicates and projections
impl Expr {
    pub fn is_symbol(&self) -> bool {
        match self.value() {
            ExprValue::Symbol { .. } => true,
            _ => false,
        }
    }

    pub fn symbol_identifier(&self) -> Option<InternedString> {
        match self.value() {
            ExprValue::Symbol { identifier } => Some(*identifier),
            _ => None,
        }
    }

    pub fn is_constant(&self) -> bool {
        match self.value() {
            ExprValue::BoolConstant(_)
            | ExprValue::DoubleConstant(_)
            | ExprValue::FloatConstant(_)
            | ExprValue::IntConstant(_)
            | ExprValue::PointerConstant(_)
            | ExprValue::StringConstant { .. } => true,
            _ => false,
        }
    }

    pub fn int_constant_value(&self) -> Option<&BigInt> {
        match self.value() {
            ExprValue::IntConstant(i) => Some(i),
            _ => None,
        }
    }

    pub fn is_true(&self) -> bool {
        match self.value() {
            ExprValue::BoolConstant(true) => true,
            _ => false,
        }
    }

    pub fn is_false(&self) -> bool {
        match self.value() {
            ExprValue::BoolConstant(false) => true,
            _ => false,
        }
    }

    pub fn is_zero(&self) -> bool {
        match self.value() {
            ExprValue::IntConstant(i) => *i == BigInt::from(0),
            ExprValue::PointerConstant(p) => *p == 0,
            ExprValue::FloatConstant(bits) => f32::from_bits(*bits) == 0.0,
            ExprValue::DoubleConstant(bits) => f64::from_bits(*bits) == 0.0,
            _ => false,
        }
    }

    /// The immediate sub-expressions, in evaluation order.
    pub fn sub_exprs(&self) -> Vec<&Expr> {
        match self.value() {
            ExprValue::AddressOf(e)
            | ExprValue::Dereference(e)
            | ExprValue::Typecast(e)
            | ExprValue::UnOp { e, .. }
            | ExprValue::Member { lhs: e, .. } => vec![e],
            ExprValue::Array { elems }
            | ExprValue::ArrayList { elems }
            | ExprValue::Struct { values: elems } => elems.iter().collect(),
            ExprValue::ArrayComprehension { variable, body }
            | ExprValue::Exists { variable, body }
            | ExprValue::Forall { variable, body } => vec![variable, body],
            ExprValue::BinOp { lhs, rhs, .. } => vec![lhs, rhs],
            ExprValue::ByteExtract { e, offset } => vec![e, offset],
            ExprValue::If { c, t, e } => vec![c, t, e],
            ExprValue::Index { array, index } => vec![array, index],
            ExprValue::ReadOk { ptr, size } | ExprValue::WriteOk { ptr, size } => {
                vec![ptr, size]
            }
            ExprValue::BoolConstant(_)
            | ExprValue::DoubleConstant(_)
            | ExprValue::FloatConstant(_)
            | ExprValue::IntConstant(_)
            | ExprValue::Nondet
            | ExprValue::PointerConstant(_)
            | ExprValue::StringConstant { .. }
            | ExprValue::Symbol { .. } => vec![],
        }
    }

    /// Whether any node of the tree satisfies `pred`.
    pub fn has_subexpr<F: Fn(&Expr) -> bool + Copy>(&self, pred: F) -> bool {
        pred(self) || self.sub_exprs().into_iter().any(|e| e.has_subexpr(pred))
    }

    pub fn mentions_symbol(&self, identifier: InternedString) -> bool {
        self.has_subexpr(|e| e.symbol_identifier() == Some(identifier))
    }

    pub fn has_dereference(&self) -> bool {
        self.has_subexpr(|e| match e.value() {
            ExprValue::Dereference(_) => true,
            _ => false,
        })
    }

    pub fn has_rw_ok(&self) -> bool {
        self.has_subexpr(|e| match e.value() {
            ExprValue::ReadOk { .. } | ExprValue::WriteOk { .. } => true,
            _ => false,
        })
    }

    /// Rebuild this node with each immediate sub-expression passed through
    /// `f`, keeping the type, location, and annotations.
    pub fn map_sub_exprs(&self, f: &mut dyn FnMut(&Expr) -> Expr) -> Expr {
        let value = match self.value() {
            ExprValue::AddressOf(e) => ExprValue::AddressOf(f(e)),
            ExprValue::Array { elems } => {
                ExprValue::Array { elems: elems.iter().map(|e| f(e)).collect() }
            }
            ExprValue::ArrayComprehension { variable, body } => {
                ExprValue::ArrayComprehension { variable: f(variable), body: f(body) }
            }
            ExprValue::ArrayList { elems } => {
                ExprValue::ArrayList { elems: elems.iter().map(|e| f(e)).collect() }
            }
            ExprValue::BinOp { op, lhs, rhs } => {
                ExprValue::BinOp { op: *op, lhs: f(lhs), rhs: f(rhs) }
            }
            ExprValue::ByteExtract { e, offset } => {
                ExprValue::ByteExtract { e: f(e), offset: f(offset) }
            }
            ExprValue::Dereference(e) => ExprValue::Dereference(f(e)),
            ExprValue::Exists { variable, body } => {
                ExprValue::Exists { variable: f(variable), body: f(body) }
            }
            ExprValue::Forall { variable, body } => {
                ExprValue::Forall { variable: f(variable), body: f(body) }
            }
            ExprValue::If { c, t, e } => ExprValue::If { c: f(c), t: f(t), e: f(e) },
            ExprValue::Index { array, index } => {
                ExprValue::Index { array: f(array), index: f(index) }
            }
            ExprValue::Member { lhs, field } => {
                ExprValue::Member { lhs: f(lhs), field: *field }
            }
            ExprValue::ReadOk { ptr, size } => ExprValue::ReadOk { ptr: f(ptr), size: f(size) },
            ExprValue::Struct { values } => {
                ExprValue::Struct { values: values.iter().map(|e| f(e)).collect() }
            }
            ExprValue::Typecast(e) => ExprValue::Typecast(f(e)),
            ExprValue::UnOp { op, e } => ExprValue::UnOp { op: *op, e: f(e) },
            ExprValue::WriteOk { ptr, size } => {
                ExprValue::WriteOk { ptr: f(ptr), size: f(size) }
            }
            leaf @ (ExprValue::BoolConstant(_)
            | ExprValue::DoubleConstant(_)
            | ExprValue::FloatConstant(_)
            | ExprValue::IntConstant(_)
            | ExprValue::Nondet
            | ExprValue::PointerConstant(_)
            | ExprValue::StringConstant { .. }
            | ExprValue::Symbol { .. }) => leaf.clone(),
        };
        Expr {
            value: Box::new(value),
            typ: self.typ.clone(),
            location: self.location,
            bounds_check: self.bounds_check,
        }
    }
}

impl BinaryOperator {
    /// The operator's name as used in obligation comments.
    pub fn op_name(&self) -> &'static str {
        match self {
            BinaryOperator::Plus => "+",
            BinaryOperator::Minus => "-",
            BinaryOperator::Mult => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::Mod => "mod",
            BinaryOperator::Shl => "shl",
            BinaryOperator::Ashr => "ashr",
            BinaryOperator::Lshr => "lshr",
            BinaryOperator::And => "and",
            BinaryOperator::Or => "or",
            BinaryOperator::Implies => "=>",
            BinaryOperator::Equal => "=",
            BinaryOperator::Notequal => "notequal",
            BinaryOperator::IeeeFloatEqual => "ieee_float_equal",
            BinaryOperator::Ge => ">=",
            BinaryOperator::Gt => ">",
            BinaryOperator::Le => "<=",
            BinaryOperator::Lt => "<",
            BinaryOperator::OverflowPlus => "overflow-+",
            BinaryOperator::OverflowMinus => "overflow--",
            BinaryOperator::OverflowMult => "overflow-*",
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            BinaryOperator::And => "&&",
            BinaryOperator::Ashr | BinaryOperator::Lshr => ">>",
            BinaryOperator::Div => "/",
            BinaryOperator::Equal | BinaryOperator::IeeeFloatEqual => "==",
            BinaryOperator::Ge => ">=",
            BinaryOperator::Gt => ">",
            BinaryOperator::Implies => "==>",
            BinaryOperator::Le => "<=",
            BinaryOperator::Lt => "<",
            BinaryOperator::Minus => "-",
            BinaryOperator::Mod => "%",
            BinaryOperator::Mult => "*",
            BinaryOperator::Notequal => "!=",
            BinaryOperator::Or => "||",
            BinaryOperator::Plus => "+",
            BinaryOperator::Shl => "<<",
            BinaryOperator::OverflowPlus
            | BinaryOperator::OverflowMinus
            | BinaryOperator::OverflowMult => unreachable!("printed in function style"),
        }
    }
}

// Parenthesize compound operands so the printed form is unambiguous.
struct Operand<'a>(&'a Expr);

impl fmt::Display for Operand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.value() {
            ExprValue::AddressOf(_)
            | ExprValue::BinOp { .. }
            | ExprValue::Dereference(_)
            | ExprValue::If { .. } => write!(f, "({})", self.0),
            _ => write!(f, "{}", self.0),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value() {
            ExprValue::AddressOf(e) => write!(f, "&{}", Operand(e)),
            ExprValue::Array { elems } | ExprValue::Struct { values: elems } => {
                write!(f, "{{ ")?;
                for (i, e) in elems.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{e}")?;
                }
                write!(f, " }}")
            }
            ExprValue::ArrayComprehension { variable, body } => {
                write!(f, "{{ {variable} -> {body} }}")
            }
            ExprValue::ArrayList { elems } => {
                write!(f, "array_list(")?;
                for (i, e) in elems.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{e}")?;
                }
                write!(f, ")")
            }
            ExprValue::BinOp { op, lhs, rhs } => match op {
                BinaryOperator::OverflowPlus
                | BinaryOperator::OverflowMinus
                | BinaryOperator::OverflowMult => {
                    write!(f, "{}({lhs}, {rhs})", op.op_name())
                }
                _ => write!(f, "{} {} {}", Operand(lhs), op.symbol(), Operand(rhs)),
            },
            ExprValue::BoolConstant(c) => write!(f, "{c}"),
            ExprValue::ByteExtract { e, offset } => {
                write!(f, "byte_extract_little_endian({e}, {offset})")
            }
            ExprValue::Dereference(e) => write!(f, "*{}", Operand(e)),
            ExprValue::DoubleConstant(bits) => write!(f, "{}", f64::from_bits(*bits)),
            ExprValue::Exists { variable, body } => write!(f, "exists {variable}. {body}"),
            ExprValue::FloatConstant(bits) => write!(f, "{}f", f32::from_bits(*bits)),
            ExprValue::Forall { variable, body } => write!(f, "forall {variable}. {body}"),
            ExprValue::If { c, t, e } => {
                write!(f, "{} ? {} : {}", Operand(c), Operand(t), Operand(e))
            }
            ExprValue::Index { array, index } => write!(f, "{}[{index}]", Operand(array)),
            ExprValue::IntConstant(i) => write!(f, "{i}"),
            ExprValue::Member { lhs, field } => write!(f, "{}.{field}", Operand(lhs)),
            ExprValue::Nondet => write!(f, "nondet()"),
            ExprValue::PointerConstant(0) => write!(f, "NULL"),
            ExprValue::PointerConstant(c) => write!(f, "pointer({c:#x})"),
            ExprValue::ReadOk { ptr, size } => write!(f, "r_ok({ptr}, {size})"),
            ExprValue::StringConstant { s } => write!(f, "{s:?}"),
            ExprValue::Symbol { identifier } => write!(f, "{identifier}"),
            ExprValue::Typecast(e) => write!(f, "({}){}", self.typ, Operand(e)),
            ExprValue::UnOp { op, e } => match op {
                UnaryOperator::Not => write!(f, "!{}", Operand(e)),
                UnaryOperator::UnaryMinus => write!(f, "-{}", Operand(e)),
                UnaryOperator::IsNan => write!(f, "isnan({e})"),
                UnaryOperator::IsInfinite => write!(f, "isinf({e})"),
                UnaryOperator::IsDynamicObject => write!(f, "is_dynamic_object({e})"),
                UnaryOperator::IsInvalidPointer => write!(f, "is_invalid_pointer({e})"),
                UnaryOperator::ObjectSize => write!(f, "object_size({e})"),
                UnaryOperator::PointerObject => write!(f, "pointer_object({e})"),
                UnaryOperator::PointerOffset => write!(f, "pointer_offset({e})"),
            },
            ExprValue::WriteOk { ptr, size } => write!(f, "w_ok({ptr}, {size})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_ignores_location() {
        let t = Type::signed_int(32);
        let a = Expr::symbol("x", t.clone());
        let b = Expr::symbol("x", t).with_location(Location::new("f.c", Some("main"), 4, None));
        assert_eq!(a, b);
    }

    #[test]
    fn pretty_printing() {
        let t = Type::signed_int(32);
        let x = Expr::symbol("x", t.clone());
        let y = Expr::symbol("y", t.clone());
        assert_eq!(x.clone().plus(y).to_string(), "x + y");
        let a = Expr::symbol("a", t.clone().array_of(Expr::int_constant(10, Type::size_t())));
        let i = Expr::symbol("i", t.clone());
        assert_eq!(a.index(i).to_string(), "a[i]");
        let p = Expr::symbol("p", t.to_pointer());
        assert_eq!(p.dereference().to_string(), "*p");
    }

    #[test]
    fn mentions_symbol_and_dereference() {
        let t = Type::signed_int(32);
        let p = Expr::symbol("p", t.clone().to_pointer());
        let deref = p.dereference();
        let e = deref.plus(Expr::symbol("y", t));
        assert!(e.mentions_symbol("p".into()));
        assert!(e.mentions_symbol("y".into()));
        assert!(!e.mentions_symbol("z".into()));
        assert!(e.has_dereference());
    }

    #[test]
    fn cast_to_same_type_is_identity() {
        let t = Type::signed_int(32);
        let x = Expr::symbol("x", t.clone());
        let cast = x.clone().cast_to(t.clone());
        assert_eq!(cast, x);
        let widened = x.cast_to(Type::signed_int(64));
        assert!(match widened.value() {
            ExprValue::Typecast(_) => true,
            _ => false,
        });
    }
}
