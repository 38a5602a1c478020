// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The checker itself: a guard-propagating walk over each instruction's
//! expressions, category-specific obligation builders, and the driver that
//! splices the collected obligations back into the program.

use super::predicates;
use super::{
    Allocation, CStandard, CheckError, CheckOptions, CppStandard, Guard, LocalPointerAnalysis,
    PropertyClass,
};
use crate::goto_program::{
    ArraySize, BinaryOperator, Expr, ExprValue, GotoFunction, GotoFunctions, Instruction,
    InstructionBody, Location, Mode, ObjectDescriptor, OtherStatement, Pragma, SymbolTable, Type,
    UnaryOperator, member_offset_bytes, size_of_expr, size_of_type,
};
use crate::simplify::simplify;
use crate::utils::{max_int, min_int};
use crate::{InternedString, cprover};
use num::bigint::BigInt;
use std::collections::HashSet;
use tracing::trace;

/// The category-enable flags, copied out of the options so that pragma
/// overrides can flip them per instruction and restore them afterwards.
#[derive(Debug, Clone, Copy)]
struct Flags {
    bounds_check: bool,
    pointer_check: bool,
    memory_leak_check: bool,
    div_by_zero_check: bool,
    signed_overflow_check: bool,
    unsigned_overflow_check: bool,
    pointer_overflow_check: bool,
    conversion_check: bool,
    undefined_shift_check: bool,
    float_overflow_check: bool,
    nan_check: bool,
}

impl Flags {
    fn from_options(options: &CheckOptions) -> Self {
        Flags {
            bounds_check: options.bounds_check,
            pointer_check: options.pointer_check,
            memory_leak_check: options.memory_leak_check,
            div_by_zero_check: options.div_by_zero_check,
            signed_overflow_check: options.signed_overflow_check,
            unsigned_overflow_check: options.unsigned_overflow_check,
            pointer_overflow_check: options.pointer_overflow_check,
            conversion_check: options.conversion_check,
            undefined_shift_check: options.undefined_shift_check,
            float_overflow_check: options.float_overflow_check,
            nan_check: options.nan_check,
        }
    }
}

/// One obligation produced by the pointer address check.
struct Condition {
    assertion: Expr,
    description: &'static str,
}

/// Per-function instrumentation state.
pub(super) struct Checker<'a> {
    symbol_table: &'a SymbolTable,
    options: &'a CheckOptions,
    flags: Flags,
    allocations: &'a [Allocation],
    analysis: Option<LocalPointerAnalysis>,
    mode: Mode,
    /// Index of the instruction being checked, in pre-instrumentation terms.
    current_index: usize,
    /// Obligations already emitted and still valid at this point.
    assertions: HashSet<Expr>,
    /// Instructions to splice in front of the current one.
    new_code: Vec<Instruction>,
}

impl<'a> Checker<'a> {
    pub(super) fn new(
        symbol_table: &'a SymbolTable,
        options: &'a CheckOptions,
        allocations: &'a [Allocation],
    ) -> Self {
        Checker {
            symbol_table,
            options,
            flags: Flags::from_options(options),
            allocations,
            analysis: None,
            mode: Mode::C,
            current_index: 0,
            assertions: HashSet::new(),
            new_code: Vec::new(),
        }
    }

    ///////////////////////////////////////////////////////////////////////////////////////////
    // Driver
    ///////////////////////////////////////////////////////////////////////////////////////////

    pub(super) fn check_function(&mut self, function: &mut GotoFunction) -> Result<(), CheckError> {
        self.assertions.clear();

        let function_symbol = self
            .symbol_table
            .lookup(function.name)
            .ok_or_else(|| CheckError::MissingSymbol(function.name.to_string()))?;
        self.mode = function_symbol.mode;

        self.analysis = Some(LocalPointerAnalysis::new(function, self.symbol_table));

        let targets = function.body.referenced_labels();
        let mut did_something = false;

        let mut position = 0;
        let mut original_index = 0;
        while position < function.body.len() {
            self.current_index = original_index;
            self.new_code.clear();

            let saved_flags = self.flags;
            let pragmas: Vec<Pragma> = function.body.get(position).pragmas().to_vec();
            self.apply_pragmas(&pragmas);
            let result =
                self.check_instruction(function, position, &targets, &mut did_something);
            self.flags = saved_flags;
            result?;

            let current_location = *function.body.get(position).location();
            let mut new_code = std::mem::take(&mut self.new_code);
            for instruction in new_code.iter_mut() {
                if instruction.location().lacks_source() {
                    instruction.location_mut().backfill_source(&current_location);
                }
            }

            did_something |= !new_code.is_empty();
            let inserted = function.body.splice_before(position, new_code);
            position += inserted + 1;
            original_index += 1;
        }

        if did_something {
            function.body.remove_skips();
        }
        Ok(())
    }

    fn apply_pragmas(&mut self, pragmas: &[Pragma]) {
        for pragma in pragmas {
            match pragma {
                Pragma::DisableBoundsCheck => self.flags.bounds_check = false,
                Pragma::DisableConversionCheck => self.flags.conversion_check = false,
                Pragma::DisableDivByZeroCheck => self.flags.div_by_zero_check = false,
                Pragma::DisableFloatOverflowCheck => self.flags.float_overflow_check = false,
                Pragma::DisableMemoryLeakCheck => self.flags.memory_leak_check = false,
                Pragma::DisableNanCheck => self.flags.nan_check = false,
                Pragma::DisablePointerCheck => self.flags.pointer_check = false,
                Pragma::DisablePointerOverflowCheck => {
                    self.flags.pointer_overflow_check = false
                }
                Pragma::DisableSignedOverflowCheck => {
                    self.flags.signed_overflow_check = false
                }
                Pragma::DisableUndefinedShiftCheck => {
                    self.flags.undefined_shift_check = false
                }
                Pragma::DisableUnsignedOverflowCheck => {
                    self.flags.unsigned_overflow_check = false
                }
            }
        }
    }

    fn check_instruction(
        &mut self,
        function: &mut GotoFunction,
        position: usize,
        targets: &HashSet<InternedString>,
        did_something: &mut bool,
    ) -> Result<(), CheckError> {
        // recorded assertions survive only along straight-line code
        let is_target =
            function.body.get(position).labels().iter().any(|label| targets.contains(label));
        if self.options.retain_trivial || is_target {
            self.assertions.clear();
        }

        let location = *function.body.get(position).location();

        if let Some(cond) = function.body.get(position).condition().cloned() {
            self.check(&cond)?;
            if cond.has_rw_ok() {
                let expanded = self.expand_rw_ok(&cond);
                function.body.get_mut(position).set_condition(expanded);
            }
        }

        // magic error labels
        let labels: Vec<InternedString> = function.body.get(position).labels().to_vec();
        let options = self.options;
        for error_label in &options.error_labels {
            if labels.contains(error_label) {
                let loc = Location::property(
                    format!("error label {error_label}"),
                    PropertyClass::ErrorLabel.as_str(),
                    true,
                    location,
                );
                let instruction = if self.options.assert_to_assume {
                    Instruction::assume(Expr::bool_false(), loc)
                } else {
                    Instruction::assert_with_location(Expr::bool_false(), loc)
                };
                self.new_code.push(instruction);
            }
        }

        let body = function.body.get(position).body().clone();
        match body {
            InstructionBody::Assign { lhs, rhs } => {
                self.check(&lhs)?;
                self.check(&rhs)?;

                // the write might invalidate recorded assertions
                self.invalidate(&lhs);

                if rhs.has_rw_ok() {
                    let expanded = self.expand_rw_ok(&rhs);
                    function.body.get_mut(position).set_assign_rhs(expanded);
                }
            }
            InstructionBody::FunctionCall { lhs, function: callee, arguments } => {
                // a receiver method must not be invoked on a null reference
                if self.mode == Mode::ManagedReference
                    && self.flags.pointer_check
                    && !arguments.is_empty()
                    && callee.typ().is_code()
                    && callee.typ().has_this()
                {
                    let receiver = &arguments[0];
                    let flags = self.pointer_flags(receiver);
                    if flags.is_unknown() || flags.is_null() {
                        let not_null = receiver
                            .clone()
                            .neq(Expr::null_pointer(receiver.typ().clone()));
                        self.add_guarded_property(
                            not_null,
                            "this is null on method invocation",
                            PropertyClass::PointerDereference,
                            location,
                            receiver,
                            &Guard::new(),
                        );
                    }
                }

                if let Some(lhs) = &lhs {
                    self.check(lhs)?;
                }
                self.check(&callee)?;
                for argument in &arguments {
                    self.check(argument)?;
                }

                // the call might invalidate any recorded assertion
                self.assertions.clear();
            }
            InstructionBody::Return { value: Some(value) } => {
                self.check(&value)?;
                self.invalidate(&value);
                if value.has_rw_ok() {
                    let expanded = self.expand_rw_ok(&value);
                    function.body.get_mut(position).set_return_value(expanded);
                }
            }
            InstructionBody::Throw { exception } => {
                // must not throw null
                if exception.typ().is_pointer() {
                    let not_null =
                        exception.clone().neq(Expr::null_pointer(exception.typ().clone()));
                    self.add_guarded_property(
                        not_null,
                        "throwing null",
                        PropertyClass::PointerDereference,
                        location,
                        &exception,
                        &Guard::new(),
                    );
                }
                // this has no successor
                self.assertions.clear();
            }
            InstructionBody::Assert { cond } => {
                let instruction = function.body.get(position);
                let user_provided = instruction.location().is_user_provided();
                let is_error_label = instruction
                    .location()
                    .property_class()
                    .map_or(false, |class| class == PropertyClass::ErrorLabel.as_str());
                if (user_provided && !self.options.assertions && !is_error_label)
                    || (!user_provided && !self.options.built_in_assertions)
                {
                    function.body.get_mut(position).turn_into_skip();
                    *did_something = true;
                } else {
                    // a surviving assertion establishes its condition, so
                    // re-running the pass emits nothing new
                    self.assertions.insert(cond);
                }
            }
            InstructionBody::Assume { cond } => {
                if !self.options.assumptions {
                    function.body.get_mut(position).turn_into_skip();
                    *did_something = true;
                } else {
                    self.assertions.insert(cond);
                }
            }
            InstructionBody::Dead { symbol } => {
                if self.flags.pointer_check {
                    let identifier = symbol.symbol_identifier().unwrap();
                    if self.analysis.as_ref().unwrap().is_dirty(identifier) {
                        // make the dead variable visible to later validity checks
                        let sentinel =
                            self.symbol_table.lookup(cprover::DEAD_OBJECT).ok_or_else(|| {
                                CheckError::MissingSymbol(cprover::DEAD_OBJECT.to_string())
                            })?;
                        let lhs = sentinel.to_expr();
                        let address =
                            symbol.clone().address_of().cast_to(lhs.typ().clone());
                        let rhs =
                            Expr::if_then_else(Expr::nondet(Type::Bool), address, lhs.clone());
                        self.new_code.push(Instruction::assign(lhs, rhs, location));
                    }
                }
            }
            InstructionBody::EndFunction => {
                if function.name == GotoFunctions::entry_point()
                    && self.flags.memory_leak_check
                {
                    let leak =
                        self.symbol_table.lookup(cprover::MEMORY_LEAK).ok_or_else(|| {
                            CheckError::MissingSymbol(cprover::MEMORY_LEAK.to_string())
                        })?;
                    let leak_expr = leak.to_expr();

                    // self-assignment, for helpful counterexample output
                    self.new_code.push(Instruction::assign(
                        leak_expr.clone(),
                        leak_expr.clone(),
                        location,
                    ));

                    // the property belongs to the function, not to a line
                    let eq = leak_expr
                        .clone()
                        .eq(Expr::null_pointer(leak_expr.typ().clone()));
                    let loc = Location::property_for_function(
                        format!("dynamically allocated memory never freed in {eq}"),
                        PropertyClass::MemoryLeak.as_str(),
                        function.name,
                    );
                    self.add_property(eq, loc, &Guard::new());
                }
            }
            InstructionBody::Other { statement } => match statement {
                OtherStatement::Expression(e) => self.check(&e)?,
                OtherStatement::Printf { arguments } => {
                    for argument in &arguments {
                        self.check(argument)?;
                    }
                }
            },
            InstructionBody::Decl { .. }
            | InstructionBody::Goto { .. }
            | InstructionBody::Return { value: None }
            | InstructionBody::Skip => {}
        }

        Ok(())
    }

    ///////////////////////////////////////////////////////////////////////////////////////////
    // Assertion cache and emitter
    ///////////////////////////////////////////////////////////////////////////////////////////

    /// Submit an obligation derived from `src_expr`: its comment names the
    /// source expression and its location wraps the expression's.
    fn add_guarded_property(
        &mut self,
        asserted_expr: Expr,
        comment: &str,
        property_class: PropertyClass,
        source_location: Location,
        src_expr: &Expr,
        guard: &Guard,
    ) {
        let comment = format!("{comment} in {src_expr}");
        let loc = Location::property(comment, property_class.as_str(), false, source_location);
        self.add_property(asserted_expr, loc, guard);
    }

    /// The emitter behind [`Self::add_guarded_property`], taking the property
    /// location ready-made: simplify, drop if trivial, wrap with the guard,
    /// deduplicate, and append to the patch buffer.
    fn add_property(&mut self, asserted_expr: Expr, loc: Location, guard: &Guard) {
        let simplified = if self.options.simplify {
            simplify(&asserted_expr, self.symbol_table)
        } else {
            asserted_expr
        };

        if !self.options.retain_trivial && simplified.is_true() {
            return;
        }

        let guarded =
            if guard.is_true() { simplified } else { guard.as_expr().implies(simplified) };

        if self.assertions.insert(guarded.clone()) {
            let instruction = if self.options.assert_to_assume {
                Instruction::assume(guarded, loc)
            } else {
                Instruction::assert_with_location(guarded, loc)
            };
            self.new_code.push(instruction);
        } else {
            trace!(obligation = %guarded, "dropped duplicate obligation");
        }
    }

    /// Drop every recorded assertion whose truth a write to `lhs` could
    /// change.
    fn invalidate(&mut self, lhs: &Expr) {
        match lhs.value() {
            ExprValue::Index { array, .. } => self.invalidate(array),
            ExprValue::Member { lhs, .. } => self.invalidate(lhs),
            ExprValue::Symbol { identifier } => {
                let identifier = *identifier;
                self.assertions
                    .retain(|a| !a.mentions_symbol(identifier) && !a.has_dereference());
            }
            // writing through an unknown lvalue invalidates everything
            _ => self.assertions.clear(),
        }
    }

    fn pointer_flags(&self, e: &Expr) -> super::PointerFlags {
        self.analysis.as_ref().unwrap().get(self.current_index, e, self.symbol_table)
    }

    ///////////////////////////////////////////////////////////////////////////////////////////
    // Expression walker
    ///////////////////////////////////////////////////////////////////////////////////////////

    /// Walk `expr` with the trivial guard.
    fn check(&mut self, expr: &Expr) -> Result<(), CheckError> {
        let guard = Guard::new();
        self.check_rec(expr, &guard)
    }

    /// Recursively descend into `expr`, emitting the appropriate obligations
    /// for each sub-expression under the path condition `guard`.
    fn check_rec(&mut self, expr: &Expr, guard: &Guard) -> Result<(), CheckError> {
        match expr.value() {
            // we don't look into quantifiers
            ExprValue::Exists { .. } | ExprValue::Forall { .. } => return Ok(()),
            ExprValue::AddressOf(object) => return self.check_rec_address(object, guard),
            ExprValue::BinOp { op: BinaryOperator::And | BinaryOperator::Or, .. } => {
                return self.check_rec_logical_op(expr, guard);
            }
            ExprValue::If { c, t, e } => return self.check_rec_if(c, t, e, guard),
            ExprValue::Member { lhs, .. } => {
                if let ExprValue::Dereference(_) = lhs.value() {
                    if self.check_rec_member(expr, guard)? {
                        return Ok(());
                    }
                }
            }
            _ => {}
        }

        for operand in expr.sub_exprs() {
            self.check_rec(operand, guard)?;
        }

        match expr.value() {
            ExprValue::Index { .. } => self.bounds_check(expr, guard)?,
            ExprValue::BinOp { op, lhs, rhs } => match op {
                BinaryOperator::Div => self.check_rec_div(expr, lhs, rhs, guard),
                BinaryOperator::Shl | BinaryOperator::Ashr | BinaryOperator::Lshr => {
                    self.undefined_shift_check(expr, guard);
                    if *op == BinaryOperator::Shl && expr.typ().is_signed() {
                        self.integer_overflow_check(expr, guard);
                    }
                }
                BinaryOperator::Mod => {
                    self.mod_by_zero_check(expr, rhs, guard);
                    self.mod_overflow_check(expr, lhs, rhs, guard);
                }
                BinaryOperator::Plus | BinaryOperator::Minus | BinaryOperator::Mult => {
                    self.check_rec_arithmetic_op(expr, guard);
                }
                BinaryOperator::Le
                | BinaryOperator::Lt
                | BinaryOperator::Ge
                | BinaryOperator::Gt => self.pointer_rel_check(expr, lhs, rhs, guard),
                _ => {}
            },
            ExprValue::UnOp { op: UnaryOperator::UnaryMinus, .. } => {
                self.check_rec_arithmetic_op(expr, guard);
            }
            ExprValue::Typecast(_) => {
                self.conversion_check(expr, guard);
                if expr.typ().is_float() {
                    self.float_overflow_check(expr, guard);
                }
            }
            ExprValue::Dereference(_) => self.pointer_validity_check(expr, expr, guard)?,
            _ => {}
        }
        Ok(())
    }

    /// Address mode: taking an address does not evaluate the memory, so only
    /// the pointer of a dereference and the value of an index are checked.
    fn check_rec_address(&mut self, expr: &Expr, guard: &Guard) -> Result<(), CheckError> {
        match expr.value() {
            ExprValue::Exists { .. } | ExprValue::Forall { .. } => Ok(()),
            ExprValue::Dereference(pointer) => self.check_rec(pointer, guard),
            ExprValue::Index { array, index } => {
                self.check_rec_address(array, guard)?;
                self.check_rec(index, guard)
            }
            _ => {
                for operand in expr.sub_exprs() {
                    self.check_rec_address(operand, guard)?;
                }
                Ok(())
            }
        }
    }

    /// Check the operands of `&&`/`||` while extending the guard so the
    /// emitted obligations respect short-circuit evaluation:
    ///   a && b  =>  check(a, g), check(b, g ∧ a)
    ///   a || b  =>  check(a, g), check(b, g ∧ ¬a)
    fn check_rec_logical_op(&mut self, expr: &Expr, guard: &Guard) -> Result<(), CheckError> {
        let ExprValue::BinOp { op, lhs, rhs } = expr.value() else {
            unreachable!("logical op expected");
        };
        assert!(expr.typ().is_bool());

        let mut extended = guard.clone();
        for operand in [lhs, rhs] {
            assert!(operand.typ().is_bool());
            self.check_rec(operand, &extended)?;
            extended.add(if *op == BinaryOperator::Or {
                boolean_negate(operand.clone())
            } else {
                operand.clone()
            });
        }
        Ok(())
    }

    /// Check an if expression: the condition under the current guard, the
    /// branches under the guard extended with the condition or its negation.
    fn check_rec_if(
        &mut self,
        c: &Expr,
        t: &Expr,
        e: &Expr,
        guard: &Guard,
    ) -> Result<(), CheckError> {
        assert!(c.typ().is_bool());
        self.check_rec(c, guard)?;

        {
            let mut true_guard = guard.clone();
            true_guard.add(c.clone());
            self.check_rec(t, &true_guard)?;
        }
        {
            let mut false_guard = guard.clone();
            false_guard.add(boolean_negate(c.clone()));
            self.check_rec(e, &false_guard)?;
        }
        Ok(())
    }

    /// Member access through a pointer: `s->field` is checked as
    /// `*(char*)s + field_offset` so that validity is only demanded for the
    /// bytes of the accessed member, not the whole struct.
    ///
    /// Returns true when nothing else remains to check for this expression.
    fn check_rec_member(&mut self, member: &Expr, guard: &Guard) -> Result<bool, CheckError> {
        let ExprValue::Member { lhs: deref, field } = member.value() else {
            unreachable!("member expected");
        };
        let ExprValue::Dereference(pointer) = deref.value() else {
            unreachable!("dereference expected");
        };

        self.check_rec(pointer, guard)?;

        // the synthesized dereference is only needed for pointer checking
        if !self.flags.pointer_check {
            return Ok(true);
        }

        let Some(offset) = member_offset_bytes(deref.typ(), *field) else {
            // the offset is not known; fall through to the generic descent
            return Ok(false);
        };

        let char_pointer = pointer.clone().cast_to(Type::unsigned_int(8).to_pointer());
        let moved = char_pointer.plus(Expr::int_constant(offset, Type::ssize_t()));
        let new_pointer = moved.cast_to(member.typ().clone().to_pointer());
        let new_deref = new_pointer.dereference().with_location(*deref.location());
        self.pointer_validity_check(&new_deref, member, guard)?;
        Ok(true)
    }

    fn check_rec_div(&mut self, expr: &Expr, _lhs: &Expr, rhs: &Expr, guard: &Guard) {
        self.div_by_zero_check(expr, rhs, guard);

        if expr.typ().is_signed() {
            self.integer_overflow_check(expr, guard);
        } else if expr.typ().is_float() {
            self.nan_check(expr, guard);
            self.float_overflow_check(expr, guard);
        }
    }

    fn check_rec_arithmetic_op(&mut self, expr: &Expr, guard: &Guard) {
        if expr.typ().is_bitvector() {
            self.integer_overflow_check(expr, guard);
        } else if expr.typ().is_float() {
            self.nan_check(expr, guard);
            self.float_overflow_check(expr, guard);
        } else if expr.typ().is_pointer() {
            self.pointer_overflow_check(expr, guard);
        }
    }

    ///////////////////////////////////////////////////////////////////////////////////////////
    // Category obligation builders
    ///////////////////////////////////////////////////////////////////////////////////////////

    fn div_by_zero_check(&mut self, expr: &Expr, divisor: &Expr, guard: &Guard) {
        if !self.flags.div_by_zero_check {
            return;
        }

        let zero = Expr::zero(divisor.typ().clone());
        let inequality = divisor.clone().neq(zero);

        self.add_guarded_property(
            inequality,
            "division by zero",
            PropertyClass::DivisionByZero,
            *expr.location(),
            expr,
            guard,
        );
    }

    fn mod_by_zero_check(&mut self, expr: &Expr, divisor: &Expr, guard: &Guard) {
        // the managed-reference runtime defines modulus by zero via exception
        if !self.flags.div_by_zero_check || self.mode == Mode::ManagedReference {
            return;
        }

        let zero = Expr::zero(divisor.typ().clone());
        let inequality = divisor.clone().neq(zero);

        self.add_guarded_property(
            inequality,
            "division by zero",
            PropertyClass::DivisionByZero,
            *expr.location(),
            expr,
            guard,
        );
    }

    /// `INT_MIN % -1` is not representable.
    fn mod_overflow_check(&mut self, expr: &Expr, dividend: &Expr, divisor: &Expr, guard: &Guard) {
        if !self.flags.signed_overflow_check {
            return;
        }

        let typ = expr.typ();
        if !typ.is_signed() {
            return;
        }

        let int_min_neq = dividend
            .clone()
            .neq(Expr::int_constant(typ.smallest().unwrap(), dividend.typ().clone()));
        let minus_one_neq =
            divisor.clone().neq(Expr::int_constant(-1, divisor.typ().clone()));

        self.add_guarded_property(
            int_min_neq.or(minus_one_neq),
            "result of signed mod is not representable",
            PropertyClass::Overflow,
            *expr.location(),
            expr,
            guard,
        );
    }

    /// A shift is undefined for negative distances, for distances at or above
    /// the operand width, and (for `<<` on signed types) negative operands.
    fn undefined_shift_check(&mut self, expr: &Expr, guard: &Guard) {
        if !self.flags.undefined_shift_check {
            return;
        }
        let ExprValue::BinOp { op, lhs: operand, rhs: distance } = expr.value() else {
            unreachable!("shift expected");
        };

        let distance_type = distance.typ();
        if distance_type.is_signed() {
            let inequality =
                distance.clone().ge(Expr::int_constant(0, distance_type.clone()));
            self.add_guarded_property(
                inequality,
                "shift distance is negative",
                PropertyClass::UndefinedShift,
                *expr.location(),
                expr,
                guard,
            );
        }

        let op_type = operand.typ();
        if op_type.is_bitvector() {
            let width = op_type.width().unwrap();
            let width_expr = Expr::int_constant(width, distance_type.clone());
            self.add_guarded_property(
                distance.clone().lt(width_expr),
                "shift distance too large",
                PropertyClass::UndefinedShift,
                *expr.location(),
                expr,
                guard,
            );

            if op_type.is_signed() && *op == BinaryOperator::Shl {
                let inequality =
                    operand.clone().ge(Expr::int_constant(0, op_type.clone()));
                self.add_guarded_property(
                    inequality,
                    "shift operand is negative",
                    PropertyClass::UndefinedShift,
                    *expr.location(),
                    expr,
                    guard,
                );
            }
        } else {
            self.add_guarded_property(
                Expr::bool_false(),
                "shift of non-integer type",
                PropertyClass::UndefinedShift,
                *expr.location(),
                expr,
                guard,
            );
        }
    }

    fn integer_overflow_check(&mut self, expr: &Expr, guard: &Guard) {
        if !self.flags.signed_overflow_check && !self.flags.unsigned_overflow_check {
            return;
        }

        let typ = expr.typ().clone();
        if typ.is_signed() && !self.flags.signed_overflow_check {
            return;
        }
        if typ.is_unsigned() && !self.flags.unsigned_overflow_check {
            return;
        }

        match expr.value() {
            ExprValue::BinOp { op: BinaryOperator::Div, lhs, rhs } => {
                // undefined for signed division INT_MIN / -1
                if typ.is_signed() {
                    let int_min_eq = lhs
                        .clone()
                        .eq(Expr::int_constant(typ.smallest().unwrap(), lhs.typ().clone()));
                    let minus_one_eq =
                        rhs.clone().eq(Expr::int_constant(-1, rhs.typ().clone()));
                    self.add_guarded_property(
                        int_min_eq.and(minus_one_eq).not(),
                        "arithmetic overflow on signed division",
                        PropertyClass::Overflow,
                        *expr.location(),
                        expr,
                        guard,
                    );
                }
            }
            ExprValue::UnOp { op: UnaryOperator::UnaryMinus, e } => {
                // only the smallest representable value overflows
                if typ.is_signed() {
                    let int_min_eq = e
                        .clone()
                        .eq(Expr::int_constant(typ.smallest().unwrap(), e.typ().clone()));
                    self.add_guarded_property(
                        int_min_eq.not(),
                        "arithmetic overflow on signed unary minus",
                        PropertyClass::Overflow,
                        *expr.location(),
                        expr,
                        guard,
                    );
                }
            }
            ExprValue::BinOp { op: BinaryOperator::Shl, lhs: operand, rhs: distance } => {
                if typ.is_signed() {
                    self.shl_overflow_check(expr, operand, distance, guard);
                }
            }
            ExprValue::BinOp {
                op: op @ (BinaryOperator::Plus | BinaryOperator::Minus | BinaryOperator::Mult),
                lhs,
                rhs,
            } => {
                let overflow = match op {
                    BinaryOperator::Plus => lhs.clone().add_overflow_p(rhs.clone()),
                    BinaryOperator::Minus => lhs.clone().sub_overflow_p(rhs.clone()),
                    BinaryOperator::Mult => lhs.clone().mul_overflow_p(rhs.clone()),
                    _ => unreachable!(),
                };
                let kind = if typ.is_unsigned() { "unsigned" } else { "signed" };
                self.add_guarded_property(
                    overflow.not(),
                    &format!("arithmetic overflow on {kind} {}", op.op_name()),
                    PropertyClass::Overflow,
                    *expr.location(),
                    expr,
                    guard,
                );
            }
            _ => {}
        }
    }

    /// Overflow of a signed left shift: the top bits of the double-width
    /// extension of the shifted value must all be zero. Whether the sign bit
    /// itself counts depends on the selected language standard. Negative or
    /// too-large distances and negative or zero operands are excluded here;
    /// those cases belong to the undefined-shift check.
    fn shl_overflow_check(
        &mut self,
        expr: &Expr,
        operand: &Expr,
        distance: &Expr,
        guard: &Guard,
    ) {
        let op_type = operand.typ().clone();
        let width = op_type.width().unwrap();
        let distance_type = distance.typ().clone();

        let neg_value_shift = if op_type.is_unsigned() {
            Expr::bool_false()
        } else {
            operand.clone().lt(Expr::int_constant(0, op_type.clone()))
        };

        let neg_dist_shift = if distance_type.is_unsigned() {
            Expr::bool_false()
        } else {
            distance.clone().lt(Expr::int_constant(0, distance_type.clone()))
        };

        let dist_too_large =
            distance.clone().gt(Expr::int_constant(width, distance_type));

        let op_zero = operand.clone().eq(Expr::int_constant(0, op_type.clone()));

        // shift in double width and require the top bits to be zero
        let double_width = Type::signed_int(width * 2);
        let op_ext_shifted =
            operand.clone().cast_to(double_width).shl(distance.clone());

        // 1 << (width-1) is well defined in some standards and undefined in
        // others; when it is undefined the sign bit joins the checked bits
        let allow_shift_into_sign_bit = match self.mode {
            Mode::C => !matches!(self.options.c_standard, CStandard::C99 | CStandard::C11),
            Mode::Cpp => {
                !matches!(self.options.cpp_standard, CppStandard::Cpp11 | CppStandard::Cpp14)
            }
            Mode::ManagedReference => true,
        };
        let number_of_top_bits = if allow_shift_into_sign_bit { width } else { width + 1 };

        let unsigned_double = Type::unsigned_int(width * 2);
        let top_bits = op_ext_shifted
            .cast_to(unsigned_double.clone())
            .lshr(Expr::int_constant(2 * width - number_of_top_bits, unsigned_double.clone()));
        let top_bits_zero = top_bits.eq(Expr::int_constant(0, unsigned_double));

        self.add_guarded_property(
            Expr::disjunction(vec![
                neg_value_shift,
                neg_dist_shift,
                dist_too_large,
                op_zero,
                top_bits_zero,
            ]),
            "arithmetic overflow on signed shl",
            PropertyClass::Overflow,
            *expr.location(),
            expr,
            guard,
        );
    }

    fn float_overflow_check(&mut self, expr: &Expr, guard: &Guard) {
        if !self.flags.float_overflow_check {
            return;
        }
        if !expr.typ().is_float() {
            return;
        }

        match expr.value() {
            ExprValue::Typecast(op) => {
                let overflow_check = if op.typ().is_float() {
                    // float-to-float: only an already-infinite input excuses an infinite result
                    op.clone().is_infinite().or(expr.clone().is_infinite().not())
                } else {
                    expr.clone().is_infinite().not()
                };
                self.add_guarded_property(
                    overflow_check,
                    "arithmetic overflow on floating-point typecast",
                    PropertyClass::Overflow,
                    *expr.location(),
                    expr,
                    guard,
                );
            }
            ExprValue::BinOp { op: BinaryOperator::Div, lhs, .. } => {
                let overflow_check =
                    lhs.clone().is_infinite().or(expr.clone().is_infinite().not());
                self.add_guarded_property(
                    overflow_check,
                    "arithmetic overflow on floating-point division",
                    PropertyClass::Overflow,
                    *expr.location(),
                    expr,
                    guard,
                );
            }
            ExprValue::BinOp { op: BinaryOperator::Mod, .. }
            | ExprValue::UnOp { op: UnaryOperator::UnaryMinus, .. } => {
                // cannot overflow
            }
            ExprValue::BinOp {
                op: op @ (BinaryOperator::Plus | BinaryOperator::Minus | BinaryOperator::Mult),
                lhs,
                rhs,
            } => {
                let kind = match op {
                    BinaryOperator::Plus => "addition",
                    BinaryOperator::Minus => "subtraction",
                    BinaryOperator::Mult => "multiplication",
                    _ => unreachable!(),
                };
                let overflow_check = lhs
                    .clone()
                    .is_infinite()
                    .or(rhs.clone().is_infinite())
                    .or(expr.clone().is_infinite().not());
                self.add_guarded_property(
                    overflow_check,
                    &format!("arithmetic overflow on floating-point {kind}"),
                    PropertyClass::Overflow,
                    *expr.location(),
                    expr,
                    guard,
                );
            }
            _ => {}
        }
    }

    /// A fresh NaN can only appear from 0/0 or x/∞, from 0 × ∞, from adding
    /// opposite-sign infinities, or from subtracting same-sign infinities.
    fn nan_check(&mut self, expr: &Expr, guard: &Guard) {
        if !self.flags.nan_check {
            return;
        }
        if !expr.typ().is_float() {
            return;
        }

        let ExprValue::BinOp { op, lhs, rhs } = expr.value() else {
            return;
        };

        let float_typ = expr.typ().clone();
        let isnan = match op {
            BinaryOperator::Div => {
                // 0/0 = NaN and x/±∞ = NaN (x/0 is ±∞ for x != 0)
                let zero_div_zero = lhs
                    .clone()
                    .feq(Expr::zero(lhs.typ().clone()))
                    .and(rhs.clone().feq(Expr::zero(rhs.typ().clone())));
                zero_div_zero.or(rhs.clone().is_infinite())
            }
            BinaryOperator::Mult => {
                let inf_times_zero = lhs
                    .clone()
                    .is_infinite()
                    .and(rhs.clone().feq(Expr::zero(rhs.typ().clone())));
                let zero_times_inf = lhs
                    .clone()
                    .feq(Expr::zero(lhs.typ().clone()))
                    .and(rhs.clone().is_infinite());
                inf_times_zero.or(zero_times_inf)
            }
            BinaryOperator::Plus => {
                // -∞ + +∞ and +∞ + -∞, i.e. the signs differ
                let plus_inf = Expr::plus_infinity(&float_typ);
                let minus_inf = Expr::minus_infinity(&float_typ);
                lhs.clone()
                    .eq(minus_inf.clone())
                    .and(rhs.clone().eq(plus_inf.clone()))
                    .or(lhs.clone().eq(plus_inf).and(rhs.clone().eq(minus_inf)))
            }
            BinaryOperator::Minus => {
                // +∞ - +∞ and -∞ - -∞, i.e. the signs match
                let plus_inf = Expr::plus_infinity(&float_typ);
                let minus_inf = Expr::minus_infinity(&float_typ);
                lhs.clone()
                    .eq(plus_inf.clone())
                    .and(rhs.clone().eq(plus_inf))
                    .or(lhs.clone().eq(minus_inf.clone()).and(rhs.clone().eq(minus_inf)))
            }
            _ => return,
        };

        self.add_guarded_property(
            boolean_negate(isnan),
            &format!("NaN on {}", op.op_name()),
            PropertyClass::Nan,
            *expr.location(),
            expr,
            guard,
        );
    }

    /// Relational operators on pointers are only defined within one object.
    fn pointer_rel_check(&mut self, expr: &Expr, lhs: &Expr, rhs: &Expr, guard: &Guard) {
        if !self.flags.pointer_check {
            return;
        }

        if lhs.typ().is_pointer() && rhs.typ().is_pointer() {
            let same_object = lhs.clone().same_object(rhs.clone());
            self.add_guarded_property(
                same_object,
                "same object violation",
                PropertyClass::Pointer,
                *expr.location(),
                expr,
                guard,
            );
        }
    }

    fn pointer_overflow_check(&mut self, expr: &Expr, guard: &Guard) {
        if !self.flags.pointer_overflow_check {
            return;
        }

        let ExprValue::BinOp {
            op: op @ (BinaryOperator::Plus | BinaryOperator::Minus),
            lhs,
            rhs,
        } = expr.value()
        else {
            return;
        };

        let overflow = match op {
            BinaryOperator::Plus => lhs.clone().add_overflow_p(rhs.clone()),
            BinaryOperator::Minus => lhs.clone().sub_overflow_p(rhs.clone()),
            _ => unreachable!(),
        };

        self.add_guarded_property(
            overflow.not(),
            &format!("pointer arithmetic overflow on {}", op.op_name()),
            PropertyClass::Overflow,
            *expr.location(),
            expr,
            guard,
        );
    }

    ///////////////////////////////////////////////////////////////////////////////////////////
    // Pointer validity
    ///////////////////////////////////////////////////////////////////////////////////////////

    /// Obligations for the validity of a dereference. `src_expr` is the
    /// expression as found in the program, prior to any rewriting.
    fn pointer_validity_check(
        &mut self,
        deref_expr: &Expr,
        src_expr: &Expr,
        guard: &Guard,
    ) -> Result<(), CheckError> {
        if !self.flags.pointer_check {
            return Ok(());
        }

        let ExprValue::Dereference(pointer) = deref_expr.value() else {
            unreachable!("dereference expected");
        };

        let size = size_of_expr(deref_expr.typ())
            .ok_or_else(|| CheckError::UnknownPointeeSize(deref_expr.typ().to_string()))?;

        for condition in self.address_check(pointer, &size) {
            self.add_guarded_property(
                condition.assertion,
                &format!("dereference failure: {}", condition.description),
                PropertyClass::PointerDereference,
                *src_expr.location(),
                src_expr,
                guard,
            );
        }
        Ok(())
    }

    /// The obligations for an access of `size` bytes through `address`, one
    /// per possible shape of the pointer. Most are weakened by containment in
    /// an explicitly registered allocation.
    fn address_check(&self, address: &Expr, size: &Expr) -> Vec<Condition> {
        let flags = self.pointer_flags(address);

        // for managed references only null-ness can go wrong
        if self.mode == Mode::ManagedReference {
            if flags.is_unknown() || flags.is_null() {
                let not_null =
                    address.clone().neq(Expr::null_pointer(address.typ().clone()));
                return vec![Condition { assertion: not_null, description: "reference is null" }];
            }
            return vec![];
        }

        let mut conditions = Vec::new();
        let in_allocation = self.in_any_allocation(address, size);

        if flags.is_unknown() || flags.is_null() {
            conditions.push(Condition {
                assertion: in_allocation.clone().or(predicates::null_pointer(address).not()),
                description: "pointer NULL",
            });
        }

        if flags.is_unknown() {
            conditions.push(Condition {
                assertion: address.clone().is_invalid_pointer().not(),
                description: "pointer invalid",
            });
        }

        if flags.is_uninitialized() {
            conditions.push(Condition {
                assertion: in_allocation
                    .clone()
                    .or(address.clone().is_invalid_pointer().not()),
                description: "pointer uninitialized",
            });
        }

        if flags.is_unknown() || flags.is_dynamic_heap() {
            conditions.push(Condition {
                assertion: in_allocation.clone().or(predicates::deallocated(address).not()),
                description: "deallocated dynamic object",
            });
        }

        if flags.is_unknown() || flags.is_dynamic_local() {
            conditions.push(Condition {
                assertion: in_allocation.clone().or(predicates::dead_object(address).not()),
                description: "dead object",
            });
        }

        if flags.is_unknown() || flags.is_dynamic_heap() {
            let dynamic_bounds_violation = predicates::dynamic_object_lower_bound(address)
                .or(predicates::dynamic_object_upper_bound(address, size));
            conditions.push(Condition {
                assertion: in_allocation.clone().or(predicates::malloc_object(address)
                    .implies(dynamic_bounds_violation.not())),
                description: "pointer outside dynamic object bounds",
            });
        }

        if flags.is_unknown() || flags.is_dynamic_local() || flags.is_static_lifetime() {
            let object_bounds_violation = predicates::object_lower_bound(address)
                .or(predicates::object_upper_bound(address, size));
            conditions.push(Condition {
                assertion: in_allocation.clone().or(address
                    .clone()
                    .is_dynamic_object()
                    .not()
                    .implies(object_bounds_violation.not())),
                description: "pointer outside object bounds",
            });
        }

        if flags.is_unknown() || flags.is_integer_address() {
            conditions.push(Condition {
                assertion: predicates::integer_address(address).implies(in_allocation),
                description: "invalid integer address",
            });
        }

        conditions
    }

    /// `∃ (base, size) registered: base <= p && p + access_size <= base + size`
    fn in_any_allocation(&self, pointer: &Expr, access_size: &Expr) -> Expr {
        let mut disjuncts = Vec::new();
        for allocation in self.allocations {
            let base_type = allocation.address.typ().clone();
            let int_ptr = pointer.clone().cast_to(base_type.clone());
            let lower = allocation.address.clone().le(int_ptr.clone());
            let upper = int_ptr
                .plus(access_size.clone().cast_to(base_type))
                .le(allocation.address.clone().plus(allocation.size.clone()));
            disjuncts.push(lower.and(upper));
        }
        Expr::disjunction(disjuncts)
    }

    /// Expand every `r_ok`/`w_ok` predicate into the conjunction of its
    /// address-check obligations, in place.
    fn expand_rw_ok(&self, expr: &Expr) -> Expr {
        match expr.value() {
            ExprValue::ReadOk { ptr, size } | ExprValue::WriteOk { ptr, size } => {
                let conditions = self.address_check(ptr, size);
                Expr::conjunction(conditions.into_iter().map(|c| c.assertion).collect())
            }
            _ => expr.map_sub_exprs(&mut |e| self.expand_rw_ok(e)),
        }
    }

    ///////////////////////////////////////////////////////////////////////////////////////////
    // Bounds
    ///////////////////////////////////////////////////////////////////////////////////////////

    fn bounds_check(&mut self, expr: &Expr, guard: &Guard) -> Result<(), CheckError> {
        if !self.flags.bounds_check {
            return Ok(());
        }

        if expr.bounds_check() == Some(false) {
            return Ok(());
        }

        let ExprValue::Index { array, index } = expr.value() else {
            unreachable!("index expected");
        };

        let array_type = array.typ();
        if !array_type.is_array() && !array_type.is_vector() {
            return Err(CheckError::IndexNotAnArray(array_type.to_string()));
        }

        let name = array_name(array);
        let ode = ObjectDescriptor::build(expr);
        let root_pointer = match ode.root_object.value() {
            ExprValue::Dereference(pointer) => Some(pointer.clone()),
            _ => None,
        };

        // lower bound, unless the index is provably non-negative
        if !index.typ().is_unsigned() {
            // we undo a direct typecast from an unsigned value
            let cast_from_unsigned = match index.value() {
                ExprValue::Typecast(op) => op.typ().is_unsigned(),
                _ => false,
            };
            let nonneg_constant =
                index.int_constant_value().map_or(false, |i| *i >= BigInt::from(0));
            if !cast_from_unsigned && !nonneg_constant {
                let inequality = match (&root_pointer, &ode.offset) {
                    (Some(pointer), Some(offset)) => {
                        // sum in the pointer's own offset within its object
                        let effective =
                            pointer.clone().pointer_offset().plus(offset.clone());
                        effective.ge(Expr::int_constant(0, Type::ssize_t()))
                    }
                    _ => index.clone().ge(Expr::int_constant(0, index.typ().clone())),
                };
                self.add_guarded_property(
                    inequality,
                    &format!("{name} lower bound"),
                    PropertyClass::ArrayBounds,
                    *expr.location(),
                    expr,
                    guard,
                );
            }
        }

        // when the array sits behind a pointer, the object's run-time extent
        // bounds the access; the declared type only matters if it matches
        let mut type_matches_size = Expr::bool_true();
        if let Some(pointer) = &root_pointer {
            if let Some(offset) = &ode.offset {
                let size = Expr::if_then_else(
                    pointer.clone().is_dynamic_object(),
                    predicates::dynamic_size(),
                    pointer.clone().object_size(),
                );
                let effective =
                    offset.clone().plus(pointer.clone().pointer_offset());
                let inequality = effective.lt(size.cast_to(Type::ssize_t()));

                let mut disjuncts = Vec::new();
                for allocation in self.allocations {
                    let base_type = allocation.address.typ().clone();
                    let int_ptr = pointer.clone().cast_to(base_type.clone());
                    let lower = allocation.address.clone().le(int_ptr.clone());
                    let upper = int_ptr
                        .plus(offset.clone().cast_to(base_type))
                        .lt(allocation.address.clone().plus(allocation.size.clone()));
                    disjuncts.push(lower.and(upper));
                }
                let in_allocation = Expr::disjunction(disjuncts);

                let precondition = in_allocation
                    .or(pointer
                        .clone()
                        .is_dynamic_object()
                        .and(predicates::malloc_object(pointer).not()))
                    .or(inequality);

                self.add_guarded_property(
                    precondition,
                    &format!("{name} dynamic object upper bound"),
                    PropertyClass::ArrayBounds,
                    *expr.location(),
                    expr,
                    guard,
                );
            }

            if let Some(type_size) = size_of_type(ode.root_object.typ()) {
                // true iff the compile-time size matches the run-time size;
                // heap objects report their size through the allocation sentinel
                let type_size = Expr::int_constant(type_size, Type::size_t());
                type_matches_size = Expr::if_then_else(
                    pointer.clone().is_dynamic_object(),
                    predicates::malloc_object(pointer)
                        .and(predicates::dynamic_size().eq(type_size.clone())),
                    pointer.clone().object_size().eq(type_size),
                );
            }
        }

        enum SizeBound {
            None,
            Flexible,
            Bounded(Expr),
        }

        let bound = match array_type {
            Type::Array { size, .. } => match size {
                ArraySize::Unknown | ArraySize::Infinite => SizeBound::None,
                ArraySize::Expr(size) => {
                    let is_member = match array.value() {
                        ExprValue::Member { .. } => true,
                        _ => false,
                    };
                    if size.is_zero() && is_member {
                        SizeBound::Flexible
                    } else {
                        SizeBound::Bounded((**size).clone())
                    }
                }
            },
            Type::Vector { size, .. } => {
                SizeBound::Bounded(Expr::int_constant(*size, Type::size_t()))
            }
            _ => unreachable!(),
        };

        match bound {
            SizeBound::None => {}
            SizeBound::Flexible => {
                // a zero-sized trailing member behaves as the longest array
                // that fits the enclosing object
                let Some(enclosing_size) = size_of_type(ode.root_object.typ()) else {
                    return Ok(());
                };
                let Some(offset) = &ode.offset else {
                    return Ok(());
                };
                let enclosing_size = Expr::int_constant(enclosing_size, Type::size_t());
                let inequality =
                    offset.clone().cast_to(Type::size_t()).lt(enclosing_size);
                self.add_guarded_property(
                    type_matches_size.implies(inequality),
                    &format!("{name} upper bound"),
                    PropertyClass::ArrayBounds,
                    *expr.location(),
                    expr,
                    guard,
                );
            }
            SizeBound::Bounded(size) => {
                let size_casted = size.cast_to(index.typ().clone());
                let inequality = index.clone().lt(size_casted);
                self.add_guarded_property(
                    type_matches_size.implies(inequality),
                    &format!("{name} upper bound"),
                    PropertyClass::ArrayBounds,
                    *expr.location(),
                    expr,
                    guard,
                );
            }
        }

        Ok(())
    }

    ///////////////////////////////////////////////////////////////////////////////////////////
    // Conversions
    ///////////////////////////////////////////////////////////////////////////////////////////

    fn conversion_check(&mut self, expr: &Expr, guard: &Guard) {
        if !self.flags.conversion_check {
            return;
        }

        let typ = expr.typ().clone();
        if !typ.is_bitvector() {
            return;
        }

        let ExprValue::Typecast(op) = expr.value() else {
            return;
        };
        let old_type = op.typ().clone();

        if typ.is_signed() {
            let new_width = typ.width().unwrap();
            if old_type.is_signed() {
                let old_width = old_type.width().unwrap();
                if new_width >= old_width {
                    return; // always fits
                }
                let no_overflow_upper = op
                    .clone()
                    .le(Expr::int_constant(max_int(new_width, true), old_type.clone()));
                let no_overflow_lower =
                    op.clone().ge(Expr::int_constant(min_int(new_width, true), old_type));
                self.add_guarded_property(
                    no_overflow_lower.and(no_overflow_upper),
                    "arithmetic overflow on signed type conversion",
                    PropertyClass::Overflow,
                    *expr.location(),
                    expr,
                    guard,
                );
            } else if old_type.is_unsigned() {
                let old_width = old_type.width().unwrap();
                if new_width >= old_width + 1 {
                    return; // always fits
                }
                let no_overflow_upper =
                    op.clone().le(Expr::int_constant(max_int(new_width, true), old_type));
                self.add_guarded_property(
                    no_overflow_upper,
                    "arithmetic overflow on unsigned to signed type conversion",
                    PropertyClass::Overflow,
                    *expr.location(),
                    expr,
                    guard,
                );
            } else if old_type.is_float() {
                // the fractional part is truncated, so the strict bounds are
                // one past the largest and smallest representable values
                let upper = float_constant_of(exp2(new_width - 1), &old_type);
                let lower = float_constant_of(-exp2(new_width - 1) - 1.0, &old_type);
                let no_overflow_upper = op.clone().lt(upper);
                let no_overflow_lower = op.clone().gt(lower);
                self.add_guarded_property(
                    no_overflow_lower.and(no_overflow_upper),
                    "arithmetic overflow on float to signed integer type conversion",
                    PropertyClass::Overflow,
                    *expr.location(),
                    expr,
                    guard,
                );
            }
        } else if typ.is_unsigned() {
            let new_width = typ.width().unwrap();
            if old_type.is_signed() {
                let old_width = old_type.width().unwrap();
                let no_overflow_lower =
                    op.clone().ge(Expr::int_constant(0, old_type.clone()));
                if new_width >= old_width - 1 {
                    // only the lower bound can be violated
                    self.add_guarded_property(
                        no_overflow_lower,
                        "arithmetic overflow on signed to unsigned type conversion",
                        PropertyClass::Overflow,
                        *expr.location(),
                        expr,
                        guard,
                    );
                } else {
                    let no_overflow_upper = op
                        .clone()
                        .le(Expr::int_constant(max_int(new_width, false), old_type));
                    self.add_guarded_property(
                        no_overflow_lower.and(no_overflow_upper),
                        "arithmetic overflow on signed to unsigned type conversion",
                        PropertyClass::Overflow,
                        *expr.location(),
                        expr,
                        guard,
                    );
                }
            } else if old_type.is_unsigned() {
                let old_width = old_type.width().unwrap();
                if new_width >= old_width {
                    return; // always fits
                }
                let no_overflow_upper = op
                    .clone()
                    .le(Expr::int_constant(max_int(new_width, false), old_type));
                self.add_guarded_property(
                    no_overflow_upper,
                    "arithmetic overflow on unsigned to unsigned type conversion",
                    PropertyClass::Overflow,
                    *expr.location(),
                    expr,
                    guard,
                );
            } else if old_type.is_float() {
                let upper = float_constant_of(exp2(new_width) - 1.0, &old_type);
                let lower = float_constant_of(-1.0, &old_type);
                let no_overflow_upper = op.clone().lt(upper);
                let no_overflow_lower = op.clone().gt(lower);
                self.add_guarded_property(
                    no_overflow_lower.and(no_overflow_upper),
                    "arithmetic overflow on float to unsigned integer type conversion",
                    PropertyClass::Overflow,
                    *expr.location(),
                    expr,
                    guard,
                );
            }
        }
    }
}

/// `!e`, removing a double negation.
fn boolean_negate(e: Expr) -> Expr {
    match e.value() {
        ExprValue::UnOp { op: UnaryOperator::Not, e: inner } => inner.clone(),
        _ => e.not(),
    }
}

fn exp2(width: u64) -> f64 {
    2f64.powi(width as i32)
}

fn float_constant_of(value: f64, typ: &Type) -> Expr {
    match typ {
        Type::Float => Expr::float_constant(value as f32),
        Type::Double => Expr::double_constant(value),
        _ => unreachable!("float constant requires a floating-point type, got {typ}"),
    }
}

/// A human-readable name for the array being accessed, used in obligation
/// comments.
fn array_name(expr: &Expr) -> String {
    match expr.value() {
        ExprValue::Symbol { identifier } => format!("array '{identifier}'"),
        ExprValue::Index { array, .. } => format!("{}[]", array_name(array)),
        ExprValue::Member { lhs, field } => format!("{}.{field}", array_name(lhs)),
        _ => "array".to_string(),
    }
}
