// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A per-function forward analysis computing, for every instruction and
//! pointer-valued expression, the set of shapes the pointer may have. The
//! pointer-validity check emits one obligation per possible shape, so a
//! smaller flag set means fewer obligations; `unknown` is always sound.

use crate::InternedString;
use crate::cprover;
use crate::goto_program::{
    BinaryOperator, Expr, ExprValue, GotoFunction, Instruction, InstructionBody, OtherStatement,
    SymbolTable,
};
use std::collections::{HashMap, HashSet, VecDeque};
use std::ops::{BitOr, BitOrAssign};

///////////////////////////////////////////////////////////////////////////////////////////////
/// Datatypes
///////////////////////////////////////////////////////////////////////////////////////////////

/// The set of shapes a pointer value may have at a program point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointerFlags {
    bits: u16,
}

impl PointerFlags {
    pub const EMPTY: PointerFlags = PointerFlags { bits: 0 };
    /// Nothing is known; every shape is possible.
    pub const UNKNOWN: PointerFlags = PointerFlags { bits: 1 };
    pub const NULL: PointerFlags = PointerFlags { bits: 1 << 1 };
    pub const UNINITIALIZED: PointerFlags = PointerFlags { bits: 1 << 2 };
    /// Points into the heap.
    pub const DYNAMIC_HEAP: PointerFlags = PointerFlags { bits: 1 << 3 };
    /// Points at an address-taken local.
    pub const DYNAMIC_LOCAL: PointerFlags = PointerFlags { bits: 1 << 4 };
    /// Points at an object with static storage duration.
    pub const STATIC_LIFETIME: PointerFlags = PointerFlags { bits: 1 << 5 };
    /// Forged from an integer.
    pub const INTEGER_ADDRESS: PointerFlags = PointerFlags { bits: 1 << 6 };
    /// Known not to point at any live object.
    pub const INVALID: PointerFlags = PointerFlags { bits: 1 << 7 };

    fn contains(self, other: PointerFlags) -> bool {
        self.bits & other.bits != 0
    }

    pub fn is_unknown(self) -> bool {
        self.contains(Self::UNKNOWN)
    }

    pub fn is_null(self) -> bool {
        self.contains(Self::NULL)
    }

    pub fn is_uninitialized(self) -> bool {
        self.contains(Self::UNINITIALIZED)
    }

    pub fn is_dynamic_heap(self) -> bool {
        self.contains(Self::DYNAMIC_HEAP)
    }

    pub fn is_dynamic_local(self) -> bool {
        self.contains(Self::DYNAMIC_LOCAL)
    }

    pub fn is_static_lifetime(self) -> bool {
        self.contains(Self::STATIC_LIFETIME)
    }

    pub fn is_integer_address(self) -> bool {
        self.contains(Self::INTEGER_ADDRESS)
    }

    pub fn is_invalid(self) -> bool {
        self.contains(Self::INVALID)
    }
}

impl BitOr for PointerFlags {
    type Output = PointerFlags;

    fn bitor(self, rhs: PointerFlags) -> PointerFlags {
        PointerFlags { bits: self.bits | rhs.bits }
    }
}

impl BitOrAssign for PointerFlags {
    fn bitor_assign(&mut self, rhs: PointerFlags) {
        self.bits |= rhs.bits;
    }
}

type State = HashMap<InternedString, PointerFlags>;

/// The analysis result: flag states at the entry of every instruction, plus
/// the set of locals whose address is taken somewhere in the body.
#[derive(Debug)]
pub struct LocalPointerAnalysis {
    states: Vec<State>,
    dirty: HashSet<InternedString>,
}

///////////////////////////////////////////////////////////////////////////////////////////////
/// Implementations
///////////////////////////////////////////////////////////////////////////////////////////////

impl LocalPointerAnalysis {
    /// Run the forward fixpoint over `function`.
    pub fn new(function: &GotoFunction, st: &SymbolTable) -> Self {
        let body = function.body.instructions();
        let count = body.len();

        let mut dirty = HashSet::new();
        for instruction in body {
            for e in instruction_exprs(instruction) {
                collect_dirty(e, &mut dirty);
            }
        }

        let labels = function.body.label_map();
        let mut states: Vec<State> = vec![State::new(); count];
        let mut visited = vec![false; count];
        let mut worklist = VecDeque::new();
        if count > 0 {
            visited[0] = true;
            worklist.push_back(0);
        }

        while let Some(index) = worklist.pop_front() {
            let mut out = states[index].clone();
            transfer(&mut out, &body[index], st, &dirty);

            for successor in successors(index, &body[index], count, &labels) {
                let first_time = !visited[successor];
                visited[successor] = true;
                if merge(&mut states[successor], &out, first_time) {
                    worklist.push_back(successor);
                }
            }
        }

        LocalPointerAnalysis { states, dirty }
    }

    /// The shapes `e` may have just before the instruction at `at`.
    pub fn get(&self, at: usize, e: &Expr, st: &SymbolTable) -> PointerFlags {
        match self.states.get(at) {
            Some(state) => eval(e, state, st),
            None => eval(e, &State::new(), st),
        }
    }

    /// Whether the address of this local escapes somewhere in the body.
    pub fn is_dirty(&self, identifier: InternedString) -> bool {
        self.dirty.contains(&identifier)
    }
}

/// Join `src` into `dest`. A key missing on one side means that path knows
/// nothing, so established keys degrade towards `unknown`.
fn merge(dest: &mut State, src: &State, first_time: bool) -> bool {
    if first_time {
        *dest = src.clone();
        return true;
    }
    let mut changed = false;
    for (key, value) in dest.iter_mut() {
        if !src.contains_key(key) {
            let joined = *value | PointerFlags::UNKNOWN;
            if joined != *value {
                *value = joined;
                changed = true;
            }
        }
    }
    for (key, value) in src {
        match dest.get_mut(key) {
            Some(old) => {
                let joined = *old | *value;
                if joined != *old {
                    *old = joined;
                    changed = true;
                }
            }
            None => {
                dest.insert(*key, *value | PointerFlags::UNKNOWN);
                changed = true;
            }
        }
    }
    changed
}

fn successors(
    index: usize,
    instruction: &Instruction,
    count: usize,
    labels: &HashMap<InternedString, usize>,
) -> Vec<usize> {
    match instruction.body() {
        InstructionBody::Goto { condition, target } => {
            let mut succ = Vec::new();
            if condition.is_some() && index + 1 < count {
                succ.push(index + 1);
            }
            if let Some(target_index) = labels.get(target) {
                succ.push(*target_index);
            }
            succ
        }
        InstructionBody::Return { .. }
        | InstructionBody::Throw { .. }
        | InstructionBody::EndFunction => Vec::new(),
        _ => {
            if index + 1 < count {
                vec![index + 1]
            } else {
                Vec::new()
            }
        }
    }
}

fn transfer(state: &mut State, instruction: &Instruction, st: &SymbolTable, dirty: &HashSet<InternedString>) {
    match instruction.body() {
        InstructionBody::Decl { symbol } => {
            if symbol.typ().is_pointer() {
                state.insert(symbol.symbol_identifier().unwrap(), PointerFlags::UNINITIALIZED);
            }
        }
        InstructionBody::Dead { symbol } => {
            if symbol.typ().is_pointer() {
                state.insert(symbol.symbol_identifier().unwrap(), PointerFlags::INVALID);
            }
        }
        InstructionBody::Assign { lhs, rhs } => {
            if let Some(identifier) = lhs.symbol_identifier() {
                if lhs.typ().is_pointer() {
                    let flags = eval(rhs, state, st);
                    state.insert(identifier, flags);
                }
            } else {
                // a write through memory may redirect any address-taken pointer
                for (identifier, flags) in state.iter_mut() {
                    if dirty.contains(identifier) {
                        *flags = PointerFlags::UNKNOWN;
                    }
                }
            }
        }
        InstructionBody::FunctionCall { lhs, function, .. } => {
            for (identifier, flags) in state.iter_mut() {
                if dirty.contains(identifier) {
                    *flags = PointerFlags::UNKNOWN;
                }
            }
            if let Some(lhs) = lhs {
                if let Some(identifier) = lhs.symbol_identifier() {
                    if lhs.typ().is_pointer() {
                        let allocates = function.symbol_identifier().map_or(false, |f| {
                            f == "malloc" || f == cprover::ALLOCATE
                        });
                        let flags = if allocates {
                            PointerFlags::DYNAMIC_HEAP
                        } else {
                            PointerFlags::UNKNOWN
                        };
                        state.insert(identifier, flags);
                    }
                }
            }
        }
        _ => {}
    }
}

/// Evaluate the shape of a pointer-valued expression under a state.
fn eval(e: &Expr, state: &State, st: &SymbolTable) -> PointerFlags {
    if !e.typ().is_pointer() {
        return PointerFlags::UNKNOWN;
    }
    match e.value() {
        ExprValue::Symbol { identifier } => {
            state.get(identifier).copied().unwrap_or(PointerFlags::UNKNOWN)
        }
        ExprValue::PointerConstant(0) => PointerFlags::NULL,
        ExprValue::PointerConstant(_) => PointerFlags::INTEGER_ADDRESS,
        ExprValue::AddressOf(object) => match root_symbol(object) {
            Some(identifier) => {
                if st.lookup(identifier).map_or(false, |s| s.is_static_lifetime) {
                    PointerFlags::STATIC_LIFETIME
                } else {
                    PointerFlags::DYNAMIC_LOCAL
                }
            }
            None => PointerFlags::UNKNOWN,
        },
        ExprValue::Typecast(op) => {
            if op.typ().is_pointer() {
                eval(op, state, st)
            } else if op.typ().is_bitvector() {
                PointerFlags::INTEGER_ADDRESS
            } else {
                PointerFlags::UNKNOWN
            }
        }
        ExprValue::If { t, e, .. } => eval(t, state, st) | eval(e, state, st),
        ExprValue::BinOp { op: BinaryOperator::Plus | BinaryOperator::Minus, lhs, rhs } => {
            if lhs.typ().is_pointer() {
                eval(lhs, state, st)
            } else if rhs.typ().is_pointer() {
                eval(rhs, state, st)
            } else {
                PointerFlags::UNKNOWN
            }
        }
        _ => PointerFlags::UNKNOWN,
    }
}

/// The symbol an lvalue expression lives in, when it is syntactically
/// evident.
fn root_symbol(e: &Expr) -> Option<InternedString> {
    match e.value() {
        ExprValue::Symbol { identifier } => Some(*identifier),
        ExprValue::Index { array, .. } => root_symbol(array),
        ExprValue::Member { lhs, .. } => root_symbol(lhs),
        _ => None,
    }
}

/// All expressions an instruction evaluates or assigns.
fn instruction_exprs(instruction: &Instruction) -> Vec<&Expr> {
    match instruction.body() {
        InstructionBody::Assert { cond } | InstructionBody::Assume { cond } => vec![cond],
        InstructionBody::Assign { lhs, rhs } => vec![lhs, rhs],
        InstructionBody::Dead { symbol } | InstructionBody::Decl { symbol } => vec![symbol],
        InstructionBody::FunctionCall { lhs, function, arguments } => {
            let mut exprs: Vec<&Expr> = lhs.iter().collect();
            exprs.push(function);
            exprs.extend(arguments.iter());
            exprs
        }
        InstructionBody::Goto { condition, .. } => condition.iter().collect(),
        InstructionBody::Other { statement } => match statement {
            OtherStatement::Expression(e) => vec![e],
            OtherStatement::Printf { arguments } => arguments.iter().collect(),
        },
        InstructionBody::Return { value } => value.iter().collect(),
        InstructionBody::Throw { exception } => vec![exception],
        InstructionBody::EndFunction | InstructionBody::Skip => Vec::new(),
    }
}

fn collect_dirty(e: &Expr, dirty: &mut HashSet<InternedString>) {
    if let ExprValue::AddressOf(object) = e.value() {
        if let Some(identifier) = root_symbol(object) {
            dirty.insert(identifier);
        }
    }
    for sub in e.sub_exprs() {
        collect_dirty(sub, dirty);
    }
}
