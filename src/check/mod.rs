// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The safety-check instrumentation pass.
//!
//! [`check_goto_model`] walks every function of a goto model and splices
//! assertions (or assumptions) in front of each instruction that could
//! exhibit undefined behavior. Which categories of checks are emitted is
//! governed by [`CheckOptions`].

mod allocations;
mod checker;
mod guard;
mod local_pointers;
mod predicates;

pub use allocations::{Allocation, collect_allocations};
pub use guard::Guard;
pub use local_pointers::{LocalPointerAnalysis, PointerFlags};

use crate::InternedString;
use crate::goto_program::{GotoFunction, GotoModel, SymbolTable};
use checker::Checker;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

/// Classification of an emitted property, rendered into the property-class
/// slot of the instruction's location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyClass {
    ArrayBounds,
    DivisionByZero,
    ErrorLabel,
    MemoryLeak,
    Nan,
    Overflow,
    Pointer,
    PointerDereference,
    UndefinedShift,
}

impl PropertyClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyClass::ArrayBounds => "array bounds",
            PropertyClass::DivisionByZero => "division-by-zero",
            PropertyClass::ErrorLabel => "error label",
            PropertyClass::MemoryLeak => "memory-leak",
            PropertyClass::Nan => "NaN",
            PropertyClass::Overflow => "overflow",
            PropertyClass::Pointer => "pointer",
            PropertyClass::PointerDereference => "pointer dereference",
            PropertyClass::UndefinedShift => "undefined-shift",
        }
    }
}

/// The fatal failures of the pass: malformed input that cannot be
/// instrumented. Emitted obligations are never errors; they are decided later
/// by the model checker.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("expected two unsigned bit-vector arguments of equal width to {0}")]
    MalformedAllocationCall(String),
    #[error("index applied to operand of non-array type {0}")]
    IndexNotAnArray(String),
    #[error("cannot compute the size of {0} for a pointer dereference")]
    UnknownPointeeSize(String),
    #[error("no symbol named {0}")]
    MissingSymbol(String),
}

/// The C standard the program was compiled against. C99 and C11 make a left
/// shift into the sign bit undefined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CStandard {
    C89,
    C99,
    C11,
}

/// The C++ standard; C++11 and C++14 make a left shift into the sign bit
/// undefined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CppStandard {
    Cpp98,
    Cpp11,
    Cpp14,
}

/// A value in the caller's option map.
#[derive(Debug, Clone)]
pub enum OptionValue {
    Bool(bool),
    List(Vec<String>),
}

/// A string-keyed option map, the interface the host driver hands its parsed
/// command line through.
#[derive(Debug, Default)]
pub struct Options {
    map: BTreeMap<InternedString, OptionValue>,
}

impl Options {
    pub fn new() -> Self {
        Options::default()
    }

    pub fn set_bool<T: Into<InternedString>>(&mut self, key: T, value: bool) {
        self.map.insert(key.into(), OptionValue::Bool(value));
    }

    pub fn set_list<T: Into<InternedString>>(&mut self, key: T, value: Vec<String>) {
        self.map.insert(key.into(), OptionValue::List(value));
    }

    pub fn get_bool_option(&self, key: &str) -> bool {
        match self.map.get(&key.into()) {
            Some(OptionValue::Bool(b)) => *b,
            _ => false,
        }
    }

    pub fn get_list_option(&self, key: &str) -> Vec<String> {
        match self.map.get(&key.into()) {
            Some(OptionValue::List(l)) => l.clone(),
            _ => Vec::new(),
        }
    }
}

/// Help text for the collaborator-facing command line flags, each of which
/// maps one-to-one onto an option key.
pub const CHECK_HELP: &str = "\
 --bounds-check               enable array bounds checks\n\
 --pointer-check              enable pointer checks\n\
 --memory-leak-check          enable memory leak checks\n\
 --div-by-zero-check          enable division by zero checks\n\
 --signed-overflow-check      enable signed arithmetic over- and underflow checks\n\
 --unsigned-overflow-check    enable arithmetic over- and underflow checks\n\
 --undefined-shift-check      check shift greater than bit-width\n\
 --float-overflow-check       check floating-point for +/-Inf\n\
 --nan-check                  check floating-point for NaN\n";

/// The configuration of one instrumentation run.
#[derive(Debug, Clone)]
pub struct CheckOptions {
    pub bounds_check: bool,
    pub pointer_check: bool,
    pub memory_leak_check: bool,
    pub div_by_zero_check: bool,
    pub signed_overflow_check: bool,
    pub unsigned_overflow_check: bool,
    pub pointer_overflow_check: bool,
    pub conversion_check: bool,
    pub undefined_shift_check: bool,
    pub float_overflow_check: bool,
    pub nan_check: bool,
    pub simplify: bool,
    pub retain_trivial: bool,
    pub assert_to_assume: bool,
    /// Enables user assertions.
    pub assertions: bool,
    pub built_in_assertions: bool,
    pub assumptions: bool,
    /// Consumed by the post-solve caller to gate trace validation.
    pub validate_trace: bool,
    pub error_labels: Vec<InternedString>,
    pub c_standard: CStandard,
    pub cpp_standard: CppStandard,
}

impl Default for CheckOptions {
    fn default() -> Self {
        CheckOptions {
            bounds_check: false,
            pointer_check: false,
            memory_leak_check: false,
            div_by_zero_check: false,
            signed_overflow_check: false,
            unsigned_overflow_check: false,
            pointer_overflow_check: false,
            conversion_check: false,
            undefined_shift_check: false,
            float_overflow_check: false,
            nan_check: false,
            simplify: true,
            retain_trivial: false,
            assert_to_assume: false,
            assertions: true,
            built_in_assertions: true,
            assumptions: true,
            validate_trace: false,
            error_labels: Vec::new(),
            c_standard: CStandard::C11,
            cpp_standard: CppStandard::Cpp14,
        }
    }
}

impl CheckOptions {
    /// Read the recognised keys out of the caller's option map. Unset keys
    /// read as `false`, mirroring the host driver's behavior.
    pub fn from_options(options: &Options) -> Self {
        CheckOptions {
            bounds_check: options.get_bool_option("bounds-check"),
            pointer_check: options.get_bool_option("pointer-check"),
            memory_leak_check: options.get_bool_option("memory-leak-check"),
            div_by_zero_check: options.get_bool_option("div-by-zero-check"),
            signed_overflow_check: options.get_bool_option("signed-overflow-check"),
            unsigned_overflow_check: options.get_bool_option("unsigned-overflow-check"),
            pointer_overflow_check: options.get_bool_option("pointer-overflow-check"),
            conversion_check: options.get_bool_option("conversion-check"),
            undefined_shift_check: options.get_bool_option("undefined-shift-check"),
            float_overflow_check: options.get_bool_option("float-overflow-check"),
            nan_check: options.get_bool_option("nan-check"),
            simplify: options.get_bool_option("simplify"),
            retain_trivial: options.get_bool_option("retain-trivial"),
            assert_to_assume: options.get_bool_option("assert-to-assume"),
            assertions: options.get_bool_option("assertions"),
            built_in_assertions: options.get_bool_option("built-in-assertions"),
            assumptions: options.get_bool_option("assumptions"),
            validate_trace: options.get_bool_option("validate-trace"),
            error_labels: options
                .get_list_option("error-label")
                .into_iter()
                .map(InternedString::from)
                .collect(),
            c_standard: CStandard::C11,
            cpp_standard: CppStandard::Cpp14,
        }
    }
}

/// Instrument every function of the model: collect the explicit allocations
/// once, then check each function body in turn.
pub fn check_goto_model(model: &mut GotoModel, options: &CheckOptions) -> Result<(), CheckError> {
    let allocations = if options.pointer_check || options.bounds_check {
        collect_allocations(&model.goto_functions)?
    } else {
        Vec::new()
    };

    for (name, function) in model.goto_functions.iter_mut() {
        debug!(function = %name, "instrumenting");
        let mut checker = Checker::new(&model.symbol_table, options, &allocations);
        checker.check_function(function)?;
    }
    Ok(())
}

/// Instrument a single function. No allocation registry is collected, so
/// pointer obligations cannot be discharged by explicit allocations.
pub fn check_goto_function(
    symbol_table: &SymbolTable,
    options: &CheckOptions,
    function: &mut GotoFunction,
) -> Result<(), CheckError> {
    let mut checker = Checker::new(symbol_table, options, &[]);
    checker.check_function(function)
}
