// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use self::InstructionBody::*;
use super::{Expr, Location};
use crate::InternedString;

///////////////////////////////////////////////////////////////////////////////////////////////
/// Datatypes
///////////////////////////////////////////////////////////////////////////////////////////////

/// One instruction of a goto program: a body, a source location, the labels
/// attached to the instruction, and any check-scoping pragmas.
///
/// Branch targets are labels, so splicing new instructions into a program
/// never moves an existing target.
#[derive(Debug, Clone)]
pub struct Instruction {
    body: InstructionBody,
    location: Location,
    labels: Vec<InternedString>,
    pragmas: Vec<Pragma>,
}

/// The different kinds of bodies an instruction can have.
#[derive(Debug, Clone)]
pub enum InstructionBody {
    /// `assert(cond)`; comment and property class live in the location
    Assert { cond: Expr },
    /// `lhs = rhs;`
    Assign { lhs: Expr, rhs: Expr },
    /// `assume(cond);`
    Assume { cond: Expr },
    /// End-of-life of a local variable
    Dead { symbol: Expr },
    /// Start-of-life of a local variable
    Decl { symbol: Expr },
    /// End of the enclosing function body
    EndFunction,
    /// `lhs = function(arguments);` or `function(arguments);`
    FunctionCall { lhs: Option<Expr>, function: Expr, arguments: Vec<Expr> },
    /// `if (condition) goto target;` or `goto target;`
    Goto { condition: Option<Expr>, target: InternedString },
    /// Statements with no control-flow effect
    Other { statement: OtherStatement },
    /// `return value;` or `return;`
    Return { value: Option<Expr> },
    /// `;`
    Skip,
    /// Raise the exception object; has no successor
    Throw { exception: Expr },
}

/// The side-effect-free statement forms an `Other` instruction can carry.
#[derive(Debug, Clone)]
pub enum OtherStatement {
    Expression(Expr),
    Printf { arguments: Vec<Expr> },
}

/// A per-instruction override disabling one category of checks for the
/// duration of that instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pragma {
    DisableBoundsCheck,
    DisableConversionCheck,
    DisableDivByZeroCheck,
    DisableFloatOverflowCheck,
    DisableMemoryLeakCheck,
    DisableNanCheck,
    DisablePointerCheck,
    DisablePointerOverflowCheck,
    DisableSignedOverflowCheck,
    DisableUndefinedShiftCheck,
    DisableUnsignedOverflowCheck,
}

///////////////////////////////////////////////////////////////////////////////////////////////
/// Implementations
///////////////////////////////////////////////////////////////////////////////////////////////

/// Getters
impl Instruction {
    pub fn body(&self) -> &InstructionBody {
        &self.body
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn location_mut(&mut self) -> &mut Location {
        &mut self.location
    }

    pub fn labels(&self) -> &[InternedString] {
        &self.labels
    }

    pub fn pragmas(&self) -> &[Pragma] {
        &self.pragmas
    }

    /// The branch or property condition of this instruction, if it has one.
    pub fn condition(&self) -> Option<&Expr> {
        match &self.body {
            Assert { cond } | Assume { cond } | Goto { condition: Some(cond), .. } => Some(cond),
            _ => None,
        }
    }

    /// The label this instruction jumps to, if it is a goto.
    pub fn goto_target(&self) -> Option<InternedString> {
        match &self.body {
            Goto { target, .. } => Some(*target),
            _ => None,
        }
    }
}

/// Predicates
impl Instruction {
    pub fn is_skip(&self) -> bool {
        match self.body {
            Skip => true,
            _ => false,
        }
    }

    pub fn is_end_function(&self) -> bool {
        match self.body {
            EndFunction => true,
            _ => false,
        }
    }
}

/// Setters
impl Instruction {
    pub fn set_condition(&mut self, new_cond: Expr) {
        match &mut self.body {
            Assert { cond } | Assume { cond } | Goto { condition: Some(cond), .. } => {
                *cond = new_cond;
            }
            _ => unreachable!("instruction has no condition"),
        }
    }

    /// Replace the body of a disabled assertion or assumption.
    pub fn turn_into_skip(&mut self) {
        self.body = Skip;
    }

    /// Replace the body of an assign whose right-hand side was rewritten.
    pub fn set_assign_rhs(&mut self, new_rhs: Expr) {
        match &mut self.body {
            Assign { rhs, .. } => *rhs = new_rhs,
            _ => unreachable!("instruction is not an assignment"),
        }
    }

    /// Replace the value of a return whose operand was rewritten.
    pub fn set_return_value(&mut self, new_value: Expr) {
        match &mut self.body {
            Return { value: Some(value) } => *value = new_value,
            _ => unreachable!("instruction is not a value return"),
        }
    }
}

/// Fluent builders
impl Instruction {
    pub fn with_label<T: Into<InternedString>>(mut self, label: T) -> Self {
        let label = label.into();
        assert!(!label.is_empty());
        self.labels.push(label);
        self
    }

    pub fn with_pragma(mut self, pragma: Pragma) -> Self {
        self.pragmas.push(pragma);
        self
    }

    pub(crate) fn push_label(&mut self, label: InternedString) {
        self.labels.push(label);
    }

    pub(crate) fn take_labels(&mut self) -> Vec<InternedString> {
        std::mem::take(&mut self.labels)
    }
}

macro_rules! instruction {
    ($body:expr, $loc:expr) => {{
        let location = $loc;
        let body = $body;
        Instruction { body, location, labels: Vec::new(), pragmas: Vec::new() }
    }};
}

/// Constructors
impl Instruction {
    /// `assert(cond);` with property metadata attached to the location.
    pub fn assert(cond: Expr, property_class: &str, message: &str, loc: Location) -> Self {
        assert!(cond.typ().is_bool());
        assert!(!property_class.is_empty() && !message.is_empty());
        let loc_with_property = Location::property(message, property_class, false, loc);
        instruction!(Assert { cond }, loc_with_property)
    }

    /// An assertion that already carries its property location.
    pub fn assert_with_location(cond: Expr, loc: Location) -> Self {
        assert!(cond.typ().is_bool());
        instruction!(Assert { cond }, loc)
    }

    /// `assume(cond);`
    pub fn assume(cond: Expr, loc: Location) -> Self {
        assert!(cond.typ().is_bool(), "assume expected bool, got {cond:?}");
        instruction!(Assume { cond }, loc)
    }

    /// `lhs = rhs;`
    pub fn assign(lhs: Expr, rhs: Expr, loc: Location) -> Self {
        assert_eq!(
            lhs.typ(),
            rhs.typ(),
            "assignment with unequal types\nlhs: {lhs:?}\nrhs: {rhs:?}"
        );
        instruction!(Assign { lhs, rhs }, loc)
    }

    /// Local variable goes out of scope.
    pub fn dead(symbol: Expr, loc: Location) -> Self {
        assert!(symbol.is_symbol());
        instruction!(Dead { symbol }, loc)
    }

    /// Local variable comes into scope.
    pub fn decl(symbol: Expr, loc: Location) -> Self {
        assert!(symbol.is_symbol());
        instruction!(Decl { symbol }, loc)
    }

    pub fn end_function(loc: Location) -> Self {
        instruction!(EndFunction, loc)
    }

    /// `lhs = function(arguments);` or `function(arguments);`
    pub fn function_call(
        lhs: Option<Expr>,
        function: Expr,
        arguments: Vec<Expr>,
        loc: Location,
    ) -> Self {
        instruction!(FunctionCall { lhs, function, arguments }, loc)
    }

    /// `goto target;`
    pub fn goto<T: Into<InternedString>>(target: T, loc: Location) -> Self {
        let target = target.into();
        assert!(!target.is_empty());
        instruction!(Goto { condition: None, target }, loc)
    }

    /// `if (condition) goto target;`
    pub fn goto_if<T: Into<InternedString>>(condition: Expr, target: T, loc: Location) -> Self {
        assert!(condition.typ().is_bool());
        let target = target.into();
        assert!(!target.is_empty());
        instruction!(Goto { condition: Some(condition), target }, loc)
    }

    /// `e;`
    pub fn expression(e: Expr, loc: Location) -> Self {
        instruction!(Other { statement: OtherStatement::Expression(e) }, loc)
    }

    /// `printf(arguments);`
    pub fn printf(arguments: Vec<Expr>, loc: Location) -> Self {
        instruction!(Other { statement: OtherStatement::Printf { arguments } }, loc)
    }

    /// `return value;` or `return;`
    pub fn ret(value: Option<Expr>, loc: Location) -> Self {
        instruction!(Return { value }, loc)
    }

    /// `;`
    pub fn skip(loc: Location) -> Self {
        instruction!(Skip, loc)
    }

    /// Raise the exception object.
    pub fn throw(exception: Expr, loc: Location) -> Self {
        instruction!(Throw { exception }, loc)
    }
}
