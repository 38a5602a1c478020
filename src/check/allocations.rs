// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::CheckError;
use crate::cprover;
use crate::goto_program::{GotoFunctions, InstructionBody};
use crate::goto_program::Expr;
use tracing::debug;

/// One explicitly declared memory region. Address and size are unsigned
/// bit-vector expressions of the same width, and stay valid for the whole
/// analysis.
#[derive(Debug, Clone)]
pub struct Allocation {
    pub address: Expr,
    pub size: Expr,
}

/// Scan all functions for calls to the allocation intrinsic and collect the
/// declared `(address, size)` regions. A malformed call is a fatal error.
pub fn collect_allocations(functions: &GotoFunctions) -> Result<Vec<Allocation>, CheckError> {
    let mut allocations = Vec::new();

    for (_, function) in functions.iter() {
        for instruction in function.body.instructions() {
            let InstructionBody::FunctionCall { function: callee, arguments, .. } =
                instruction.body()
            else {
                continue;
            };
            if callee.symbol_identifier().map_or(true, |id| id != cprover::ALLOCATED_MEMORY) {
                continue;
            }

            let well_formed = arguments.len() == 2
                && arguments[0].typ().is_unsigned()
                && arguments[1].typ().is_unsigned()
                && arguments[0].typ() == arguments[1].typ();
            if !well_formed {
                return Err(CheckError::MalformedAllocationCall(
                    cprover::ALLOCATED_MEMORY.to_string(),
                ));
            }

            debug!(address = %arguments[0], size = %arguments[1], "registered allocation");
            allocations
                .push(Allocation { address: arguments[0].clone(), size: arguments[1].clone() });
        }
    }
    Ok(allocations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goto_program::{GotoFunction, Instruction, Location, Type};

    fn alloc_call(args: Vec<Expr>) -> Instruction {
        let callee = Expr::symbol(
            cprover::ALLOCATED_MEMORY,
            Type::code(Vec::new(), Type::empty()),
        );
        Instruction::function_call(None, callee, args, Location::none())
    }

    fn functions_with(instructions: Vec<Instruction>) -> GotoFunctions {
        let mut functions = GotoFunctions::new();
        functions.insert(GotoFunction::new("f", Vec::new(), instructions));
        functions
    }

    #[test]
    fn collects_well_formed_calls() {
        let addr = Expr::symbol("a", Type::unsigned_int(64));
        let size = Expr::int_constant(16, Type::unsigned_int(64));
        let functions = functions_with(vec![
            alloc_call(vec![addr, size]),
            Instruction::end_function(Location::none()),
        ]);
        let allocations = collect_allocations(&functions).unwrap();
        assert_eq!(allocations.len(), 1);
        assert!(allocations[0].size.int_constant_value().is_some());
    }

    #[test]
    fn rejects_signed_arguments() {
        let addr = Expr::symbol("a", Type::signed_int(64));
        let size = Expr::int_constant(16, Type::signed_int(64));
        let functions = functions_with(vec![alloc_call(vec![addr, size])]);
        assert!(collect_allocations(&functions).is_err());
    }

    #[test]
    fn rejects_mismatched_widths() {
        let addr = Expr::symbol("a", Type::unsigned_int(64));
        let size = Expr::int_constant(16, Type::unsigned_int(32));
        let functions = functions_with(vec![alloc_call(vec![addr, size])]);
        assert!(collect_allocations(&functions).is_err());
    }

    #[test]
    fn ignores_other_calls(){
        let callee = Expr::symbol("free", Type::code(Vec::new(), Type::empty()));
        let call = Instruction::function_call(None, callee, Vec::new(), Location::none());
        let functions = functions_with(vec![call]);
        assert!(collect_allocations(&functions).unwrap().is_empty());
    }
}
