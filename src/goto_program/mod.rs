// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typesafe representations of the goto control-flow program: expressions,
//! types, source locations, symbols, instructions, and whole programs.

mod expr;
mod instruction;
mod layout;
mod location;
mod program;
mod symbol;
mod symbol_table;
mod typ;

pub use expr::{BinaryOperator, Expr, ExprValue, UnaryOperator};
pub use instruction::{Instruction, InstructionBody, OtherStatement, Pragma};
pub use layout::{ObjectDescriptor, member_offset_bytes, size_of_expr, size_of_type};
pub use location::Location;
pub use program::{GotoFunction, GotoFunctions, GotoModel, GotoProgram};
pub use symbol::{Mode, Symbol};
pub use symbol_table::SymbolTable;
pub use typ::{ArraySize, DatatypeComponent, Parameter, Type};
