// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::{Instruction, SymbolTable};
use crate::InternedString;
use crate::cprover;
use std::collections::{BTreeMap, HashMap, HashSet};

///////////////////////////////////////////////////////////////////////////////////////////////
/// Datatypes
///////////////////////////////////////////////////////////////////////////////////////////////

/// An ordered list of instructions forming one function body.
#[derive(Debug, Clone, Default)]
pub struct GotoProgram {
    instructions: Vec<Instruction>,
}

/// A function: its name, the identifiers of its parameters, and its body.
#[derive(Debug, Clone)]
pub struct GotoFunction {
    pub name: InternedString,
    pub parameters: Vec<InternedString>,
    pub body: GotoProgram,
}

/// All functions of a program, in a stable order.
#[derive(Debug, Clone, Default)]
pub struct GotoFunctions {
    functions: BTreeMap<InternedString, GotoFunction>,
}

/// A whole program: symbol table plus functions.
#[derive(Debug, Default)]
pub struct GotoModel {
    pub symbol_table: SymbolTable,
    pub goto_functions: GotoFunctions,
}

///////////////////////////////////////////////////////////////////////////////////////////////
/// Implementations
///////////////////////////////////////////////////////////////////////////////////////////////

impl GotoProgram {
    pub fn new() -> Self {
        GotoProgram::default()
    }

    pub fn from_instructions(instructions: Vec<Instruction>) -> Self {
        GotoProgram { instructions }
    }

    pub fn add(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn get(&self, index: usize) -> &Instruction {
        &self.instructions[index]
    }

    pub fn get_mut(&mut self, index: usize) -> &mut Instruction {
        &mut self.instructions[index]
    }

    /// The labels some goto of this program jumps to.
    pub fn referenced_labels(&self) -> HashSet<InternedString> {
        self.instructions.iter().filter_map(|i| i.goto_target()).collect()
    }

    /// Index of the first instruction carrying each label.
    pub fn label_map(&self) -> HashMap<InternedString, usize> {
        let mut map = HashMap::new();
        for (index, instruction) in self.instructions.iter().enumerate() {
            for label in instruction.labels() {
                map.entry(*label).or_insert(index);
            }
        }
        map
    }

    /// Splice `new_instructions` immediately before `index`, leaving the
    /// instruction previously at `index` after the inserted ones. Any labels
    /// on that instruction move onto the first inserted one, so a branch to
    /// it runs the inserted checks before reaching it. Returns the number of
    /// inserted instructions, which the caller's iteration must step over.
    pub fn splice_before(&mut self, index: usize, mut new_instructions: Vec<Instruction>) -> usize {
        let count = new_instructions.len();
        if count > 0 {
            for label in self.instructions[index].take_labels() {
                new_instructions[0].push_label(label);
            }
        }
        self.instructions.splice(index..index, new_instructions);
        count
    }

    /// Remove skip instructions, moving any labels forward onto the next
    /// surviving instruction so branch targets stay resolvable. A trailing
    /// skip is kept since there is nothing to move its labels to.
    pub fn remove_skips(&mut self) {
        let len = self.instructions.len();
        for index in 0..len.saturating_sub(1) {
            if self.instructions[index].is_skip() {
                let labels: Vec<InternedString> =
                    self.instructions[index].labels().to_vec();
                for label in labels {
                    self.instructions[index + 1].push_label(label);
                }
            }
        }
        let last = len.saturating_sub(1);
        let mut index = 0;
        self.instructions.retain(|i| {
            let keep = !i.is_skip() || index == last;
            index += 1;
            keep
        });
    }
}

impl GotoFunction {
    pub fn new(
        name: impl Into<InternedString>,
        parameters: Vec<InternedString>,
        instructions: Vec<Instruction>,
    ) -> Self {
        GotoFunction {
            name: name.into(),
            parameters,
            body: GotoProgram::from_instructions(instructions),
        }
    }
}

impl GotoFunctions {
    pub fn new() -> Self {
        GotoFunctions::default()
    }

    /// The name of the synthetic program entry point.
    pub fn entry_point() -> InternedString {
        cprover::ENTRY_POINT.into()
    }

    pub fn insert(&mut self, function: GotoFunction) {
        self.functions.insert(function.name, function);
    }

    pub fn get<T: Into<InternedString>>(&self, name: T) -> Option<&GotoFunction> {
        self.functions.get(&name.into())
    }

    pub fn get_mut<T: Into<InternedString>>(&mut self, name: T) -> Option<&mut GotoFunction> {
        self.functions.get_mut(&name.into())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&InternedString, &GotoFunction)> {
        self.functions.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&InternedString, &mut GotoFunction)> {
        self.functions.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goto_program::{Expr, Location};

    #[test]
    fn remove_skips_moves_labels_forward() {
        let mut program = GotoProgram::new();
        program.add(Instruction::goto("done", Location::none()));
        program.add(Instruction::skip(Location::none()).with_label("done"));
        program.add(Instruction::ret(None, Location::none()));
        program.add(Instruction::end_function(Location::none()));
        program.remove_skips();

        assert_eq!(program.len(), 3);
        // the label migrated to the return instruction
        let labels = program.get(1).labels();
        assert!(labels.iter().any(|l| *l == "done"));
        assert!(program.referenced_labels().contains(&"done".into()));
        assert_eq!(program.label_map().get(&"done".into()), Some(&1));
    }

    #[test]
    fn trailing_skip_survives() {
        let mut program = GotoProgram::new();
        program.add(Instruction::expression(Expr::bool_true(), Location::none()));
        program.add(Instruction::skip(Location::none()).with_label("end"));
        program.remove_skips();
        assert_eq!(program.len(), 2);
    }
}
