// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end instrumentation scenarios: build a small goto program, run the
//! pass, and inspect the spliced assertions.

use goto_check::check::{CStandard, CheckOptions, check_goto_model};
use goto_check::cprover;
use goto_check::goto_program::{
    Expr, GotoFunction, GotoFunctions, GotoModel, Instruction, InstructionBody, Location, Mode,
    Symbol, SymbolTable, Type,
};

fn s32() -> Type {
    Type::signed_int(32)
}

fn sym(name: &str, typ: Type) -> Expr {
    Expr::symbol(name, typ)
}

fn int32(i: i64) -> Expr {
    Expr::int_constant(i, s32())
}

fn model_of(mode: Mode, instructions: Vec<Instruction>) -> GotoModel {
    let mut symbol_table = SymbolTable::new();
    symbol_table.insert(Symbol::function("f", Type::code(Vec::new(), Type::empty()), mode));
    let mut goto_functions = GotoFunctions::new();
    goto_functions.insert(GotoFunction::new("f", Vec::new(), instructions));
    GotoModel { symbol_table, goto_functions }
}

/// The (property class, comment, condition) of every assertion in `f`.
fn emitted_assertions(model: &GotoModel) -> Vec<(String, String, Expr)> {
    model
        .goto_functions
        .get("f")
        .unwrap()
        .body
        .instructions()
        .iter()
        .filter_map(|i| match i.body() {
            InstructionBody::Assert { cond } => Some((
                i.location().property_class().unwrap().to_string(),
                i.location().comment().unwrap().to_string(),
                cond.clone(),
            )),
            _ => None,
        })
        .collect()
}

#[test]
fn division_by_zero_obligation() {
    let (x, y, z) = (sym("x", s32()), sym("y", s32()), sym("z", s32()));
    let mut model = model_of(
        Mode::C,
        vec![
            Instruction::assign(z, x.div(y.clone()), Location::none()),
            Instruction::end_function(Location::none()),
        ],
    );
    let options = CheckOptions { div_by_zero_check: true, ..Default::default() };
    check_goto_model(&mut model, &options).unwrap();

    let assertions = emitted_assertions(&model);
    assert_eq!(assertions.len(), 1);
    let (class, comment, cond) = &assertions[0];
    assert_eq!(class, "division-by-zero");
    assert_eq!(comment, "division by zero in x / y");
    assert_eq!(*cond, y.neq(int32(0)));
}

#[test]
fn signed_division_also_checks_int_min_overflow() {
    let (x, y, z) = (sym("x", s32()), sym("y", s32()), sym("z", s32()));
    let mut model = model_of(
        Mode::C,
        vec![
            Instruction::assign(z, x.clone().div(y.clone()), Location::none()),
            Instruction::end_function(Location::none()),
        ],
    );
    let options = CheckOptions {
        div_by_zero_check: true,
        signed_overflow_check: true,
        ..Default::default()
    };
    check_goto_model(&mut model, &options).unwrap();

    let assertions = emitted_assertions(&model);
    assert_eq!(assertions.len(), 2);
    assert_eq!(assertions[0].0, "division-by-zero");
    assert_eq!(assertions[1].0, "overflow");
    assert_eq!(assertions[1].1, "arithmetic overflow on signed division in x / y");
    let expected =
        x.eq(Expr::int_constant(i32::MIN, s32())).and(y.eq(int32(-1))).not();
    assert_eq!(assertions[1].2, expected);
}

#[test]
fn array_bounds_on_static_array() {
    let array_typ = s32().array_of(Expr::int_constant(10, Type::size_t()));
    let a = sym("a", array_typ);
    let i = sym("i", s32());
    let x = sym("x", s32());
    let mut model = model_of(
        Mode::C,
        vec![
            Instruction::assign(x, a.index(i.clone()), Location::none()),
            Instruction::end_function(Location::none()),
        ],
    );
    let options = CheckOptions { bounds_check: true, ..Default::default() };
    check_goto_model(&mut model, &options).unwrap();

    let assertions = emitted_assertions(&model);
    assert_eq!(assertions.len(), 2);

    let (class, comment, cond) = &assertions[0];
    assert_eq!(class, "array bounds");
    assert_eq!(comment, "array 'a' lower bound in a[i]");
    assert_eq!(*cond, i.clone().ge(int32(0)));

    let (class, comment, cond) = &assertions[1];
    assert_eq!(class, "array bounds");
    assert_eq!(comment, "array 'a' upper bound in a[i]");
    assert_eq!(*cond, i.lt(int32(10)));
}

#[test]
fn constant_index_emits_nothing() {
    let array_typ = s32().array_of(Expr::int_constant(10, Type::size_t()));
    let a = sym("a", array_typ);
    let x = sym("x", s32());
    let mut model = model_of(
        Mode::C,
        vec![
            Instruction::assign(x, a.index(int32(3)), Location::none()),
            Instruction::end_function(Location::none()),
        ],
    );
    let options = CheckOptions { bounds_check: true, ..Default::default() };
    check_goto_model(&mut model, &options).unwrap();
    assert!(emitted_assertions(&model).is_empty());
}

#[test]
fn unsigned_index_needs_no_lower_bound() {
    let array_typ = s32().array_of(Expr::int_constant(10, Type::size_t()));
    let a = sym("a", array_typ);
    let u = sym("u", Type::unsigned_int(32));
    let x = sym("x", s32());
    let mut model = model_of(
        Mode::C,
        vec![
            Instruction::assign(x, a.index(u), Location::none()),
            Instruction::end_function(Location::none()),
        ],
    );
    let options = CheckOptions { bounds_check: true, ..Default::default() };
    check_goto_model(&mut model, &options).unwrap();

    let assertions = emitted_assertions(&model);
    assert_eq!(assertions.len(), 1);
    assert!(assertions[0].1.contains("upper bound"));
}

#[test]
fn signed_shl_by_31_under_c99() {
    let x = sym("x", s32());
    let y = sym("y", s32());
    let mut model = model_of(
        Mode::C,
        vec![
            Instruction::assign(y, x.shl(int32(31)), Location::none()),
            Instruction::end_function(Location::none()),
        ],
    );
    let options = CheckOptions {
        undefined_shift_check: true,
        signed_overflow_check: true,
        simplify: false,
        c_standard: CStandard::C99,
        ..Default::default()
    };
    check_goto_model(&mut model, &options).unwrap();

    let assertions = emitted_assertions(&model);
    let comments: Vec<&str> = assertions.iter().map(|(_, c, _)| c.as_str()).collect();
    assert_eq!(
        comments,
        vec![
            "shift distance is negative in x << 31",
            "shift distance too large in x << 31",
            "shift operand is negative in x << 31",
            "arithmetic overflow on signed shl in x << 31",
        ]
    );
    assert!(assertions.iter().take(3).all(|(class, _, _)| class == "undefined-shift"));
    assert_eq!(assertions[3].0, "overflow");
}

#[test]
fn simplification_discards_trivial_shift_obligations() {
    let x = sym("x", s32());
    let y = sym("y", s32());
    let mut model = model_of(
        Mode::C,
        vec![
            Instruction::assign(y, x.shl(int32(31)), Location::none()),
            Instruction::end_function(Location::none()),
        ],
    );
    let options = CheckOptions { undefined_shift_check: true, ..Default::default() };
    check_goto_model(&mut model, &options).unwrap();

    // 31 >= 0 and 31 < 32 fold away; only the operand sign check remains
    let assertions = emitted_assertions(&model);
    assert_eq!(assertions.len(), 1);
    assert_eq!(assertions[0].1, "shift operand is negative in x << 31");
}

#[test]
fn dereference_of_unknown_pointer_with_allocation() {
    let p = sym("p", s32().to_pointer());
    let x = sym("x", s32());
    let mut model = model_of(
        Mode::C,
        vec![
            Instruction::assign(x, p.dereference(), Location::none()),
            Instruction::end_function(Location::none()),
        ],
    );
    // register one explicit allocation in a second function
    model.symbol_table.insert(Symbol::function(
        "main",
        Type::code(Vec::new(), Type::empty()),
        Mode::C,
    ));
    let intrinsic = Expr::symbol(
        cprover::ALLOCATED_MEMORY,
        Type::code(Vec::new(), Type::empty()),
    );
    let region = vec![
        Expr::symbol("A", Type::unsigned_int(64)),
        Expr::int_constant(16, Type::unsigned_int(64)),
    ];
    model.goto_functions.insert(GotoFunction::new(
        "main",
        Vec::new(),
        vec![
            Instruction::function_call(None, intrinsic, region, Location::none()),
            Instruction::end_function(Location::none()),
        ],
    ));

    let options = CheckOptions { pointer_check: true, ..Default::default() };
    check_goto_model(&mut model, &options).unwrap();

    let assertions = emitted_assertions(&model);
    let comments: Vec<&str> = assertions.iter().map(|(_, c, _)| c.as_str()).collect();
    assert_eq!(
        comments,
        vec![
            "dereference failure: pointer NULL in *p",
            "dereference failure: pointer invalid in *p",
            "dereference failure: deallocated dynamic object in *p",
            "dereference failure: dead object in *p",
            "dereference failure: pointer outside dynamic object bounds in *p",
            "dereference failure: pointer outside object bounds in *p",
            "dereference failure: invalid integer address in *p",
        ]
    );
    assert!(assertions.iter().all(|(class, _, _)| class == "pointer dereference"));
}

#[test]
fn managed_reference_dereference_only_checks_null() {
    let p = sym("p", s32().to_pointer());
    let x = sym("x", s32());
    let mut model = model_of(
        Mode::ManagedReference,
        vec![
            Instruction::assign(x, p.clone().dereference(), Location::none()),
            Instruction::end_function(Location::none()),
        ],
    );
    let options = CheckOptions { pointer_check: true, ..Default::default() };
    check_goto_model(&mut model, &options).unwrap();

    let assertions = emitted_assertions(&model);
    assert_eq!(assertions.len(), 1);
    assert_eq!(assertions[0].1, "dereference failure: reference is null in *p");
    assert_eq!(assertions[0].2, p.neq(Expr::null_pointer(s32().to_pointer())));
}

#[test]
fn managed_reference_suppresses_mod_by_zero() {
    let (x, y, z) = (sym("x", s32()), sym("y", s32()), sym("z", s32()));
    let mut model = model_of(
        Mode::ManagedReference,
        vec![
            Instruction::assign(z, x.rem(y), Location::none()),
            Instruction::end_function(Location::none()),
        ],
    );
    let options = CheckOptions { div_by_zero_check: true, ..Default::default() };
    check_goto_model(&mut model, &options).unwrap();
    assert!(emitted_assertions(&model).is_empty());
}

#[test]
fn short_circuit_guards_on_conjunction_and_disjunction() {
    let c = sym("c", Type::Bool);
    let (x, y, r) = (sym("x", s32()), sym("y", s32()), sym("r", Type::Bool));

    // r = c && (x / y == 0): the division is guarded by c
    let rhs = c.clone().and(x.clone().div(y.clone()).eq(int32(0)));
    let mut model = model_of(
        Mode::C,
        vec![
            Instruction::assign(r.clone(), rhs, Location::none()),
            Instruction::end_function(Location::none()),
        ],
    );
    let options = CheckOptions { div_by_zero_check: true, ..Default::default() };
    check_goto_model(&mut model, &options).unwrap();
    let assertions = emitted_assertions(&model);
    assert_eq!(assertions.len(), 1);
    assert_eq!(assertions[0].2, c.clone().implies(y.clone().neq(int32(0))));

    // r = c || (x / y == 0): the division is guarded by !c
    let rhs = c.clone().or(x.div(y.clone()).eq(int32(0)));
    let mut model = model_of(
        Mode::C,
        vec![
            Instruction::assign(r, rhs, Location::none()),
            Instruction::end_function(Location::none()),
        ],
    );
    check_goto_model(&mut model, &options).unwrap();
    let assertions = emitted_assertions(&model);
    assert_eq!(assertions.len(), 1);
    assert_eq!(assertions[0].2, c.not().implies(y.neq(int32(0))));
}

#[test]
fn if_branches_get_condition_and_negation_in_guards() {
    let c = sym("c", Type::Bool);
    let (x, y, z, w) = (sym("x", s32()), sym("y", s32()), sym("z", s32()), sym("w", s32()));
    let rhs = Expr::if_then_else(c.clone(), x.clone().div(y.clone()), x.div(z.clone()));
    let mut model = model_of(
        Mode::C,
        vec![
            Instruction::assign(w, rhs, Location::none()),
            Instruction::end_function(Location::none()),
        ],
    );
    let options = CheckOptions { div_by_zero_check: true, ..Default::default() };
    check_goto_model(&mut model, &options).unwrap();

    let assertions = emitted_assertions(&model);
    assert_eq!(assertions.len(), 2);
    assert_eq!(assertions[0].2, c.clone().implies(y.neq(int32(0))));
    assert_eq!(assertions[1].2, c.not().implies(z.neq(int32(0))));
}

#[test]
fn disabled_categories_emit_nothing() {
    let (x, y, z) = (sym("x", s32()), sym("y", s32()), sym("z", s32()));
    let p = sym("p", s32().to_pointer());
    let array_typ = s32().array_of(Expr::int_constant(10, Type::size_t()));
    let a = sym("a", array_typ);
    let i = sym("i", s32());
    let mut model = model_of(
        Mode::C,
        vec![
            Instruction::assign(z.clone(), x.div(y), Location::none()),
            Instruction::assign(z.clone(), a.index(i), Location::none()),
            Instruction::assign(z, p.dereference(), Location::none()),
            Instruction::end_function(Location::none()),
        ],
    );
    let before = model.goto_functions.get("f").unwrap().body.len();
    check_goto_model(&mut model, &CheckOptions::default()).unwrap();
    assert!(emitted_assertions(&model).is_empty());
    assert_eq!(model.goto_functions.get("f").unwrap().body.len(), before);
}

#[test]
fn instrumentation_is_idempotent() {
    let (x, y, z) = (sym("x", s32()), sym("y", s32()), sym("z", s32()));
    let mut model = model_of(
        Mode::C,
        vec![
            Instruction::assign(z, x.div(y), Location::none()),
            Instruction::end_function(Location::none()),
        ],
    );
    let options = CheckOptions {
        div_by_zero_check: true,
        signed_overflow_check: true,
        ..Default::default()
    };
    check_goto_model(&mut model, &options).unwrap();
    let after_once = model.goto_functions.get("f").unwrap().body.len();
    let assertions_once = emitted_assertions(&model);

    check_goto_model(&mut model, &options).unwrap();
    assert_eq!(model.goto_functions.get("f").unwrap().body.len(), after_once);
    assert_eq!(emitted_assertions(&model), assertions_once);
}

#[test]
fn cache_deduplicates_until_invalidated() {
    let (x, y, z, a, b) = (
        sym("x", s32()),
        sym("y", s32()),
        sym("z", s32()),
        sym("a", s32()),
        sym("b", s32()),
    );
    // two identical divisions: one obligation
    let mut model = model_of(
        Mode::C,
        vec![
            Instruction::assign(a.clone(), x.clone().div(y.clone()), Location::none()),
            Instruction::assign(b.clone(), x.clone().div(y.clone()), Location::none()),
            Instruction::end_function(Location::none()),
        ],
    );
    let options = CheckOptions { div_by_zero_check: true, ..Default::default() };
    check_goto_model(&mut model, &options).unwrap();
    assert_eq!(emitted_assertions(&model).len(), 1);

    // an intervening write to the divisor invalidates the recorded obligation
    let mut model = model_of(
        Mode::C,
        vec![
            Instruction::assign(a, x.clone().div(y.clone()), Location::none()),
            Instruction::assign(y.clone(), z, Location::none()),
            Instruction::assign(b, x.div(y), Location::none()),
            Instruction::end_function(Location::none()),
        ],
    );
    check_goto_model(&mut model, &options).unwrap();
    assert_eq!(emitted_assertions(&model).len(), 2);
}

#[test]
fn branch_target_clears_the_cache() {
    let (x, y, a, b) = (sym("x", s32()), sym("y", s32()), sym("a", s32()), sym("b", s32()));
    let c = sym("c", Type::Bool);
    let mut model = model_of(
        Mode::C,
        vec![
            Instruction::assign(a, x.clone().div(y.clone()), Location::none()),
            Instruction::goto_if(c, "join", Location::none()),
            Instruction::assign(b.clone(), x.clone().div(y.clone()), Location::none())
                .with_label("join"),
            Instruction::end_function(Location::none()),
        ],
    );
    let options = CheckOptions { div_by_zero_check: true, ..Default::default() };
    check_goto_model(&mut model, &options).unwrap();
    // the second division is at a branch target, so it is checked again
    assert_eq!(emitted_assertions(&model).len(), 2);
}

#[test]
fn branch_targets_reach_spliced_checks() {
    let (x, y, b) = (sym("x", s32()), sym("y", s32()), sym("b", s32()));
    let c = sym("c", Type::Bool);
    let mut model = model_of(
        Mode::C,
        vec![
            Instruction::goto_if(c, "join", Location::none()),
            Instruction::assign(b.clone(), x.clone().div(y.clone()), Location::none())
                .with_label("join"),
            Instruction::end_function(Location::none()),
        ],
    );
    let options = CheckOptions { div_by_zero_check: true, ..Default::default() };
    check_goto_model(&mut model, &options).unwrap();

    let body = &model.goto_functions.get("f").unwrap().body;
    let join = *body.label_map().get(&"join".into()).unwrap();
    // the label now sits on the spliced assertion, not on the assignment
    assert!(match body.get(join).body() {
        InstructionBody::Assert { .. } => true,
        _ => false,
    });
    assert!(body.referenced_labels().contains(&"join".into()));
}

#[test]
fn error_labels_assert_false() {
    let mut model = model_of(
        Mode::C,
        vec![
            Instruction::skip(Location::none()).with_label("ERROR"),
            Instruction::end_function(Location::none()),
        ],
    );
    let options = CheckOptions { error_labels: vec!["ERROR".into()], ..Default::default() };
    check_goto_model(&mut model, &options).unwrap();

    let body = &model.goto_functions.get("f").unwrap().body;
    let asserts: Vec<_> = body
        .instructions()
        .iter()
        .filter(|i| match i.body() {
            InstructionBody::Assert { .. } => true,
            _ => false,
        })
        .collect();
    assert_eq!(asserts.len(), 1);
    let assertion = asserts[0];
    match assertion.body() {
        InstructionBody::Assert { cond } => assert!(cond.is_false()),
        _ => unreachable!(),
    }
    assert_eq!(assertion.location().property_class().unwrap(), "error label");
    assert_eq!(assertion.location().comment().unwrap(), "error label ERROR");
    assert!(assertion.location().is_user_provided());
}

#[test]
fn disabled_user_assertions_become_skips() {
    let cond = sym("c", Type::Bool);
    let user_loc =
        goto_check::goto_program::Location::property("user claim", "assertion", true, Location::none());
    let mut model = model_of(
        Mode::C,
        vec![
            Instruction::assert_with_location(cond, user_loc),
            Instruction::expression(sym("x", s32()), Location::none()),
            Instruction::end_function(Location::none()),
        ],
    );
    let options = CheckOptions { assertions: false, ..Default::default() };
    check_goto_model(&mut model, &options).unwrap();

    let body = &model.goto_functions.get("f").unwrap().body;
    assert!(body.instructions().iter().all(|i| match i.body() {
        InstructionBody::Assert { .. } => false,
        _ => true,
    }));
}

#[test]
fn disabled_assumptions_become_skips() {
    let cond = sym("c", Type::Bool);
    let mut model = model_of(
        Mode::C,
        vec![
            Instruction::assume(cond, Location::none()),
            Instruction::expression(sym("x", s32()), Location::none()),
            Instruction::end_function(Location::none()),
        ],
    );
    let options = CheckOptions { assumptions: false, ..Default::default() };
    check_goto_model(&mut model, &options).unwrap();

    let body = &model.goto_functions.get("f").unwrap().body;
    assert!(body.instructions().iter().all(|i| match i.body() {
        InstructionBody::Assume { .. } => false,
        _ => true,
    }));
}

#[test]
fn assert_to_assume_emits_assumptions() {
    let (x, y, z) = (sym("x", s32()), sym("y", s32()), sym("z", s32()));
    let mut model = model_of(
        Mode::C,
        vec![
            Instruction::assign(z, x.div(y.clone()), Location::none()),
            Instruction::end_function(Location::none()),
        ],
    );
    let options = CheckOptions {
        div_by_zero_check: true,
        assert_to_assume: true,
        ..Default::default()
    };
    check_goto_model(&mut model, &options).unwrap();

    let body = &model.goto_functions.get("f").unwrap().body;
    let assumes: Vec<_> = body
        .instructions()
        .iter()
        .filter_map(|i| match i.body() {
            InstructionBody::Assume { cond } => Some(cond.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(assumes, vec![y.neq(int32(0))]);
    assert!(emitted_assertions(&model).is_empty());
}

#[test]
fn rw_ok_predicates_are_expanded() {
    let p = sym("p", s32().to_pointer());
    let cond = Expr::read_ok(p, Expr::int_constant(4, Type::size_t()));
    let mut model = model_of(
        Mode::C,
        vec![
            Instruction::goto_if(cond, "out", Location::none()),
            Instruction::expression(sym("x", s32()), Location::none()),
            Instruction::skip(Location::none()).with_label("out"),
            Instruction::end_function(Location::none()),
        ],
    );
    check_goto_model(&mut model, &CheckOptions::default()).unwrap();

    let body = &model.goto_functions.get("f").unwrap().body;
    let goto_cond = body
        .instructions()
        .iter()
        .find_map(|i| match i.body() {
            InstructionBody::Goto { condition: Some(cond), .. } => Some(cond.clone()),
            _ => None,
        })
        .unwrap();
    assert!(!goto_cond.has_rw_ok());
    // the expansion is a non-trivial conjunction over the pointer
    assert!(goto_cond.mentions_symbol("p".into()));
}

#[test]
fn pragma_disables_one_instruction() {
    use goto_check::goto_program::Pragma;
    let (x, y, a, b) = (sym("x", s32()), sym("y", s32()), sym("a", s32()), sym("b", s32()));
    let mut model = model_of(
        Mode::C,
        vec![
            Instruction::assign(a, x.clone().div(y.clone()), Location::none())
                .with_pragma(Pragma::DisableDivByZeroCheck),
            Instruction::assign(b, x.clone().mul(x), Location::none()),
            Instruction::assign(y.clone(), x_div(), Location::none()),
            Instruction::end_function(Location::none()),
        ],
    );
    let options = CheckOptions { div_by_zero_check: true, ..Default::default() };
    check_goto_model(&mut model, &options).unwrap();

    // only the division outside the pragma'd instruction is checked
    let assertions = emitted_assertions(&model);
    assert_eq!(assertions.len(), 1);
    assert!(assertions[0].1.starts_with("division by zero"));
}

fn x_div() -> Expr {
    sym("q", s32()).div(sym("r", s32()))
}

#[test]
fn conversion_check_on_narrowing_cast() {
    let wide = sym("w", Type::signed_int(64));
    let narrow = sym("n", s32());
    let mut model = model_of(
        Mode::C,
        vec![
            Instruction::assign(narrow, wide.clone().cast_to(s32()), Location::none()),
            Instruction::end_function(Location::none()),
        ],
    );
    let options = CheckOptions { conversion_check: true, ..Default::default() };
    check_goto_model(&mut model, &options).unwrap();

    let assertions = emitted_assertions(&model);
    assert_eq!(assertions.len(), 1);
    assert_eq!(assertions[0].0, "overflow");
    let lower = wide.clone().ge(Expr::int_constant(i32::MIN as i64, Type::signed_int(64)));
    let upper = wide.le(Expr::int_constant(i32::MAX as i64, Type::signed_int(64)));
    assert_eq!(assertions[0].2, lower.and(upper));
}

#[test]
fn widening_cast_is_always_ok() {
    let narrow = sym("n", s32());
    let wide = sym("w", Type::signed_int(64));
    let mut model = model_of(
        Mode::C,
        vec![
            Instruction::assign(wide, narrow.cast_to(Type::signed_int(64)), Location::none()),
            Instruction::end_function(Location::none()),
        ],
    );
    let options = CheckOptions { conversion_check: true, ..Default::default() };
    check_goto_model(&mut model, &options).unwrap();
    assert!(emitted_assertions(&model).is_empty());
}

#[test]
fn float_addition_checks_nan_then_overflow() {
    let (a, b, r) = (
        sym("a", Type::double()),
        sym("b", Type::double()),
        sym("r", Type::double()),
    );
    let mut model = model_of(
        Mode::C,
        vec![
            Instruction::assign(r, a.plus(b), Location::none()),
            Instruction::end_function(Location::none()),
        ],
    );
    let options = CheckOptions {
        nan_check: true,
        float_overflow_check: true,
        ..Default::default()
    };
    check_goto_model(&mut model, &options).unwrap();

    let assertions = emitted_assertions(&model);
    assert_eq!(assertions.len(), 2);
    assert_eq!(assertions[0].0, "NaN");
    assert_eq!(assertions[0].1, "NaN on + in a + b");
    assert_eq!(assertions[1].0, "overflow");
    assert_eq!(assertions[1].1, "arithmetic overflow on floating-point addition in a + b");
}

#[test]
fn member_through_pointer_checks_only_the_member() {
    use goto_check::goto_program::DatatypeComponent;
    let pair = Type::struct_type(
        "pair",
        vec![
            DatatypeComponent { name: "a".into(), typ: s32() },
            DatatypeComponent { name: "b".into(), typ: s32() },
        ],
    );
    let p = sym("p", pair.to_pointer());
    let x = sym("x", s32());
    let member = p.dereference().member("b", s32());
    let mut model = model_of(
        Mode::C,
        vec![
            Instruction::assign(x, member, Location::none()),
            Instruction::end_function(Location::none()),
        ],
    );
    let options = CheckOptions { pointer_check: true, ..Default::default() };
    check_goto_model(&mut model, &options).unwrap();

    // the whole struct is never checked: every obligation is about the
    // synthesized member access, sized to the member alone
    let assertions = emitted_assertions(&model);
    assert_eq!(assertions.len(), 7);
    assert!(assertions.iter().all(|(class, _, _)| class == "pointer dereference"));
    assert!(assertions.iter().all(|(_, comment, _)| comment.ends_with("in (*p).b")));
}

#[test]
fn memory_leak_check_at_entry_point() {
    let entry = GotoFunctions::entry_point();
    let mut symbol_table = SymbolTable::new();
    symbol_table.insert(Symbol::function(
        entry,
        Type::code(Vec::new(), Type::empty()),
        Mode::C,
    ));
    symbol_table.insert(Symbol::static_variable(
        cprover::MEMORY_LEAK,
        Type::empty().to_pointer(),
        Mode::C,
    ));
    let mut goto_functions = GotoFunctions::new();
    goto_functions.insert(GotoFunction::new(
        entry,
        Vec::new(),
        vec![Instruction::end_function(Location::new("harness.c", Some(entry), 9, None))],
    ));
    let mut model = GotoModel { symbol_table, goto_functions };

    let options = CheckOptions { memory_leak_check: true, ..Default::default() };
    check_goto_model(&mut model, &options).unwrap();

    let body = &model.goto_functions.get(entry).unwrap().body;
    // self-assignment of the sentinel, then the leak assertion, then the end
    assert_eq!(body.len(), 3);
    assert!(match body.get(0).body() {
        InstructionBody::Assign { lhs, rhs } => lhs == rhs,
        _ => false,
    });
    match body.get(1).body() {
        InstructionBody::Assert { .. } => {
            let loc = body.get(1).location();
            assert_eq!(loc.property_class().unwrap(), "memory-leak");
            // the property names only its function, never a source line
            assert_eq!(loc.function_name().unwrap(), entry);
            assert_eq!(loc.filename(), None);
            assert_eq!(loc.line(), None);
        }
        _ => panic!("expected the leak assertion"),
    }
}

#[test]
fn dead_dirty_local_updates_the_sentinel() {
    let x = sym("x", s32());
    let p = sym("p", s32().to_pointer());
    let mut model = model_of(
        Mode::C,
        vec![
            Instruction::decl(x.clone(), Location::none()),
            Instruction::assign(p, x.clone().address_of(), Location::none()),
            Instruction::dead(x.clone(), Location::none()),
            Instruction::end_function(Location::none()),
        ],
    );
    model.symbol_table.insert(Symbol::static_variable(
        cprover::DEAD_OBJECT,
        Type::empty().to_pointer(),
        Mode::C,
    ));
    let options = CheckOptions { pointer_check: true, ..Default::default() };
    check_goto_model(&mut model, &options).unwrap();

    let body = &model.goto_functions.get("f").unwrap().body;
    // an assignment to the sentinel was spliced in front of the dead marker
    let sentinel_assigns = body
        .instructions()
        .iter()
        .filter(|i| match i.body() {
            InstructionBody::Assign { lhs, .. } => {
                lhs.symbol_identifier().map_or(false, |id| id == cprover::DEAD_OBJECT)
            }
            _ => false,
        })
        .count();
    assert_eq!(sentinel_assigns, 1);
}

#[test]
fn options_are_read_from_the_option_map() {
    use goto_check::check::Options;
    let mut options = Options::new();
    options.set_bool("bounds-check", true);
    options.set_bool("nan-check", true);
    options.set_bool("simplify", true);
    options.set_list("error-label", vec!["ERROR".to_string()]);

    let check_options = CheckOptions::from_options(&options);
    assert!(check_options.bounds_check);
    assert!(check_options.nan_check);
    assert!(check_options.simplify);
    assert!(!check_options.pointer_check);
    assert_eq!(check_options.error_labels, vec![goto_check::InternedString::from("ERROR")]);
}
