// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Safety-check instrumentation for goto programs.
//!
//! Given a program lowered to a goto control-flow representation, the
//! [`check`] pass rewrites each function body so that every potential source
//! of undefined behavior is guarded by an explicit verification condition:
//! array bounds, pointer validity, division and modulus by zero, integer and
//! floating-point overflow, undefined shifts, NaN production, narrowing
//! conversions, and memory leaks. The instrumented program is then handed to
//! a symbolic execution back-end which decides the emitted conditions.
//!
//! The [`trace`] module is an independent post-solve component: it validates
//! that counterexample traces produced for managed-reference programs have
//! the expected structure on assignment left- and right-hand sides.

// There are a fair number of constructs in this crate that are better
// maintained as explicit pattern matching versus using the `matches!` macro.
#![allow(clippy::match_like_matches_macro)]

mod intern;
mod utils;

pub mod check;
pub mod cprover;
pub mod goto_program;
pub mod simplify;
pub mod trace;

pub use intern::InternedString;
pub use utils::{max_int, min_int, NumUtils};
