// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use lazy_static::lazy_static;
use std::fmt;
use std::sync::Mutex;
use string_interner::StringInterner;
use string_interner::backend::StringBackend;
use string_interner::symbol::SymbolU32;

/// A name in a goto program: a symbol identifier, an instruction label, a
/// file name, or a property comment.
///
/// The same names recur throughout a program (every use of a symbol, every
/// jump to a label), so each distinct string is stored once in a global
/// interner and names are `Copy` indexes into it. That keeps expressions and
/// instructions cheap to clone and lets the assertion cache compare names by
/// index. Interned strings live for the rest of the process; only names that
/// end up in the program representation should be interned, not scratch
/// strings.
///
/// Construction goes through `into()`:
/// `let name: InternedString = "main".into();`
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InternedString(SymbolU32);

// One global interner; the Mutex keeps it threadsafe.
lazy_static! {
    static ref NAMES: Mutex<StringInterner<StringBackend>> =
        Mutex::new(StringInterner::default());
}

// The interner owns the backing storage, so an `&str` cannot be handed out;
// every read goes through a closure while the lock is held.
fn with_str<R>(symbol: SymbolU32, f: impl FnOnce(&str) -> R) -> R {
    f(NAMES.lock().unwrap().resolve(symbol).unwrap())
}

impl InternedString {
    /// Whether this is the empty name. Anonymous symbols have one, and they
    /// are never a valid assignment target.
    pub fn is_empty(self) -> bool {
        with_str(self.0, str::is_empty)
    }
}

impl fmt::Display for InternedString {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        with_str(self.0, |s| fmt.write_str(s))
    }
}

/// Custom-implement Debug, so debug logging shows the name, not its index.
impl fmt::Debug for InternedString {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        with_str(self.0, |s| write!(fmt, "{s:?}"))
    }
}

impl<T: AsRef<str>> From<T> for InternedString {
    fn from(s: T) -> InternedString {
        InternedString(NAMES.lock().unwrap().get_or_intern(s))
    }
}

/// Names compare directly against plain strings, which is how the checker
/// recognises the distinguished instrumentation symbols.
impl<T: AsRef<str>> PartialEq<T> for InternedString {
    fn eq(&self, other: &T) -> bool {
        with_str(self.0, |s| s == other.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::InternedString;

    #[test]
    fn interning_deduplicates() {
        let a: InternedString = "x".into();
        let b: InternedString = String::from("x").into();
        let c: InternedString = "y".into();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn compares_against_plain_strings() {
        let label: InternedString = "ERROR".into();
        assert_eq!(label, "ERROR");
        assert_eq!(label.to_string(), "ERROR");
        assert_eq!(format!("{label:?}"), "\"ERROR\"");
    }

    #[test]
    fn empty_names_are_representable() {
        let anonymous: InternedString = "".into();
        assert!(anonymous.is_empty());
        assert!(!InternedString::from("f").is_empty());
    }
}
