// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::InternedString;

/// A source location.
///
/// Instructions inserted by the instrumentation carry a `Property` location:
/// the usual source coordinates plus the obligation's human-readable comment,
/// its property class, and whether the property was declared by the user.
#[derive(Copy, Clone, Debug)]
pub enum Location {
    /// Unknown source location
    None,
    /// Location in user code.
    /// `function` is `None` for global scope, `Some(name)` for function local.
    /// `bytecode_index` is only present for managed-reference programs.
    Loc {
        file: InternedString,
        function: Option<InternedString>,
        line: u64,
        col: Option<u64>,
        bytecode_index: Option<InternedString>,
    },
    /// Location of an emitted property, wrapping the source coordinates it
    /// was derived from (all of which may be absent).
    Property {
        file: Option<InternedString>,
        function: Option<InternedString>,
        line: Option<u64>,
        col: Option<u64>,
        bytecode_index: Option<InternedString>,
        comment: InternedString,
        property_class: InternedString,
        user_provided: bool,
    },
}

/// Getters and predicates
impl Location {
    pub fn is_none(&self) -> bool {
        match self {
            Location::None => true,
            _ => false,
        }
    }

    pub fn filename(&self) -> Option<InternedString> {
        match self {
            Location::Loc { file, .. } => Some(*file),
            Location::Property { file, .. } => *file,
            Location::None => None,
        }
    }

    pub fn function_name(&self) -> Option<InternedString> {
        match self {
            Location::Loc { function, .. } | Location::Property { function, .. } => *function,
            Location::None => None,
        }
    }

    pub fn line(&self) -> Option<u64> {
        match self {
            Location::Loc { line, .. } => Some(*line),
            Location::Property { line, .. } => *line,
            Location::None => None,
        }
    }

    pub fn column(&self) -> Option<u64> {
        match self {
            Location::Loc { col, .. } | Location::Property { col, .. } => *col,
            Location::None => None,
        }
    }

    pub fn bytecode_index(&self) -> Option<InternedString> {
        match self {
            Location::Loc { bytecode_index, .. } | Location::Property { bytecode_index, .. } => {
                *bytecode_index
            }
            Location::None => None,
        }
    }

    pub fn comment(&self) -> Option<InternedString> {
        match self {
            Location::Property { comment, .. } => Some(*comment),
            _ => None,
        }
    }

    pub fn property_class(&self) -> Option<InternedString> {
        match self {
            Location::Property { property_class, .. } => Some(*property_class),
            _ => None,
        }
    }

    pub fn is_user_provided(&self) -> bool {
        match self {
            Location::Property { user_provided, .. } => *user_provided,
            _ => false,
        }
    }

    /// Whether this location is anchored nowhere and should be backfilled
    /// from the instruction it is spliced in front of. A property that
    /// deliberately names only its function is left alone.
    pub fn lacks_source(&self) -> bool {
        match self {
            Location::None => true,
            Location::Property { file: None, function: None, line: None, .. } => true,
            _ => false,
        }
    }

    /// Convert a location to a short string suitable for (e.g.) logging.
    pub fn short_string(&self) -> String {
        match (self.filename(), self.line()) {
            (Some(file), Some(line)) => format!("{file}:{line}"),
            (Some(file), None) => file.to_string(),
            _ => "<none>".to_string(),
        }
    }
}

/// Constructors
impl Location {
    pub fn none() -> Location {
        Location::None
    }

    pub fn new<U: Into<InternedString>, V: Into<InternedString>>(
        file: U,
        function: Option<V>,
        line: u64,
        col: Option<u64>,
    ) -> Location {
        Location::Loc {
            file: file.into(),
            function: function.map(|f| f.into()),
            line,
            col,
            bytecode_index: None,
        }
    }

    pub fn with_bytecode_index<T: Into<InternedString>>(self, index: T) -> Location {
        match self {
            Location::Loc { file, function, line, col, .. } => {
                Location::Loc { file, function, line, col, bytecode_index: Some(index.into()) }
            }
            other => other,
        }
    }

    /// Wrap a source location into a property location carrying the
    /// obligation metadata.
    pub fn property<T: Into<InternedString>, U: Into<InternedString>>(
        comment: T,
        property_class: U,
        user_provided: bool,
        source: Location,
    ) -> Location {
        let (file, function, line, col, bytecode_index) = match source {
            Location::None => (None, None, None, None, None),
            Location::Loc { file, function, line, col, bytecode_index } => {
                (Some(file), function, Some(line), col, bytecode_index)
            }
            Location::Property { file, function, line, col, bytecode_index, .. } => {
                (file, function, line, col, bytecode_index)
            }
        };
        Location::Property {
            file,
            function,
            line,
            col,
            bytecode_index,
            comment: comment.into(),
            property_class: property_class.into(),
            user_provided,
        }
    }

    /// A property location with only a function name, used for obligations
    /// that belong to a function rather than a line (e.g. the leak check).
    pub fn property_for_function<T: Into<InternedString>, U: Into<InternedString>>(
        comment: T,
        property_class: U,
        function: InternedString,
    ) -> Location {
        Location::Property {
            file: None,
            function: Some(function),
            line: None,
            col: None,
            bytecode_index: None,
            comment: comment.into(),
            property_class: property_class.into(),
            user_provided: false,
        }
    }

    /// Copy the source coordinates of `from` into this location, keeping any
    /// property metadata already present.
    pub fn backfill_source(&mut self, from: &Location) {
        let file = from.filename();
        let function = from.function_name();
        let line = from.line();
        let col = from.column();
        let bytecode_index = from.bytecode_index();
        match self {
            Location::None => {
                if let Some(file) = file {
                    *self = Location::Loc {
                        file,
                        function,
                        line: line.unwrap_or(0),
                        col,
                        bytecode_index,
                    };
                }
            }
            Location::Property {
                file: pfile,
                function: pfunction,
                line: pline,
                col: pcol,
                bytecode_index: pindex,
                ..
            } => {
                if pfile.is_none() {
                    *pfile = file;
                }
                if pfunction.is_none() {
                    *pfunction = function;
                }
                if pline.is_none() {
                    *pline = line;
                }
                if pcol.is_none() {
                    *pcol = col;
                }
                if pindex.is_none() {
                    *pindex = bytecode_index;
                }
            }
            Location::Loc { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_wraps_source() {
        let loc = Location::new("foo.c", Some("main"), 7, Some(3));
        let prop = Location::property("division by zero", "division-by-zero", false, loc);
        assert_eq!(prop.line(), Some(7));
        assert_eq!(prop.comment().unwrap(), "division by zero");
        assert_eq!(prop.property_class().unwrap(), "division-by-zero");
        assert!(!prop.is_user_provided());
    }

    #[test]
    fn function_only_property_is_not_backfilled() {
        let prop =
            Location::property_for_function("allocation leaked", "memory-leak", "main".into());
        assert!(!prop.lacks_source());
        assert_eq!(prop.function_name().unwrap(), "main");
        assert_eq!(prop.filename(), None);
    }

    #[test]
    fn backfill_fills_missing_coordinates() {
        let mut prop =
            Location::property("error label ERROR", "error label", true, Location::none());
        assert!(prop.lacks_source());
        let source = Location::new("bar.c", Some("f"), 12, None).with_bytecode_index("4");
        prop.backfill_source(&source);
        assert!(!prop.lacks_source());
        assert_eq!(prop.filename().unwrap(), "bar.c");
        assert_eq!(prop.line(), Some(12));
        assert_eq!(prop.bytecode_index().unwrap(), "4");
        assert!(prop.is_user_provided());
    }
}
