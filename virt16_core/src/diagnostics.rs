pub mod diagnostics {
    use std::fmt;

    use thiserror::Error;

    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub enum Severity {
        Warning,
        Error,
    }

    impl fmt::Display for Severity {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Severity::Warning => f.write_str("warning"),
                Severity::Error => f.write_str("error"),
            }
        }
    }

    /// Everything the pipeline reports without stopping. The offending
    /// element is dropped or encoded inert and assembly carries on.
    #[derive(Clone, Debug, PartialEq, Eq, Error)]
    pub enum DiagnosticKind {
        // structural
        #[error("macro '{name}' is never closed with @endmacro")]
        UnterminatedMacro { name: String },
        #[error("@macro directive is missing a name")]
        MissingMacroName,
        #[error("macro '{name}' repeats parameter '{param}'")]
        DuplicateMacroParam { name: String, param: String },
        #[error("@endmacro without a matching @macro")]
        StrayEndMacro,
        #[error("malformed @define: '{text}'")]
        MalformedDefine { text: String },
        #[error("malformed .PLACE directive: {reason}")]
        MalformedPlacement { reason: String },
        #[error("invalid placement address '{text}'")]
        InvalidPlacementAddress { text: String },
        #[error("invalid placement value '{text}'")]
        InvalidPlacementValue { text: String },
        #[error("placement array at '{address}' is never closed with ']'")]
        UnterminatedPlacement { address: String },
        #[error("{directive} is not allowed inside a macro body")]
        DirectiveInMacro { directive: String },
        #[error("routine header has no name")]
        EmptyRoutineName,
        #[error("line outside of any routine: '{text}'")]
        OrphanLine { text: String },
        #[error("routine '.{name}' is defined more than once")]
        DuplicateRoutine { name: String },

        // reference
        #[error("undefined macro '@{name}'")]
        UndefinedMacro { name: String },
        #[error("macro '{name}' expects {expected} argument(s), got {found}")]
        MacroArity { name: String, expected: usize, found: usize },
        #[error("undefined definition '%{name}'")]
        UndefinedDefinition { name: String },
        #[error("unknown mnemonic '{mnemonic}'")]
        UnknownMnemonic { mnemonic: String },
        #[error("{mnemonic} expects {expected} operand(s), got {found}")]
        OperandCount { mnemonic: &'static str, expected: usize, found: usize },
        #[error("{mnemonic}: unknown register '{operand}'")]
        UnknownRegister { mnemonic: &'static str, operand: String },
        #[error("{mnemonic}: unknown routine '{operand}'")]
        UnknownRoutine { mnemonic: &'static str, operand: String },
        #[error("{mnemonic}: invalid immediate '{operand}'")]
        InvalidImmediate { mnemonic: &'static str, operand: String },

        // range
        #[error("{mnemonic}: immediate value {value} out of range (must be 0 to 65535)")]
        ImmediateOutOfRange { mnemonic: &'static str, value: u64 },
        #[error("{mnemonic}: routine '{routine}' at {address:#x} is outside the 16-bit address space")]
        AddressOutOfRange { mnemonic: &'static str, routine: String, address: u32 },
        #[error("placement at {address:#06x} ({len} words) runs past the end of the address space")]
        PlacementOutOfRange { address: u16, len: usize },
        #[error("placement at {address:#06x} overlaps {other}")]
        PlacementOverlap { address: u16, other: String },
    }

    impl DiagnosticKind {
        pub fn severity(&self) -> Severity {
            match self {
                DiagnosticKind::StrayEndMacro
                | DiagnosticKind::OrphanLine { .. }
                | DiagnosticKind::DuplicateRoutine { .. } => Severity::Warning,
                _ => Severity::Error,
            }
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct Diagnostic {
        /// 1-based source line
        pub line: usize,
        pub kind: DiagnosticKind,
    }

    impl Diagnostic {
        pub fn severity(&self) -> Severity {
            self.kind.severity()
        }
    }

    impl fmt::Display for Diagnostic {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "line {}: {}", self.line, self.kind)
        }
    }

    #[derive(Clone, Debug, Default)]
    pub struct Diagnostics {
        entries: Vec<Diagnostic>,
    }

    impl Diagnostics {
        pub fn new() -> Diagnostics {
            Diagnostics::default()
        }

        pub fn report(&mut self, line: usize, kind: DiagnosticKind) {
            let diagnostic = Diagnostic { line, kind };
            log::debug!("{}: {diagnostic}", diagnostic.severity());
            self.entries.push(diagnostic);
        }

        pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
            self.entries.iter()
        }

        pub fn len(&self) -> usize {
            self.entries.len()
        }

        pub fn is_empty(&self) -> bool {
            self.entries.is_empty()
        }

        pub fn error_count(&self) -> usize {
            self.entries
                .iter()
                .filter(|d| d.severity() == Severity::Error)
                .count()
        }

        pub fn has_errors(&self) -> bool {
            self.error_count() > 0
        }

        pub fn kinds(&self) -> impl Iterator<Item = &DiagnosticKind> {
            self.entries.iter().map(|d| &d.kind)
        }
    }

    /// Conditions that leave nothing meaningful for later stages to do.
    #[derive(Debug, Error, PartialEq, Eq)]
    pub enum AssembleError {
        #[error("no entry routine '.{0}' defined")]
        MissingEntry(String),
    }
}
