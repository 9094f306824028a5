use crate::Address;

/// Index into `Program::diagnostics`.
pub type DiagnosticId = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Index of the offending statement in `Program::statements`.
    pub statement: usize,
    /// Index of the offending token inside that statement.
    pub token: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    InvalidStatement,
    DuplicateLabel {
        label: u8,
        first: Address,
        second: Address,
    },
    DuplicateTag {
        first: Address,
        second: Address,
    },
    TargetAddressInvalid(Address),
    TargetTagInvalid,
    TargetLabelInvalid(u8),
    UnreferencedTag,
}

impl std::fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use DiagnosticKind::*;
        match self {
            InvalidStatement => write!(f, "invalid statement"),
            DuplicateLabel {
                label,
                first,
                second,
            } => write!(f, "duplicate label {label:02}: {first:03} and {second:03}"),
            DuplicateTag { first, second } => {
                write!(f, "duplicate tag: {first:03} and {second:03}")
            }
            TargetAddressInvalid(address) => write!(f, "target address invalid: {address:03}"),
            TargetTagInvalid => write!(f, "target tag invalid"),
            TargetLabelInvalid(label) => write!(f, "target label invalid: {label:02}"),
            UnreferencedTag => write!(f, "unreferenced tag"),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.kind.fmt(f)
    }
}

impl Diagnostic {
    pub fn message(&self) -> String {
        self.to_string()
    }
}
