use string_interner::DefaultSymbol;

use crate::diag::DiagnosticId;
use crate::keys::{Key, OpCode};
use crate::lex::Token;
use crate::Address;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub tokens: Vec<Token>,
    pub opcodes: Vec<OpCode>,
    pub address: Address,
    /// Most recent diagnostic attached to this statement.
    pub diagnostic: Option<DiagnosticId>,
    pub kind: StatementKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementKind {
    Instruction(Instruction),
    Number,
    Tag(DefaultSymbol),
    Comment,
    Invalid(InvalidReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    /// The span was already an error production upstream.
    Upstream,
    /// The tokens of an instruction production form no known shape.
    Malformed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum YesNoImplicit {
    #[default]
    No,
    /// Written out with its own token (`INV`, `Ind`).
    Yes,
    /// Carried by the key itself (`e^x`, `ST*`, `GO*`) or by a merged opcode.
    Implicit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub inverted: YesNoImplicit,
    pub shape: Shape,
    /// Tag reference waiting for its address bytes.
    pub pending: Option<PendingTag>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    Atomic {
        key: &'static Key,
    },
    Argument {
        key: &'static Key,
        indirect: YesNoImplicit,
        arg: u8,
    },
    Label {
        label: u8,
    },
    Branch {
        key: &'static Key,
        indirect: YesNoImplicit,
        target: Target,
    },
    ArgumentBranch {
        key: &'static Key,
        arg_indirect: YesNoImplicit,
        arg: u8,
        target_indirect: YesNoImplicit,
        target: Target,
    },
}

/// Branch destination with the index of its first token in the statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    pub kind: TargetKind,
    pub token: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// Direct address; `split` when written as two halves (`02 40`).
    Address { address: Address, split: bool },
    Label(u8),
    Tag(DefaultSymbol),
    /// Register holding the address, after `Ind` or an indirect key.
    Register(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTag {
    pub symbol: DefaultSymbol,
    /// Position of the two reserved address bytes in the opcodes.
    pub offset: usize,
    pub token: usize,
}

impl Statement {
    pub fn new(kind: StatementKind, tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            opcodes: Vec::new(),
            address: 0,
            diagnostic: None,
            kind,
        }
    }

    pub fn instruction(&self) -> Option<&Instruction> {
        match &self.kind {
            StatementKind::Instruction(i) => Some(i),
            _ => None,
        }
    }

    pub fn is_comment(&self) -> bool {
        matches!(self.kind, StatementKind::Comment)
    }

    /// Declared label code, for `Lbl` statements.
    pub fn label(&self) -> Option<u8> {
        match self.instruction()?.shape {
            Shape::Label { label } => Some(label),
            _ => None,
        }
    }

    /// Tokens that take part in encoding.
    pub fn significant(&self) -> impl Iterator<Item = (usize, &Token)> {
        self.tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.kind.is_trivia())
    }

    /// Exact source text covered by the statement.
    pub fn source(&self) -> String {
        self.tokens.iter().map(|t| &*t.text).collect()
    }

    /// Addresses spanned by the statement's opcodes.
    pub fn addresses(&self) -> std::ops::Range<Address> {
        self.address..self.address + self.opcodes.len()
    }
}

impl Shape {
    pub fn target(&self) -> Option<&Target> {
        match self {
            Shape::Branch { target, .. } | Shape::ArgumentBranch { target, .. } => Some(target),
            _ => None,
        }
    }
}
